//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from page rendering.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_empty_response, build_error_response, build_options_response, build_page_response,
    build_redirect_response, build_static_response,
};
