//! Request handler module
//!
//! Turns hyper requests into delivery calls and serves static assets.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
