//! Page delivery server
//!
//! An HTTP front for a page [`render::Renderer`]: weak `ETag` validation,
//! conditional GET, redirect and error status mapping, and a reserved
//! build artifact prefix that always answers 404.

pub mod config;
pub mod delivery;
pub mod handler;
pub mod http;
pub mod logger;
pub mod render;
pub mod server;

use std::sync::Arc;

/// Build the shared state with the route-table renderer
pub fn build_state(
    cfg: config::Config,
) -> Result<Arc<config::AppState>, Box<dyn std::error::Error>> {
    let renderer = Arc::new(render::TableRenderer::from_config(&cfg)?);
    let delivery = delivery::Delivery::new(&cfg, renderer);
    Ok(Arc::new(config::AppState::new(cfg, delivery)))
}
