// Application state module
// Shared, read-only runtime state handed to every connection

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::delivery::Delivery;

/// Application state
pub struct AppState {
    pub config: Config,
    pub delivery: Delivery,
    /// Notified once to stop accepting connections
    pub shutdown: Arc<Notify>,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, delivery: Delivery) -> Self {
        let cached_access_log = AtomicBool::new(config.logging.access_log);
        Self {
            config,
            delivery,
            shutdown: Arc::new(Notify::new()),
            cached_access_log,
        }
    }

    /// Ask the server loop to stop accepting connections
    pub fn close(&self) {
        self.shutdown.notify_one();
    }
}
