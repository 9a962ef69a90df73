// Server module entry
// Listener setup, connection handling and the accept loop

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

// Re-export commonly used items
pub use listener::{create_reusable_listener, DEFAULT_BACKLOG};
pub use serve::{run, serve};
pub use signal::start_signal_handler;
