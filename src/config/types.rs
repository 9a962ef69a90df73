// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::render::PageRoute;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub render: RenderConfig,
    #[serde(rename = "static")]
    pub assets: StaticConfig,
    /// Routing table for the built-in renderer, matched in order
    #[serde(default)]
    pub pages: Vec<PageRoute>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Page rendering configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Prefix every page route lives under, e.g. "/" or "/test/"
    pub router_base: String,
    /// Build artifact namespace; always answered with 404
    pub public_path: String,
    /// Id of the element the application is mounted on
    pub mount_id: String,
    /// Name of the window global receiving the page state
    pub state_global: String,
    /// Default document title
    pub title: String,
    /// Document template with `{title}`, `{app}` and `{state}` placeholders
    #[serde(default)]
    pub app_template: Option<String>,
    /// Error fragment template with `{status}` and `{message}` placeholders
    #[serde(default)]
    pub error_template: Option<String>,
    /// Extra TOML file holding `[[pages]]`, appended after the inline ones
    #[serde(default)]
    pub routes_file: Option<String>,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    pub dir: String,
    pub index_files: Vec<String>,
    /// Sent verbatim as `Cache-Control` on static responses
    #[serde(default)]
    pub cache_control: Option<String>,
}
