// Configuration module entry point
// Loads layered configuration (defaults, file, environment) and builds runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, RenderConfig, ServerConfig,
    StaticConfig,
};

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false));
        Self::finish(builder)
    }

    /// Build configuration from an in-memory TOML document, with the same
    /// defaults and environment overrides as [`Config::load_from`]
    pub fn from_toml_str(source: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml));
        Self::finish(builder)
    }

    fn finish(builder: Builder) -> Result<Self, config::ConfigError> {
        let settings = builder
            .add_source(config::Environment::with_prefix("SERVER").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "render-gate")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("render.router_base", "/")?
            .set_default("render.public_path", "/_nuxt/")?
            .set_default("render.mount_id", "__nuxt")?
            .set_default("render.state_global", "__NUXT__")?
            .set_default("render.title", "")?
            .set_default("static.dir", "static")?
            .set_default("static.index_files", vec!["index.html"])?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.normalize();
        Ok(cfg)
    }

    /// Make prefixes canonical: leading and trailing slash
    fn normalize(&mut self) {
        self.render.router_base = with_slashes(&self.render.router_base);
        self.render.public_path = with_slashes(&self.render.public_path);
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn with_slashes(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
