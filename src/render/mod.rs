//! Page rendering module
//!
//! Defines the [`Renderer`] seam the delivery layer sits in front of, the
//! values a render produces, and a route-table backed implementation.

mod renderer;
mod shell;
mod table;

pub use renderer::TableRenderer;
pub use shell::{escape_html, AppShell};
pub use table::{PageRoute, PageTarget, RouteMatch, RouteTable, Validation};

use async_trait::async_trait;
use hyper::HeaderMap;
use thiserror::Error;

/// Message used for pages that do not exist or fail validation
pub const NOT_FOUND_MESSAGE: &str = "This page could not be found";

/// Outcome of a single render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// Page rendered normally
    Success { html: String },
    /// Page asked the client to go elsewhere
    Redirect { path: String, status: u16 },
    /// Page rendered its error view
    Error { html: String, error: PageError },
}

/// Error reported by a page alongside its rendered error view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl PageError {
    pub fn not_found() -> Self {
        Self {
            message: NOT_FOUND_MESSAGE.to_string(),
            status_code: Some(404),
        }
    }
}

/// Failure raised while rendering
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The page itself raised
    #[error("{message}")]
    Failed {
        message: String,
        status_code: Option<u16>,
    },

    /// The route could not be resolved at all
    #[error("Malformed route: {0}")]
    MalformedRoute(String),
}

impl RenderError {
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Failed { status_code, .. } => *status_code,
            Self::MalformedRoute(_) => None,
        }
    }
}

/// Everything a renderer gets to see about the request
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Route path relative to the router base, always starting with '/'
    pub path: String,
    /// Decoded query pairs, in request order
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl RenderContext {
    /// Build a context from a path and an optional raw query string
    pub fn new(path: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            path: path.into(),
            query: query.map(parse_query).unwrap_or_default(),
            headers: HeaderMap::new(),
        }
    }

    /// First value of a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

/// Turns a route into HTML, a redirect, or an error
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, ctx: &RenderContext) -> Result<RenderResult, RenderError>;
}
