//! Route-table renderer
//!
//! Resolves the request path once against the [`RouteTable`] and turns the
//! matched target into a [`RenderResult`].

use async_trait::async_trait;
use std::collections::HashMap;

use super::shell::{escape_html, fill_placeholders, AppShell};
use super::table::{PageTarget, RouteTable};
use super::{PageError, RenderContext, RenderError, RenderResult, Renderer};
use crate::config::Config;
use crate::logger;

pub struct TableRenderer {
    table: RouteTable,
    shell: AppShell,
}

impl TableRenderer {
    pub const fn new(table: RouteTable, shell: AppShell) -> Self {
        Self { table, shell }
    }

    /// Build from the inline `[[pages]]` plus the optional routes file
    pub fn from_config(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let mut table = RouteTable::new(config.pages.clone());
        if let Some(path) = &config.render.routes_file {
            let source = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read routes file '{path}': {e}"))?;
            let extra = RouteTable::from_toml_str(&source)
                .map_err(|e| format!("Invalid routes file '{path}': {e}"))?;
            table.extend(extra);
        }
        logger::log_info(&format!("[Render] Loaded {} page routes", table.len()));
        Ok(Self::new(table, AppShell::from_config(&config.render)))
    }

    fn not_found(&self) -> RenderResult {
        let error = PageError::not_found();
        RenderResult::Error {
            html: self.shell.error_page(404, &error.message),
            error,
        }
    }
}

#[async_trait]
impl Renderer for TableRenderer {
    async fn render(&self, ctx: &RenderContext) -> Result<RenderResult, RenderError> {
        if !ctx.path.starts_with('/') {
            return Err(RenderError::MalformedRoute(ctx.path.clone()));
        }

        let Some(matched) = self.table.resolve(&ctx.path) else {
            return Ok(self.not_found());
        };

        match &matched.route.target {
            PageTarget::Page {
                html,
                title,
                state,
                validate,
            } => {
                if let Some(rule) = validate {
                    if ctx.query_param(&rule.param) != Some(rule.equals.as_str()) {
                        return Ok(self.not_found());
                    }
                }
                let fragment = fill_params(html, &matched.params, ctx);
                Ok(RenderResult::Success {
                    html: self.shell.render(&fragment, title.as_deref(), state.as_ref()),
                })
            }
            PageTarget::Redirect { target, status } => Ok(RenderResult::Redirect {
                path: target.clone(),
                status: *status,
            }),
            PageTarget::Error {
                message,
                status_code,
            } => Ok(RenderResult::Error {
                html: self
                    .shell
                    .error_page(status_code.unwrap_or(500), message),
                error: PageError {
                    message: message.clone(),
                    status_code: *status_code,
                },
            }),
            PageTarget::Fail {
                message,
                status_code,
            } => Err(RenderError::Failed {
                message: message.clone(),
                status_code: *status_code,
            }),
        }
    }
}

/// Replace `{name}` with the escaped route parameter and `{header:name}`
/// with the escaped request header, empty when the header is absent
fn fill_params(html: &str, params: &HashMap<String, String>, ctx: &RenderContext) -> String {
    fill_placeholders(html, |key| match key.strip_prefix("header:") {
        Some(header) => Some(escape_html(ctx.header(header).unwrap_or_default())),
        None => params.get(key).map(String::as_str).map(escape_html),
    })
}
