//! Response delivery layer
//!
//! Sits in front of a [`Renderer`]: rejects build artifact paths, serves
//! static assets, invokes the renderer, and turns its result into an HTTP
//! response with a weak `ETag` and conditional GET handling.
//!
//! Per request: `Start -> Rendering -> {Redirecting | Erroring | Validating
//! -> {NotModified | Serving}}`. Nothing is kept between requests.

mod outcome;
mod request;

pub use outcome::Outcome;
pub use request::{normalize_path, split_uri, RouteRequest};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use crate::config::Config;
use crate::handler::static_files::StaticAssets;
use crate::http::{self, cache};
use crate::logger;
use crate::render::{AppShell, PageError, RenderContext, RenderError, RenderResult, Renderer};

pub struct Delivery {
    renderer: Arc<dyn Renderer>,
    shell: AppShell,
    assets: StaticAssets,
    router_base: String,
    public_path: String,
}

impl Delivery {
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            shell: AppShell::from_config(&config.render),
            assets: StaticAssets::from_config(&config.assets)
                .reserving(&config.render.public_path),
            router_base: config.render.router_base.clone(),
            public_path: config.render.public_path.clone(),
        }
    }

    /// Whether `path` lies in the build artifact namespace
    ///
    /// Both "/_nuxt/..." and the bare "/_nuxt" count.
    pub fn is_reserved(&self, path: &str) -> bool {
        if self.public_path == "/" {
            return false;
        }
        path.starts_with(&self.public_path) || path == self.public_path.trim_end_matches('/')
    }

    /// Path relative to the router base, `None` when outside it
    fn route_path(&self, path: &str) -> Option<String> {
        if self.router_base == "/" {
            return Some(path.to_string());
        }
        let base = self.router_base.trim_end_matches('/');
        let rest = path.strip_prefix(base)?;
        if rest.is_empty() {
            Some("/".to_string())
        } else if rest.starts_with('/') {
            Some(rest.to_string())
        } else {
            None
        }
    }

    /// Render a route for programmatic callers
    ///
    /// The renderer's result is returned unchanged, so an error page keeps
    /// its message even when it carries no status code.
    pub async fn render_route(&self, uri: &str) -> Result<RenderResult, RenderError> {
        let (path, query) = split_uri(uri);
        let Some(route_path) = self.route_path(&normalize_path(path)) else {
            return Ok(self.not_found_result());
        };
        self.renderer
            .render(&RenderContext::new(route_path, query))
            .await
    }

    /// Produce the HTTP response for a request
    pub async fn handle(&self, request: &RouteRequest) -> Response<Full<Bytes>> {
        let (outcome, response) = self.deliver(request).await;
        // Redirects stay at info level, only 5xx outcomes reach the error log
        logger::log_at(
            outcome.level(),
            &format!("[Delivery] {} {} -> {outcome:?}", request.method, request.path),
        );
        response
    }

    /// Like [`Delivery::handle`], also reporting the terminal state
    pub async fn deliver(&self, request: &RouteRequest) -> (Outcome, Response<Full<Bytes>>) {
        let is_head = request.is_head();
        // Every check below sees the same canonical path
        let path = normalize_path(&request.path);

        if self.is_reserved(&path) {
            return (
                Outcome::Rejected,
                http::build_empty_response(StatusCode::NOT_FOUND),
            );
        }

        if let Some(resp) = self
            .assets
            .serve(&path, request.if_none_match(), is_head)
            .await
        {
            return (Outcome::Asset, resp);
        }

        let Some(route_path) = self.route_path(&path) else {
            return (Outcome::Rejected, http::build_404_response());
        };

        let ctx = RenderContext {
            headers: request.headers.clone(),
            ..RenderContext::new(route_path, request.query.as_deref())
        };

        match self.renderer.render(&ctx).await {
            Ok(RenderResult::Success { html }) => {
                let etag = cache::generate_etag(html.as_bytes());
                if cache::check_etag_match(request.if_none_match(), &etag) {
                    return (Outcome::NotModified, http::build_304_response(&etag));
                }
                (
                    Outcome::Serving,
                    http::build_page_response(html, &etag, is_head),
                )
            }
            Ok(RenderResult::Redirect { path, status }) => {
                let status = redirect_status(status);
                (
                    Outcome::Redirecting {
                        status: status.as_u16(),
                    },
                    http::build_redirect_response(&path, status, self.shell.placeholder(), is_head),
                )
            }
            Ok(RenderResult::Error { html, error }) => {
                let status = error_status(error.status_code);
                if status.is_server_error() {
                    logger::log_error(&format!(
                        "Page error on {}: {}",
                        request.path, error.message
                    ));
                }
                (
                    Outcome::Erroring {
                        status: status.as_u16(),
                    },
                    http::build_error_response(status, html, is_head),
                )
            }
            Err(err) => {
                let status = error_status(err.status_code());
                logger::log_error(&format!("Render failed on {}: {err}", request.path));
                let html = self.shell.error_page(status.as_u16(), &err.to_string());
                (
                    Outcome::Erroring {
                        status: status.as_u16(),
                    },
                    http::build_error_response(status, html, is_head),
                )
            }
        }
    }

    fn not_found_result(&self) -> RenderResult {
        let error = PageError::not_found();
        RenderResult::Error {
            html: self.shell.error_page(404, &error.message),
            error,
        }
    }
}

/// Status for an error result, 500 unless a 4xx/5xx code was given
fn error_status(code: Option<u16>) -> StatusCode {
    code.and_then(|c| StatusCode::from_u16(c).ok())
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Status for a redirect result, 302 unless a 3xx code was given
fn redirect_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(StatusCode::is_redirection)
        .unwrap_or(StatusCode::FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::header::IF_NONE_MATCH;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Renders one fixed result and counts calls
    struct Fixed {
        result: Result<RenderResult, RenderError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Renderer for Fixed {
        async fn render(&self, _ctx: &RenderContext) -> Result<RenderResult, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn make_delivery(result: Result<RenderResult, RenderError>) -> (Delivery, Arc<Fixed>) {
        let cfg = Config::from_toml_str("[static]\ndir = \"/nonexistent/render_gate\"").unwrap();
        let renderer = Arc::new(Fixed {
            result,
            calls: AtomicUsize::new(0),
        });
        (Delivery::new(&cfg, renderer.clone()), renderer)
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn success(html: &str) -> Result<RenderResult, RenderError> {
        Ok(RenderResult::Success {
            html: html.to_string(),
        })
    }

    #[tokio::test]
    async fn test_success_then_not_modified() {
        let (delivery, _) = make_delivery(success("<h1>My component!</h1>"));

        let (outcome, resp) = delivery.deliver(&RouteRequest::get("/stateless")).await;
        assert_eq!(outcome, Outcome::Serving);
        assert_eq!(resp.status(), StatusCode::OK);
        let etag = resp.headers()["ETag"].to_str().unwrap().to_string();
        assert!(etag.starts_with("W/\"") && etag.ends_with('"'));

        let req = RouteRequest::get("/stateless").with_header(IF_NONE_MATCH, &etag);
        let (outcome, resp) = delivery.deliver(&req).await;
        assert_eq!(outcome, Outcome::NotModified);
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body_string(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_validator_serves() {
        let (delivery, _) = make_delivery(success("new"));
        let req = RouteRequest::get("/").with_header(IF_NONE_MATCH, "W/\"3-old\"");
        let resp = delivery.handle(&req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "new");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (delivery, _) = make_delivery(success("abc"));
        let resp = delivery
            .handle(&RouteRequest::new(hyper::Method::HEAD, "/"))
            .await;
        assert_eq!(resp.headers()["Content-Length"], "3");
        assert!(resp.headers().contains_key("ETag"));
        assert!(body_string(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_redirect_skips_validator() {
        let (delivery, _) = make_delivery(Ok(RenderResult::Redirect {
            path: "/".to_string(),
            status: 302,
        }));
        let (outcome, resp) = delivery.deliver(&RouteRequest::get("/redirect")).await;
        assert_eq!(outcome, Outcome::Redirecting { status: 302 });
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], "/");
        assert!(resp.headers().get("ETag").is_none());
        assert!(body_string(resp).await.contains("<div id=\"__nuxt\"></div>"));
    }

    #[tokio::test]
    async fn test_redirect_status_passthrough_and_fallback() {
        let (delivery, _) = make_delivery(Ok(RenderResult::Redirect {
            path: "/moved".to_string(),
            status: 301,
        }));
        let resp = delivery.handle(&RouteRequest::get("/old")).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);

        let (delivery, _) = make_delivery(Ok(RenderResult::Redirect {
            path: "/".to_string(),
            status: 200,
        }));
        let resp = delivery.handle(&RouteRequest::get("/old")).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_error_result_defaults_to_500() {
        let (delivery, _) = make_delivery(Ok(RenderResult::Error {
            html: "<p>Custom error</p>".to_string(),
            error: PageError {
                message: "Custom error".to_string(),
                status_code: None,
            },
        }));
        let (outcome, resp) = delivery.deliver(&RouteRequest::get("/error2")).await;
        assert_eq!(outcome, Outcome::Erroring { status: 500 });
        assert!(resp.headers().get("ETag").is_none());
        assert!(body_string(resp).await.contains("Custom error"));
    }

    #[tokio::test]
    async fn test_error_result_keeps_status() {
        let (delivery, _) = make_delivery(Ok(RenderResult::Error {
            html: "gone".to_string(),
            error: PageError::not_found(),
        }));
        let resp = delivery.handle(&RouteRequest::get("/nope")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_failure_is_500_with_message() {
        let (delivery, _) = make_delivery(Err(RenderError::Failed {
            message: "Error mouahahah".to_string(),
            status_code: None,
        }));
        let (outcome, resp) = delivery.deliver(&RouteRequest::get("/error")).await;
        assert_eq!(outcome, Outcome::Erroring { status: 500 });
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(resp).await.contains("Error mouahahah"));
    }

    #[tokio::test]
    async fn test_render_failure_custom_status() {
        let (delivery, _) = make_delivery(Err(RenderError::Failed {
            message: "Forbidden".to_string(),
            status_code: Some(403),
        }));
        let resp = delivery.handle(&RouteRequest::get("/secret")).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_reserved_prefix_never_renders() {
        let (delivery, renderer) = make_delivery(success("page"));
        for path in [
            "/_nuxt/server-bundle.json",
            "/_nuxt/",
            "/_nuxt",
            "//_nuxt/server-bundle.json",
            "/./_nuxt/server-bundle.json",
            "/about/../_nuxt/server-bundle.json",
        ] {
            let (outcome, resp) = delivery.deliver(&RouteRequest::get(path)).await;
            assert_eq!(outcome, Outcome::Rejected);
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            assert!(body_string(resp).await.is_empty());
        }
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);

        assert!(!delivery.is_reserved("/_nuxtish"));
        assert!(!delivery.is_reserved("/about/_nuxt/"));
    }

    #[test]
    fn test_route_path_with_base() {
        let cfg = Config::from_toml_str("[render]\nrouter_base = \"/test/\"").unwrap();
        let (_, renderer) = make_delivery(success(""));
        let delivery = Delivery::new(&cfg, renderer);

        assert_eq!(delivery.route_path("/test/about").as_deref(), Some("/about"));
        assert_eq!(delivery.route_path("/test/").as_deref(), Some("/"));
        assert_eq!(delivery.route_path("/test").as_deref(), Some("/"));
        assert_eq!(delivery.route_path("/testing"), None);
        assert_eq!(delivery.route_path("/about"), None);
    }

    #[test]
    fn test_status_helpers() {
        assert_eq!(error_status(None), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_status(Some(404)), StatusCode::NOT_FOUND);
        assert_eq!(error_status(Some(200)), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_status(Some(42)), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(redirect_status(307), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(redirect_status(500), StatusCode::FOUND);
    }
}
