//! Request entry module
//!
//! Entry point for HTTP request processing: method validation, body size
//! checks, delivery, and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ETAG, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::delivery::RouteRequest;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let route_request = RouteRequest::from_parts(&parts);

    let mut response = respond(&parts, &route_request, &state).await;

    if let Ok(name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, name);
    }

    if state.cached_access_log.load(Ordering::Relaxed) {
        let entry = access_entry(&parts, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn respond(
    parts: &hyper::http::request::Parts,
    route_request: &RouteRequest,
    state: &AppState,
) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&parts.method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&parts.headers, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Deliver
    state.delivery.handle(route_request).await
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    headers: &hyper::HeaderMap,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn access_entry(
    parts: &hyper::http::request::Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name| {
        parts
            .headers
            .get(name)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", parts.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.etag = response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::delivery::Delivery;
    use crate::render::TableRenderer;

    fn state() -> Arc<AppState> {
        let cfg = Config::from_toml_str(
            r#"
            [logging]
            access_log = false

            [http]
            max_body_size = 16

            [static]
            dir = "/nonexistent/render_gate"

            [[pages]]
            path = "/stateless"
            type = "page"
            html = "<h1>My component!</h1>"
            "#,
        )
        .unwrap();
        let renderer = Arc::new(TableRenderer::from_config(&cfg).unwrap());
        let delivery = Delivery::new(&cfg, renderer);
        Arc::new(AppState::new(cfg, delivery))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_get_renders_with_server_header() {
        let resp = handle_request(request(Method::GET, "/stateless"), state(), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[SERVER], "render-gate");
        assert!(resp.headers().contains_key(ETAG));
    }

    #[tokio::test]
    async fn test_method_checks() {
        let resp = handle_request(request(Method::POST, "/stateless"), state(), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);

        let resp = handle_request(request(Method::OPTIONS, "/stateless"), state(), peer())
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let req = Request::builder()
            .uri("/stateless")
            .header("content-length", "1024")
            .body(())
            .unwrap();
        let resp = handle_request(req, state(), peer()).await.unwrap();
        assert_eq!(resp.status(), 413);
    }

    #[test]
    fn test_access_entry_fields() {
        let req = Request::builder()
            .uri("/validate?valid=true")
            .header(USER_AGENT, "Mozilla/5.0")
            .body(())
            .unwrap();
        let (parts, ()) = req.into_parts();
        let resp = http::build_page_response("abcd".to_string(), "W/\"4-x\"", false);

        let entry = access_entry(&parts, &resp, peer(), Instant::now());
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.query.as_deref(), Some("valid=true"));
        assert_eq!(entry.http_version, "1.1");
        assert_eq!(entry.body_bytes, 4);
        assert_eq!(entry.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(entry.etag.as_deref(), Some("W/\"4-x\""));
    }
}
