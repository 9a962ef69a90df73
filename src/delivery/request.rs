//! Route request module
//!
//! The transport-independent view of an incoming request.

use hyper::header::{HeaderName, HeaderValue, IF_NONE_MATCH};
use hyper::{HeaderMap, Method};

/// Request as seen by the delivery layer
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string without the leading '?'
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl RouteRequest {
    /// Build a request from a method and a path with optional query
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = split_uri(uri);
        Self {
            method,
            path: path.to_string(),
            query: query.map(ToString::to_string),
            headers: HeaderMap::new(),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn from_parts(parts: &hyper::http::request::Parts) -> Self {
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(ToString::to_string),
            headers: parts.headers.clone(),
        }
    }

    /// Add a header, ignoring values that are not valid header text
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    pub fn if_none_match(&self) -> Option<&str> {
        self.headers
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
    }
}

/// Canonical form of a request path
///
/// Empty and `.` segments are dropped and `..` removes the previous segment,
/// never climbing above the root. A trailing slash is kept.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(path.len() + 1);
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if out.is_empty() || trailing {
        out.push('/');
    }
    out
}

/// Split "/path?query" into its parts
pub fn split_uri(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_uri() {
        assert_eq!(split_uri("/validate?valid=true"), ("/validate", Some("valid=true")));
        assert_eq!(split_uri("/stateless"), ("/stateless", None));
        assert_eq!(split_uri("/a?"), ("/a", Some("")));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("//_nuxt/server-bundle.json"), "/_nuxt/server-bundle.json");
        assert_eq!(normalize_path("/./_nuxt/server-bundle.json"), "/_nuxt/server-bundle.json");
        assert_eq!(normalize_path("/static/../_nuxt/a.js"), "/_nuxt/a.js");
        assert_eq!(normalize_path("/../../etc/passwd"), "/etc/passwd");
        assert_eq!(normalize_path("/_nuxt/"), "/_nuxt/");
        assert_eq!(normalize_path("/users//1"), "/users/1");
        assert_eq!(normalize_path("/a/.."), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_if_none_match() {
        let req = RouteRequest::get("/stateless").with_header(IF_NONE_MATCH, "W/\"1-a\"");
        assert_eq!(req.if_none_match(), Some("W/\"1-a\""));
        assert!(!req.is_head());

        let req = RouteRequest::new(Method::HEAD, "/").with_header(IF_NONE_MATCH, "bad\nvalue");
        assert!(req.if_none_match().is_none());
        assert!(req.is_head());
    }
}
