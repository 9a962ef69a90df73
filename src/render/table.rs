//! Route table module
//!
//! Maps path patterns to page targets. Patterns are made of literal
//! segments, `:name` parameters and an optional trailing `*` wildcard.

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::collections::HashMap;

/// One entry of the routing table
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PageRoute {
    /// Path pattern, e.g. "/users/:id"
    pub path: String,
    /// What to render when matched
    #[serde(flatten)]
    pub target: PageTarget,
}

/// What a matched route renders
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageTarget {
    /// Static fragment with `{param}` placeholders
    Page {
        html: String,
        #[serde(default)]
        title: Option<String>,
        /// Serialized into the window state global
        #[serde(default)]
        state: Option<serde_json::Value>,
        #[serde(default)]
        validate: Option<Validation>,
    },
    /// Send the client elsewhere
    Redirect {
        target: String,
        #[serde(default = "default_redirect_status")]
        status: u16,
    },
    /// Page renders its error view
    Error {
        message: String,
        #[serde(default)]
        status_code: Option<u16>,
    },
    /// Page raises while rendering
    Fail {
        message: String,
        #[serde(default)]
        status_code: Option<u16>,
    },
}

#[allow(clippy::missing_const_for_fn)]
fn default_redirect_status() -> u16 {
    302
}

/// Query condition a page requires, otherwise it reports not found
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Validation {
    pub param: String,
    pub equals: String,
}

/// A resolved route with its captured parameters
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a PageRoute,
    pub params: HashMap<String, String>,
}

/// Ordered routing table, first match wins
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<PageRoute>,
}

/// Shape of a standalone routes file
#[derive(Debug, Deserialize)]
struct RoutesDocument {
    #[serde(default)]
    pages: Vec<PageRoute>,
}

impl RouteTable {
    pub const fn new(routes: Vec<PageRoute>) -> Self {
        Self { routes }
    }

    /// Parse a TOML document containing `[[pages]]` entries
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        let doc: RoutesDocument = toml::from_str(source)?;
        Ok(Self::new(doc.pages))
    }

    /// Append routes after the existing ones
    pub fn extend(&mut self, other: Self) {
        self.routes.extend(other.routes);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route matching `path`
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            match_pattern(&route.path, path).map(|params| RouteMatch { route, params })
        })
    }
}

/// Match a path against a pattern, returning captured parameters
///
/// Captured segments are percent-decoded. A segment that does not decode to
/// UTF-8 makes the pattern not match.
pub fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let mut params = HashMap::new();
    let mut path_segments = segments(path);

    for expected in segments(pattern) {
        if expected == "*" {
            return Some(params);
        }

        let actual = path_segments.next()?;
        if let Some(name) = expected.strip_prefix(':') {
            let value = percent_decode_str(actual).decode_utf8().ok()?;
            params.insert(name.to_string(), value.into_owned());
        } else if expected != actual {
            return None;
        }
    }

    // Every path segment must be consumed
    if path_segments.next().is_some() {
        return None;
    }
    Some(params)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str, html: &str) -> PageRoute {
        PageRoute {
            path: path.to_string(),
            target: PageTarget::Page {
                html: html.to_string(),
                title: None,
                state: None,
                validate: None,
            },
        }
    }

    #[test]
    fn test_match_literal() {
        assert!(match_pattern("/stateless", "/stateless").is_some());
        assert!(match_pattern("/stateless", "/stateless/").is_some());
        assert!(match_pattern("/stateless", "/stateful").is_none());
        assert!(match_pattern("/stateless", "/stateless/extra").is_none());
        assert!(match_pattern("/", "/").is_some());
        assert!(match_pattern("/", "/about").is_none());
    }

    #[test]
    fn test_match_params() {
        let params = match_pattern("/users/:id", "/users/1").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("1"));
        assert!(match_pattern("/users/:id", "/users").is_none());

        let params = match_pattern("/users/:id", "/users/John%20Doe").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("John Doe"));
        let params = match_pattern("/users/:id", "/users/%C3%A9t%C3%A9").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("été"));
        assert!(match_pattern("/users/:id", "/users/%FF%FE").is_none());
    }

    #[test]
    fn test_match_wildcard() {
        assert!(match_pattern("/docs/*", "/docs/a/b/c").is_some());
        assert!(match_pattern("/docs/*", "/docs").is_some());
        assert!(match_pattern("/*", "/anything/at/all").is_some());
    }

    #[test]
    fn test_resolve_order() {
        let table = RouteTable::new(vec![
            page("/users/me", "me"),
            page("/users/:id", "someone"),
            page("/*", "fallback"),
        ]);

        let m = table.resolve("/users/me").unwrap();
        assert_eq!(m.route.path, "/users/me");

        let m = table.resolve("/users/7").unwrap();
        assert_eq!(m.route.path, "/users/:id");

        let m = table.resolve("/elsewhere").unwrap();
        assert_eq!(m.route.path, "/*");
    }

    #[test]
    fn test_from_toml_str() {
        let table = RouteTable::from_toml_str(
            r#"
            [[pages]]
            path = "/validate"
            type = "page"
            html = "<h1>I am valid</h1>"
            validate = { param = "valid", equals = "true" }

            [[pages]]
            path = "/error"
            type = "fail"
            message = "Error mouahahah"
            "#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        let m = table.resolve("/validate").unwrap();
        assert!(matches!(
            &m.route.target,
            PageTarget::Page { validate: Some(v), .. } if v.param == "valid"
        ));
    }
}
