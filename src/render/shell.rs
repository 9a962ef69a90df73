//! Application shell
//!
//! Wraps rendered fragments in the HTML document and embeds the page state.

use crate::config::RenderConfig;

const DEFAULT_APP_TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{app}\n{state}\n</body>\n</html>";

const DEFAULT_ERROR_TEMPLATE: &str = "<div class=\"error-page\"><h1 class=\"error-code\">{status}</h1><div class=\"error-message\">{message}</div></div>";

#[derive(Debug, Clone)]
pub struct AppShell {
    template: String,
    error_template: String,
    mount_id: String,
    state_global: String,
    title: String,
}

impl AppShell {
    pub fn from_config(render: &RenderConfig) -> Self {
        Self {
            template: render
                .app_template
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_TEMPLATE.to_string()),
            error_template: render
                .error_template
                .clone()
                .unwrap_or_else(|| DEFAULT_ERROR_TEMPLATE.to_string()),
            mount_id: render.mount_id.clone(),
            state_global: render.state_global.clone(),
            title: render.title.clone(),
        }
    }

    /// Render a full document around `fragment`
    ///
    /// `state` is serialized as JSON into a script assigning the window global.
    pub fn render(
        &self,
        fragment: &str,
        title: Option<&str>,
        state: Option<&serde_json::Value>,
    ) -> String {
        let app = format!("<div id=\"{}\">{fragment}</div>", self.mount_id);
        let state_json = state
            .map_or_else(|| "{}".to_string(), serde_json::Value::to_string)
            .replace("</", "<\\/");
        let script = format!("<script>window.{}={state_json}</script>", self.state_global);
        let title = escape_html(title.unwrap_or(&self.title));

        fill_placeholders(&self.template, |key| match key {
            "title" => Some(title.clone()),
            "state" => Some(script.clone()),
            "app" => Some(app.clone()),
            _ => None,
        })
    }

    /// Document with an empty application mount
    pub fn placeholder(&self) -> String {
        self.render("", None, None)
    }

    /// Document showing the error view
    pub fn error_page(&self, status: u16, message: &str) -> String {
        let fragment = fill_placeholders(&self.error_template, |key| match key {
            "status" => Some(status.to_string()),
            "message" => Some(escape_html(message)),
            _ => None,
        });
        self.render(&fragment, None, None)
    }
}

/// Replace each `{key}` in `template` with `lookup(key)` in one left-to-right pass
///
/// Substituted text is never scanned again. Unknown keys are kept verbatim.
pub fn fill_placeholders<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| lookup(&after[..close]).map(|v| (v, close)));
        match value {
            Some((value, close)) => {
                out.push_str(&value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn shell() -> AppShell {
        AppShell::from_config(&Config::from_toml_str("").unwrap().render)
    }

    #[test]
    fn test_placeholder_has_empty_mount() {
        let html = shell().placeholder();
        assert!(html.contains("<div id=\"__nuxt\"></div>"));
        assert!(html.contains("<script>window.__NUXT__={}</script>"));
    }

    #[test]
    fn test_render_with_state_and_title() {
        let state = serde_json::json!({ "test": true });
        let html = shell().render("<h1>Hi</h1>", Some("My title"), Some(&state));
        assert!(html.contains("<title>My title</title>"));
        assert!(html.contains("<div id=\"__nuxt\"><h1>Hi</h1></div>"));
        assert!(html.contains("window.__NUXT__={\"test\":true}"));
    }

    #[test]
    fn test_fragment_placeholders_untouched() {
        let html = shell().render("{title} {state}", None, None);
        assert!(html.contains("<div id=\"__nuxt\">{title} {state}</div>"));
    }

    #[test]
    fn test_values_not_expanded_again() {
        let state = serde_json::json!({ "note": "{app}" });
        let html = shell().render("<p>x</p>", Some("{state}"), Some(&state));
        assert!(html.contains("<title>{state}</title>"));
        assert!(html.contains("window.__NUXT__={\"note\":\"{app}\"}"));
        assert_eq!(html.matches("<div id=\"__nuxt\">").count(), 1);

        let html = shell().error_page(500, "{status}");
        assert!(html.contains("<div class=\"error-message\">{status}</div>"));
    }

    #[test]
    fn test_fill_placeholders() {
        let lookup = |key: &str| (key == "a").then(|| "{a}".to_string());
        assert_eq!(fill_placeholders("x{a}y{b}z{", lookup), "x{a}y{b}z{");
        assert_eq!(fill_placeholders("{{a}}", lookup), "{{a}}");
        assert_eq!(
            fill_placeholders("{a}{a}", |_| Some("1".to_string())),
            "11"
        );
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = shell().error_page(500, "Error <b>mouahahah</b>");
        assert!(html.contains("<h1 class=\"error-code\">500</h1>"));
        assert!(html.contains("Error &lt;b&gt;mouahahah&lt;/b&gt;"));
    }

    #[test]
    fn test_custom_templates() {
        let cfg = Config::from_toml_str(
            r#"
            [render]
            app_template = "<main>{app}</main><p>Made by the team</p>"
            error_template = "<h1>Error page {status}</h1>"
            "#,
        )
        .unwrap();
        let shell = AppShell::from_config(&cfg.render);
        assert_eq!(
            shell.render("x", None, None),
            "<main><div id=\"__nuxt\">x</div></main><p>Made by the team</p>"
        );
        assert!(shell.error_page(404, "gone").contains("<h1>Error page 404</h1>"));
    }
}
