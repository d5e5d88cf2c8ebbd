//! The view collaborator.
//!
//! The dispatcher only needs one view, [`ERROR_VIEW`], to render diagnostic
//! pages. Handlers may render any view through
//! [`RequestContext::render`](crate::RequestContext::render).

use indoc::formatdoc;
use std::collections::BTreeMap;
use thiserror::Error;

/// Name of the view used for diagnostic pages. It receives the locals
/// `title` (plain text), `message` (HTML) and optionally `diagnostics` (HTML).
pub const ERROR_VIEW: &str = "error";

pub type Locals = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
}

impl ViewError {
    pub fn template_not_found<S: ToString>(name: S) -> Self {
        Self::TemplateNotFound { name: name.to_string() }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ViewRenderer: Send + Sync {
    fn render(&self, name: &str, locals: &Locals) -> Result<String, ViewError>;
}

/// Renders the built-in error page and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinViews;

impl ViewRenderer for BuiltinViews {
    fn render(&self, name: &str, locals: &Locals) -> Result<String, ViewError> {
        if name != ERROR_VIEW {
            return Err(ViewError::template_not_found(name));
        }

        let local = |key: &str| locals.get(key).map_or("", String::as_str);
        Ok(error_page(local("title"), local("message"), local("diagnostics")))
    }
}

/// The fixed diagnostic page.
pub fn error_page(title: &str, message: &str, diagnostics: &str) -> String {
    let title = escape_html(title);
    formatdoc! {r#"
        <!DOCTYPE html>
        <html>
          <head>
            <title>{title} &ndash; Error</title>
            <style type="text/css">
              html, body {{ height: 100%; }}
              html {{ background: linear-gradient(to bottom, #cedce7 0%, #596a72 100%); }}
              body {{ box-sizing: border-box; margin: 0 auto; width: 700px; padding: 25px 50px; background: rgba(255,255,255,0.8); }}
              h1 {{ font-family: sans-serif; }}
              p {{ font-size: 1.2em; line-height: 1.4; }}
            </style>
          </head>
          <body>
            <header>
              <h1>{title}</h1>
            </header>
            <article>
              {message}
            </article>
            {diagnostics}
          </body>
        </html>
    "#, title = title, message = message, diagnostics = diagnostics}
}

/// Escapes text for use inside HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_error_view() {
        let mut locals = Locals::new();
        locals.insert("title".into(), "Oops <1>".into());
        locals.insert("message".into(), "<p>broken</p>".into());

        let page = BuiltinViews.render(ERROR_VIEW, &locals).unwrap();
        assert!(page.contains("<h1>Oops &lt;1&gt;</h1>"));
        assert!(page.contains("<p>broken</p>"));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_builtin_unknown_view() {
        let result = BuiltinViews.render("profile", &Locals::new());
        assert!(matches!(result, Err(ViewError::TemplateNotFound { name }) if name == "profile"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
