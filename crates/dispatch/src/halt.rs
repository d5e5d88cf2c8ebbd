//! Request-terminating outcomes.
//!
//! A handler or filter stops the request lifecycle by returning a [`Halt`]:
//! either a redirect, or a fatal [`DispatchError`] that the dispatcher turns into
//! the diagnostic error page. Nothing runs after a halt, and any output captured
//! so far is discarded.

use crate::view::escape_html;
use http::{HeaderValue, StatusCode};
use thiserror::Error;

/// The fatal conditions of a dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no route matched '{uri}'")]
    NoRouteMatched { uri: String },

    #[error("invalid redirect code: {code}")]
    InvalidRedirectCode { code: u16 },

    #[error("invalid redirect location: {location:?}")]
    InvalidRedirectLocation { location: String },

    #[error("template not found: {name}")]
    MissingTemplate { name: String },

    #[error("handler expects {expected} arguments, but only {found} were captured")]
    MissingArgument { expected: usize, found: usize },

    #[error("invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("{title}")]
    Custom { title: String, message: String },
}

impl DispatchError {
    pub fn no_route_matched<S: ToString>(uri: S) -> Self {
        Self::NoRouteMatched { uri: uri.to_string() }
    }

    pub fn missing_template<S: ToString>(name: S) -> Self {
        Self::MissingTemplate { name: name.to_string() }
    }

    pub fn invalid_argument<V: ToString, R: ToString>(value: V, reason: R) -> Self {
        Self::InvalidArgument { value: value.to_string(), reason: reason.to_string() }
    }

    pub fn custom<T: ToString, M: ToString>(title: T, message: M) -> Self {
        Self::Custom { title: title.to_string(), message: message.to_string() }
    }

    /// The status code of the diagnostic response.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoRouteMatched { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text title of the diagnostic page.
    pub fn title(&self) -> String {
        match self {
            Self::NoRouteMatched { .. } => "404 Not Found".to_owned(),
            Self::InvalidRedirectCode { .. } => "Invalid Redirect Code".to_owned(),
            Self::InvalidRedirectLocation { .. } => "Invalid Redirect Location".to_owned(),
            Self::MissingTemplate { .. } => "Missing Template".to_owned(),
            Self::MissingArgument { .. } | Self::InvalidArgument { .. } => "Invalid Route Arguments".to_owned(),
            Self::Custom { title, .. } => title.clone(),
        }
    }

    /// HTML body of the diagnostic page.
    ///
    /// Values that come from the request are escaped, a [`DispatchError::Custom`]
    /// message is trusted markup.
    pub fn message(&self) -> String {
        match self {
            Self::NoRouteMatched { uri } => format!(
                "<p>No registered route knows what to do with a request like: <code>{}</code></p>",
                escape_html(uri)
            ),
            Self::InvalidRedirectCode { code } => {
                format!("<p>The code {code} is not a valid redirect code. Use 301, 302 or 307.</p>")
            }
            Self::InvalidRedirectLocation { location } => format!(
                "<p>The location <code>{}</code> can not be sent as a redirect header.</p>",
                escape_html(location)
            ),
            Self::MissingTemplate { name } => {
                format!("<p>The template <code>{}</code> could not be found.</p>", escape_html(name))
            }
            Self::MissingArgument { .. } | Self::InvalidArgument { .. } => {
                format!("<p><strong>Error:</strong> {}</p>", escape_html(&self.to_string()))
            }
            Self::Custom { message, .. } => message.clone(),
        }
    }
}

/// Stops the current request.
#[derive(Error, Debug)]
pub enum Halt {
    #[error("redirect {status} to {location:?}")]
    Redirect { status: StatusCode, location: HeaderValue },

    #[error(transparent)]
    Fatal(#[from] DispatchError),
}

impl Halt {
    /// Returns the fatal error behind this halt, if any.
    pub fn as_fatal(&self) -> Option<&DispatchError> {
        match self {
            Halt::Fatal(e) => Some(e),
            Halt::Redirect { .. } => None,
        }
    }
}

/// Builds a redirect halt.
///
/// Only 301, 302 and 307 are accepted; any other code is a fatal
/// [`DispatchError::InvalidRedirectCode`].
///
/// # Example
/// ```
/// use micro_dispatch::{redirect, Halt};
/// use http::StatusCode;
///
/// let halt = redirect("/login", 307);
/// assert!(matches!(halt, Halt::Redirect { status, .. } if status == StatusCode::TEMPORARY_REDIRECT));
///
/// let halt = redirect("/login", 418);
/// assert!(halt.as_fatal().is_some());
/// ```
pub fn redirect<S: Into<String>>(location: S, code: u16) -> Halt {
    let status = match code {
        301 => StatusCode::MOVED_PERMANENTLY,
        302 => StatusCode::FOUND,
        307 => StatusCode::TEMPORARY_REDIRECT,
        _ => return DispatchError::InvalidRedirectCode { code }.into(),
    };

    let location = location.into();
    match HeaderValue::try_from(location.as_str()) {
        Ok(location) => Halt::Redirect { status, location },
        Err(_) => DispatchError::InvalidRedirectLocation { location }.into(),
    }
}

/// Builds a `302 Found` redirect halt.
pub fn redirect_found<S: Into<String>>(location: S) -> Halt {
    redirect(location, 302)
}

/// Builds a fatal halt rendered with the given title and HTML message.
pub fn fatal<T: ToString, M: ToString>(title: T, message: M) -> Halt {
    DispatchError::custom(title, message).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_codes() {
        for (code, status) in
            [(301, StatusCode::MOVED_PERMANENTLY), (302, StatusCode::FOUND), (307, StatusCode::TEMPORARY_REDIRECT)]
        {
            match redirect("/target", code) {
                Halt::Redirect { status: actual, location } => {
                    assert_eq!(actual, status);
                    assert_eq!(location, "/target");
                }
                Halt::Fatal(e) => panic!("unexpected fatal: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_redirect_code_is_fatal() {
        let halt = redirect("/target", 418);
        assert!(matches!(halt, Halt::Fatal(DispatchError::InvalidRedirectCode { code: 418 })));
        assert_eq!(halt.as_fatal().map(DispatchError::status), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_invalid_redirect_location_is_fatal() {
        let halt = redirect_found("/bad\nlocation");
        assert!(matches!(halt, Halt::Fatal(DispatchError::InvalidRedirectLocation { .. })));
    }

    #[test]
    fn test_not_found_message_escapes_uri() {
        let e = DispatchError::no_route_matched("/<script>");
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
        assert_eq!(e.title(), "404 Not Found");
        assert!(e.message().contains("<code>/&lt;script&gt;</code>"));
    }

    #[test]
    fn test_custom_message_is_markup() {
        let halt = fatal("Broken", "<p>it <em>broke</em></p>");
        let e = halt.as_fatal().unwrap();
        assert_eq!(e.title(), "Broken");
        assert_eq!(e.message(), "<p>it <em>broke</em></p>");
    }
}
