//! Request data and the per-call context handed to handlers and filters.
//!
//! This module contains:
//! - `Request`: the resolved request descriptor (uri, method, params)
//! - `PathParams`: values captured by a matched route, in placeholder order
//! - `RequestContext`: what a handler or filter sees while it runs

use crate::diagnostics::Diagnostics;
use crate::halt::{DispatchError, Halt};
use crate::view::{Locals, ViewError, ViewRenderer};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Form field that lets a POST submission stand in for `PUT` or `DELETE`.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("invalid form body: {source}")]
    InvalidForm {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("invalid request path '{path}': {source}")]
    InvalidPath { path: String, source: std::string::FromUtf8Error },
}

/// One incoming request, as seen by the router.
#[derive(Debug, Clone)]
pub struct Request {
    uri: String,
    method: Method,
    params: HashMap<String, String>,
}

impl Request {
    /// Creates a request for `uri`. An empty uri is treated as `/`.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let mut uri = uri.into();
        if uri.is_empty() {
            uri.push('/');
        }
        Self { uri, method, params: HashMap::new() }
    }

    /// Adds a request parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Builds a request from a transport request head and its body.
    ///
    /// The uri is the percent-decoded request path. A `application/x-www-form-urlencoded` body
    /// becomes the request params, and a POST carrying `_method=put` or
    /// `_method=delete` resolves to that method instead.
    pub fn from_http(parts: &http::request::Parts, body: &[u8]) -> Result<Self, RequestError> {
        let params: HashMap<String, String> = if is_form(&parts.headers) && !body.is_empty() {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)?.into_iter().collect()
        } else {
            HashMap::new()
        };

        let path = parts.uri.path();
        let uri = urlencoding::decode(path)
            .map_err(|source| RequestError::InvalidPath { path: path.to_owned(), source })?;

        let method = resolve_method(&parts.method, &params);
        let mut request = Self::new(method, uri.into_owned());
        request.params = params;
        Ok(request)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, key: impl AsRef<str>) -> Option<&str> {
        self.params.get(key.as_ref()).map(String::as_str)
    }

    /// Copies the captures of a matched route into the request params.
    pub(crate) fn attach_params(&mut self, path_params: &PathParams<'_>) {
        for (key, value) in path_params.iter() {
            self.params.insert(key.to_owned(), value.to_owned());
        }
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
}

fn resolve_method(method: &Method, params: &HashMap<String, String>) -> Method {
    if method != Method::POST {
        return method.clone();
    }

    match params.get(METHOD_OVERRIDE_FIELD).map(|value| value.to_ascii_lowercase()).as_deref() {
        Some("put") => Method::PUT,
        Some("delete") => Method::DELETE,
        _ => Method::POST,
    }
}

/// Values captured by a matched route, in placeholder declaration order.
#[derive(Debug, Clone)]
pub struct PathParams<'router> {
    keys: &'router [String],
    values: Vec<String>,
}

impl<'router> PathParams<'router> {
    pub(crate) fn new(keys: &'router [String], values: Vec<String>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self { keys, values }
    }

    #[inline]
    pub fn empty() -> Self {
        Self { keys: &[], values: Vec::new() }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Gets a captured value by placeholder name.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.keys.iter().position(|k| k == key).map(|i| self.values[i].as_str())
    }

    pub fn keys(&self) -> &'router [String] {
        self.keys
    }

    /// Captured values, positionally.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys.iter().map(String::as_str).zip(self.values.iter().map(String::as_str))
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// Mutable state of one request while it is being dispatched.
#[derive(Debug)]
pub(crate) struct Exchange {
    pub(crate) request: Request,
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) diagnostics: Diagnostics,
}

impl Exchange {
    pub(crate) fn new(request: Request) -> Self {
        Self { request, status: StatusCode::OK, headers: HeaderMap::new(), diagnostics: Diagnostics::new() }
    }
}

/// The context of one handler or filter call.
///
/// It gives access to the request, to the response status and headers, to the
/// request diagnostics, and to the output buffer of the running call.
pub struct RequestContext<'a> {
    exchange: &'a mut Exchange,
    output: &'a mut String,
    views: &'a dyn ViewRenderer,
}

impl<'a> RequestContext<'a> {
    pub(crate) fn new(exchange: &'a mut Exchange, output: &'a mut String, views: &'a dyn ViewRenderer) -> Self {
        Self { exchange, output, views }
    }

    pub fn request(&self) -> &Request {
        &self.exchange.request
    }

    pub fn uri(&self) -> &str {
        self.exchange.request.uri()
    }

    pub fn method(&self) -> &Method {
        self.exchange.request.method()
    }

    /// Request params, including the captures of the matched route.
    pub fn params(&self) -> &HashMap<String, String> {
        self.exchange.request.params()
    }

    pub fn param(&self, key: impl AsRef<str>) -> Option<&str> {
        self.exchange.request.param(key)
    }

    /// Appends text to the output of the running call.
    pub fn echo(&mut self, text: impl AsRef<str>) {
        self.output.push_str(text.as_ref());
    }

    /// Output written by the running call so far.
    pub fn output(&self) -> &str {
        self.output
    }

    pub fn status(&self) -> StatusCode {
        self.exchange.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.exchange.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.exchange.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.exchange.headers
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.exchange.diagnostics
    }

    #[track_caller]
    pub fn warn(&mut self, message: impl Into<String>) {
        self.exchange.diagnostics.warning(message);
    }

    #[track_caller]
    pub fn notice(&mut self, message: impl Into<String>) {
        self.exchange.diagnostics.notice(message);
    }

    /// Renders a view into the output. A missing view halts the request.
    pub fn render(&mut self, name: &str, locals: &Locals) -> Result<(), Halt> {
        match self.views.render(name, locals) {
            Ok(text) => {
                self.output.push_str(&text);
                Ok(())
            }
            Err(ViewError::TemplateNotFound { name }) => Err(DispatchError::missing_template(name).into()),
        }
    }
}

impl fmt::Write for RequestContext<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext").field("exchange", &self.exchange).field("output", &self.output).finish()
    }
}
