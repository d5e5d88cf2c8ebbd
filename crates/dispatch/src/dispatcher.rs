//! The request lifecycle.
//!
//! [`Dispatcher::handle`] drives one request through
//! `Resolving -> Matched | Unmatched -> BeforeFiltering -> Invoking -> AfterFiltering -> Done`:
//!
//! 1. resolve the route for the request method and uri;
//! 2. unmatched requests go straight to the default handler, without filters;
//! 3. matched captures are attached to the request params;
//! 4. before filters, the handler invocation and after filters run in order,
//!    their output concatenated into the response body.
//!
//! A [`Halt`] at any step ends the request: a redirect becomes a bodiless
//! redirect response, a fatal error becomes the diagnostic error page. Output
//! produced before the halt is discarded.

use crate::body::ResponseBody;
use crate::halt::{DispatchError, Halt};
use crate::handler::{NotFoundHandler, RequestHandler};
use crate::invocation::PendingInvocation;
use crate::request::{Exchange, Request};
use crate::router::filter::{FilterTable, Phase};
use crate::router::Router;
use crate::view::{escape_html, error_page, BuiltinViews, Locals, ViewError, ViewRenderer, ERROR_VIEW};
use crate::RequestContext;

use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, Response, StatusCode};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("router must be set")]
    MissingRouter,

    #[error("invalid content type '{content_type}'")]
    InvalidContentType { content_type: String },
}

/// Lifecycle stages, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Unmatched,
    Matched,
    BeforeFiltering,
    Invoking,
    AfterFiltering,
    Done,
}

pub struct DispatcherBuilder {
    router: Option<Router>,
    filters: FilterTable,
    default_handler: Option<Box<dyn RequestHandler>>,
    views: Option<Box<dyn ViewRenderer>>,
    production: bool,
    content_type: mime::Mime,
}

impl DispatcherBuilder {
    fn new() -> Self {
        Self {
            router: None,
            filters: FilterTable::empty(),
            default_handler: None,
            views: None,
            production: false,
            content_type: mime::TEXT_HTML_UTF_8,
        }
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn filters(mut self, filters: FilterTable) -> Self {
        self.filters = filters;
        self
    }

    /// Replaces the built-in not-found handler.
    pub fn default_handler(mut self, request_handler: impl RequestHandler + 'static) -> Self {
        self.default_handler = Some(Box::new(request_handler));
        self
    }

    pub fn views(mut self, views: impl ViewRenderer + 'static) -> Self {
        self.views = Some(Box::new(views));
        self
    }

    /// In production mode error pages do not list the request diagnostics.
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Content type of responses that do not set one.
    pub fn content_type(mut self, content_type: mime::Mime) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let router = self.router.ok_or(BuildError::MissingRouter)?;
        let content_type = HeaderValue::from_str(self.content_type.as_ref())
            .map_err(|_| BuildError::InvalidContentType { content_type: self.content_type.to_string() })?;

        Ok(Dispatcher {
            router,
            filters: self.filters,
            default_handler: self.default_handler.unwrap_or_else(|| Box::new(NotFoundHandler)),
            views: self.views.unwrap_or_else(|| Box::new(BuiltinViews)),
            production: self.production,
            content_type,
        })
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("router", &self.router)
            .field("filters", &self.filters)
            .field("production", &self.production)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// The application: routes, filters and the collaborators used to answer requests.
///
/// Built once at startup and read-only afterwards.
pub struct Dispatcher {
    router: Router,
    filters: FilterTable,
    default_handler: Box<dyn RequestHandler>,
    views: Box<dyn ViewRenderer>,
    production: bool,
    content_type: HeaderValue,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// Handles one request and produces its response.
    pub fn handle(&self, request: Request) -> Response<ResponseBody> {
        let mut exchange = Exchange::new(request);
        let mut body = String::new();

        match self.run(&mut exchange, &mut body) {
            Ok(()) => {
                debug!(stage = ?Stage::Done, uri = exchange.request.uri(), status = %exchange.status, "request done");
                self.ok_response(exchange, body)
            }
            Err(Halt::Redirect { status, location }) => {
                debug!(uri = exchange.request.uri(), %status, ?location, "request redirected");
                redirect_response(status, location)
            }
            Err(Halt::Fatal(e)) => {
                error!(cause = %e, method = %exchange.request.method(), uri = exchange.request.uri(), "request halted");
                self.error_response(&e, &exchange)
            }
        }
    }

    fn run(&self, exchange: &mut Exchange, body: &mut String) -> Result<(), Halt> {
        let views = self.views.as_ref();

        let Some(route_match) = self.router.at(exchange.request.method(), exchange.request.uri()) else {
            debug!(stage = ?Stage::Unmatched, uri = exchange.request.uri());
            let output = PendingInvocation::new(self.default_handler.as_ref(), Vec::new()).execute(exchange, views)?;
            body.push_str(&output);
            return Ok(());
        };

        debug!(stage = ?Stage::Matched, uri = exchange.request.uri(), params = ?route_match.params());
        exchange.request.attach_params(route_match.params());
        let handler = route_match.handler();
        let args = route_match.into_params().into_values();

        debug!(stage = ?Stage::BeforeFiltering);
        self.filters.trigger(Phase::Before, &mut RequestContext::new(exchange, body, views))?;

        debug!(stage = ?Stage::Invoking);
        let output = PendingInvocation::new(handler, args).execute(exchange, views)?;
        body.push_str(&output);

        debug!(stage = ?Stage::AfterFiltering);
        self.filters.trigger(Phase::After, &mut RequestContext::new(exchange, body, views))?;

        Ok(())
    }

    fn ok_response(&self, exchange: Exchange, body: String) -> Response<ResponseBody> {
        let Exchange { status, mut headers, .. } = exchange;
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, self.content_type.clone());
        }

        let mut response = Response::new(ResponseBody::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }

    fn error_response(&self, e: &DispatchError, exchange: &Exchange) -> Response<ResponseBody> {
        let mut locals = Locals::new();
        locals.insert("title".to_owned(), e.title());
        locals.insert("message".to_owned(), e.message());
        if !self.production && !exchange.diagnostics.is_empty() {
            locals.insert("diagnostics".to_owned(), self.render_diagnostics(exchange));
        }

        let (status, page) = match self.views.render(ERROR_VIEW, &locals) {
            Ok(page) => (e.status(), page),
            Err(ViewError::TemplateNotFound { name }) => {
                let missing = DispatchError::missing_template(name);
                error!(cause = %missing, "error view is not available, using the built-in page");
                (missing.status(), error_page(&missing.title(), &missing.message(), ""))
            }
        };

        let mut response = Response::new(ResponseBody::from(page));
        *response.status_mut() = status;
        response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        response
    }

    fn render_diagnostics(&self, exchange: &Exchange) -> String {
        let mut html = String::from("<section class=\"diagnostics\">\n");
        for diagnostic in &exchange.diagnostics {
            html.push_str(&format!(
                "<p class=\"{severity}\"><em>{severity}:</em> {message} in file <code>{file}</code> on line <code>{line}</code>.</p>\n",
                severity = diagnostic.severity(),
                message = escape_html(diagnostic.message()),
                file = escape_html(diagnostic.file()),
                line = diagnostic.line(),
            ));
        }
        html.push_str("</section>");
        html
    }
}

fn redirect_response(status: StatusCode, location: HeaderValue) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(LOCATION, location);
    response
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("filters", &self.filters)
            .field("production", &self.production)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
