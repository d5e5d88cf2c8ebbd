//! Route table and matcher.
//!
//! Routes are registered per method through [`RouterBuilder`] and compiled once
//! by [`Router::builder`]`...build()`. Resolution for a `(method, uri)` pair:
//!
//! 1. an exact lookup among the static routes of the method, which always wins;
//! 2. otherwise the dynamic routes of the method, in registration order, first
//!    match wins;
//! 3. otherwise no match.

pub mod filter;

use crate::handler::RequestHandler;
use crate::pattern::{CompileError, RoutePattern};
use crate::PathParams;

use http::Method;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Main router structure, one [`RouteTable`] per method.
pub struct Router {
    tables: HashMap<Method, RouteTable>,
}

/// The routes of a single method.
#[derive(Default)]
pub struct RouteTable {
    statics: HashMap<String, Route>,
    dynamics: Vec<Route>,
}

/// A registered route. Immutable once the router is built.
pub struct Route {
    method: Method,
    pattern: RoutePattern,
    handler: Box<dyn RequestHandler>,
}

/// Result of matching a route: the route and its ordered captures.
pub struct RouteMatch<'router> {
    route: &'router Route,
    params: PathParams<'router>,
}

impl Router {
    /// Creates a new, empty router builder
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Resolves a request against the routes of `method`.
    pub fn at<'router>(&'router self, method: &Method, uri: &str) -> Option<RouteMatch<'router>> {
        let route_match = self.tables.get(method).and_then(|table| table.at(uri));
        match &route_match {
            Some(matched) => debug!(%method, uri, pattern = matched.route.pattern.source(), "route matched"),
            None => debug!(%method, uri, "no route matched"),
        }
        route_match
    }

    /// Gets the route table of a method
    pub fn table(&self, method: &Method) -> Option<&RouteTable> {
        self.tables.get(method)
    }

    /// Total number of registered routes
    pub fn len(&self) -> usize {
        self.tables.values().map(RouteTable::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteTable {
    fn insert(&mut self, route: Route) {
        if route.pattern.is_static() {
            // same literal pattern: the later registration replaces the earlier one
            self.statics.insert(route.pattern.source().to_owned(), route);
        } else {
            self.dynamics.push(route);
        }
    }

    /// Matches a uri against this table.
    pub fn at(&self, uri: &str) -> Option<RouteMatch<'_>> {
        if let Some(route) = self.statics.get(uri) {
            return Some(RouteMatch { route, params: PathParams::empty() });
        }

        self.dynamics.iter().find_map(|route| {
            route
                .pattern
                .matches(uri)
                .map(|values| RouteMatch { route, params: PathParams::new(route.pattern.keys(), values) })
        })
    }

    /// Dynamic routes, in registration order.
    pub fn dynamic_routes(&self) -> &[Route] {
        &self.dynamics
    }

    pub fn static_route(&self, pattern: &str) -> Option<&Route> {
        self.statics.get(pattern)
    }

    pub fn len(&self) -> usize {
        self.statics.len() + self.dynamics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Gets the request handler for this route
    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }
}

impl<'router> RouteMatch<'router> {
    pub fn route(&self) -> &'router Route {
        self.route
    }

    /// Gets the handler of the matched route
    pub fn handler(&self) -> &'router dyn RequestHandler {
        self.route.handler.as_ref()
    }

    /// Gets the captured path parameters
    pub fn params(&self) -> &PathParams<'router> {
        &self.params
    }

    pub fn into_params(self) -> PathParams<'router> {
        self.params
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("tables", &self.tables).finish()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("statics", &self.statics.keys().collect::<Vec<_>>())
            .field("dynamics", &self.dynamics.iter().map(|r| r.pattern.source()).collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("method", &self.method).field("pattern", &self.pattern.source()).finish()
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("route", &self.route).field("params", &self.params).finish()
    }
}

/// Collects routes in registration order until [`RouterBuilder::build`] compiles them.
#[derive(Default)]
pub struct RouterBuilder {
    items: Vec<(String, RouterItemBuilder)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    ///
    /// # Example
    /// ```
    /// use micro_dispatch::router::{get, post, Router};
    /// use micro_dispatch::{handler_fn, RequestContext};
    ///
    /// fn index(_ctx: &mut RequestContext) -> &'static str {
    ///     "hi there"
    /// }
    ///
    /// fn show(_ctx: &mut RequestContext, id: String) -> String {
    ///     format!("user {id}")
    /// }
    ///
    /// let router = Router::builder()
    ///     .route("/", get(handler_fn(index)))
    ///     .route("/user/<id>", get(handler_fn(show)))
    ///     .route("/user/<id>", post(handler_fn(show)))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(router.len(), 3);
    /// ```
    pub fn route(mut self, pattern: impl Into<String>, item_builder: RouterItemBuilder) -> Self {
        self.items.push((pattern.into(), item_builder));
        self
    }

    /// Registers a route for an arbitrary method.
    pub fn register<H: RequestHandler + 'static>(self, method: Method, pattern: impl Into<String>, handler: H) -> Self {
        self.route(pattern, RouterItemBuilder { method, handler: Box::new(handler) })
    }

    /// Compiles every pattern and builds the router.
    pub fn build(self) -> Result<Router, CompileError> {
        let mut tables: HashMap<Method, RouteTable> = HashMap::new();

        for (pattern, item) in self.items {
            let pattern = RoutePattern::compile(&pattern)?;
            let route = Route { method: item.method, pattern, handler: item.handler };
            tables.entry(route.method.clone()).or_default().insert(route);
        }

        let router = Router { tables };
        info!(routes = router.len(), methods = router.tables.len(), "router built");
        Ok(router)
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder").field("routes", &self.items.len()).finish()
    }
}

macro_rules! method_router_item {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Creates a route item for HTTP ", stringify!($upper_case_method), " requests.")]
        pub fn $method<H: RequestHandler + 'static>(handler: H) -> RouterItemBuilder {
            RouterItemBuilder { method: Method::$upper_case_method, handler: Box::new(handler) }
        }
    };
}

method_router_item!(get, GET);
method_router_item!(post, POST);
method_router_item!(put, PUT);
method_router_item!(delete, DELETE);
method_router_item!(head, HEAD);
method_router_item!(options, OPTIONS);
method_router_item!(patch, PATCH);

/// A handler bound to the method it answers.
pub struct RouterItemBuilder {
    method: Method,
    handler: Box<dyn RequestHandler>,
}

impl fmt::Debug for RouterItemBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItemBuilder").field("method", &self.method).finish_non_exhaustive()
    }
}
