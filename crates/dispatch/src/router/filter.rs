//! Before and after filters.
//!
//! Filters are registered for a [`Phase`] with a route pattern and are shared by
//! every method: only the request uri is matched. Unlike route resolution, every
//! matching filter of a phase runs, in registration order. A filter can stop the
//! whole request by returning a [`Halt`].
//!
//! # Examples
//!
//! ```
//! use micro_dispatch::router::filter::FilterTable;
//!
//! let filters = FilterTable::builder()
//!     .before("/admin/<section>", |ctx, captures| {
//!         ctx.notice(format!("entering admin section {:?}", captures));
//!     })
//!     .after("/", |ctx, _| ctx.echo("<!-- served by micro-dispatch -->"))
//!     .build()
//!     .unwrap();
//! assert_eq!(filters.len(), 2);
//! ```

use crate::halt::Halt;
use crate::pattern::{CompileError, RoutePattern};
use crate::responder::Responder;
use crate::RequestContext;
use std::fmt;
use tracing::debug;

/// When a filter runs relative to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// Core trait for filter callbacks.
///
/// `captures` is `None` for a static filter pattern and the ordered captures
/// for a dynamic one. Closures of the matching shape implement it.
pub trait FilterCallback: Send + Sync {
    fn call(&self, ctx: &mut RequestContext<'_>, captures: Option<&[String]>) -> Result<(), Halt>;
}

impl<F, R> FilterCallback for F
where
    F: Fn(&mut RequestContext<'_>, Option<&[String]>) -> R + Send + Sync,
    R: Responder,
{
    fn call(&self, ctx: &mut RequestContext<'_>, captures: Option<&[String]>) -> Result<(), Halt> {
        (self)(ctx, captures).respond_to(ctx)
    }
}

/// A registered filter.
pub struct Filter {
    pattern: RoutePattern,
    callback: Box<dyn FilterCallback>,
    phase: Phase,
}

impl Filter {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("pattern", &self.pattern.source()).field("phase", &self.phase).finish()
    }
}

/// The before and after filters of an application.
#[derive(Debug, Default)]
pub struct FilterTable {
    before: Vec<Filter>,
    after: Vec<Filter>,
}

impl FilterTable {
    pub fn builder() -> FilterTableBuilder {
        FilterTableBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Filters of a phase in registration order.
    pub fn filters(&self, phase: Phase) -> &[Filter] {
        match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every filter of `phase` whose pattern matches the request uri.
    ///
    /// Stops at the first halt, which aborts the request.
    pub fn trigger(&self, phase: Phase, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        for filter in self.filters(phase) {
            let Some(captures) = filter.pattern.matches(ctx.uri()) else {
                continue;
            };

            debug!(?phase, uri = ctx.uri(), pattern = filter.pattern.source(), "filter triggered");
            let captures = (!filter.pattern.is_static()).then_some(captures.as_slice());
            filter.callback.call(ctx, captures)?;
        }
        Ok(())
    }
}

/// Collects filters in registration order until [`FilterTableBuilder::build`] compiles them.
#[derive(Default)]
pub struct FilterTableBuilder {
    items: Vec<(Phase, String, Box<dyn FilterCallback>)>,
}

impl FilterTableBuilder {
    /// Registers a filter for `phase`.
    pub fn filter<C>(mut self, phase: Phase, pattern: impl Into<String>, callback: C) -> Self
    where
        C: FilterCallback + 'static,
    {
        self.items.push((phase, pattern.into(), Box::new(callback)));
        self
    }

    /// Registers a filter that runs before the handler.
    pub fn before<F, R>(self, pattern: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>, Option<&[String]>) -> R + Send + Sync + 'static,
        R: Responder,
    {
        self.filter(Phase::Before, pattern, callback)
    }

    /// Registers a filter that runs after the handler.
    pub fn after<F, R>(self, pattern: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut RequestContext<'_>, Option<&[String]>) -> R + Send + Sync + 'static,
        R: Responder,
    {
        self.filter(Phase::After, pattern, callback)
    }

    pub fn build(self) -> Result<FilterTable, CompileError> {
        let mut table = FilterTable::default();
        for (phase, pattern, callback) in self.items {
            let filter = Filter { pattern: RoutePattern::compile(&pattern)?, callback, phase };
            match phase {
                Phase::Before => table.before.push(filter),
                Phase::After => table.after.push(filter),
            }
        }
        Ok(table)
    }
}

impl fmt::Debug for FilterTableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterTableBuilder").field("filters", &self.items.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halt::{fatal, DispatchError};
    use crate::request::{Exchange, Request};
    use crate::view::BuiltinViews;
    use http::Method;

    fn trigger(filters: &FilterTable, phase: Phase, uri: &str) -> (Result<(), Halt>, String) {
        let mut exchange = Exchange::new(Request::new(Method::GET, uri));
        let mut output = String::new();
        let result = filters.trigger(phase, &mut RequestContext::new(&mut exchange, &mut output, &BuiltinViews));
        (result, output)
    }

    #[test]
    fn test_all_matching_filters_run() {
        let filters = FilterTable::builder()
            .before("/admin/<page>", |ctx, _| ctx.echo("[a]"))
            .before("/admin/users", |ctx, _| ctx.echo("[b]"))
            .before("/<section>/<page>", |ctx, _| ctx.echo("[c]"))
            .before("/public", |ctx, _| ctx.echo("[d]"))
            .build()
            .unwrap();

        let (result, output) = trigger(&filters, Phase::Before, "/admin/users");
        assert!(result.is_ok());
        assert_eq!(output, "[a][b][c]");
    }

    #[test]
    fn test_all_matching_after_filters_run() {
        let filters = FilterTable::builder()
            .after("/post/<id>(/<action>)", |ctx, _| ctx.echo("[a]"))
            .after("/post/7/edit", |ctx, _| ctx.echo("[b]"))
            .after("/post/<id>", |ctx, _| ctx.echo("[x]"))
            .after("/<kind>/<id>/<action>", |ctx, _| ctx.echo("[c]"))
            .before("/post/7/edit", |ctx, _| ctx.echo("[before]"))
            .build()
            .unwrap();

        let (result, output) = trigger(&filters, Phase::After, "/post/7/edit");
        assert!(result.is_ok());
        assert_eq!(output, "[a][b][c]");
    }

    #[test]
    fn test_phases_are_separate() {
        let filters = FilterTable::builder()
            .before("/", |ctx, _| ctx.echo("before"))
            .after("/", |ctx, _| ctx.echo("after"))
            .build()
            .unwrap();

        assert_eq!(filters.filters(Phase::Before).len(), 1);
        assert_eq!(filters.filters(Phase::After).len(), 1);
        assert_eq!(trigger(&filters, Phase::Before, "/").1, "before");
        assert_eq!(trigger(&filters, Phase::After, "/").1, "after");
    }

    #[test]
    fn test_filter_captures() {
        let filters = FilterTable::builder()
            .before("/post/<id>(/<action>)", |ctx, captures| {
                ctx.echo(format!("{captures:?}"));
            })
            .before("/post/7", |ctx, captures| {
                ctx.echo(format!("{captures:?}"));
            })
            .build()
            .unwrap();

        let (_, output) = trigger(&filters, Phase::Before, "/post/7");
        assert_eq!(output, r#"Some(["7", ""])None"#);
    }

    #[test]
    fn test_halt_stops_the_phase() {
        let filters = FilterTable::builder()
            .before("/", |_ctx, _| Err::<(), Halt>(fatal("Denied", "<p>no</p>")))
            .before("/", |ctx, _| ctx.echo("unreachable"))
            .build()
            .unwrap();

        let (result, output) = trigger(&filters, Phase::Before, "/");
        assert!(matches!(result, Err(Halt::Fatal(DispatchError::Custom { .. }))));
        assert_eq!(output, "");
    }

    #[test]
    fn test_unmatched_filters_do_not_run() {
        let filters = FilterTable::builder().after("/only/<this>", |ctx, _| ctx.echo("x")).build().unwrap();
        let (result, output) = trigger(&filters, Phase::After, "/other");
        assert!(result.is_ok());
        assert!(output.is_empty());
    }
}
