//! Conversion of handler and filter return values.
//!
//! This module provides the [`Responder`] trait, which decides what a returned
//! value does to the running call: text is appended to the captured output, a
//! status tuple sets the response status, and a [`Halt`] stops the request.

use crate::halt::{DispatchError, Halt};
use crate::RequestContext;
use http::StatusCode;
use std::convert::Infallible;

/// A trait for types that can be returned from handlers and filters.
pub trait Responder {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt>;
}

/// Implementation for Result allows handlers to use `?` and return either side.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        match self {
            Ok(t) => t.respond_to(ctx),
            Err(e) => e.respond_to(ctx),
        }
    }
}

/// None writes nothing.
impl<T: Responder> Responder for Option<T> {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        match self {
            Some(t) => t.respond_to(ctx),
            None => Ok(()),
        }
    }
}

/// Implementation for (StatusCode, T) tuple allows setting a status code
/// along with the content.
impl<T: Responder> Responder for (StatusCode, T) {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        let (status, responder) = self;
        ctx.set_status(status);
        responder.respond_to(ctx)
    }
}

/// Same as above but with reversed order.
impl<T: Responder> Responder for (T, StatusCode) {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        let (responder, status) = self;
        (status, responder).respond_to(ctx)
    }
}

impl<T: Responder> Responder for Box<T> {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        (*self).respond_to(ctx)
    }
}

impl Responder for () {
    fn respond_to(self, _ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        Ok(())
    }
}

impl Responder for &'static str {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        ctx.echo(self);
        Ok(())
    }
}

impl Responder for String {
    fn respond_to(self, ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        ctx.echo(self);
        Ok(())
    }
}

impl Responder for Halt {
    fn respond_to(self, _ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        Err(self)
    }
}

impl Responder for DispatchError {
    fn respond_to(self, _ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        Err(Halt::Fatal(self))
    }
}

impl Responder for Infallible {
    fn respond_to(self, _ctx: &mut RequestContext<'_>) -> Result<(), Halt> {
        match self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halt::redirect;
    use crate::request::{Exchange, Request};
    use crate::view::BuiltinViews;
    use http::Method;

    fn respond<R: Responder>(responder: R) -> (Result<(), Halt>, Exchange, String) {
        let mut exchange = Exchange::new(Request::new(Method::GET, "/"));
        let mut output = String::new();
        let result = responder.respond_to(&mut RequestContext::new(&mut exchange, &mut output, &BuiltinViews));
        (result, exchange, output)
    }

    #[test]
    fn test_text_is_echoed() {
        let (result, _, output) = respond("hello");
        assert!(result.is_ok());
        assert_eq!(output, "hello");

        let (_, _, output) = respond(Some(String::from("world")));
        assert_eq!(output, "world");

        let (_, _, output) = respond(None::<String>);
        assert_eq!(output, "");
    }

    #[test]
    fn test_status_tuple() {
        let (_, exchange, output) = respond((StatusCode::CREATED, "made"));
        assert_eq!(exchange.status, StatusCode::CREATED);
        assert_eq!(output, "made");

        let (_, exchange, _) = respond(("gone", StatusCode::GONE));
        assert_eq!(exchange.status, StatusCode::GONE);
    }

    #[test]
    fn test_result_err_halts() {
        let (result, _, output) = respond(Err::<String, Halt>(redirect("/", 301)));
        assert!(matches!(result, Err(Halt::Redirect { status, .. }) if status == StatusCode::MOVED_PERMANENTLY));
        assert_eq!(output, "");

        let (result, _, _) = respond(Err::<(), DispatchError>(DispatchError::no_route_matched("/x")));
        assert!(matches!(result, Err(Halt::Fatal(DispatchError::NoRouteMatched { .. }))));
    }
}
