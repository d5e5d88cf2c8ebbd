use crate::extract::FromParams;
use crate::fn_trait::FnTrait;
use crate::halt::{DispatchError, Halt};
use crate::responder::Responder;
use crate::RequestContext;

use std::fmt;
use std::marker::PhantomData;

/// The polymorphic handler interface stored in the route table.
///
/// `args` are the captures of the matched route in placeholder order; the
/// request itself is reached through the context.
pub trait RequestHandler: Send + Sync {
    fn invoke(&self, ctx: &mut RequestContext<'_>, args: &[String]) -> Result<(), Halt>;
}

/// a `FnTrait` holder which represents any handler function
pub struct FnHandler<F, Args> {
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<F, Args> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

/// Wraps a function taking the context and then one argument per captured
/// placeholder.
///
/// # Example
/// ```
/// use micro_dispatch::{handler_fn, RequestContext};
///
/// fn show_post(ctx: &mut RequestContext, id: u64, action: String) -> String {
///     format!("post {id}, action '{action}', via {}", ctx.uri())
/// }
///
/// let handler = handler_fn(show_post);
/// ```
pub fn handler_fn<F, Args>(f: F) -> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    FnHandler::new(f)
}

impl<F, Args> RequestHandler for FnHandler<F, Args>
where
    F: FnTrait<Args> + Send + Sync,
    F::Output: Responder,
    Args: FromParams,
{
    fn invoke(&self, ctx: &mut RequestContext<'_>, args: &[String]) -> Result<(), Halt> {
        let args = Args::from_params(args)?;
        self.f.call(ctx, args).respond_to(ctx)
    }
}

impl<F, Args> fmt::Debug for FnHandler<F, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("f", &std::any::type_name::<F>()).finish()
    }
}

/// The built-in handler of unmatched requests: always a fatal
/// [`DispatchError::NoRouteMatched`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundHandler;

impl RequestHandler for NotFoundHandler {
    fn invoke(&self, ctx: &mut RequestContext<'_>, _args: &[String]) -> Result<(), Halt> {
        Err(DispatchError::no_route_matched(ctx.uri()).into())
    }
}

#[cfg(test)]
mod test {
    use crate::fn_trait::FnTrait;
    use crate::halt::{DispatchError, Halt};
    use crate::handler::{FnHandler, NotFoundHandler, RequestHandler};
    use crate::request::{Exchange, Request};
    use crate::view::BuiltinViews;
    use crate::RequestContext;
    use http::Method;

    fn assert_is_fn_handler<H: FnTrait<Args>, Args>(_handler: &FnHandler<H, Args>) {
        // no op
    }

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    fn invoke(handler: &dyn RequestHandler, args: &[&str]) -> (Result<(), Halt>, String) {
        let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
        let mut exchange = Exchange::new(Request::new(Method::GET, "/post/7"));
        let mut output = String::new();
        let result = handler.invoke(&mut RequestContext::new(&mut exchange, &mut output, &BuiltinViews), &args);
        (result, output)
    }

    fn show(ctx: &mut RequestContext, id: u32, action: String) -> String {
        format!("{} {id} [{action}]", ctx.uri())
    }

    #[test]
    fn assert_fn_is_request_handler_1() {
        fn get(_ctx: &mut RequestContext) {}

        let handler = FnHandler::new(get);
        assert_is_fn_handler(&handler);
        assert_is_handler(&handler);
    }

    #[test]
    fn assert_fn_is_request_handler_2() {
        fn get(_ctx: &mut RequestContext, _id: String) -> Result<(), Halt> {
            Ok(())
        }

        let handler = FnHandler::new(get);
        assert_is_fn_handler(&handler);
        assert_is_handler(&handler);
    }

    #[test]
    fn test_invoke_with_positional_args() {
        let handler = FnHandler::new(show);
        let (result, output) = invoke(&handler, &["7", ""]);
        assert!(result.is_ok());
        assert_eq!(output, "/post/7 7 []");
    }

    #[test]
    fn test_invoke_with_bad_args() {
        let handler = FnHandler::new(show);
        let (result, output) = invoke(&handler, &["seven", "edit"]);
        assert!(matches!(result, Err(Halt::Fatal(DispatchError::InvalidArgument { .. }))));
        assert_eq!(output, "");

        let (result, _) = invoke(&handler, &["7"]);
        assert!(matches!(result, Err(Halt::Fatal(DispatchError::MissingArgument { expected: 2, found: 1 }))));
    }

    #[test]
    fn test_not_found_handler() {
        let (result, _) = invoke(&NotFoundHandler, &[]);
        assert!(matches!(result, Err(Halt::Fatal(DispatchError::NoRouteMatched { uri })) if uri == "/post/7"));
    }
}
