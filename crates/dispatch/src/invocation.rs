use crate::handler::RequestHandler;
use crate::halt::Halt;
use crate::request::Exchange;
use crate::view::ViewRenderer;
use crate::RequestContext;
use tracing::debug;

/// A resolved handler bound to its argument list, waiting to run.
///
/// Executing consumes the invocation, so it runs exactly once. Output is
/// captured into a buffer owned by this single execution: it is returned on
/// success and dropped with the invocation when the handler halts.
pub struct PendingInvocation<'h> {
    handler: &'h dyn RequestHandler,
    args: Vec<String>,
}

impl<'h> PendingInvocation<'h> {
    pub fn new(handler: &'h dyn RequestHandler, args: Vec<String>) -> Self {
        Self { handler, args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn execute(self, exchange: &mut Exchange, views: &dyn ViewRenderer) -> Result<String, Halt> {
        debug!(uri = exchange.request.uri(), args = ?self.args, "invoking handler");
        let mut output = String::new();
        self.handler.invoke(&mut RequestContext::new(exchange, &mut output, views), &self.args)?;
        Ok(output)
    }
}

impl std::fmt::Debug for PendingInvocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingInvocation").field("args", &self.args).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::halt::fatal;
    use crate::handler_fn;
    use crate::request::Request;
    use crate::view::BuiltinViews;
    use http::Method;

    fn greet(ctx: &mut RequestContext, name: String) -> String {
        ctx.echo("hello, ");
        name
    }

    fn explode(ctx: &mut RequestContext) -> Result<(), Halt> {
        ctx.echo("partial output");
        Err(fatal("Boom", "<p>boom</p>"))
    }

    #[test]
    fn test_execute_captures_output() {
        let handler = handler_fn(greet);
        let mut exchange = Exchange::new(Request::new(Method::GET, "/hello/perry"));

        let invocation = PendingInvocation::new(&handler, vec!["perry".to_owned()]);
        assert_eq!(invocation.args(), ["perry"]);
        let output = invocation.execute(&mut exchange, &BuiltinViews).unwrap();
        assert_eq!(output, "hello, perry");
    }

    #[test]
    fn test_failed_execution_does_not_leak_output() {
        let failing = handler_fn(explode);
        let mut exchange = Exchange::new(Request::new(Method::GET, "/"));

        let result = PendingInvocation::new(&failing, vec![]).execute(&mut exchange, &BuiltinViews);
        assert!(matches!(result, Err(Halt::Fatal(_))));

        let handler = handler_fn(greet);
        let output = PendingInvocation::new(&handler, vec!["again".to_owned()])
            .execute(&mut exchange, &BuiltinViews)
            .unwrap();
        assert_eq!(output, "hello, again");
    }
}
