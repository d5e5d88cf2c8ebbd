//! A small request router and dispatcher.
//!
//! Routes map a `(method, uri pattern)` pair to a handler. Patterns are literal
//! (`/about`) or contain `<name>` placeholders and optional `( ... )` groups
//! (`/post/<id>(/<action>)`); static routes always win, dynamic routes are
//! tried in registration order. Captures reach the handler as positional
//! arguments. Before and after filters run around every matched handler.
//!
//! ```
//! use micro_dispatch::router::{get, Router};
//! use micro_dispatch::{handler_fn, Dispatcher, Request, RequestContext};
//! use http::{Method, StatusCode};
//!
//! fn show_post(_ctx: &mut RequestContext, id: u32, action: String) -> String {
//!     format!("post {id}, action '{action}'")
//! }
//!
//! let router = Router::builder()
//!     .route("/post/<id>(/<action>)", get(handler_fn(show_post)))
//!     .build()
//!     .unwrap();
//! let dispatcher = Dispatcher::builder().router(router).build().unwrap();
//!
//! let response = dispatcher.handle(Request::new(Method::GET, "/post/7/edit"));
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body().as_bytes(), b"post 7, action 'edit'");
//!
//! let response = dispatcher.handle(Request::new(Method::GET, "/nothing/here"));
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! ```

mod body;
mod dispatcher;
mod fn_trait;
mod halt;
mod handler;
mod invocation;
mod request;
mod responder;

pub mod diagnostics;
pub mod extract;
pub mod pattern;
pub mod router;
pub mod view;

pub use body::ResponseBody;
pub use dispatcher::{BuildError, Dispatcher, DispatcherBuilder};
pub use fn_trait::FnTrait;
pub use halt::{fatal, redirect, redirect_found, DispatchError, Halt};
pub use handler::{handler_fn, FnHandler, NotFoundHandler, RequestHandler};
pub use invocation::PendingInvocation;
pub use request::{PathParams, Request, RequestContext, RequestError, METHOD_OVERRIDE_FIELD};
pub use responder::Responder;
