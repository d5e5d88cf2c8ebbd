use http::{Method, StatusCode};
use micro_dispatch::router::filter::FilterTable;
use micro_dispatch::router::{get, post, put, Router};
use micro_dispatch::{handler_fn, redirect, Dispatcher, Halt, Request, RequestContext};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn hello_world(ctx: &mut RequestContext) {
    ctx.echo("<h1>Hi there.</h1>");

    let diagnostics: Vec<String> = ctx.diagnostics().iter().map(ToString::to_string).collect();
    for diagnostic in diagnostics {
        ctx.echo(format!("<p>{diagnostic}</p>"));
    }
}

fn show_user(_ctx: &mut RequestContext, id: u64) -> String {
    format!("<p>user #{id}</p>")
}

fn show_post(_ctx: &mut RequestContext, id: u64, action: String) -> String {
    match action.as_str() {
        "" => format!("<p>post #{id}</p>"),
        action => format!("<p>{action} post #{id}</p>"),
    }
}

fn create_post(ctx: &mut RequestContext) -> (StatusCode, String) {
    let title = ctx.param("title").unwrap_or("untitled").to_owned();
    (StatusCode::CREATED, format!("<p>created '{title}'</p>"))
}

fn update_post(_ctx: &mut RequestContext, id: u64) -> String {
    format!("<p>updated post #{id}</p>")
}

fn old_home(_ctx: &mut RequestContext) -> Result<(), Halt> {
    Err(redirect("/", 301))
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/", get(handler_fn(hello_world)))
        .route("/home", get(handler_fn(old_home)))
        .route("/user/<id>", get(handler_fn(show_user)))
        .route("/post/<id>(/<action>)", get(handler_fn(show_post)))
        .route("/post", post(handler_fn(create_post)))
        .route("/post/<id>", put(handler_fn(update_post)))
        .build()
        .expect("routes should compile");

    let filters = FilterTable::builder()
        .before("/", |ctx, _| ctx.notice("rendering the home page"))
        .after("/post/<id>(/<action>)", |ctx, captures| {
            ctx.echo(format!("<!-- post filter saw {captures:?} -->"));
        })
        .build()
        .expect("filters should compile");

    let dispatcher = Dispatcher::builder().router(router).filters(filters).build().expect("dispatcher should build");

    let form = |method: Method, uri: &str, body: &str| {
        let (parts, ()) = http::Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .body(())
            .expect("valid request")
            .into_parts();
        Request::from_http(&parts, body.as_bytes()).expect("valid form")
    };

    let requests = vec![
        Request::new(Method::GET, "/"),
        Request::new(Method::GET, "/home"),
        Request::new(Method::GET, "/user/42"),
        Request::new(Method::GET, "/post/7"),
        Request::new(Method::GET, "/post/7/edit"),
        form(Method::POST, "/post", "title=Hello+Perry"),
        form(Method::POST, "/post/7", "_method=put"),
        Request::new(Method::DELETE, "/post/7"),
    ];

    for request in requests {
        let line = format!("{} {}", request.method(), request.uri());
        let response = dispatcher.handle(request);
        info!(
            "{line} -> {} {}",
            response.status(),
            String::from_utf8_lossy(response.body().as_bytes()).lines().next().unwrap_or_default()
        );
    }
}
