use bencher::{BLOG_ROUTES, RouteCase};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use http::Method;
use micro_dispatch::pattern::RoutePattern;
use micro_dispatch::router::{Router, get};
use micro_dispatch::{RequestContext, handler_fn};
use std::hint::black_box;

fn noop(_ctx: &mut RequestContext) {}

fn create_test_cases() -> Vec<RouteCase> {
    vec![
        RouteCase::exact("static_hit", BLOG_ROUTES, "/feed.xml"),
        RouteCase::dynamic("first_dynamic", BLOG_ROUTES, "/user/42"),
        RouteCase::dynamic("last_dynamic_optional", BLOG_ROUTES, "/post/7/edit"),
        RouteCase::miss("miss", BLOG_ROUTES, "/no/such/page/here"),
    ]
}

fn build_router(patterns: &[&str]) -> Router {
    patterns
        .iter()
        .fold(Router::builder(), |builder, pattern| builder.route(*pattern, get(handler_fn(noop))))
        .build()
        .expect("benchmark patterns should compile")
}

fn benchmark_router_at(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("router_at");

    for case in create_test_cases() {
        let router = build_router(case.patterns());
        group.bench_with_input(BenchmarkId::new(case.group().as_str(), case.name()), &case, |b, case| {
            b.iter(|| black_box(router.at(&Method::GET, black_box(case.uri())).is_some()));
        });
    }

    group.finish();
}

fn benchmark_pattern_compile(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("pattern_compile");

    for pattern in ["/about", "/user/<id>", "/post/<id>(/<action>)", "/<year>/<month>/<slug>"] {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), pattern, |b, pattern| {
            b.iter(|| black_box(RoutePattern::compile(black_box(pattern)).expect("pattern should compile")));
        });
    }

    group.finish();
}

criterion_group!(router, benchmark_router_at, benchmark_pattern_compile);
criterion_main!(router);
