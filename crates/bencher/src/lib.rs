/// One routing scenario: a route set and the request uri resolved against it.
#[derive(Debug, Copy, Clone)]
pub struct RouteCase {
    name: &'static str,
    group: CaseGroup,
    patterns: &'static [&'static str],
    uri: &'static str,
}

impl RouteCase {
    pub const fn new(name: &'static str, group: CaseGroup, patterns: &'static [&'static str], uri: &'static str) -> Self {
        Self { name, group, patterns, uri }
    }

    pub const fn exact(name: &'static str, patterns: &'static [&'static str], uri: &'static str) -> Self {
        Self::new(name, CaseGroup::Exact, patterns, uri)
    }

    pub const fn dynamic(name: &'static str, patterns: &'static [&'static str], uri: &'static str) -> Self {
        Self::new(name, CaseGroup::Dynamic, patterns, uri)
    }

    pub const fn miss(name: &'static str, patterns: &'static [&'static str], uri: &'static str) -> Self {
        Self::new(name, CaseGroup::Miss, patterns, uri)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> CaseGroup {
        self.group
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    pub fn uri(&self) -> &'static str {
        self.uri
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseGroup {
    /// resolved by the static lookup
    Exact,
    /// resolved by scanning dynamic patterns
    Dynamic,
    /// not resolved at all
    Miss,
}

impl CaseGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseGroup::Exact => "exact",
            CaseGroup::Dynamic => "dynamic",
            CaseGroup::Miss => "miss",
        }
    }
}

/// A blog-like route set, static and dynamic patterns mixed.
pub static BLOG_ROUTES: &[&str] = &[
    "/",
    "/about",
    "/archive",
    "/feed.xml",
    "/user/<id>",
    "/user/<id>/posts",
    "/tag/<tag>(/<page>)",
    "/<year>/<month>/<slug>",
    "/post/<id>(/<action>)",
];
