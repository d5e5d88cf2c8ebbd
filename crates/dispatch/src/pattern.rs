//! Route pattern compilation.
//!
//! A route pattern is a URI template made of literal text and named placeholders:
//!
//! - `<name>` captures one or more word or hyphen characters. Names are made of
//!   the same characters.
//! - `(` ... `)` marks an optional part, so `/post/<id>(/<action>)` matches both
//!   `/post/7` and `/post/7/edit`.
//! - everything else is literal text.
//!
//! A pattern without any placeholder compiles to [`RoutePattern::Static`] and is
//! matched by string equality. Any other pattern compiles once into an anchored,
//! case-insensitive [`Regex`] whose capture groups follow the placeholders from
//! left to right.

use regex::Regex;
use thiserror::Error;

/// Matches one placeholder value.
const CAPTURE: &str = r"([\w-]+)";

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unbalanced optional group in pattern '{pattern}'")]
    UnbalancedGroup { pattern: String },

    #[error("placeholder '<{name}>' appears more than once in pattern '{pattern}'")]
    DuplicatePlaceholder { pattern: String, name: String },

    #[error("pattern '{pattern}' does not compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled route or filter pattern.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Literal pattern, matched by exact equality.
    Static(String),
    /// Pattern with placeholders.
    Dynamic(DynamicPattern),
}

/// A compiled pattern together with its placeholder names in declaration order.
#[derive(Debug, Clone)]
pub struct DynamicPattern {
    source: String,
    regex: Regex,
    keys: Vec<String>,
}

impl RoutePattern {
    /// Compiles a pattern string.
    ///
    /// # Example
    /// ```
    /// use micro_dispatch::pattern::RoutePattern;
    ///
    /// let pattern = RoutePattern::compile("/post/<id>(/<action>)").unwrap();
    /// assert_eq!(pattern.keys(), ["id", "action"]);
    /// assert_eq!(pattern.matches("/post/7"), Some(vec!["7".to_owned(), String::new()]));
    /// assert_eq!(pattern.matches("/post/7/edit"), Some(vec!["7".to_owned(), "edit".to_owned()]));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, CompileError> {
        if !has_placeholder(pattern) {
            return Ok(Self::Static(pattern.to_owned()));
        }

        DynamicPattern::compile(pattern).map(Self::Dynamic)
    }

    /// The pattern string this was compiled from.
    pub fn source(&self) -> &str {
        match self {
            Self::Static(source) => source,
            Self::Dynamic(dynamic) => &dynamic.source,
        }
    }

    /// Placeholder names in declaration order, empty for static patterns.
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Static(_) => &[],
            Self::Dynamic(dynamic) => &dynamic.keys,
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }

    /// Tests the pattern against a full URI.
    ///
    /// Returns the captured values in placeholder order, one per key. An optional
    /// group that did not participate in the match yields an empty string.
    pub fn matches(&self, uri: &str) -> Option<Vec<String>> {
        match self {
            Self::Static(source) => (source == uri).then(Vec::new),
            Self::Dynamic(dynamic) => dynamic.captures(uri),
        }
    }
}

impl DynamicPattern {
    fn compile(pattern: &str) -> Result<Self, CompileError> {
        let mut expr = String::with_capacity(pattern.len() * 2 + 8);
        expr.push_str("(?i)^");

        let mut keys: Vec<String> = Vec::new();
        let mut depth = 0usize;
        let mut rest = pattern;

        while let Some(c) = rest.chars().next() {
            if c == '<'
                && let Some(name) = placeholder(rest)
            {
                if keys.iter().any(|key| key == name) {
                    return Err(CompileError::DuplicatePlaceholder {
                        pattern: pattern.to_owned(),
                        name: name.to_owned(),
                    });
                }
                keys.push(name.to_owned());
                expr.push_str(CAPTURE);
                rest = &rest[name.len() + 2..];
                continue;
            }

            match c {
                '(' => {
                    depth += 1;
                    expr.push_str("(?:");
                }
                ')' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| CompileError::UnbalancedGroup { pattern: pattern.to_owned() })?;
                    expr.push_str(")?");
                }
                _ => {
                    let mut buf = [0u8; 4];
                    expr.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                }
            }
            rest = &rest[c.len_utf8()..];
        }

        if depth != 0 {
            return Err(CompileError::UnbalancedGroup { pattern: pattern.to_owned() });
        }
        expr.push('$');

        let regex =
            Regex::new(&expr).map_err(|source| CompileError::Regex { pattern: pattern.to_owned(), source })?;

        Ok(Self { source: pattern.to_owned(), regex, keys })
    }

    fn captures(&self, uri: &str) -> Option<Vec<String>> {
        let captures = self.regex.captures(uri)?;
        let values = (1..=self.keys.len())
            .map(|i| captures.get(i).map_or_else(String::new, |m| m.as_str().to_owned()))
            .collect();
        Some(values)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Reads the placeholder name at the start of `input`, which must begin with `<`.
fn placeholder(input: &str) -> Option<&str> {
    let body = input.strip_prefix('<')?;
    let end = body.find('>')?;
    let name = &body[..end];
    (!name.is_empty() && name.chars().all(is_name_char)).then_some(name)
}

fn has_placeholder(pattern: &str) -> bool {
    pattern.match_indices('<').any(|(i, _)| placeholder(&pattern[i..]).is_some())
}
