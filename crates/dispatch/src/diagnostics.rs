//! Non-fatal runtime warnings and notices collected during one request.

use std::fmt;
use std::panic::Location;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Notice,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("WARNING"),
            Severity::Notice => f.write_str("NOTICE"),
        }
    }
}

/// One recorded warning or notice and where it was raised.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    location: &'static Location<'static>,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} in file {} on line {}", self.severity, self.message, self.file(), self.line())
    }
}

/// Ordered diagnostics of the current request.
///
/// They never interrupt dispatch; pages that care can list them, and the error
/// page shows them outside production mode.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning raised at the caller's location.
    #[track_caller]
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into(), Location::caller());
    }

    /// Records a notice raised at the caller's location.
    #[track_caller]
    pub fn notice(&mut self, message: impl Into<String>) {
        self.push(Severity::Notice, message.into(), Location::caller());
    }

    pub fn push(&mut self, severity: Severity, message: String, location: &'static Location<'static>) {
        match severity {
            Severity::Warning => warn!(file = location.file(), line = location.line(), "{}", message),
            Severity::Notice => info!(file = location.file(), line = location.line(), "{}", message),
        }
        self.entries.push(Diagnostic { severity, message, location });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_order_and_location() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning("disk almost full");
        let line = line!() - 1;
        diagnostics.notice("cache miss");

        assert_eq!(diagnostics.len(), 2);
        let entries: Vec<_> = diagnostics.iter().collect();
        assert_eq!(entries[0].severity(), Severity::Warning);
        assert_eq!(entries[0].message(), "disk almost full");
        assert_eq!(entries[0].line(), line);
        assert!(entries[0].file().ends_with("diagnostics.rs"));
        assert_eq!(entries[1].severity(), Severity::Notice);
    }

    #[test]
    fn test_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.notice("hello");
        let text = diagnostics.iter().next().unwrap().to_string();
        assert!(text.starts_with("NOTICE: hello in file "));
    }
}
