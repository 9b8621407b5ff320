//! Diagnostic module - Error and warning reporting.
//!
//! The checker never aborts on a user error: it records a [`Diagnostic`]
//! with the [`Handler`] and keeps walking, so a single run surfaces every
//! independent problem in the input. The handler is therefore the *output*
//! of checking — callers inspect [`Handler::has_errors`] and
//! [`Handler::diagnostics`] rather than a `Result`.
//!
//! Diagnostics are built with the fluent [`DiagnosticBuilder`]:
//!
//! ```
//! use kilnc_util::diagnostic::{DiagnosticBuilder, Handler};
//! use kilnc_util::span::Span;
//!
//! let handler = Handler::new();
//! DiagnosticBuilder::error("Non-boolean condition in `if` statement")
//!     .span(Span::DUMMY)
//!     .emit(&handler);
//!
//! assert!(handler.has_errors());
//! assert_eq!(handler.error_count(), 1);
//! ```

mod builder;
mod codes;

pub use builder::DiagnosticBuilder;
pub use codes::DiagnosticCode;

pub use codes::{
    E_ARITY_MISMATCH, E_BAD_CATEGORY, E_CONTROL_FLOW, E_DECLARATION, E_NOT_LVALUE,
    E_TYPE_MISMATCH, E_UNDECLARED_NAME,
};

use crate::span::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that fails the compilation.
    Error,
    /// A warning; compilation still succeeds.
    Warning,
    /// Additional context attached to another diagnostic.
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single reported problem: severity, message, and source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// Main message.
    pub message: String,
    /// Where in the source the problem sits.
    pub span: Span,
    /// Optional machine-readable code.
    pub code: Option<DiagnosticCode>,
    /// Additional context lines.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic from its parts.
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            code: None,
            notes: Vec::new(),
        }
    }

    /// Shorthand for an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Shorthand for a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }
}

/// Collects diagnostics for a compilation.
///
/// Interior-mutable so that code holding only a shared reference (the
/// checker threads `&Handler` everywhere) can still report.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    panic_on_error: bool,
}

impl Handler {
    /// Create a new, empty handler.
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            panic_on_error: false,
        }
    }

    /// A handler that panics on the first error.
    ///
    /// Used by tests that assert a program checks cleanly: the panic
    /// message carries the offending diagnostic.
    pub fn new_panicking() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            panic_on_error: true,
        }
    }

    /// Record a diagnostic.
    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        if self.panic_on_error && diagnostic.level == Level::Error {
            panic!(
                "unexpected checker error at {}:{}: {}",
                diagnostic.span.line, diagnostic.span.column, diagnostic.message
            );
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// True when at least one error has been reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of reported errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Number of reported warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Snapshot of everything reported so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// The messages reported so far, in emission order.
    ///
    /// Convenience for tests asserting on diagnostic sequences.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics
            .borrow()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    /// Drop all recorded diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "error");
        assert_eq!(format!("{}", Level::Warning), "warning");
        assert_eq!(format!("{}", Level::Note), "note");
    }

    #[test]
    fn test_diagnostic_constructors() {
        let err = Diagnostic::error("bad", Span::DUMMY);
        assert_eq!(err.level, Level::Error);
        let warn = Diagnostic::warning("meh", Span::DUMMY);
        assert_eq!(warn.level, Level::Warning);
        assert!(warn.code.is_none());
    }

    #[test]
    fn test_handler_counts() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        handler.emit_diagnostic(Diagnostic::error("one", Span::DUMMY));
        handler.emit_diagnostic(Diagnostic::warning("two", Span::DUMMY));
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_handler_messages_in_order() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error("first", Span::DUMMY));
        handler.emit_diagnostic(Diagnostic::error("second", Span::DUMMY));
        assert_eq!(handler.messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_handler_clear() {
        let handler = Handler::new();
        handler.emit_diagnostic(Diagnostic::error("gone", Span::DUMMY));
        handler.clear();
        assert!(!handler.has_errors());
        assert!(handler.diagnostics().is_empty());
    }

    #[test]
    fn test_panicking_handler() {
        let handler = Handler::new_panicking();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            handler.emit_diagnostic(Diagnostic::error("boom", Span::DUMMY));
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_panicking_handler_allows_warnings() {
        let handler = Handler::new_panicking();
        handler.emit_diagnostic(Diagnostic::warning("fine", Span::DUMMY));
        assert_eq!(handler.warning_count(), 1);
    }
}
