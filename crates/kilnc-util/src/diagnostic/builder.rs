//! Fluent construction of [`Diagnostic`]s.

use super::{Diagnostic, DiagnosticCode, Handler, Level};
use crate::span::Span;

/// Builder for diagnostics.
///
/// Terminates either with [`build`](DiagnosticBuilder::build) to get the
/// [`Diagnostic`] value, or with [`emit`](DiagnosticBuilder::emit) to hand
/// it straight to a [`Handler`].
///
/// # Examples
///
/// ```
/// use kilnc_util::diagnostic::{DiagnosticBuilder, E_TYPE_MISMATCH};
/// use kilnc_util::span::Span;
///
/// let diag = DiagnosticBuilder::error("Cannot assign value `true` of type `untyped bool` to `int` in assignment")
///     .code(E_TYPE_MISMATCH)
///     .span(Span::DUMMY)
///     .note("the target was declared as `int`")
///     .build();
/// assert_eq!(diag.notes.len(), 1);
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    code: Option<DiagnosticCode>,
    notes: Vec<String>,
}

impl DiagnosticBuilder {
    /// Start a diagnostic at an arbitrary level.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            code: None,
            notes: Vec::new(),
        }
    }

    /// Start an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    /// Start a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    /// Set the source location.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Attach a machine-readable code.
    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Append a context note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Finish building, returning the diagnostic.
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            code: self.code,
            notes: self.notes,
        }
    }

    /// Finish building and report to `handler`.
    pub fn emit(self, handler: &Handler) {
        handler.emit_diagnostic(self.build());
    }
}
