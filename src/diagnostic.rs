use std::fmt;

use crate::token::Span;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A problem that makes the program unfit to run.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
        }
    }
}

/// A reported problem with the exact span it applies to.
///
/// Diagnostics are collected, never thrown: scanning and parsing always
/// return their best-effort output next to the list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at line {}, column {}", span.start.line, span.start.column)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Creates an error diagnostic from anything displayable, usually a
    /// `LexErrorKind` or `ParseErrorKind`.
    #[must_use]
    pub fn error(message: impl fmt::Display, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.to_string(),
            span,
        }
    }
}
