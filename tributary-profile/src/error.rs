//! Diagnostics and error types for parse runs
//!
//! Validation reports a [`Diagnostic`] synchronously at detection time. An
//! [`ErrorHandler`](crate::ErrorHandler) decides whether the diagnostic ends
//! the parse; if it does, it returns [`AbortParse`], which readers propagate
//! with `?` as a [`ParseError`].

use std::fmt;
use std::sync::Arc;

/// Severity of a reported problem.
///
/// - `Warning`: recoverable; the term or statement is still produced.
/// - `Error`: statement-level; aborts the parse unless the handler swallows it.
/// - `Fatal`: always aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// Source position of a problem. Either part may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: Option<u64>,
    pub col: Option<u64>,
}

impl Position {
    /// Position with no location information.
    pub const UNKNOWN: Position = Position {
        line: None,
        col: None,
    };

    pub fn new(line: u64, col: u64) -> Self {
        Self {
            line: Some(line),
            col: Some(col),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.col) {
            (Some(line), Some(col)) => write!(f, "[line: {}, col: {}]", line, col),
            (Some(line), None) => write!(f, "[line: {}]", line),
            _ => Ok(()),
        }
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, position: Position) -> Self {
        Self {
            severity,
            message: message.into(),
            position,
        }
    }

    pub fn warning(message: impl Into<String>, position: Position) -> Self {
        Self::new(Severity::Warning, message, position)
    }

    pub fn error(message: impl Into<String>, position: Position) -> Self {
        Self::new(Severity::Error, message, position)
    }

    pub fn fatal(message: impl Into<String>, position: Position) -> Self {
        Self::new(Severity::Fatal, message, position)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position.line.is_some() {
            write!(f, "{} {}", self.position, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

/// Result of a validation check, in its non-reporting form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Ok,
    Warning(Diagnostic),
    Error(Diagnostic),
    Fatal(Diagnostic),
}

impl ValidationOutcome {
    pub fn from_diagnostic(diagnostic: Diagnostic) -> Self {
        match diagnostic.severity {
            Severity::Warning => ValidationOutcome::Warning(diagnostic),
            Severity::Error => ValidationOutcome::Error(diagnostic),
            Severity::Fatal => ValidationOutcome::Fatal(diagnostic),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationOutcome::Ok)
    }

    pub fn severity(&self) -> Option<Severity> {
        self.diagnostic().map(|d| d.severity)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ValidationOutcome::Ok => None,
            ValidationOutcome::Warning(d)
            | ValidationOutcome::Error(d)
            | ValidationOutcome::Fatal(d) => Some(d),
        }
    }

    pub fn into_diagnostic(self) -> Option<Diagnostic> {
        match self {
            ValidationOutcome::Ok => None,
            ValidationOutcome::Warning(d)
            | ValidationOutcome::Error(d)
            | ValidationOutcome::Fatal(d) => Some(d),
        }
    }
}

/// Signal that the current parse must stop.
///
/// Carries the diagnostic that caused the abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AbortParse(pub Diagnostic);

impl AbortParse {
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

/// Error type for a parse run
///
/// Cloneable and `Send + Sync` so that a failure on a pipeline worker can be
/// carried across the channel and raised unchanged on the consumer side.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// Validation or a reader reported an Error/Fatal that ended the parse
    #[error("{0}")]
    Abort(Diagnostic),

    /// The reader's grammar rejected the input
    #[error("Syntax error {position}: {message}")]
    Syntax { position: Position, message: String },

    /// I/O error while reading a source
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// Cooperative stop requested by the consumer
    #[error("Parse interrupted")]
    Interrupted,

    /// The reader panicked
    #[error("Reader panicked: {0}")]
    Panicked(String),
}

impl ParseError {
    /// Create a syntax error
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, ParseError::Interrupted)
    }

    /// The diagnostic behind an abort, if this is one.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ParseError::Abort(d) => Some(d),
            _ => None,
        }
    }
}

impl From<AbortParse> for ParseError {
    fn from(abort: AbortParse) -> Self {
        ParseError::Abort(abort.0)
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io(Arc::new(err))
    }
}

/// Result type for parse operations
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error("Bad IRI", Position::new(3, 7));
        assert_eq!(d.to_string(), "[line: 3, col: 7] Bad IRI");

        let d = Diagnostic::warning("no position", Position::UNKNOWN);
        assert_eq!(d.to_string(), "no position");
    }

    #[test]
    fn test_outcome_severity() {
        let outcome = ValidationOutcome::from_diagnostic(Diagnostic::fatal("x", Position::UNKNOWN));
        assert_eq!(outcome.severity(), Some(Severity::Fatal));
        assert!(!outcome.is_ok());
        assert!(ValidationOutcome::Ok.diagnostic().is_none());
    }

    #[test]
    fn test_abort_converts_to_parse_error() {
        let abort = AbortParse(Diagnostic::error("boom", Position::new(1, 1)));
        let err: ParseError = abort.into();
        assert_eq!(err.diagnostic().map(|d| d.message.as_str()), Some("boom"));
        assert_eq!(err.to_string(), "[line: 1, col: 1] boom");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }
}
