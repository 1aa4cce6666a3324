//! Error handlers: the policy deciding which diagnostics end a parse
//!
//! Handlers are explicit values handed to a [`TermProfile`](crate::TermProfile)
//! at construction. There is no process-wide default handler.

use crate::error::{AbortParse, Diagnostic, Position, Severity};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Receives diagnostics as they are detected.
///
/// Returning `Err(AbortParse)` stops the current parse. Returning `Ok` for a
/// Warning continues with the term still produced; returning `Ok` for an Error
/// swallows it. Fatal diagnostics abort regardless of what the handler returns.
pub trait ErrorHandler: Send + Sync + fmt::Debug {
    fn handle(&self, diagnostic: Diagnostic) -> Result<(), AbortParse>;

    fn warning(&self, message: &str, position: Position) -> Result<(), AbortParse> {
        self.handle(Diagnostic::warning(message, position))
    }

    fn error(&self, message: &str, position: Position) -> Result<(), AbortParse> {
        self.handle(Diagnostic::error(message, position))
    }

    fn fatal(&self, message: &str, position: Position) -> Result<(), AbortParse> {
        self.handle(Diagnostic::fatal(message, position))
    }
}

/// Logs diagnostics through `tracing` and aborts at a configurable severity.
///
/// The default aborts on Error and Fatal and logs Warnings at `warn` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogErrorHandler {
    abort_at: Severity,
}

impl Default for LogErrorHandler {
    fn default() -> Self {
        Self {
            abort_at: Severity::Error,
        }
    }
}

impl LogErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings abort too.
    pub fn strict() -> Self {
        Self {
            abort_at: Severity::Warning,
        }
    }

    /// Errors are logged and swallowed; only Fatal aborts.
    pub fn lenient() -> Self {
        Self {
            abort_at: Severity::Fatal,
        }
    }

    pub fn abort_at(&self) -> Severity {
        self.abort_at
    }
}

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, diagnostic: Diagnostic) -> Result<(), AbortParse> {
        if diagnostic.severity >= self.abort_at {
            tracing::debug!(
                severity = %diagnostic.severity,
                line = diagnostic.position.line,
                col = diagnostic.position.col,
                "aborting parse: {}",
                diagnostic.message
            );
            return Err(AbortParse(diagnostic));
        }
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                line = diagnostic.position.line,
                col = diagnostic.position.col,
                "{}",
                diagnostic.message
            ),
            _ => tracing::error!(
                line = diagnostic.position.line,
                col = diagnostic.position.col,
                "{}",
                diagnostic.message
            ),
        }
        Ok(())
    }
}

/// Records every diagnostic; aborts on Error and Fatal unless told otherwise.
///
/// Clones share the same record, so a test can keep one clone and hand the
/// other to a profile running on another thread.
#[derive(Debug, Clone)]
pub struct CollectingErrorHandler {
    seen: Arc<Mutex<Vec<Diagnostic>>>,
    abort_at: Severity,
}

impl Default for CollectingErrorHandler {
    fn default() -> Self {
        Self::with_abort_at(Severity::Error)
    }
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort only on diagnostics at or above `abort_at`.
    pub fn with_abort_at(abort_at: Severity) -> Self {
        Self {
            seen: Arc::default(),
            abort_at,
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen.lock().clone()
    }

    pub fn warnings(&self) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn handle(&self, diagnostic: Diagnostic) -> Result<(), AbortParse> {
        let severity = diagnostic.severity;
        self.seen.lock().push(diagnostic.clone());
        if severity >= self.abort_at {
            Err(AbortParse(diagnostic))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_handler_policy() {
        let h = LogErrorHandler::default();
        assert!(h.warning("w", Position::UNKNOWN).is_ok());
        assert!(h.error("e", Position::new(2, 1)).is_err());
        assert!(h.fatal("f", Position::UNKNOWN).is_err());
    }

    #[test]
    fn test_strict_and_lenient() {
        assert!(LogErrorHandler::strict()
            .warning("w", Position::UNKNOWN)
            .is_err());

        let lenient = LogErrorHandler::lenient();
        assert!(lenient.error("e", Position::UNKNOWN).is_ok());
        assert!(lenient.fatal("f", Position::UNKNOWN).is_err());
    }

    #[test]
    fn test_collecting_handler_shares_record() {
        let h = CollectingErrorHandler::new();
        let other = h.clone();
        other.warning("first", Position::new(1, 1)).unwrap();
        let err = other.error("second", Position::new(2, 1)).unwrap_err();

        assert_eq!(err.diagnostic().message, "second");
        let seen = h.diagnostics();
        assert_eq!(seen.len(), 2);
        assert_eq!(h.warnings(), 1);
        assert_eq!(seen[1].position, Position::new(2, 1));
    }
}
