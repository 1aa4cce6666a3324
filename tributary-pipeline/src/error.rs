//! Error types for pipelined parsing

use std::sync::Arc;
use tributary_profile::ParseError;

/// Error type for pipeline operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    /// The parse failed on the worker; re-raised unchanged
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The consumer cancelled before the stream completed
    #[error("Pipeline cancelled")]
    Cancelled,

    /// The worker thread died without delivering its end of stream
    #[error("Pipeline worker panicked")]
    WorkerPanicked,

    /// The worker thread could not be started
    #[error("Failed to spawn pipeline worker: {0}")]
    Spawn(Arc<std::io::Error>),

    /// Invalid configuration
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The underlying parse error, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            PipelineError::Parse(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
