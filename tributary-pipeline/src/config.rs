//! Pipeline configuration

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum number of events per batch.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Default number of batches the channel buffers.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// Events buffered ahead of time per batch, regardless of chunk size.
pub(crate) const PREALLOC_LIMIT: usize = 8192;

/// How far a blank node label's identity reaches within one submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankNodeScope {
    /// One scope across every source of a submission
    #[default]
    Pipeline,
    /// A fresh scope per source
    Source,
}

/// Configuration for a batching pipeline.
///
/// Peak buffered memory is bounded by roughly
/// `(queue_depth + 2) × chunk_size` events: the channel plus the batch being
/// filled on the worker and the batch being replayed on the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of events per batch.
    ///
    /// Default: 100,000
    pub chunk_size: usize,

    /// Number of batches the channel holds before the worker blocks.
    ///
    /// Default: 10
    pub queue_depth: usize,

    /// Detach the worker instead of joining it when the handle is dropped.
    pub background: bool,

    /// Blank node label scoping across sources.
    pub blank_node_scope: BlankNodeScope,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            background: false,
            blank_node_scope: BlankNodeScope::Pipeline,
        }
    }
}

impl PipelineConfig {
    /// Set the batch size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the queue depth.
    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    pub fn with_background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    pub fn with_blank_node_scope(mut self, scope: BlankNodeScope) -> Self {
        self.blank_node_scope = scope;
        self
    }

    /// Both sizes must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PipelineError::config("chunk_size must be positive"));
        }
        if self.queue_depth == 0 {
            return Err(PipelineError::config("queue_depth must be positive"));
        }
        Ok(())
    }
}
