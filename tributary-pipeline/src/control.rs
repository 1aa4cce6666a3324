//! State shared between the worker, the consumer and cancellers
//!
//! The worker follows `Running -> Aborting -> Stopped`. Cancellation moves a
//! running worker to `Aborting`; the worker notices at its next emit or
//! dispatch, stops parsing and moves itself to `Stopped` after sending `End`.
//!
//! The consumer side holds `gate` around every sink call. `cancel()` raises
//! the flag and then takes the gate once, so when it returns no sink call is
//! in flight and every later one sees the flag. The gate is reentrant so a
//! sink may cancel from inside its own callback.

use parking_lot::ReentrantMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

const RUNNING: u8 = 0;
const ABORTING: u8 = 1;
const STOPPED: u8 = 2;

#[derive(Debug)]
pub(crate) struct Shared {
    state: AtomicU8,
    cancelled: AtomicBool,
    gate: ReentrantMutex<()>,
    batches: AtomicU64,
    events: AtomicU64,
}

impl Shared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(RUNNING),
            cancelled: AtomicBool::new(false),
            gate: ReentrantMutex::new(()),
            batches: AtomicU64::new(0),
            events: AtomicU64::new(0),
        })
    }

    // === Worker side ===

    pub(crate) fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    /// Ask a running worker to stop. No effect once it has stopped.
    pub(crate) fn abort_worker(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, ABORTING, Ordering::AcqRel, Ordering::Acquire);
    }

    pub(crate) fn mark_stopped(&self) {
        self.state.store(STOPPED, Ordering::Release);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.state.load(Ordering::Acquire) == STOPPED
    }

    // === Consumer side ===

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Run `f` with the gate held, unless cancelled.
    pub(crate) fn gated<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let _gate = self.gate.lock();
        if self.is_cancelled() {
            return None;
        }
        Some(f())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.abort_worker();
        // Wait out a sink call in progress on the consumer thread
        drop(self.gate.lock());
    }

    pub(crate) fn record_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stats(&self) -> PipelineStats {
        PipelineStats {
            batches: self.batches.load(Ordering::Relaxed),
            events: self.events.load(Ordering::Relaxed),
        }
    }
}

/// Cancels a pipeline from any thread, including from inside its sink.
///
/// Once [`cancel`](Self::cancel) returns, the pipeline makes no further sink
/// calls. Batches already in the channel are discarded.
#[derive(Debug, Clone)]
pub struct Canceller {
    shared: Arc<Shared>,
}

impl Canceller {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn cancel(&self) {
        tracing::debug!("pipeline cancellation requested");
        self.shared.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }
}

/// Delivery counters, observed on the consumer side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Data batches received (the end-of-stream marker is not counted)
    pub batches: u64,
    /// Events replayed or yielded, not counting a terminal error
    pub events: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let shared = Shared::new();
        assert!(shared.is_running());
        shared.abort_worker();
        assert!(!shared.is_running());
        assert!(!shared.is_stopped());
        shared.mark_stopped();
        shared.abort_worker();
        assert!(shared.is_stopped());
    }

    #[test]
    fn test_gate_blocks_after_cancel() {
        let shared = Shared::new();
        assert_eq!(shared.gated(|| 1), Some(1));
        Canceller::new(shared.clone()).cancel();
        assert_eq!(shared.gated(|| 2), None);
        assert!(!shared.is_running());
    }

    #[test]
    fn test_cancel_inside_gate_is_reentrant() {
        let shared = Shared::new();
        let canceller = Canceller::new(shared.clone());
        let ran = shared.gated(|| {
            canceller.cancel();
            true
        });
        assert_eq!(ran, Some(true));
        assert!(canceller.is_cancelled());
    }
}
