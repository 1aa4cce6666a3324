//! Worker-side batching of emitted events

use crate::config::PREALLOC_LIMIT;
use crate::control::Shared;
use crate::event::{Message, ParseEvent};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use tributary_graph_ir::{Quad, Triple};
use tributary_profile::{Emit, ParseError, Result};

/// Per-event predicate requesting an immediate flush after the event.
pub type DispatchPredicate = Arc<dyn Fn(&ParseEvent) -> bool + Send + Sync>;

/// Collects events into batches and sends them down the channel.
///
/// Sending blocks while the channel is full. Every emit first checks that the
/// pipeline is still running, so a cancelled pipeline stops the reader at its
/// next event.
pub(crate) struct Batcher {
    tx: SyncSender<Message>,
    buffer: Vec<ParseEvent>,
    chunk_size: usize,
    premature_dispatch: Option<DispatchPredicate>,
    shared: Arc<Shared>,
    dispatched: u64,
}

impl Batcher {
    pub(crate) fn new(
        tx: SyncSender<Message>,
        chunk_size: usize,
        premature_dispatch: Option<DispatchPredicate>,
        shared: Arc<Shared>,
    ) -> Self {
        Self {
            tx,
            buffer: Vec::with_capacity(chunk_size.min(PREALLOC_LIMIT)),
            chunk_size,
            premature_dispatch,
            shared,
            dispatched: 0,
        }
    }

    fn push(&mut self, event: ParseEvent) -> Result<()> {
        if !self.shared.is_running() {
            return Err(ParseError::Interrupted);
        }
        let flush_now = self
            .premature_dispatch
            .as_ref()
            .is_some_and(|wants_flush| wants_flush(&event));
        self.buffer.push(event);
        if flush_now || self.buffer.len() >= self.chunk_size {
            self.dispatch()?;
        }
        Ok(())
    }

    /// Send the current batch, if any.
    pub(crate) fn dispatch(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if !self.shared.is_running() {
            return Err(ParseError::Interrupted);
        }
        let batch = std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.chunk_size.min(PREALLOC_LIMIT)),
        );
        let events = batch.len();
        if self.tx.send(Message::Batch(batch)).is_err() {
            // Consumer is gone
            self.shared.abort_worker();
            return Err(ParseError::Interrupted);
        }
        self.dispatched += 1;
        tracing::trace!(batch = self.dispatched, events, "dispatched batch");
        Ok(())
    }

    /// Deliver `error` as the final event.
    ///
    /// Nothing is delivered when the pipeline is already aborting.
    pub(crate) fn fail(&mut self, error: ParseError) {
        if !self.shared.is_running() {
            self.buffer.clear();
            return;
        }
        self.buffer.push(ParseEvent::Error(error));
        let _ = self.dispatch();
    }

    /// Send the end-of-stream marker and mark the worker stopped.
    ///
    /// The marker is sent even after an abort so a draining consumer always
    /// sees it. Returns the number of data batches sent.
    pub(crate) fn finish(self) -> u64 {
        // Err only when the receiver is gone; nobody is left to tell
        let _ = self.tx.send(Message::End);
        self.shared.mark_stopped();
        self.dispatched
    }
}

impl Emit for Batcher {
    fn base(&mut self, iri: &str) -> Result<()> {
        self.push(ParseEvent::Base(iri.to_string()))
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<()> {
        self.push(ParseEvent::Prefix {
            prefix: prefix.to_string(),
            iri: iri.to_string(),
        })
    }

    fn triple(&mut self, triple: Triple) -> Result<()> {
        self.push(ParseEvent::Triple(triple))
    }

    fn quad(&mut self, quad: Quad) -> Result<()> {
        self.push(ParseEvent::Quad(quad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::sync_channel;
    use tributary_graph_ir::Term;

    fn triple(n: usize) -> Triple {
        Triple::new(
            Term::iri(format!("http://ex/s{n}")),
            Term::iri("http://ex/p"),
            Term::string("o"),
        )
    }

    fn batch_sizes(rx: &std::sync::mpsc::Receiver<Message>) -> Vec<usize> {
        let mut sizes = Vec::new();
        while let Ok(message) = rx.try_recv() {
            match message {
                Message::Batch(events) => sizes.push(events.len()),
                Message::End => sizes.push(0),
            }
        }
        sizes
    }

    #[test]
    fn test_batches_at_chunk_size() {
        let (tx, rx) = sync_channel(16);
        let shared = Shared::new();
        let mut batcher = Batcher::new(tx, 3, None, shared.clone());
        for n in 0..7 {
            batcher.triple(triple(n)).unwrap();
        }
        batcher.dispatch().unwrap();
        assert_eq!(batcher.finish(), 3);
        // 0 marks End
        assert_eq!(batch_sizes(&rx), vec![3, 3, 1, 0]);
        assert!(shared.is_stopped());
    }

    #[test]
    fn test_premature_dispatch_flushes_after_event() {
        let (tx, rx) = sync_channel(16);
        let flush_on_prefix: DispatchPredicate = Arc::new(|e| matches!(e, ParseEvent::Prefix { .. }));
        let mut batcher = Batcher::new(tx, 100, Some(flush_on_prefix), Shared::new());
        batcher.triple(triple(0)).unwrap();
        batcher.prefix("ex", "http://ex/").unwrap();
        batcher.triple(triple(1)).unwrap();
        batcher.dispatch().unwrap();
        batcher.finish();
        assert_eq!(batch_sizes(&rx), vec![2, 1, 0]);
    }

    #[test]
    fn test_aborted_batcher_interrupts_and_still_ends() {
        let (tx, rx) = sync_channel(16);
        let shared = Shared::new();
        let mut batcher = Batcher::new(tx, 100, None, shared.clone());
        batcher.triple(triple(0)).unwrap();
        shared.abort_worker();
        assert!(batcher.triple(triple(1)).unwrap_err().is_interrupted());
        batcher.fail(ParseError::Interrupted);
        batcher.finish();
        assert_eq!(batch_sizes(&rx), vec![0]);
    }

    #[test]
    fn test_dropped_receiver_interrupts() {
        let (tx, rx) = sync_channel(1);
        drop(rx);
        let shared = Shared::new();
        let mut batcher = Batcher::new(tx, 1, None, shared.clone());
        assert!(batcher.triple(triple(0)).unwrap_err().is_interrupted());
        assert!(!shared.is_running());
    }

    #[test]
    fn test_error_is_final_event() {
        let (tx, rx) = sync_channel(16);
        let mut batcher = Batcher::new(tx, 100, None, Shared::new());
        batcher.triple(triple(0)).unwrap();
        batcher.fail(ParseError::Panicked("boom".into()));
        batcher.finish();

        match rx.try_recv().unwrap() {
            Message::Batch(events) => {
                assert_eq!(events.len(), 2);
                assert!(matches!(events[1], ParseEvent::Error(ParseError::Panicked(_))));
            }
            Message::End => panic!("expected a batch"),
        }
        assert!(matches!(rx.try_recv().unwrap(), Message::End));
    }
}
