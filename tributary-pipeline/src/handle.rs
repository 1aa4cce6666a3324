//! Consumer-side handle: drains the channel onto the sink

use crate::control::{Canceller, PipelineStats};
use crate::error::{PipelineError, Result};
use crate::event::Message;
use crate::worker::WorkerLink;
use tributary_graph_ir::StreamSink;

/// Handle to a submitted parse.
///
/// The worker starts at submission. Events reach the sink only while
/// [`run`](Self::run) (or [`join`](Self::join)) drains the channel on the
/// calling thread, so the sink itself never crosses threads.
///
/// Dropping the handle cancels the parse. A foreground worker is joined on
/// drop; a background worker is detached.
pub struct PipelineHandle<S: StreamSink> {
    link: WorkerLink,
    sink: Option<S>,
    outcome: Option<Result<()>>,
}

impl<S: StreamSink> PipelineHandle<S> {
    pub(crate) fn new(link: WorkerLink, sink: S) -> Self {
        Self {
            link,
            sink: Some(sink),
            outcome: None,
        }
    }

    /// Replay every event onto the sink until the stream ends.
    ///
    /// Calls `start` first and `finish` after the last event of a clean run.
    /// A parse error on the worker is returned as [`PipelineError::Parse`]
    /// after all events that preceded it were delivered. Once complete,
    /// further calls return the same outcome without touching the sink.
    pub fn run(&mut self) -> Result<()> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let outcome = self.drain();
        if outcome.is_err() {
            self.link.close();
        }
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn drain(&mut self) -> Result<()> {
        let shared = self.link.shared.clone();
        let Some(sink) = self.sink.as_mut() else {
            return Err(PipelineError::Cancelled);
        };

        shared
            .gated(|| sink.start())
            .ok_or(PipelineError::Cancelled)?;

        loop {
            let events = match self.link.recv() {
                Some(Message::Batch(events)) => events,
                Some(Message::End) => break,
                None if shared.is_cancelled() => return Err(PipelineError::Cancelled),
                None => return Err(PipelineError::WorkerPanicked),
            };
            shared.record_batch();
            for event in events {
                shared
                    .gated(|| event.replay(sink))
                    .ok_or(PipelineError::Cancelled)??;
                shared.record_event();
            }
        }

        shared
            .gated(|| sink.finish())
            .ok_or(PipelineError::Cancelled)?;
        tracing::debug!(
            batches = shared.stats().batches,
            events = shared.stats().events,
            "pipeline drained"
        );
        Ok(())
    }

    /// Run to completion, wait for the worker and hand back the sink.
    pub fn join(mut self) -> Result<S> {
        let outcome = self.run();
        let joined = self.link.join();
        outcome?;
        joined?;
        self.sink.take().ok_or(PipelineError::Cancelled)
    }

    /// Stop the parse. No sink call happens after this returns.
    ///
    /// Batches still in the channel are discarded and the worker is released.
    pub fn cancel(&mut self) {
        self.canceller().cancel();
        self.link.close();
        if self.outcome.is_none() {
            self.outcome = Some(Err(PipelineError::Cancelled));
        }
    }

    /// A cancel handle usable from other threads or from inside the sink.
    pub fn canceller(&self) -> Canceller {
        Canceller::new(self.link.shared.clone())
    }

    pub fn stats(&self) -> PipelineStats {
        self.link.shared.stats()
    }

    /// Whether the worker has stopped producing.
    pub fn is_finished(&self) -> bool {
        self.link.is_finished()
    }

    /// The sink, for inspection between runs.
    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }
}
