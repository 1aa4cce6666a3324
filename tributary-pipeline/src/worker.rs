//! The background parse worker and the consumer's link to it

use crate::batcher::{Batcher, DispatchPredicate};
use crate::config::{BlankNodeScope, PipelineConfig};
use crate::control::Shared;
use crate::error::{PipelineError, Result};
use crate::event::Message;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use tributary_profile::{ParseError, Source, TermProfile};

/// Consumer-side ownership of a running worker.
///
/// Dropping the link aborts the worker and closes the channel; a foreground
/// worker is then joined, a background one is left to finish on its own.
pub(crate) struct WorkerLink {
    rx: Option<Receiver<Message>>,
    thread: Option<JoinHandle<()>>,
    pub(crate) shared: Arc<Shared>,
    background: bool,
}

impl WorkerLink {
    /// Next message, or `None` once the channel is closed.
    pub(crate) fn recv(&mut self) -> Option<Message> {
        self.rx.as_ref()?.recv().ok()
    }

    /// Drop the receiver, unblocking a worker waiting on a full channel.
    pub(crate) fn close(&mut self) {
        self.rx = None;
    }

    /// Close the channel and wait for the worker thread.
    pub(crate) fn join(&mut self) -> Result<()> {
        self.close();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| PipelineError::WorkerPanicked),
            None => Ok(()),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.shared.is_stopped()
    }
}

impl Drop for WorkerLink {
    fn drop(&mut self) {
        if self.thread.is_none() {
            return;
        }
        self.shared.abort_worker();
        self.close();
        if self.background {
            tracing::debug!("detaching background pipeline worker");
            self.thread = None;
        } else if self.join().is_err() {
            tracing::debug!("pipeline worker panicked during shutdown");
        }
    }
}

/// Start a worker parsing `sources` in order into a fresh channel.
pub(crate) fn spawn(
    sources: Vec<Source>,
    profile: TermProfile,
    config: &PipelineConfig,
    premature_dispatch: Option<DispatchPredicate>,
) -> Result<WorkerLink> {
    let shared = Shared::new();
    let (tx, rx) = sync_channel(config.queue_depth);
    let batcher = Batcher::new(tx, config.chunk_size, premature_dispatch, shared.clone());
    let reset_blank_nodes = config.blank_node_scope == BlankNodeScope::Source;

    let thread = std::thread::Builder::new()
        .name("tributary-parse".into())
        .spawn(move || run(sources, profile, reset_blank_nodes, batcher))
        .map_err(|e| PipelineError::Spawn(Arc::new(e)))?;

    Ok(WorkerLink {
        rx: Some(rx),
        thread: Some(thread),
        shared,
        background: config.background,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run(sources: Vec<Source>, mut profile: TermProfile, reset_blank_nodes: bool, mut batcher: Batcher) {
    let total = sources.len();
    let mut sources = sources.into_iter();
    let mut outcome: std::result::Result<(), ParseError> = Ok(());

    for source in sources.by_ref() {
        let name = source.name().to_string();
        tracing::debug!(source = %name, "parsing source");
        let read = panic::catch_unwind(AssertUnwindSafe(|| {
            source.read(&mut profile, reset_blank_nodes, &mut batcher)
        }));
        let result = read.unwrap_or_else(|payload| Err(ParseError::Panicked(panic_message(payload))));
        match result {
            Ok(()) => tracing::debug!(source = %name, "finished source"),
            Err(e) => {
                tracing::debug!(source = %name, error = %e, "source failed");
                outcome = Err(e);
                break;
            }
        }
    }

    let skipped = sources.len();
    if skipped > 0 {
        tracing::debug!(skipped, total, "skipping remaining sources");
    }
    drop(sources);

    match outcome {
        Ok(()) => {
            if let Err(e) = batcher.dispatch() {
                tracing::debug!(error = %e, "final batch not delivered");
            }
        }
        Err(e) => batcher.fail(e),
    }

    let batches = batcher.finish();
    tracing::debug!(sources = total, batches, "pipeline worker finished");
}
