//! Pull-style iteration over a pipelined parse
//!
//! Instead of pushing onto a sink, the consumer pulls statements. Directives
//! are consumed silently. A parse failure is yielded once as `Err`, after
//! which the iterator is exhausted. Dropping an iterator cancels the parse.

use crate::control::{Canceller, PipelineStats};
use crate::error::PipelineError;
use crate::event::{Message, ParseEvent};
use crate::worker::WorkerLink;
use tributary_graph_ir::{Quad, Triple};

struct EventStream {
    link: WorkerLink,
    pending: std::vec::IntoIter<ParseEvent>,
    done: bool,
}

impl EventStream {
    fn new(link: WorkerLink) -> Self {
        Self {
            link,
            pending: Vec::new().into_iter(),
            done: false,
        }
    }

    fn next_event(&mut self) -> Option<Result<ParseEvent, PipelineError>> {
        if self.done {
            return None;
        }
        loop {
            if self.link.shared.is_cancelled() {
                return self.stop(None);
            }
            if let Some(event) = self.pending.next() {
                if let ParseEvent::Error(e) = event {
                    return self.stop(Some(PipelineError::Parse(e)));
                }
                self.link.shared.record_event();
                return Some(Ok(event));
            }
            match self.link.recv() {
                Some(Message::Batch(events)) => {
                    self.link.shared.record_batch();
                    self.pending = events.into_iter();
                }
                Some(Message::End) => return self.stop(None),
                None if self.link.shared.is_cancelled() => return self.stop(None),
                None => return self.stop(Some(PipelineError::WorkerPanicked)),
            }
        }
    }

    fn stop(&mut self, error: Option<PipelineError>) -> Option<Result<ParseEvent, PipelineError>> {
        self.done = true;
        self.pending = Vec::new().into_iter();
        self.link.close();
        error.map(Err)
    }
}

/// Triples of a pipelined parse.
///
/// Quads in the default graph are yielded as triples; quads in named graphs
/// are skipped.
pub struct Triples {
    stream: EventStream,
}

impl Triples {
    pub(crate) fn new(link: WorkerLink) -> Self {
        Self {
            stream: EventStream::new(link),
        }
    }

    pub fn canceller(&self) -> Canceller {
        Canceller::new(self.stream.link.shared.clone())
    }

    pub fn stats(&self) -> PipelineStats {
        self.stream.link.shared.stats()
    }
}

impl Iterator for Triples {
    type Item = Result<Triple, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stream.next_event()? {
                Ok(ParseEvent::Triple(triple)) => return Some(Ok(triple)),
                Ok(ParseEvent::Quad(quad)) if quad.is_default_graph() => {
                    return Some(Ok(quad.into_triple()))
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Quads of a pipelined parse. Triples are placed in the default graph.
pub struct Quads {
    stream: EventStream,
}

impl Quads {
    pub(crate) fn new(link: WorkerLink) -> Self {
        Self {
            stream: EventStream::new(link),
        }
    }

    pub fn canceller(&self) -> Canceller {
        Canceller::new(self.stream.link.shared.clone())
    }

    pub fn stats(&self) -> PipelineStats {
        self.stream.link.shared.stats()
    }
}

impl Iterator for Quads {
    type Item = Result<Quad, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stream.next_event()? {
                Ok(ParseEvent::Triple(triple)) => return Some(Ok(triple.in_default_graph())),
                Ok(ParseEvent::Quad(quad)) => return Some(Ok(quad)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
