//! Events carried from the worker to the consumer

use tributary_graph_ir::{Quad, StreamSink, Triple};
use tributary_profile::ParseError;

/// One element of a batch.
#[derive(Debug, Clone)]
pub enum ParseEvent {
    Base(String),
    Prefix { prefix: String, iri: String },
    Triple(Triple),
    Quad(Quad),
    /// The parse failed; always the last event delivered
    Error(ParseError),
}

impl ParseEvent {
    /// Deliver this event to `sink`. An `Error` event is returned instead.
    pub fn replay<S: StreamSink + ?Sized>(self, sink: &mut S) -> Result<(), ParseError> {
        match self {
            ParseEvent::Base(iri) => sink.base(&iri),
            ParseEvent::Prefix { prefix, iri } => sink.prefix(&prefix, &iri),
            ParseEvent::Triple(triple) => sink.triple(triple),
            ParseEvent::Quad(quad) => sink.quad(quad),
            ParseEvent::Error(e) => return Err(e),
        }
        Ok(())
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, ParseEvent::Triple(_) | ParseEvent::Quad(_))
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, ParseEvent::Base(_) | ParseEvent::Prefix { .. })
    }
}

/// What travels over the channel: data batches, then exactly one `End`.
#[derive(Debug)]
pub(crate) enum Message {
    Batch(Vec<ParseEvent>),
    End,
}
