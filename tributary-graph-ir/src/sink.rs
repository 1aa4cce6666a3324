//! StreamSink trait for push-based statement delivery
//!
//! This module provides the consumer side of a parse: an event interface that
//! receives base and prefix declarations and fully built statements, without
//! knowing which syntax or which delivery path (direct or pipelined) produced
//! them.
//!
//! # Design
//!
//! Sinks only ever see resolved terms. Relative IRIs and prefixed names are
//! expanded before the sink is called. The sink can be:
//! - `CollectorSink`: Collects every event in memory
//! - `CountingSink`: Counts events without retaining them
//! - Application sinks: write to a store, a serializer, a channel, ...

use crate::{Quad, Triple};

/// Push-based consumer of a parse event stream.
///
/// Call order is `start`, then any interleaving of `base`, `prefix`,
/// `triple` and `quad` in source order, then `finish` on clean completion.
/// `finish` is not called when the parse ends with an error or is cancelled.
///
/// # Example
///
/// ```
/// use tributary_graph_ir::{CollectorSink, StreamSink, Term, Triple};
///
/// let mut sink = CollectorSink::new();
/// sink.start();
/// sink.prefix("foaf", "http://xmlns.com/foaf/0.1/");
/// sink.triple(Triple::new(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::string("Alice"),
/// ));
/// sink.finish();
///
/// assert_eq!(sink.triples().len(), 1);
/// assert!(sink.is_finished());
/// ```
pub trait StreamSink {
    /// Called once before any other event.
    fn start(&mut self) {}

    /// Called when a base IRI is declared
    ///
    /// In Turtle: `@base <http://example.org/> .`
    fn base(&mut self, base_iri: &str);

    /// Called when a prefix is declared
    ///
    /// In Turtle: `@prefix foaf: <http://xmlns.com/foaf/0.1/> .`
    fn prefix(&mut self, prefix: &str, namespace_iri: &str);

    /// Deliver a triple
    fn triple(&mut self, triple: Triple);

    /// Deliver a quad
    fn quad(&mut self, quad: Quad);

    /// Called once after the last event of a clean parse.
    fn finish(&mut self) {}
}

impl<S: StreamSink + ?Sized> StreamSink for &mut S {
    fn start(&mut self) {
        (**self).start()
    }

    fn base(&mut self, base_iri: &str) {
        (**self).base(base_iri)
    }

    fn prefix(&mut self, prefix: &str, namespace_iri: &str) {
        (**self).prefix(prefix, namespace_iri)
    }

    fn triple(&mut self, triple: Triple) {
        (**self).triple(triple)
    }

    fn quad(&mut self, quad: Quad) {
        (**self).quad(quad)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

impl<S: StreamSink + ?Sized> StreamSink for Box<S> {
    fn start(&mut self) {
        (**self).start()
    }

    fn base(&mut self, base_iri: &str) {
        (**self).base(base_iri)
    }

    fn prefix(&mut self, prefix: &str, namespace_iri: &str) {
        (**self).prefix(prefix, namespace_iri)
    }

    fn triple(&mut self, triple: Triple) {
        (**self).triple(triple)
    }

    fn quad(&mut self, quad: Quad) {
        (**self).quad(quad)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// A sink that collects every event in memory
///
/// This is the standard sink for tests and small documents.
#[derive(Debug, Default, Clone)]
pub struct CollectorSink {
    started: bool,
    finished: bool,
    base: Option<String>,
    prefixes: Vec<(String, String)>,
    triples: Vec<Triple>,
    quads: Vec<Quad>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last declared base IRI
    pub fn base_iri(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Prefix declarations in arrival order
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the collected triples and quads, consuming the sink.
    pub fn into_statements(self) -> (Vec<Triple>, Vec<Quad>) {
        (self.triples, self.quads)
    }
}

impl StreamSink for CollectorSink {
    fn start(&mut self) {
        self.started = true;
    }

    fn base(&mut self, base_iri: &str) {
        self.base = Some(base_iri.to_string());
    }

    fn prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.prefixes
            .push((prefix.to_string(), namespace_iri.to_string()));
    }

    fn triple(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    fn quad(&mut self, quad: Quad) {
        self.quads.push(quad);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

/// A sink that only counts events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingSink {
    pub bases: u64,
    pub prefixes: u64,
    pub triples: u64,
    pub quads: u64,
    pub finished: bool,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triples plus quads.
    pub fn statements(&self) -> u64 {
        self.triples + self.quads
    }
}

impl StreamSink for CountingSink {
    fn base(&mut self, _base_iri: &str) {
        self.bases += 1;
    }

    fn prefix(&mut self, _prefix: &str, _namespace_iri: &str) {
        self.prefixes += 1;
    }

    fn triple(&mut self, _triple: Triple) {
        self.triples += 1;
    }

    fn quad(&mut self, _quad: Quad) {
        self.quads += 1;
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
