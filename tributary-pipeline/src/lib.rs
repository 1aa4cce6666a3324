//! Batched, backpressured background parsing
//!
//! A [`Pipeline`] moves a parse onto a worker thread. The worker runs the
//! readers of a submission in order, groups their events into batches of up
//! to `chunk_size`, and sends them over a bounded channel of `queue_depth`
//! batches. The consumer replays each batch onto a
//! [`StreamSink`](tributary_graph_ir::StreamSink) on its own thread, so the
//! sink sees exactly the call sequence a direct parse would produce.
//!
//! # Guarantees
//!
//! - Events arrive in the order the readers emitted them, across batches and
//!   across sources.
//! - A parse error is delivered after every event that preceded it, and is
//!   returned unchanged as [`PipelineError::Parse`].
//! - Once [`Canceller::cancel`] returns, no further sink call happens.
//! - A full channel blocks the worker; memory stays bounded however slow the
//!   sink is.
//!
//! # Example
//!
//! ```
//! use tributary_graph_ir::{CollectorSink, Term, Triple};
//! use tributary_pipeline::parse_async;
//! use tributary_profile::{Emit, Position, Result, Source, TermProfile};
//!
//! let reader = |profile: &mut TermProfile, out: &mut dyn Emit| -> Result<()> {
//!     let ns = profile.add_prefix("ex", "http://example.org/", Position::UNKNOWN)?;
//!     out.prefix("ex", &ns)?;
//!     let s = profile.expand_prefixed_name("ex", "alice", Position::UNKNOWN)?;
//!     let p = profile.create_iri("http://xmlns.com/foaf/0.1/name", Position::UNKNOWN)?;
//!     let o = profile.create_string_literal("Alice");
//!     out.triple(Triple::new(s, p, o))
//! };
//!
//! let sink = parse_async(vec![Source::new("alice.nt", reader)], CollectorSink::new()).unwrap();
//! assert_eq!(sink.prefixes().len(), 1);
//! assert_eq!(sink.triples()[0].s, Term::iri("http://example.org/alice"));
//! assert!(sink.is_finished());
//! ```

mod batcher;
pub mod config;
mod control;
pub mod error;
mod event;
mod handle;
mod iter;
mod pipeline;
mod worker;

pub use batcher::DispatchPredicate;
pub use config::{BlankNodeScope, PipelineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_QUEUE_DEPTH};
pub use control::{Canceller, PipelineStats};
pub use error::{PipelineError, Result};
pub use event::ParseEvent;
pub use handle::PipelineHandle;
pub use iter::{Quads, Triples};
pub use pipeline::{parse_async, Pipeline, PipelineBuilder};

pub use tributary_profile::{parse_direct, Emit, RdfReader, Source};
