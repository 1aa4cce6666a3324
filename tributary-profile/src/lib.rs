//! Term construction, validation and prefix indexing for RDF parse runs
//!
//! This crate sits between a syntax reader and the consumer:
//!
//! - [`PrefixIndex`]: prefix ↔ namespace map with trie-backed abbreviation
//! - [`TermValidator`]: stateless IRI, literal and statement checks
//! - [`TermProfile`]: per-run context that resolves, checks and builds terms
//! - [`RdfReader`] / [`Emit`]: the seam a reader plugs into
//! - [`parse_direct`]: a synchronous parse straight into a
//!   [`StreamSink`](tributary_graph_ir::StreamSink)
//!
//! # Example
//!
//! ```
//! use tributary_profile::{Position, TermProfile};
//!
//! let mut profile = TermProfile::builder()
//!     .base("http://example.org/")
//!     .build()
//!     .unwrap();
//! profile
//!     .add_prefix("foaf", "http://xmlns.com/foaf/0.1/", Position::UNKNOWN)
//!     .unwrap();
//!
//! let s = profile.create_iri("alice", Position::new(1, 1)).unwrap();
//! let p = profile
//!     .expand_prefixed_name("foaf", "name", Position::new(1, 9))
//!     .unwrap();
//! let o = profile.create_string_literal("Alice");
//! let triple = profile.create_triple(s, p, o, Position::new(1, 1)).unwrap();
//!
//! assert_eq!(triple.s.as_iri(), Some("http://example.org/alice"));
//! assert_eq!(
//!     profile.prefixes().abbreviate("http://xmlns.com/foaf/0.1/name"),
//!     Some(("foaf", "name"))
//! );
//! ```

mod blank;
mod cache;
pub mod error;
pub mod langtag;
pub mod lexical;
mod prefix;
mod profile;
mod reader;
mod report;
pub mod resolve;
mod validate;

pub use blank::BlankNodeAllocator;
pub use cache::{DirectFactory, TermCache, TermFactory};
pub use error::{
    AbortParse, Diagnostic, ParseError, Position, Result, Severity, ValidationOutcome,
};
pub use prefix::PrefixIndex;
pub use profile::{ProfileConfig, TermProfile, TermProfileBuilder};
pub use reader::{parse_direct, Emit, RdfReader, SinkEmitter, Source};
pub use report::{CollectingErrorHandler, ErrorHandler, LogErrorHandler};
pub use resolve::{IriResolver, PassThroughResolver, ResolveError, Rfc3986Resolver};
pub use validate::TermValidator;
