//! Format-agnostic RDF term and statement representation
//!
//! This crate provides the canonical types exchanged between readers, the
//! term profile and consumers, regardless of the serialization format the
//! statements came from.
//!
//! # Key Design Principles
//!
//! 1. **Resolved IRIs only** - All IRIs are stored fully resolved. Relative
//!    references and prefixed names are expanded before a term is built.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype, never
//!    optional. Plain strings use `xsd:string`, language-tagged strings use
//!    `rdf:langString` (or `rdf:dirLangString` with a base direction).
//!
//! 3. **Lexical forms are kept verbatim** - A literal carries the lexical form
//!    it was written with. Ill-typed literals are representable so that a
//!    lenient parse can still deliver them.
//!
//! # Example
//!
//! ```
//! use tributary_graph_ir::{Datatype, Term, Triple};
//!
//! let triple = Triple::new(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/age"),
//!     Term::typed("30", Datatype::xsd_integer()),
//! );
//! assert_eq!(
//!     triple.to_string(),
//!     "<http://example.org/alice> <http://xmlns.com/foaf/0.1/age> \"30\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
//! );
//! ```

pub mod datatype;
mod sink;
mod term;
mod triple;

pub use datatype::Datatype;
pub use sink::{CollectorSink, CountingSink, StreamSink};
pub use term::{BaseDirection, BlankId, Term};
pub use triple::{Quad, Triple};
