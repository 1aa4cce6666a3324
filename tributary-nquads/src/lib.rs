//! N-Triples and N-Quads reader
//!
//! A line-based [`RdfReader`](tributary_profile::RdfReader) for the two
//! simplest RDF syntaxes, including RDF 1.2 triple terms (`<<( s p o )>>`)
//! and directional language tags (`"text"@ar--rtl`). Terms are built through
//! the parse run's [`TermProfile`](tributary_profile::TermProfile), so the
//! same reader works for direct and pipelined parsing.
//!
//! # Example
//!
//! ```
//! use tributary_graph_ir::CollectorSink;
//! use tributary_nquads::{NQuadsReader, Syntax};
//! use tributary_profile::{parse_direct, Source, TermProfile};
//!
//! let text = "<http://example.org/s> <http://example.org/p> \"o\"@en .\n";
//! let source = Source::new("inline", NQuadsReader::from_text(text, Syntax::NTriples));
//!
//! let mut sink = CollectorSink::new();
//! parse_direct(vec![source], &mut TermProfile::new(), &mut sink).unwrap();
//! assert_eq!(sink.triples().len(), 1);
//! ```

mod chars;
mod lexer;
mod reader;

pub use reader::{file_source, NQuadsReader, Syntax};
