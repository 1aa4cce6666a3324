//! Statement printing with prefix abbreviation

use std::fmt;
use std::io::{self, Write};
use tributary_graph_ir::{Quad, StreamSink, Term, Triple};
use tributary_profile::PrefixIndex;

/// Term display that writes IRIs as `prefix:local` where a binding allows.
struct Abbreviated<'a> {
    term: &'a Term,
    prefixes: &'a PrefixIndex,
}

fn write_iri(f: &mut fmt::Formatter<'_>, prefixes: &PrefixIndex, iri: &str) -> fmt::Result {
    match prefixes.abbreviate(iri) {
        Some((prefix, local)) => write!(f, "{prefix}:{local}"),
        None => write!(f, "<{iri}>"),
    }
}

impl fmt::Display for Abbreviated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Iri(iri) => write_iri(f, self.prefixes, iri),
            Term::BlankNode(id) => write!(f, "{id}"),
            Term::Literal {
                lexical,
                datatype,
                language,
                direction,
            } => {
                f.write_str("\"")?;
                for c in lexical.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")?;
                match (language, direction) {
                    (Some(lang), Some(dir)) => write!(f, "@{lang}--{dir}"),
                    (Some(lang), None) => write!(f, "@{lang}"),
                    _ if datatype.is_xsd_string() => Ok(()),
                    _ => {
                        f.write_str("^^")?;
                        write_iri(f, self.prefixes, datatype.as_iri())
                    }
                }
            }
            Term::Triple(t) => write!(
                f,
                "<<( {} {} {} )>>",
                self.nested(&t.s),
                self.nested(&t.p),
                self.nested(&t.o)
            ),
        }
    }
}

impl<'a> Abbreviated<'a> {
    fn nested(&self, term: &'a Term) -> Abbreviated<'a> {
        Abbreviated {
            term,
            prefixes: self.prefixes,
        }
    }
}

/// Sink that prints every event, Turtle-style, to `out`.
///
/// Prefix declarations seen in the input extend the abbreviation index.
/// The first write error stops output and is reported by [`finish_output`].
///
/// [`finish_output`]: PrintSink::finish_output
pub struct PrintSink<W: Write> {
    out: W,
    prefixes: PrefixIndex,
    statements: u64,
    error: Option<io::Error>,
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W, prefixes: PrefixIndex) -> Self {
        Self {
            out,
            prefixes,
            statements: 0,
            error: None,
        }
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if self.error.is_none() {
            if let Err(e) = self.out.write_fmt(line) {
                self.error = Some(e);
            }
        }
    }

    fn term<'a>(&'a self, term: &'a Term) -> Abbreviated<'a> {
        Abbreviated {
            term,
            prefixes: &self.prefixes,
        }
    }

    /// Flush and return the number of statements printed.
    pub fn finish_output(mut self) -> io::Result<u64> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.statements)
    }
}

impl<W: Write> StreamSink for PrintSink<W> {
    fn base(&mut self, base_iri: &str) {
        self.emit(format_args!("@base <{base_iri}> .\n"));
    }

    fn prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.prefixes.add(prefix, namespace_iri);
        self.emit(format_args!("@prefix {prefix}: <{namespace_iri}> .\n"));
    }

    fn triple(&mut self, triple: Triple) {
        self.statements += 1;
        let line = format!(
            "{} {} {} .\n",
            self.term(&triple.s),
            self.term(&triple.p),
            self.term(&triple.o)
        );
        self.emit(format_args!("{line}"));
    }

    fn quad(&mut self, quad: Quad) {
        self.statements += 1;
        let line = match &quad.g {
            Some(g) => format!(
                "{} {} {} {} .\n",
                self.term(&quad.s),
                self.term(&quad.p),
                self.term(&quad.o),
                self.term(g)
            ),
            None => format!(
                "{} {} {} .\n",
                self.term(&quad.s),
                self.term(&quad.p),
                self.term(&quad.o)
            ),
        };
        self.emit(format_args!("{line}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tributary_graph_ir::{BaseDirection, Datatype};

    fn printed(f: impl FnOnce(&mut PrintSink<Vec<u8>>)) -> String {
        let prefixes = PrefixIndex::with_prefixes([(
            "xsd",
            "http://www.w3.org/2001/XMLSchema#",
        )]);
        let mut sink = PrintSink::new(Vec::new(), prefixes);
        f(&mut sink);
        String::from_utf8(sink.out).unwrap()
    }

    #[test]
    fn test_abbreviates_after_prefix_event() {
        let out = printed(|sink| {
            sink.prefix("ex", "http://example.org/");
            sink.triple(Triple::new(
                Term::iri("http://example.org/s"),
                Term::iri("http://other.org/p"),
                Term::typed("1", Datatype::xsd_integer()),
            ));
        });
        assert_eq!(
            out,
            "@prefix ex: <http://example.org/> .\nex:s <http://other.org/p> \"1\"^^xsd:integer .\n"
        );
    }

    #[test]
    fn test_literals_are_escaped() {
        let out = printed(|sink| {
            sink.triple(Triple::new(
                Term::blank("b0"),
                Term::iri("http://ex/p"),
                Term::dir_lang_string("say \"hi\"\n", "en", BaseDirection::Ltr),
            ));
        });
        assert_eq!(out, "_:b0 <http://ex/p> \"say \\\"hi\\\"\\n\"@en--ltr .\n");
    }

    #[test]
    fn test_quads_and_triple_terms() {
        let inner = Triple::new(Term::iri("http://ex/s"), Term::iri("http://ex/p"), Term::string("o"));
        let out = printed(|sink| {
            sink.quad(Quad::new(
                Term::iri("http://ex/g"),
                Term::blank("e"),
                Term::iri("http://ex/reifies"),
                Term::triple(inner),
            ));
        });
        assert_eq!(
            out,
            "_:e <http://ex/reifies> <<( <http://ex/s> <http://ex/p> \"o\" )>> <http://ex/g> .\n"
        );
    }

    #[test]
    fn test_finish_output_counts_statements() {
        let mut sink = PrintSink::new(Vec::new(), PrefixIndex::new());
        sink.quad(Quad::default_graph(
            Term::iri("http://ex/s"),
            Term::iri("http://ex/p"),
            Term::string("o"),
        ));
        assert_eq!(sink.finish_output().unwrap(), 1);
    }
}
