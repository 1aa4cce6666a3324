//! Statement reader: turns token lines into terms through a `TermProfile`

use crate::lexer::{tokenize, Token, TokenKind};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use tributary_graph_ir::{BaseDirection, Term};
use tributary_profile::{Emit, ParseError, Position, RdfReader, Result, Source, TermProfile};

/// Deepest `<<( ... )>>` nesting accepted within one statement.
pub const MAX_TRIPLE_TERM_DEPTH: usize = 64;

/// Which of the two line-based syntaxes to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// One triple per line
    NTriples,
    /// One triple per line with an optional graph label
    NQuads,
}

impl Syntax {
    /// Guess from a file extension: `.nt` is N-Triples, `.nq` is N-Quads.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("nt") {
            Some(Syntax::NTriples)
        } else if ext.eq_ignore_ascii_case("nq") {
            Some(Syntax::NQuads)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Syntax::NTriples => "N-Triples",
            Syntax::NQuads => "N-Quads",
        }
    }
}

/// Reads N-Triples or N-Quads line by line.
///
/// Every term is built through the run's [`TermProfile`], so IRIs are
/// resolved and, when checking, validated with the profile's error handler.
/// N-Quads statements are emitted as quads, default graph included;
/// N-Triples statements are emitted as triples.
pub struct NQuadsReader {
    input: Box<dyn BufRead + Send>,
    syntax: Syntax,
}

impl std::fmt::Debug for NQuadsReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NQuadsReader")
            .field("syntax", &self.syntax)
            .finish_non_exhaustive()
    }
}

impl NQuadsReader {
    pub fn new(input: impl BufRead + Send + 'static, syntax: Syntax) -> Self {
        Self {
            input: Box::new(input),
            syntax,
        }
    }

    pub fn ntriples(input: impl BufRead + Send + 'static) -> Self {
        Self::new(input, Syntax::NTriples)
    }

    pub fn nquads(input: impl BufRead + Send + 'static) -> Self {
        Self::new(input, Syntax::NQuads)
    }

    /// Reader over in-memory text.
    pub fn from_text(text: impl Into<String>, syntax: Syntax) -> Self {
        Self::new(Cursor::new(text.into()), syntax)
    }

    /// Open a file. The syntax follows the extension, N-Quads when unknown.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let syntax = Syntax::from_path(path).unwrap_or(Syntax::NQuads);
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), syntax))
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }
}

impl RdfReader for NQuadsReader {
    fn read(&mut self, profile: &mut TermProfile, out: &mut dyn Emit) -> Result<()> {
        let mut buf = String::new();
        let mut line_no = 0u64;
        let mut statements = 0u64;

        loop {
            buf.clear();
            if self.input.read_line(&mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let line = buf.trim_end_matches(['\n', '\r']);
            let tokens = tokenize(line, line_no)?;
            if tokens.is_empty() {
                continue;
            }
            let end_col = crate::lexer::column(line, line.len());
            let mut parser = LineParser {
                tokens: &tokens,
                next: 0,
                depth: 0,
                line: line_no,
                end_col,
                profile: &mut *profile,
            };
            parser.statement(self.syntax, out)?;
            statements += 1;
        }

        tracing::debug!(
            syntax = self.syntax.name(),
            lines = line_no,
            statements,
            "finished reading"
        );
        Ok(())
    }
}

/// Open `path` as a [`Source`] named after the path.
///
/// `syntax` overrides the guess from the file extension.
pub fn file_source(path: impl AsRef<Path>, syntax: Option<Syntax>) -> Result<Source> {
    let path = path.as_ref();
    let reader = match syntax {
        Some(syntax) => NQuadsReader::new(BufReader::new(File::open(path)?), syntax),
        None => NQuadsReader::open(path)?,
    };
    Ok(Source::new(path.display().to_string(), reader))
}

/// Parser over the tokens of a single line.
struct LineParser<'t, 'p> {
    tokens: &'t [Token],
    next: usize,
    /// Open triple terms around the current position
    depth: usize,
    line: u64,
    end_col: u64,
    profile: &'p mut TermProfile,
}

impl<'t> LineParser<'t, '_> {
    fn position(&self, token: &Token) -> Position {
        Position::new(self.line, token.col)
    }

    fn error(&self, col: u64, message: impl Into<String>) -> ParseError {
        ParseError::syntax(Position::new(self.line, col), message)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.next)
    }

    fn advance(&mut self, expected: &str) -> Result<&'t Token> {
        match self.tokens.get(self.next) {
            Some(token) => {
                self.next += 1;
                Ok(token)
            }
            None => Err(self.error(self.end_col, format!("Expected {expected}, found end of line"))),
        }
    }

    fn statement(&mut self, syntax: Syntax, out: &mut dyn Emit) -> Result<()> {
        let start = self.position(&self.tokens[0]);
        let s = self.subject()?;
        let p = self.predicate()?;
        let o = self.object()?;

        let g = match (syntax, self.peek().map(|t| &t.kind)) {
            (Syntax::NQuads, Some(TokenKind::Iri(_) | TokenKind::BlankNode(_))) => {
                Some(self.graph()?)
            }
            _ => None,
        };

        let dot = self.advance("'.'")?;
        if dot.kind != TokenKind::Dot {
            let what = match syntax {
                Syntax::NTriples => "triple",
                Syntax::NQuads => "quad",
            };
            return Err(self.error(dot.col, format!("Expected '.' at end of {what}")));
        }
        if let Some(extra) = self.peek() {
            return Err(self.error(extra.col, "Only one statement is allowed per line"));
        }

        match syntax {
            Syntax::NTriples => out.triple(self.profile.create_triple(s, p, o, start)?),
            Syntax::NQuads => out.quad(self.profile.create_quad(g, s, p, o, start)?),
        }
    }

    fn subject(&mut self) -> Result<Term> {
        let token = self.advance("subject")?;
        match &token.kind {
            TokenKind::Iri(iri) => Ok(self.profile.create_iri(iri, self.position(token))?),
            TokenKind::BlankNode(label) => Ok(self.profile.create_blank_node(Some(label))),
            TokenKind::TripleTermOpen => Err(self.error(
                token.col,
                "Triple terms are only allowed in object position",
            )),
            _ => Err(self.error(token.col, "Expected subject (IRI or blank node)")),
        }
    }

    fn predicate(&mut self) -> Result<Term> {
        let token = self.advance("predicate")?;
        match &token.kind {
            TokenKind::Iri(iri) => Ok(self.profile.create_iri(iri, self.position(token))?),
            _ => Err(self.error(token.col, "Expected predicate IRI")),
        }
    }

    fn object(&mut self) -> Result<Term> {
        let token = self.advance("object")?;
        let position = self.position(token);
        match &token.kind {
            TokenKind::Iri(iri) => Ok(self.profile.create_iri(iri, position)?),
            TokenKind::BlankNode(label) => Ok(self.profile.create_blank_node(Some(label))),
            TokenKind::String(lexical) => self.literal(lexical, position),
            TokenKind::TripleTermOpen => self.triple_term(position),
            _ => Err(self.error(token.col, "Expected object (IRI, blank node, literal or triple term)")),
        }
    }

    fn literal(&mut self, lexical: &str, position: Position) -> Result<Term> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::LangTag(tag)) => {
                let token = self.advance("language tag")?;
                let (language, direction) = match tag.split_once("--") {
                    Some((language, dir)) => match BaseDirection::parse(dir) {
                        Some(direction) => (language, Some(direction)),
                        None => {
                            return Err(self.error(
                                token.col,
                                format!("Bad base direction '{dir}', expected 'ltr' or 'rtl'"),
                            ))
                        }
                    },
                    None => (tag.as_str(), None),
                };
                Ok(self
                    .profile
                    .create_lang_literal(lexical, language, direction, position)?)
            }
            Some(TokenKind::DoubleCaret) => {
                self.advance("'^^'")?;
                let token = self.advance("datatype IRI")?;
                match &token.kind {
                    TokenKind::Iri(datatype) => Ok(self
                        .profile
                        .create_typed_literal(lexical, datatype, position)?),
                    _ => Err(self.error(token.col, "Expected datatype IRI after '^^'")),
                }
            }
            _ => Ok(self.profile.create_string_literal(lexical)),
        }
    }

    fn triple_term(&mut self, position: Position) -> Result<Term> {
        if self.depth >= MAX_TRIPLE_TERM_DEPTH {
            return Err(ParseError::syntax(position, "Triple terms nested too deeply"));
        }
        self.depth += 1;
        let s = self.subject()?;
        let p = self.predicate()?;
        let o = self.object()?;
        let close = self.advance("')>>'")?;
        if close.kind != TokenKind::TripleTermClose {
            return Err(self.error(close.col, "Expected ')>>' to close triple term"));
        }
        self.depth -= 1;
        Ok(self.profile.create_triple_term(s, p, o, position)?)
    }

    fn graph(&mut self) -> Result<Term> {
        let token = self.advance("graph label")?;
        match &token.kind {
            TokenKind::Iri(iri) => Ok(self.profile.create_iri(iri, self.position(token))?),
            TokenKind::BlankNode(label) => Ok(self.profile.create_blank_node(Some(label))),
            _ => Err(self.error(token.col, "Expected graph label (IRI or blank node)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tributary_graph_ir::{CollectorSink, Datatype};
    use tributary_profile::parse_direct;

    fn parse(text: &str, syntax: Syntax) -> Result<CollectorSink> {
        let mut sink = CollectorSink::new();
        let source = Source::new("test", NQuadsReader::from_text(text, syntax));
        parse_direct(vec![source], &mut TermProfile::new(), &mut sink)?;
        Ok(sink)
    }

    fn ntriples(text: &str) -> Result<CollectorSink> {
        parse(text, Syntax::NTriples)
    }

    #[test]
    fn test_triples_with_literals() {
        let sink = ntriples(concat!(
            "<http://ex/s> <http://ex/p> \"plain\" .\n",
            "<http://ex/s> <http://ex/p> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n",
            "<http://ex/s> <http://ex/p> \"chat\"@fr .\n",
            "<http://ex/s> <http://ex/p> \"مرحبا\"@ar--rtl .\n",
        ))
        .unwrap();

        let objects: Vec<&Term> = sink.triples().iter().map(|t| &t.o).collect();
        assert_eq!(objects[0], &Term::string("plain"));
        assert_eq!(objects[1], &Term::typed("42", Datatype::xsd_integer()));
        assert_eq!(objects[2], &Term::lang_string("chat", "fr"));
        assert_eq!(objects[3].direction(), Some(BaseDirection::Rtl));
        assert_eq!(
            objects[3].datatype(),
            Some(&Datatype::rdf_dir_lang_string())
        );
        assert!(sink.is_finished());
    }

    #[test]
    fn test_comments_blank_lines_and_crlf() {
        let sink = ntriples(
            "# header\r\n\r\n<http://ex/a> <http://ex/p> <http://ex/b> . # trailing\r\n   \n",
        )
        .unwrap();
        assert_eq!(sink.triples().len(), 1);
    }

    #[test]
    fn test_blank_nodes_share_labels_within_a_document() {
        let sink = ntriples(concat!(
            "_:x <http://ex/p> _:y.\n",
            "_:y <http://ex/p> _:x .\n",
        ))
        .unwrap();
        let t = sink.triples();
        assert!(t[0].s.is_blank());
        assert_eq!(t[0].s, t[1].o);
        assert_eq!(t[0].o, t[1].s);
        assert_ne!(t[0].s, t[0].o);
    }

    #[test]
    fn test_triple_term_object() {
        let sink = ntriples(
            "_:e <http://ex/reifies> <<( <http://ex/s> <http://ex/p> \"o\" )>> .\n",
        )
        .unwrap();
        let inner = sink.triples()[0].o.as_triple().unwrap();
        assert_eq!(inner.s, Term::iri("http://ex/s"));
        assert_eq!(inner.o, Term::string("o"));
    }

    #[test]
    fn test_nested_triple_term() {
        let sink = ntriples(concat!(
            "<http://ex/a> <http://ex/b> ",
            "<<( <http://ex/s> <http://ex/p> <<( _:x <http://ex/q> \"1\" )>> )>> .\n"
        ))
        .unwrap();
        let outer = sink.triples()[0].o.as_triple().unwrap();
        assert!(outer.o.is_triple());
    }

    fn nested_line(levels: usize) -> String {
        let mut line = String::from("<http://ex/s> <http://ex/p> ");
        for _ in 0..levels {
            line.push_str("<<( <http://ex/s> <http://ex/p> ");
        }
        line.push_str("<http://ex/o>");
        for _ in 0..levels {
            line.push_str(" )>>");
        }
        line.push_str(" .\n");
        line
    }

    #[test]
    fn test_triple_term_nesting_is_bounded() {
        let sink = ntriples(&nested_line(MAX_TRIPLE_TERM_DEPTH)).unwrap();
        assert_eq!(sink.triples().len(), 1);

        let err = ntriples(&nested_line(100_000)).unwrap_err();
        match err {
            ParseError::Syntax { position, message } => {
                assert_eq!(message, "Triple terms nested too deeply");
                assert_eq!(position.line, Some(1));
                // 28 columns of subject and predicate, 32 per opened level
                assert_eq!(position.col, Some(29 + 32 * MAX_TRIPLE_TERM_DEPTH as u64));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nquads_graphs() {
        let sink = parse(
            concat!(
                "<http://ex/s> <http://ex/p> \"in g\" <http://ex/g> .\n",
                "<http://ex/s> <http://ex/p> \"in b\" _:g .\n",
                "<http://ex/s> <http://ex/p> \"default\" .\n",
            ),
            Syntax::NQuads,
        )
        .unwrap();
        let quads = sink.quads();
        assert_eq!(quads.len(), 3);
        assert_eq!(quads[0].g, Some(Term::iri("http://ex/g")));
        assert!(quads[1].g.as_ref().is_some_and(Term::is_blank));
        assert!(quads[2].is_default_graph());
        assert!(sink.triples().is_empty());
    }

    #[test]
    fn test_graph_label_rejected_in_ntriples() {
        let err = ntriples("<http://ex/s> <http://ex/p> <http://ex/o> <http://ex/g> .\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error [line: 1, col: 43]: Expected '.' at end of triple"
        );
    }

    #[test]
    fn test_missing_dot() {
        let err = ntriples(concat!(
            "<http://ex/s> <http://ex/p> <http://ex/o> .\n",
            "<http://ex/s> <http://ex/p> <http://ex/o>\n",
        ))
        .unwrap_err();
        match err {
            ParseError::Syntax { position, message } => {
                assert_eq!(position.line, Some(2));
                assert_eq!(position.col, Some(42));
                assert_eq!(message, "Expected '.', found end of line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shape_errors() {
        let err = ntriples("\"lit\" <http://ex/p> <http://ex/o> .\n").unwrap_err();
        assert!(err.to_string().contains("Expected subject"));

        let err = ntriples("<http://ex/s> _:p <http://ex/o> .\n").unwrap_err();
        assert!(err.to_string().contains("Expected predicate IRI"));

        let err = ntriples("<<( <http://ex/s> <http://ex/p> <http://ex/o> )>> <http://ex/p> <http://ex/o> .\n")
            .unwrap_err();
        assert!(err.to_string().contains("only allowed in object position"));

        let err = ntriples("<http://ex/s> <http://ex/p> <http://ex/o> . <http://ex/s> <http://ex/p> <http://ex/o> .\n")
            .unwrap_err();
        assert!(err.to_string().contains("one statement"));
    }

    #[test]
    fn test_bad_direction() {
        let err = ntriples("<http://ex/s> <http://ex/p> \"x\"@en--up .\n").unwrap_err();
        assert!(err.to_string().contains("Bad base direction 'up'"));
    }

    #[test]
    fn test_profile_errors_abort() {
        let err = ntriples("<relative> <http://ex/p> <http://ex/o> .\n").unwrap_err();
        assert!(matches!(err, ParseError::Abort(_)));

        let err = ntriples("<http://ex/a b> <http://ex/p> <http://ex/o> .\n").unwrap_err();
        assert!(err.to_string().contains("Spaces"));
    }

    #[test]
    fn test_statements_before_error_are_delivered() {
        let mut sink = CollectorSink::new();
        let text = "<http://ex/s> <http://ex/p> \"1\" .\n<http://ex/s> <http://ex/p> .\n";
        let source = Source::new("doc", NQuadsReader::from_text(text, Syntax::NTriples));
        let err = parse_direct(vec![source], &mut TermProfile::new(), &mut sink).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert_eq!(sink.triples().len(), 1);
        assert!(!sink.is_finished());
    }

    #[test]
    fn test_syntax_from_path() {
        assert_eq!(Syntax::from_path(Path::new("a/b.nt")), Some(Syntax::NTriples));
        assert_eq!(Syntax::from_path(Path::new("b.NQ")), Some(Syntax::NQuads));
        assert_eq!(Syntax::from_path(Path::new("b.ttl")), None);
    }
}
