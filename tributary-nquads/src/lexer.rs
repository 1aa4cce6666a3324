//! Line tokenizer for N-Triples and N-Quads using winnow.
//!
//! Each line is tokenized on its own; a statement never spans lines. The
//! tokenizer fails fast on the first bad token, reporting its column.

use crate::chars::{is_blank_label_start, is_iri_char, is_pn_chars, is_ws};
use tributary_profile::{ParseError, Position};
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::{AsChar, Location, Stream};
use winnow::token::take_while;
use winnow::{LocatingSlice, ModalResult, Parser};

type Input<'a> = LocatingSlice<&'a str>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `<...>` with escapes decoded
    Iri(String),
    /// `_:label`, label only
    BlankNode(String),
    /// `"..."` with escapes decoded
    String(String),
    /// `@tag`, possibly `@tag--dir`
    LangTag(String),
    DoubleCaret,
    /// `<<(`
    TripleTermOpen,
    /// `)>>`
    TripleTermClose,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// 1-based column of the token's first character
    pub col: u64,
}

/// Tokenize one line, without its line terminator.
pub(crate) fn tokenize(line: &str, line_no: u64) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut input = LocatingSlice::new(line);

    loop {
        skip_ws(&mut input);
        if input.is_empty() || input.starts_with('#') {
            break;
        }

        let start = input.current_token_start();
        match next_token(&mut input) {
            Ok(kind) => tokens.push(Token {
                kind,
                col: column(line, start),
            }),
            Err(_) => {
                let rest = line.get(start..).unwrap_or_default();
                return Err(ParseError::syntax(
                    Position::new(line_no, column(line, start)),
                    describe(rest),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Column of a byte offset, counting characters.
pub(crate) fn column(line: &str, offset: usize) -> u64 {
    let chars = match line.get(..offset) {
        Some(prefix) => prefix.chars().count(),
        None => offset,
    };
    chars as u64 + 1
}

fn describe(rest: &str) -> String {
    match rest.chars().next() {
        Some('"') => "Unterminated string or bad escape sequence".to_string(),
        Some('<') => "Bad IRI reference".to_string(),
        Some('_') => "Bad blank node label".to_string(),
        Some('@') => "Bad language tag".to_string(),
        Some(c) if c.is_control() => format!("Unexpected character U+{:04X}", c as u32),
        Some(c) => format!("Unexpected character '{c}'"),
        None => "Unexpected end of line".to_string(),
    }
}

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

fn skip_ws(input: &mut Input<'_>) {
    let _: ModalResult<&str, ContextError> = take_while(0.., is_ws).parse_next(input);
}

fn next_token(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((
        "<<(".value(TokenKind::TripleTermOpen),
        ")>>".value(TokenKind::TripleTermClose),
        "^^".value(TokenKind::DoubleCaret),
        '.'.value(TokenKind::Dot),
        iri_ref,
        blank_node_label,
        string_literal,
        lang_tag,
    ))
    .parse_next(input)
}

fn iri_ref(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    delimited('<', iri_content, '>')
        .map(TokenKind::Iri)
        .parse_next(input)
}

fn iri_content(input: &mut Input<'_>) -> ModalResult<String> {
    let mut iri = String::new();
    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        iri.push_str(chunk);
        if !input.starts_with('\\') {
            return Ok(iri);
        }
        input.next_token();
        iri.push(unicode_escape(input)?);
    }
}

/// `\uXXXX` or `\UXXXXXXXX`, backslash already consumed.
fn unicode_escape(input: &mut Input<'_>) -> ModalResult<char> {
    let width: usize = match input.chars().next() {
        Some('u') => 4,
        Some('U') => 8,
        _ => return backtrack(),
    };
    input.next_token();
    let hex: &str = take_while(width..=width, AsChar::is_hex_digit).parse_next(input)?;
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => Ok(c),
        None => backtrack(),
    }
}

/// `_:label`. A trailing `.` belongs to the statement, not the label.
fn blank_node_label(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    if !input.starts_with("_:") {
        return backtrack();
    }

    let mut len = 0;
    for (i, c) in input.char_indices().skip(2) {
        let allowed = if i == 2 {
            is_blank_label_start(c)
        } else {
            is_pn_chars(c) || c == '.'
        };
        if !allowed {
            break;
        }
        if c != '.' {
            len = i + c.len_utf8();
        }
    }
    if len == 0 {
        return backtrack();
    }

    let label = input.next_slice(len);
    Ok(TokenKind::BlankNode(label[2..].to_string()))
}

fn string_literal(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    delimited('"', string_content, '"')
        .map(TokenKind::String)
        .parse_next(input)
}

fn string_content(input: &mut Input<'_>) -> ModalResult<String> {
    let mut value = String::new();
    loop {
        let chunk: &str = take_while(0.., |c: char| !matches!(c, '"' | '\\' | '\n' | '\r'))
            .parse_next(input)?;
        value.push_str(chunk);
        if !input.starts_with('\\') {
            return Ok(value);
        }
        input.next_token();
        value.push(escape(input)?);
    }
}

/// `ECHAR` or `UCHAR`, backslash already consumed.
fn escape(input: &mut Input<'_>) -> ModalResult<char> {
    let unescaped = match input.chars().next() {
        Some('u' | 'U') => return unicode_escape(input),
        Some('t') => '\t',
        Some('b') => '\u{8}',
        Some('n') => '\n',
        Some('r') => '\r',
        Some('f') => '\u{c}',
        Some('"') => '"',
        Some('\'') => '\'',
        Some('\\') => '\\',
        _ => return backtrack(),
    };
    input.next_token();
    Ok(unescaped)
}

fn lang_tag(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    if !input.starts_with('@') {
        return backtrack();
    }
    input.next_token();
    let tag: &str =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)?;
    Ok(TokenKind::LangTag(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line, 1)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_triple() {
        assert_eq!(
            kinds("<http://ex/s> <http://ex/p> \"o\" ."),
            vec![
                TokenKind::Iri("http://ex/s".into()),
                TokenKind::Iri("http://ex/p".into()),
                TokenKind::String("o".into()),
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn test_columns() {
        let tokens = tokenize("<a>\t_:b \"é\"@en .", 1).unwrap();
        let cols: Vec<u64> = tokens.iter().map(|t| t.col).collect();
        assert_eq!(cols, vec![1, 5, 9, 12, 16]);
    }

    #[test]
    fn test_blank_label_excludes_trailing_dot() {
        assert_eq!(
            kinds("_:a.b _:c."),
            vec![
                TokenKind::BlankNode("a.b".into()),
                TokenKind::BlankNode("c".into()),
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n\u00E9\U0001F600""#),
            vec![TokenKind::String("a\"b\n\u{e9}\u{1F600}".into())]
        );
    }

    #[test]
    fn test_iri_escape() {
        assert_eq!(
            kinds(r"<http://ex/\u00E9>"),
            vec![TokenKind::Iri("http://ex/\u{e9}".into())]
        );
    }

    #[test]
    fn test_literal_suffixes() {
        assert_eq!(
            kinds("\"x\"@en--rtl \"1\"^^<http://ex/t>"),
            vec![
                TokenKind::String("x".into()),
                TokenKind::LangTag("en--rtl".into()),
                TokenKind::String("1".into()),
                TokenKind::DoubleCaret,
                TokenKind::Iri("http://ex/t".into()),
            ]
        );
    }

    #[test]
    fn test_triple_term_delimiters() {
        assert_eq!(
            kinds("<<( _:s <p> <o> )>>"),
            vec![
                TokenKind::TripleTermOpen,
                TokenKind::BlankNode("s".into()),
                TokenKind::Iri("p".into()),
                TokenKind::Iri("o".into()),
                TokenKind::TripleTermClose,
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert!(kinds("").is_empty());
        assert!(kinds("   # just a comment").is_empty());
        assert_eq!(kinds("<a> <b> <c> . # trailing").len(), 4);
    }

    #[test]
    fn test_errors_carry_column() {
        let err = tokenize("<a> <b> \"open", 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error [line: 3, col: 9]: Unterminated string or bad escape sequence"
        );

        let err = tokenize(r#"<a> <b> "bad \q" ."#, 1).unwrap_err();
        assert!(err.to_string().contains("col: 9"));

        let err = tokenize("<a> ; <c>", 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error [line: 1, col: 5]: Unexpected character ';'"
        );
    }
}
