//! Character classes of the N-Triples grammar.

/// `PN_CHARS_BASE`
pub fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

/// `PN_CHARS_U`, extended with the colon allowed in N-Triples labels.
pub fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_' || c == ':'
}

/// `PN_CHARS`
pub fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || c == '-'
        || c.is_ascii_digit()
        || c == '\u{00B7}'
        || matches!(c, '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// First character of a blank node label.
pub fn is_blank_label_start(c: char) -> bool {
    is_pn_chars_u(c) || c.is_ascii_digit()
}

/// Whitespace between tokens. Line ends are handled by the reader.
pub fn is_ws(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Characters allowed unescaped between `<` and `>`.
///
/// Space is let through here so the profile can report it with its own
/// diagnostic instead of a generic syntax error.
pub fn is_iri_char(c: char) -> bool {
    !matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\x00'..='\x1F')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_label_classes() {
        assert!(is_blank_label_start('0'));
        assert!(is_blank_label_start('_'));
        assert!(!is_blank_label_start('-'));
        assert!(is_pn_chars('-'));
        assert!(!is_pn_chars('.'));
    }

    #[test]
    fn test_iri_chars() {
        assert!(is_iri_char('#'));
        assert!(is_iri_char(' '));
        assert!(!is_iri_char('>'));
        assert!(!is_iri_char('\n'));
    }
}
