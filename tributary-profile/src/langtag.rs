//! BCP 47 language-tag well-formedness (RFC 5646 §2.1 ABNF)
//!
//! Only syntax is checked. Subtags are not looked up in the IANA registry.

use once_cell::sync::Lazy;
use regex::Regex;

static LANG_TAG: Lazy<Regex> = Lazy::new(|| {
    let alnum = "[a-z0-9]";
    let language = "(?:[a-z]{2,3}(?:-[a-z]{3}){0,3}|[a-z]{4}|[a-z]{5,8})";
    let script = "(?:-[a-z]{4})?";
    let region = "(?:-(?:[a-z]{2}|[0-9]{3}))?";
    let variant = format!("(?:-(?:{alnum}{{5,8}}|[0-9]{alnum}{{3}}))*");
    let extension = format!("(?:-[0-9a-wyz](?:-{alnum}{{2,8}})+)*");
    let privateuse = format!("x(?:-{alnum}{{1,8}})+");
    let grandfathered = "en-gb-oed|i-ami|i-bnn|i-default|i-enochian|i-hak|i-klingon|i-lux|\
                         i-mingo|i-navajo|i-pwn|i-tao|i-tay|i-tsu|sgn-be-fr|sgn-be-nl|sgn-ch-de|\
                         art-lojban|cel-gaulish|no-bok|no-nyn|zh-guoyu|zh-hakka|zh-min|zh-min-nan|\
                         zh-xiang";
    let pattern = format!(
        "(?i)^(?:{language}{script}{region}{variant}{extension}(?:-{privateuse})?|{privateuse}|{grandfathered})$"
    );
    Regex::new(&pattern).expect("language tag pattern is valid")
});

/// Whether `tag` is a well-formed BCP 47 language tag.
pub fn is_well_formed(tag: &str) -> bool {
    LANG_TAG.is_match(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_tags() {
        for tag in [
            "en",
            "EN",
            "en-US",
            "zh-Hant-TW",
            "sr-Latn-RS",
            "de-CH-1996",
            "es-419",
            "x-private",
            "en-a-bbb-x-ccc",
            "i-klingon",
            "zh-yue-HK",
        ] {
            assert!(is_well_formed(tag), "{tag} should be well formed");
        }
    }

    #[test]
    fn test_malformed_tags() {
        for tag in ["", "e", "en_US", "123", "en-", "-en", "en--US", "toolongtag", "en-US-x"] {
            assert!(!is_well_formed(tag), "{tag} should be rejected");
        }
    }
}
