//! Lexical-space checks for XSD datatypes
//!
//! [`check`] answers "is this lexical form in the lexical space of this
//! datatype". Datatypes without a known lexical grammar return `None` and are
//! treated as valid by the validator.

use crate::langtag;
use once_cell::sync::Lazy;
use regex::Regex;
use tributary_vocab::xsd;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("lexical pattern is valid"));
    };
}

const TZ: &str = r"(?:Z|[+-](?:(?:0[0-9]|1[0-3]):[0-5][0-9]|14:00))";
const YEAR: &str = r"-?(?:[1-9][0-9]{4,}|[0-9]{4})";
const MONTH: &str = r"(?:0[1-9]|1[0-2])";
const DAY: &str = r"(?:0[1-9]|[12][0-9]|3[01])";
const TIME: &str = r"(?:(?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9](?:\.[0-9]+)?|24:00:00(?:\.0+)?)";

pattern!(INTEGER, r"^[+-]?[0-9]+$");
pattern!(DECIMAL, r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$");
pattern!(
    FLOATING,
    r"^(?:[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?|[+-]?INF|NaN)$"
);
pattern!(
    DURATION,
    r"^-?P(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+(?:\.[0-9]+)?S)?)?$"
);
pattern!(YEAR_MONTH_DURATION, r"^-?P(?:[0-9]+Y)?(?:[0-9]+M)?$");
pattern!(
    DAY_TIME_DURATION,
    r"^-?P(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+(?:\.[0-9]+)?S)?)?$"
);
pattern!(HEX_BINARY, r"^(?:[0-9a-fA-F]{2})*$");
pattern!(
    BASE64_BINARY,
    r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$"
);

static DATE_TIME: Lazy<Regex> = Lazy::new(|| compile(&format!("{YEAR}-{MONTH}-{DAY}T{TIME}{TZ}?")));
static DATE_TIME_STAMP: Lazy<Regex> =
    Lazy::new(|| compile(&format!("{YEAR}-{MONTH}-{DAY}T{TIME}{TZ}")));
static DATE: Lazy<Regex> = Lazy::new(|| compile(&format!("{YEAR}-{MONTH}-{DAY}{TZ}?")));
static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| compile(&format!("{TIME}{TZ}?")));
static G_YEAR: Lazy<Regex> = Lazy::new(|| compile(&format!("{YEAR}{TZ}?")));
static G_YEAR_MONTH: Lazy<Regex> = Lazy::new(|| compile(&format!("{YEAR}-{MONTH}{TZ}?")));
static G_MONTH: Lazy<Regex> = Lazy::new(|| compile(&format!("--{MONTH}{TZ}?")));
static G_DAY: Lazy<Regex> = Lazy::new(|| compile(&format!("---{DAY}{TZ}?")));
static G_MONTH_DAY: Lazy<Regex> = Lazy::new(|| compile(&format!("--{MONTH}-{DAY}{TZ}?")));

fn compile(body: &str) -> Regex {
    Regex::new(&format!("^{body}$")).expect("lexical pattern is valid")
}

/// Inclusive bounds of an integer-derived type; `None` is unbounded.
fn integer_bounds(datatype: &str) -> Option<(Option<i128>, Option<i128>)> {
    let bounds = match datatype {
        xsd::INTEGER => (None, None),
        xsd::LONG => (Some(i64::MIN as i128), Some(i64::MAX as i128)),
        xsd::INT => (Some(i32::MIN as i128), Some(i32::MAX as i128)),
        xsd::SHORT => (Some(i16::MIN as i128), Some(i16::MAX as i128)),
        xsd::BYTE => (Some(i8::MIN as i128), Some(i8::MAX as i128)),
        xsd::UNSIGNED_LONG => (Some(0), Some(u64::MAX as i128)),
        xsd::UNSIGNED_INT => (Some(0), Some(u32::MAX as i128)),
        xsd::UNSIGNED_SHORT => (Some(0), Some(u16::MAX as i128)),
        xsd::UNSIGNED_BYTE => (Some(0), Some(u8::MAX as i128)),
        xsd::NON_NEGATIVE_INTEGER => (Some(0), None),
        xsd::POSITIVE_INTEGER => (Some(1), None),
        xsd::NON_POSITIVE_INTEGER => (None, Some(0)),
        xsd::NEGATIVE_INTEGER => (None, Some(-1)),
        _ => return None,
    };
    Some(bounds)
}

fn check_integer(lexical: &str, min: Option<i128>, max: Option<i128>) -> bool {
    if !INTEGER.is_match(lexical) {
        return false;
    }
    match lexical.parse::<i128>() {
        Ok(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
        // Out of i128 range: only an unbounded side can accept it
        Err(_) => {
            if lexical.starts_with('-') {
                min.is_none()
            } else {
                max.is_none()
            }
        }
    }
}

fn is_normalized(lexical: &str) -> bool {
    !lexical.contains(['\r', '\n', '\t'])
}

fn is_token(lexical: &str) -> bool {
    is_normalized(lexical)
        && !lexical.starts_with(' ')
        && !lexical.ends_with(' ')
        && !lexical.contains("  ")
}

/// Whether `lexical` is in the lexical space of `datatype`.
///
/// `None` when the datatype has no known lexical grammar.
pub fn check(datatype: &str, lexical: &str) -> Option<bool> {
    if let Some((min, max)) = integer_bounds(datatype) {
        return Some(check_integer(lexical, min, max));
    }
    let valid = match datatype {
        xsd::STRING | xsd::ANY_URI => true,
        xsd::NORMALIZED_STRING => is_normalized(lexical),
        xsd::TOKEN => is_token(lexical),
        xsd::LANGUAGE => langtag::is_well_formed(lexical),
        xsd::BOOLEAN => matches!(lexical, "true" | "false" | "1" | "0"),
        xsd::DECIMAL => DECIMAL.is_match(lexical),
        xsd::FLOAT | xsd::DOUBLE => FLOATING.is_match(lexical),
        xsd::DATE_TIME => DATE_TIME.is_match(lexical),
        xsd::DATE_TIME_STAMP => DATE_TIME_STAMP.is_match(lexical),
        xsd::DATE => DATE.is_match(lexical),
        xsd::TIME => TIME_OF_DAY.is_match(lexical),
        xsd::G_YEAR => G_YEAR.is_match(lexical),
        xsd::G_YEAR_MONTH => G_YEAR_MONTH.is_match(lexical),
        xsd::G_MONTH => G_MONTH.is_match(lexical),
        xsd::G_DAY => G_DAY.is_match(lexical),
        xsd::G_MONTH_DAY => G_MONTH_DAY.is_match(lexical),
        // "P" and "PT" alone are not durations
        xsd::DURATION => {
            DURATION.is_match(lexical) && !lexical.ends_with('P') && !lexical.ends_with('T')
        }
        xsd::YEAR_MONTH_DURATION => {
            YEAR_MONTH_DURATION.is_match(lexical) && !lexical.ends_with('P')
        }
        xsd::DAY_TIME_DURATION => {
            DAY_TIME_DURATION.is_match(lexical)
                && !lexical.ends_with('P')
                && !lexical.ends_with('T')
        }
        xsd::HEX_BINARY => HEX_BINARY.is_match(lexical),
        xsd::BASE64_BINARY => {
            let compact: String = lexical.chars().filter(|c| *c != ' ').collect();
            BASE64_BINARY.is_match(&compact)
        }
        _ => return None,
    };
    Some(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(check(xsd::INTEGER, "42"), Some(true));
        assert_eq!(check(xsd::INTEGER, "-0"), Some(true));
        assert_eq!(check(xsd::INTEGER, "+7"), Some(true));
        assert_eq!(check(xsd::INTEGER, "notanumber"), Some(false));
        assert_eq!(check(xsd::INTEGER, "1.0"), Some(false));
        assert_eq!(check(xsd::INTEGER, ""), Some(false));
        assert_eq!(
            check(xsd::INTEGER, "123456789012345678901234567890123456789012"),
            Some(true)
        );
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(check(xsd::BYTE, "127"), Some(true));
        assert_eq!(check(xsd::BYTE, "128"), Some(false));
        assert_eq!(check(xsd::UNSIGNED_INT, "-1"), Some(false));
        assert_eq!(check(xsd::UNSIGNED_LONG, "18446744073709551615"), Some(true));
        assert_eq!(check(xsd::POSITIVE_INTEGER, "0"), Some(false));
        assert_eq!(check(xsd::NEGATIVE_INTEGER, "-1"), Some(true));
        assert_eq!(
            check(xsd::NON_NEGATIVE_INTEGER, "-99999999999999999999999999999999999999999"),
            Some(false)
        );
    }

    #[test]
    fn test_numbers_and_booleans() {
        assert_eq!(check(xsd::DECIMAL, "3.14"), Some(true));
        assert_eq!(check(xsd::DECIMAL, ".5"), Some(true));
        assert_eq!(check(xsd::DECIMAL, "1e3"), Some(false));
        assert_eq!(check(xsd::DOUBLE, "1e3"), Some(true));
        assert_eq!(check(xsd::DOUBLE, "INF"), Some(true));
        assert_eq!(check(xsd::FLOAT, "nan"), Some(false));
        assert_eq!(check(xsd::BOOLEAN, "true"), Some(true));
        assert_eq!(check(xsd::BOOLEAN, "True"), Some(false));
    }

    #[test]
    fn test_temporal() {
        assert_eq!(check(xsd::DATE_TIME, "2024-01-15T10:30:00Z"), Some(true));
        assert_eq!(check(xsd::DATE_TIME, "2024-01-15T10:30:00.125+05:30"), Some(true));
        assert_eq!(check(xsd::DATE_TIME, "2024-01-15"), Some(false));
        assert_eq!(check(xsd::DATE_TIME_STAMP, "2024-01-15T10:30:00"), Some(false));
        assert_eq!(check(xsd::DATE, "2024-13-01"), Some(false));
        assert_eq!(check(xsd::TIME, "24:00:00"), Some(true));
        assert_eq!(check(xsd::G_YEAR, "2024"), Some(true));
        assert_eq!(check(xsd::G_MONTH_DAY, "--12-25"), Some(true));
        assert_eq!(check(xsd::DURATION, "P1Y2M3DT4H5M6.5S"), Some(true));
        assert_eq!(check(xsd::DURATION, "P"), Some(false));
        assert_eq!(check(xsd::DURATION, "P1DT"), Some(false));
        assert_eq!(check(xsd::YEAR_MONTH_DURATION, "P1D"), Some(false));
    }

    #[test]
    fn test_strings_and_binary() {
        assert_eq!(check(xsd::STRING, "anything\n"), Some(true));
        assert_eq!(check(xsd::NORMALIZED_STRING, "a\tb"), Some(false));
        assert_eq!(check(xsd::TOKEN, "a  b"), Some(false));
        assert_eq!(check(xsd::TOKEN, "a b"), Some(true));
        assert_eq!(check(xsd::LANGUAGE, "en-GB"), Some(true));
        assert_eq!(check(xsd::HEX_BINARY, "0FB7"), Some(true));
        assert_eq!(check(xsd::HEX_BINARY, "0FB"), Some(false));
        assert_eq!(check(xsd::BASE64_BINARY, "aGVsbG8="), Some(true));
        assert_eq!(check(xsd::BASE64_BINARY, "aGVsbG8"), Some(false));
    }

    #[test]
    fn test_unknown_datatype() {
        assert_eq!(check("http://example.org/myType", "whatever"), None);
    }
}
