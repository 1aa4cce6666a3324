//! RDF Vocabulary Constants for tributary
//!
//! This crate provides a centralized location for the RDF and XSD vocabulary
//! IRIs used while building, validating and abbreviating terms.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `owl` - OWL vocabulary (http://www.w3.org/2002/07/owl#)
//! - `prefixes` - Conventional prefix/namespace pairs

/// RDF vocabulary constants
pub mod rdf {
    /// RDF namespace IRI
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:dirLangString IRI (RDF 1.2 language string with base direction)
    pub const DIR_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#dirLangString";

    /// Datatypes reserved for language-tagged strings.
    ///
    /// A literal may only carry one of these when it also carries a language tag.
    #[inline]
    pub fn is_reserved_lang_datatype(datatype_iri: &str) -> bool {
        matches!(datatype_iri, LANG_STRING | DIR_LANG_STRING)
    }
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// RDFS namespace IRI
    pub const NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

}

/// OWL vocabulary constants
pub mod owl {
    /// OWL namespace IRI
    pub const NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
}

/// XSD vocabulary constants
pub mod xsd {
    /// XSD namespace IRI
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:long IRI
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";

    /// xsd:int IRI
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";

    /// xsd:short IRI
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";

    /// xsd:byte IRI
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";

    /// xsd:unsignedLong IRI
    pub const UNSIGNED_LONG: &str = "http://www.w3.org/2001/XMLSchema#unsignedLong";

    /// xsd:unsignedInt IRI
    pub const UNSIGNED_INT: &str = "http://www.w3.org/2001/XMLSchema#unsignedInt";

    /// xsd:unsignedShort IRI
    pub const UNSIGNED_SHORT: &str = "http://www.w3.org/2001/XMLSchema#unsignedShort";

    /// xsd:unsignedByte IRI
    pub const UNSIGNED_BYTE: &str = "http://www.w3.org/2001/XMLSchema#unsignedByte";

    /// xsd:nonNegativeInteger IRI
    pub const NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";

    /// xsd:positiveInteger IRI
    pub const POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#positiveInteger";

    /// xsd:nonPositiveInteger IRI
    pub const NON_POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";

    /// xsd:negativeInteger IRI
    pub const NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#negativeInteger";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:float IRI
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:dateTimeStamp IRI
    pub const DATE_TIME_STAMP: &str = "http://www.w3.org/2001/XMLSchema#dateTimeStamp";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:time IRI
    pub const TIME: &str = "http://www.w3.org/2001/XMLSchema#time";

    /// xsd:gYear IRI
    pub const G_YEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";

    /// xsd:gYearMonth IRI
    pub const G_YEAR_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gYearMonth";

    /// xsd:gMonth IRI
    pub const G_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gMonth";

    /// xsd:gDay IRI
    pub const G_DAY: &str = "http://www.w3.org/2001/XMLSchema#gDay";

    /// xsd:gMonthDay IRI
    pub const G_MONTH_DAY: &str = "http://www.w3.org/2001/XMLSchema#gMonthDay";

    /// xsd:duration IRI
    pub const DURATION: &str = "http://www.w3.org/2001/XMLSchema#duration";

    /// xsd:dayTimeDuration IRI
    pub const DAY_TIME_DURATION: &str = "http://www.w3.org/2001/XMLSchema#dayTimeDuration";

    /// xsd:yearMonthDuration IRI
    pub const YEAR_MONTH_DURATION: &str = "http://www.w3.org/2001/XMLSchema#yearMonthDuration";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    /// xsd:normalizedString IRI
    pub const NORMALIZED_STRING: &str = "http://www.w3.org/2001/XMLSchema#normalizedString";

    /// xsd:token IRI
    pub const TOKEN: &str = "http://www.w3.org/2001/XMLSchema#token";

    /// xsd:language IRI
    pub const LANGUAGE: &str = "http://www.w3.org/2001/XMLSchema#language";

    /// xsd:base64Binary IRI
    pub const BASE64_BINARY: &str = "http://www.w3.org/2001/XMLSchema#base64Binary";

    /// xsd:hexBinary IRI
    pub const HEX_BINARY: &str = "http://www.w3.org/2001/XMLSchema#hexBinary";

    /// Check if a datatype IRI is an integer-family type
    #[inline]
    pub fn is_integer_family(datatype_iri: &str) -> bool {
        matches!(
            datatype_iri,
            INTEGER
                | LONG
                | INT
                | SHORT
                | BYTE
                | UNSIGNED_LONG
                | UNSIGNED_INT
                | UNSIGNED_SHORT
                | UNSIGNED_BYTE
                | NON_NEGATIVE_INTEGER
                | POSITIVE_INTEGER
                | NON_POSITIVE_INTEGER
                | NEGATIVE_INTEGER
        )
    }

    /// Check if a datatype IRI is a numeric type
    #[inline]
    pub fn is_numeric_datatype(datatype_iri: &str) -> bool {
        is_integer_family(datatype_iri) || matches!(datatype_iri, DECIMAL | FLOAT | DOUBLE)
    }

    /// Check if a datatype IRI is a string-like type
    ///
    /// Every lexical form of a string-like type is valid apart from the
    /// whitespace constraints of `normalizedString` and `token`.
    #[inline]
    pub fn is_string_like(datatype_iri: &str) -> bool {
        matches!(datatype_iri, STRING | NORMALIZED_STRING | TOKEN | ANY_URI)
    }
}

/// Conventional prefix/namespace pairs
///
/// Used to seed a prefix index for abbreviation when no document prefixes
/// are known.
pub mod prefixes {
    use super::{owl, rdf, rdfs, xsd};

    /// `(prefix, namespace)` pairs for the W3C core vocabularies.
    pub const STANDARD: &[(&str, &str)] = &[
        ("rdf", rdf::NAMESPACE),
        ("rdfs", rdfs::NAMESPACE),
        ("xsd", xsd::NAMESPACE),
        ("owl", owl::NAMESPACE),
    ];
}
