//! RDF datatype representation
//!
//! Datatypes are always explicit in this IR - there is no "untyped" literal.
//! Plain strings default to `xsd:string`, language-tagged strings use
//! `rdf:langString`, and language-tagged strings with a base direction use
//! `rdf:dirLangString`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Common XSD and RDF datatype IRIs (re-exported from vocab crate)
pub mod iri {
    pub use tributary_vocab::rdf::{
        DIR_LANG_STRING as RDF_DIR_LANG_STRING, LANG_STRING as RDF_LANG_STRING,
    };
    pub use tributary_vocab::xsd::{
        BOOLEAN as XSD_BOOLEAN, DATE as XSD_DATE, DATE_TIME as XSD_DATE_TIME,
        DECIMAL as XSD_DECIMAL, DOUBLE as XSD_DOUBLE, INTEGER as XSD_INTEGER,
        STRING as XSD_STRING,
    };
}

/// RDF literal datatype, always an expanded IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Datatype(Arc<str>);

impl Datatype {
    /// Create a datatype from an expanded IRI
    pub fn from_iri(iri: impl AsRef<str>) -> Self {
        Datatype(Arc::from(iri.as_ref()))
    }

    /// xsd:string - default for plain string literals
    pub fn xsd_string() -> Self {
        Self::from_iri(iri::XSD_STRING)
    }

    /// xsd:boolean
    pub fn xsd_boolean() -> Self {
        Self::from_iri(iri::XSD_BOOLEAN)
    }

    /// xsd:integer
    pub fn xsd_integer() -> Self {
        Self::from_iri(iri::XSD_INTEGER)
    }

    /// xsd:decimal
    pub fn xsd_decimal() -> Self {
        Self::from_iri(iri::XSD_DECIMAL)
    }

    /// xsd:double
    pub fn xsd_double() -> Self {
        Self::from_iri(iri::XSD_DOUBLE)
    }

    /// xsd:date
    pub fn xsd_date() -> Self {
        Self::from_iri(iri::XSD_DATE)
    }

    /// xsd:dateTime
    pub fn xsd_date_time() -> Self {
        Self::from_iri(iri::XSD_DATE_TIME)
    }

    /// rdf:langString - for language-tagged literals
    pub fn rdf_lang_string() -> Self {
        Self::from_iri(iri::RDF_LANG_STRING)
    }

    /// rdf:dirLangString - for language-tagged literals with a base direction
    pub fn rdf_dir_lang_string() -> Self {
        Self::from_iri(iri::RDF_DIR_LANG_STRING)
    }

    /// Get the IRI representation of this datatype
    pub fn as_iri(&self) -> &str {
        &self.0
    }

    /// Check if this is the xsd:string datatype
    pub fn is_xsd_string(&self) -> bool {
        self.as_iri() == iri::XSD_STRING
    }

    /// Check if this is the rdf:langString datatype
    pub fn is_lang_string(&self) -> bool {
        self.as_iri() == iri::RDF_LANG_STRING
    }

    /// Check if this is the rdf:dirLangString datatype
    pub fn is_dir_lang_string(&self) -> bool {
        self.as_iri() == iri::RDF_DIR_LANG_STRING
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_iri())
    }
}
