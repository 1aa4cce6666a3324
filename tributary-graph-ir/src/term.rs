//! RDF term types: IRI, blank node, literal and triple term
//!
//! Terms are the building blocks of triples. A term can be:
//! - An IRI (always resolved, never relative or prefixed)
//! - A blank node (with a run-scoped identifier)
//! - A literal (lexical form + explicit datatype + optional language tag
//!   and base direction)
//! - A triple term (RDF 1.2), only valid in object position
//!
//! Terms are immutable once constructed; cloning is cheap (`Arc` payloads).

use crate::{Datatype, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Blank node identifier
///
/// Blank node IDs are stable within one parse run but have no global meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node ID from a label
    ///
    /// The label should NOT include the `_:` prefix.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the label (without `_:` prefix)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the full N-Triples representation (`_:label`)
    pub fn to_ntriples(&self) -> String {
        format!("_:{}", self.0)
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Initial text direction of a language-tagged string (RDF 1.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseDirection {
    Ltr,
    Rtl,
}

impl BaseDirection {
    /// Parse the lowercase keyword used by the concrete syntaxes.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ltr" => Some(BaseDirection::Ltr),
            "rtl" => Some(BaseDirection::Rtl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BaseDirection::Ltr => "ltr",
            BaseDirection::Rtl => "rtl",
        }
    }
}

impl fmt::Display for BaseDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An RDF term (subject, predicate, object or graph position)
///
/// # Invariants
///
/// - `Term::Iri` always contains a **resolved** IRI, never a relative or prefixed form.
/// - A `Term::Literal` with a language tag has datatype `rdf:langString`, or
///   `rdf:dirLangString` when a direction is present. The checking profile
///   enforces this; unchecked construction does not.
///
/// Variant order gives the term ordering: blank nodes < IRIs < literals < triple terms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// Blank node with run-scoped identifier
    BlankNode(BlankId),

    /// Full resolved IRI (e.g., "http://schema.org/Person")
    Iri(Arc<str>),

    /// Literal with explicit datatype
    Literal {
        /// The lexical form, exactly as written (after unescaping)
        lexical: Arc<str>,
        /// Datatype (always present, never None)
        datatype: Datatype,
        /// Language tag
        language: Option<Arc<str>>,
        /// Base direction (only meaningful with a language tag)
        direction: Option<BaseDirection>,
    },

    /// Quoted triple used as a term (RDF 1.2 triple term)
    Triple(Arc<Triple>),
}

impl Term {
    /// Create an IRI term from a resolved IRI string
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankId::new(label))
    }

    /// Create a plain string literal (xsd:string)
    pub fn string(lexical: impl AsRef<str>) -> Self {
        Self::typed(lexical, Datatype::xsd_string())
    }

    /// Create a typed literal with an arbitrary datatype
    pub fn typed(lexical: impl AsRef<str>, datatype: Datatype) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
            direction: None,
        }
    }

    /// Create a language-tagged string literal (rdf:langString)
    pub fn lang_string(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Datatype::rdf_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
            direction: None,
        }
    }

    /// Create a directional language-tagged string literal (rdf:dirLangString)
    pub fn dir_lang_string(
        lexical: impl AsRef<str>,
        lang: impl AsRef<str>,
        direction: BaseDirection,
    ) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Datatype::rdf_dir_lang_string(),
            language: Some(Arc::from(lang.as_ref())),
            direction: Some(direction),
        }
    }

    /// Create a triple term
    pub fn triple(triple: Triple) -> Self {
        Term::Triple(Arc::new(triple))
    }

    /// Check if this is an IRI term
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Check if this is a triple term
    pub fn is_triple(&self) -> bool {
        matches!(self, Term::Triple(_))
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Try to get as blank node ID
    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::BlankNode(id) => Some(id),
            _ => None,
        }
    }

    /// Try to get as triple term
    pub fn as_triple(&self) -> Option<&Triple> {
        match self {
            Term::Triple(t) => Some(t),
            _ => None,
        }
    }

    /// Lexical form of a literal
    pub fn lexical(&self) -> Option<&str> {
        match self {
            Term::Literal { lexical, .. } => Some(lexical),
            _ => None,
        }
    }

    /// Datatype of a literal
    pub fn datatype(&self) -> Option<&Datatype> {
        match self {
            Term::Literal { datatype, .. } => Some(datatype),
            _ => None,
        }
    }

    /// Language tag of a literal
    pub fn language(&self) -> Option<&str> {
        match self {
            Term::Literal { language, .. } => language.as_deref(),
            _ => None,
        }
    }

    /// Base direction of a literal
    pub fn direction(&self) -> Option<BaseDirection> {
        match self {
            Term::Literal { direction, .. } => *direction,
            _ => None,
        }
    }
}

/// Write a lexical form with the N-Triples string escapes.
pub(crate) fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "{}", id),
            Term::Literal {
                lexical,
                datatype,
                language,
                direction,
            } => {
                f.write_str("\"")?;
                write_escaped(f, lexical)?;
                f.write_str("\"")?;
                match (language, direction) {
                    (Some(lang), Some(dir)) => write!(f, "@{}--{}", lang, dir),
                    (Some(lang), None) => write!(f, "@{}", lang),
                    _ if datatype.is_xsd_string() => Ok(()),
                    _ => write!(f, "^^<{}>", datatype.as_iri()),
                }
            }
            Term::Triple(t) => write!(f, "<<( {} {} {} )>>", t.s, t.p, t.o),
        }
    }
}
