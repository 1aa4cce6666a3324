//! Triple and quad statements

use crate::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An RDF triple (subject, predicate, object)
///
/// Shape is not enforced here; the checking profile rejects literal subjects,
/// non-IRI predicates and similar violations before a triple reaches a sink.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub s: Term,
    pub p: Term,
    pub o: Term,
}

impl Triple {
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// Place this triple in the default graph.
    pub fn in_default_graph(self) -> Quad {
        Quad {
            g: None,
            s: self.s,
            p: self.p,
            o: self.o,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

/// An RDF quad: a triple scoped to a graph
///
/// `g == None` is the default graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub g: Option<Term>,
    pub s: Term,
    pub p: Term,
    pub o: Term,
}

impl Quad {
    /// Create a quad in a named graph
    pub fn new(g: Term, s: Term, p: Term, o: Term) -> Self {
        Self { g: Some(g), s, p, o }
    }

    /// Create a quad in the default graph
    pub fn default_graph(s: Term, p: Term, o: Term) -> Self {
        Self { g: None, s, p, o }
    }

    pub fn is_default_graph(&self) -> bool {
        self.g.is_none()
    }

    /// Drop the graph component.
    pub fn into_triple(self) -> Triple {
        Triple {
            s: self.s,
            p: self.p,
            o: self.o,
        }
    }
}

impl From<Triple> for Quad {
    fn from(t: Triple) -> Self {
        t.in_default_graph()
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.g {
            Some(g) => write!(f, "{} {} {} {} .", self.s, self.p, self.o, g),
            None => write!(f, "{} {} {} .", self.s, self.p, self.o),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Triple {
        Triple::new(
            Term::iri("http://example.org/alice"),
            Term::iri("http://xmlns.com/foaf/0.1/name"),
            Term::string("Alice"),
        )
    }

    #[test]
    fn test_default_graph_roundtrip() {
        let q = sample().in_default_graph();
        assert!(q.is_default_graph());
        assert_eq!(q.into_triple(), sample());
    }

    #[test]
    fn test_named_graph_quad() {
        let t = sample();
        let q = Quad::new(Term::iri("http://example.org/g"), t.s, t.p, t.o);
        assert!(!q.is_default_graph());
        assert_eq!(
            q.to_string(),
            "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" <http://example.org/g> ."
        );
    }

    #[test]
    fn test_triple_display() {
        assert_eq!(
            sample().to_string(),
            "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" ."
        );
    }
}
