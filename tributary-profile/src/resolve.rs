//! IRI resolution strategies
//!
//! A [`TermProfile`](crate::TermProfile) owns one resolver. The resolver holds
//! the current base IRI, which `BASE` directives update mid-stream.

use oxiri::{Iri, IriRef};
use std::fmt;

/// Errors from resolving a reference or setting a base
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Relative reference with no base to resolve against
    #[error("Relative IRI <{0}> with no base IRI")]
    NoBase(String),

    /// Not an IRI reference at all
    #[error("Bad IRI: <{iri}> {message}")]
    Invalid { iri: String, message: String },
}

/// Turns IRI references into absolute IRIs.
pub trait IriResolver: Send + fmt::Debug {
    /// Current base IRI, if any.
    fn base(&self) -> Option<&str>;

    /// Replace the base. A relative `base` resolves against the current one.
    fn set_base(&mut self, base: &str) -> Result<(), ResolveError>;

    /// Clear the base.
    fn clear_base(&mut self);

    /// Resolve `reference` against the current base.
    fn resolve(&self, reference: &str) -> Result<String, ResolveError>;
}

/// RFC 3986 reference resolution.
#[derive(Debug, Clone, Default)]
pub struct Rfc3986Resolver {
    base: Option<Iri<String>>,
}

impl Rfc3986Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: &str) -> Result<Self, ResolveError> {
        let mut resolver = Self::new();
        resolver.set_base(base)?;
        Ok(resolver)
    }
}

fn invalid(iri: &str, err: impl fmt::Display) -> ResolveError {
    ResolveError::Invalid {
        iri: iri.to_string(),
        message: err.to_string(),
    }
}

impl IriResolver for Rfc3986Resolver {
    fn base(&self) -> Option<&str> {
        self.base.as_ref().map(|b| b.as_str())
    }

    fn set_base(&mut self, base: &str) -> Result<(), ResolveError> {
        let resolved = self.resolve(base)?;
        let iri = Iri::parse(resolved).map_err(|e| invalid(base, e))?;
        self.base = Some(iri);
        Ok(())
    }

    fn clear_base(&mut self) {
        self.base = None;
    }

    fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        match &self.base {
            Some(base) => base
                .resolve(reference)
                .map(Iri::into_inner)
                .map_err(|e| invalid(reference, e)),
            None => match Iri::parse(reference) {
                Ok(_) => Ok(reference.to_string()),
                Err(e) if IriRef::parse(reference).is_ok() => {
                    tracing::trace!(iri = reference, error = %e, "relative reference without base");
                    Err(ResolveError::NoBase(reference.to_string()))
                }
                Err(e) => Err(invalid(reference, e)),
            },
        }
    }
}

/// Passes references through unchanged.
///
/// For syntaxes where every IRI is already absolute (N-Triples, N-Quads).
/// The base is remembered so that it can still be reported.
#[derive(Debug, Clone, Default)]
pub struct PassThroughResolver {
    base: Option<String>,
}

impl PassThroughResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IriResolver for PassThroughResolver {
    fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    fn set_base(&mut self, base: &str) -> Result<(), ResolveError> {
        self.base = Some(base.to_string());
        Ok(())
    }

    fn clear_base(&mut self) {
        self.base = None;
    }

    fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        Ok(reference.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_against_base() {
        let r = Rfc3986Resolver::with_base("http://example.org/a/b").unwrap();
        assert_eq!(r.resolve("c").unwrap(), "http://example.org/a/c");
        assert_eq!(r.resolve("../d").unwrap(), "http://example.org/d");
        assert_eq!(r.resolve("#frag").unwrap(), "http://example.org/a/b#frag");
        assert_eq!(r.resolve("urn:x:y").unwrap(), "urn:x:y");
    }

    #[test]
    fn test_relative_base_update() {
        let mut r = Rfc3986Resolver::with_base("http://example.org/a/").unwrap();
        r.set_base("sub/").unwrap();
        assert_eq!(r.base(), Some("http://example.org/a/sub/"));
        assert_eq!(r.resolve("x").unwrap(), "http://example.org/a/sub/x");
    }

    #[test]
    fn test_no_base() {
        let r = Rfc3986Resolver::new();
        assert_eq!(r.resolve("http://example.org/").unwrap(), "http://example.org/");
        assert_eq!(
            r.resolve("relative"),
            Err(ResolveError::NoBase("relative".to_string()))
        );
        assert!(matches!(
            r.resolve("http://exa mple.org/"),
            Err(ResolveError::Invalid { .. })
        ));
    }

    #[test]
    fn test_pass_through() {
        let mut r = PassThroughResolver::new();
        assert_eq!(r.resolve("relative").unwrap(), "relative");
        r.set_base("http://example.org/").unwrap();
        assert_eq!(r.base(), Some("http://example.org/"));
        r.clear_base();
        assert_eq!(r.base(), None);
    }
}
