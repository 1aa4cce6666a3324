//! Per-run term construction context
//!
//! A [`TermProfile`] combines the strategies one parse run needs:
//! - an [`IriResolver`] holding the current base IRI
//! - a [`PrefixIndex`] for prefixed names
//! - a [`BlankNodeAllocator`] scoping blank node labels
//! - an optional checking step backed by [`TermValidator`]
//! - a [`TermFactory`] (optionally the bounded [`TermCache`])
//!
//! Warnings are reported and the term is still built. Errors and Fatals go
//! through the [`ErrorHandler`]; when it aborts, the `create_*` call returns
//! [`AbortParse`] and the reader stops.

use crate::blank::BlankNodeAllocator;
use crate::cache::{DirectFactory, TermCache, TermFactory};
use crate::error::{AbortParse, Diagnostic, Position, ValidationOutcome};
use crate::prefix::PrefixIndex;
use crate::report::{ErrorHandler, LogErrorHandler};
use crate::resolve::{IriResolver, Rfc3986Resolver};
use crate::validate::{self, TermValidator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tributary_graph_ir::{BaseDirection, Datatype, Quad, Term, Triple};

/// Marker for an IRI written as a blank node (`<_:label>`).
const BLANK_NODE_IRI: &str = "_:";
/// Marker for a prefixed name left unresolved on purpose.
const UNRESOLVED_PREFIX: &str = "::";

/// Serializable profile options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Validate terms and statements while building them
    pub checking: bool,
    /// Abort on warnings as well as errors
    pub strict: bool,
    /// Initial base IRI
    pub base: Option<String>,
    /// Size of the term cache; `None` builds every term afresh
    pub term_cache_capacity: Option<usize>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            checking: true,
            strict: false,
            base: None,
            term_cache_capacity: None,
        }
    }
}

impl ProfileConfig {
    pub fn with_checking(mut self, checking: bool) -> Self {
        self.checking = checking;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_term_cache(mut self, capacity: usize) -> Self {
        self.term_cache_capacity = Some(capacity);
        self
    }
}

/// Builder for [`TermProfile`]
#[derive(Debug, Default)]
pub struct TermProfileBuilder {
    checking: Option<bool>,
    base: Option<String>,
    handler: Option<Arc<dyn ErrorHandler>>,
    resolver: Option<Box<dyn IriResolver>>,
    factory: Option<Box<dyn TermFactory>>,
    blanks: Option<BlankNodeAllocator>,
    prefixes: Option<PrefixIndex>,
}

impl TermProfileBuilder {
    pub fn checking(mut self, checking: bool) -> Self {
        self.checking = Some(checking);
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn resolver(mut self, resolver: Box<dyn IriResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn term_cache(mut self, cache: TermCache) -> Self {
        self.factory = Some(Box::new(cache));
        self
    }

    pub fn factory(mut self, factory: Box<dyn TermFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn blank_nodes(mut self, blanks: BlankNodeAllocator) -> Self {
        self.blanks = Some(blanks);
        self
    }

    pub fn prefixes(mut self, prefixes: PrefixIndex) -> Self {
        self.prefixes = Some(prefixes);
        self
    }

    /// Build the profile.
    ///
    /// Fails only when the initial base IRI cannot be set and the handler
    /// does not swallow the error.
    pub fn build(self) -> Result<TermProfile, AbortParse> {
        let mut profile = TermProfile {
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(Rfc3986Resolver::new())),
            prefixes: self.prefixes.unwrap_or_default(),
            blanks: self.blanks.unwrap_or_default(),
            checking: self.checking.unwrap_or(true),
            handler: self
                .handler
                .unwrap_or_else(|| Arc::new(LogErrorHandler::default())),
            factory: self.factory.unwrap_or_else(|| Box::new(DirectFactory)),
            initial_base: None,
            initial_prefixes: PrefixIndex::new(),
        };
        profile.initial_prefixes = profile.prefixes.clone();
        if let Some(base) = self.base {
            profile.set_base(&base, Position::UNKNOWN)?;
            profile.initial_base = profile.base().map(str::to_string);
        }
        Ok(profile)
    }
}

/// Term construction context for one parse run.
///
/// Not shared between threads: the pipeline moves a profile onto its worker.
#[derive(Debug)]
pub struct TermProfile {
    resolver: Box<dyn IriResolver>,
    prefixes: PrefixIndex,
    blanks: BlankNodeAllocator,
    checking: bool,
    handler: Arc<dyn ErrorHandler>,
    factory: Box<dyn TermFactory>,
    initial_base: Option<String>,
    initial_prefixes: PrefixIndex,
}

impl TermProfile {
    pub fn builder() -> TermProfileBuilder {
        TermProfileBuilder::default()
    }

    /// Checking profile with the default handler and no base.
    pub fn new() -> Self {
        Self {
            resolver: Box::new(Rfc3986Resolver::new()),
            prefixes: PrefixIndex::new(),
            blanks: BlankNodeAllocator::new(),
            checking: true,
            handler: Arc::new(LogErrorHandler::default()),
            factory: Box::new(DirectFactory),
            initial_base: None,
            initial_prefixes: PrefixIndex::new(),
        }
    }

    /// Profile from serializable options.
    pub fn from_config(config: &ProfileConfig) -> Result<Self, AbortParse> {
        let handler = if config.strict {
            LogErrorHandler::strict()
        } else {
            LogErrorHandler::default()
        };
        let mut builder = Self::builder()
            .checking(config.checking)
            .error_handler(Arc::new(handler));
        if let Some(base) = &config.base {
            builder = builder.base(base.clone());
        }
        if let Some(capacity) = config.term_cache_capacity {
            builder = builder.term_cache(TermCache::new(capacity));
        }
        builder.build()
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.handler
    }

    pub fn prefixes(&self) -> &PrefixIndex {
        &self.prefixes
    }

    pub fn prefixes_mut(&mut self) -> &mut PrefixIndex {
        &mut self.prefixes
    }

    pub fn blank_nodes(&self) -> &BlankNodeAllocator {
        &self.blanks
    }

    pub fn base(&self) -> Option<&str> {
        self.resolver.base()
    }

    // === Reporting ===

    fn report(&self, outcome: ValidationOutcome, position: Position) -> Result<(), AbortParse> {
        validate::report(self.handler.as_ref(), outcome, position)
    }

    pub fn warning(&self, message: impl Into<String>, position: Position) -> Result<(), AbortParse> {
        self.report(
            ValidationOutcome::Warning(Diagnostic::warning(message, position)),
            position,
        )
    }

    pub fn error(&self, message: impl Into<String>, position: Position) -> Result<(), AbortParse> {
        self.report(
            ValidationOutcome::Error(Diagnostic::error(message, position)),
            position,
        )
    }

    pub fn fatal(&self, message: impl Into<String>, position: Position) -> Result<(), AbortParse> {
        self.report(
            ValidationOutcome::Fatal(Diagnostic::fatal(message, position)),
            position,
        )
    }

    // === Directives ===

    /// Set the base IRI. A relative base resolves against the current one.
    pub fn set_base(&mut self, base: &str, position: Position) -> Result<(), AbortParse> {
        if let Err(e) = self.resolver.set_base(base) {
            self.error(e.to_string(), position)?;
        }
        Ok(())
    }

    /// Resolve `namespace` and bind `prefix` to it. Returns the resolved namespace.
    pub fn add_prefix(
        &mut self,
        prefix: &str,
        namespace: &str,
        position: Position,
    ) -> Result<String, AbortParse> {
        let resolved = self.resolve(namespace, position)?;
        self.prefixes.add(prefix, &resolved);
        Ok(resolved)
    }

    /// Prepare for the next source of a multi-source run.
    ///
    /// Prefixes are document scoped: the index returns to the bindings the
    /// profile was built with. The base returns to `base`, or to the initial
    /// base. Blank node labels are only forgotten when `reset_blank_nodes`
    /// is set.
    pub fn reset_for_source(
        &mut self,
        base: Option<&str>,
        reset_blank_nodes: bool,
    ) -> Result<(), AbortParse> {
        self.prefixes = self.initial_prefixes.clone();
        if reset_blank_nodes {
            self.blanks.reset();
        }
        self.resolver.clear_base();
        let base = base.map(str::to_string).or_else(|| self.initial_base.clone());
        if let Some(base) = base {
            self.set_base(&base, Position::UNKNOWN)?;
        }
        Ok(())
    }

    // === Terms ===

    fn resolve(&self, reference: &str, position: Position) -> Result<String, AbortParse> {
        match self.resolver.resolve(reference) {
            Ok(iri) => Ok(iri),
            Err(e) => {
                self.error(e.to_string(), position)?;
                Ok(reference.to_string())
            }
        }
    }

    /// Build an IRI term from an IRI reference.
    ///
    /// `_:label` yields a blank node; `::name` is kept verbatim. Anything else
    /// resolves against the base and, when checking, is validated.
    pub fn create_iri(&mut self, iri: &str, position: Position) -> Result<Term, AbortParse> {
        if let Some(label) = iri.strip_prefix(BLANK_NODE_IRI) {
            return Ok(self.create_blank_node(Some(label)));
        }
        if iri.starts_with(UNRESOLVED_PREFIX) {
            return Ok(self.factory.iri(iri));
        }
        // One diagnostic per reference; a swallowed error keeps it as written.
        if self.checking && iri.contains(' ') {
            TermValidator::report_iri(iri, self.handler.as_ref(), position)?;
            return Ok(self.factory.iri(iri));
        }
        match self.resolver.resolve(iri) {
            Ok(resolved) => {
                if self.checking {
                    TermValidator::report_iri(&resolved, self.handler.as_ref(), position)?;
                }
                Ok(self.factory.iri(&resolved))
            }
            Err(e) => {
                self.error(e.to_string(), position)?;
                Ok(self.factory.iri(iri))
            }
        }
    }

    /// Expand `prefix:local` through the prefix index.
    ///
    /// An undefined prefix is Fatal.
    pub fn expand_prefixed_name(
        &mut self,
        prefix: &str,
        local: &str,
        position: Position,
    ) -> Result<Term, AbortParse> {
        let Some(iri) = self.prefixes.expand(prefix, local) else {
            let message = format!(
                "Undefined prefix: {}",
                prefix.strip_suffix(':').unwrap_or(prefix)
            );
            return Err(match self.fatal(message.clone(), position) {
                Err(abort) => abort,
                Ok(()) => AbortParse(Diagnostic::fatal(message, position)),
            });
        };
        if self.checking {
            TermValidator::report_iri(&iri, self.handler.as_ref(), position)?;
        }
        Ok(self.factory.iri(&iri))
    }

    /// Plain `xsd:string` literal. Nothing to check.
    pub fn create_string_literal(&mut self, lexical: &str) -> Term {
        self.factory
            .literal(lexical, Datatype::xsd_string(), None, None)
    }

    pub fn create_typed_literal(
        &mut self,
        lexical: &str,
        datatype: &str,
        position: Position,
    ) -> Result<Term, AbortParse> {
        if self.checking {
            TermValidator::report_literal(
                lexical,
                Some(datatype),
                None,
                None,
                self.handler.as_ref(),
                position,
            )?;
        }
        Ok(self
            .factory
            .literal(lexical, Datatype::from_iri(datatype), None, None))
    }

    pub fn create_lang_literal(
        &mut self,
        lexical: &str,
        language: &str,
        direction: Option<BaseDirection>,
        position: Position,
    ) -> Result<Term, AbortParse> {
        if self.checking {
            TermValidator::report_literal(
                lexical,
                None,
                Some(language),
                direction,
                self.handler.as_ref(),
                position,
            )?;
        }
        let datatype = if direction.is_some() {
            Datatype::rdf_dir_lang_string()
        } else {
            Datatype::rdf_lang_string()
        };
        Ok(self
            .factory
            .literal(lexical, datatype, Some(language), direction))
    }

    /// Labelled or anonymous blank node in the run's scope.
    pub fn create_blank_node(&mut self, label: Option<&str>) -> Term {
        Term::BlankNode(self.blanks.allocate(label))
    }

    pub fn create_triple(
        &mut self,
        s: Term,
        p: Term,
        o: Term,
        position: Position,
    ) -> Result<Triple, AbortParse> {
        let triple = Triple::new(s, p, o);
        if self.checking {
            TermValidator::report_triple(&triple, self.handler.as_ref(), position)?;
        }
        Ok(triple)
    }

    pub fn create_quad(
        &mut self,
        g: Option<Term>,
        s: Term,
        p: Term,
        o: Term,
        position: Position,
    ) -> Result<Quad, AbortParse> {
        let quad = Quad { g, s, p, o };
        if self.checking {
            TermValidator::report_quad(&quad, self.handler.as_ref(), position)?;
        }
        Ok(quad)
    }

    /// Quoted triple used as an object term.
    pub fn create_triple_term(
        &mut self,
        s: Term,
        p: Term,
        o: Term,
        position: Position,
    ) -> Result<Term, AbortParse> {
        self.create_triple(s, p, o, position).map(Term::triple)
    }
}

impl Default for TermProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::report::CollectingErrorHandler;
    use crate::resolve::PassThroughResolver;
    use tributary_vocab::{rdf, xsd};

    fn collecting() -> (TermProfile, CollectingErrorHandler) {
        let handler = CollectingErrorHandler::new();
        let profile = TermProfile::builder()
            .base("http://example.org/doc/")
            .error_handler(Arc::new(handler.clone()))
            .blank_nodes(BlankNodeAllocator::with_prefix("b"))
            .build()
            .unwrap();
        (profile, handler)
    }

    #[test]
    fn test_create_iri_resolves_against_base() {
        let (mut p, _) = collecting();
        let t = p.create_iri("thing", Position::UNKNOWN).unwrap();
        assert_eq!(t.as_iri(), Some("http://example.org/doc/thing"));

        p.set_base("../other/", Position::UNKNOWN).unwrap();
        let t = p.create_iri("x", Position::UNKNOWN).unwrap();
        assert_eq!(t.as_iri(), Some("http://example.org/other/x"));
    }

    #[test]
    fn test_create_iri_escapes() {
        let (mut p, _) = collecting();
        let b = p.create_iri("_:n1", Position::UNKNOWN).unwrap();
        assert!(b.is_blank());
        assert_eq!(p.create_blank_node(Some("n1")), b);

        let marker = p.create_iri("::pending", Position::UNKNOWN).unwrap();
        assert_eq!(marker.as_iri(), Some("::pending"));
    }

    #[test]
    fn test_bad_iri_aborts_with_position() {
        let (mut p, handler) = collecting();
        let err = p
            .create_iri("http://example.org/a b", Position::new(7, 3))
            .unwrap_err();
        assert_eq!(err.diagnostic().severity, Severity::Error);
        assert_eq!(err.diagnostic().position, Position::new(7, 3));
        assert_eq!(handler.diagnostics().len(), 1);
        assert!(err.diagnostic().message.contains("Spaces"));
    }

    #[test]
    fn test_swallowed_iri_error_reported_once() {
        let handler = CollectingErrorHandler::with_abort_at(Severity::Fatal);
        let mut p = TermProfile::builder()
            .base("http://example.org/doc/")
            .error_handler(Arc::new(handler.clone()))
            .build()
            .unwrap();

        let t = p
            .create_iri("http://example.org/a b", Position::new(4, 2))
            .unwrap();
        assert_eq!(t, Term::iri("http://example.org/a b"));
        let seen = handler.diagnostics();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].message.contains("Spaces"));

        p.create_iri("rel{x}", Position::new(5, 1)).unwrap();
        assert_eq!(handler.diagnostics().len(), 2);
    }

    #[test]
    fn test_warning_still_builds_term() {
        let (mut p, handler) = collecting();
        let t = p
            .create_typed_literal("notanumber", xsd::INTEGER, Position::new(1, 1))
            .unwrap();
        assert_eq!(t.lexical(), Some("notanumber"));
        assert_eq!(handler.warnings(), 1);
    }

    #[test]
    fn test_lang_literals() {
        let (mut p, _) = collecting();
        let plain = p
            .create_lang_literal("chat", "fr", None, Position::UNKNOWN)
            .unwrap();
        assert_eq!(plain.datatype().unwrap().as_iri(), rdf::LANG_STRING);

        let dir = p
            .create_lang_literal("سلام", "fa", Some(BaseDirection::Rtl), Position::UNKNOWN)
            .unwrap();
        assert_eq!(dir.datatype().unwrap().as_iri(), rdf::DIR_LANG_STRING);
        assert_eq!(dir.direction(), Some(BaseDirection::Rtl));
    }

    #[test]
    fn test_undefined_prefix_is_fatal_even_when_lenient() {
        let mut p = TermProfile::builder()
            .error_handler(Arc::new(LogErrorHandler::lenient()))
            .build()
            .unwrap();
        let err = p
            .expand_prefixed_name("nope", "x", Position::new(2, 5))
            .unwrap_err();
        assert_eq!(err.diagnostic().severity, Severity::Fatal);
        assert!(err.diagnostic().message.contains("nope"));
    }

    #[test]
    fn test_prefixed_names() {
        let (mut p, _) = collecting();
        let ns = p.add_prefix("ex", "ns/", Position::UNKNOWN).unwrap();
        assert_eq!(ns, "http://example.org/doc/ns/");
        let t = p.expand_prefixed_name("ex", "a", Position::UNKNOWN).unwrap();
        assert_eq!(t.as_iri(), Some("http://example.org/doc/ns/a"));
    }

    #[test]
    fn test_shape_checked_only_when_checking() {
        let (mut p, _) = collecting();
        let lit = Term::string("s");
        let pred = Term::iri("http://ex/p");
        assert!(p
            .create_triple(lit.clone(), pred.clone(), lit.clone(), Position::UNKNOWN)
            .is_err());

        let mut unchecked = TermProfile::builder().checking(false).build().unwrap();
        assert!(unchecked
            .create_triple(lit.clone(), pred, lit, Position::UNKNOWN)
            .is_ok());
    }

    #[test]
    fn test_quad_graph_checked() {
        let (mut p, _) = collecting();
        let s = Term::iri("http://ex/s");
        let pred = Term::iri("http://ex/p");
        let err = p
            .create_quad(Some(Term::string("g")), s.clone(), pred.clone(), s.clone(), Position::UNKNOWN)
            .unwrap_err();
        assert!(err.diagnostic().message.contains("Graph"));
        let q = p.create_quad(None, s.clone(), pred, s, Position::UNKNOWN).unwrap();
        assert!(q.is_default_graph());
    }

    #[test]
    fn test_reset_for_source() {
        let (mut p, _) = collecting();
        p.add_prefix("ex", "http://ex/", Position::UNKNOWN).unwrap();
        let before = p.create_blank_node(Some("a"));
        p.set_base("http://elsewhere.org/", Position::UNKNOWN).unwrap();

        p.reset_for_source(None, false).unwrap();
        assert!(p.prefixes().is_empty());
        assert_eq!(p.base(), Some("http://example.org/doc/"));
        assert_eq!(p.create_blank_node(Some("a")), before);

        p.reset_for_source(Some("http://second.org/"), true).unwrap();
        assert_eq!(p.base(), Some("http://second.org/"));
        assert_ne!(p.create_blank_node(Some("a")), before);
    }

    #[test]
    fn test_reset_restores_initial_prefixes() {
        let mut p = TermProfile::builder()
            .prefixes(PrefixIndex::with_prefixes([("ex", "http://ex/")]))
            .build()
            .unwrap();
        p.add_prefix("doc", "http://doc/", Position::UNKNOWN).unwrap();
        p.prefixes_mut().delete("ex");

        p.reset_for_source(None, false).unwrap();
        assert_eq!(p.prefixes().get("ex"), Some("http://ex/"));
        assert!(!p.prefixes().contains("doc"));
    }

    #[test]
    fn test_pass_through_resolver_with_cache() {
        let mut p = TermProfile::builder()
            .resolver(Box::new(PassThroughResolver::new()))
            .term_cache(TermCache::new(4))
            .checking(false)
            .build()
            .unwrap();
        let t = p.create_iri("not/resolved", Position::UNKNOWN).unwrap();
        assert_eq!(t.as_iri(), Some("not/resolved"));
    }

    #[test]
    fn test_from_config() {
        let config: ProfileConfig =
            serde_json::from_str(r#"{"strict": true, "base": "http://example.org/"}"#).unwrap();
        assert!(config.checking);
        let mut p = TermProfile::from_config(&config).unwrap();
        assert_eq!(p.base(), Some("http://example.org/"));
        // strict: a warning aborts
        assert!(p
            .create_typed_literal("x", xsd::BOOLEAN, Position::UNKNOWN)
            .is_err());
    }
}
