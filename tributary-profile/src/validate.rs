//! Stateless validation of terms and statements
//!
//! Every check has three forms:
//! - `check_*` returns a [`ValidationOutcome`]
//! - `is_valid_*` returns `true` only for [`ValidationOutcome::Ok`]
//! - `report_*` hands any finding to an [`ErrorHandler`] with a position
//!
//! Fatal findings abort even if the handler returns `Ok`.

use crate::error::{AbortParse, Diagnostic, Position, Severity, ValidationOutcome};
use crate::report::ErrorHandler;
use crate::{langtag, lexical};
use oxiri::{Iri, IriRef};
use tributary_graph_ir::{BaseDirection, Quad, Term, Triple};
use tributary_vocab::rdf;

/// Characters RFC 3987 forbids outright but which show up in hand-written data.
const UNWISE: &[char] = &['<', '>', '"', '{', '}', '|', '\\', '^', '`'];

fn outcome(severity: Severity, message: String) -> ValidationOutcome {
    ValidationOutcome::from_diagnostic(Diagnostic::new(severity, message, Position::UNKNOWN))
}

fn at(outcome: ValidationOutcome, position: Position) -> Option<Diagnostic> {
    outcome.into_diagnostic().map(|mut d| {
        d.position = position;
        d
    })
}

/// Hand a finding to `handler`, enforcing that Fatal always aborts.
pub fn report(
    handler: &dyn ErrorHandler,
    outcome: ValidationOutcome,
    position: Position,
) -> Result<(), AbortParse> {
    let Some(diagnostic) = at(outcome, position) else {
        return Ok(());
    };
    if diagnostic.severity == Severity::Fatal {
        return Err(match handler.handle(diagnostic.clone()) {
            Err(abort) => abort,
            Ok(()) => AbortParse(diagnostic),
        });
    }
    handler.handle(diagnostic)
}

/// Well-formedness checks for IRIs, literals, triples and quads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermValidator;

impl TermValidator {
    // === IRIs ===

    pub fn check_iri(iri: &str) -> ValidationOutcome {
        if iri.contains(' ') {
            return outcome(
                Severity::Error,
                format!("Bad IRI: <{iri}> Spaces are not legal in URIs/IRIs."),
            );
        }
        if let Some(c) = iri.chars().find(|c| UNWISE.contains(c) || c.is_control()) {
            return outcome(
                Severity::Error,
                format!("Bad IRI: <{iri}> Illegal character {c:?}"),
            );
        }

        let parsed = match Iri::parse(iri) {
            Ok(parsed) => parsed,
            Err(e) => {
                let message = if IriRef::parse(iri).is_ok() {
                    format!("Relative IRI: <{iri}>")
                } else {
                    format!("Bad IRI: <{iri}> {e}")
                };
                return outcome(Severity::Error, message);
            }
        };

        let scheme = parsed.scheme();
        if scheme.chars().any(|c| c.is_ascii_uppercase()) {
            return outcome(
                Severity::Warning,
                format!("Bad IRI: <{iri}> Scheme name should be lowercase"),
            );
        }
        if has_lowercase_percent_escape(iri) {
            return outcome(
                Severity::Warning,
                format!("Bad IRI: <{iri}> Percent encoding should use uppercase hex digits"),
            );
        }
        if matches!(scheme, "http" | "https") {
            match parsed.authority() {
                Some("") | None => {
                    return outcome(
                        Severity::Warning,
                        format!("Bad IRI: <{iri}> Missing host in {scheme} IRI"),
                    )
                }
                Some(authority) => {
                    let host = authority.rsplit('@').next().unwrap_or(authority);
                    if host.ends_with(':') {
                        return outcome(
                            Severity::Warning,
                            format!("Bad IRI: <{iri}> Empty port"),
                        );
                    }
                    if host.chars().any(|c| c.is_ascii_uppercase()) {
                        return outcome(
                            Severity::Warning,
                            format!("Bad IRI: <{iri}> Host name should be lowercase"),
                        );
                    }
                }
            }
        }
        ValidationOutcome::Ok
    }

    pub fn is_valid_iri(iri: &str) -> bool {
        Self::check_iri(iri).is_ok()
    }

    pub fn report_iri(
        iri: &str,
        handler: &dyn ErrorHandler,
        position: Position,
    ) -> Result<(), AbortParse> {
        report(handler, Self::check_iri(iri), position)
    }

    // === Literals ===

    pub fn check_lang_tag(tag: &str) -> ValidationOutcome {
        if langtag::is_well_formed(tag) {
            ValidationOutcome::Ok
        } else {
            outcome(Severity::Warning, format!("Language not valid: {tag}"))
        }
    }

    /// Lexical form against the datatype's lexical space.
    ///
    /// Unknown datatypes pass.
    pub fn check_lexical(lexical_form: &str, datatype: &str) -> ValidationOutcome {
        match lexical::check(datatype, lexical_form) {
            Some(false) => outcome(
                Severity::Warning,
                format!("Lexical form '{lexical_form}' not valid for datatype <{datatype}>"),
            ),
            _ => ValidationOutcome::Ok,
        }
    }

    /// Literal components as written.
    ///
    /// `datatype` is the explicit datatype IRI, if any. A plain string passes
    /// `None` for everything but the lexical form.
    pub fn check_literal(
        lexical_form: &str,
        datatype: Option<&str>,
        language: Option<&str>,
        direction: Option<BaseDirection>,
    ) -> ValidationOutcome {
        match (language, datatype) {
            (None, None) if direction.is_none() => ValidationOutcome::Ok,
            (Some(lang), dt) => {
                let tag = Self::check_lang_tag(lang);
                if !tag.is_ok() {
                    return tag;
                }
                let expected = if direction.is_some() {
                    rdf::DIR_LANG_STRING
                } else {
                    rdf::LANG_STRING
                };
                match dt {
                    Some(dt) if dt != expected => outcome(
                        Severity::Error,
                        format!("Literal has language tag @{lang} and datatype <{dt}>"),
                    ),
                    _ => ValidationOutcome::Ok,
                }
            }
            (None, _) if direction.is_some() => outcome(
                Severity::Error,
                format!("Literal \"{lexical_form}\" has a base direction but no language tag"),
            ),
            (None, Some(dt)) if rdf::is_reserved_lang_datatype(dt) => outcome(
                Severity::Warning,
                format!("Literal has datatype <{dt}> but no language tag"),
            ),
            (None, Some(dt)) => Self::check_lexical(lexical_form, dt),
            (None, None) => ValidationOutcome::Ok,
        }
    }

    pub fn is_valid_literal(
        lexical_form: &str,
        datatype: Option<&str>,
        language: Option<&str>,
        direction: Option<BaseDirection>,
    ) -> bool {
        Self::check_literal(lexical_form, datatype, language, direction).is_ok()
    }

    pub fn report_literal(
        lexical_form: &str,
        datatype: Option<&str>,
        language: Option<&str>,
        direction: Option<BaseDirection>,
        handler: &dyn ErrorHandler,
        position: Position,
    ) -> Result<(), AbortParse> {
        report(
            handler,
            Self::check_literal(lexical_form, datatype, language, direction),
            position,
        )
    }

    /// A constructed literal term. Non-literals pass.
    pub fn check_literal_term(term: &Term) -> ValidationOutcome {
        match term {
            Term::Literal {
                lexical,
                datatype,
                language,
                direction,
            } => Self::check_literal(
                lexical,
                Some(datatype.as_iri()),
                language.as_deref(),
                *direction,
            ),
            _ => ValidationOutcome::Ok,
        }
    }

    // === Statements ===

    pub fn check_triple(triple: &Triple) -> ValidationOutcome {
        Self::check_shape(&triple.s, &triple.p, &triple.o)
    }

    pub fn is_valid_triple(triple: &Triple) -> bool {
        Self::check_triple(triple).is_ok()
    }

    pub fn report_triple(
        triple: &Triple,
        handler: &dyn ErrorHandler,
        position: Position,
    ) -> Result<(), AbortParse> {
        report(handler, Self::check_triple(triple), position)
    }

    pub fn check_quad(quad: &Quad) -> ValidationOutcome {
        if let Some(g) = &quad.g {
            if !(g.is_iri() || g.is_blank()) {
                return outcome(
                    Severity::Error,
                    format!("Graph name must be an IRI or blank node: {g}"),
                );
            }
        }
        Self::check_shape(&quad.s, &quad.p, &quad.o)
    }

    pub fn is_valid_quad(quad: &Quad) -> bool {
        Self::check_quad(quad).is_ok()
    }

    pub fn report_quad(
        quad: &Quad,
        handler: &dyn ErrorHandler,
        position: Position,
    ) -> Result<(), AbortParse> {
        report(handler, Self::check_quad(quad), position)
    }

    fn check_shape(s: &Term, p: &Term, o: &Term) -> ValidationOutcome {
        if !(s.is_iri() || s.is_blank()) {
            return outcome(
                Severity::Error,
                format!("Subject is not an IRI or blank node: {s}"),
            );
        }
        if !p.is_iri() {
            return outcome(Severity::Error, format!("Predicate not an IRI: {p}"));
        }
        match o.as_triple() {
            Some(inner) => Self::check_shape(&inner.s, &inner.p, &inner.o),
            None => ValidationOutcome::Ok,
        }
    }
}

fn has_lowercase_percent_escape(iri: &str) -> bool {
    let bytes = iri.as_bytes();
    bytes.windows(3).any(|w| {
        w[0] == b'%'
            && w[1].is_ascii_hexdigit()
            && w[2].is_ascii_hexdigit()
            && (w[1].is_ascii_lowercase() || w[2].is_ascii_lowercase())
    })
}
