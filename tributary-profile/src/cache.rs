//! Term construction strategies and the bounded term cache
//!
//! Data files repeat the same IRIs and literals many times. Routing term
//! construction through an LRU cache lets repeats share one allocation.

use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tributary_graph_ir::{BaseDirection, Datatype, Term};

/// Builds IRI and literal terms once they have been resolved and checked.
pub trait TermFactory: Send + fmt::Debug {
    fn iri(&self, iri: &str) -> Term;

    fn literal(
        &self,
        lexical: &str,
        datatype: Datatype,
        language: Option<&str>,
        direction: Option<BaseDirection>,
    ) -> Term;
}

/// Allocates a new term every time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectFactory;

impl TermFactory for DirectFactory {
    fn iri(&self, iri: &str) -> Term {
        Term::iri(iri)
    }

    fn literal(
        &self,
        lexical: &str,
        datatype: Datatype,
        language: Option<&str>,
        direction: Option<BaseDirection>,
    ) -> Term {
        Term::Literal {
            lexical: Arc::from(lexical),
            datatype,
            language: language.map(Arc::from),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Iri(String),
    Literal {
        lexical: String,
        datatype: Datatype,
        language: Option<String>,
        direction: Option<BaseDirection>,
    },
}

/// Bounded LRU cache of constructed terms.
///
/// Clones share the same cache. Each profile gets its own cache unless one is
/// passed in explicitly; sharing between concurrent pipelines contends on a
/// single lock.
#[derive(Clone)]
pub struct TermCache {
    inner: Arc<Mutex<LruCache<CacheKey, Term>>>,
    capacity: usize,
}

impl fmt::Debug for TermCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl TermCache {
    /// Create a cache holding at most `capacity` terms (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(cap))),
            capacity: cap.get(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    fn get_or_build(&self, key: CacheKey, build: impl FnOnce() -> Term) -> Term {
        let mut cache = self.inner.lock();
        cache.get_or_insert(key, build).clone()
    }
}

impl TermFactory for TermCache {
    fn iri(&self, iri: &str) -> Term {
        self.get_or_build(CacheKey::Iri(iri.to_string()), || Term::iri(iri))
    }

    fn literal(
        &self,
        lexical: &str,
        datatype: Datatype,
        language: Option<&str>,
        direction: Option<BaseDirection>,
    ) -> Term {
        let key = CacheKey::Literal {
            lexical: lexical.to_string(),
            datatype: datatype.clone(),
            language: language.map(str::to_string),
            direction,
        };
        self.get_or_build(key, || {
            DirectFactory.literal(lexical, datatype, language, direction)
        })
    }
}
