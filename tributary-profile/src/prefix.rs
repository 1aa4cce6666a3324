//! Bidirectional prefix ↔ namespace index
//!
//! The forward direction is a plain hash map. The reverse direction
//! (namespace → prefix) is a hash map for exact lookups plus a byte-level trie
//! over the registered namespace IRIs, so that abbreviating an IRI costs
//! O(len(iri)) regardless of how many namespaces are registered.
//!
//! Both directions are updated together on every mutation; after `add`,
//! `delete` or `clear` returns, the trie contains exactly the namespaces that
//! at least one prefix maps to.

use std::collections::HashMap;
use std::sync::Arc;

/// A node in the namespace trie.
///
/// Children are stored as a sorted `Vec<(u8, u32)>` instead of a HashMap.
/// Most nodes in IRI namespace tries have 1-3 children, where a linear scan
/// beats hashing.
#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// A registered namespace ends at this node.
    terminal: bool,
    /// Children sorted by byte value.
    children: Vec<(u8, u32)>,
}

/// Byte-level trie for longest-namespace matching.
///
/// Removal only clears the terminal flag; the owning index rebuilds the trie
/// once dead entries outnumber live ones.
#[derive(Debug, Clone)]
struct NamespaceTrie {
    nodes: Vec<TrieNode>,
    live: usize,
    dead: usize,
}

impl Default for NamespaceTrie {
    fn default() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            live: 0,
            dead: 0,
        }
    }
}

impl NamespaceTrie {
    fn insert(&mut self, namespace: &str) {
        let mut node_idx: u32 = 0;
        for &byte in namespace.as_bytes() {
            let children = &self.nodes[node_idx as usize].children;
            node_idx = match children.binary_search_by_key(&byte, |(b, _)| *b) {
                Ok(pos) => children[pos].1,
                Err(pos) => {
                    let new_idx = self.nodes.len() as u32;
                    self.nodes.push(TrieNode::default());
                    self.nodes[node_idx as usize]
                        .children
                        .insert(pos, (byte, new_idx));
                    new_idx
                }
            };
        }
        let node = &mut self.nodes[node_idx as usize];
        if !node.terminal {
            node.terminal = true;
            self.live += 1;
        }
    }

    fn find(&self, namespace: &str) -> Option<usize> {
        let mut node_idx: u32 = 0;
        for &byte in namespace.as_bytes() {
            let children = &self.nodes[node_idx as usize].children;
            let pos = children.binary_search_by_key(&byte, |(b, _)| *b).ok()?;
            node_idx = children[pos].1;
        }
        Some(node_idx as usize)
    }

    fn remove(&mut self, namespace: &str) {
        if let Some(idx) = self.find(namespace) {
            let node = &mut self.nodes[idx];
            if node.terminal {
                node.terminal = false;
                self.live -= 1;
                self.dead += 1;
            }
        }
    }

    fn needs_rebuild(&self) -> bool {
        self.dead > 64 && self.dead > self.live
    }

    /// Byte length of the longest registered namespace that prefixes `iri`.
    ///
    /// The empty namespace is a valid registration and matches everything.
    fn longest_match(&self, iri: &str) -> Option<usize> {
        let mut node_idx: u32 = 0;
        let mut best = self.nodes[0].terminal.then_some(0);

        for (i, &byte) in iri.as_bytes().iter().enumerate() {
            let children = &self.nodes[node_idx as usize].children;
            match children.binary_search_by_key(&byte, |(b, _)| *b) {
                Ok(pos) => {
                    node_idx = children[pos].1;
                    if self.nodes[node_idx as usize].terminal {
                        best = Some(i + 1);
                    }
                }
                Err(_) => break,
            }
        }

        // A match can end inside a multi-byte character only if a namespace
        // itself ended there, which `&str` keys rule out; checked anyway.
        best.filter(|&len| iri.is_char_boundary(len))
    }
}

/// Canonical form of a prefix: no trailing colon.
fn canonical(prefix: &str) -> &str {
    prefix.strip_suffix(':').unwrap_or(prefix)
}

/// Characters that may not appear in the local part of an abbreviation.
fn is_safe_local(local: &str) -> bool {
    !local.contains(['/', '#'])
}

/// Bidirectional prefix ↔ namespace map.
///
/// Several prefixes may map to one namespace. When abbreviating, the prefix
/// most recently bound to the namespace is used.
///
/// # Example
///
/// ```
/// use tributary_profile::PrefixIndex;
///
/// let mut index = PrefixIndex::new();
/// index.add("ex:", "http://ex/");
/// index.add("exa", "http://ex/a/");
///
/// assert_eq!(index.expand("ex", "thing").as_deref(), Some("http://ex/thing"));
/// assert_eq!(index.abbreviate("http://ex/a/b"), Some(("exa", "b")));
/// assert_eq!(index.abbreviate("http://ex/a/b/c"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    prefixes: HashMap<String, Arc<str>>,
    namespaces: HashMap<Arc<str>, Vec<String>>,
    trie: NamespaceTrie,
    /// Namespaces not ending in '/' or '#'; while zero the split heuristic is exact.
    unsplit: usize,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index pre-populated with `(prefix, namespace)` pairs.
    pub fn with_prefixes<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut index = Self::new();
        for (prefix, namespace) in pairs {
            index.add(prefix, namespace);
        }
        index
    }

    /// Bind `prefix` to `namespace`, replacing any previous binding.
    pub fn add(&mut self, prefix: &str, namespace: &str) {
        let prefix = canonical(prefix);
        if let Some(current) = self.prefixes.get(prefix) {
            if &**current == namespace {
                return;
            }
            let stale = current.clone();
            self.unlink(prefix, &stale);
        }

        let key: Arc<str> = match self.namespaces.get_key_value(namespace) {
            Some((k, _)) => k.clone(),
            None => {
                self.trie.insert(namespace);
                if !namespace.ends_with(['/', '#']) {
                    self.unsplit += 1;
                }
                Arc::from(namespace)
            }
        };
        self.namespaces
            .entry(key.clone())
            .or_default()
            .push(prefix.to_string());
        self.prefixes.insert(prefix.to_string(), key);
        if self.trie.needs_rebuild() {
            self.rebuild_trie();
        }
    }

    /// Remove a prefix binding. Unknown prefixes are ignored.
    pub fn delete(&mut self, prefix: &str) {
        let prefix = canonical(prefix);
        if let Some(namespace) = self.prefixes.remove(prefix) {
            self.unlink(prefix, &namespace);
        }
        if self.trie.needs_rebuild() {
            self.rebuild_trie();
        }
    }

    fn unlink(&mut self, prefix: &str, namespace: &Arc<str>) {
        let now_empty = match self.namespaces.get_mut(namespace) {
            Some(bound) => {
                bound.retain(|p| p != prefix);
                bound.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.namespaces.remove(namespace);
            self.trie.remove(namespace);
            if !namespace.ends_with(['/', '#']) {
                self.unsplit -= 1;
            }
        }
    }

    fn rebuild_trie(&mut self) {
        let mut trie = NamespaceTrie::default();
        for namespace in self.namespaces.keys() {
            trie.insert(namespace);
        }
        tracing::trace!(namespaces = trie.live, "rebuilt namespace trie");
        self.trie = trie;
    }

    /// Remove all bindings.
    pub fn clear(&mut self) {
        self.prefixes.clear();
        self.namespaces.clear();
        self.trie = NamespaceTrie::default();
        self.unsplit = 0;
    }

    /// Namespace bound to `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(canonical(prefix)).map(|ns| &**ns)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(canonical(prefix))
    }

    /// Prefix currently used to abbreviate exactly `namespace`.
    pub fn namespace_prefix(&self, namespace: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|bound| bound.last())
            .map(String::as_str)
    }

    /// `namespace(prefix) + local`, or `None` for an unknown prefix.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.get(prefix).map(|ns| {
            let mut iri = String::with_capacity(ns.len() + local.len());
            iri.push_str(ns);
            iri.push_str(local);
            iri
        })
    }

    /// Split `iri` into `(prefix, local)` using the longest registered namespace.
    ///
    /// Returns `None` when no namespace matches or when the local part would
    /// contain '/' or '#'.
    pub fn abbreviate<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        if self.unsplit == 0 {
            if let Some(idx) = iri.rfind(['/', '#']) {
                let (namespace, local) = iri.split_at(idx + 1);
                if let Some(prefix) = self.namespace_prefix(namespace) {
                    return is_safe_local(local).then_some((prefix, local));
                }
            }
        }

        let len = self.trie.longest_match(iri)?;
        let (namespace, local) = iri.split_at(len);
        if !is_safe_local(local) {
            return None;
        }
        self.namespace_prefix(namespace).map(|prefix| (prefix, local))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// `(prefix, namespace)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, ns)| (p.as_str(), &**ns))
    }

    /// Number of live namespaces in the reverse index.
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }
}
