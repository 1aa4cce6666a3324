//! Run-scoped blank node allocation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tributary_graph_ir::BlankId;

/// Distinguishes allocators so that ids from separate runs never collide.
static NEXT_SCOPE: AtomicU64 = AtomicU64::new(0);

/// Maps document labels to synthetic blank node ids.
///
/// Within one scope the same label always yields the same id. Anonymous
/// nodes get a fresh id every time. Ids are `"{prefix}{n}"` with a counter
/// that keeps increasing across [`reset`](Self::reset), so a reset starts a new
/// label scope without reusing old ids.
#[derive(Debug, Clone)]
pub struct BlankNodeAllocator {
    prefix: String,
    next: u64,
    labels: HashMap<String, BlankId>,
}

impl Default for BlankNodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlankNodeAllocator {
    pub fn new() -> Self {
        let scope = NEXT_SCOPE.fetch_add(1, Ordering::Relaxed);
        Self::with_prefix(format!("r{scope}b"))
    }

    /// Allocator with a fixed id prefix, for reproducible output.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            labels: HashMap::new(),
        }
    }

    fn fresh(&mut self) -> BlankId {
        let id = BlankId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    /// Id for `label`, or a fresh one for an anonymous node.
    pub fn allocate(&mut self, label: Option<&str>) -> BlankId {
        match label {
            None => self.fresh(),
            Some(label) => {
                if let Some(id) = self.labels.get(label) {
                    return id.clone();
                }
                let id = self.fresh();
                self.labels.insert(label.to_string(), id.clone());
                id
            }
        }
    }

    /// Forget all labels.
    pub fn reset(&mut self) {
        self.labels.clear();
    }

    /// Number of labelled nodes in the current scope.
    pub fn labelled(&self) -> usize {
        self.labels.len()
    }

    /// Total ids handed out.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_label_same_node() {
        let mut alloc = BlankNodeAllocator::with_prefix("b");
        let a = alloc.allocate(Some("x"));
        let b = alloc.allocate(Some("y"));
        assert_eq!(alloc.allocate(Some("x")), a);
        assert_ne!(a, b);
        assert_eq!(alloc.labelled(), 2);
    }

    #[test]
    fn test_anonymous_nodes_are_fresh() {
        let mut alloc = BlankNodeAllocator::with_prefix("b");
        let labelled = alloc.allocate(Some("b0"));
        let anon = alloc.allocate(None);
        assert_ne!(anon, alloc.allocate(None));
        assert_ne!(anon, labelled);
        assert_eq!(alloc.allocated(), 3);
    }

    #[test]
    fn test_reset_starts_new_scope() {
        let mut alloc = BlankNodeAllocator::with_prefix("b");
        let before = alloc.allocate(Some("x"));
        alloc.reset();
        assert_ne!(alloc.allocate(Some("x")), before);
    }

    #[test]
    fn test_allocators_do_not_collide() {
        let mut a = BlankNodeAllocator::new();
        let mut b = BlankNodeAllocator::new();
        assert_ne!(a.allocate(Some("x")), b.allocate(Some("x")));
    }
}
