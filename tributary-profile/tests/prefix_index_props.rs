//! Property tests for PrefixIndex consistency under add/delete sequences

use proptest::prelude::*;
use tributary_profile::PrefixIndex;

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize),
    Delete(usize),
}

const PREFIXES: &[&str] = &["a", "b", "c", "ex", "foaf", "schema", "dc:"];
// No namespace extends another past a separator, so longest-match is unambiguous
const NAMESPACES: &[&str] = &[
    "http://example.org/",
    "http://example.org/vocab#",
    "http://xmlns.com/foaf/0.1/",
    "https://schema.org/",
    "urn:x-test:",
];

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PREFIXES.len(), 0..NAMESPACES.len()).prop_map(|(p, n)| Op::Add(p, n)),
        (0..PREFIXES.len()).prop_map(Op::Delete),
    ]
}

fn local_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.-]{0,12}"
}

proptest! {
    #[test]
    fn expand_then_abbreviate_round_trips(
        ops in prop::collection::vec(op(), 0..40),
        local in local_name(),
    ) {
        let mut index = PrefixIndex::new();
        for op in &ops {
            match *op {
                Op::Add(p, n) => index.add(PREFIXES[p], NAMESPACES[n]),
                Op::Delete(p) => index.delete(PREFIXES[p]),
            }
        }

        let bindings: Vec<(String, String)> = index
            .iter()
            .map(|(p, ns)| (p.to_string(), ns.to_string()))
            .collect();

        for (prefix, namespace) in &bindings {
            let iri = index.expand(prefix, &local).unwrap();
            let (got_prefix, got_local) = index.abbreviate(&iri).unwrap();

            // Several prefixes may share a namespace; any of them round-trips
            prop_assert_eq!(index.get(got_prefix), Some(namespace.as_str()));
            prop_assert_eq!(got_local, local.as_str());

            let reexpanded = index.expand(got_prefix, got_local).unwrap();
            prop_assert_eq!(reexpanded, iri);
        }
    }

    #[test]
    fn reverse_index_tracks_forward_map(ops in prop::collection::vec(op(), 0..60)) {
        let mut index = PrefixIndex::new();
        for op in &ops {
            match *op {
                Op::Add(p, n) => index.add(PREFIXES[p], NAMESPACES[n]),
                Op::Delete(p) => index.delete(PREFIXES[p]),
            }
        }

        let mut live: Vec<&str> = index.iter().map(|(_, ns)| ns).collect();
        live.sort();
        live.dedup();
        prop_assert_eq!(index.namespace_count(), live.len());

        for namespace in NAMESPACES {
            let bound = index.namespace_prefix(namespace);
            if live.contains(namespace) {
                let prefix = bound.unwrap();
                prop_assert_eq!(index.get(prefix), Some(*namespace));
            } else {
                prop_assert!(bound.is_none());
                let probe = format!("{namespace}x");
                let abbreviated = index.abbreviate(&probe).map(|(_, local)| local.len());
                // Only a shorter live namespace may still match
                prop_assert!(abbreviated.map_or(true, |len| len > 1));
            }
        }
    }

    #[test]
    fn readding_is_idempotent(p in 0..PREFIXES.len(), n in 0..NAMESPACES.len()) {
        let mut once = PrefixIndex::new();
        once.add(PREFIXES[p], NAMESPACES[n]);
        let mut twice = once.clone();
        twice.add(PREFIXES[p], NAMESPACES[n]);

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.namespace_count(), twice.namespace_count());
        prop_assert_eq!(
            once.namespace_prefix(NAMESPACES[n]),
            twice.namespace_prefix(NAMESPACES[n])
        );
    }

    #[test]
    fn deleting_unknown_prefix_is_noop(ops in prop::collection::vec(op(), 0..20)) {
        let mut index = PrefixIndex::new();
        for op in &ops {
            if let Op::Add(p, n) = *op {
                index.add(PREFIXES[p], NAMESPACES[n]);
            }
        }
        let before: Vec<(String, String)> = {
            let mut v: Vec<_> = index.iter().map(|(p, n)| (p.to_string(), n.to_string())).collect();
            v.sort();
            v
        };
        index.delete("never-added");
        let mut after: Vec<_> = index.iter().map(|(p, n)| (p.to_string(), n.to_string())).collect();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
