//! Canonical form of quorum sets
//!
//! Normalization first simplifies the tree (singleton inner sets become
//! plain validators, a pass-through root is replaced by its only child),
//! then sorts members so that equal trust structures compare equal.

use std::cmp::Ordering;

use crate::consensus::quorum::QuorumSet;

/// Bring `qset` into canonical form in place
pub fn normalize(qset: &mut QuorumSet) {
    simplify(qset);
    reorder(qset);
}

fn simplify(qset: &mut QuorumSet) {
    let inner_sets = std::mem::take(&mut qset.inner_sets);
    for mut inner in inner_sets {
        simplify(&mut inner);
        if inner.threshold == 1 && inner.validators.len() == 1 && inner.inner_sets.is_empty() {
            qset.validators.push(inner.validators[0]);
        } else {
            qset.inner_sets.push(inner);
        }
    }

    if qset.threshold == 1 && qset.validators.is_empty() && qset.inner_sets.len() == 1 {
        if let Some(only) = qset.inner_sets.pop() {
            *qset = only;
        }
    }
}

fn reorder(qset: &mut QuorumSet) {
    qset.validators.sort();
    for inner in &mut qset.inner_sets {
        reorder(inner);
    }
    qset.inner_sets.sort_by(canonical_cmp);
}

/// Order by validators, then inner sets, then threshold
pub fn canonical_cmp(l: &QuorumSet, r: &QuorumSet) -> Ordering {
    l.validators
        .cmp(&r.validators)
        .then_with(|| {
            l.inner_sets
                .iter()
                .zip(&r.inner_sets)
                .map(|(a, b)| canonical_cmp(a, b))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or_else(|| l.inner_sets.len().cmp(&r.inner_sets.len()))
        })
        .then_with(|| l.threshold.cmp(&r.threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quorumforge_common::{NodeId, NodeSeed};

    fn node(n: u8) -> NodeId {
        NodeSeed::from_bytes([n; 32]).node_id()
    }

    fn normalized(mut qset: QuorumSet) -> QuorumSet {
        normalize(&mut qset);
        qset
    }

    #[test]
    fn test_singleton_inner_set_is_merged() {
        let qset = QuorumSet::new(
            2,
            vec![node(1)],
            vec![QuorumSet::new(1, vec![node(2)], vec![])],
        );
        let n = normalized(qset);
        assert_eq!(n.threshold, 2);
        assert!(n.inner_sets.is_empty());
        let mut expected = vec![node(1), node(2)];
        expected.sort();
        assert_eq!(n.validators, expected);
    }

    #[test]
    fn test_pass_through_root_is_collapsed() {
        let inner = QuorumSet::new(2, vec![node(1), node(2), node(3)], vec![]);
        let n = normalized(QuorumSet::new(1, vec![], vec![inner.clone()]));
        assert_eq!(n, normalized(inner));
        assert_eq!(n.threshold, 2);
    }

    #[test]
    fn test_non_singleton_inner_set_is_kept() {
        // Threshold 1 over two members is a real choice, not a wrapper
        let qset = QuorumSet::new(
            1,
            vec![node(1)],
            vec![QuorumSet::new(1, vec![node(2), node(3)], vec![])],
        );
        let n = normalized(qset);
        assert_eq!(n.inner_sets.len(), 1);
        assert_eq!(n.validators, vec![node(1)]);
    }

    #[test]
    fn test_inner_sets_are_sorted() {
        let a = QuorumSet::new(2, vec![node(1), node(2), node(3)], vec![]);
        let b = QuorumSet::new(2, vec![node(4), node(5), node(6)], vec![]);
        let one = normalized(QuorumSet::new(2, vec![], vec![a.clone(), b.clone()]));
        let two = normalized(QuorumSet::new(2, vec![], vec![b, a]));
        assert_eq!(one, two);
        for pair in one.inner_sets.windows(2) {
            assert_ne!(canonical_cmp(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_threshold_breaks_ties() {
        let low = QuorumSet::new(1, vec![node(1), node(2)], vec![]);
        let high = QuorumSet::new(2, vec![node(1), node(2)], vec![]);
        assert_eq!(canonical_cmp(&low, &high), Ordering::Less);
        assert_eq!(canonical_cmp(&high, &high), Ordering::Equal);
    }

    fn arb_qset() -> impl Strategy<Value = QuorumSet> {
        let leaf = (0u32..4, prop::collection::vec(1u8..8, 0..4)).prop_map(|(t, ids)| {
            QuorumSet::new(t, ids.into_iter().map(node).collect(), vec![])
        });
        leaf.prop_recursive(3, 24, 4, |inner| {
            (
                0u32..4,
                prop::collection::vec(1u8..8, 0..4),
                prop::collection::vec(inner, 0..4),
            )
                .prop_map(|(t, ids, sets)| {
                    QuorumSet::new(t, ids.into_iter().map(node).collect(), sets)
                })
        })
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(qset in arb_qset()) {
            let once = normalized(qset);
            let twice = normalized(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_normalize_keeps_members(qset in arb_qset()) {
            let members = qset.all_members();
            prop_assert_eq!(normalized(qset).all_members(), members);
        }
    }
}
