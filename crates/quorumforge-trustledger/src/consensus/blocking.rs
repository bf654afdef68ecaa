//! Blocking set primitives
//!
//! A set of nodes is v-blocking for a quorum set when it intersects every
//! slice, i.e. when its failure alone prevents the quorum set from being
//! satisfied. The size of the smallest such set is the number of failures the
//! configuration can absorb plus one.

use std::collections::BTreeSet;

use quorumforge_common::NodeId;

use crate::consensus::quorum::QuorumSet;

/// Whether `nodes` blocks every slice of `qset`
pub fn is_v_blocking(qset: &QuorumSet, nodes: &BTreeSet<NodeId>) -> bool {
    // There is no v-blocking set for an unconfigured quorum set
    if qset.threshold == 0 {
        return false;
    }
    let mut left_till_block = (1 + qset.size() as i64) - qset.threshold as i64;

    for validator in &qset.validators {
        if nodes.contains(validator) {
            left_till_block -= 1;
            if left_till_block <= 0 {
                return true;
            }
        }
    }
    for inner in &qset.inner_sets {
        if is_v_blocking(inner, nodes) {
            left_till_block -= 1;
            if left_till_block <= 0 {
                return true;
            }
        }
    }
    false
}

/// Smallest set of nodes from `alive` that blocks `qset`, found greedily.
///
/// Nodes outside `alive` are already considered failed; an empty result means
/// `qset` is blocked by them alone. `excluded` is never part of the result
/// and never counts as failed.
pub fn find_closest_v_blocking(
    qset: &QuorumSet,
    alive: &BTreeSet<NodeId>,
    excluded: Option<&NodeId>,
) -> Vec<NodeId> {
    let mut left_till_block = (1 + qset.size() as usize).saturating_sub(qset.threshold as usize);
    let mut res = Vec::new();

    // First, count validators that already failed
    for validator in &qset.validators {
        if excluded == Some(validator) {
            continue;
        }
        if alive.contains(validator) {
            res.push(*validator);
        } else {
            left_till_block = left_till_block.saturating_sub(1);
            if left_till_block == 0 {
                return Vec::new();
            }
        }
    }

    let mut inner_candidates = Vec::new();
    for inner in &qset.inner_sets {
        let blocking = find_closest_v_blocking(inner, alive, excluded);
        if blocking.is_empty() {
            left_till_block = left_till_block.saturating_sub(1);
            if left_till_block == 0 {
                return Vec::new();
            }
        } else {
            inner_candidates.push(blocking);
        }
    }

    // Use the top level validators to get closer
    res.truncate(left_till_block);
    left_till_block -= res.len();

    // Then the cheapest inner sets
    inner_candidates.sort_by_key(Vec::len);
    for candidate in inner_candidates {
        if left_till_block == 0 {
            break;
        }
        res.extend(candidate);
        left_till_block -= 1;
    }

    res
}

/// Number of simultaneous failures that break `qset`, counting all its members
pub fn minimal_blocking_set_size(qset: &QuorumSet, excluded: Option<&NodeId>) -> usize {
    find_closest_v_blocking(qset, &qset.all_members(), excluded).len()
}
