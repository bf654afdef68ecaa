//! Structural sanity checks for quorum sets

use std::collections::BTreeSet;

use quorumforge_common::NodeId;

use crate::consensus::quorum::QuorumSet;

/// Deepest allowed level of inner sets below the root
pub const MAX_NESTING_DEPTH: usize = 4;

/// Largest number of validators a quorum set may reference
pub const MAX_QUORUM_NODES: usize = 1000;

/// Checks nesting, duplicates and thresholds of a quorum set.
///
/// In strict mode every threshold must cover more than half of its entries.
pub struct QuorumSetSanityChecker {
    strict: bool,
    known_nodes: BTreeSet<NodeId>,
    count: usize,
    reason: Option<String>,
}

impl QuorumSetSanityChecker {
    /// Check `qset`; `Err` carries the first violation found
    pub fn check(qset: &QuorumSet, strict: bool) -> Result<(), String> {
        let mut checker = Self {
            strict,
            known_nodes: BTreeSet::new(),
            count: 0,
            reason: None,
        };
        if checker.check_level(qset, 0) {
            checker.check_count();
        }
        match checker.reason {
            None => Ok(()),
            Some(reason) => Err(reason),
        }
    }

    pub fn is_sane(qset: &QuorumSet, strict: bool) -> bool {
        Self::check(qset, strict).is_ok()
    }

    fn fail(&mut self, reason: String) -> bool {
        self.reason = Some(reason);
        false
    }

    fn check_level(&mut self, qset: &QuorumSet, depth: usize) -> bool {
        if depth > MAX_NESTING_DEPTH {
            return self.fail(format!(
                "cannot have sets nested more than {} levels deep",
                MAX_NESTING_DEPTH
            ));
        }
        if qset.threshold < 1 {
            return self.fail("threshold must be greater than 0".to_string());
        }

        let total = qset.size();
        let v_blocking_size = total as i64 - qset.threshold as i64 + 1;
        self.count += qset.validators.len();

        if qset.threshold > total {
            return self.fail(format!(
                "threshold {} exceeds the {} entries of the set",
                qset.threshold, total
            ));
        }
        if self.strict && (qset.threshold as i64) < v_blocking_size {
            return self.fail(format!(
                "threshold {} of {} entries must be greater than 50%",
                qset.threshold, total
            ));
        }

        for node in &qset.validators {
            if !self.known_nodes.insert(*node) {
                return self.fail(format!("duplicate validator {}", node));
            }
        }
        qset.inner_sets
            .iter()
            .all(|inner| self.check_level(inner, depth + 1))
    }

    fn check_count(&mut self) -> bool {
        if self.count < 1 {
            return self.fail("quorum set must contain at least one validator".to_string());
        }
        if self.count > MAX_QUORUM_NODES {
            return self.fail(format!(
                "quorum set references {} validators, at most {} allowed",
                self.count, MAX_QUORUM_NODES
            ));
        }
        true
    }
}
