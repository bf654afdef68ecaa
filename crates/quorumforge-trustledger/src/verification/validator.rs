//! Quorum Validator
//!
//! Verifies that a final quorum set honors the requested failure safety:
//! 1. Collects every leaf validator
//! 2. Finds the smallest blocking set
//! 3. Resolves `auto` failure safety from the top level threshold
//! 4. Rejects settings the quorum set cannot tolerate
//! 5. Runs the structural sanity checks

use std::collections::BTreeSet;
use std::fmt;

use quorumforge_common::{NodeId, Result, SafetyError, StructuralError};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{error, info, instrument, warn};

use crate::consensus::blocking::{find_closest_v_blocking, is_v_blocking};
use crate::consensus::quorum::{QuorumSet, QuorumSetHash};
use crate::consensus::sanity::QuorumSetSanityChecker;
use crate::consensus::threshold::{threshold, TrustMode};

/// Simultaneous validator failures the configuration must tolerate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureSafety {
    /// Derived from the top level of the quorum set
    #[default]
    Auto,
    Count(u32),
}

impl fmt::Display for FailureSafety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureSafety::Auto => write!(f, "auto"),
            FailureSafety::Count(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for FailureSafety {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FailureSafety::Auto => serializer.serialize_str("auto"),
            FailureSafety::Count(n) => serializer.serialize_u32(*n),
        }
    }
}

impl<'de> Deserialize<'de> for FailureSafety {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FailureSafetyVisitor)
    }
}

struct FailureSafetyVisitor;

impl<'de> Visitor<'de> for FailureSafetyVisitor {
    type Value = FailureSafety;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer, -1 or \"auto\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        match v {
            -1 => Ok(FailureSafety::Auto),
            n if n >= 0 => self.visit_u64(n as u64),
            n => Err(E::custom(format!("invalid failure safety {}", n))),
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        u32::try_from(v)
            .map(FailureSafety::Count)
            .map_err(|_| E::custom(format!("failure safety {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        if v.eq_ignore_ascii_case("auto") {
            return Ok(FailureSafety::Auto);
        }
        let n: i64 = v
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid failure safety '{}'", v)))?;
        self.visit_i64(n)
    }
}

/// Settings the validator checks a quorum set against
#[derive(Debug, Clone, Default)]
pub struct ValidationPolicy {
    pub failure_safety: FailureSafety,
    /// Downgrade unsafe configurations to warnings
    pub unsafe_quorum: bool,
    /// Top level entries belong to different organizations
    pub mixed_domains: bool,
    /// Node left out of blocking set search
    pub excluded: Option<NodeId>,
}

/// Quorum set that passed validation, ready for the consensus runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuorum {
    pub quorum_set: QuorumSet,
    /// Resolved failure safety
    pub failure_safety: u32,
    /// Simultaneous failures that break the quorum set
    pub blocking_set_size: usize,
}

impl ValidatedQuorum {
    pub fn fingerprint(&self) -> QuorumSetHash {
        self.quorum_set.fingerprint()
    }
}

/// Validate `qset` against `policy`
#[instrument(skip_all, fields(unsafe_quorum = policy.unsafe_quorum, mixed_domains = policy.mixed_domains))]
pub fn validate(qset: QuorumSet, policy: &ValidationPolicy) -> Result<ValidatedQuorum> {
    let nodes = qset.all_members();
    if nodes.is_empty() {
        return Err(StructuralError::NoValidators.into());
    }

    // Nodes that would break quorum
    let blocking_set_size = find_closest_v_blocking(&qset, &nodes, policy.excluded.as_ref()).len();

    let top_level = qset.size();
    let min_size = threshold(top_level, TrustMode::from_collective(!policy.mixed_domains));

    let failure_safety = match policy.failure_safety {
        FailureSafety::Auto => {
            // Give the top level entries the same weight
            let resolved = top_level - min_size;
            info!(failure_safety = resolved, "Assigning calculated value to failure safety");
            resolved
        }
        FailureSafety::Count(n) => n,
    };

    if let Err(err) = check_safety(&qset, failure_safety, blocking_set_size, min_size, policy.unsafe_quorum) {
        info!(blocking_set_size, "Current quorum set breaks with {} failures", blocking_set_size);
        return Err(err);
    }

    if let Err(reason) = QuorumSetSanityChecker::check(&qset, !policy.unsafe_quorum) {
        let min_percent = if policy.unsafe_quorum { 1 } else { 51 };
        error!(%reason, "Invalid quorum set: check nesting, duplicate entries and thresholds");
        return Err(StructuralError::Insane { reason, min_percent }.into());
    }

    info!(
        failure_safety,
        blocking_set_size,
        threshold = qset.threshold,
        validators = nodes.len(),
        "Quorum set validated"
    );

    Ok(ValidatedQuorum {
        quorum_set: qset,
        failure_safety,
        blocking_set_size,
    })
}

fn check_safety(
    qset: &QuorumSet,
    failure_safety: u32,
    blocking_set_size: usize,
    min_size: u32,
    unsafe_quorum: bool,
) -> Result<()> {
    if failure_safety as usize >= blocking_set_size {
        error!(
            failure_safety,
            blocking_set_size,
            "Not enough nodes or thresholds too strict to ensure the desired failure safety; \
             reduce failure safety or fix the quorum set"
        );
        return Err(SafetyError::FailureSafetyTooHigh {
            failure_safety,
            blocking_size: blocking_set_size,
        }
        .into());
    }

    if failure_safety == 0 {
        if !unsafe_quorum {
            error!("Can't have failure safety of 0 unless unsafe quorum is also set");
            return Err(SafetyError::ZeroFailureSafety.into());
        }
        warn!("Failure safety of 0 accepted because unsafe quorum is set");
    }

    if qset.threshold < min_size {
        if !unsafe_quorum {
            error!(
                threshold = qset.threshold,
                min_size, "Threshold percentage too low; set unsafe quorum to allow it"
            );
            return Err(SafetyError::ThresholdTooLow {
                threshold: qset.threshold,
                min_size,
            }
            .into());
        }
        warn!(
            threshold = qset.threshold,
            min_size, "Threshold below safe minimum accepted because unsafe quorum is set"
        );
    }

    Ok(())
}

/// Check that history publishing validators are part of every quorum
pub fn verify_history_blocking(
    qset: &QuorumSet,
    history_publishers: &BTreeSet<NodeId>,
    unsafe_quorum: bool,
) -> Result<()> {
    if is_v_blocking(qset, history_publishers) {
        return Ok(());
    }
    warn!(
        publishers = history_publishers.len(),
        "Quorum can be reached without validators with an archive"
    );
    if !unsafe_quorum {
        error!(
            "Potentially unsafe configuration: validators with known archives should be \
             included in all quorums; set unsafe quorum if this is really intended"
        );
        return Err(SafetyError::NoHistoryBlockingSet.into());
    }
    Ok(())
}
