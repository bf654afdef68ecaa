//! Quorum set synthesis from the Trust Ledger
//!
//! Entries are grouped tier by tier. Within a tier, each home domain becomes
//! an inner set with a simple-majority threshold, since an organization's own
//! validators are trusted collectively. Lower tiers are folded into a single
//! nested set appended to the tier above, and every level applies the
//! Byzantine threshold across its independent entries:
//!
//! ```text
//! { t: byz(n),
//!   innerSets: [ HIGH domain groups..., { t: byz(m),
//!                                         innerSets: [ MEDIUM domain groups..., { LOW ... } ] } ] }
//! ```

use std::collections::BTreeMap;

use quorumforge_common::{LedgerError, Result};
use tracing::{debug, instrument};

use crate::consensus::normalize::normalize;
use crate::consensus::quorum::QuorumSet;
use crate::consensus::threshold::{threshold, TrustMode};
use crate::ledger::{TrustLedger, ValidatorEntry, ValidatorQuality};

/// Deepest tier recursion, one level per quality below `High`
pub const MAX_TIER_DEPTH: usize = ValidatorQuality::High.tiers_below();

/// Minimum size of a top tier domain group
pub const MIN_HIGH_QUALITY_REDUNDANCY: usize = 3;

/// Build the canonical quorum set for `ledger`
#[instrument(skip_all, fields(validators = ledger.len()))]
pub fn synthesize(ledger: &TrustLedger) -> Result<QuorumSet> {
    let mut qset = synthesize_raw(ledger)?;
    normalize(&mut qset);
    Ok(qset)
}

/// Build the quorum set for `ledger` without canonicalizing it
pub fn synthesize_raw(ledger: &TrustLedger) -> Result<QuorumSet> {
    check_domain_quality(ledger.entries())?;
    let sorted = ledger.sorted_entries();
    build_tier(&sorted, ValidatorQuality::High, 0)
}

/// Every validator of a home domain must share one quality
fn check_domain_quality(entries: &[ValidatorEntry]) -> Result<()> {
    let mut first_by_domain: BTreeMap<&str, &ValidatorEntry> = BTreeMap::new();
    for entry in entries {
        let first = *first_by_domain
            .entry(entry.home_domain.as_str())
            .or_insert(entry);
        if first.quality != entry.quality {
            return Err(LedgerError::MixedQuality {
                first: first.name.clone(),
                second: entry.name.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn build_tier(entries: &[&ValidatorEntry], tier: ValidatorQuality, depth: usize) -> Result<QuorumSet> {
    let mut qset = QuorumSet::empty();
    let mut rest = entries;

    while let Some(first) = rest.first().copied() {
        if first.quality != tier {
            break;
        }
        let group_len = rest
            .iter()
            .take_while(|e| e.home_domain == first.home_domain)
            .count();
        let (group, tail) = rest.split_at(group_len);

        if tier == ValidatorQuality::High && group.len() < MIN_HIGH_QUALITY_REDUNDANCY {
            return Err(LedgerError::InsufficientRedundancy {
                name: first.name.clone(),
                domain: first.home_domain.clone(),
                count: group.len(),
            }
            .into());
        }

        let validators: Vec<_> = group.iter().map(|e| e.node_id).collect();
        let group_threshold = threshold(validators.len() as u32, TrustMode::Collective);
        debug!(
            domain = %first.home_domain,
            quality = %tier,
            size = validators.len(),
            threshold = group_threshold,
            "Domain group synthesized"
        );
        qset.inner_sets.push(QuorumSet::new(group_threshold, validators, vec![]));
        rest = tail;
    }

    if let Some(next) = rest.first() {
        if next.quality > tier {
            return Err(LedgerError::QualitiesNotDescending {
                name: next.name.clone(),
            }
            .into());
        }
        if depth >= MAX_TIER_DEPTH {
            return Err(LedgerError::TooManyTiers {
                name: next.name.clone(),
                max: MAX_TIER_DEPTH,
            }
            .into());
        }
        let lower = build_tier(rest, next.quality, depth + 1)?;
        qset.inner_sets.push(lower);
    }

    qset.threshold = threshold(qset.size(), TrustMode::Independent);
    Ok(qset)
}
