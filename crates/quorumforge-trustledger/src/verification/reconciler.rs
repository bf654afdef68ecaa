//! Manual override reconciliation
//!
//! An explicit quorum set always wins and is used exactly as written. When
//! validators were also declared, the synthesized set is compared against it
//! so that an override silently drifting from the ledger gets noticed.

use quorumforge_common::{Result, SafetyError};
use tracing::{info, warn};

use crate::consensus::quorum::QuorumSet;
use crate::ledger::TrustLedger;

/// Outcome of choosing between the manual and synthesized sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub quorum_set: QuorumSet,
    /// Top level entries belong to different organizations
    pub mixed_domains: bool,
    /// The manual set was used
    pub overridden: bool,
}

/// Pick the quorum set to validate
pub fn reconcile(
    manual: Option<QuorumSet>,
    synthesized: QuorumSet,
    ledger: &TrustLedger,
    unsafe_quorum: bool,
) -> Result<Reconciliation> {
    let Some(manual) = manual else {
        return Ok(Reconciliation {
            quorum_set: synthesized,
            mixed_domains: ledger.home_domains().len() > 1,
            overridden: false,
        });
    };

    if ledger.declared().next().is_some() {
        let generated = synthesized.canonical_json()?;
        if generated != manual.canonical_json()? {
            warn!(%generated, "Manual quorum set differs from the one generated from validators");
            if !unsafe_quorum {
                return Err(SafetyError::OverrideDiverges { generated }.into());
            }
            warn!("Using manual quorum set because unsafe quorum is set");
        } else {
            info!("Manual quorum set matches the generated one");
        }
    }

    // A hand written set cannot be attributed to a single organization
    Ok(Reconciliation {
        quorum_set: manual,
        mixed_domains: true,
        overridden: true,
    })
}
