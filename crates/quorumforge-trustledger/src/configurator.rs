//! Quorum configuration pipeline
//!
//! Turns a [`NodeConfig`] into a validated quorum set in one pass:
//!
//! ```text
//! document ─► trust ledger ─► aliases ─► synthesize ─┐
//!                                                    ├─► reconcile ─► history check ─► validate
//!             quorum_set declaration ─► resolve ─────┘
//! ```
//!
//! Nothing is kept from a failed run.

use quorumforge_common::{AliasTable, AliasTableBuilder, NodeId, NodeSeed, Result};
use tracing::{info, instrument};

use crate::config::NodeConfig;
use crate::consensus::quorum::QuorumSetHash;
use crate::consensus::synthesizer::synthesize;
use crate::ledger::TrustLedger;
use crate::verification::{
    reconcile, validate, verify_history_blocking, ValidatedQuorum, ValidationPolicy,
};

/// Validated quorum configuration of the local node
#[derive(Debug, Clone)]
pub struct QuorumConfigurator {
    quorum: ValidatedQuorum,
    ledger: TrustLedger,
    aliases: AliasTable,
    node_id: NodeId,
    overridden: bool,
}

impl QuorumConfigurator {
    /// Run the whole pipeline over `doc`
    #[instrument(skip_all, fields(validators = doc.validators.len(), has_override = doc.has_override()))]
    pub fn from_document(doc: &NodeConfig) -> Result<Self> {
        let mut aliases = AliasTable::builder();
        let seed = load_seed(doc.node_seed.as_deref(), &mut aliases)?;
        let node_id = seed.node_id();

        let ledger = build_ledger(doc, node_id)?;
        for entry in ledger.declared() {
            aliases.add(entry.node_id, &entry.name)?;
        }
        if let Some(decl) = &doc.quorum_set {
            decl.collect_aliases(&mut aliases)?;
        }
        let aliases = aliases.build();

        let synthesized = synthesize(&ledger)?;
        let manual = doc
            .quorum_set
            .as_ref()
            .map(|decl| decl.resolve(&aliases, 0))
            .transpose()?;

        let reconciled = reconcile(manual, synthesized, &ledger, doc.unsafe_quorum)?;
        if reconciled.overridden {
            info!(quorum_set = %reconciled.quorum_set.describe(&aliases), "Using manual quorum set");
        } else {
            info!(quorum_set = %reconciled.quorum_set.describe(&aliases), "Generated quorum set");
            if !reconciled.quorum_set.is_empty() {
                verify_history_blocking(
                    &reconciled.quorum_set,
                    &ledger.history_publishers(),
                    doc.unsafe_quorum,
                )?;
            }
        }

        let policy = ValidationPolicy {
            failure_safety: doc.failure_safety,
            unsafe_quorum: doc.unsafe_quorum,
            mixed_domains: reconciled.mixed_domains,
            excluded: None,
        };
        let quorum = validate(reconciled.quorum_set, &policy)?;

        info!(
            node = %aliases.short_name(&node_id),
            fingerprint = %hex::encode(quorum.fingerprint()),
            failure_safety = quorum.failure_safety,
            "Quorum configuration ready"
        );

        Ok(Self {
            quorum,
            ledger,
            aliases,
            node_id,
            overridden: reconciled.overridden,
        })
    }

    pub fn quorum(&self) -> &ValidatedQuorum {
        &self.quorum
    }

    pub fn into_quorum(self) -> ValidatedQuorum {
        self.quorum
    }

    pub fn ledger(&self) -> &TrustLedger {
        &self.ledger
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Identity derived from the node seed
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Whether the manual quorum set was used
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn fingerprint(&self) -> QuorumSetHash {
        self.quorum.fingerprint()
    }
}

/// Parse `hex [alias]`, or generate a seed when none is configured
fn load_seed(value: Option<&str>, aliases: &mut AliasTableBuilder) -> Result<NodeSeed> {
    let Some(value) = value else {
        info!("No node seed configured, using a random identity");
        return Ok(NodeSeed::random());
    };

    let mut parts = value.split_whitespace();
    let seed = NodeSeed::from_hex(parts.next().unwrap_or_default())?;
    if let Some(alias) = parts.next() {
        aliases.add(seed.node_id(), alias)?;
    }
    Ok(seed)
}

fn build_ledger(doc: &NodeConfig, node_id: NodeId) -> Result<TrustLedger> {
    let mut builder = TrustLedger::builder();
    for domain in &doc.home_domains {
        builder.add_domain(&domain.home_domain, domain.quality)?;
    }
    for record in &doc.validators {
        builder.add_validator(record)?;
    }

    // An override without validators leaves the ledger empty
    if doc.node_is_validator && !(doc.validators.is_empty() && doc.has_override()) {
        builder.add_self(node_id, &doc.node_home_domain)?;
    }
    Ok(builder.build())
}
