//! Trust Ledger assembly
//!
//! The ledger is accumulated by [`TrustLedgerBuilder`] from the declared home
//! domains and validators, then frozen. Every invariant is checked while
//! building so that synthesis only ever sees well-formed input.

use std::collections::{BTreeMap, BTreeSet};

use quorumforge_common::{DuplicateError, LedgerError, NodeId, Result};
use tracing::debug;

use crate::ledger::entry::{ValidatorEntry, ValidatorQuality, ValidatorRecord};

/// Name of the synthetic entry representing the local node
pub const SELF_NAME: &str = "self";

/// Builder accumulating home domains and validators
#[derive(Debug, Default)]
pub struct TrustLedgerBuilder {
    domains: BTreeMap<String, ValidatorQuality>,
    entries: Vec<ValidatorEntry>,
}

impl TrustLedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the default quality of a home domain
    pub fn add_domain(&mut self, home_domain: &str, quality: ValidatorQuality) -> Result<&mut Self> {
        if home_domain.is_empty() {
            return Err(LedgerError::MissingField { field: "home_domain" }.into());
        }
        if self.domains.contains_key(home_domain) {
            return Err(DuplicateError::HomeDomain(home_domain.to_string()).into());
        }
        self.domains.insert(home_domain.to_string(), quality);
        Ok(self)
    }

    /// Validate and add a declared validator
    pub fn add_validator(&mut self, record: &ValidatorRecord) -> Result<&mut Self> {
        if record.name.is_empty() {
            return Err(LedgerError::MissingField { field: "name" }.into());
        }
        let name = record.name.clone();
        // Reserved for the local node
        if name == SELF_NAME {
            return Err(DuplicateError::ValidatorName(name).into());
        }
        if record.home_domain.is_empty() {
            return Err(LedgerError::IncompleteEntry { name, field: "home_domain" }.into());
        }
        if record.public_key.is_empty() {
            return Err(LedgerError::IncompleteEntry { name, field: "public_key" }.into());
        }

        let quality = match (record.quality, self.domains.get(&record.home_domain)) {
            (Some(_), Some(_)) => {
                return Err(DuplicateError::QualitySource {
                    name,
                    domain: record.home_domain.clone(),
                }
                .into())
            }
            (Some(explicit), None) => explicit,
            (None, Some(inherited)) => *inherited,
            (None, None) => return Err(LedgerError::MissingQuality { name }.into()),
        };

        let node_id: NodeId = record.public_key.parse()?;
        let has_history = record.history.as_deref().is_some_and(|h| !h.is_empty());
        if quality == ValidatorQuality::High && !has_history {
            return Err(LedgerError::MissingArchive { name }.into());
        }

        self.push(ValidatorEntry {
            name,
            home_domain: record.home_domain.clone(),
            quality,
            node_id,
            has_history,
            address: record.address.clone(),
        })
    }

    /// Add the local node, whose quality comes from its home domain
    pub fn add_self(&mut self, node_id: NodeId, home_domain: &str) -> Result<&mut Self> {
        let quality = *self
            .domains
            .get(home_domain)
            .ok_or_else(|| LedgerError::UnknownSelfDomain {
                domain: home_domain.to_string(),
            })?;

        self.push(ValidatorEntry {
            name: SELF_NAME.to_string(),
            home_domain: home_domain.to_string(),
            quality,
            node_id,
            has_history: false,
            address: None,
        })
    }

    fn push(&mut self, entry: ValidatorEntry) -> Result<&mut Self> {
        if self.entries.iter().any(|e| e.name == entry.name) {
            return Err(DuplicateError::ValidatorName(entry.name).into());
        }
        if let Some(existing) = self.entries.iter().find(|e| e.node_id == entry.node_id) {
            return Err(DuplicateError::ValidatorIdentity {
                name: entry.name,
                existing: existing.name.clone(),
            }
            .into());
        }
        debug!(
            name = %entry.name,
            domain = %entry.home_domain,
            quality = %entry.quality,
            "Validator added to trust ledger"
        );
        self.entries.push(entry);
        Ok(self)
    }

    pub fn build(self) -> TrustLedger {
        TrustLedger {
            domains: self.domains,
            entries: self.entries,
        }
    }
}

/// Immutable collection of validated trusted parties
#[derive(Debug, Clone, Default)]
pub struct TrustLedger {
    domains: BTreeMap<String, ValidatorQuality>,
    entries: Vec<ValidatorEntry>,
}

impl TrustLedger {
    pub fn builder() -> TrustLedgerBuilder {
        TrustLedgerBuilder::new()
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[ValidatorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn domain_quality(&self, home_domain: &str) -> Option<ValidatorQuality> {
        self.domains.get(home_domain).copied()
    }

    /// Entries by quality descending, then home domain ascending.
    ///
    /// The sort is stable, so ties keep declaration order.
    pub fn sorted_entries(&self) -> Vec<&ValidatorEntry> {
        let mut sorted: Vec<&ValidatorEntry> = self.entries.iter().collect();
        sorted.sort_by(|l, r| {
            r.quality
                .cmp(&l.quality)
                .then_with(|| l.home_domain.cmp(&r.home_domain))
        });
        sorted
    }

    /// Distinct home domains referenced by entries
    pub fn home_domains(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.home_domain.as_str()).collect()
    }

    /// Validators publishing a history feed
    pub fn history_publishers(&self) -> BTreeSet<NodeId> {
        self.entries
            .iter()
            .filter(|e| e.has_history)
            .map(|e| e.node_id)
            .collect()
    }

    /// Peer addresses declared alongside validators
    pub fn known_peers(&self) -> Vec<&str> {
        self.entries.iter().filter_map(|e| e.address.as_deref()).collect()
    }

    /// Declared validators, excluding the local node
    pub fn declared(&self) -> impl Iterator<Item = &ValidatorEntry> {
        self.entries.iter().filter(|e| e.name != SELF_NAME)
    }
}
