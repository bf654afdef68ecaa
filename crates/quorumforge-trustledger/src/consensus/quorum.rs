//! Nested quorum sets
//!
//! A quorum set is satisfied when at least `threshold` of its entries agree,
//! where an entry is either a validator or an inner set whose own threshold
//! is satisfied.

use std::collections::BTreeSet;

use quorumforge_common::{AliasTable, NodeId, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::consensus::normalize::normalize;

/// Content hash of a canonical quorum set
pub type QuorumSetHash = [u8; 32];

/// Recursive quorum set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumSet {
    /// Entries that must agree
    #[serde(rename = "t")]
    pub threshold: u32,

    /// Direct members
    #[serde(rename = "v", default)]
    pub validators: Vec<NodeId>,

    /// Nested sets, each counting as one entry
    #[serde(rename = "innerSets", default)]
    pub inner_sets: Vec<QuorumSet>,
}

impl QuorumSet {
    pub fn new(threshold: u32, validators: Vec<NodeId>, inner_sets: Vec<QuorumSet>) -> Self {
        Self {
            threshold,
            validators,
            inner_sets,
        }
    }

    /// Unconfigured quorum set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of top level entries
    pub fn size(&self) -> u32 {
        (self.validators.len() + self.inner_sets.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty() && self.inner_sets.is_empty()
    }

    /// Levels of inner sets below this one
    pub fn depth(&self) -> usize {
        self.inner_sets
            .iter()
            .map(|inner| inner.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Visit every leaf validator, depth first
    pub fn for_all_nodes<F: FnMut(&NodeId)>(&self, f: &mut F) {
        for validator in &self.validators {
            f(validator);
        }
        for inner in &self.inner_sets {
            inner.for_all_nodes(f);
        }
    }

    /// All leaf validators reachable from this set
    pub fn all_members(&self) -> BTreeSet<NodeId> {
        let mut nodes = BTreeSet::new();
        self.for_all_nodes(&mut |n| {
            nodes.insert(*n);
        });
        nodes
    }

    /// Whether `agreeing` nodes satisfy this set
    pub fn is_satisfied_by(&self, agreeing: &BTreeSet<NodeId>) -> bool {
        if self.threshold == 0 {
            return false;
        }
        let votes = self.validators.iter().filter(|v| agreeing.contains(v)).count()
            + self
                .inner_sets
                .iter()
                .filter(|inner| inner.is_satisfied_by(agreeing))
                .count();
        votes >= self.threshold as usize
    }

    /// Canonical form of this set
    pub fn canonical(&self) -> QuorumSet {
        let mut qset = self.clone();
        normalize(&mut qset);
        qset
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// JSON of the canonical form, stable across input orderings
    pub fn canonical_json(&self) -> Result<String> {
        self.canonical().to_json()
    }

    /// BLAKE3 hash of the canonical form
    pub fn fingerprint(&self) -> QuorumSetHash {
        let mut hasher = blake3::Hasher::new();
        self.canonical().hash_into(&mut hasher);
        *hasher.finalize().as_bytes()
    }

    fn hash_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(&self.threshold.to_le_bytes());
        hasher.update(&(self.validators.len() as u32).to_le_bytes());
        for validator in &self.validators {
            hasher.update(validator.as_bytes());
        }
        hasher.update(&(self.inner_sets.len() as u32).to_le_bytes());
        for inner in &self.inner_sets {
            inner.hash_into(hasher);
        }
    }

    /// Human readable rendering using aliases where known
    pub fn describe(&self, aliases: &AliasTable) -> String {
        format!("{:#}", self.describe_value(aliases))
    }

    fn describe_value(&self, aliases: &AliasTable) -> Value {
        let validators: Vec<String> = self.validators.iter().map(|v| aliases.short_name(v)).collect();
        let mut value = json!({ "t": self.threshold, "v": validators });
        if !self.inner_sets.is_empty() {
            let inner: Vec<Value> = self.inner_sets.iter().map(|i| i.describe_value(aliases)).collect();
            value["innerSets"] = Value::Array(inner);
        }
        value
    }
}
