//! Hand written quorum set declarations
//!
//! ```toml
//! [quorum_set]
//! threshold_percent = 67
//! validators = ["$alpha", "@z6MkpT", "did:key:z6Mk... gamma"]
//!
//! [quorum_set.partners]
//! validators = ["$delta", "$epsilon", "$zeta"]
//! ```
//!
//! Every key other than `threshold_percent` and `validators` names a nested
//! group. Group names are read case-insensitively, like every other key.

use std::collections::BTreeMap;

use quorumforge_common::{
    AliasTable, AliasTableBuilder, IdentityError, NodeId, Result, StructuralError,
};
use serde::{Deserialize, Serialize};

use crate::consensus::quorum::QuorumSet;

/// Deepest group level below the root
pub const MAX_DECL_LEVEL: usize = 2;

/// Threshold percent used when a group does not set one
pub const DEFAULT_THRESHOLD_PERCENT: u32 = 67;

/// Nested quorum set declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumSetDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_percent: Option<u32>,

    /// `$alias`, `@prefix` or `did:key [alias]` references
    #[serde(default)]
    pub validators: Vec<String>,

    #[serde(flatten)]
    pub groups: BTreeMap<String, QuorumSetDecl>,
}

impl QuorumSetDecl {
    /// Register aliases given inline as `did:key alias`
    pub fn collect_aliases(&self, aliases: &mut AliasTableBuilder) -> Result<()> {
        for member in &self.validators {
            if member.starts_with('$') || member.starts_with('@') {
                continue;
            }
            let mut parts = member.split_whitespace();
            let (Some(key), Some(alias)) = (parts.next(), parts.next()) else {
                continue;
            };
            let id: NodeId = key.parse()?;
            aliases.add(id, alias)?;
        }
        for (group, decl) in &self.groups {
            decl.collect_aliases(aliases).map_err(|e| e.in_group(group))?;
        }
        Ok(())
    }

    /// Resolve the declaration at `level` into a quorum set
    pub fn resolve(&self, aliases: &AliasTable, level: usize) -> Result<QuorumSet> {
        if level > MAX_DECL_LEVEL {
            return Err(StructuralError::TooDeep { max: MAX_DECL_LEVEL }.into());
        }

        let percent = self.threshold_percent.unwrap_or(DEFAULT_THRESHOLD_PERCENT);
        if !(1..=100).contains(&percent) {
            return Err(StructuralError::InvalidThresholdPercent(percent).into());
        }

        let validators = self
            .validators
            .iter()
            .map(|member| resolve_member(aliases, member))
            .collect::<Result<Vec<_>>>()?;

        let mut inner_sets = Vec::with_capacity(self.groups.len());
        for (group, decl) in &self.groups {
            let inner = decl
                .resolve(aliases, level + 1)
                .map_err(|e| e.in_group(group))?;
            inner_sets.push(inner);
        }

        let size = (validators.len() + inner_sets.len()) as u32;
        if size == 0 {
            return Err(StructuralError::EmptyGroup.into());
        }

        // Round up size * percent / 100
        let threshold = 1 + (size * percent - 1) / 100;
        Ok(QuorumSet::new(threshold, validators, inner_sets))
    }
}

fn resolve_member(aliases: &AliasTable, member: &str) -> Result<NodeId> {
    if member.starts_with('$') || member.starts_with('@') {
        return Ok(aliases.resolve(member)?);
    }
    let key = member
        .split_whitespace()
        .next()
        .ok_or_else(|| IdentityError::InvalidFormat(member.to_string()))?;
    Ok(aliases.resolve(key)?)
}
