//! Alias table - bidirectional identity <-> display name map
//!
//! Configuration files may refer to validators as `$name` or by identity
//! prefix (`@z6MkpT`). The table is accumulated by [`AliasTableBuilder`]
//! while the document is read, then frozen and passed by reference to every
//! resolution call.

use std::collections::BTreeMap;

use tracing::debug;

use crate::crypto::did::{NodeId, DID_KEY_PREFIX};
use crate::error::{DuplicateError, IdentityError};

/// Number of identifier characters shown for nodes without an alias
const SHORT_ID_LEN: usize = 12;

/// Accumulates aliases before freezing them into an [`AliasTable`]
#[derive(Debug, Default)]
pub struct AliasTableBuilder {
    by_id: BTreeMap<NodeId, String>,
    by_name: BTreeMap<String, NodeId>,
}

impl AliasTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `id`; names and identities may each appear once
    pub fn add(&mut self, id: NodeId, name: &str) -> Result<&mut Self, DuplicateError> {
        if self.by_name.contains_key(name) {
            return Err(DuplicateError::AliasName(name.to_string()));
        }
        if self.by_id.contains_key(&id) {
            return Err(DuplicateError::AliasIdentity(name.to_string()));
        }
        debug!(name, node = %id, "Alias registered");
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
        Ok(self)
    }

    pub fn build(self) -> AliasTable {
        AliasTable {
            by_id: self.by_id,
            by_name: self.by_name,
        }
    }
}

/// Immutable alias table
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    by_id: BTreeMap<NodeId, String>,
    by_name: BTreeMap<String, NodeId>,
}

impl AliasTable {
    pub fn builder() -> AliasTableBuilder {
        AliasTableBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn name_of(&self, id: &NodeId) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a reference to an identity.
    ///
    /// `$name` looks up an alias, `@prefix` matches the start of exactly one
    /// known identifier (the part after `did:key:`), anything else must be a
    /// full did:key.
    pub fn resolve(&self, reference: &str) -> Result<NodeId, IdentityError> {
        if reference.len() < 2 {
            return Err(IdentityError::InvalidFormat(reference.to_string()));
        }
        if let Some(name) = reference.strip_prefix('$') {
            return self
                .id_of(name)
                .ok_or_else(|| IdentityError::UnknownReference(reference.to_string()));
        }
        if let Some(prefix) = reference.strip_prefix('@') {
            let mut found = self
                .by_id
                .keys()
                .filter(|id| identifier_of(id).starts_with(prefix));
            return match (found.next(), found.next()) {
                (Some(id), None) => Ok(*id),
                (Some(_), Some(_)) => Err(IdentityError::AmbiguousReference(reference.to_string())),
                (None, _) => Err(IdentityError::UnknownReference(reference.to_string())),
            };
        }
        reference.parse()
    }

    /// Alias if known, otherwise an abbreviated identifier
    pub fn short_name(&self, id: &NodeId) -> String {
        match self.name_of(id) {
            Some(name) => name.to_string(),
            None => identifier_of(id).chars().take(SHORT_ID_LEN).collect(),
        }
    }
}

fn identifier_of(id: &NodeId) -> String {
    let did = id.to_did();
    did[DID_KEY_PREFIX.len()..].to_string()
}
