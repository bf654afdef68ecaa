//! Node configuration document

use std::path::Path;

use ::config::{Config, ConfigError, Environment, File, FileFormat, Map, Value, ValueKind};
use quorumforge_common::{QuorumError, Result};
use serde::{Deserialize, Serialize};

use crate::config::quorum_decl::QuorumSetDecl;
use crate::ledger::{HomeDomainRecord, ValidatorRecord};
use crate::verification::FailureSafety;

/// Prefix of environment variables overriding document settings
pub const ENV_PREFIX: &str = "QUORUMFORGE";

/// Quorum related settings of a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Default quality per organization
    pub home_domains: Vec<HomeDomainRecord>,
    /// Trusted validators
    pub validators: Vec<ValidatorRecord>,
    /// Explicit quorum set replacing the generated one
    pub quorum_set: Option<QuorumSetDecl>,
    /// Accept configurations weaker than the Byzantine bound
    pub unsafe_quorum: bool,
    pub failure_safety: FailureSafety,
    /// Participate in consensus as the `self` validator
    pub node_is_validator: bool,
    pub node_home_domain: String,
    /// Hex encoded Ed25519 seed, optionally followed by an alias
    pub node_seed: Option<String>,
}

impl NodeConfig {
    /// Load configuration from a file and `QUORUMFORGE_` environment variables
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let context = |e: ConfigError| QuorumError::Config(format!("{}: {}", path.display(), e));

        let file = read_source(File::from(path)).map_err(context)?;
        let env = read_source(Environment::with_prefix(ENV_PREFIX)).map_err(context)?;
        let merged = overlay(lowercase_keys(file)?, lowercase_keys(env)?);
        merged.try_deserialize().map_err(context)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let doc = read_source(File::from_str(toml, FileFormat::Toml))
            .map_err(|e| QuorumError::Config(e.to_string()))?;
        lowercase_keys(doc)?
            .try_deserialize()
            .map_err(|e| QuorumError::Config(e.to_string()))
    }

    /// Whether the document overrides the generated quorum set
    pub fn has_override(&self) -> bool {
        self.quorum_set.is_some()
    }
}

fn read_source<S>(source: S) -> std::result::Result<Value, ConfigError>
where
    S: ::config::Source + Send + Sync + 'static,
{
    Config::builder().add_source(source).build()?.try_deserialize()
}

/// Lowercase every table key, group names included.
///
/// Keys that only differ in case are rejected.
fn lowercase_keys(value: Value) -> Result<Value> {
    let kind = match value.kind {
        ValueKind::Table(table) => {
            let mut lowered: Map<String, Value> = Map::new();
            for (key, item) in table {
                let lower = key.to_lowercase();
                if lowered.contains_key(&lower) {
                    return Err(QuorumError::Config(format!("key '{}' declared twice", lower)));
                }
                lowered.insert(lower, lowercase_keys(item)?);
            }
            ValueKind::Table(lowered)
        }
        ValueKind::Array(items) => ValueKind::Array(
            items
                .into_iter()
                .map(lowercase_keys)
                .collect::<Result<Vec<_>>>()?,
        ),
        other => other,
    };
    Ok(Value::new(None, kind))
}

/// Top level entries of `top` replace those of `base`
fn overlay(base: Value, top: Value) -> Value {
    match (base.kind, top.kind) {
        (ValueKind::Table(mut base), ValueKind::Table(top)) => {
            base.extend(top);
            Value::new(None, ValueKind::Table(base))
        }
        (base, _) => Value::new(None, base),
    }
}
