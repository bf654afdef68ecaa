//! Validator records and quality tiers

use std::fmt;
use std::str::FromStr;

use quorumforge_common::NodeId;
use serde::{Deserialize, Serialize};

/// Declared trust tier of a validator, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidatorQuality {
    Low,
    Medium,
    High,
}

impl ValidatorQuality {
    /// Number of tiers below this one
    pub const fn tiers_below(self) -> usize {
        match self {
            ValidatorQuality::High => 2,
            ValidatorQuality::Medium => 1,
            ValidatorQuality::Low => 0,
        }
    }
}

impl fmt::Display for ValidatorQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorQuality::Low => write!(f, "LOW"),
            ValidatorQuality::Medium => write!(f, "MEDIUM"),
            ValidatorQuality::High => write!(f, "HIGH"),
        }
    }
}

impl FromStr for ValidatorQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(ValidatorQuality::Low),
            "MEDIUM" => Ok(ValidatorQuality::Medium),
            "HIGH" => Ok(ValidatorQuality::High),
            other => Err(format!("Unknown QUALITY {}", other)),
        }
    }
}

/// Validator as declared in the configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub home_domain: String,
    #[serde(default)]
    pub quality: Option<ValidatorQuality>,
    /// did:key identity
    #[serde(default)]
    pub public_key: String,
    /// History archive endpoint, if the validator publishes one
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Home domain with its default quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeDomainRecord {
    pub home_domain: String,
    pub quality: ValidatorQuality,
}

/// Validated trusted party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorEntry {
    pub name: String,
    pub home_domain: String,
    pub quality: ValidatorQuality,
    pub node_id: NodeId,
    /// Publishes a durable history feed
    pub has_history: bool,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_order() {
        assert!(ValidatorQuality::High > ValidatorQuality::Medium);
        assert!(ValidatorQuality::Medium > ValidatorQuality::Low);

        let mut tiers = vec![ValidatorQuality::Medium, ValidatorQuality::High, ValidatorQuality::Low];
        tiers.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            tiers,
            vec![ValidatorQuality::High, ValidatorQuality::Medium, ValidatorQuality::Low]
        );
    }

    #[test]
    fn test_quality_strings() {
        for q in [ValidatorQuality::Low, ValidatorQuality::Medium, ValidatorQuality::High] {
            assert_eq!(q.to_string().parse::<ValidatorQuality>().unwrap(), q);
        }
        assert!("CRITICAL".parse::<ValidatorQuality>().is_err());
        assert!("high".parse::<ValidatorQuality>().is_err());

        let q: ValidatorQuality = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(q, ValidatorQuality::Medium);
    }

    #[test]
    fn test_record_defaults() {
        let record: ValidatorRecord =
            serde_json::from_str(r#"{"name": "a", "home_domain": "a.example"}"#).unwrap();
        assert!(record.quality.is_none());
        assert!(record.public_key.is_empty());
        assert!(record.history.is_none());
    }
}
