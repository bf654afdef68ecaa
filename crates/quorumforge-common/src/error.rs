//! Error types for QuorumForge
//!
//! Provides a unified error type and one sub-enum per failure class. Every
//! error aborts the configuration load; only [`QuorumError::UnsafeConfiguration`]
//! may be suppressed, and only by an explicit, logged override.

use thiserror::Error;

/// Result type alias using QuorumError
pub type Result<T> = std::result::Result<T, QuorumError>;

/// Unified error type for quorum construction and validation
#[derive(Debug, Error)]
pub enum QuorumError {
    // Tier, redundancy and ordering violations in validator data
    #[error("Malformed ledger: {0}")]
    MalformedLedger(#[from] LedgerError),

    // Identity strings that do not decode to a valid key
    #[error("Invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    // Repeated names, domains, aliases or quality sources
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(#[from] DuplicateError),

    // Quorum sets that fail shape checks
    #[error("Structural violation: {0}")]
    StructuralViolation(#[from] StructuralError),

    // Conditions weakening the declared Byzantine safety guarantee
    #[error("Unsafe configuration: {0}")]
    UnsafeConfiguration(#[from] SafetyError),

    // Document loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QuorumError {
    /// Whether an explicit unsafe-quorum override may downgrade this error to a warning
    pub fn is_suppressible(&self) -> bool {
        matches!(self, QuorumError::UnsafeConfiguration(_))
    }

    /// Attach the name of the quorum set group being parsed, keeping the error class
    pub fn in_group(self, group: &str) -> Self {
        let group = group.to_string();
        match self {
            QuorumError::InvalidIdentity(reason) => IdentityError::InGroup {
                group,
                reason: Box::new(reason),
            }
            .into(),
            QuorumError::DuplicateDeclaration(reason) => DuplicateError::InGroup {
                group,
                reason: Box::new(reason),
            }
            .into(),
            QuorumError::StructuralViolation(reason) => StructuralError::InGroup {
                group,
                reason: Box::new(reason),
            }
            .into(),
            other => other,
        }
    }
}

/// Validator data errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validators {first} and {second} must have same quality")]
    MixedQuality { first: String, second: String },

    #[error("high quality validator {name} must have redundancy of at least 3 (domain {domain} has {count})")]
    InsufficientRedundancy {
        name: String,
        domain: String,
        count: usize,
    },

    #[error("invalid validator quality for {name}: qualities must be descending")]
    QualitiesNotDescending { name: String },

    #[error("quality tiers nested deeper than {max} levels at validator {name}")]
    TooManyTiers { name: String, max: usize },

    #[error("validator entry {name} is missing quality")]
    MissingQuality { name: String },

    #[error("validator entry {name} (high quality must have an archive)")]
    MissingArchive { name: String },

    #[error("validator entry is missing '{field}'")]
    MissingField { field: &'static str },

    #[error("validator entry {name} is missing '{field}'")]
    IncompleteEntry { name: String, field: &'static str },

    #[error("home domain {domain} for self is not declared in home domains")]
    UnknownSelfDomain { domain: String },
}

/// Identity codec errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid DID format: {0}")]
    InvalidFormat(String),

    #[error("Invalid base58 encoding in {0}")]
    InvalidEncoding(String),

    #[error("Invalid multicodec prefix in {0}")]
    InvalidMulticodec(String),

    #[error("Not a valid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid node seed: {0}")]
    InvalidSeed(String),

    #[error("Unknown key in config: {0}")]
    UnknownReference(String),

    #[error("Aliases only store public keys: {0}")]
    AliasForSeed(String),

    #[error("Reference {0} matches more than one key")]
    AmbiguousReference(String),

    #[error("{reason} while parsing '{group}'")]
    InGroup {
        group: String,
        reason: Box<IdentityError>,
    },
}

/// Repeated declaration errors
#[derive(Debug, Error)]
pub enum DuplicateError {
    #[error("validator name {0} declared twice")]
    ValidatorName(String),

    #[error("validator {name} reuses identity of {existing}")]
    ValidatorIdentity { name: String, existing: String },

    #[error("home domain {0} declared twice")]
    HomeDomain(String),

    #[error("name already used: {0}")]
    AliasName(String),

    #[error("naming node twice: {0}")]
    AliasIdentity(String),

    #[error("validator entry {name}: quality already defined in home domain {domain}")]
    QualitySource { name: String, domain: String },

    #[error("{reason} while parsing '{group}'")]
    InGroup {
        group: String,
        reason: Box<DuplicateError>,
    },
}

/// Quorum set shape errors
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("no validators defined in validators/quorum set")]
    NoValidators,

    #[error("too many levels in quorum set (max {max})")]
    TooDeep { max: usize },

    #[error("invalid threshold percent {0} (must be between 1 and 100)")]
    InvalidThresholdPercent(u32),

    #[error("invalid quorum set definition: group has no members")]
    EmptyGroup,

    #[error("{reason} while parsing '{group}'")]
    InGroup {
        group: String,
        reason: Box<StructuralError>,
    },

    #[error("invalid quorum set ({reason}): check nesting, duplicate entries and thresholds (must be between {min_percent} and 100)")]
    Insane { reason: String, min_percent: u32 },
}

/// Safety guarantee violations
#[derive(Debug, Error)]
pub enum SafetyError {
    #[error("failure safety {failure_safety} incompatible with quorum set (breaks with {blocking_size} failures)")]
    FailureSafetyTooHigh {
        failure_safety: u32,
        blocking_size: usize,
    },

    #[error("failure safety of 0 requires unsafe quorum")]
    ZeroFailureSafety,

    #[error("threshold percentage too low: threshold {threshold} < safe minimum {min_size}")]
    ThresholdTooLow { threshold: u32, min_size: u32 },

    #[error("manual override disagrees with generated structure: {generated}")]
    OverrideDiverges { generated: String },

    #[error("quorum reachable without any history-publishing validator")]
    NoHistoryBlockingSet,
}

// Implement From for common external error types
impl From<serde_json::Error> for QuorumError {
    fn from(err: serde_json::Error) -> Self {
        QuorumError::Serialization(err.to_string())
    }
}
