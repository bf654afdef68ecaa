//! # TrustLedger
//!
//! Quorum set synthesis and safety validation for QuorumForge nodes.
//!
//! ## Components
//!
//! - **Ledger**: validated validator records grouped by home domain and quality
//! - **Consensus**: quorum set primitives, threshold arithmetic, synthesis and
//!   canonicalization
//! - **Verification**: failure safety validation and override reconciliation
//! - **Config**: the node configuration document and quorum set declarations
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    QuorumConfigurator                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │   Ledger   │  │  Consensus   │  │     Verification     │  │
//! │  │ (domains,  │──│ (synthesize, │──│ (reconcile, history, │  │
//! │  │ validators)│  │  normalize)  │  │   failure safety)    │  │
//! │  └────────────┘  └──────────────┘  └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod configurator;
pub mod consensus;
pub mod ledger;
pub mod verification;

pub use crate::config::{NodeConfig, QuorumSetDecl};
pub use configurator::QuorumConfigurator;
pub use consensus::{
    find_closest_v_blocking, is_v_blocking, normalize, synthesize, threshold, QuorumSet,
    QuorumSetHash, QuorumSetSanityChecker, TrustMode,
};
pub use ledger::{TrustLedger, TrustLedgerBuilder, ValidatorEntry, ValidatorQuality, ValidatorRecord};
pub use verification::{FailureSafety, ValidatedQuorum, ValidationPolicy};
