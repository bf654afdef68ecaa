//! # QuorumForge Common
//!
//! Shared identities, aliases and errors for the QuorumForge trust toolchain.
//!
//! ## Core Types
//!
//! - [`NodeId`]: did:key encoded Ed25519 validator identity
//! - [`NodeSeed`]: the local node's secret seed
//! - [`AliasTable`]: frozen identity <-> display name map
//! - [`QuorumError`]: the error taxonomy shared by every stage

pub mod crypto;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use crypto::did::{NodeId, NodeSeed};
pub use error::{
    DuplicateError, IdentityError, LedgerError, QuorumError, Result, SafetyError,
    StructuralError,
};
pub use types::alias_table::{AliasTable, AliasTableBuilder};

/// QuorumForge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
