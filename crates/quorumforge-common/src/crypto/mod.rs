//! Cryptographic identities for QuorumForge
//!
//! This module provides:
//! - did:key encoding of validator public keys
//! - The local node's secret seed

pub mod did;

// Re-export commonly used items
pub use did::{NodeId, NodeSeed};
