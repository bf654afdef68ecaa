//! Consensus trust structures
//!
//! This module provides:
//! - Threshold arithmetic for collective and independent groups
//! - The nested quorum set model and its canonical form
//! - Blocking set search and structural sanity checks
//! - Synthesis of a quorum set from the Trust Ledger

pub mod blocking;
pub mod normalize;
pub mod quorum;
pub mod sanity;
pub mod synthesizer;
pub mod threshold;

pub use blocking::{find_closest_v_blocking, is_v_blocking, minimal_blocking_set_size};
pub use normalize::normalize;
pub use quorum::{QuorumSet, QuorumSetHash};
pub use sanity::{QuorumSetSanityChecker, MAX_NESTING_DEPTH, MAX_QUORUM_NODES};
pub use synthesizer::{synthesize, synthesize_raw};
pub use threshold::{threshold, TrustMode};
