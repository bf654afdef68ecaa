//! Verification module
//!
//! This module provides:
//! - Failure safety and threshold validation of the final quorum set
//! - History archive coverage checks
//! - Reconciliation of manual overrides with the synthesized set

pub mod reconciler;
pub mod validator;

pub use reconciler::{reconcile, Reconciliation};
pub use validator::{
    validate, verify_history_blocking, FailureSafety, ValidatedQuorum, ValidationPolicy,
};
