//! Configuration document and quorum set declarations

pub mod document;
pub mod quorum_decl;

pub use document::{NodeConfig, ENV_PREFIX};
pub use quorum_decl::{QuorumSetDecl, DEFAULT_THRESHOLD_PERCENT, MAX_DECL_LEVEL};
