//! Trust Ledger - validated validator records and home domain defaults

pub mod entry;
pub mod trust_ledger;

pub use entry::{HomeDomainRecord, ValidatorEntry, ValidatorQuality, ValidatorRecord};
pub use trust_ledger::{TrustLedger, TrustLedgerBuilder, SELF_NAME};
