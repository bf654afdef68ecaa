//! Threshold arithmetic for the Byzantine fault model
//!
//! ```text
//! collective:  n = 2f + 1  ->  t = n - (n - 1) / 2
//! independent: n = 3f + 1  ->  t = n - (n - 1) / 3
//! ```

/// How far the members of a group trust each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustMode {
    /// Agents of a single organization, assumed collectively honest
    Collective,
    /// Mutually distrusting organizations
    Independent,
}

impl TrustMode {
    pub fn from_collective(collective_trust: bool) -> Self {
        if collective_trust {
            TrustMode::Collective
        } else {
            TrustMode::Independent
        }
    }
}

/// Minimum number of agreeing members for a group of `total`.
///
/// Returns 0 for an empty group, which marks an unconfigured quorum set.
pub fn threshold(total: u32, mode: TrustMode) -> u32 {
    if total == 0 {
        return 0;
    }
    match mode {
        TrustMode::Collective => total - (total - 1) / 2,
        TrustMode::Independent => total - (total - 1) / 3,
    }
}
