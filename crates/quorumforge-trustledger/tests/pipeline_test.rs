//! Integration Tests for the quorum configuration pipeline
//!
//! This module tests the full path from configuration text to a validated
//! quorum set:
//! - Generated quorum sets from declared validators
//! - Manual overrides and their reconciliation
//! - History and failure safety checks
//! - Canonical codec round trips

use std::collections::BTreeSet;

use quorumforge_common::{
    DuplicateError, IdentityError, LedgerError, NodeId, NodeSeed, QuorumError, SafetyError,
    StructuralError,
};
use quorumforge_trustledger::{
    normalize, synthesize, NodeConfig, QuorumConfigurator, QuorumSet, TrustLedger,
    ValidatorQuality, ValidatorRecord,
};

fn node(n: u8) -> NodeId {
    NodeSeed::from_bytes([n; 32]).node_id()
}

fn seed_hex(n: u8) -> String {
    hex::encode([n; 32])
}

fn domain_toml(domain: &str, quality: &str) -> String {
    format!("[[HOME_DOMAINS]]\nHOME_DOMAIN = \"{}\"\nQUALITY = \"{}\"\n\n", domain, quality)
}

fn validator_toml(name: &str, domain: &str, n: u8, history: bool) -> String {
    let mut entry = format!(
        "[[VALIDATORS]]\nNAME = \"{}\"\nHOME_DOMAIN = \"{}\"\nPUBLIC_KEY = \"{}\"\n",
        name,
        domain,
        node(n)
    );
    if history {
        entry.push_str(&format!("HISTORY = \"https://{}/history\"\n", domain));
    }
    entry.push('\n');
    entry
}

/// Four HIGH organizations of three validators each
fn four_orgs(reversed: bool) -> String {
    let mut doc = format!("NODE_SEED = \"{}\"\n\n", seed_hex(200));
    let mut validators = Vec::new();
    for (i, domain) in ["a.example", "b.example", "c.example", "d.example"].iter().enumerate() {
        doc.push_str(&domain_toml(domain, "HIGH"));
        for j in 0..3u8 {
            let n = (i as u8) * 3 + j + 1;
            validators.push(validator_toml(&format!("{}{}", &domain[..1], j), domain, n, true));
        }
    }
    if reversed {
        validators.reverse();
    }
    doc.extend(validators);
    doc
}

fn configure(toml: &str) -> quorumforge_common::Result<QuorumConfigurator> {
    QuorumConfigurator::from_document(&NodeConfig::from_toml_str(toml)?)
}

#[cfg(test)]
mod generated_tests {
    use super::*;

    /// Test: declared organizations produce a Byzantine top level
    #[test]
    fn test_four_organizations() {
        let configured = configure(&four_orgs(false)).unwrap();
        let quorum = configured.quorum();

        assert!(!configured.is_overridden());
        assert_eq!(quorum.quorum_set.threshold, 3);
        assert_eq!(quorum.quorum_set.inner_sets.len(), 4);
        for org in &quorum.quorum_set.inner_sets {
            assert_eq!(org.threshold, 2);
            assert_eq!(org.validators.len(), 3);
        }
        assert_eq!(quorum.failure_safety, 1);
        assert_eq!(quorum.blocking_set_size, 4);
    }

    /// Test: declaration order does not change the result
    #[test]
    fn test_declaration_order_is_irrelevant() {
        let forward = configure(&four_orgs(false)).unwrap();
        let reversed = configure(&four_orgs(true)).unwrap();

        assert_eq!(forward.quorum().quorum_set, reversed.quorum().quorum_set);
        assert_eq!(forward.fingerprint(), reversed.fingerprint());
        assert_eq!(
            forward.quorum().quorum_set.canonical_json().unwrap(),
            reversed.quorum().quorum_set.canonical_json().unwrap()
        );
    }

    /// Test: lower tiers are nested below the top tier
    #[test]
    fn test_tiers_nest() {
        let mut doc = four_orgs(false);
        doc.push_str(&domain_toml("m.example", "MEDIUM"));
        doc.push_str(&validator_toml("m0", "m.example", 50, false));
        doc.push_str(&validator_toml("m1", "m.example", 51, false));

        let configured = configure(&doc).unwrap();
        let qset = &configured.quorum().quorum_set;
        // Four HIGH organizations plus the MEDIUM subtree
        assert_eq!(qset.size(), 5);
        assert_eq!(qset.threshold, 4);
        let medium: BTreeSet<NodeId> = [node(50), node(51)].into_iter().collect();
        assert!(qset.inner_sets.iter().any(|inner| inner.all_members() == medium));
    }

    /// Test: explicit failure safety at the blocking set size is rejected
    #[test]
    fn test_failure_safety_too_high() {
        let doc = format!("FAILURE_SAFETY = 4\n{}", four_orgs(false));
        let err = configure(&doc).unwrap_err();
        assert!(matches!(
            err,
            QuorumError::UnsafeConfiguration(SafetyError::FailureSafetyTooHigh {
                failure_safety: 4,
                blocking_size: 4
            })
        ));

        let doc = format!("FAILURE_SAFETY = 3\n{}", four_orgs(false));
        assert_eq!(configure(&doc).unwrap().quorum().failure_safety, 3);
    }

    /// Test: a domain group spanning two qualities is malformed
    #[test]
    fn test_mixed_quality_domain() {
        let mut doc = String::new();
        for j in 0..3u8 {
            doc.push_str(&validator_toml(&format!("a{}", j), "a.example", j + 1, true));
            doc.push_str("QUALITY = \"HIGH\"\n\n");
        }
        doc.push_str(&validator_toml("a-medium", "a.example", 9, false));
        doc.push_str("QUALITY = \"MEDIUM\"\n\n");

        let err = configure(&doc).unwrap_err();
        assert!(matches!(
            err,
            QuorumError::MalformedLedger(LedgerError::MixedQuality { .. })
        ));
    }

    /// Test: quorum must depend on validators with history archives
    #[test]
    fn test_history_must_block() {
        let mut doc = String::new();
        for (i, domain) in ["a.example", "b.example", "c.example", "d.example"].iter().enumerate() {
            doc.push_str(&domain_toml(domain, "MEDIUM"));
            doc.push_str(&validator_toml(&format!("v{}", i), domain, i as u8 + 1, false));
        }

        let err = configure(&doc).unwrap_err();
        assert!(matches!(
            err,
            QuorumError::UnsafeConfiguration(SafetyError::NoHistoryBlockingSet)
        ));

        let configured = configure(&format!("UNSAFE_QUORUM = true\n{}", doc)).unwrap();
        assert_eq!(configured.quorum().quorum_set.validators.len(), 4);
        assert_eq!(configured.quorum().quorum_set.threshold, 3);
    }

    /// Test: nothing to build a quorum from
    #[test]
    fn test_no_validators() {
        let err = configure(&format!("NODE_SEED = \"{}\"", seed_hex(1))).unwrap_err();
        assert!(matches!(err, QuorumError::StructuralViolation(StructuralError::NoValidators)));
    }
}

#[cfg(test)]
mod override_tests {
    use super::*;

    fn override_toml(root_percent: u32) -> String {
        let mut doc = format!("[QUORUM_SET]\nTHRESHOLD_PERCENT = {}\n\n", root_percent);
        for org in ["a", "b", "c", "d"] {
            doc.push_str(&format!(
                "[QUORUM_SET.{org}]\nTHRESHOLD_PERCENT = 51\nVALIDATORS = [\"${org}0\", \"${org}1\", \"${org}2\"]\n\n"
            ));
        }
        doc
    }

    /// Test: an override equal to the generated set is accepted
    #[test]
    fn test_matching_override() {
        let doc = format!("{}{}", four_orgs(false), override_toml(75));
        let configured = configure(&doc).unwrap();
        let generated = configure(&four_orgs(false)).unwrap();

        assert!(configured.is_overridden());
        assert_eq!(configured.fingerprint(), generated.fingerprint());
        assert_eq!(configured.quorum().failure_safety, 1);
    }

    /// Test: a diverging override requires unsafe quorum
    #[test]
    fn test_diverging_override() {
        let doc = format!("{}{}", four_orgs(false), override_toml(100));
        let err = configure(&doc).unwrap_err();
        assert!(matches!(
            err,
            QuorumError::UnsafeConfiguration(SafetyError::OverrideDiverges { .. })
        ));
        assert!(err.is_suppressible());

        let configured = configure(&format!("UNSAFE_QUORUM = true\n{}", doc)).unwrap();
        let qset = &configured.quorum().quorum_set;
        assert_eq!(qset.threshold, 4);
        assert_eq!(configured.quorum().blocking_set_size, 2);
    }

    /// Test: inline aliases resolve in later references
    #[test]
    fn test_override_only_document() {
        let doc = format!(
            "UNSAFE_QUORUM = true\n\n[QUORUM_SET]\nTHRESHOLD_PERCENT = 100\nVALIDATORS = [\"{} alpha\", \"{}\", \"{}\"]\n",
            node(1),
            node(2),
            node(3)
        );
        let configured = configure(&doc).unwrap();
        assert_eq!(configured.aliases().id_of("alpha"), Some(node(1)));

        let quorum = configured.quorum();
        assert_eq!(quorum.quorum_set.validators, vec![node(1), node(2), node(3)]);
        assert_eq!(quorum.quorum_set.threshold, 3);
        // Any single failure blocks a 3 of 3 set, so nothing can be tolerated
        assert_eq!(quorum.blocking_set_size, 1);
        assert_eq!(quorum.failure_safety, 0);
    }

    /// Test: override parsing errors name the offending group
    #[test]
    fn test_unknown_alias_in_group() {
        let doc = format!(
            "{}[QUORUM_SET]\nVALIDATORS = [\"$a0\"]\n\n[QUORUM_SET.partners]\nVALIDATORS = [\"$nobody\"]\n",
            four_orgs(false)
        );
        let err = configure(&doc).unwrap_err();
        assert!(err.to_string().contains("while parsing 'partners'"));
        assert!(err.to_string().contains("$nobody"));
        assert!(matches!(err, QuorumError::InvalidIdentity(IdentityError::InGroup { .. })));
    }

    /// Test: a repeated inline alias inside a group is still a duplicate
    #[test]
    fn test_duplicate_alias_in_group() {
        let doc = format!(
            "UNSAFE_QUORUM = true\n\n[QUORUM_SET]\nVALIDATORS = [\"{} alpha\"]\n\n[QUORUM_SET.G]\nVALIDATORS = [\"{} alpha\"]\n",
            node(1),
            node(2)
        );
        let err = configure(&doc).unwrap_err();
        match err {
            QuorumError::DuplicateDeclaration(DuplicateError::InGroup { group, reason }) => {
                assert_eq!(group, "g");
                assert!(matches!(*reason, DuplicateError::AliasName(ref name) if name == "alpha"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Test: a validator may not take the name of the local node
    #[test]
    fn test_validator_named_self() {
        let mut doc = validator_toml("self", "a.example", 1, true);
        doc.push_str("QUALITY = \"LOW\"\n\n[QUORUM_SET]\nVALIDATORS = [");
        let others: Vec<String> = (2..=5).map(|n| format!("\"{}\"", node(n))).collect();
        doc.push_str(&others.join(", "));
        doc.push_str("]\n");

        let err = configure(&doc).unwrap_err();
        assert!(matches!(
            err,
            QuorumError::DuplicateDeclaration(DuplicateError::ValidatorName(ref name)) if name == "self"
        ));
    }
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    fn ledger() -> TrustLedger {
        let mut builder = TrustLedger::builder();
        let tiers = [
            ("h.example", ValidatorQuality::High, 3u8),
            ("g.example", ValidatorQuality::High, 4),
            ("m.example", ValidatorQuality::Medium, 2),
            ("l.example", ValidatorQuality::Low, 1),
        ];
        let mut n = 0u8;
        for (domain, quality, count) in tiers {
            for j in 0..count {
                n += 1;
                builder
                    .add_validator(&ValidatorRecord {
                        name: format!("{}-{}", domain, j),
                        home_domain: domain.to_string(),
                        quality: Some(quality),
                        public_key: node(n).to_string(),
                        history: Some("https://history.example".to_string()),
                        address: None,
                    })
                    .unwrap();
            }
        }
        builder.build()
    }

    /// Test: synthesize, normalize, encode and decode
    #[test]
    fn test_json_round_trip() {
        let mut qset = synthesize(&ledger()).unwrap();
        normalize(&mut qset);

        let json = qset.to_json().unwrap();
        let decoded = QuorumSet::from_json(&json).unwrap();
        assert_eq!(decoded, qset);
        assert_eq!(decoded.fingerprint(), qset.fingerprint());
    }

    /// Test: wire field names
    #[test]
    fn test_wire_format() {
        let qset = QuorumSet::new(1, vec![node(1)], vec![]);
        let value: serde_json::Value = serde_json::from_str(&qset.to_json().unwrap()).unwrap();
        assert_eq!(value["t"], 1);
        assert_eq!(value["v"][0], node(1).to_string());
        assert!(value["innerSets"].as_array().unwrap().is_empty());
    }
}
