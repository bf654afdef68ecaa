//! Node identity codec
//!
//! Validators are identified by their Ed25519 public key, written as a
//! `did:key` identifier (base58btc multibase with the Ed25519 multicodec
//! prefix). The local node additionally holds its secret seed.
//!
//! Reference: https://w3c-ccg.github.io/did-method-key/

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentityError;

/// Ed25519 multicodec prefix for did:key
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Prefix of every did:key identifier
pub const DID_KEY_PREFIX: &str = "did:key:";

/// Public identity of a validator
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId([u8; 32]);

impl NodeId {
    /// Create from raw key bytes, rejecting bytes that are not an Ed25519 point
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, IdentityError> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| IdentityError::InvalidPublicKey(hex::encode(bytes)))?;
        Ok(Self(bytes))
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full did:key form
    pub fn to_did(&self) -> String {
        encode_did_key(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let identifier = s
            .strip_prefix(DID_KEY_PREFIX)
            .ok_or_else(|| IdentityError::InvalidFormat(s.to_string()))?;
        let bytes = decode_did_key(identifier)?;
        NodeId::from_bytes(bytes).map_err(|_| IdentityError::InvalidPublicKey(s.to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_did())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.to_did())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_did())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Secret seed of the local node
#[derive(Clone)]
pub struct NodeSeed {
    signing_key: SigningKey,
}

impl NodeSeed {
    /// Fresh random seed, used when the configuration does not pin one
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&bytes),
        }
    }

    /// Parse a hex-encoded 32 byte seed
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        if s.starts_with('$') || s.starts_with('@') {
            return Err(IdentityError::AliasForSeed(s.to_string()));
        }
        let raw = hex::decode(s.trim()).map_err(|e| IdentityError::InvalidSeed(e.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|v: Vec<u8>| IdentityError::InvalidSeed(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn node_id(&self) -> NodeId {
        NodeId::from_verifying_key(&self.signing_key.verifying_key())
    }
}

impl fmt::Debug for NodeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSeed")
            .field("node_id", &self.node_id())
            .finish_non_exhaustive()
    }
}

/// Encode an Ed25519 public key as did:key identifier
pub fn encode_did_key(public_key: &[u8; 32]) -> String {
    let mut prefixed = Vec::with_capacity(34);
    prefixed.extend_from_slice(&ED25519_MULTICODEC);
    prefixed.extend_from_slice(public_key);

    let encoded = bs58::encode(&prefixed).into_string();
    format!("{}z{}", DID_KEY_PREFIX, encoded)
}

/// Decode the method-specific part of a did:key to raw key bytes
pub fn decode_did_key(identifier: &str) -> Result<[u8; 32], IdentityError> {
    // Only base58btc multibase is accepted
    let encoded = identifier
        .strip_prefix('z')
        .ok_or_else(|| IdentityError::InvalidEncoding(identifier.to_string()))?;

    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|_| IdentityError::InvalidEncoding(identifier.to_string()))?;

    if decoded.len() != 34 || decoded[..2] != ED25519_MULTICODEC {
        return Err(IdentityError::InvalidMulticodec(identifier.to_string()));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&decoded[2..34]);
    Ok(key)
}
