//! Publication identity: ids, manifest references, thread keys and addresses.

use serde::{Deserialize, Serialize};

use crate::error::BioVerifyError;

/// Sequential on-chain publication id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationId(pub u64);

impl std::fmt::Display for PublicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PublicationId {
    type Err = BioVerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(PublicationId)
            .map_err(|e| BioVerifyError::InvalidInput(format!("invalid publication id {s:?}: {e}")))
    }
}

/// Immutable identity of one run: the publication id plus its manifest CID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicationRef {
    pub publication_id: PublicationId,
    pub root_cid: String,
}

impl PublicationRef {
    pub fn new(publication_id: PublicationId, root_cid: impl Into<String>) -> Self {
        Self {
            publication_id,
            root_cid: root_cid.into(),
        }
    }

    /// The persistence and idempotency key for this publication's runs.
    pub fn thread_key(&self) -> ThreadKey {
        ThreadKey::derive(self)
    }
}

/// Deterministic key under which a publication's checkpoints are stored.
///
/// Formatted as `{publicationId}-{rootCid}`. The id is all digits, so the
/// first `-` always separates the two parts and distinct inputs never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadKey(String);

impl ThreadKey {
    pub fn derive(publication: &PublicationRef) -> Self {
        ThreadKey(format!(
            "{}-{}",
            publication.publication_id, publication.root_cid
        ))
    }

    /// Accept an externally supplied key (route parameter, CLI argument).
    pub fn parse(raw: &str) -> Result<Self, BioVerifyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(BioVerifyError::InvalidInput(
                "thread key must not be empty".into(),
            ));
        }
        Ok(ThreadKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ThreadKey {
    type Err = BioVerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThreadKey::parse(s)
    }
}

impl std::fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An EVM account address, normalised to lowercase `0x` + 40 hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, BioVerifyError> {
        let raw = raw.trim();
        let hex_part = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| BioVerifyError::InvalidInput(format!("address {raw:?} lacks 0x prefix")))?;
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BioVerifyError::InvalidInput(format!(
                "address {raw:?} is not 20 hex-encoded bytes"
            )));
        }
        Ok(Address(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// Build from the 20 raw bytes of an ABI word.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(format!("0x{}", hex::encode(bytes)))
    }

    /// The 20 raw bytes.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // Validated on construction, so decoding cannot fail.
        if let Ok(decoded) = hex::decode(&self.0[2..]) {
            out.copy_from_slice(&decoded);
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = BioVerifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl std::str::FromStr for Address {
    type Err = BioVerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
