//! The JSON manifest a publication's root CID resolves to.

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub metadata: ManifestMetadata,
    #[serde(default)]
    pub payload: ManifestPayload,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub wallet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPayload {
    #[serde(default)]
    pub title_cid: Option<String>,
    #[serde(default)]
    pub abstract_cid: Option<String>,
    #[serde(default)]
    pub manuscript_cid: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cid: String,
}

impl Manifest {
    /// Parse manifest bytes fetched from the content gateway.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AdapterError> {
        serde_json::from_slice(bytes).map_err(|e| AdapterError::Decode {
            target: "manifest".into(),
            message: e.to_string(),
        })
    }

    /// CID of the abstract text. Required by both workflows.
    pub fn abstract_cid(&self) -> Result<&str, AdapterError> {
        self.payload
            .abstract_cid
            .as_deref()
            .filter(|cid| !cid.trim().is_empty())
            .ok_or_else(|| AdapterError::ContractViolation("manifest has no payload.abstractCid".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_manifest() {
        let raw = br#"{
            "metadata": {"authors": [{"name": "Ada", "role": "First_Author"}], "license": "CC-BY"},
            "payload": {
                "titleCid": "bafytitle",
                "abstractCid": "bafyabstract",
                "manuscriptCid": "bafyms",
                "attachments": [{"name": "data.csv", "type": "text/csv", "cid": "bafycsv"}]
            }
        }"#;
        let m = Manifest::from_slice(raw).unwrap();
        assert_eq!(m.abstract_cid().unwrap(), "bafyabstract");
        assert_eq!(m.payload.attachments[0].kind, "text/csv");
        assert_eq!(m.metadata.authors[0].name, "Ada");
    }

    #[test]
    fn test_missing_abstract_is_contract_violation() {
        let m = Manifest::from_slice(br#"{"payload": {"titleCid": "x"}}"#).unwrap();
        assert!(matches!(
            m.abstract_cid().unwrap_err(),
            AdapterError::ContractViolation(_)
        ));
    }

    #[test]
    fn test_non_json_is_decode_error() {
        assert!(matches!(
            Manifest::from_slice(b"not json").unwrap_err(),
            AdapterError::Decode { .. }
        ));
    }
}
