//! Chainpoint Payload Types

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{ChainpointError, Result};
use crate::transport::RequestOutcome;

/// Returned in place of an empty response body.
pub const EMPTY_PROOF_SENTINEL: &str = "[]";

/// Serialized proof or receipt exactly as the network returned it. The bytes
/// are kept as-is; they are not required to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofPayload(Vec<u8>);

impl ProofPayload {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    pub fn empty() -> Self {
        Self(EMPTY_PROOF_SENTINEL.as_bytes().to_vec())
    }

    /// Body of `outcome`, or the `"[]"` sentinel when the body is blank.
    pub fn from_outcome(outcome: &RequestOutcome) -> Self {
        if outcome.is_empty() {
            Self::empty()
        } else {
            Self(outcome.body.clone())
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The payload as text, or `None` when it is not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Like [`ProofPayload::as_str`], for callers that must embed the proof in JSON.
    pub fn text(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| {
            ChainpointError::ValidationFailure("Proof payload is not valid UTF-8".to_string())
        })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty_sentinel(&self) -> bool {
        self.0 == EMPTY_PROOF_SENTINEL.as_bytes()
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.0).map_err(|e| {
            ChainpointError::ValidationFailure(format!("Proof payload is not JSON: {}", e))
        })
    }
}

impl From<String> for ProofPayload {
    fn from(raw: String) -> Self {
        Self(raw.into_bytes())
    }
}

impl From<Vec<u8>> for ProofPayload {
    fn from(raw: Vec<u8>) -> Self {
        Self(raw)
    }
}

/// A hex-encoded hash accepted for anchoring, submitted exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HashRecord(String);

impl HashRecord {
    pub fn new(hash: &str) -> Result<Self> {
        let hash = hash.trim();
        if hash.is_empty() || hex::decode(hash).is_err() {
            return Err(ChainpointError::invalid_hash(hash));
        }
        Ok(Self(hash.to_string()))
    }

    /// SHA-256 of `data`, hex encoded.
    pub fn from_content(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn outcome(body: &[u8]) -> RequestOutcome {
        RequestOutcome {
            status: StatusCode::OK,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_empty_body_becomes_sentinel() {
        let payload = ProofPayload::from_outcome(&outcome(b""));
        assert_eq!(payload.as_str(), Some("[]"));
        assert!(payload.is_empty_sentinel());

        let payload = ProofPayload::from_outcome(&outcome(b"  \n"));
        assert!(payload.is_empty_sentinel());
    }

    #[test]
    fn test_body_is_kept_verbatim() {
        let payload = ProofPayload::from_outcome(&outcome(br#"[{"proof":"eJy..."}]"#));
        assert_eq!(payload.as_str(), Some(r#"[{"proof":"eJy..."}]"#));
        assert!(!payload.is_empty_sentinel());
        assert!(payload.to_json().unwrap().is_array());
    }

    #[test]
    fn test_binary_body_is_kept_byte_for_byte() {
        let body = [161u8, 255, 0, 128];
        let payload = ProofPayload::from_outcome(&outcome(&body));

        assert_eq!(payload.as_bytes(), &body);
        assert_eq!(payload.as_str(), None);
        assert!(matches!(
            payload.text(),
            Err(ChainpointError::ValidationFailure(_))
        ));
        assert_eq!(payload.into_bytes(), body.to_vec());
    }

    #[test]
    fn test_non_json_payload() {
        assert!(ProofPayload::new("binary-ish").to_json().is_err());
    }

    #[test]
    fn test_hash_record_validation() {
        assert_eq!(HashRecord::new("ABCDEF").unwrap().as_str(), "ABCDEF");
        assert_eq!(HashRecord::new("  abcdef\n").unwrap().as_str(), "abcdef");
        assert!(HashRecord::new("").is_err());
        assert!(HashRecord::new("abc").is_err());
        assert!(HashRecord::new("zz").is_err());
    }

    #[test]
    fn test_hash_record_from_content() {
        let record = HashRecord::from_content(b"hello");
        assert_eq!(
            record.as_str(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
