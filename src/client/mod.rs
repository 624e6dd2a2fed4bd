//! Chainpoint Anchor Client
//!
//! Public operations of the crate: submit hashes, fetch proofs and verify
//! proofs. Node discovery happens lazily on the first request.

pub mod requester;
pub mod types;

pub use requester::NodeRequester;
pub use types::{HashRecord, ProofPayload, EMPTY_PROOF_SENTINEL};

use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::config::ChainpointConfig;
use crate::discovery::NodeDirectory;
use crate::error::{ChainpointError, Result};
use crate::transport::{Payload, Transport};
use crate::verification::{VerificationDispatcher, VerificationOutcome, VerifierRegistry};

pub struct AnchorClient {
    requester: NodeRequester,
    dispatcher: VerificationDispatcher,
}

impl AnchorClient {
    /// Client with no direct verifiers registered.
    pub fn new(config: &ChainpointConfig) -> Result<Self> {
        Self::with_registry(config, VerifierRegistry::new())
    }

    pub fn with_registry(config: &ChainpointConfig, registry: VerifierRegistry) -> Result<Self> {
        config.validate()?;

        let transport = Arc::new(Transport::new(config)?);
        let directory = Arc::new(NodeDirectory::new(transport.clone(), config));
        Ok(Self::from_parts(
            NodeRequester::new(directory, transport),
            config,
            registry,
        ))
    }

    pub fn from_parts(
        requester: NodeRequester,
        config: &ChainpointConfig,
        registry: VerifierRegistry,
    ) -> Self {
        let dispatcher = VerificationDispatcher::new(config, registry, requester.clone());
        Self {
            requester,
            dispatcher,
        }
    }

    pub fn directory(&self) -> &Arc<NodeDirectory> {
        self.requester.directory()
    }

    pub fn dispatcher(&self) -> &VerificationDispatcher {
        &self.dispatcher
    }

    /// Fetch the proof for one hash id.
    pub async fn get_proof(&self, id: &str) -> Result<ProofPayload> {
        let id = id.trim();
        if id.is_empty() || id == "." || id == ".." {
            return Err(ChainpointError::ValidationFailure(format!(
                "Invalid proof id: '{}'",
                id
            )));
        }

        let outcome = self
            .requester
            .request(Method::GET, &["proofs", id], None)
            .await?;
        Ok(ProofPayload::from_outcome(&outcome))
    }

    /// Fetch proofs for several hash ids in one request.
    pub async fn get_proofs<S: AsRef<str>>(&self, ids: &[S]) -> Result<ProofPayload> {
        let ids: Vec<&str> = ids
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(ChainpointError::ValidationFailure(
                "At least one proof id is required".to_string(),
            ));
        }

        let query = Payload::Query(ids.join(","));
        let outcome = self
            .requester
            .request(Method::GET, &["proofs"], Some(&query))
            .await?;
        Ok(ProofPayload::from_outcome(&outcome))
    }

    /// Submit a batch of hex hashes for anchoring and return the node's receipt.
    pub async fn write_hash<S: AsRef<str>>(&self, hashes: &[S]) -> Result<ProofPayload> {
        if hashes.is_empty() {
            return Err(ChainpointError::ValidationFailure(
                "At least one hash is required".to_string(),
            ));
        }

        let records = hashes
            .iter()
            .map(|h| HashRecord::new(h.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.write_records(&records).await
    }

    /// Hash `data` with SHA-256 and submit the digest.
    pub async fn write_content(&self, data: &[u8]) -> Result<ProofPayload> {
        self.write_records(&[HashRecord::from_content(data)]).await
    }

    async fn write_records(&self, records: &[HashRecord]) -> Result<ProofPayload> {
        info!("Submitting {} hash(es) for anchoring", records.len());

        let body = Payload::Json(json!({ "hashes": records }));
        let outcome = self
            .requester
            .request(Method::POST, &["hashes"], Some(&body))
            .await?;
        Ok(ProofPayload::from_outcome(&outcome))
    }

    /// Verify a proof on the network or directly against `networks`,
    /// depending on the configured mode.
    pub async fn verify_proof<S: AsRef<str>>(
        &self,
        proof: &ProofPayload,
        networks: &[S],
    ) -> Result<VerificationOutcome> {
        self.dispatcher.verify(proof, networks).await
    }
}
