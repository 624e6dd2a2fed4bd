//! Verification Dispatcher
//!
//! Routes proof verification either to the node's `/verify` endpoint or to
//! direct per-blockchain verifiers. Direct results are combined with a strict
//! AND: one `false` fails the whole verification.

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::client::{NodeRequester, ProofPayload};
use crate::config::{BlockchainConfig, ChainpointConfig};
use crate::error::{ChainpointError, Result};
use crate::transport::Payload;
use crate::verification::verifier::VerifierRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    /// POST to the discovered node's `/verify` endpoint.
    Network,
    /// Ask per-blockchain verifiers.
    Direct,
}

impl VerificationMode {
    pub fn from_config(config: &ChainpointConfig) -> Self {
        if config.direct_verification {
            VerificationMode::Direct
        } else {
            VerificationMode::Network
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Raw `/verify` response.
    Network(ProofPayload),
    /// AND of every consulted verifier.
    Direct(bool),
}

impl VerificationOutcome {
    pub fn payload(&self) -> Option<&ProofPayload> {
        match self {
            VerificationOutcome::Network(payload) => Some(payload),
            VerificationOutcome::Direct(_) => None,
        }
    }

    pub fn is_verified(&self) -> Option<bool> {
        match self {
            VerificationOutcome::Network(_) => None,
            VerificationOutcome::Direct(verified) => Some(*verified),
        }
    }
}

pub struct VerificationDispatcher {
    mode: VerificationMode,
    blockchains: Vec<BlockchainConfig>,
    registry: VerifierRegistry,
    requester: NodeRequester,
}

impl VerificationDispatcher {
    pub fn new(
        config: &ChainpointConfig,
        registry: VerifierRegistry,
        requester: NodeRequester,
    ) -> Self {
        Self {
            mode: VerificationMode::from_config(config),
            blockchains: config.blockchain_config.clone(),
            registry,
            requester,
        }
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    pub async fn verify<S: AsRef<str>>(
        &self,
        proof: &ProofPayload,
        networks: &[S],
    ) -> Result<VerificationOutcome> {
        match self.mode {
            VerificationMode::Network => self
                .verify_on_network(proof)
                .await
                .map(VerificationOutcome::Network),
            VerificationMode::Direct => self
                .verify_direct(proof, networks)
                .await
                .map(VerificationOutcome::Direct),
        }
    }

    async fn verify_on_network(&self, proof: &ProofPayload) -> Result<ProofPayload> {
        let body = Payload::Json(json!({ "proofs": [proof.text()?] }));
        let outcome = self
            .requester
            .request(Method::POST, &["verify"], Some(&body))
            .await?;
        Ok(ProofPayload::from_outcome(&outcome))
    }

    /// Consult every configured blockchain named in `networks`.
    pub async fn verify_direct<S: AsRef<str>>(
        &self,
        proof: &ProofPayload,
        networks: &[S],
    ) -> Result<bool> {
        let consulted: Vec<&BlockchainConfig> = self
            .blockchains
            .iter()
            .filter(|chain| networks.iter().any(|n| n.as_ref() == chain.name))
            .collect();

        if consulted.is_empty() {
            return Err(ChainpointError::ValidationFailure(
                "None of the requested networks has a blockchain configuration".to_string(),
            ));
        }

        for chain in consulted {
            let verifier = self
                .registry
                .build(chain)
                .map_err(|e| as_validation_failure(&chain.name, e))?;
            let verified = verifier
                .verify_proof(proof)
                .await
                .map_err(|e| as_validation_failure(&chain.name, e))?;

            if !verified {
                info!("Proof rejected by {}", chain.name);
                return Ok(false);
            }
            debug!("Proof confirmed by {}", chain.name);
        }

        Ok(true)
    }
}

fn as_validation_failure(network: &str, err: ChainpointError) -> ChainpointError {
    if err.is_validation() {
        return err;
    }
    warn!("Verifier for {} failed: {}", network, err);
    ChainpointError::ValidationFailure(format!("Direct verification on {} failed", network))
}
