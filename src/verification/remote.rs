//! HTTP-backed verifier
//!
//! Delegates the per-chain check to a service named in the blockchain's
//! configuration (`verifier_url`). The service receives `{"proof": ...}` and
//! answers `{"verified": bool}`.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::client::ProofPayload;
use crate::config::BlockchainConfig;
use crate::error::{ChainpointError, Result};
use crate::transport::{parse_http_url, Payload, Target, Transport};
use crate::verification::verifier::{Verifier, VerifierRegistry};

pub const VERIFIER_URL_PARAM: &str = "verifier_url";

#[derive(Debug, Deserialize)]
struct VerifierResponse {
    verified: bool,
}

pub struct RemoteVerifier {
    network: String,
    url: String,
    transport: Arc<Transport>,
}

impl RemoteVerifier {
    pub fn from_config(config: &BlockchainConfig, transport: Arc<Transport>) -> Result<Self> {
        let url = config
            .param_str(VERIFIER_URL_PARAM)
            .filter(|url| parse_http_url(url).is_some())
            .ok_or_else(|| {
                ChainpointError::ConfigError(format!(
                    "Blockchain {} has no valid {}",
                    config.name, VERIFIER_URL_PARAM
                ))
            })?;

        Ok(Self {
            network: config.name.clone(),
            url: url.to_string(),
            transport,
        })
    }

    /// Register a `RemoteVerifier` factory for every entry that names a `verifier_url`.
    pub fn register_all(
        registry: &mut VerifierRegistry,
        blockchains: &[BlockchainConfig],
        transport: Arc<Transport>,
    ) {
        for chain in blockchains {
            if chain.param_str(VERIFIER_URL_PARAM).is_none() {
                continue;
            }
            let transport = transport.clone();
            registry.register(chain.name.clone(), move |config: &BlockchainConfig| {
                Ok(Box::new(RemoteVerifier::from_config(config, transport.clone())?)
                    as Box<dyn Verifier>)
            });
        }
    }
}

#[async_trait]
impl Verifier for RemoteVerifier {
    fn network(&self) -> &str {
        &self.network
    }

    async fn verify_proof(&self, proof: &ProofPayload) -> Result<bool> {
        debug!("Verifying proof on {} via {}", self.network, self.url);

        let body = Payload::Json(json!({ "proof": proof.text()? }));
        let outcome = self
            .transport
            .send(Method::POST, Target::Absolute(&self.url), Some(&body))
            .await?;
        let response: VerifierResponse = outcome.json()?;
        Ok(response.verified)
    }
}
