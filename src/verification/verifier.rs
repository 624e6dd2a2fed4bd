//! Per-network verifier capability and the registry that builds verifiers by name

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::ProofPayload;
use crate::config::BlockchainConfig;
use crate::error::{ChainpointError, Result};

/// Checks a proof directly against one blockchain.
#[async_trait]
pub trait Verifier: Send + Sync {
    fn network(&self) -> &str;

    async fn verify_proof(&self, proof: &ProofPayload) -> Result<bool>;
}

pub type VerifierFactory =
    Arc<dyn Fn(&BlockchainConfig) -> Result<Box<dyn Verifier>> + Send + Sync>;

/// Maps a network name to the constructor of its verifier.
#[derive(Clone, Default)]
pub struct VerifierRegistry {
    factories: HashMap<String, VerifierFactory>,
}

impl VerifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, network: impl Into<String>, factory: F)
    where
        F: Fn(&BlockchainConfig) -> Result<Box<dyn Verifier>> + Send + Sync + 'static,
    {
        self.factories.insert(network.into(), Arc::new(factory));
    }

    pub fn with<F>(mut self, network: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&BlockchainConfig) -> Result<Box<dyn Verifier>> + Send + Sync + 'static,
    {
        self.register(network, factory);
        self
    }

    pub fn contains(&self, network: &str) -> bool {
        self.factories.contains_key(network)
    }

    pub fn networks(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the verifier for `config.name`.
    pub fn build(&self, config: &BlockchainConfig) -> Result<Box<dyn Verifier>> {
        let factory = self
            .factories
            .get(&config.name)
            .ok_or_else(|| ChainpointError::unknown_network(&config.name))?;
        factory(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVerifier {
        network: String,
        answer: bool,
    }

    #[async_trait]
    impl Verifier for FixedVerifier {
        fn network(&self) -> &str {
            &self.network
        }

        async fn verify_proof(&self, _proof: &ProofPayload) -> Result<bool> {
            Ok(self.answer)
        }
    }

    #[tokio::test]
    async fn test_registry_builds_by_name() {
        let registry = VerifierRegistry::new().with("bitcoin", |config: &BlockchainConfig| {
            Ok(Box::new(FixedVerifier {
                network: config.name.clone(),
                answer: true,
            }) as Box<dyn Verifier>)
        });

        assert!(registry.contains("bitcoin"));
        assert_eq!(registry.networks(), vec!["bitcoin"]);

        let verifier = registry.build(&BlockchainConfig::new("bitcoin")).unwrap();
        assert_eq!(verifier.network(), "bitcoin");
        assert!(verifier.verify_proof(&ProofPayload::new("p")).await.unwrap());
    }

    #[test]
    fn test_unknown_network() {
        let registry = VerifierRegistry::new();
        let result = registry.build(&BlockchainConfig::new("ethereum"));
        assert!(matches!(result, Err(ChainpointError::ValidationFailure(_))));
    }
}
