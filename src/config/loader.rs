//! Configuration loader for the Chainpoint client
//! Layers defaults, an optional YAML/TOML file and `CHAINPOINT__*` environment variables

use ::config::{Config, Environment, File};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use super::ChainpointConfig;
use crate::error::{ChainpointError, Result};
use crate::transport::parse_http_url;

pub const ENV_PREFIX: &str = "CHAINPOINT";

impl ChainpointConfig {
    /// Load configuration from an optional file plus the environment, then validate it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading Chainpoint configuration from: {:?}", path);
            if !path.exists() {
                return Err(ChainpointError::ConfigError(format!(
                    "Configuration file not found: {:?}",
                    path
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("chainpoint_urls")
                .with_list_parse_key("nodes")
                .try_parsing(true),
        );

        let config: ChainpointConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            "Configuration loaded: {} catalog(s), {} seeded node(s), direct verification {}",
            config.chainpoint_urls.len(),
            config.nodes.len(),
            config.direct_verification
        );
        Ok(config)
    }

    /// Environment-only variant of [`ChainpointConfig::load`].
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_http()?;
        self.validate_discovery()?;
        self.validate_blockchains()?;
        Ok(())
    }

    fn validate_http(&self) -> Result<()> {
        if self.client_config.timeout == 0 {
            return Err(ChainpointError::ConfigError(
                "client_config.timeout must be greater than zero".to_string(),
            ));
        }

        if self.client_config.connect_timeout == 0 {
            return Err(ChainpointError::ConfigError(
                "client_config.connect_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_discovery(&self) -> Result<()> {
        if self.discover_node_count == 0 {
            return Err(ChainpointError::ConfigError(
                "discover_node_count must be at least 1".to_string(),
            ));
        }

        if self.chainpoint_urls.is_empty() && self.nodes.is_empty() {
            return Err(ChainpointError::ConfigError(
                "chainpoint_urls is empty and no nodes are seeded".to_string(),
            ));
        }

        for url in self.chainpoint_urls.iter().chain(self.nodes.iter()) {
            if parse_http_url(url).is_none() {
                return Err(ChainpointError::ConfigError(format!(
                    "Not an absolute http(s) URL: {}",
                    url
                )));
            }
        }

        if self.discovery_timeout == Some(0) {
            return Err(ChainpointError::ConfigError(
                "discovery_timeout must be greater than zero when set".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_blockchains(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for chain in &self.blockchain_config {
            if chain.name.trim().is_empty() {
                return Err(ChainpointError::ConfigError(
                    "blockchain_config entry without a name".to_string(),
                ));
            }
            if !seen.insert(chain.name.as_str()) {
                return Err(ChainpointError::ConfigError(format!(
                    "Duplicate blockchain_config entry: {}",
                    chain.name
                )));
            }
        }

        Ok(())
    }
}
