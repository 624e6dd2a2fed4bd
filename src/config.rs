pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Public node catalogs; discovery picks one of these at random.
pub const DEFAULT_CATALOG_URLS: [&str; 3] = [
    "https://a.chainpoint.org/nodes/random",
    "https://b.chainpoint.org/nodes/random",
    "https://c.chainpoint.org/nodes/random",
];

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DISCOVER_NODE_COUNT: usize = 1;

/// Per-request HTTP limits, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub timeout: u64,
    pub connect_timeout: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// One blockchain a direct verifier can be built for.
///
/// Everything besides `name` is connection detail owned by the verifier
/// implementation and is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainConfig {
    pub name: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl BlockchainConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainpointConfig {
    pub client_config: HttpClientConfig,
    pub discover_node_count: usize,
    pub chainpoint_urls: Vec<String>,
    /// Known-good nodes; when non-empty, discovery is skipped.
    pub nodes: Vec<String>,
    /// Overall bound on one discovery pass, in seconds. Unbounded when unset.
    pub discovery_timeout: Option<u64>,
    pub direct_verification: bool,
    pub blockchain_config: Vec<BlockchainConfig>,
}

impl Default for ChainpointConfig {
    fn default() -> Self {
        Self {
            client_config: HttpClientConfig::default(),
            discover_node_count: DEFAULT_DISCOVER_NODE_COUNT,
            chainpoint_urls: DEFAULT_CATALOG_URLS.iter().map(|s| s.to_string()).collect(),
            nodes: Vec::new(),
            discovery_timeout: None,
            direct_verification: false,
            blockchain_config: Vec::new(),
        }
    }
}

impl ChainpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.client_config.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.client_config.connect_timeout)
    }

    pub fn discovery_deadline(&self) -> Option<Duration> {
        self.discovery_timeout.map(Duration::from_secs)
    }

    pub fn blockchain(&self, name: &str) -> Option<&BlockchainConfig> {
        self.blockchain_config.iter().find(|b| b.name == name)
    }
}
