//! Node Directory
//!
//! Owns the pool of verified node addresses. The pool is filled once, either
//! by discovery or by an explicit seed, and is never refreshed implicitly.
//! A caller that wants another attempt asks for it with `rediscover`.

use rand::seq::SliceRandom;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ChainpointConfig;
use crate::discovery::catalog::{parse_catalog, ProbeResult};
use crate::error::{ChainpointError, Result};
use crate::transport::Transport;

/// Base URI of one Chainpoint node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAddress(String);

impl NodeAddress {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeAddress {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl From<&str> for NodeAddress {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

/// Pool state. A finished discovery pass is never repeated implicitly.
#[derive(Debug)]
enum Pool {
    Undiscovered,
    /// Seeded, or the result of a finished pass (possibly empty).
    Ready(Vec<NodeAddress>),
    Failed(ChainpointError),
}

impl Pool {
    fn from_seed(addresses: Vec<NodeAddress>) -> Self {
        if addresses.is_empty() {
            Pool::Undiscovered
        } else {
            Pool::Ready(addresses)
        }
    }

    fn nodes(&self) -> &[NodeAddress] {
        match self {
            Pool::Ready(nodes) => nodes,
            _ => &[],
        }
    }
}

pub struct NodeDirectory {
    transport: Arc<Transport>,
    catalog_urls: Vec<String>,
    discover_limit: usize,
    deadline: Option<Duration>,
    /// Held for the whole discovery pass so concurrent callers share its outcome.
    pool: Mutex<Pool>,
}

impl NodeDirectory {
    /// Build a directory from configuration, pre-seeded with `config.nodes`.
    pub fn new(transport: Arc<Transport>, config: &ChainpointConfig) -> Self {
        let mut directory = Self::with_catalogs(
            transport,
            config.chainpoint_urls.clone(),
            config.discover_node_count,
        );
        directory.deadline = config.discovery_deadline();
        directory.pool = Mutex::new(Pool::from_seed(dedup(
            config.nodes.iter().map(|n| NodeAddress::from(n.as_str())),
        )));
        directory
    }

    pub fn with_catalogs(
        transport: Arc<Transport>,
        catalog_urls: Vec<String>,
        discover_limit: usize,
    ) -> Self {
        Self {
            transport,
            catalog_urls,
            discover_limit: discover_limit.max(1),
            deadline: None,
            pool: Mutex::new(Pool::Undiscovered),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run discovery unless a pass already finished, and return the pool.
    ///
    /// The outcome of the first pass, including an empty pool or an error, is
    /// returned to every later caller without further I/O. An empty result is
    /// not an error here; callers decide whether they can proceed without a node.
    pub async fn ensure_discovered(&self) -> Result<Vec<NodeAddress>> {
        let mut pool = self.pool.lock().await;
        match &*pool {
            Pool::Ready(nodes) => Ok(nodes.clone()),
            Pool::Failed(err) => Err(err.clone()),
            Pool::Undiscovered => self.run_pass(&mut pool).await,
        }
    }

    /// Discard the previous outcome and run a new discovery pass.
    pub async fn rediscover(&self) -> Result<Vec<NodeAddress>> {
        let mut pool = self.pool.lock().await;
        self.run_pass(&mut pool).await
    }

    async fn run_pass(&self, pool: &mut Pool) -> Result<Vec<NodeAddress>> {
        let outcome = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.discover())
                .await
                .unwrap_or_else(|_| {
                    Err(ChainpointError::BackendFailure(format!(
                        "Node discovery exceeded {} seconds",
                        deadline.as_secs()
                    )))
                }),
            None => self.discover().await,
        };

        *pool = match &outcome {
            Ok(nodes) => Pool::Ready(nodes.clone()),
            Err(err) => Pool::Failed(err.clone()),
        };
        outcome
    }

    /// Replace the pool with `addresses` when non-empty; an empty seed is ignored.
    pub async fn seed<I, A>(&self, addresses: I)
    where
        I: IntoIterator<Item = A>,
        A: Into<NodeAddress>,
    {
        let seeded = dedup(addresses.into_iter().map(Into::into));
        if seeded.is_empty() {
            return;
        }

        info!("Seeding node directory with {} node(s)", seeded.len());
        *self.pool.lock().await = Pool::Ready(seeded);
    }

    pub async fn current(&self) -> Vec<NodeAddress> {
        self.pool.lock().await.nodes().to_vec()
    }

    /// The node requests are sent to: the first address in the pool.
    pub async fn primary(&self) -> Option<NodeAddress> {
        self.pool.lock().await.nodes().first().cloned()
    }

    fn choose_catalog(&self) -> Result<&str> {
        self.catalog_urls
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .ok_or_else(|| {
                ChainpointError::ConfigError("No node catalog URLs configured".to_string())
            })
    }

    async fn discover(&self) -> Result<Vec<NodeAddress>> {
        let catalog_url = self.choose_catalog()?;
        info!("Discovering Chainpoint nodes from catalog {}", catalog_url);

        // Only the chosen catalog is tried; a failure here ends discovery.
        let outcome = self.transport.get(catalog_url).await.map_err(|e| {
            warn!("Node catalog {} unavailable: {}", catalog_url, e);
            ChainpointError::BackendFailure(format!(
                "Node catalog {} unavailable: {}",
                catalog_url, e
            ))
        })?;

        if outcome.status != StatusCode::OK {
            return Err(ChainpointError::BackendFailure(format!(
                "Node catalog {} returned status {}",
                catalog_url, outcome.status
            )));
        }

        let candidates = parse_catalog(&outcome.body)?;
        debug!("Catalog {} listed {} candidate(s)", catalog_url, candidates.len());

        let mut nodes: Vec<NodeAddress> = Vec::new();
        for candidate in candidates {
            let Some(address) = candidate.address() else {
                debug!(
                    "Skipping catalog entry without usable public_uri: {:?}",
                    candidate.public_uri
                );
                continue;
            };
            if nodes.contains(&address) {
                continue;
            }

            match self.probe(&address).await {
                ProbeResult::Healthy => {
                    debug!("Node {} is healthy", address);
                    nodes.push(address);
                    if nodes.len() >= self.discover_limit {
                        break;
                    }
                }
                ProbeResult::Unhealthy(reason) => {
                    warn!("Node {} failed health check: {}", address, reason);
                }
            }
        }

        info!(
            "Discovered {}/{} Chainpoint node(s)",
            nodes.len(),
            self.discover_limit
        );
        Ok(nodes)
    }

    async fn probe(&self, address: &NodeAddress) -> ProbeResult {
        match self.transport.get(address.as_str()).await {
            Ok(_) => ProbeResult::Healthy,
            Err(e) => ProbeResult::Unhealthy(e.to_string()),
        }
    }
}

fn dedup(addresses: impl Iterator<Item = NodeAddress>) -> Vec<NodeAddress> {
    let mut unique: Vec<NodeAddress> = Vec::new();
    for address in addresses {
        if !unique.contains(&address) {
            unique.push(address);
        }
    }
    unique
}
