//! Node catalog records and candidate probe results

use serde::Deserialize;

use crate::discovery::directory::NodeAddress;
use crate::error::{ChainpointError, Result};
use crate::transport::parse_http_url;

/// One record of a node catalog. Fields other than `public_uri` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub public_uri: Option<String>,
}

impl CatalogEntry {
    /// The candidate address, if the record carries a usable absolute http(s) URL.
    pub fn address(&self) -> Option<NodeAddress> {
        let raw = self.public_uri.as_deref()?;
        parse_http_url(raw)?;
        Some(NodeAddress::new(raw.trim()))
    }
}

/// Outcome of health-checking one candidate. Never propagated as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Healthy,
    Unhealthy(String),
}

impl ProbeResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeResult::Healthy)
    }
}

/// Parse a catalog body as an ordered JSON array of records.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<CatalogEntry>> {
    serde_json::from_slice(body).map_err(|e| {
        ChainpointError::BackendFailure(format!("Malformed node catalog: {}", e))
    })
}
