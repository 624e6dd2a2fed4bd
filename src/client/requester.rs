//! Requests against the discovered node
//!
//! Every failure below this point is logged and translated into a
//! `ValidationFailure` before it reaches a caller.

use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, error};

use crate::discovery::NodeDirectory;
use crate::error::{ChainpointError, Result};
use crate::transport::{Payload, RequestOutcome, Target, Transport};

#[derive(Clone)]
pub struct NodeRequester {
    directory: Arc<NodeDirectory>,
    transport: Arc<Transport>,
}

impl NodeRequester {
    pub fn new(directory: Arc<NodeDirectory>, transport: Arc<Transport>) -> Self {
        Self {
            directory,
            transport,
        }
    }

    pub fn directory(&self) -> &Arc<NodeDirectory> {
        &self.directory
    }

    /// Send `method` to `segments` under the primary node, discovering nodes
    /// first if needed.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        payload: Option<&Payload>,
    ) -> Result<RequestOutcome> {
        let nodes = self.directory.ensure_discovered().await.map_err(|e| {
            error!("Chainpoint node discovery failed: {}", e);
            ChainpointError::ValidationFailure("Chainpoint node discovery failed".to_string())
        })?;

        let base = nodes.first().ok_or_else(ChainpointError::no_nodes_discovered)?;
        debug!("Sending {} /{} to node {}", method, segments.join("/"), base);

        let target = Target::Node {
            base: base.as_str(),
            segments,
        };
        self.transport
            .send(method, target, payload)
            .await
            .map_err(|e| {
                error!("Request to Chainpoint node {} failed: {}", base, e);
                ChainpointError::upstream_problem()
            })
    }
}
