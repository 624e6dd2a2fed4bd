#![allow(dead_code)]

use async_trait::async_trait;
use chainpoint_client::config::HttpClientConfig;
use chainpoint_client::error::Result;
use chainpoint_client::{
    BlockchainConfig, ChainpointConfig, ProofPayload, Verifier, VerifierRegistry,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CATALOG_PATH: &str = "/nodes/random";

/// Config with short timeouts pointing at a single catalog URL
pub fn test_config(catalog_url: String, discover_node_count: usize) -> ChainpointConfig {
    ChainpointConfig {
        client_config: HttpClientConfig {
            timeout: 2,
            connect_timeout: 1,
        },
        discover_node_count,
        chainpoint_urls: vec![catalog_url],
        ..Default::default()
    }
}

pub fn catalog_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), CATALOG_PATH)
}

/// Serve a catalog listing `nodes` in order; expect exactly `hits` fetches
pub async fn mount_catalog(server: &MockServer, nodes: &[String], hits: u64) {
    let records: Vec<serde_json::Value> = nodes
        .iter()
        .map(|uri| json!({ "public_uri": uri, "node_status": "ok" }))
        .collect();

    Mock::given(method("GET"))
        .and(path(CATALOG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .expect(hits)
        .mount(server)
        .await;
}

/// A node answering its health check `health_hits` times
pub async fn healthy_node(health_hits: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(health_hits)
        .mount(&server)
        .await;
    server
}

/// A node whose health check always fails
pub async fn failing_node() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    server
}

/// Verifier with a fixed answer that counts constructions and calls
pub struct StaticVerifier {
    network: String,
    answer: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Verifier for StaticVerifier {
    fn network(&self) -> &str {
        &self.network
    }

    async fn verify_proof(&self, _proof: &ProofPayload) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// Registry with one static verifier per `(network, answer)`; the counter tracks constructions
pub fn static_registry(answers: &[(&str, bool)], built: Arc<AtomicUsize>) -> VerifierRegistry {
    let mut registry = VerifierRegistry::new();
    for (network, answer) in answers {
        let answer = *answer;
        let built = built.clone();
        registry.register(*network, move |config: &BlockchainConfig| {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StaticVerifier {
                network: config.name.clone(),
                answer,
                calls: Arc::new(AtomicUsize::new(0)),
            }) as Box<dyn Verifier>)
        });
    }
    registry
}

pub fn slow_response(delay_ms: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_delay(Duration::from_millis(delay_ms))
}
