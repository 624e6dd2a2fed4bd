use chainpoint_client::verification::{RemoteVerifier, VerificationMode};
use chainpoint_client::{
    AnchorClient, BlockchainConfig, ChainpointConfig, ChainpointError, ProofPayload,
    VerificationOutcome, VerifierRegistry,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

/// Direct-mode config for networks "A" and "B"; the catalog must stay untouched.
async fn direct_config() -> (ChainpointConfig, MockServer) {
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, &[], 0).await;

    let mut config = test_config(catalog_url(&catalog), 1);
    config.direct_verification = true;
    config.blockchain_config = vec![BlockchainConfig::new("A"), BlockchainConfig::new("B")];
    (config, catalog)
}

#[tokio::test]
async fn test_network_mode_posts_to_verify() {
    let node = MockServer::start().await;
    let response = json!([{"proof_index": 0, "status": "verified"}]);
    Mock::given(method("POST"))
        .and(path("/verify"))
        .and(body_json(json!({"proofs": ["eJyNlD1y"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .expect(1)
        .mount(&node)
        .await;
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, &[], 0).await;

    let built = Arc::new(AtomicUsize::new(0));
    let mut config = test_config(catalog_url(&catalog), 1);
    config.blockchain_config = vec![BlockchainConfig::new("A")];
    let registry = static_registry(&[("A", true)], built.clone());
    let client = AnchorClient::with_registry(&config, registry).unwrap();
    client.directory().seed([node.uri()]).await;

    assert_eq!(client.dispatcher().mode(), VerificationMode::Network);

    let outcome = client
        .verify_proof(&ProofPayload::new("eJyNlD1y"), &["A"])
        .await
        .unwrap();

    let payload = outcome.payload().unwrap();
    assert_eq!(payload.to_json().unwrap(), response);
    assert_eq!(outcome.is_verified(), None);
    assert_eq!(built.load(Ordering::SeqCst), 0, "network mode must not build verifiers");
}

#[tokio::test]
async fn test_network_mode_failure_is_validation_failure() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&node)
        .await;
    let catalog = MockServer::start().await;
    mount_catalog(&catalog, &[], 0).await;

    let client = AnchorClient::new(&test_config(catalog_url(&catalog), 1)).unwrap();
    client.directory().seed([node.uri()]).await;

    let empty: [&str; 0] = [];
    let result = client.verify_proof(&ProofPayload::new("proof"), &empty).await;
    assert!(matches!(result, Err(ChainpointError::ValidationFailure(_))));
}

#[tokio::test]
async fn test_direct_mode_all_networks_confirm() {
    let (config, _catalog) = direct_config().await;
    let built = Arc::new(AtomicUsize::new(0));
    let client = AnchorClient::with_registry(
        &config,
        static_registry(&[("A", true), ("B", true)], built.clone()),
    )
    .unwrap();

    let outcome = client
        .verify_proof(&ProofPayload::new("proof"), &["A", "B"])
        .await
        .unwrap();

    assert_eq!(outcome, VerificationOutcome::Direct(true));
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert!(client.directory().current().await.is_empty(), "direct mode must not discover nodes");
}

#[tokio::test]
async fn test_direct_mode_one_rejection_fails_all() {
    let (config, _catalog) = direct_config().await;
    let client = AnchorClient::with_registry(
        &config,
        static_registry(&[("A", true), ("B", false)], Arc::new(AtomicUsize::new(0))),
    )
    .unwrap();

    let outcome = client
        .verify_proof(&ProofPayload::new("proof"), &["A", "B"])
        .await
        .unwrap();

    assert_eq!(outcome.is_verified(), Some(false));
}

#[tokio::test]
async fn test_direct_mode_consults_only_requested_networks() {
    let (config, _catalog) = direct_config().await;
    let built = Arc::new(AtomicUsize::new(0));
    let client = AnchorClient::with_registry(
        &config,
        static_registry(&[("A", true), ("B", false)], built.clone()),
    )
    .unwrap();

    let outcome = client
        .verify_proof(&ProofPayload::new("proof"), &["A"])
        .await
        .unwrap();

    assert_eq!(outcome, VerificationOutcome::Direct(true));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_direct_mode_without_matching_network() {
    let (config, _catalog) = direct_config().await;
    let client = AnchorClient::with_registry(
        &config,
        static_registry(&[("A", true), ("B", true)], Arc::new(AtomicUsize::new(0))),
    )
    .unwrap();

    let result = client
        .verify_proof(&ProofPayload::new("proof"), &["litecoin"])
        .await;
    assert!(matches!(result, Err(ChainpointError::ValidationFailure(_))));
}

#[tokio::test]
async fn test_direct_mode_unregistered_verifier() {
    let (config, _catalog) = direct_config().await;
    let client = AnchorClient::with_registry(
        &config,
        static_registry(&[("A", true)], Arc::new(AtomicUsize::new(0))),
    )
    .unwrap();

    let result = client
        .verify_proof(&ProofPayload::new("proof"), &["A", "B"])
        .await;
    assert!(matches!(result, Err(ChainpointError::ValidationFailure(_))));
}

#[tokio::test]
async fn test_direct_mode_never_posts_verify() {
    let node = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&node)
        .await;

    let (config, _catalog) = direct_config().await;
    let client = AnchorClient::with_registry(
        &config,
        static_registry(&[("A", true), ("B", true)], Arc::new(AtomicUsize::new(0))),
    )
    .unwrap();
    client.directory().seed([node.uri()]).await;

    let outcome = client
        .verify_proof(&ProofPayload::new("proof"), &["A", "B"])
        .await
        .unwrap();
    assert_eq!(outcome, VerificationOutcome::Direct(true));
}

#[tokio::test]
async fn test_direct_mode_with_remote_verifiers() {
    let bitcoin = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": true})))
        .expect(1)
        .mount(&bitcoin)
        .await;
    let ethereum = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": false})))
        .expect(1)
        .mount(&ethereum)
        .await;

    let (mut config, _catalog) = direct_config().await;
    config.blockchain_config = vec![
        BlockchainConfig::new("bitcoin")
            .with_param("verifier_url", json!(format!("{}/check", bitcoin.uri()))),
        BlockchainConfig::new("ethereum")
            .with_param("verifier_url", json!(format!("{}/check", ethereum.uri()))),
    ];

    let transport = Arc::new(chainpoint_client::transport::Transport::new(&config).unwrap());
    let mut registry = VerifierRegistry::new();
    RemoteVerifier::register_all(&mut registry, &config.blockchain_config, transport);
    let client = AnchorClient::with_registry(&config, registry).unwrap();

    let outcome = client
        .verify_proof(&ProofPayload::new("proof"), &["bitcoin", "ethereum"])
        .await
        .unwrap();
    assert_eq!(outcome, VerificationOutcome::Direct(false));
}

#[tokio::test]
async fn test_remote_verifier_failure_is_validation_failure() {
    let broken = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    let (mut config, _catalog) = direct_config().await;
    config.blockchain_config = vec![BlockchainConfig::new("bitcoin")
        .with_param("verifier_url", json!(format!("{}/check", broken.uri())))];

    let transport = Arc::new(chainpoint_client::transport::Transport::new(&config).unwrap());
    let mut registry = VerifierRegistry::new();
    RemoteVerifier::register_all(&mut registry, &config.blockchain_config, transport);
    let client = AnchorClient::with_registry(&config, registry).unwrap();

    let result = client
        .verify_proof(&ProofPayload::new("proof"), &["bitcoin"])
        .await;
    assert!(matches!(result, Err(ChainpointError::ValidationFailure(_))));
}
