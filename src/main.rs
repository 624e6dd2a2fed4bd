use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chainpoint_client::client::NodeRequester;
use chainpoint_client::discovery::NodeDirectory;
use chainpoint_client::transport::Transport;
use chainpoint_client::verification::RemoteVerifier;
use chainpoint_client::{
    AnchorClient, ChainpointConfig, ProofPayload, VerificationOutcome, VerifierRegistry,
};

#[derive(Parser)]
#[command(name = "chainpoint")]
#[command(about = "Anchor hashes on the Chainpoint network and verify their proofs")]
struct Cli {
    /// YAML or TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use this node instead of discovering one (repeatable)
    #[arg(long = "node", global = true)]
    nodes: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover nodes and print the pool
    Nodes,
    /// Submit hashes for anchoring
    Submit {
        /// Hex-encoded hashes
        hashes: Vec<String>,
        /// Hash this file with SHA-256 and submit the digest
        #[arg(short, long, conflicts_with = "hashes")]
        file: Option<PathBuf>,
    },
    /// Fetch the proof for one hash id
    Proof { id: String },
    /// Fetch proofs for several hash ids
    Proofs {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Verify a proof
    Verify {
        /// Proof string, or @path to read it from a file
        proof: String,
        /// Blockchain to verify against in direct mode (repeatable)
        #[arg(long = "network")]
        networks: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chainpoint_client=info,chainpoint=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ChainpointConfig::load(cli.config.as_deref())?;
    if !cli.nodes.is_empty() {
        config.nodes = cli.nodes.clone();
        config.validate()?;
    }

    let transport = Arc::new(Transport::new(&config)?);
    let directory = Arc::new(NodeDirectory::new(transport.clone(), &config));
    let mut registry = VerifierRegistry::new();
    RemoteVerifier::register_all(&mut registry, &config.blockchain_config, transport.clone());
    let client =
        AnchorClient::from_parts(NodeRequester::new(directory, transport), &config, registry);

    let output = match cli.command {
        Commands::Nodes => {
            let nodes = client.directory().ensure_discovered().await?;
            if nodes.is_empty() {
                return Err(anyhow!("No Chainpoint nodes discovered"));
            }
            json!({ "nodes": nodes })
        }
        Commands::Submit { hashes, file } => {
            let receipt = match file {
                Some(path) => {
                    let data = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    client.write_content(&data).await?
                }
                None => client.write_hash(&hashes).await?,
            };
            payload_json(&receipt)
        }
        Commands::Proof { id } => payload_json(&client.get_proof(&id).await?),
        Commands::Proofs { ids } => payload_json(&client.get_proofs(&ids).await?),
        Commands::Verify { proof, networks } => {
            let proof = read_proof(&proof)?;
            if config.direct_verification {
                for network in networks.iter().filter(|n| config.blockchain(n).is_none()) {
                    warn!("No blockchain_config entry for {}, it will be skipped", network);
                }
            }
            match client.verify_proof(&proof, &networks).await? {
                VerificationOutcome::Network(payload) => payload_json(&payload),
                VerificationOutcome::Direct(verified) => {
                    info!("Direct verification across {:?}: {}", networks, verified);
                    json!({ "verified": verified, "networks": networks })
                }
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Parsed JSON when the payload is JSON, the raw text when it is UTF-8,
/// otherwise the bytes hex encoded.
fn payload_json(payload: &ProofPayload) -> serde_json::Value {
    if let Ok(value) = payload.to_json() {
        return value;
    }
    match payload.as_str() {
        Some(text) => json!(text),
        None => json!({ "hex": hex::encode(payload.as_bytes()) }),
    }
}

fn read_proof(arg: &str) -> Result<ProofPayload> {
    match arg.strip_prefix('@') {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read proof file {}", path))?;
            Ok(ProofPayload::new(raw.trim()))
        }
        None => Ok(ProofPayload::new(arg)),
    }
}
