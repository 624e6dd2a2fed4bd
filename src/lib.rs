pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod transport;
pub mod verification;

pub use client::{AnchorClient, HashRecord, ProofPayload};
pub use config::{BlockchainConfig, ChainpointConfig};
pub use discovery::{NodeAddress, NodeDirectory};
pub use error::ChainpointError;
pub use verification::{VerificationOutcome, Verifier, VerifierRegistry};
