//! Proof Verification
//!
//! Network-hosted verification and direct per-blockchain verification.

pub mod dispatcher;
pub mod remote;
pub mod verifier;

pub use dispatcher::{VerificationDispatcher, VerificationMode, VerificationOutcome};
pub use remote::RemoteVerifier;
pub use verifier::{Verifier, VerifierFactory, VerifierRegistry};
