use thiserror::Error;

impl From<serde_json::Error> for ChainpointError {
    fn from(err: serde_json::Error) -> Self {
        Self::BackendFailure(format!("JSON serialization error: {}", err))
    }
}

impl From<::config::ConfigError> for ChainpointError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::ConfigError(format!("Failed to load configuration: {}", err))
    }
}

#[derive(Error, Debug, Clone)]
pub enum ChainpointError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Transport-level failure: I/O, timeout, redirect or non-success status.
    #[error("Network error: {0}")]
    NetworkFailure(String),

    /// A trusted backend step (the node catalog) answered with something unusable.
    #[error("Backend error: {0}")]
    BackendFailure(String),

    /// The only kind surfaced to callers of the request operations.
    #[error("Validation error: {0}")]
    ValidationFailure(String),
}

pub type Result<T> = std::result::Result<T, ChainpointError>;

impl ChainpointError {
    pub fn no_nodes_discovered() -> Self {
        Self::ValidationFailure("No Chainpoint nodes discovered".to_string())
    }

    pub fn upstream_problem() -> Self {
        Self::ValidationFailure("Upstream Chainpoint network problem".to_string())
    }

    pub fn invalid_hash(hash: &str) -> Self {
        Self::ValidationFailure(format!(
            "Invalid hash '{}': expected non-empty even-length hex",
            hash
        ))
    }

    pub fn unknown_network(name: &str) -> Self {
        Self::ValidationFailure(format!("No verifier registered for network: {}", name))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailure(_))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::BackendFailure(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }
}
