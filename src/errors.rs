use thiserror::Error;

/// Errors surfaced past the orchestration boundary.
///
/// Transport adapters recover locally and return empty results; the only
/// failure a caller sees per wallet is the balance fetch (a dashboard
/// section cannot render without it) and configuration problems.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")] Config(String),

    #[error("Invalid wallet address: {0}")] InvalidWallet(String),

    #[error("RPC error: {0}")] Rpc(String),

    #[error("Parse error: {0}")] Parse(String),

    #[error("HTTP error: {0}")] Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),
}
