use thiserror::Error;

/// Run-level failures. Anything surfacing as `AnalyzerError` from
/// `report::build_report` aborts the run.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    #[error("Failed to resolve ENS name: {0}")]
    EnsResolution(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the block-explorer and balance-indexer REST calls.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error: {message} (status: {status})")]
    Api { status: String, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ExplorerError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ExplorerError::RateLimited(_) => true,
            ExplorerError::Http(e) => e.status().map(|s| s.as_u16() == 429).unwrap_or(false),
            _ => false,
        }
    }
}
