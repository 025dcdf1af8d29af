use thiserror::Error;

/// Failures of a single repository fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The identity does not exist (HTTP 404).
    #[error("identity not found")]
    NotFound,
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status other than 404.
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16 },
    /// The body was not a list of repositories.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search controller needs a Tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} is not a number of milliseconds")]
    InvalidNumber { key: &'static str, value: String },
}
