use reqwest::StatusCode;
use thiserror::Error;

/// Failure to obtain a series snapshot from one endpoint.
///
/// Any of these aborts the whole run before reconciliation starts.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Endpoint string could not be turned into a URL
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Transport-level failure (connect, timeout, body read)
    #[error("Failed to scrape {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Endpoint answered with a non-2xx status
    #[error("Failed to scrape {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// Payload is not valid text exposition format
    #[error("Failed to parse metrics from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    pub fn invalid_endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
