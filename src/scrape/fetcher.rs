//! Metrics fetcher for retrieving Prometheus metrics from an HTTP endpoint

use reqwest::{header, Client};
use std::time::Duration;
use url::Url;

use crate::error::ScrapeError;

/// Requested exposition format. Protobuf is never negotiated.
const TEXT_EXPOSITION: &str = "text/plain;version=0.0.4;q=1.0,*/*;q=0.1";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PATH: &str = "/metrics";

/// HTTP client wrapper for fetching metrics
pub struct MetricsFetcher {
    client: Client,
    url: Url,
}

impl MetricsFetcher {
    /// Create a new metrics fetcher
    ///
    /// # Arguments
    /// * `endpoint` - Anything [`normalize_endpoint`] accepts (e.g. ":9100", "host:9100/metrics")
    /// * `timeout` - Whole-request timeout
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        let url = normalize_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spod/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScrapeError::Request {
                url: url.to_string(),
                source: e,
            })?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch metrics from the endpoint
    ///
    /// # Returns
    /// Raw Prometheus text format as a String
    ///
    /// # Errors
    /// Returns an error if:
    /// - Network request fails or times out
    /// - Response status is not successful (2xx)
    /// - Response body cannot be read as text
    pub async fn fetch(&self) -> Result<String, ScrapeError> {
        let url = self.url.to_string();

        let response = self
            .client
            .get(self.url.clone())
            .header(header::ACCEPT, TEXT_EXPOSITION)
            .send()
            .await
            .map_err(|e| ScrapeError::Request {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status { url, status });
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::Request { url, source: e })
    }
}

/// Turn a loosely written endpoint into a full scrape URL
///
/// - missing scheme defaults to `http`
/// - missing host (":9100") defaults to `localhost`
/// - empty path defaults to `/metrics`
pub fn normalize_endpoint(endpoint: &str) -> Result<Url, ScrapeError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::invalid_endpoint(endpoint, "empty endpoint"));
    }

    let with_host = if trimmed.starts_with(':') {
        format!("{}{}", DEFAULT_HOST, trimmed)
    } else {
        trimmed.to_string()
    };

    let with_scheme = if with_host.contains("://") {
        with_host
    } else {
        format!("http://{}", with_host)
    };

    let mut url =
        Url::parse(&with_scheme).map_err(|e| ScrapeError::invalid_endpoint(endpoint, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScrapeError::invalid_endpoint(
            endpoint,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ScrapeError::invalid_endpoint(endpoint, "missing host"));
    }
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(DEFAULT_PATH);
    }

    Ok(url)
}
