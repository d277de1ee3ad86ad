//! Metric sources feeding the reconciler

use async_trait::async_trait;
use std::time::Duration;

use crate::diff::sample::SeriesMap;
use crate::error::ScrapeError;
use crate::retry::{with_retries, RetryPolicy};
use crate::scrape::fetcher::MetricsFetcher;
use crate::scrape::parser::parse_series;

/// Anything that can produce one point-in-time series snapshot
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Human-readable origin, used in log lines
    fn describe(&self) -> String;

    /// Take a snapshot
    async fn scrape(&self) -> Result<SeriesMap, ScrapeError>;
}

/// Scrapes a Prometheus text endpoint over HTTP
pub struct HttpSource {
    fetcher: MetricsFetcher,
    retry: RetryPolicy,
}

impl HttpSource {
    pub fn new(endpoint: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher: MetricsFetcher::new(endpoint, timeout)?,
            retry,
        })
    }
}

#[async_trait]
impl MetricSource for HttpSource {
    fn describe(&self) -> String {
        self.fetcher.url().to_string()
    }

    async fn scrape(&self) -> Result<SeriesMap, ScrapeError> {
        let url = self.describe();

        let text = with_retries(&self.retry, &url, || self.fetcher.fetch()).await?;
        let series = parse_series(&text).map_err(|source| ScrapeError::Parse {
            url: url.clone(),
            source,
        })?;

        tracing::debug!(endpoint = %url, series = series.len(), bytes = text.len(), "Scraped endpoint");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_describes_normalized_url() {
        let source = HttpSource::new(":9100", Duration::from_secs(1), RetryPolicy::default()).unwrap();
        assert_eq!(source.describe(), "http://localhost:9100/metrics");
    }

    #[test]
    fn test_http_source_rejects_invalid_endpoint() {
        let result = HttpSource::new("", Duration::from_secs(1), RetryPolicy::default());
        assert!(matches!(result, Err(ScrapeError::InvalidEndpoint { .. })));
    }
}
