//! Scraping of Prometheus endpoints
//!
//! Fetches the text exposition format over HTTP and turns it into the
//! canonical series snapshot the reconciler consumes.

pub mod fetcher;
pub mod parser;
pub mod source;

pub use source::{HttpSource, MetricSource};
