//! Scalar sample extraction
//!
//! Only counters and gauges carry a single comparable value. Everything
//! else is tagged [`SampleValue::Unsupported`] instead of failing the scrape.

use prometheus_parse::Value;
use std::collections::btree_map::{BTreeMap, Entry};

/// Value of one series in a snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Supported(f64),
    /// Histogram, summary or untyped series
    Unsupported,
}

impl SampleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Supported(v) => Some(*v),
            Self::Unsupported => None,
        }
    }
}

/// Canonical series key -> value, one per endpoint
pub type SeriesMap = BTreeMap<String, SampleValue>;

/// Read the scalar value of a counter or gauge sample
pub fn extract_value(value: &Value) -> SampleValue {
    match value {
        Value::Counter(v) | Value::Gauge(v) => SampleValue::Supported(*v),
        _ => SampleValue::Unsupported,
    }
}

/// Insert a series, last write wins
///
/// Returns the overwritten value when the key was already present.
pub fn insert_series(map: &mut SeriesMap, key: String, value: SampleValue) -> Option<SampleValue> {
    match map.entry(key) {
        Entry::Occupied(mut slot) => {
            tracing::debug!(
                series = %slot.key(),
                previous = ?slot.get(),
                current = ?value,
                "Duplicate series key, keeping last value"
            );
            Some(slot.insert(value))
        }
        Entry::Vacant(slot) => {
            slot.insert(value);
            None
        }
    }
}
