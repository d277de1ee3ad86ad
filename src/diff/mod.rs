//! Series diffing
//!
//! Canonicalizes series keys, extracts comparable values, reconciles two
//! snapshots and renders the outcome.

pub mod labels;
pub mod reconcile;
pub mod render;
pub mod run;
pub mod sample;

// Re-export commonly used types
pub use reconcile::{reconcile, Reconciled, Relation, Summary};
pub use render::{ColorChoice, OutputFormat, RenderOptions};
pub use run::{run_diff, DiffOptions};
pub use sample::{SampleValue, SeriesMap};
