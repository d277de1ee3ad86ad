//! Scrape, reconcile, render

use anyhow::{Context, Result};
use std::io::Write;

use crate::diff::reconcile::{reconcile, Summary};
use crate::diff::render::{render, RenderOptions};
use crate::scrape::MetricSource;

/// Parameters of one diff run
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Inclusive minimum of `|right| - |left|` for matched series
    pub deviation: f64,
    pub render: RenderOptions,
}

/// Snapshot both sources, reconcile them and write the result rows to `out`
///
/// Both scrapes run concurrently. If either fails, nothing is written.
pub async fn run_diff<W: Write>(
    left: &dyn MetricSource,
    right: &dyn MetricSource,
    options: &DiffOptions,
    out: &mut W,
) -> Result<Summary> {
    let (left_series, right_series) = tokio::try_join!(
        async {
            left.scrape()
                .await
                .with_context(|| format!("Left endpoint {} could not be scraped", left.describe()))
        },
        async {
            right
                .scrape()
                .await
                .with_context(|| format!("Right endpoint {} could not be scraped", right.describe()))
        },
    )?;

    tracing::info!(
        left = %left.describe(),
        left_series = left_series.len(),
        right = %right.describe(),
        right_series = right_series.len(),
        "Scraped both endpoints"
    );

    let results = reconcile(&left_series, &right_series, options.deviation);
    let summary = Summary::of(&results);

    tracing::info!(
        left_only = summary.left_only,
        right_only = summary.right_only,
        deviated = summary.deviated,
        threshold = options.deviation,
        "Reconciled series"
    );

    render(&results, &options.render, out).context("Failed to write diff output")?;

    Ok(summary)
}
