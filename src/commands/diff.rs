use anyhow::{Context, Result};
use std::io;
use tracing::info;

use spod::config::Settings;
use spod::diff::run_diff;
use spod::scrape::HttpSource;

/// Execute the diff
///
/// Scrape failures abort before anything is printed.
pub async fn execute(settings: &Settings) -> Result<()> {
    let left = HttpSource::new(&settings.left, settings.timeout(), settings.retry_policy())
        .context("Invalid left endpoint")?;
    let right = HttpSource::new(&settings.right, settings.timeout(), settings.retry_policy())
        .context("Invalid right endpoint")?;

    info!(
        deviation = settings.deviation,
        max_name_length = settings.max_name_length,
        "Diffing endpoints"
    );

    let mut out = io::stdout();
    let summary = run_diff(&left, &right, &settings.diff_options(), &mut out).await?;

    info!(rows = summary.total(), "Diff complete");
    Ok(())
}
