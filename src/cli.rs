use clap::Parser;
use std::path::PathBuf;

use spod::config::{Overrides, DEFAULT_CONFIG_FILE};
use spod::diff::{ColorChoice, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "spod",
    version,
    about = "Diff the metrics of two Prometheus endpoints",
    long_about = "Scrapes two Prometheus endpoints once and lists series that exist on only one \
                  side, or whose magnitude grew from left to right by at least --deviation."
)]
pub struct Cli {
    /// Configuration file path (optional, missing file is ignored)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// First (left) endpoint to scrape [default: http://localhost:9100/metrics]
    #[arg(short, long, visible_alias = "first")]
    pub left: Option<String>,

    /// Second (right) endpoint to scrape [default: http://localhost:9100/metrics]
    #[arg(short, long, visible_alias = "second")]
    pub right: Option<String>,

    /// Report matched series only when |right| - |left| >= DEVIATION [default: 0]
    #[arg(short, long, allow_negative_numbers = true)]
    pub deviation: Option<f64>,

    /// Truncate series names to this many characters, 0 = never [default: 0]
    #[arg(short = 'n', long, visible_alias = "len")]
    pub max_name_length: Option<usize>,

    /// Per-scrape timeout in seconds [default: 10]
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Extra attempts for connection errors, timeouts and 5xx [default: 0]
    #[arg(long)]
    pub retries: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// When to highlight rows
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,
}

impl Cli {
    /// Flags given on the command line, layered over file and environment
    pub fn overrides(&self) -> Overrides {
        Overrides {
            left: self.left.clone(),
            right: self.right.clone(),
            deviation: self.deviation,
            max_name_length: self.max_name_length,
            timeout_seconds: self.timeout,
            retries: self.retries,
            format: self.format,
            color: self.color,
        }
    }
}
