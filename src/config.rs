use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::diff::{ColorChoice, DiffOptions, OutputFormat, RenderOptions};
use crate::retry::RetryPolicy;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9100/metrics";
pub const DEFAULT_CONFIG_FILE: &str = "spod.toml";
const ENV_PREFIX: &str = "SPOD";

/// Log line encoding on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Effective settings of one run
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub left: String,
    pub right: String,
    pub deviation: f64,
    pub max_name_length: usize,
    pub timeout_seconds: u64,
    pub retries: u32,
    pub retry_backoff_ms: u64,
    pub format: OutputFormat,
    pub color: ColorChoice,
    pub log_format: LogFormat,
}

/// Values given on the command line, each overriding every other layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub left: Option<String>,
    pub right: Option<String>,
    pub deviation: Option<f64>,
    pub max_name_length: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub retries: Option<u32>,
    pub format: Option<OutputFormat>,
    pub color: Option<ColorChoice>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_retries(self.retries, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            deviation: self.deviation,
            render: RenderOptions {
                max_name_length: self.max_name_length,
                format: self.format,
                color: self.color,
            },
        }
    }
}

/// Load settings from defaults, an optional TOML file, `SPOD_*` environment
/// variables and command-line overrides, in that order
pub fn load_settings(file: &Path, overrides: Overrides) -> anyhow::Result<Settings> {
    let config = config::Config::builder()
        .set_default("left", DEFAULT_ENDPOINT)?
        .set_default("right", DEFAULT_ENDPOINT)?
        .set_default("deviation", 0.0)?
        .set_default("max_name_length", 0u64)?
        .set_default("timeout_seconds", 10u64)?
        .set_default("retries", 0u64)?
        .set_default("retry_backoff_ms", 500u64)?
        .set_default("format", "table")?
        .set_default("color", "auto")?
        .set_default("log_format", "text")?
        .add_source(config::File::from(file).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("left", overrides.left)?
        .set_override_option("right", overrides.right)?
        .set_override_option("deviation", overrides.deviation)?
        .set_override_option("max_name_length", overrides.max_name_length.map(|n| n as u64))?
        .set_override_option("timeout_seconds", overrides.timeout_seconds)?
        .set_override_option("retries", overrides.retries.map(u64::from))?
        .set_override_option("format", overrides.format.map(format_name))?
        .set_override_option("color", overrides.color.map(color_name))?
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    validate_settings(&settings)?;

    Ok(settings)
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Table => "table",
        OutputFormat::Tsv => "tsv",
    }
}

fn color_name(color: ColorChoice) -> &'static str {
    match color {
        ColorChoice::Auto => "auto",
        ColorChoice::Always => "always",
        ColorChoice::Never => "never",
    }
}

fn validate_settings(settings: &Settings) -> anyhow::Result<()> {
    if settings.left.trim().is_empty() || settings.right.trim().is_empty() {
        anyhow::bail!("Both endpoints must be set");
    }

    if !settings.deviation.is_finite() {
        anyhow::bail!("Deviation must be a finite number, got {}", settings.deviation);
    }

    if settings.timeout_seconds == 0 {
        anyhow::bail!("Timeout must be at least 1 second");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_file() -> &'static Path {
        Path::new("does-not-exist/spod.toml")
    }

    #[test]
    fn test_defaults() {
        let settings = load_settings(missing_file(), Overrides::default()).unwrap();

        assert_eq!(settings.left, DEFAULT_ENDPOINT);
        assert_eq!(settings.right, DEFAULT_ENDPOINT);
        assert_eq!(settings.deviation, 0.0);
        assert_eq!(settings.max_name_length, 0);
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.color, ColorChoice::Auto);
        assert_eq!(settings.retry_policy().attempts, 1);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            left: Some(":9100".to_string()),
            right: Some("canary:9100".to_string()),
            deviation: Some(2.5),
            max_name_length: Some(40),
            retries: Some(2),
            format: Some(OutputFormat::Tsv),
            color: Some(ColorChoice::Never),
            ..Default::default()
        };

        let settings = load_settings(missing_file(), overrides).unwrap();

        assert_eq!(settings.left, ":9100");
        assert_eq!(settings.right, "canary:9100");
        assert_eq!(settings.deviation, 2.5);
        assert_eq!(settings.max_name_length, 40);
        assert_eq!(settings.retry_policy().attempts, 3);
        assert_eq!(settings.format, OutputFormat::Tsv);
        assert_eq!(settings.color, ColorChoice::Never);
    }

    #[test]
    fn test_validate_rejects_non_finite_deviation() {
        let overrides = Overrides {
            deviation: Some(f64::INFINITY),
            ..Default::default()
        };

        let result = load_settings(missing_file(), overrides);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("finite"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let overrides = Overrides {
            timeout_seconds: Some(0),
            ..Default::default()
        };

        assert!(load_settings(missing_file(), overrides).is_err());
    }
}
