/// Integration tests for settings layering (file, then command line)
use spod::config::{load_settings, LogFormat, Overrides};
use spod::diff::{ColorChoice, OutputFormat};
use std::io::Write;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_file_values_used() -> anyhow::Result<()> {
    let file = config_file(
        r#"
left = "baseline:9100"
right = "canary:9100"
deviation = 1.5
max_name_length = 60
format = "tsv"
color = "never"
log_format = "json"
"#,
    );

    let settings = load_settings(file.path(), Overrides::default())?;

    assert_eq!(settings.left, "baseline:9100");
    assert_eq!(settings.right, "canary:9100");
    assert_eq!(settings.deviation, 1.5);
    assert_eq!(settings.max_name_length, 60);
    assert_eq!(settings.format, OutputFormat::Tsv);
    assert_eq!(settings.color, ColorChoice::Never);
    assert_eq!(settings.log_format, LogFormat::Json);
    // Unset keys keep their defaults
    assert_eq!(settings.timeout_seconds, 10);
    Ok(())
}

#[test]
fn test_command_line_beats_file() -> anyhow::Result<()> {
    let file = config_file("left = \"baseline:9100\"\ndeviation = 1.5\n");
    let overrides = Overrides {
        deviation: Some(0.25),
        ..Default::default()
    };

    let settings = load_settings(file.path(), overrides)?;

    assert_eq!(settings.left, "baseline:9100");
    assert_eq!(settings.deviation, 0.25);
    Ok(())
}

#[test]
fn test_invalid_file_value_rejected() {
    let file = config_file("format = \"yaml\"\n");
    assert!(load_settings(file.path(), Overrides::default()).is_err());
}
