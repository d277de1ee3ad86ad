use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

mod cli;
mod commands;

use spod::config::load_settings;
use spod::diff::ColorChoice;
use spod::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(args: cli::Cli) -> anyhow::Result<()> {
    let settings = load_settings(&args.config, args.overrides())?;

    match settings.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }

    init_tracing(settings.log_format);
    tracing::debug!(config = %args.config.display(), "Settings loaded");

    commands::diff::execute(&settings).await
}
