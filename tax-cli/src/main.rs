use std::io::Write;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::debug;

use tax_cli::app::{Settings, execute};
use tax_cli::cli::Cli;
use tax_cli::config::AppConfig;
use tax_cli::{logging, report};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::discover(cli.config.as_deref())?;
    let log_file = cli.log_file.as_deref().or(config.log_file.as_deref());
    logging::init_logging(config.log_level.as_deref(), log_file)?;
    debug!(?cli, "parsed command line");

    let settings = Settings::resolve(&cli, &config, Local::now().date_naive())?;
    let output = execute(&cli.command, &settings)?;

    if !output.warnings.is_empty() {
        eprint!("{}", report::render_warnings(&output.warnings));
    }
    std::io::stdout()
        .lock()
        .write_all(output.stdout.as_bytes())
        .context("failed to write report")?;

    Ok(())
}
