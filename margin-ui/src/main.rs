use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use tracing::{debug, info};

use margin_ui::{App, AppConfig, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Retail margin calculator.
///
/// Enter any mix of cost, prices, added value, discount and target margin;
/// the calculator deduces the rest and reports both margins.
#[derive(Debug, Parser)]
struct Cli {
    /// Configuration file. Defaults are used when it does not exist.
    #[arg(long, default_value = "margin.toml")]
    config: PathBuf,

    /// Log filter, overriding the config file (e.g. `debug`).
    #[arg(long)]
    log_level: Option<String>,

    /// Append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not write log records to stderr.
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load(&self.config)?;
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        if self.quiet {
            config.logging.stdout = false;
        }
        Ok(config)
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    logging::init_logging(&config.logging)?;
    debug!(?config, "configuration loaded");

    let mut app = App::new(&config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    app.run(stdin.lock(), &mut stdout)?;
    stdout.flush()?;

    info!("margin calculator closed");
    Ok(())
}
