//! hotfiber command-line demo.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use hotfiber::config::RefreshConfig;
use hotfiber::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = load_config(&cli)?;
    logger::set_verbose(cli.verbose || config.log.verbose);

    match &cli.command {
        Commands::Demo { args } => cli::demo::run(args, &config),
    }
}

/// Load the config file if present, defaults otherwise.
fn load_config(cli: &Cli) -> Result<RefreshConfig> {
    if cli.config.exists() {
        Ok(RefreshConfig::load(&cli.config)?)
    } else {
        Ok(RefreshConfig::default())
    }
}
