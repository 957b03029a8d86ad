//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use hotfiber::config::CONFIG_FILE;

/// Hot-reload refresh core for a fiber reconciler
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Config file path (used only if it exists)
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Mount a counter, click it, then hot-reload a new version of it
    #[command(visible_alias = "d")]
    Demo {
        #[command(flatten)]
        args: DemoArgs,
    },
}

/// Demo command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct DemoArgs {
    /// Clicks dispatched before the reload
    #[arg(short, long, default_value_t = 2)]
    pub clicks: u32,

    /// Also reload with a changed hook signature (forces a remount)
    #[arg(short, long)]
    pub remount: bool,

    /// Print the report as JSON
    #[arg(short, long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_args() {
        let cli = Cli::try_parse_from(["hotfiber", "demo", "--clicks", "3", "--json"]).unwrap();
        let Commands::Demo { args } = cli.command;
        assert_eq!(args.clicks, 3);
        assert!(args.json);
        assert!(!args.remount);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["hotfiber", "demo", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
