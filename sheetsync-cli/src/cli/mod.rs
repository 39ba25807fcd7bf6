//! Command line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use commands::{PendingArgs, RunArgs};

#[derive(Debug, Parser)]
#[command(
    name = "sheetsync",
    version,
    about = "Create Shopify customers for new rows of a spreadsheet"
)]
pub struct Cli {
    /// Config file (defaults to $SHEETSYNC_CONFIG, then <config dir>/sheetsync/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Defaults to `run` so a scheduler can invoke the binary bare
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sync pending rows into the store
    Run(RunArgs),
    /// List pending rows without contacting the store
    Pending(PendingArgs),
    /// Print the effective configuration with secrets masked
    Config,
}

/// Dispatch a parsed command line
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            config.validate()?;
            commands::run::handle_run_command(&config, args).await
        }
        Commands::Pending(args) => {
            config.validate_source()?;
            commands::pending::handle_pending_command(&config, args).await
        }
        Commands::Config => commands::config::handle_config_command(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["sheetsync"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["sheetsync", "run", "--dry-run", "--strict", "-vv"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.dry_run);
                assert!(args.strict);
            }
            other => panic!("expected run, got {:?}", other),
        }
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["sheetsync", "pending", "--config", "sync.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("sync.toml")));
        assert!(matches!(cli.command, Some(Commands::Pending(_))));
    }
}
