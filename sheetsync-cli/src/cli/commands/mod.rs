//! Command arguments and handlers

pub mod config;
pub mod pending;
pub mod run;

use clap::Args;

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Look customers up but do not create them or write markers
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero when any row failed
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct PendingArgs {
    /// Print row numbers only
    #[arg(long)]
    pub rows_only: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
