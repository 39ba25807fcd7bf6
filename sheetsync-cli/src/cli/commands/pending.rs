//! `sheetsync pending`

use anyhow::{Context, Result};
use colored::*;

use super::PendingArgs;
use crate::config::Config;
use crate::sheet::open_source;
use crate::sync::{SyncOptions, locate_pending_rows, resolve_customer};

pub async fn handle_pending_command(config: &Config, args: PendingArgs) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut sheet = open_source(&config.source).context("Failed to open sheet")?;
    let options = SyncOptions::from_config(config, true);

    let rows = locate_pending_rows(sheet.as_mut(), &options)
        .await
        .context("Failed to check sheet for new additions")?;

    if args.rows_only {
        for row in &rows {
            println!("{}", row);
        }
        return Ok(());
    }

    if rows.is_empty() {
        println!("No new additions right now!");
        return Ok(());
    }

    println!(
        "{} pending row(s) in {}",
        rows.len().to_string().bold(),
        sheet.describe().cyan()
    );
    for row in rows {
        match resolve_customer(sheet.as_mut(), row, options.columns).await {
            Ok(identity) => println!("  {:>5}  {}", row, identity.to_string().green()),
            Err(e) => println!("  {:>5}  {}", row, e.to_string().red()),
        }
    }
    Ok(())
}
