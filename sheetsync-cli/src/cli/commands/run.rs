//! `sheetsync run`

use anyhow::{Context, Result, bail};
use log::warn;

use super::RunArgs;
use crate::config::Config;
use crate::sheet::open_source;
use crate::store::ShopifyClient;
use crate::sync::{SyncError, SyncJob, SyncOptions};

pub async fn handle_run_command(config: &Config, args: RunArgs) -> Result<()> {
    let store = ShopifyClient::from_config(&config.store).context("Failed to set up store client")?;

    // An unopenable sheet is the same fatal case as a failed scan
    let mut sheet = open_source(&config.source).map_err(SyncError::SourceUnavailable)?;

    if args.dry_run {
        warn!("Dry run: no customers will be created and no rows marked");
    }

    let options = SyncOptions::from_config(config, args.dry_run);
    let report = SyncJob::new(sheet.as_mut(), &store, options).run().await?;

    let failed = report.failed_rows();
    if !failed.is_empty() {
        for (row, kind) in &failed {
            warn!("Row {} left pending after {} failure", row, kind);
        }
        if args.strict {
            bail!("{} row(s) failed to sync", failed.len());
        }
    }
    Ok(())
}
