//! The sync job: scan → check-exists → create-or-skip → mark-done

use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::fmt::Write as _;

use super::error::{RowReadReason, SyncError};
use super::identity::CustomerIdentity;
use super::report::{RowOutcome, RowState, SyncReport, UpsertOutcome};
use crate::config::{ColumnLayout, Config, DEFAULT_DATE_FORMAT};
use crate::sheet::{CellValue, SheetError, SheetSource};
use crate::store::{CreateOutcome, CustomerStore};

/// Knobs of a single run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub columns: ColumnLayout,
    pub header_rows: usize,
    pub date_format: String,
    /// Look customers up but neither create them nor write markers
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            columns: ColumnLayout::default(),
            header_rows: 0,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            dry_run: false,
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self {
            columns: config.columns,
            header_rows: config.sync.header_rows,
            date_format: config.sync.date_format.clone(),
            dry_run,
        }
    }
}

/// One run over a sheet against a customer store
///
/// Rows are processed strictly one after another; the sheet's marker column is
/// the only resumption state between runs.
pub struct SyncJob<'a, S: SheetSource + ?Sized, C: CustomerStore + ?Sized> {
    sheet: &'a mut S,
    store: &'a C,
    options: SyncOptions,
    today: fn() -> NaiveDate,
    /// Lowercased emails known to exist remotely, filled as the run goes
    confirmed: HashSet<String>,
}

impl<'a, S: SheetSource + ?Sized, C: CustomerStore + ?Sized> SyncJob<'a, S, C> {
    pub fn new(sheet: &'a mut S, store: &'a C, options: SyncOptions) -> Self {
        Self {
            sheet,
            store,
            options,
            today: || Local::now().date_naive(),
            confirmed: HashSet::new(),
        }
    }

    /// Replace the local-date clock used for markers
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run the whole job; only a failed scan is returned as an error
    pub async fn run(&mut self) -> Result<SyncReport, SyncError> {
        info!("Checking {} for new additions", self.sheet.describe());

        let pending = self.locate_pending_rows().await?;

        let mut report = SyncReport {
            rows: Vec::with_capacity(pending.len()),
            dry_run: self.options.dry_run,
        };

        if pending.is_empty() {
            info!("No new additions right now!");
            return Ok(report);
        }

        info!("Found {} new addition(s): rows {:?}", pending.len(), pending);
        for row in pending {
            let outcome = self.process_row(row).await;
            report.rows.push((row, outcome));
        }

        info!("Sync finished: {}", report);
        Ok(report)
    }

    /// Ascending indices of rows whose marker cell is unset
    pub async fn locate_pending_rows(&mut self) -> Result<Vec<usize>, SyncError> {
        locate_pending_rows(&mut *self.sheet, &self.options).await
    }

    /// Read and validate the identity cells of `row`
    pub async fn resolve_customer(&mut self, row: usize) -> Result<CustomerIdentity, SyncError> {
        resolve_customer(&mut *self.sheet, row, self.options.columns).await
    }

    /// Make sure a customer with this email exists in the store
    ///
    /// At most one create request is issued. A 422 "email taken" answer to the
    /// create counts as the customer existing.
    pub async fn upsert_remote_customer(
        &mut self,
        row: usize,
        identity: &CustomerIdentity,
    ) -> Result<UpsertOutcome, SyncError> {
        let key = identity.email_key();
        if self.confirmed.contains(&key) {
            info!("Row {}: {} already synced earlier in this run", row, identity.email);
            return Ok(UpsertOutcome::AlreadySeen);
        }

        let existing = self
            .store
            .find_by_email(&identity.email)
            .await
            .map_err(|source| SyncError::Lookup {
                row,
                email: identity.email.clone(),
                source,
            })?;

        let outcome = if !existing.is_empty() {
            info!("Row {}: customer {} already in store", row, identity);
            UpsertOutcome::Exists
        } else if self.options.dry_run {
            info!("Row {}: would create customer {}", row, identity);
            UpsertOutcome::WouldCreate
        } else {
            let created = self
                .store
                .create_customer(&identity.to_new_customer())
                .await
                .map_err(|source| SyncError::Create {
                    row,
                    email: identity.email.clone(),
                    source,
                })?;
            match created {
                CreateOutcome::Created { id } => {
                    info!("Row {}: customer {} added to store", row, identity);
                    UpsertOutcome::Created { id }
                }
                CreateOutcome::AlreadyExists => {
                    warn!(
                        "Row {}: store reports {} already taken, treating as existing",
                        row, identity.email
                    );
                    UpsertOutcome::Conflict
                }
            }
        };

        self.confirmed.insert(key);
        Ok(outcome)
    }

    /// Write today's date into the marker cell of `row`
    pub async fn mark_row_synced(&mut self, row: usize) -> Result<(), SyncError> {
        let stamp = self.marker_text();
        if self.options.dry_run {
            info!("Row {}: would mark synced with '{}'", row, stamp);
            return Ok(());
        }

        self.sheet
            .write_cell(row, self.options.columns.marker, CellValue::String(stamp))
            .await
            .map_err(|source| SyncError::Mark { row, source })?;
        info!("Row {}: updated sheet", row);
        Ok(())
    }

    /// Resolve → upsert → mark for one row, folding any failure into the outcome
    pub async fn process_row(&mut self, row: usize) -> RowOutcome {
        debug!("Row {}: {}", row, RowState::Pending);
        match self.sync_row(row).await {
            Ok(outcome) => {
                debug!("Row {}: {}", row, RowState::Marked);
                RowOutcome::Synced(outcome)
            }
            Err(err) => {
                error!("{}", err);
                let kind = err.row_failure_kind();
                debug!("Row {}: {}", row, RowState::Failed(kind));
                RowOutcome::Failed(kind)
            }
        }
    }

    async fn sync_row(&mut self, row: usize) -> Result<UpsertOutcome, SyncError> {
        let identity = self.resolve_customer(row).await?;
        debug!("Row {}: {} ({})", row, RowState::Checking, identity.email);

        let outcome = self.upsert_remote_customer(row, &identity).await?;
        debug!("Row {}: {}", row, outcome.state());

        self.mark_row_synced(row).await?;
        Ok(outcome)
    }

    fn marker_text(&self) -> String {
        let today = (self.today)();
        let mut out = String::new();
        if write!(out, "{}", today.format(&self.options.date_format)).is_err() {
            warn!(
                "Invalid date format '{}', falling back to '{}'",
                self.options.date_format, DEFAULT_DATE_FORMAT
            );
            out = today.format(DEFAULT_DATE_FORMAT).to_string();
        }
        out
    }
}

/// Scan the marker column; a read failure is `SourceUnavailable`
///
/// Rows inside the header prefix are never returned.
pub async fn locate_pending_rows<S: SheetSource + ?Sized>(
    sheet: &mut S,
    options: &SyncOptions,
) -> Result<Vec<usize>, SyncError> {
    let markers = sheet
        .read_column(options.columns.marker)
        .await
        .map_err(SyncError::SourceUnavailable)?;

    Ok(markers
        .iter()
        .enumerate()
        .map(|(i, marker)| (i + 1, marker))
        .filter(|(row, marker)| *row > options.header_rows && marker.is_unset())
        .map(|(row, _)| row)
        .collect())
}

/// Read the identity cells of `row` and validate them
pub async fn resolve_customer<S: SheetSource + ?Sized>(
    sheet: &mut S,
    row: usize,
    columns: ColumnLayout,
) -> Result<CustomerIdentity, SyncError> {
    let read_error = |e: SheetError| SyncError::RowRead {
        row,
        reason: RowReadReason::Sheet(e),
    };

    let first_name = sheet.read_cell(row, columns.first_name).await.map_err(read_error)?;
    let last_name = sheet.read_cell(row, columns.last_name).await.map_err(read_error)?;
    let email = sheet.read_cell(row, columns.email).await.map_err(read_error)?;

    CustomerIdentity::from_cells(&first_name, &last_name, &email).map_err(|msg| SyncError::RowRead {
        row,
        reason: RowReadReason::Invalid(msg),
    })
}
