//! Spreadsheet → store customer sync
//!
//! A run scans the marker column once, then takes each pending row through
//! resolve → upsert → mark. Failures are per row and leave the row pending,
//! except a failed scan, which ends the run.

pub mod error;
pub mod identity;
pub mod job;
pub mod report;

pub use error::{FailureKind, RowReadReason, SyncError};
pub use identity::CustomerIdentity;
pub use job::{SyncJob, SyncOptions, locate_pending_rows, resolve_customer};
pub use report::{RowOutcome, RowState, SyncReport, UpsertOutcome};
