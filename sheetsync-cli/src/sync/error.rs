//! Failure taxonomy of a sync run

use std::fmt;

use crate::sheet::SheetError;
use crate::store::StoreError;

/// Errors raised by the sync operations
///
/// Only `SourceUnavailable` ends a run; every other variant is per-row and leaves
/// the row pending for the next run.
#[derive(Debug)]
pub enum SyncError {
    /// Marker column could not be scanned
    SourceUnavailable(SheetError),
    /// Identity cells could not be read or did not validate
    RowRead { row: usize, reason: RowReadReason },
    /// Existence check against the store failed
    Lookup { row: usize, email: String, source: StoreError },
    /// Create call failed
    Create { row: usize, email: String, source: StoreError },
    /// Marker write-back failed
    Mark { row: usize, source: SheetError },
}

#[derive(Debug)]
pub enum RowReadReason {
    Sheet(SheetError),
    Invalid(String),
}

/// Per-row failure kind, as recorded in the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    RowRead,
    Lookup,
    Create,
    Mark,
}

impl SyncError {
    /// `None` for the run-level `SourceUnavailable`
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            SyncError::SourceUnavailable(_) => None,
            SyncError::RowRead { .. } => Some(FailureKind::RowRead),
            SyncError::Lookup { .. } => Some(FailureKind::Lookup),
            SyncError::Create { .. } => Some(FailureKind::Create),
            SyncError::Mark { .. } => Some(FailureKind::Mark),
        }
    }

    /// Kind recorded against a row; a sheet outage mid-row counts as a failed read
    pub fn row_failure_kind(&self) -> FailureKind {
        self.kind().unwrap_or(FailureKind::RowRead)
    }

    pub fn row(&self) -> Option<usize> {
        match self {
            SyncError::SourceUnavailable(_) => None,
            SyncError::RowRead { row, .. }
            | SyncError::Lookup { row, .. }
            | SyncError::Create { row, .. }
            | SyncError::Mark { row, .. } => Some(*row),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::SourceUnavailable(e) => {
                write!(f, "Failed to check sheet for new additions: {}", e)
            }
            SyncError::RowRead { row, reason } => {
                write!(f, "Row {}: failed to retrieve customer data: {}", row, reason)
            }
            SyncError::Lookup { row, email, source } => {
                write!(
                    f,
                    "Row {}: failed to check if customer {} exists: {}",
                    row, email, source
                )
            }
            SyncError::Create { row, email, source } => {
                write!(f, "Row {}: failed to add customer {}: {}", row, email, source)
            }
            SyncError::Mark { row, source } => {
                write!(f, "Row {}: failed to update sheet: {}", row, source)
            }
        }
    }
}

impl fmt::Display for RowReadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowReadReason::Sheet(e) => write!(f, "{}", e),
            RowReadReason::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RowRead => write!(f, "row read"),
            FailureKind::Lookup => write!(f, "lookup"),
            FailureKind::Create => write!(f, "create"),
            FailureKind::Mark => write!(f, "mark"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::SourceUnavailable(e) => Some(e),
            SyncError::RowRead {
                reason: RowReadReason::Sheet(e),
                ..
            } => Some(e),
            SyncError::RowRead { .. } => None,
            SyncError::Lookup { source, .. } | SyncError::Create { source, .. } => Some(source),
            SyncError::Mark { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outage() -> SheetError {
        SheetError::Api {
            status: 503,
            body: "sheet unavailable".to_string(),
        }
    }

    #[test]
    fn test_row_failure_kind_never_panics_on_source_error() {
        let err = SyncError::SourceUnavailable(outage());
        assert_eq!(err.kind(), None);
        assert_eq!(err.row_failure_kind(), FailureKind::RowRead);
    }

    #[test]
    fn test_row_failure_kind_matches_variant() {
        let err = SyncError::Mark { row: 4, source: outage() };
        assert_eq!(err.row_failure_kind(), FailureKind::Mark);
        assert_eq!(err.row(), Some(4));
    }
}
