//! Per-row state and the summary of a run

use std::fmt;

use super::error::FailureKind;

/// Where a row is in its pass through the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Pending,
    Checking,
    Skipped,
    Created,
    Marked,
    Failed(FailureKind),
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowState::Pending => write!(f, "pending"),
            RowState::Checking => write!(f, "checking"),
            RowState::Skipped => write!(f, "skipped"),
            RowState::Created => write!(f, "created"),
            RowState::Marked => write!(f, "marked"),
            RowState::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

/// Result of the remote upsert step
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// Lookup found the customer; nothing created
    Exists,
    /// Same email already confirmed earlier in this run; no remote call made
    AlreadySeen,
    /// Create lost a race with another writer; store reported the email taken
    Conflict,
    Created { id: Option<u64> },
    /// Dry run: the customer would have been created
    WouldCreate,
}

impl UpsertOutcome {
    pub fn state(&self) -> RowState {
        match self {
            UpsertOutcome::Created { .. } | UpsertOutcome::WouldCreate => RowState::Created,
            _ => RowState::Skipped,
        }
    }
}

/// Final outcome of one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Synced(UpsertOutcome),
    Failed(FailureKind),
}

/// Everything one run did, row by row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub rows: Vec<(usize, RowOutcome)>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    pub fn created(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                RowOutcome::Synced(UpsertOutcome::Created { .. } | UpsertOutcome::WouldCreate)
            )
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Synced(u) if u.state() == RowState::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Failed(_)))
    }

    pub fn failed_rows(&self) -> Vec<(usize, FailureKind)> {
        self.rows
            .iter()
            .filter_map(|(row, o)| match o {
                RowOutcome::Failed(kind) => Some((*row, *kind)),
                _ => None,
            })
            .collect()
    }

    pub fn outcome(&self, row: usize) -> Option<&RowOutcome> {
        self.rows.iter().find(|(r, _)| *r == row).map(|(_, o)| o)
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|(_, o)| pred(o)).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let created_label = if self.dry_run { "would create" } else { "created" };
        write!(
            f,
            "{} pending, {} {}, {} already in store, {} failed",
            self.pending(),
            self.created(),
            created_label,
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let report = SyncReport {
            rows: vec![
                (1, RowOutcome::Synced(UpsertOutcome::Created { id: Some(9) })),
                (3, RowOutcome::Synced(UpsertOutcome::Exists)),
                (4, RowOutcome::Synced(UpsertOutcome::AlreadySeen)),
                (5, RowOutcome::Failed(FailureKind::Lookup)),
            ],
            dry_run: false,
        };

        assert_eq!(report.pending(), 4);
        assert_eq!(report.created(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failed_rows(), vec![(5, FailureKind::Lookup)]);
        assert_eq!(
            report.to_string(),
            "4 pending, 1 created, 2 already in store, 1 failed"
        );
    }

    #[test]
    fn test_dry_run_label() {
        let report = SyncReport {
            rows: vec![(2, RowOutcome::Synced(UpsertOutcome::WouldCreate))],
            dry_run: true,
        };
        assert_eq!(report.to_string(), "1 pending, 1 would create, 0 already in store, 0 failed");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RowState::Failed(FailureKind::Mark).to_string(), "failed (mark)");
        assert_eq!(UpsertOutcome::Conflict.state(), RowState::Skipped);
    }
}
