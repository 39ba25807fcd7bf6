//! In-memory sheet with failure injection, for tests

use async_trait::async_trait;
use std::collections::HashSet;

use super::{CellValue, ColumnRef, Grid, SheetError, SheetSource};

#[derive(Debug, Default)]
pub struct MemorySheet {
    pub grid: Grid,
    /// Every successful write, in order
    pub writes: Vec<(usize, ColumnRef, CellValue)>,
    pub fail_column_reads: bool,
    pub fail_cell_reads: HashSet<usize>,
    pub fail_writes: HashSet<usize>,
}

impl MemorySheet {
    pub fn from_rows(rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(CellValue::from).collect())
            .collect();
        Self {
            grid: Grid::new(rows),
            ..Default::default()
        }
    }

    fn unavailable() -> SheetError {
        SheetError::Api {
            status: 503,
            body: "sheet unavailable".to_string(),
        }
    }
}

#[async_trait]
impl SheetSource for MemorySheet {
    async fn last_row(&mut self) -> Result<usize, SheetError> {
        if self.fail_column_reads {
            return Err(Self::unavailable());
        }
        Ok(self.grid.last_row())
    }

    async fn read_column(&mut self, column: ColumnRef) -> Result<Vec<CellValue>, SheetError> {
        if self.fail_column_reads {
            return Err(Self::unavailable());
        }
        Ok(self.grid.column(column))
    }

    async fn read_cell(&mut self, row: usize, column: ColumnRef) -> Result<CellValue, SheetError> {
        if self.fail_cell_reads.contains(&row) {
            return Err(Self::unavailable());
        }
        self.grid.cell(row, column)
    }

    async fn write_cell(
        &mut self,
        row: usize,
        column: ColumnRef,
        value: CellValue,
    ) -> Result<(), SheetError> {
        if self.fail_writes.contains(&row) {
            return Err(Self::unavailable());
        }
        self.grid.set(row, column, value.clone())?;
        self.writes.push((row, column, value));
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory sheet".to_string()
    }
}
