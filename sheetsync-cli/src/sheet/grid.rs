//! In-memory cell grid shared by the file-backed sheets

use super::{CellValue, ColumnRef, SheetError};

/// Rows of cells, ragged rows allowed; missing cells read as `Empty`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// 1-based index of the last row with at least one non-empty cell
    pub fn last_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn column(&self, column: ColumnRef) -> Vec<CellValue> {
        self.rows[..self.last_row()]
            .iter()
            .map(|row| row.get(column.offset()).cloned().unwrap_or(CellValue::Empty))
            .collect()
    }

    pub fn cell(&self, row: usize, column: ColumnRef) -> Result<CellValue, SheetError> {
        if row == 0 {
            return Err(SheetError::InvalidRow { row });
        }
        Ok(self
            .rows
            .get(row - 1)
            .and_then(|r| r.get(column.offset()))
            .cloned()
            .unwrap_or(CellValue::Empty))
    }

    /// Set a cell, growing the grid as needed
    pub fn set(&mut self, row: usize, column: ColumnRef, value: CellValue) -> Result<(), SheetError> {
        if row == 0 {
            return Err(SheetError::InvalidRow { row });
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < column.index() {
            cells.resize(column.index(), CellValue::Empty);
        }
        cells[column.offset()] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(vec![
            vec!["Ada".into(), "Lovelace".into(), "ada@example.com".into()],
            vec!["Alan".into(), "Turing".into(), "alan@example.com".into(), "3/1/2021".into()],
            vec![],
            vec![CellValue::Empty, CellValue::Empty],
        ])
    }

    #[test]
    fn test_last_row_ignores_trailing_blank_rows() {
        assert_eq!(grid().last_row(), 2);
        assert_eq!(Grid::default().last_row(), 0);
    }

    #[test]
    fn test_column_pads_short_rows() {
        let col = grid().column(ColumnRef::D);
        assert_eq!(col, vec![CellValue::Empty, CellValue::String("3/1/2021".to_string())]);
    }

    #[test]
    fn test_set_grows_grid() {
        let mut g = grid();
        g.set(6, ColumnRef::D, "10/19/2026".into()).unwrap();
        assert_eq!(g.last_row(), 6);
        assert_eq!(g.cell(6, ColumnRef::D).unwrap(), CellValue::String("10/19/2026".to_string()));
        assert_eq!(g.cell(6, ColumnRef::A).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_row_zero_rejected() {
        let mut g = grid();
        assert!(matches!(g.cell(0, ColumnRef::A), Err(SheetError::InvalidRow { row: 0 })));
        assert!(g.set(0, ColumnRef::A, CellValue::Empty).is_err());
    }
}
