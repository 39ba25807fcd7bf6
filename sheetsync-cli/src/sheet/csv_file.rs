//! CSV file backend

use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::{Path, PathBuf};

use super::{CellValue, ColumnRef, Grid, SheetError, SheetSource, replace_file};

/// A CSV file loaded into memory; every write rewrites the whole file
///
/// The file has no header handling of its own: row 1 is the first line.
#[derive(Debug)]
pub struct CsvSheet {
    path: PathBuf,
    grid: Grid,
}

impl CsvSheet {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|source| SheetError::Csv { path: path.clone(), source })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| SheetError::Csv { path: path.clone(), source })?;
            rows.push(record.iter().map(CellValue::from).collect());
        }

        log::debug!("Loaded {} CSV rows from {}", rows.len(), path.display());
        Ok(Self { path, grid: Grid::new(rows) })
    }

    fn save(&self) -> Result<(), SheetError> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());

        for row in self.grid.rows() {
            let fields: Vec<String> = row.iter().map(CellValue::raw_text).collect();
            writer
                .write_record(&fields)
                .map_err(|source| SheetError::Csv { path: self.path.clone(), source })?;
        }

        let bytes = writer.into_inner().map_err(|e| SheetError::Io {
            path: self.path.clone(),
            source: e.into_error(),
        })?;
        replace_file(&self.path, &bytes)
    }
}

#[async_trait]
impl SheetSource for CsvSheet {
    async fn last_row(&mut self) -> Result<usize, SheetError> {
        Ok(self.grid.last_row())
    }

    async fn read_column(&mut self, column: ColumnRef) -> Result<Vec<CellValue>, SheetError> {
        Ok(self.grid.column(column))
    }

    async fn read_cell(&mut self, row: usize, column: ColumnRef) -> Result<CellValue, SheetError> {
        self.grid.cell(row, column)
    }

    async fn write_cell(
        &mut self,
        row: usize,
        column: ColumnRef,
        value: CellValue,
    ) -> Result<(), SheetError> {
        self.grid.set(row, column, value)?;
        self.save()
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("customers.csv");
        fs::write(
            &path,
            "Ada,Lovelace,ada@example.com,\nAlan,Turing,alan@example.com,3/1/2021\nGrace,Hopper,grace@example.com\n",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_reads_marker_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut sheet = CsvSheet::open(write_fixture(&dir)).unwrap();

        assert_eq!(sheet.last_row().await.unwrap(), 3);
        let markers = sheet.read_column(ColumnRef::D).await.unwrap();
        assert_eq!(
            markers,
            vec![
                CellValue::Empty,
                CellValue::String("3/1/2021".to_string()),
                CellValue::Empty,
            ]
        );
    }

    #[tokio::test]
    async fn test_write_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir);
        let mut sheet = CsvSheet::open(&path).unwrap();

        sheet
            .write_cell(3, ColumnRef::D, CellValue::from("10/19/2026"))
            .await
            .unwrap();

        let mut reopened = CsvSheet::open(&path).unwrap();
        assert_eq!(
            reopened.read_cell(3, ColumnRef::D).await.unwrap(),
            CellValue::String("10/19/2026".to_string())
        );
        assert_eq!(
            reopened.read_cell(1, ColumnRef::C).await.unwrap(),
            CellValue::String("ada@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_write_leaves_other_cells_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.csv");
        fs::write(
            &path,
            "  Ada ,Lovelace,ada@example.com,\nnote,  indented text  ,x@y.z,3/1/2021\n",
        )
        .unwrap();

        let mut sheet = CsvSheet::open(&path).unwrap();
        sheet
            .write_cell(1, ColumnRef::D, CellValue::from("10/19/2026"))
            .await
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "  Ada ,Lovelace,ada@example.com,10/19/2026\nnote,  indented text  ,x@y.z,3/1/2021\n"
        );
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir);
        let mut sheet = CsvSheet::open(&path).unwrap();

        sheet
            .write_cell(1, ColumnRef::D, CellValue::from("10/19/2026"))
            .await
            .unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvSheet::open(dir.path().join("missing.csv"));
        assert!(matches!(result, Err(SheetError::Csv { .. })));
    }
}
