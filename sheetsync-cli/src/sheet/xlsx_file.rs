//! Excel workbook backend
//!
//! Reads with calamine and rewrites the file with rust_xlsxwriter. Every sheet's
//! cell values survive a write, dates keep a date format and error cells keep
//! their error text; other styles, formulas and column widths do not.

use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

use super::{CellValue, ColumnRef, Grid, SheetError, SheetSource, replace_file};

/// One worksheet of a workbook, selected by name (first sheet by default)
#[derive(Debug)]
pub struct XlsxSheet {
    path: PathBuf,
    sheets: Vec<(String, Grid)>,
    active: usize,
}

impl XlsxSheet {
    pub fn open<P: AsRef<Path>>(path: P, sheet_name: Option<&str>) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();
        let mut workbook: Xlsx<_> = open_workbook(&path).map_err(|e| SheetError::Workbook {
            path: path.clone(),
            message: format!("Failed to open workbook: {}", e),
        })?;

        let names: Vec<String> = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(names.len());
        for name in &names {
            let range = workbook
                .worksheet_range(name)
                .map_err(|e| SheetError::Workbook {
                    path: path.clone(),
                    message: format!("Failed to read sheet '{}': {}", name, e),
                })?;

            // Ranges start at the first used cell, not A1
            let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
            let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset as usize];
            for row in range.rows() {
                let mut cells = vec![CellValue::Empty; col_offset as usize];
                cells.extend(row.iter().map(data_to_cell));
                rows.push(cells);
            }
            sheets.push((name.clone(), Grid::new(rows)));
        }

        let active = match sheet_name {
            Some(wanted) => names
                .iter()
                .position(|n| n == wanted)
                .ok_or_else(|| SheetError::SheetNotFound {
                    name: wanted.to_string(),
                    available: names.clone(),
                })?,
            None if names.is_empty() => {
                return Err(SheetError::Workbook {
                    path,
                    message: "Workbook has no sheets".to_string(),
                });
            }
            None => 0,
        };

        Ok(Self { path, sheets, active })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheets[self.active].0
    }

    fn grid(&self) -> &Grid {
        &self.sheets[self.active].1
    }

    fn save(&self) -> Result<(), SheetError> {
        let workbook_error = |e: rust_xlsxwriter::XlsxError| SheetError::Workbook {
            path: self.path.clone(),
            message: e.to_string(),
        };
        let out_of_bounds = |row: usize, col: usize| SheetError::Workbook {
            path: self.path.clone(),
            message: format!("Cell at row {} column {} is outside the sheet limits", row + 1, col + 1),
        };
        let date_format = Format::new().set_num_format("m/d/yyyy");
        let datetime_format = Format::new().set_num_format("m/d/yyyy h:mm:ss");

        let mut workbook = Workbook::new();
        for (name, grid) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(workbook_error)?;

            for (row_idx, row) in grid.rows().iter().enumerate() {
                for (col_idx, cell) in row.iter().enumerate() {
                    let r = u32::try_from(row_idx).map_err(|_| out_of_bounds(row_idx, col_idx))?;
                    let c = u16::try_from(col_idx).map_err(|_| out_of_bounds(row_idx, col_idx))?;
                    match cell {
                        CellValue::Empty => {}
                        CellValue::String(s) => {
                            worksheet.write_string(r, c, s).map_err(workbook_error)?;
                        }
                        CellValue::Number(n) => {
                            worksheet.write_number(r, c, *n).map_err(workbook_error)?;
                        }
                        CellValue::Bool(b) => {
                            worksheet.write_boolean(r, c, *b).map_err(workbook_error)?;
                        }
                        CellValue::Date(serial) => {
                            let format = if serial.fract() == 0.0 {
                                &date_format
                            } else {
                                &datetime_format
                            };
                            worksheet
                                .write_number_with_format(r, c, *serial, format)
                                .map_err(workbook_error)?;
                        }
                    }
                }
            }
        }

        let bytes = workbook.save_to_buffer().map_err(workbook_error)?;
        replace_file(&self.path, &bytes)
    }
}

/// Convert a calamine cell; dates keep their serial number, errors their text
fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::from_text(s.clone()),
        Data::DurationIso(s) => CellValue::from_text(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

#[async_trait]
impl SheetSource for XlsxSheet {
    async fn last_row(&mut self) -> Result<usize, SheetError> {
        Ok(self.grid().last_row())
    }

    async fn read_column(&mut self, column: ColumnRef) -> Result<Vec<CellValue>, SheetError> {
        Ok(self.grid().column(column))
    }

    async fn read_cell(&mut self, row: usize, column: ColumnRef) -> Result<CellValue, SheetError> {
        self.grid().cell(row, column)
    }

    async fn write_cell(
        &mut self,
        row: usize,
        column: ColumnRef,
        value: CellValue,
    ) -> Result<(), SheetError> {
        self.sheets[self.active].1.set(row, column, value)?;
        self.save()
    }

    fn describe(&self) -> String {
        format!("workbook {} [{}]", self.path.display(), self.sheet_name())
    }
}
