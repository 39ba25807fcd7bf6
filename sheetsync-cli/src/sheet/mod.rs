//! Tabular data sources
//!
//! A [`SheetSource`] exposes a spreadsheet as 1-based (row, column) cells. The sync
//! job only ever reads whole columns, reads single cells and writes single cells,
//! so that is all a backend has to provide.
//!
//! Backends:
//! - [`CsvSheet`] - a local CSV file, rewritten on each write
//! - [`XlsxSheet`] - a local workbook, values of every sheet preserved on write
//! - [`GoogleSheet`] - a Google Sheets spreadsheet via the Sheets API v4

pub mod cell;
pub mod column;
pub mod csv_file;
pub mod google;
pub mod grid;
#[cfg(test)]
pub mod memory;
pub mod xlsx_file;

pub use cell::CellValue;
pub use column::ColumnRef;
pub use csv_file::CsvSheet;
pub use google::GoogleSheet;
pub use grid::Grid;
pub use xlsx_file::XlsxSheet;

use async_trait::async_trait;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::{SourceConfig, SourceKind};

/// Open the backend described by `config`
///
/// File backends load their data here, so a missing or unreadable file fails
/// before any row is looked at.
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn SheetSource>, SheetError> {
    let path = || config.path.clone().unwrap_or_default();
    match config.kind {
        SourceKind::Csv => Ok(Box::new(CsvSheet::open(path())?)),
        SourceKind::Xlsx => Ok(Box::new(XlsxSheet::open(
            path(),
            config.sheet_name.as_deref(),
        )?)),
        SourceKind::Google => Ok(Box::new(
            GoogleSheet::new(
                config.spreadsheet_id.clone().unwrap_or_default(),
                config.sheet_name.clone().unwrap_or_default(),
                config.access_token.clone().unwrap_or_default(),
            )
            .with_api_base(config.api_base.clone()),
        )),
    }
}

/// Replace `path` with `contents` via a temp file in the same directory
///
/// The original file is untouched until the new one is fully written.
pub(crate) fn replace_file(path: &Path, contents: &[u8]) -> Result<(), SheetError> {
    let io_error = |source: std::io::Error| SheetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(contents).map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Row/column addressed access to a spreadsheet
#[async_trait]
pub trait SheetSource: Send {
    /// Index of the last row holding any data, 0 for an empty sheet
    async fn last_row(&mut self) -> Result<usize, SheetError>;

    /// Values of `column` for rows `1..=last_row`, blanks included
    async fn read_column(&mut self, column: ColumnRef) -> Result<Vec<CellValue>, SheetError>;

    /// Value of a single cell; cells past the data come back `Empty`
    async fn read_cell(&mut self, row: usize, column: ColumnRef) -> Result<CellValue, SheetError>;

    /// Overwrite a single cell and persist the change
    async fn write_cell(
        &mut self,
        row: usize,
        column: ColumnRef,
        value: CellValue,
    ) -> Result<(), SheetError>;

    /// Human readable location, used in log lines
    fn describe(&self) -> String;
}

/// Errors raised by sheet backends
#[derive(Debug)]
pub enum SheetError {
    /// File could not be read or written
    Io { path: PathBuf, source: std::io::Error },
    /// CSV parse or write failure
    Csv { path: PathBuf, source: csv::Error },
    /// Workbook could not be opened, parsed or saved
    Workbook { path: PathBuf, message: String },
    /// Named worksheet does not exist in the workbook
    SheetNotFound { name: String, available: Vec<String> },
    /// Row 0 was addressed
    InvalidRow { row: usize },
    /// Transport failure talking to a remote sheet
    Http(reqwest::Error),
    /// Remote sheet API answered with a non-success status
    Api { status: u16, body: String },
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path.display(), source)
            }
            SheetError::Csv { path, source } => {
                write!(f, "CSV error in '{}': {}", path.display(), source)
            }
            SheetError::Workbook { path, message } => {
                write!(f, "Workbook error in '{}': {}", path.display(), message)
            }
            SheetError::SheetNotFound { name, available } => {
                write!(
                    f,
                    "Worksheet '{}' not found (available: {})",
                    name,
                    available.join(", ")
                )
            }
            SheetError::InvalidRow { row } => {
                write!(f, "Invalid row {} - rows are 1-based", row)
            }
            SheetError::Http(e) => write!(f, "Sheet request failed: {}", e),
            SheetError::Api { status, body } => {
                write!(f, "Sheet API returned HTTP {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SheetError::Io { source, .. } => Some(source),
            SheetError::Csv { source, .. } => Some(source),
            SheetError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        SheetError::Http(e)
    }
}
