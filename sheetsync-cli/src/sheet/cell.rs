//! Typed view over raw spreadsheet cell contents

use std::fmt;

/// A single cell value as returned by a [`SheetSource`](super::SheetSource)
///
/// Backends normalise their native representation into this enum: CSV cells are
/// always `String` (or `Empty`), workbook and Google Sheets cells keep their
/// number/boolean types. Google Sheets dates arrive as plain serial numbers;
/// workbook cells with a date format keep that as `Date`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    String(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet serial date (days since 1899-12-30)
    Date(f64),
}

impl CellValue {
    /// Loose numeric coercion used by the pending-row check
    ///
    /// Blank text counts as 0, numeric text as its number, anything else is NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Empty => 0.0,
            CellValue::Number(n) | CellValue::Date(n) => *n,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return 0.0;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => n,
                    _ => f64::NAN,
                }
            }
        }
    }

    /// A marker cell is unset when it coerces to a number below 1
    ///
    /// Non-numeric text coerces to NaN, which never compares below 1, so any
    /// written marker (e.g. "3/1/2021") counts as set.
    pub fn is_unset(&self) -> bool {
        self.as_number() < 1.0
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell as trimmed text, integers without a trailing `.0`
    pub fn as_text(&self) -> String {
        match self {
            CellValue::String(s) => s.trim().to_string(),
            other => other.raw_text(),
        }
    }

    /// Text exactly as stored, for writing a cell back unchanged
    pub fn raw_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) | CellValue::Date(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Build a cell from raw text, mapping the empty string to `Empty`
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::String(text)
        }
    }

    /// Convert a JSON value from the Google Sheets API
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Empty),
            serde_json::Value::String(s) => CellValue::from_text(s.clone()),
            other => CellValue::String(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::String(String::new()),
            CellValue::String(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) | CellValue::Date(n) => serde_json::json!(*n),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from_text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::from_text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}
