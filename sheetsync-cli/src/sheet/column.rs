//! A1-style column references ("A", "D", "AA")

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 1-based column index, written and parsed as spreadsheet letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef(usize);

impl ColumnRef {
    pub const A: ColumnRef = ColumnRef(1);
    pub const B: ColumnRef = ColumnRef(2);
    pub const C: ColumnRef = ColumnRef(3);
    pub const D: ColumnRef = ColumnRef(4);
    /// Last column a workbook can hold (`XFD`)
    pub const MAX: ColumnRef = ColumnRef(16_384);

    /// Create from a 1-based index, `None` for 0
    pub fn new(index: usize) -> Option<Self> {
        if index == 0 { None } else { Some(ColumnRef(index)) }
    }

    /// 1-based column number
    pub fn index(self) -> usize {
        self.0
    }

    /// 0-based offset into a row vector
    pub fn offset(self) -> usize {
        self.0 - 1
    }

    pub fn letters(self) -> String {
        let mut n = self.0;
        let mut out = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            out.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        out.iter().rev().collect()
    }

    /// A1 address of this column at `row`, e.g. `D7`
    pub fn cell(self, row: usize) -> String {
        format!("{}{}", self.letters(), row)
    }
}

/// Error for column letters that are empty or contain non-letters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColumnError(pub String);

impl fmt::Display for ParseColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid column reference '{}' - expected letters like 'A' or 'AB'", self.0)
    }
}

impl std::error::Error for ParseColumnError {}

impl FromStr for ColumnRef {
    type Err = ParseColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParseColumnError(s.to_string()));
        }

        let mut index: usize = 0;
        for c in trimmed.chars() {
            let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
            index = index
                .checked_mul(26)
                .and_then(|i| i.checked_add(digit))
                .ok_or_else(|| ParseColumnError(s.to_string()))?;
        }
        Ok(ColumnRef(index))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}

impl Serialize for ColumnRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.letters())
    }
}

impl<'de> Deserialize<'de> for ColumnRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_letters() {
        assert_eq!("A".parse::<ColumnRef>().unwrap().index(), 1);
        assert_eq!("d".parse::<ColumnRef>().unwrap().index(), 4);
        assert_eq!("Z".parse::<ColumnRef>().unwrap().index(), 26);
    }

    #[test]
    fn test_parse_double_letters() {
        assert_eq!("AA".parse::<ColumnRef>().unwrap().index(), 27);
        assert_eq!("AZ".parse::<ColumnRef>().unwrap().index(), 52);
        assert_eq!("BA".parse::<ColumnRef>().unwrap().index(), 53);
    }

    #[test]
    fn test_letters_round_trip_boundaries() {
        for index in [1, 26, 27, 52, 702, 703] {
            let col = ColumnRef::new(index).unwrap();
            assert_eq!(col.letters().parse::<ColumnRef>().unwrap(), col);
        }
        assert_eq!(ColumnRef::new(703).unwrap().letters(), "AAA");
    }

    #[test]
    fn test_rejects_invalid() {
        assert!("".parse::<ColumnRef>().is_err());
        assert!("A1".parse::<ColumnRef>().is_err());
        assert!("-".parse::<ColumnRef>().is_err());
        assert!(ColumnRef::new(0).is_none());
    }

    #[test]
    fn test_max_column_is_xfd() {
        assert_eq!(ColumnRef::MAX.letters(), "XFD");
        assert!("XFE".parse::<ColumnRef>().unwrap() > ColumnRef::MAX);
    }

    #[test]
    fn test_cell_address() {
        assert_eq!(ColumnRef::D.cell(7), "D7");
        assert_eq!(ColumnRef::D.offset(), 3);
    }
}
