use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

//==============================================================================
// Sheet names
//==============================================================================

/// Name of a spreadsheet, used as the store partition key. Created on first
/// reference; "clear" empties the cells but keeps the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SheetName(String);

impl SheetName {
    /// Alphanumeric, underscore, hyphen or space; at least one character.
    pub fn is_valid(raw: &str) -> bool {
        let re = Regex::new(r"^[\w\- ]+$").expect("sheet name pattern");
        re.is_match(raw)
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(StoreError::BadRequest(format!(
                "bad spreadsheet name \"{raw}\": must contain only alphanumeric \
                 characters, underscore, hyphen or space"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Wire input goes through `parse`, so a name read off the wire is as
// validated as one built locally.
impl<'de> Deserialize<'de> for SheetName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        SheetName::parse(&raw).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

//==============================================================================
// Cell ids
//==============================================================================

/// A cell coordinate: one letter followed by one or two digits. Input is
/// case-insensitive; the canonical form is lowercase, display form uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    pub fn is_valid(raw: &str) -> bool {
        let re = Regex::new(r"^[a-zA-Z]\d\d?$").expect("cell id pattern");
        re.is_match(raw)
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        if Self::is_valid(raw) {
            Ok(Self(raw.to_lowercase()))
        } else {
            Err(StoreError::BadRequest(format!(
                "bad cell id \"{raw}\": must consist of a letter followed by \
                 one or two digits"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used in page headers and menu labels.
    pub fn label(&self) -> String {
        self.0.to_uppercase()
    }

    /// Zero-based column index (`a` -> 0, `b` -> 1, ...).
    pub fn col_index(&self) -> usize {
        let c = self.0.as_bytes()[0];
        (c - b'a') as usize
    }

    /// One-based row number.
    pub fn row(&self) -> usize {
        self.0[1..].parse().expect("validated digits")
    }

    /// Build a canonical cell id from a zero-based column and one-based row.
    /// Returns None outside the addressable `a1`..`z99` range.
    pub fn from_coords(col: usize, row: usize) -> Option<Self> {
        if col >= 26 || row == 0 || row > 99 {
            return None;
        }
        let letter = (b'a' + col as u8) as char;
        Some(Self(format!("{letter}{row}")))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CellId::parse(&raw).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

//==============================================================================
// Cell projections
//==============================================================================

/// Query-time projection of one cell. `value` is derived by the evaluation
/// engine, never stored independently of `formula`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub formula: String,
    pub value: String,
}

impl CellRecord {
    pub fn has_formula(&self) -> bool {
        !self.formula.is_empty()
    }
}

/// `[cellId, formula]` pair as carried on the wire and in store reads.
pub type CellPair = (CellId, String);

//==============================================================================
// Commands
//==============================================================================

/// Validated, typed mutation. A `Command` is only constructed once every
/// required field is present and well-formed; partially-valid input yields a
/// field error map instead (see `validate`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    UpdateCell { cell_id: CellId, formula: String },
    DeleteCell { cell_id: CellId },
    ClearAll,
    ReplaceAll { pairs: Vec<CellPair> },
    CopyCell { dest: CellId, src: CellId },
}
