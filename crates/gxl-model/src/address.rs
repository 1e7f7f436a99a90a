/*
 * address.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! A1 coordinate codec.
//!
//! Rows and columns are **1-based** throughout gxl: `CellRef::new(1, 1)` is
//! `A1`, `CellRef::new(12, 2)` is `B12`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest column index accepted by the codec (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Largest row index accepted by the codec.
pub const MAX_ROWS: u32 = 1_048_576;

/// Errors produced while decoding an A1 reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum A1ParseError {
    #[error("empty cell reference")]
    Empty,

    #[error("missing column letters in '{0}'")]
    MissingColumn(String),

    #[error("missing row number in '{0}'")]
    MissingRow(String),

    #[error("column out of range in '{0}'")]
    InvalidColumn(String),

    #[error("row out of range in '{0}'")]
    InvalidRow(String),

    #[error("unexpected characters in '{0}'")]
    TrailingCharacters(String),
}

/// A single cell coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// 1-based row.
    pub row: u32,
    /// 1-based column.
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Encode as A1 text, e.g. `B12`.
    pub fn to_a1(self) -> String {
        format!("{}{}", column_name(self.col), self.row)
    }

    /// Decode A1 text. Lower-case letters and `$` absolute markers are accepted.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        if s.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let bytes = s.as_bytes();
        let mut idx = 0usize;
        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(A1ParseError::MissingColumn(s.to_string()));
        }
        let col_end = idx;

        if bytes.get(idx) == Some(&b'$') {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == row_start {
            return Err(A1ParseError::MissingRow(s.to_string()));
        }
        if idx != bytes.len() {
            return Err(A1ParseError::TrailingCharacters(s.to_string()));
        }

        let col = column_index(&s[col_start..col_end])
            .map_err(|_| A1ParseError::InvalidColumn(s.to_string()))?;
        let row: u32 = s[row_start..idx]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow(s.to_string()))?;
        if row == 0 || row > MAX_ROWS {
            return Err(A1ParseError::InvalidRow(s.to_string()));
        }

        Ok(Self { row, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

/// An inclusive rectangle of cells, normalized so `start <= end` on both axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Parse `A1:C3`, or a single reference which yields a one-cell range.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        let s = a1.trim();
        match s.split_once(':') {
            None => {
                let cell = CellRef::from_a1(s)?;
                Ok(Self::new(cell, cell))
            }
            Some((a, b)) => Ok(Self::new(CellRef::from_a1(a)?, CellRef::from_a1(b)?)),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Convert a 1-based column index to its letters (`1 -> A`, `27 -> AA`).
///
/// Index 0 has no letters and yields an empty string.
pub fn column_name(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a 1-based index (`A -> 1`, `AA -> 27`).
pub fn column_index(name: &str) -> Result<u32, A1ParseError> {
    let name = name.trim();
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(A1ParseError::MissingColumn(name.to_string()));
    }
    let mut col: u32 = 0;
    for b in name.bytes() {
        let digit = u32::from(b.to_ascii_uppercase() - b'A' + 1);
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| A1ParseError::InvalidColumn(name.to_string()))?;
    }
    if col > MAX_COLUMNS {
        return Err(A1ParseError::InvalidColumn(name.to_string()));
    }
    Ok(col)
}
