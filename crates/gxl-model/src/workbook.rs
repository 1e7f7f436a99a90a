/*
 * workbook.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The rendered document: workbooks, sheets, cells and drawing entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::CellRef;
use crate::style::Style;

/// How a cell value is stored in the package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    String,
    Number,
    Boolean,
    /// Kept as display text; no serial-date conversion is performed.
    Date,
    Formula,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub reference: CellRef,
    pub value: String,
    pub cell_type: CellType,
    pub style: Option<Style>,
}

impl Cell {
    pub fn new(reference: CellRef, value: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            reference,
            value: value.into(),
            cell_type,
            style: None,
        }
    }

    pub fn with_style(mut self, style: Option<Style>) -> Self {
        self.style = style;
        self
    }
}

/// A merged region, kept as the literal range text from the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    pub range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub reference: String,
    pub source: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub reference: String,
    pub kind: String,
    pub text: String,
    pub style: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub reference: String,
    pub chart_type: String,
    pub data_range: String,
    pub title: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    pub reference: String,
    pub source_range: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<String>,
    pub filters: Vec<String>,
    pub options: BTreeMap<String, String>,
}

/// An explicit column width, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnWidth {
    pub column: u32,
    pub width: f64,
}

/// An explicit row height, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowHeight {
    pub row: u32,
    pub height: f64,
}

/// Per-sheet layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Points.
    pub default_row_height: f64,
    /// Characters.
    pub default_column_width: f64,
    pub column_widths: Vec<ColumnWidth>,
    pub row_heights: Vec<RowHeight>,
    /// First unfrozen cell, e.g. `B2` freezes row 1 and column A.
    pub freeze_pane: Option<CellRef>,
    pub show_grid_lines: bool,
    pub show_row_col_headers: bool,
}

impl SheetConfig {
    pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;
    pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

    pub fn column_width(&self, column: u32) -> Option<f64> {
        self.column_widths
            .iter()
            .rev()
            .find(|c| c.column == column)
            .map(|c| c.width)
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights
            .iter()
            .rev()
            .find(|r| r.row == row)
            .map(|r| r.height)
    }

    /// Whether any setting requires a sheet view element.
    pub fn has_custom_view(&self) -> bool {
        self.freeze_pane.is_some() || !self.show_grid_lines || !self.show_row_col_headers
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            default_row_height: Self::DEFAULT_ROW_HEIGHT,
            default_column_width: Self::DEFAULT_COLUMN_WIDTH,
            column_widths: Vec::new(),
            row_heights: Vec::new(),
            freeze_pane: None,
            show_grid_lines: true,
            show_row_col_headers: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub cells: Vec<Cell>,
    pub merges: Vec<Merge>,
    pub images: Vec<Image>,
    pub shapes: Vec<Shape>,
    pub charts: Vec<Chart>,
    pub pivots: Vec<PivotTable>,
    pub config: SheetConfig,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The last cell emitted at `reference`, if any.
    pub fn cell(&self, reference: CellRef) -> Option<&Cell> {
        self.cells.iter().rev().find(|c| c.reference == reference)
    }

    /// Convenience lookup by A1 text; malformed references yield `None`.
    pub fn cell_a1(&self, a1: &str) -> Option<&Cell> {
        CellRef::from_a1(a1).ok().and_then(|r| self.cell(r))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}
