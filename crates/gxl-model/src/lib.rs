/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document model for gxl workbooks.
//!
//! This crate holds the value types shared by every stage of the pipeline:
//!
//! - [`CellRef`] / [`CellRange`]: the A1 coordinate codec
//! - [`units`]: column-width and row-height literal conversion
//! - [`Style`] / [`Border`]: cell formatting and the cascade merge
//! - [`Workbook`] / [`Sheet`] / [`Cell`]: the rendered document
//!
//! Nothing here performs I/O. The markup parser, the template interpreter and
//! the xlsx encoder all build on these types.

pub mod address;
pub mod style;
pub mod units;
pub mod workbook;

pub use address::{
    A1ParseError, CellRange, CellRef, MAX_COLUMNS, MAX_ROWS, column_index, column_name,
};
pub use style::{
    Border, BorderSides, BorderStyle, HorizontalAlign, Style, VerticalAlign, merge_styles,
    normalize_color,
};
pub use units::{UnitError, parse_col_width, parse_row_height};
pub use workbook::{
    Cell, CellType, Chart, ColumnWidth, Image, Merge, PivotTable, RowHeight, Shape, Sheet,
    SheetConfig, Workbook,
};
