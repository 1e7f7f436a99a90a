/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! OOXML spreadsheet writer for [`gxl_model::Workbook`].
//!
//! Cells are written as inline strings, numbers, booleans or formulas. Cell
//! styles are interned so each distinct style becomes exactly one cell format.
//! Drawing entities (images, shapes, charts, pivots) are not encoded.

pub mod error;
pub mod package;
pub mod styles;
pub mod worksheet;
mod xml;

pub use error::{Result, XlsxWriteError};
pub use package::{workbook_to_bytes, write_workbook, write_workbook_to_writer};
pub use styles::{StyleCollector, font_family};
pub use worksheet::worksheet_xml;
