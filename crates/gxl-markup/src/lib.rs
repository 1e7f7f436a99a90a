/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template markup for gxl workbooks.
//!
//! A template is an XML document describing a workbook:
//!
//! ```xml
//! <GXL>
//!   <Header><Title>Sales</Title></Header>
//!   <Book name="sales"/>
//!   <Import src="shared.gxl" sheet="Legend"/>
//!   <Sheet name="Summary" col_width="14">
//!     <Grid ref="A1" font="Arial">
//!       | Region | Total              |
//!     </Grid>
//!     <For each="r in regions">
//!       <Grid>| {{ r.name }} | {{ r.total:number }} |</Grid>
//!     </For>
//!   </Sheet>
//! </GXL>
//! ```
//!
//! This crate turns such documents into a [`Template`] node tree ([`parse`])
//! and re-indents them with aligned grid tables ([`format`]). It does not
//! evaluate expressions; that happens in the template interpreter.

pub mod ast;
pub mod error;
pub mod format;
pub mod parser;
pub mod xml;

pub use ast::{
    Anchor, Book, BookNode, ChartNode, Conditional, ForLoop, Grid, GridRow, Header, ImageNode,
    Import, MergeNode, Node, PivotNode, ShapeNode, SheetNode, SheetSettings, StyleHints,
    StyleRule, Template, parse_grid_rows,
};
pub use error::{MarkupError, Result};
pub use format::{align_grid, format, format_str};
pub use parser::{parse, parse_bytes};
pub use xml::MAX_NESTING_DEPTH;
