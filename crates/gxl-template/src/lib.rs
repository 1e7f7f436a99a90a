/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template interpreter for gxl workbooks.
//!
//! Takes a parsed [`gxl_markup::Template`] and a data value and produces a
//! [`gxl_model::Workbook`]:
//!
//! - Variable interpolation in cells and attributes: `{{ customer.name }}`
//! - Type hints: `{{ total:number }}`, `{{ paid:bool }}`, `{{ due:date }}`
//! - Loops with `loop.index` / `loop.number`: `<For each="row in rows">`
//! - Conditionals: `<If cond="show_totals">...<Else/>...</If>`
//! - Cross-file imports: `<Import src="shared.gxl" sheet="Legend"/>`
//! - Inline emphasis in cells: `**bold**` and `_italic_`
//!
//! # Example
//!
//! ```ignore
//! use gxl_template::{Value, render};
//!
//! let template = gxl_markup::parse(
//!     r#"<GXL><Sheet name="S"><Grid ref="A1">| Hello | {{ name }} |</Grid></Sheet></GXL>"#,
//! )?;
//! let data = Value::from(serde_json::json!({ "name": "World" }));
//! let workbook = render(&template, data)?;
//! assert_eq!(workbook.sheets[0].cell_a1("B1").unwrap().value, "World");
//! ```

pub mod book;
pub mod context;
pub mod error;
pub mod eval_context;
pub mod evaluator;
pub mod expand;
pub mod resolver;
pub mod styling;

// Re-export main types at crate root
pub use book::render_book;
pub use context::{ContextStack, Scope, Value};
pub use error::{RenderError, RenderResult};
pub use eval_context::{DEFAULT_MAX_IMPORT_DEPTH, Diagnostic, DiagnosticCollector, RenderOptions};
pub use evaluator::render_sheet;
pub use expand::{CellContent, expand_cell, expand_text, infer_type};
pub use resolver::{FileSystemLoader, MemoryLoader, SourceLoader};

use gxl_markup::Template;
use gxl_model::Workbook;

/// Render with default options, reading imports from the filesystem.
/// Diagnostics are logged and otherwise discarded.
pub fn render(template: &Template, data: Value) -> RenderResult<Workbook> {
    let mut diagnostics = DiagnosticCollector::new();
    render_with(
        template,
        data,
        &RenderOptions::default(),
        &FileSystemLoader,
        &mut diagnostics,
    )
}

/// Render with explicit options, loader and diagnostic sink.
pub fn render_with(
    template: &Template,
    data: Value,
    options: &RenderOptions,
    loader: &dyn SourceLoader,
    diagnostics: &mut DiagnosticCollector,
) -> RenderResult<Workbook> {
    render_book(template, data.into_root_scope(), options, loader, diagnostics)
}
