/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The gxl pipeline: template file → node tree → workbook → xlsx package.
//!
//! ```ignore
//! let template = gxl_core::parse_template("report.gxl")?;
//! let data = gxl_core::load_data("report.yaml")?;
//! let workbook = gxl_core::render(&template, data)?;
//! gxl_core::write(&workbook, "report.xlsx")?;
//! ```
//!
//! None of these functions install a `tracing` subscriber; they only emit
//! events.

pub mod config;
pub mod data;
pub mod error;

use std::path::Path;

pub use config::RenderConfig;
pub use data::{DataSyntax, load_data, parse_data};
pub use error::{GxlError, Result};

pub use gxl_markup::Template;
pub use gxl_model::Workbook;
pub use gxl_template::{Diagnostic, DiagnosticCollector, FileSystemLoader, RenderOptions, Value};

use error::read_file;

/// Parse a template file. The path is recorded on the tree so relative
/// imports resolve against the template's directory.
pub fn parse_template(path: impl AsRef<Path>) -> Result<Template> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let mut template = gxl_markup::parse_bytes(&bytes)?;
    template.source_path = Some(path.to_path_buf());
    tracing::debug!(
        path = %path.display(),
        sheets = template.sheets().count(),
        imports = template.imports().count(),
        "parsed template"
    );
    Ok(template)
}

/// Render a template with the default configuration.
pub fn render(template: &Template, data: Value) -> Result<Workbook> {
    let mut diagnostics = DiagnosticCollector::new();
    render_with(template, data, &RenderConfig::default(), &mut diagnostics)
}

/// Render a template, collecting non-fatal findings into `diagnostics`.
pub fn render_with(
    template: &Template,
    data: Value,
    config: &RenderConfig,
    diagnostics: &mut DiagnosticCollector,
) -> Result<Workbook> {
    let options = RenderOptions::from(config);
    let workbook =
        gxl_template::render_with(template, data, &options, &FileSystemLoader, diagnostics)?;
    Ok(workbook)
}

/// Pretty-print a template file, returning the formatted bytes.
pub fn format(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let bytes = read_file(path.as_ref())?;
    Ok(gxl_markup::format(&bytes)?)
}

/// Write a workbook as an xlsx package.
pub fn write(workbook: &Workbook, path: impl AsRef<Path>) -> Result<()> {
    gxl_xlsx::write_workbook(workbook, path)?;
    Ok(())
}
