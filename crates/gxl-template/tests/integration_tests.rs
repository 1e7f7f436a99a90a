/*
 * integration_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for gxl-template using test fixtures.
 */

use gxl_markup::Template;
use gxl_model::{CellRef, CellType, Workbook};
use gxl_template::{
    DiagnosticCollector, FileSystemLoader, RenderError, RenderOptions, Value, render, render_with,
};
use std::path::Path;

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> std::path::PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

/// Helper to load a template from fixtures, keeping its source path
fn load_template(name: &str) -> Template {
    let path = fixture_path(name);
    let bytes = std::fs::read(&path).unwrap_or_else(|_| panic!("Failed to read: {}", name));
    let mut template = gxl_markup::parse_bytes(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse template {}: {}", name, e));
    template.source_path = Some(path);
    template
}

fn load_data(name: &str) -> Value {
    let text = std::fs::read_to_string(fixture_path(name)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    Value::from(json)
}

fn value_at(workbook: &Workbook, sheet: &str, a1: &str) -> (String, CellType) {
    let cell = workbook
        .sheet(sheet)
        .and_then(|s| s.cell_a1(a1))
        .unwrap_or_else(|| panic!("no cell {}!{}", sheet, a1));
    (cell.value.clone(), cell.cell_type)
}

#[test]
fn test_invoice_renders_all_sheets() {
    let workbook = render(&load_template("invoice.gxl"), load_data("invoice.json")).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Invoice", "Legend"]);
}

#[test]
fn test_invoice_cells() {
    let workbook = render(&load_template("invoice.gxl"), load_data("invoice.json")).unwrap();

    assert_eq!(
        value_at(&workbook, "Invoice", "B1"),
        ("INV-042".to_string(), CellType::String)
    );
    assert_eq!(
        value_at(&workbook, "Invoice", "A4"),
        ("Widget".to_string(), CellType::String)
    );
    assert_eq!(
        value_at(&workbook, "Invoice", "B4"),
        ("2".to_string(), CellType::Number)
    );
    assert_eq!(
        value_at(&workbook, "Invoice", "C5"),
        ("24".to_string(), CellType::Number)
    );
    assert_eq!(
        value_at(&workbook, "Invoice", "F1"),
        ("=SUM(C4:C5)".to_string(), CellType::Formula)
    );
    assert_eq!(
        value_at(&workbook, "Invoice", "C6"),
        ("2025-03-31".to_string(), CellType::Date)
    );
}

#[test]
fn test_invoice_styles_and_config() {
    let workbook = render(&load_template("invoice.gxl"), load_data("invoice.json")).unwrap();
    let sheet = workbook.sheet("Invoice").unwrap();

    let title = sheet.cell_a1("A1").unwrap().style.as_ref().unwrap();
    assert!(title.bold);
    assert_eq!(title.font_size, Some(14));

    let header = sheet.cell_a1("B3").unwrap().style.as_ref().unwrap();
    assert_eq!(header.fill_color.as_deref(), Some("DDDDDD"));
    assert!(header.border.is_some());

    let due = sheet.cell_a1("B6").unwrap();
    assert_eq!(due.value, "due");
    assert!(due.style.as_ref().unwrap().italic);

    assert_eq!(sheet.config.default_column_width, 12.0);
    assert_eq!(sheet.config.freeze_pane, Some(CellRef::new(4, 1)));
    assert_eq!(sheet.merges.len(), 1);
}

#[test]
fn test_paid_branch() {
    let mut data = load_data("invoice.json");
    if let Value::Map(map) = &mut data {
        map.insert("paid".to_string(), Value::Bool(true));
    }
    let workbook = render(&load_template("invoice.gxl"), data).unwrap();
    let paid = workbook.sheet("Invoice").unwrap().cell_a1("B6").unwrap();
    assert_eq!(paid.value, "PAID");
    assert!(paid.style.as_ref().unwrap().bold);
    assert!(workbook.sheet("Invoice").unwrap().cell_a1("C6").is_none());
}

#[test]
fn test_imported_sheet_shares_data() {
    let workbook = render(&load_template("invoice.gxl"), load_data("invoice.json")).unwrap();
    assert_eq!(
        value_at(&workbook, "Legend", "B1"),
        ("INV-042".to_string(), CellType::String)
    );
}

#[test]
fn test_circular_fixture() {
    let err = render(&load_template("cycle_a.gxl"), Value::Null).unwrap_err();
    match err {
        RenderError::CircularImport { path } => assert!(path.ends_with("cycle_a.gxl")),
        other => panic!("expected circular import, got {other:?}"),
    }
}

fn write_chain(dir: &Path, length: usize) {
    for i in 1..=length {
        let body = if i == length {
            r#"<GXL><Sheet name="End"><Grid>| bottom |</Grid></Sheet></GXL>"#.to_string()
        } else {
            format!(r#"<GXL><Import src="f{}.gxl" sheet="End"/></GXL>"#, i + 1)
        };
        std::fs::write(dir.join(format!("f{}.gxl", i)), body).unwrap();
    }
}

fn render_chain(length: usize) -> Result<Workbook, RenderError> {
    let dir = tempfile::tempdir().unwrap();
    write_chain(dir.path(), length);
    let template = gxl_markup::parse(r#"<GXL><Import src="f1.gxl" sheet="End"/></GXL>"#).unwrap();
    let options = RenderOptions {
        base_dir: Some(dir.path().to_path_buf()),
        ..RenderOptions::default()
    };
    let mut diagnostics = DiagnosticCollector::new();
    render_with(
        &template,
        Value::Null,
        &options,
        &FileSystemLoader,
        &mut diagnostics,
    )
}

#[test]
fn test_import_chain_within_limit() {
    let workbook = render_chain(9).unwrap();
    assert_eq!(workbook.sheets[0].cells[0].value, "bottom");
}

#[test]
fn test_import_chain_over_limit() {
    let err = render_chain(11).unwrap_err();
    assert!(matches!(err, RenderError::ImportDepthExceeded { .. }));
}

#[test]
fn test_missing_import_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let template =
        gxl_markup::parse(r#"<GXL><Import src="absent.gxl" sheet="X"/></GXL>"#).unwrap();
    let options = RenderOptions {
        base_dir: Some(dir.path().to_path_buf()),
        ..RenderOptions::default()
    };
    let mut diagnostics = DiagnosticCollector::new();
    let err = render_with(
        &template,
        Value::Null,
        &options,
        &FileSystemLoader,
        &mut diagnostics,
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::MissingFile { .. }));
}
