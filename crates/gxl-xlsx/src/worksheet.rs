/*
 * worksheet.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The `xl/worksheets/sheetN.xml` part.

use std::collections::BTreeMap;

use gxl_model::{Cell, CellRef, CellType, MAX_COLUMNS, MAX_ROWS, Sheet, SheetConfig};

use crate::styles::StyleCollector;
use crate::xml::escape_text;

/// Render one worksheet part. Styles must already be interned in `styles`.
pub fn worksheet_xml(sheet: &Sheet, styles: &StyleCollector) -> String {
    // Excel expects rows and the cells within a row in ascending order.
    // Inserting in render order means a later cell at the same coordinate wins.
    let mut rows: BTreeMap<u32, BTreeMap<u32, &Cell>> = BTreeMap::new();
    for cell in &sheet.cells {
        let CellRef { row, col } = cell.reference;
        if row == 0 || col == 0 || row > MAX_ROWS || col > MAX_COLUMNS {
            tracing::warn!(
                sheet = %sheet.name,
                cell = %cell.reference,
                "cell is outside the worksheet bounds and was dropped"
            );
            continue;
        }
        rows.entry(row).or_default().insert(col, cell);
    }

    let config = &sheet.config;
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    xml.push('\n');

    if config.has_custom_view() {
        xml.push_str("  ");
        xml.push_str(&sheet_views_xml(config));
        xml.push('\n');
    }

    xml.push_str(&format!(
        "  <sheetFormatPr defaultRowHeight=\"{}\" defaultColWidth=\"{}\"/>\n",
        config.default_row_height, config.default_column_width
    ));

    let cols = cols_xml(config);
    if !cols.is_empty() {
        xml.push_str("  ");
        xml.push_str(&cols);
        xml.push('\n');
    }

    xml.push_str("  <sheetData>");
    for (row, cells) in &rows {
        match config.row_height(*row) {
            Some(height) => xml.push_str(&format!(
                r#"<row r="{}" ht="{}" customHeight="1">"#,
                row, height
            )),
            None => xml.push_str(&format!(r#"<row r="{}">"#, row)),
        }
        for cell in cells.values() {
            xml.push_str(&cell_xml(cell, styles.id(cell.style.as_ref())));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>\n");

    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"  <mergeCells count="{}">"#, sheet.merges.len()));
        for merge in &sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, escape_text(&merge.range)));
        }
        xml.push_str("</mergeCells>\n");
    }

    xml.push_str("</worksheet>");
    xml
}

fn sheet_views_xml(config: &SheetConfig) -> String {
    let mut view = String::from(r#"<sheetView workbookViewId="0""#);
    if !config.show_grid_lines {
        view.push_str(r#" showGridLines="0""#);
    }
    if !config.show_row_col_headers {
        view.push_str(r#" showRowColHeaders="0""#);
    }

    let pane = config.freeze_pane.and_then(pane_xml);
    match pane {
        Some(pane) => format!("<sheetViews>{}>{}</sheetView></sheetViews>", view, pane),
        None => format!("<sheetViews>{}/></sheetViews>", view),
    }
}

/// Frozen pane whose top-left unfrozen cell is `top_left`. `A1` freezes
/// nothing.
fn pane_xml(top_left: CellRef) -> Option<String> {
    let (Some(x_split), Some(y_split)) = (top_left.col.checked_sub(1), top_left.row.checked_sub(1))
    else {
        return None;
    };
    let active = match (x_split > 0, y_split > 0) {
        (true, true) => "bottomRight",
        (false, true) => "bottomLeft",
        (true, false) => "topRight",
        (false, false) => return None,
    };

    let mut pane = String::from("<pane");
    if x_split > 0 {
        pane.push_str(&format!(r#" xSplit="{}""#, x_split));
    }
    if y_split > 0 {
        pane.push_str(&format!(r#" ySplit="{}""#, y_split));
    }
    pane.push_str(&format!(
        r#" topLeftCell="{}" activePane="{}" state="frozen"/>"#,
        top_left, active
    ));
    Some(pane)
}

fn cols_xml(config: &SheetConfig) -> String {
    // Last override for a column wins.
    let widths: BTreeMap<u32, f64> = config
        .column_widths
        .iter()
        .map(|c| (c.column, c.width))
        .collect();
    if widths.is_empty() {
        return String::new();
    }
    let cols: String = widths
        .iter()
        .map(|(col, width)| {
            format!(
                r#"<col min="{}" max="{}" width="{}" customWidth="1"/>"#,
                col, col, width
            )
        })
        .collect();
    format!("<cols>{}</cols>", cols)
}

fn cell_xml(cell: &Cell, style_id: u32) -> String {
    let mut attrs = format!(r#" r="{}""#, cell.reference);
    if style_id != 0 {
        attrs.push_str(&format!(r#" s="{}""#, style_id));
    }

    match cell.cell_type {
        CellType::Number if is_numeric(&cell.value) => {
            format!("<c{}><v>{}</v></c>", attrs, cell.value.trim())
        }
        CellType::Boolean => {
            let truthy = cell.value.trim().eq_ignore_ascii_case("true") || cell.value.trim() == "1";
            format!(
                r#"<c{} t="b"><v>{}</v></c>"#,
                attrs,
                if truthy { 1 } else { 0 }
            )
        }
        CellType::Formula => {
            let formula = cell.value.strip_prefix('=').unwrap_or(&cell.value);
            format!("<c{}><f>{}</f></c>", attrs, escape_text(formula))
        }
        // Dates stay as display text: no serial conversion.
        CellType::Number | CellType::Date | CellType::String | CellType::Auto => {
            inline_string_xml(&attrs, &cell.value)
        }
    }
}

fn inline_string_xml(attrs: &str, text: &str) -> String {
    let preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    let space = if preserve { r#" xml:space="preserve""# } else { "" };
    format!(
        r#"<c{} t="inlineStr"><is><t{}>{}</t></is></c>"#,
        attrs,
        space,
        escape_text(text)
    )
}

/// A number hint on text that is not a number is written as a string so the
/// package stays valid.
fn is_numeric(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok_and(f64::is_finite)
}
