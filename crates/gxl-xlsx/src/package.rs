/*
 * package.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Zip emission of the complete package.
//!
//! Parts written, in order: `_rels/.rels`, `[Content_Types].xml`,
//! `xl/_rels/workbook.xml.rels`, `xl/workbook.xml`, one
//! `xl/worksheets/sheetN.xml` per sheet, `xl/sharedStrings.xml` (always empty,
//! cells use inline strings) and `xl/styles.xml`.

use std::collections::HashSet;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use gxl_model::Workbook;
use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Result, XlsxWriteError};
use crate::styles::StyleCollector;
use crate::worksheet::worksheet_xml;
use crate::xml::escape_text;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Write `workbook` to `path`.
///
/// The package is assembled in a temporary file next to `path` and renamed
/// into place once complete, so a failed write leaves any existing file
/// untouched.
pub fn write_workbook(workbook: &Workbook, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    write_workbook_to_writer(workbook, tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.persist(path).map_err(|err| XlsxWriteError::Io(err.error))?;

    tracing::debug!(path = %path.display(), sheets = workbook.sheets.len(), "wrote package");
    Ok(())
}

/// Serialize `workbook` into an in-memory package.
pub fn workbook_to_bytes(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_workbook_to_writer(workbook, &mut cursor)?;
    Ok(cursor.into_inner())
}

pub fn write_workbook_to_writer<W: Write + Seek>(workbook: &Workbook, writer: W) -> Result<()> {
    validate(workbook)?;

    let mut zip = ZipWriter::new(writer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let styles = StyleCollector::from_workbook(workbook);
    tracing::debug!(formats = styles.len(), "interned cell styles");

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels_xml().as_bytes())?;

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(workbook).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml(workbook).as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(workbook).as_bytes())?;

    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)?;
        zip.write_all(worksheet_xml(sheet, &styles).as_bytes())?;
    }

    zip.start_file("xl/sharedStrings.xml", options)?;
    zip.write_all(shared_strings_xml().as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(styles.styles_xml().as_bytes())?;

    zip.finish()?;
    Ok(())
}

/// Longest sheet name Excel accepts, in UTF-16 code units.
const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Reject workbooks spreadsheet applications refuse to open.
fn validate(workbook: &Workbook) -> Result<()> {
    if workbook.sheets.is_empty() {
        return Err(XlsxWriteError::Invalid("workbook has no sheets".to_string()));
    }
    let mut seen = HashSet::new();
    for sheet in &workbook.sheets {
        validate_sheet_name(&sheet.name)?;
        if !seen.insert(sheet.name.to_lowercase()) {
            return Err(XlsxWriteError::Invalid(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
    }
    Ok(())
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(XlsxWriteError::Invalid("sheet name is empty".to_string()));
    }
    if name.encode_utf16().count() > MAX_SHEET_NAME_LEN {
        return Err(XlsxWriteError::Invalid(format!(
            "sheet name '{}' is longer than {} UTF-16 code units",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(c)) {
        return Err(XlsxWriteError::Invalid(format!(
            "sheet name '{}' contains '{}'",
            name, c
        )));
    }
    Ok(())
}

fn root_rels_xml() -> String {
    format!(
        r#"{XML_HEADER}
<Relationships xmlns="{REL_NS}">
  <Relationship Id="rId1" Type="{REL_TYPE_BASE}/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
    )
}

fn content_types_xml(workbook: &Workbook) -> String {
    let mut overrides = String::new();
    overrides.push_str(
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    overrides.push_str(
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    overrides.push_str(
        r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    for sheet_number in 1..=workbook.sheets.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{sheet_number}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }

    format!(
        r#"{XML_HEADER}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  {overrides}
</Types>"#
    )
}

fn workbook_rels_xml(workbook: &Workbook) -> String {
    let mut rels = String::new();
    let count = workbook.sheets.len();
    for id in 1..=count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{id}" Type="{REL_TYPE_BASE}/worksheet" Target="worksheets/sheet{id}.xml"/>"#
        ));
    }
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_TYPE_BASE}/styles" Target="styles.xml"/>"#,
        count + 1
    ));
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_TYPE_BASE}/sharedStrings" Target="sharedStrings.xml"/>"#,
        count + 2
    ));

    format!(
        r#"{XML_HEADER}
<Relationships xmlns="{REL_NS}">
  {rels}
</Relationships>"#
    )
}

fn workbook_xml(workbook: &Workbook) -> String {
    let sheets: String = workbook
        .sheets
        .iter()
        .enumerate()
        .map(|(idx, sheet)| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_text(&sheet.name),
                idx + 1,
                idx + 1
            )
        })
        .collect();

    format!(
        r#"{XML_HEADER}
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="{REL_TYPE_BASE}">
  <sheets>{sheets}</sheets>
</workbook>"#
    )
}

fn shared_strings_xml() -> String {
    format!(
        r#"{XML_HEADER}
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="0" uniqueCount="0"/>"#
    )
}
