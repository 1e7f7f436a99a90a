/*
 * package_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Reads written packages back and checks their parts.
 */

use std::io::{Cursor, Read};

use gxl_model::{Cell, CellRef, CellType, Merge, Sheet, Style, Workbook};
use gxl_xlsx::{XlsxWriteError, workbook_to_bytes, write_workbook};
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

fn sample_workbook() -> Workbook {
    let bold = Style {
        bold: true,
        ..Style::default()
    };
    let mut first = Sheet::new("S");
    first.cells = vec![
        Cell::new(CellRef::new(1, 1), "Hello", CellType::String).with_style(Some(bold.clone())),
        Cell::new(CellRef::new(1, 2), "World", CellType::String).with_style(Some(bold)),
        Cell::new(CellRef::new(2, 1), "3.5", CellType::Number),
        Cell::new(CellRef::new(2, 2), "=A2*2", CellType::Formula),
    ];
    first.merges = vec![Merge {
        range: "A3:B3".to_string(),
    }];

    let mut workbook = Workbook::new();
    workbook.sheets.push(first);
    workbook.sheets.push(Sheet::new("Second"));
    workbook
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing part {name}"));
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_package_contains_all_parts() {
    let bytes = workbook_to_bytes(&sample_workbook()).unwrap();
    let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/_rels/workbook.xml.rels",
            "xl/sharedStrings.xml",
            "xl/styles.xml",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
        ]
    );
}

#[test]
fn test_content_types_cover_every_worksheet() {
    let bytes = workbook_to_bytes(&sample_workbook()).unwrap();
    let types = read_part(&bytes, "[Content_Types].xml");
    assert!(types.contains(r#"PartName="/xl/worksheets/sheet1.xml""#));
    assert!(types.contains(r#"PartName="/xl/worksheets/sheet2.xml""#));
    assert!(types.contains(r#"<Default Extension="rels""#));
}

#[test]
fn test_identical_styles_produce_one_format() {
    let bytes = workbook_to_bytes(&sample_workbook()).unwrap();
    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains(r#"<cellXfs count="2">"#));

    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1" t="inlineStr"><is><t>Hello</t></is></c>"#));
    assert!(sheet.contains(r#"<c r="B1" s="1" t="inlineStr"><is><t>World</t></is></c>"#));
    assert!(sheet.contains(r#"<c r="A2"><v>3.5</v></c>"#));
    assert!(sheet.contains(r#"<c r="B2"><f>A2*2</f></c>"#));
    assert!(sheet.contains(r#"<mergeCell ref="A3:B3"/>"#));
}

#[test]
fn test_write_to_path_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    std::fs::write(&path, b"stale").unwrap();

    write_workbook(&sample_workbook(), &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains(r#"<sheet name="S" sheetId="1" r:id="rId1"/>"#));
    assert!(workbook.contains(r#"<sheet name="Second" sheetId="2" r:id="rId2"/>"#));

    // Only the destination remains; the temporary file was renamed away.
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_failed_write_leaves_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    std::fs::write(&path, b"previous").unwrap();

    let err = write_workbook(&Workbook::new(), &path).unwrap_err();
    assert!(matches!(err, XlsxWriteError::Invalid(_)));
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("out.xlsx");
    let err = write_workbook(&sample_workbook(), &path).unwrap_err();
    assert!(matches!(err, XlsxWriteError::Io(_)));
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Text content of every `<t>` element, read with a real XML parser.
fn inline_texts(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"t" => in_text = false,
            Event::Text(e) if in_text => texts.push(e.unescape().unwrap().into_owned()),
            Event::Eof => break,
            _ => {}
        }
    }
    texts
}

#[test]
fn test_control_characters_produce_well_formed_parts() {
    let mut sheet = Sheet::new("Ctl\u{1}");
    sheet.cells = vec![
        Cell::new(CellRef::new(1, 1), "bell\u{7}vt\u{b}", CellType::String),
        Cell::new(CellRef::new(1, 2), "=\"a\u{8}\"", CellType::Formula),
    ];
    let mut workbook = Workbook::new();
    workbook.sheets.push(sheet);
    let bytes = workbook_to_bytes(&workbook).unwrap();

    for part in ["xl/worksheets/sheet1.xml", "xl/workbook.xml"] {
        let xml = read_part(&bytes, part);
        let illegal: Vec<u32> = xml.chars().filter(|c| !is_xml_char(*c)).map(u32::from).collect();
        assert!(illegal.is_empty(), "{part}: {illegal:?}");
    }

    let sheet_xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert_eq!(inline_texts(&sheet_xml), vec!["bell\u{FFFD}vt\u{FFFD}".to_string()]);
    assert!(sheet_xml.contains("<f>&quot;a\u{FFFD}&quot;</f>"));
    assert!(read_part(&bytes, "xl/workbook.xml").contains("<sheet name=\"Ctl\u{FFFD}\""));
}

#[test]
fn test_sheet_names_excel_rejects_are_invalid() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "Q1/Q2 [draft]: a name that is far longer than thirty-one",
        "Q1/Q2",
        "abcdefghijklmnopqrstuvwxyz012345",
    ] {
        let mut workbook = Workbook::new();
        workbook.sheets.push(Sheet::new(name));
        let path = dir.path().join("out.xlsx");
        let err = write_workbook(&workbook, &path).unwrap_err();
        assert!(matches!(err, XlsxWriteError::Invalid(_)), "{name}");
        assert!(!path.exists());
    }

    let mut workbook = Workbook::new();
    workbook.sheets.push(Sheet::new("abcdefghijklmnopqrstuvwxyz01234"));
    assert!(workbook_to_bytes(&workbook).is_ok());
}
