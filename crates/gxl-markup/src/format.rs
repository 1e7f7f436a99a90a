/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pretty-printer for template markup.
//!
//! Output rules:
//! - an XML declaration header is always written first
//! - nesting is indented two spaces per level
//! - elements without children or text collapse to `<Tag .../>`
//! - text-only elements close on the same line
//! - comments keep their position, each on its own line
//! - `<Grid>` bodies are re-flowed so that the `|` columns line up

use quick_xml::escape::{escape, partial_escape};

use crate::ast::GridRow;
use crate::error::Result;
use crate::xml::{XmlContent, XmlDocument, XmlElement, read_document_bytes};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const INDENT: &str = "  ";

/// Re-indent template markup and align grid tables.
pub fn format(source: &[u8]) -> Result<Vec<u8>> {
    let doc = read_document_bytes(source)?;
    Ok(format_document(&doc).into_bytes())
}

/// Like [`format`], for string input.
pub fn format_str(source: &str) -> Result<String> {
    format(source.as_bytes()).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn format_document(doc: &XmlDocument) -> String {
    let mut out = String::from(XML_HEADER);
    for content in &doc.content {
        match content {
            XmlContent::Element(el) => write_element(&mut out, el, 0),
            XmlContent::Comment(text) => write_comment(&mut out, text, 0),
            XmlContent::Text(_) | XmlContent::CData(_) => continue,
        }
        out.push('\n');
    }
    out
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_comment(out: &mut String, text: &str, depth: usize) {
    push_indent(out, depth);
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}

fn is_blank(content: &XmlContent) -> bool {
    match content {
        XmlContent::Text(t) => t.trim().is_empty(),
        _ => false,
    }
}

fn write_element(out: &mut String, el: &XmlElement, depth: usize) {
    push_indent(out, depth);
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }

    let children: Vec<&XmlContent> = el.children.iter().filter(|c| !is_blank(c)).collect();
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let nested = children
        .iter()
        .any(|c| matches!(c, XmlContent::Element(_) | XmlContent::Comment(_)));

    if el.name == "Grid" {
        out.push('\n');
        write_grid_body(out, &children, depth + 1);
        push_indent(out, depth);
    } else if nested {
        for child in children {
            out.push('\n');
            match child {
                XmlContent::Element(child) => write_element(out, child, depth + 1),
                XmlContent::Comment(text) => write_comment(out, text, depth + 1),
                XmlContent::Text(text) => {
                    push_indent(out, depth + 1);
                    out.push_str(&partial_escape(text.trim()));
                }
                XmlContent::CData(text) => {
                    push_indent(out, depth + 1);
                    write_cdata(out, text);
                }
            }
        }
        out.push('\n');
        push_indent(out, depth);
    } else {
        for child in children {
            match child {
                XmlContent::Text(text) => out.push_str(&partial_escape(text.trim())),
                XmlContent::CData(text) => write_cdata(out, text),
                XmlContent::Element(_) | XmlContent::Comment(_) => {}
            }
        }
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn write_cdata(out: &mut String, text: &str) {
    out.push_str("<![CDATA[");
    out.push_str(text);
    out.push_str("]]>");
}

/// Grid content with comments interleaved. Column widths are shared by all
/// text runs so rows on either side of a comment still line up.
fn write_grid_body(out: &mut String, children: &[&XmlContent], depth: usize) {
    let mut widths = Vec::new();
    for child in children {
        if let XmlContent::Text(text) | XmlContent::CData(text) = child {
            column_widths(text, &mut widths);
        }
    }

    for child in children {
        match child {
            XmlContent::Text(text) | XmlContent::CData(text) => {
                out.push_str(&align_lines(text, depth, &widths));
            }
            XmlContent::Comment(text) => {
                write_comment(out, text, depth);
                out.push('\n');
            }
            XmlContent::Element(el) => {
                write_element(out, el, depth);
                out.push('\n');
            }
        }
    }
}

fn column_widths(content: &str, widths: &mut Vec<usize>) {
    for cells in content.lines().filter_map(GridRow::parse_line) {
        for (i, cell) in cells.iter().enumerate() {
            let len = cell.chars().count();
            if i >= widths.len() {
                widths.push(len);
            } else if len > widths[i] {
                widths[i] = len;
            }
        }
    }
}

/// Re-flow a grid body at the given indent depth.
///
/// Every table row is rewritten as `| cell | cell |` with each column padded
/// to its widest cell. Other lines are kept (trimmed and re-indented). Runs of
/// blank lines collapse to one; leading and trailing blank lines are dropped.
/// The result ends with a newline.
pub fn align_grid(content: &str, depth: usize) -> String {
    let mut widths = Vec::new();
    column_widths(content, &mut widths);
    align_lines(content, depth, &widths)
}

fn align_lines(content: &str, depth: usize, widths: &[usize]) -> String {
    let mut out = String::new();
    let mut pending_blank = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }

        push_indent(&mut out, depth);
        match GridRow::parse_line(trimmed) {
            Some(cells) if !cells.is_empty() => {
                out.push('|');
                for (i, cell) in cells.iter().enumerate() {
                    let pad = widths[i] - cell.chars().count();
                    out.push(' ');
                    out.push_str(&partial_escape(cell.as_str()));
                    out.push_str(&" ".repeat(pad));
                    out.push_str(" |");
                }
            }
            _ => out.push_str(&partial_escape(trimmed)),
        }
        out.push('\n');
    }
    out
}
