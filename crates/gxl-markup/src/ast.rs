/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Node tree for gxl templates.
//!
//! The tree is built once by [`crate::parse`] and is read-only afterwards.
//! Node order inside a sheet is render order. Attribute values are kept as
//! written (only colors are normalized) because most of them may contain
//! `{{ ... }}` expressions that are expanded at render time.

use std::collections::BTreeMap;
use std::path::PathBuf;

use gxl_model::{ColumnWidth, RowHeight};

/// A complete parsed template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub header: Header,
    pub book: Book,
    /// Book-level imports and sheets in declaration order.
    pub nodes: Vec<BookNode>,
    /// File the template was read from, when known. Relative imports resolve
    /// against its directory.
    pub source_path: Option<PathBuf>,
}

impl Template {
    pub fn sheets(&self) -> impl Iterator<Item = &SheetNode> {
        self.nodes.iter().filter_map(|n| match n {
            BookNode::Sheet(sheet) => Some(sheet),
            BookNode::Import(_) => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.nodes.iter().filter_map(|n| match n {
            BookNode::Import(import) => Some(import),
            BookNode::Sheet(_) => None,
        })
    }

    /// The locally defined sheet with exactly this name.
    pub fn sheet(&self, name: &str) -> Option<&SheetNode> {
        self.sheets().find(|s| s.name == name)
    }
}

/// Document metadata from `<Header>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: Option<String>,
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// The `<Book>` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookNode {
    Import(Import),
    Sheet(SheetNode),
}

/// `<Import src="other.gxl" sheet="Summary"/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub src: String,
    pub sheet: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetNode {
    pub name: String,
    pub settings: SheetSettings,
    pub nodes: Vec<Node>,
}

/// Sheet layout settings read from `<Sheet>` attributes and the
/// `<SheetConfig>`, `<Column>` and `<Row>` children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSettings {
    /// Default column width in characters.
    pub col_width: Option<f64>,
    /// Default row height in points.
    pub row_height: Option<f64>,
    /// First unfrozen cell, as written.
    pub freeze_pane: Option<String>,
    pub show_grid_lines: Option<bool>,
    pub show_headers: Option<bool>,
    pub columns: Vec<ColumnWidth>,
    pub rows: Vec<RowHeight>,
}

/// A sheet-level node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Anchor(Anchor),
    Grid(Grid),
    Merge(MergeNode),
    Image(ImageNode),
    Shape(ShapeNode),
    Chart(ChartNode),
    Pivot(PivotNode),
    For(ForLoop),
    If(Conditional),
    Style(StyleRule),
}

/// `<Anchor ref="B3"/>` moves the render cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub reference: String,
}

/// A pipe-delimited table block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// Absolute start cell. Without it the grid renders at the cursor.
    pub reference: Option<String>,
    pub style: StyleHints,
    pub rows: Vec<GridRow>,
}

/// One `| a | b |` line of a grid: the raw cell templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    pub cells: Vec<String>,
}

impl GridRow {
    /// Split a table line into trimmed cells.
    ///
    /// Returns `None` when the trimmed line does not start with `|`. Empty
    /// tokens produced by the edge pipes are dropped; interior empty cells
    /// are kept.
    pub fn parse_line(line: &str) -> Option<Vec<String>> {
        let trimmed = line.trim();
        if !trimmed.starts_with('|') {
            return None;
        }
        let mut parts: Vec<&str> = trimmed.split('|').collect();
        if parts.first().is_some_and(|p| p.trim().is_empty()) {
            parts.remove(0);
        }
        if parts.last().is_some_and(|p| p.trim().is_empty()) {
            parts.pop();
        }
        Some(parts.into_iter().map(|p| p.trim().to_string()).collect())
    }
}

/// Parse a grid body into rows. Lines that are not table rows are ignored,
/// as are rows without cells.
pub fn parse_grid_rows(content: &str) -> Vec<GridRow> {
    content
        .lines()
        .filter_map(GridRow::parse_line)
        .filter(|cells| !cells.is_empty())
        .map(|cells| GridRow { cells })
        .collect()
}

/// Style attributes as written on a `<Grid>` or `<Style>` element.
///
/// Values are raw text. Colors are already normalized (no `#`, upper-case).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleHints {
    pub font_name: Option<String>,
    pub font_size: Option<String>,
    pub font_color: Option<String>,
    pub fill_color: Option<String>,
    pub border_style: Option<String>,
    pub border_color: Option<String>,
    pub border_sides: Option<String>,
    pub bold: Option<String>,
    pub italic: Option<String>,
    pub underline: Option<String>,
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

impl StyleHints {
    pub fn is_empty(&self) -> bool {
        *self == StyleHints::default()
    }
}

/// `<Merge range="A1:C1"/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeNode {
    pub range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNode {
    pub reference: String,
    pub src: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeNode {
    pub reference: String,
    pub kind: String,
    pub text: String,
    pub style: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartNode {
    pub reference: String,
    pub chart_type: String,
    pub data_range: String,
    pub title: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotNode {
    pub reference: String,
    pub source_range: String,
    pub rows: String,
    pub columns: String,
    pub values: String,
    pub filters: String,
    pub options: String,
}

/// `<For each="item in items">...</For>`
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    /// The raw loop header, validated at render time.
    pub header: String,
    pub body: Vec<Node>,
}

/// `<If cond="...">...<Else/>...</If>`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: String,
    pub then_nodes: Vec<Node>,
    pub else_nodes: Vec<Node>,
}

/// `<Style ref="A1:C1" bold="true" .../>` overlays formatting on a range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRule {
    pub reference: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
    pub style: StyleHints,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(line: &str) -> Option<Vec<String>> {
        GridRow::parse_line(line)
    }

    #[test]
    fn test_parse_line_ignores_padding() {
        let expected = Some(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(cells("| A | B |"), expected);
        assert_eq!(cells("|A|B|"), expected);
        assert_eq!(cells("   |A |  B|  "), expected);
    }

    #[test]
    fn test_parse_line_keeps_interior_empty_cells() {
        assert_eq!(
            cells("| A || C |"),
            Some(vec!["A".to_string(), String::new(), "C".to_string()])
        );
    }

    #[test]
    fn test_parse_line_without_trailing_pipe() {
        assert_eq!(cells("| A | B"), Some(vec!["A".to_string(), "B".to_string()]));
    }

    #[test]
    fn test_non_table_lines() {
        assert_eq!(cells("A | B"), None);
        assert_eq!(cells(""), None);
    }

    #[test]
    fn test_parse_grid_rows_skips_noise() {
        let rows = parse_grid_rows("\n  | a | b |\n  not a row\n  |\n  | c | d |\n");
        assert_eq!(
            rows,
            vec![
                GridRow {
                    cells: vec!["a".to_string(), "b".to_string()]
                },
                GridRow {
                    cells: vec!["c".to_string(), "d".to_string()]
                },
            ]
        );
    }
}
