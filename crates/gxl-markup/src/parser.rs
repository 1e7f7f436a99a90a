/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Builds the gxl node tree from the generic element tree.
//!
//! The tag vocabulary is fixed. Unrecognized tags are skipped together with
//! their content so that newer templates still load. The only structural
//! rules enforced here are that a `<Sheet>` or `<Import>` never appears inside
//! a sheet.

use gxl_model::{
    ColumnWidth, RowHeight, column_index, normalize_color, parse_col_width, parse_row_height,
};

use crate::ast::{
    Anchor, Book, BookNode, ChartNode, Conditional, ForLoop, Grid, Header, ImageNode, Import,
    MergeNode, Node, PivotNode, ShapeNode, SheetNode, SheetSettings, StyleHints, StyleRule,
    Template, parse_grid_rows,
};
use crate::error::{MarkupError, Result};
use crate::xml::{XmlElement, read_document, read_document_bytes};

/// Parse template markup from a string.
///
/// # Example
///
/// ```rust
/// let template = gxl_markup::parse(
///     r#"<GXL><Book name="b"/><Sheet name="S"><Grid ref="A1">| x |</Grid></Sheet></GXL>"#,
/// )
/// .unwrap();
/// assert_eq!(template.sheets().count(), 1);
/// ```
pub fn parse(source: &str) -> Result<Template> {
    let doc = read_document(source)?;
    let root = doc.root().ok_or(MarkupError::EmptyDocument)?;
    build_template(root)
}

/// Parse template markup from raw bytes (UTF-8).
pub fn parse_bytes(bytes: &[u8]) -> Result<Template> {
    let doc = read_document_bytes(bytes)?;
    let root = doc.root().ok_or(MarkupError::EmptyDocument)?;
    build_template(root)
}

fn build_template(root: &XmlElement) -> Result<Template> {
    let mut template = Template::default();

    match root.name.as_str() {
        "Book" => {
            template.book = parse_book(root);
            parse_book_children(root, &mut template)?;
        }
        "Sheet" => {
            template.nodes.push(BookNode::Sheet(parse_sheet(root)?));
        }
        _ => {
            for child in root.elements() {
                match child.name.as_str() {
                    "Header" => template.header = parse_header(child),
                    "Book" => {
                        template.book = parse_book(child);
                        parse_book_children(child, &mut template)?;
                    }
                    "Sheet" => template.nodes.push(BookNode::Sheet(parse_sheet(child)?)),
                    "Import" => template.nodes.push(BookNode::Import(parse_import(child))),
                    other => tracing::trace!(tag = other, "skipping unrecognized top-level tag"),
                }
            }
        }
    }

    tracing::debug!(
        book = %template.book.name,
        sheets = template.sheets().count(),
        imports = template.imports().count(),
        "parsed template"
    );
    Ok(template)
}

fn parse_book_children(book: &XmlElement, template: &mut Template) -> Result<()> {
    for child in book.elements() {
        match child.name.as_str() {
            "Sheet" => template.nodes.push(BookNode::Sheet(parse_sheet(child)?)),
            "Import" => template.nodes.push(BookNode::Import(parse_import(child))),
            "Header" => template.header = parse_header(child),
            other => tracing::trace!(tag = other, "skipping unrecognized book tag"),
        }
    }
    Ok(())
}

fn parse_header(el: &XmlElement) -> Header {
    let mut header = Header::default();

    let mut assign = |key: &str, value: String| match key.to_ascii_lowercase().as_str() {
        "title" => header.title = Some(value),
        "version" => header.version = Some(value),
        "encoding" => header.encoding = Some(value),
        _ => {
            header.properties.insert(key.to_string(), value);
        }
    };

    for attr in &el.attributes {
        assign(&attr.name, attr.value.clone());
    }
    for child in el.elements() {
        assign(&child.name, child.text().trim().to_string());
    }
    header
}

fn parse_book(el: &XmlElement) -> Book {
    let mut book = Book::default();
    for attr in &el.attributes {
        if attr.name == "name" {
            book.name = attr.value.clone();
        } else {
            book.properties.insert(attr.name.clone(), attr.value.clone());
        }
    }
    book
}

fn parse_import(el: &XmlElement) -> Import {
    Import {
        src: el.attr(&["src"]).unwrap_or_default().to_string(),
        sheet: el.attr(&["sheet"]).unwrap_or_default().to_string(),
    }
}

fn parse_sheet(el: &XmlElement) -> Result<SheetNode> {
    let name = el.attr(&["name"]).unwrap_or_default().to_string();
    let mut settings = SheetSettings::default();
    apply_sheet_settings(el, &mut settings);

    let mut nodes = Vec::new();
    for child in el.elements() {
        match child.name.as_str() {
            "SheetConfig" => apply_sheet_settings(child, &mut settings),
            "Column" => {
                if let Some(column) = parse_column(child) {
                    settings.columns.push(column);
                }
            }
            "Row" => {
                if let Some(row) = parse_row(child) {
                    settings.rows.push(row);
                }
            }
            _ => {
                if let Some(node) = parse_node(child, &name)? {
                    nodes.push(node);
                }
            }
        }
    }

    Ok(SheetNode {
        name,
        settings,
        nodes,
    })
}

fn apply_sheet_settings(el: &XmlElement, settings: &mut SheetSettings) {
    if let Some(width) = el.attr(&["col_width"]).and_then(|v| positive(v, parse_col_width)) {
        settings.col_width = Some(width);
    }
    if let Some(height) = el
        .attr(&["row_height", "row_heigh"])
        .and_then(|v| positive(v, parse_row_height))
    {
        settings.row_height = Some(height);
    }
    if let Some(freeze) = el.non_empty_attr(&["freeze", "freeze_pane"]) {
        settings.freeze_pane = Some(freeze.trim().to_string());
    }
    if let Some(flag) = el.attr(&["show_grid_lines", "grid_lines"]).and_then(parse_flag) {
        settings.show_grid_lines = Some(flag);
    }
    if let Some(flag) = el.attr(&["show_headers"]).and_then(parse_flag) {
        settings.show_headers = Some(flag);
    }
}

/// Convert a length literal, keeping it only when it is strictly positive.
fn positive<E: std::fmt::Display>(
    literal: &str,
    convert: fn(&str) -> std::result::Result<f64, E>,
) -> Option<f64> {
    match convert(literal) {
        Ok(value) if value > 0.0 => Some(value),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(literal, %err, "ignoring length literal");
            None
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_index(value: &str, letters_allowed: bool) -> Option<u32> {
    let value = value.trim();
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        Ok(_) => None,
        Err(_) if letters_allowed => column_index(value).ok(),
        Err(_) => None,
    }
}

fn parse_column(el: &XmlElement) -> Option<ColumnWidth> {
    let column = el.attr(&["index", "col"]).and_then(|v| parse_index(v, true))?;
    let width = el.attr(&["width"]).and_then(|v| positive(v, parse_col_width))?;
    Some(ColumnWidth { column, width })
}

fn parse_row(el: &XmlElement) -> Option<RowHeight> {
    let row = el.attr(&["index", "row"]).and_then(|v| parse_index(v, false))?;
    let height = el.attr(&["height"]).and_then(|v| positive(v, parse_row_height))?;
    Some(RowHeight { row, height })
}

fn parse_nodes<'a>(
    children: impl Iterator<Item = &'a XmlElement>,
    sheet: &str,
) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    for child in children {
        if let Some(node) = parse_node(child, sheet)? {
            nodes.push(node);
        }
    }
    Ok(nodes)
}

fn parse_node(el: &XmlElement, sheet: &str) -> Result<Option<Node>> {
    let owned = |names: &[&str]| el.attr(names).unwrap_or_default().to_string();
    let optional = |names: &[&str]| el.non_empty_attr(names).map(str::to_string);

    let node = match el.name.as_str() {
        "Sheet" | "Import" => {
            return Err(MarkupError::InvalidNesting {
                child: el.name.clone(),
                sheet: sheet.to_string(),
            });
        }
        "Anchor" => Node::Anchor(Anchor {
            reference: owned(&["ref"]),
        }),
        "Grid" => Node::Grid(Grid {
            reference: optional(&["ref"]),
            style: parse_style_hints(el),
            rows: parse_grid_rows(&el.text()),
        }),
        "Merge" => Node::Merge(MergeNode {
            range: owned(&["range"]),
        }),
        "Image" => Node::Image(ImageNode {
            reference: owned(&["ref"]),
            src: owned(&["src"]),
            width: optional(&["width"]),
            height: optional(&["height"]),
        }),
        "Shape" => Node::Shape(ShapeNode {
            reference: owned(&["ref"]),
            kind: owned(&["kind"]),
            text: owned(&["text"]),
            style: owned(&["style"]),
            width: optional(&["width"]),
            height: optional(&["height"]),
        }),
        "Chart" => Node::Chart(ChartNode {
            reference: owned(&["ref"]),
            chart_type: owned(&["type"]),
            data_range: owned(&["dataRange", "data_range"]),
            title: owned(&["title"]),
            width: optional(&["width"]),
            height: optional(&["height"]),
        }),
        "Pivot" => Node::Pivot(PivotNode {
            reference: owned(&["ref"]),
            source_range: owned(&["sourceRange", "source_range"]),
            rows: owned(&["rows"]),
            columns: owned(&["columns"]),
            values: owned(&["values"]),
            filters: owned(&["filters"]),
            options: owned(&["options"]),
        }),
        "For" => Node::For(ForLoop {
            header: owned(&["each"]),
            body: parse_nodes(el.elements(), sheet)?,
        }),
        "If" => Node::If(parse_conditional(el, sheet)?),
        "Style" => Node::Style(StyleRule {
            reference: optional(&["ref", "selector"]),
            name: optional(&["name"]),
            id: optional(&["id"]),
            class: optional(&["class"]),
            style: parse_style_hints(el),
        }),
        other => {
            tracing::trace!(tag = other, sheet, "skipping unrecognized tag");
            return Ok(None);
        }
    };
    Ok(Some(node))
}

/// `<Else/>` switches the remaining children to the else branch;
/// `<Else>...</Else>` contributes its own children to it.
fn parse_conditional(el: &XmlElement, sheet: &str) -> Result<Conditional> {
    let mut then_nodes = Vec::new();
    let mut else_nodes = Vec::new();
    let mut in_else = false;

    for child in el.elements() {
        if child.name == "Else" {
            in_else = true;
            else_nodes.extend(parse_nodes(child.elements(), sheet)?);
            continue;
        }
        if let Some(node) = parse_node(child, sheet)? {
            if in_else {
                else_nodes.push(node);
            } else {
                then_nodes.push(node);
            }
        }
    }

    Ok(Conditional {
        condition: el.attr(&["cond"]).unwrap_or_default().to_string(),
        then_nodes,
        else_nodes,
    })
}

fn parse_style_hints(el: &XmlElement) -> StyleHints {
    let text = |names: &[&str]| el.non_empty_attr(names).map(|v| v.trim().to_string());
    let color = |names: &[&str]| el.non_empty_attr(names).map(normalize_color);

    StyleHints {
        font_name: text(&["font", "font_name", "fontName"]),
        font_size: text(&["font_size", "fontSize", "text_size"]),
        font_color: color(&["font_color", "fontColor", "text_color"]),
        fill_color: color(&["fill_color", "fillColor", "color"]),
        border_style: text(&["border", "border_style", "borderStyle"])
            .map(|v| v.to_ascii_lowercase()),
        border_color: color(&["border_color", "borderColor"]),
        border_sides: text(&["border_sides", "borderSides"]).map(|v| v.to_ascii_lowercase()),
        bold: text(&["bold"]),
        italic: text(&["italic"]),
        underline: text(&["underline"]),
        horizontal: text(&["align", "h_align", "horizontal"]),
        vertical: text(&["valign", "v_align", "vertical"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::GridRow;
    use pretty_assertions::assert_eq;

    fn only_sheet(template: &Template) -> &SheetNode {
        template.sheets().next().expect("one sheet")
    }

    #[test]
    fn test_parse_minimal_book() {
        let template = parse(
            r#"<?xml version="1.0"?>
<GXL>
  <Header>
    <Title>Quarterly</Title>
    <Version>2</Version>
    <Owner>finance</Owner>
  </Header>
  <Book name="report" locale="en"/>
  <Sheet name="S">
    <Grid ref="A1">
      | Hello | {{ name }} |
    </Grid>
  </Sheet>
</GXL>"#,
        )
        .unwrap();

        assert_eq!(template.header.title.as_deref(), Some("Quarterly"));
        assert_eq!(template.header.version.as_deref(), Some("2"));
        assert_eq!(
            template.header.properties.get("Owner").map(String::as_str),
            Some("finance")
        );
        assert_eq!(template.book.name, "report");
        assert_eq!(
            template.book.properties.get("locale").map(String::as_str),
            Some("en")
        );

        let sheet = only_sheet(&template);
        assert_eq!(sheet.name, "S");
        let Node::Grid(grid) = &sheet.nodes[0] else {
            panic!("expected grid");
        };
        assert_eq!(grid.reference.as_deref(), Some("A1"));
        assert_eq!(
            grid.rows,
            vec![GridRow {
                cells: vec!["Hello".to_string(), "{{ name }}".to_string()]
            }]
        );
    }

    #[test]
    fn test_sheets_inside_book_element() {
        let template = parse(
            r#"<GXL><Book name="b"><Import src="a.gxl" sheet="A"/><Sheet name="S"/></Book></GXL>"#,
        )
        .unwrap();
        assert_eq!(template.nodes.len(), 2);
        assert!(matches!(&template.nodes[0], BookNode::Import(i) if i.src == "a.gxl" && i.sheet == "A"));
        assert!(matches!(&template.nodes[1], BookNode::Sheet(s) if s.name == "S"));
    }

    #[test]
    fn test_book_as_root() {
        let template = parse(r#"<Book name="b"><Sheet name="One"/><Sheet name="Two"/></Book>"#).unwrap();
        let names: Vec<_> = template.sheets().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[test]
    fn test_book_node_order_is_preserved() {
        let template = parse(
            r#"<GXL>
  <Sheet name="First"/>
  <Import src="x.gxl" sheet="X"/>
  <Sheet name="Last"/>
</GXL>"#,
        )
        .unwrap();
        let kinds: Vec<_> = template
            .nodes
            .iter()
            .map(|n| match n {
                BookNode::Sheet(s) => s.name.clone(),
                BookNode::Import(i) => format!("import:{}", i.sheet),
            })
            .collect();
        assert_eq!(kinds, vec!["First", "import:X", "Last"]);
    }

    #[test]
    fn test_sheet_in_sheet_is_structural_error() {
        let err = parse(r#"<GXL><Sheet name="A"><Sheet name="B"/></Sheet></GXL>"#).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(
            err,
            MarkupError::InvalidNesting {
                child: "Sheet".to_string(),
                sheet: "A".to_string()
            }
        );
    }

    #[test]
    fn test_import_in_sheet_is_structural_error() {
        let err = parse(r#"<GXL><Sheet name="A"><Import src="b.gxl" sheet="B"/></Sheet></GXL>"#)
            .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_nesting_checked_inside_control_flow() {
        let err = parse(
            r#"<GXL><Sheet name="A"><For each="x in xs"><If cond="x"><Sheet name="B"/></If></For></Sheet></GXL>"#,
        )
        .unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_unknown_tags_are_skipped() {
        let template = parse(
            r#"<GXL><Sheet name="S"><Sparkline ref="A1"><Series/></Sparkline><Anchor ref="B2"/></Sheet></GXL>"#,
        )
        .unwrap();
        let sheet = only_sheet(&template);
        assert_eq!(
            sheet.nodes,
            vec![Node::Anchor(Anchor {
                reference: "B2".to_string()
            })]
        );
    }

    #[test]
    fn test_sheet_units_and_alias() {
        let template = parse(r#"<GXL><Sheet name="S" col_width="75px" row_heigh="1in"/></GXL>"#).unwrap();
        let settings = &only_sheet(&template).settings;
        assert_eq!(settings.col_width, Some(10.0));
        assert_eq!(settings.row_height, Some(72.0));
    }

    #[test]
    fn test_non_positive_sizes_are_ignored() {
        let template = parse(r#"<GXL><Sheet name="S" col_width="0" row_height="wide"/></GXL>"#).unwrap();
        let settings = &only_sheet(&template).settings;
        assert_eq!(settings.col_width, None);
        assert_eq!(settings.row_height, None);
    }

    #[test]
    fn test_sheet_config_children() {
        let template = parse(
            r#"<GXL><Sheet name="S">
  <SheetConfig freeze="B2" show_grid_lines="false"/>
  <Column index="C" width="20"/>
  <Column index="2" width="12ch"/>
  <Row index="3" height="30pt"/>
  <Row index="0" height="30pt"/>
</Sheet></GXL>"#,
        )
        .unwrap();
        let settings = &only_sheet(&template).settings;
        assert_eq!(settings.freeze_pane.as_deref(), Some("B2"));
        assert_eq!(settings.show_grid_lines, Some(false));
        assert_eq!(
            settings.columns,
            vec![
                ColumnWidth { column: 3, width: 20.0 },
                ColumnWidth { column: 2, width: 12.0 },
            ]
        );
        assert_eq!(settings.rows, vec![RowHeight { row: 3, height: 30.0 }]);
    }

    #[test]
    fn test_grid_style_aliases_and_color_sanitizing() {
        let template = parse(
            r##"<GXL><Sheet name="S"><Grid fontName="Arial" text_size="14" color="#ffcc00" borderStyle="Thin" border_sides="Top,Bottom" fontColor=" #0a0b0c ">| x |</Grid></Sheet></GXL>"##,
        )
        .unwrap();
        let Node::Grid(grid) = &only_sheet(&template).nodes[0] else {
            panic!("expected grid");
        };
        assert_eq!(grid.reference, None);
        assert_eq!(grid.style.font_name.as_deref(), Some("Arial"));
        assert_eq!(grid.style.font_size.as_deref(), Some("14"));
        assert_eq!(grid.style.fill_color.as_deref(), Some("FFCC00"));
        assert_eq!(grid.style.font_color.as_deref(), Some("0A0B0C"));
        assert_eq!(grid.style.border_style.as_deref(), Some("thin"));
        assert_eq!(grid.style.border_sides.as_deref(), Some("top,bottom"));
    }

    #[test]
    fn test_for_and_if_else_forms() {
        let template = parse(
            r#"<GXL><Sheet name="S">
  <For each="row in rows">
    <Grid>| {{ row.name }} |</Grid>
  </For>
  <If cond="show">
    <Anchor ref="A1"/>
    <Else/>
    <Anchor ref="B1"/>
  </If>
  <If cond="other">
    <Anchor ref="C1"/>
    <Else><Anchor ref="D1"/></Else>
  </If>
</Sheet></GXL>"#,
        )
        .unwrap();
        let nodes = &only_sheet(&template).nodes;
        let Node::For(for_loop) = &nodes[0] else {
            panic!("expected for");
        };
        assert_eq!(for_loop.header, "row in rows");
        assert_eq!(for_loop.body.len(), 1);

        let Node::If(first) = &nodes[1] else {
            panic!("expected if");
        };
        assert_eq!(first.condition, "show");
        assert_eq!(first.then_nodes.len(), 1);
        assert_eq!(first.else_nodes.len(), 1);

        let Node::If(second) = &nodes[2] else {
            panic!("expected if");
        };
        assert_eq!(
            second.else_nodes,
            vec![Node::Anchor(Anchor {
                reference: "D1".to_string()
            })]
        );
    }

    #[test]
    fn test_drawing_nodes() {
        let template = parse(
            r#"<GXL><Sheet name="S">
  <Image ref="A1" src="logo.png" width="120" height="40"/>
  <Shape ref="C1" kind="rect" text="Note" style="fill:red"/>
  <Chart ref="E1" type="bar" dataRange="A1:B5" title="Sales"/>
  <Pivot ref="H1" sourceRange="A1:D9" rows="Region, Rep" values="Amount" options="totals=false"/>
  <Merge range="A1:C1"/>
  <Style ref="A1:B2" bold="true" name="heading"/>
</Sheet></GXL>"#,
        )
        .unwrap();
        let nodes = &only_sheet(&template).nodes;
        assert_eq!(nodes.len(), 6);
        assert!(matches!(&nodes[0], Node::Image(i) if i.src == "logo.png" && i.width.as_deref() == Some("120")));
        assert!(matches!(&nodes[1], Node::Shape(s) if s.kind == "rect" && s.width.is_none()));
        assert!(matches!(&nodes[2], Node::Chart(c) if c.data_range == "A1:B5"));
        assert!(matches!(&nodes[3], Node::Pivot(p) if p.rows == "Region, Rep"));
        assert!(matches!(&nodes[4], Node::Merge(m) if m.range == "A1:C1"));
        assert!(matches!(&nodes[5], Node::Style(s) if s.reference.as_deref() == Some("A1:B2") && s.style.bold.as_deref() == Some("true")));
    }

    #[test]
    fn test_grid_with_cdata_and_entities() {
        let template = parse(
            "<GXL><Sheet name=\"S\"><Grid>| a &amp; b | <![CDATA[x < y]]> |</Grid></Sheet></GXL>",
        )
        .unwrap();
        let Node::Grid(grid) = &only_sheet(&template).nodes[0] else {
            panic!("expected grid");
        };
        assert_eq!(grid.rows[0].cells, vec!["a & b", "x < y"]);
    }

    fn nested_loops(count: usize) -> String {
        format!(
            "<GXL><Sheet name=\"S\">{}<Grid>| x |</Grid>{}</Sheet></GXL>",
            "<For each=\"r in rows\">".repeat(count),
            "</For>".repeat(count)
        )
    }

    #[test]
    fn test_deeply_nested_loops_are_rejected() {
        // GXL and Sheet take two levels; the innermost Grid takes one more.
        let template = parse(&nested_loops(crate::MAX_NESTING_DEPTH - 3)).unwrap();
        let mut node = &only_sheet(&template).nodes[0];
        let mut loops = 0;
        while let Node::For(for_loop) = node {
            loops += 1;
            node = &for_loop.body[0];
        }
        assert_eq!(loops, crate::MAX_NESTING_DEPTH - 3);
        assert!(matches!(node, Node::Grid(_)));

        let err = parse(&nested_loops(crate::MAX_NESTING_DEPTH - 2)).unwrap_err();
        assert!(matches!(err, MarkupError::TooDeep { .. }));
        assert!(!err.is_structural());

        let err = parse(&nested_loops(20_000)).unwrap_err();
        assert!(matches!(err, MarkupError::TooDeep { .. }));
    }

    #[test]
    fn test_malformed_markup_is_syntax_error() {
        let err = parse("<GXL><Sheet name=\"S\"></GXL>").unwrap_err();
        assert!(!err.is_structural());
    }
}
