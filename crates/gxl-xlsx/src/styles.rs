/*
 * styles.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Style interning and the `xl/styles.xml` part.
//!
//! [`StyleCollector`] maps each distinct [`Style`] to a cell format index
//! (`cellXfs` position). Index 0 is the default format and is never handed out
//! for a non-empty style. Fonts, fills and borders are deduplicated separately
//! when the part is written, so two formats that only differ in fill still
//! share one font record.

use std::collections::HashMap;

use gxl_model::{Border, Style, Workbook};

use crate::xml::escape_text;

const DEFAULT_FONT_NAME: &str = "Calibri";
const DEFAULT_FONT_SIZE: u32 = 11;

/// Content-addressed table of the styles used in a workbook.
#[derive(Debug, Default)]
pub struct StyleCollector {
    /// `styles[i]` is format `i + 1`.
    styles: Vec<Style>,
    ids: HashMap<Style, u32>,
}

impl StyleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern every cell style in sheet order, then cell order.
    pub fn from_workbook(workbook: &Workbook) -> Self {
        let mut collector = Self::new();
        for sheet in &workbook.sheets {
            for style in sheet.cells.iter().filter_map(|c| c.style.as_ref()) {
                collector.intern(style);
            }
        }
        collector
    }

    /// Return the format index for `style`, allocating one on first sight.
    pub fn intern(&mut self, style: &Style) -> u32 {
        if style.is_empty() {
            return 0;
        }
        if let Some(&id) = self.ids.get(style) {
            return id;
        }
        self.styles.push(style.clone());
        let id = self.styles.len() as u32;
        self.ids.insert(style.clone(), id);
        id
    }

    /// Look up a previously interned style. Unknown or absent styles map to 0.
    pub fn id(&self, style: Option<&Style>) -> u32 {
        style
            .and_then(|style| self.ids.get(style))
            .copied()
            .unwrap_or(0)
    }

    /// Number of non-default formats.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Render the complete styles part.
    pub fn styles_xml(&self) -> String {
        let mut fonts = Records::new(default_font_xml());
        let mut fills = Records::new(r#"<fill><patternFill patternType="none"/></fill>"#.to_string());
        fills.add(r#"<fill><patternFill patternType="gray125"/></fill>"#.to_string());
        let mut borders = Records::new(
            "<border><left/><right/><top/><bottom/><diagonal/></border>".to_string(),
        );

        let mut xfs = String::from(r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#);
        for style in &self.styles {
            let font_id = if has_font(style) {
                Some(fonts.add(font_xml(style)))
            } else {
                None
            };
            let fill_id = style.fill_color.as_deref().map(|color| fills.add(fill_xml(color)));
            let border_id = style.border.as_ref().map(|border| borders.add(border_xml(border)));
            xfs.push_str(&xf_xml(style, font_id, fill_id, border_id));
        }

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );
        xml.push('\n');
        xml.push_str(&fonts.to_xml("fonts"));
        xml.push_str(&fills.to_xml("fills"));
        xml.push_str(&borders.to_xml("borders"));
        xml.push_str(
            r#"  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        );
        xml.push('\n');
        xml.push_str(&format!(
            "  <cellXfs count=\"{}\">{}</cellXfs>\n",
            self.styles.len() + 1,
            xfs
        ));
        xml.push_str(
            r#"  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
        );
        xml.push('\n');
        xml.push_str("</styleSheet>");
        xml
    }
}

/// Deduplicated list of serialized records (fonts, fills or borders).
struct Records {
    items: Vec<String>,
    index: HashMap<String, usize>,
}

impl Records {
    fn new(first: String) -> Self {
        let mut records = Self {
            items: Vec::new(),
            index: HashMap::new(),
        };
        records.add(first);
        records
    }

    fn add(&mut self, xml: String) -> usize {
        if let Some(&idx) = self.index.get(&xml) {
            return idx;
        }
        let idx = self.items.len();
        self.index.insert(xml.clone(), idx);
        self.items.push(xml);
        idx
    }

    fn to_xml(&self, tag: &str) -> String {
        format!(
            "  <{tag} count=\"{}\">{}</{tag}>\n",
            self.items.len(),
            self.items.concat()
        )
    }
}

/// OOXML font family for a font name: 1 serif, 2 sans-serif, 3 monospace.
pub fn font_family(name: &str) -> Option<u8> {
    const SANS: &[&str] = &[
        "arial",
        "calibri",
        "helvetica",
        "hiragino",
        "noto sans",
        "source sans",
        "yu gothic",
        "meiryo",
        "ms pgothic",
        "ms gothic",
        "liberation sans",
    ];
    const SERIF: &[&str] = &["times", "georgia", "noto serif"];
    const MONO: &[&str] = &["courier", "consolas", "menlo", "monaco", "source code"];

    let name = name.to_lowercase();
    let matches = |table: &[&str]| table.iter().any(|known| name.contains(known));
    if matches(SANS) {
        Some(2)
    } else if matches(SERIF) {
        Some(1)
    } else if matches(MONO) {
        Some(3)
    } else {
        None
    }
}

/// `RRGGBB` becomes opaque `FFRRGGBB`; anything else is passed through.
fn argb(color: &str) -> String {
    if color.len() == 6 {
        format!("FF{}", color)
    } else {
        color.to_string()
    }
}

fn has_font(style: &Style) -> bool {
    style.bold
        || style.italic
        || style.underline
        || style.font_name.is_some()
        || style.font_size.is_some()
        || style.font_color.is_some()
}

fn default_font_xml() -> String {
    font_xml(&Style::default())
}

fn font_xml(style: &Style) -> String {
    let name = style.font_name.as_deref().unwrap_or(DEFAULT_FONT_NAME);
    let mut xml = String::from("<font>");
    if style.bold {
        xml.push_str("<b/>");
    }
    if style.italic {
        xml.push_str("<i/>");
    }
    if style.underline {
        xml.push_str("<u/>");
    }
    xml.push_str(&format!(
        r#"<sz val="{}"/>"#,
        style.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    ));
    if let Some(color) = &style.font_color {
        xml.push_str(&format!(r#"<color rgb="{}"/>"#, escape_text(&argb(color))));
    }
    xml.push_str(&format!(r#"<name val="{}"/>"#, escape_text(name)));
    if let Some(family) = font_family(name) {
        xml.push_str(&format!(r#"<family val="{}"/>"#, family));
    }
    xml.push_str("</font>");
    xml
}

fn fill_xml(color: &str) -> String {
    format!(
        r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/><bgColor indexed="64"/></patternFill></fill>"#,
        escape_text(&argb(color))
    )
}

fn border_xml(border: &Border) -> String {
    let side = |tag: &str, on: bool| {
        if !on {
            return format!("<{tag}/>");
        }
        match &border.color {
            Some(color) => format!(
                r#"<{tag} style="{}"><color rgb="{}"/></{tag}>"#,
                border.style.as_str(),
                escape_text(&argb(color))
            ),
            None => format!(r#"<{tag} style="{}"/>"#, border.style.as_str()),
        }
    };
    format!(
        "<border>{}{}{}{}<diagonal/></border>",
        side("left", border.sides.left),
        side("right", border.sides.right),
        side("top", border.sides.top),
        side("bottom", border.sides.bottom)
    )
}

fn xf_xml(
    style: &Style,
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
) -> String {
    let mut attrs = format!(
        r#" numFmtId="0" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
        font_id.unwrap_or(0),
        fill_id.unwrap_or(0),
        border_id.unwrap_or(0)
    );
    if font_id.is_some() {
        attrs.push_str(r#" applyFont="1""#);
    }
    if fill_id.is_some() {
        attrs.push_str(r#" applyFill="1""#);
    }
    if border_id.is_some() {
        attrs.push_str(r#" applyBorder="1""#);
    }

    if style.horizontal.is_none() && style.vertical.is_none() {
        return format!("<xf{}/>", attrs);
    }
    attrs.push_str(r#" applyAlignment="1""#);
    let mut alignment = String::from("<alignment");
    if let Some(h) = style.horizontal {
        alignment.push_str(&format!(r#" horizontal="{}""#, h.as_str()));
    }
    if let Some(v) = style.vertical {
        alignment.push_str(&format!(r#" vertical="{}""#, v.as_str()));
    }
    alignment.push_str("/>");
    format!("<xf{}>{}</xf>", attrs, alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gxl_model::{BorderSides, BorderStyle, HorizontalAlign};
    use pretty_assertions::assert_eq;

    fn bold() -> Style {
        Style {
            bold: true,
            ..Style::default()
        }
    }

    fn filled(color: &str) -> Style {
        Style {
            bold: true,
            fill_color: Some(color.to_string()),
            ..Style::default()
        }
    }

    #[test]
    fn test_identical_styles_share_one_entry() {
        let mut collector = StyleCollector::new();
        assert_eq!(collector.intern(&bold()), 1);
        assert_eq!(collector.intern(&bold()), 1);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_different_styles_get_distinct_entries() {
        let mut collector = StyleCollector::new();
        assert_eq!(collector.intern(&bold()), 1);
        assert_eq!(collector.intern(&filled("FF0000")), 2);
        assert_eq!(collector.len(), 2);
        assert_eq!(collector.id(Some(&filled("FF0000"))), 2);
    }

    #[test]
    fn test_default_style_is_index_zero() {
        let mut collector = StyleCollector::new();
        assert_eq!(collector.intern(&Style::default()), 0);
        assert_eq!(collector.id(None), 0);
        assert_eq!(collector.id(Some(&bold())), 0);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_fonts_are_shared_between_formats() {
        let mut collector = StyleCollector::new();
        collector.intern(&filled("FF0000"));
        collector.intern(&filled("00FF00"));
        let xml = collector.styles_xml();
        // default font + one bold font
        assert!(xml.contains(r#"<fonts count="2">"#));
        // none, gray125 and two solid fills
        assert!(xml.contains(r#"<fills count="4">"#));
        assert!(xml.contains(r#"<patternFill patternType="gray125"/>"#));
        assert!(xml.contains(r#"<fgColor rgb="FFFF0000"/>"#));
        assert!(xml.contains(r#"<cellXfs count="3">"#));
    }

    #[test]
    fn test_border_and_alignment_records() {
        let mut collector = StyleCollector::new();
        collector.intern(&Style {
            border: Some(Border {
                style: BorderStyle::Thin,
                color: Some("000000".to_string()),
                sides: BorderSides::parse("top,bottom"),
            }),
            horizontal: Some(HorizontalAlign::Center),
            ..Style::default()
        });
        let xml = collector.styles_xml();
        assert!(xml.contains(
            r#"<border><left/><right/><top style="thin"><color rgb="FF000000"/></top><bottom style="thin"><color rgb="FF000000"/></bottom><diagonal/></border>"#
        ));
        assert!(xml.contains(
            r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1" applyAlignment="1"><alignment horizontal="center"/></xf>"#
        ));
    }

    #[test]
    fn test_font_record_contents() {
        let style = Style {
            italic: true,
            font_name: Some("Courier New".to_string()),
            font_size: Some(9),
            font_color: Some("336699".to_string()),
            ..Style::default()
        };
        assert_eq!(
            font_xml(&style),
            r#"<font><i/><sz val="9"/><color rgb="FF336699"/><name val="Courier New"/><family val="3"/></font>"#
        );
        assert_eq!(
            default_font_xml(),
            r#"<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#
        );
    }

    #[test]
    fn test_font_family_buckets() {
        assert_eq!(font_family("Arial Black"), Some(2));
        assert_eq!(font_family("Times New Roman"), Some(1));
        assert_eq!(font_family("Consolas"), Some(3));
        assert_eq!(font_family("Comic Sans MS"), None);
    }
}
