/*
 * styling.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Turns `<Grid>` / `<Style>` style attributes into [`Style`] values.
//!
//! Every attribute may contain `{{ ... }}` expressions, so resolution happens
//! per render against the current scope stack. Values that cannot be
//! understood are reported to the diagnostic sink and left unset.

use gxl_markup::StyleHints;
use gxl_model::{
    Border, BorderSides, BorderStyle, HorizontalAlign, Style, VerticalAlign, normalize_color,
};

use crate::context::ContextStack;
use crate::eval_context::DiagnosticCollector;
use crate::expand::expand_text;

/// Resolve style hints. Returns `None` when no field ends up set.
pub fn resolve_style(
    hints: &StyleHints,
    stack: &ContextStack,
    sheet: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Option<Style> {
    if hints.is_empty() {
        return None;
    }

    let text = |raw: &Option<String>| {
        raw.as_deref()
            .map(|r| expand_text(r, stack).trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let color = |raw: &Option<String>| text(raw).map(|v| normalize_color(&v)).filter(|v| !v.is_empty());
    let flag = |raw: &Option<String>| {
        text(raw).is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
    };

    let mut style = Style {
        bold: flag(&hints.bold),
        italic: flag(&hints.italic),
        underline: flag(&hints.underline),
        font_name: text(&hints.font_name),
        font_color: color(&hints.font_color),
        fill_color: color(&hints.fill_color),
        ..Style::default()
    };

    if let Some(size) = text(&hints.font_size) {
        match size.parse::<f64>() {
            Ok(points) if points > 0.0 && points.is_finite() => {
                style.font_size = Some(points.round() as u32);
            }
            _ => diagnostics.warn(Some(sheet), format!("ignoring font size '{}'", size)),
        }
    }

    if let Some(raw) = text(&hints.border_style) {
        match raw.parse::<BorderStyle>() {
            Ok(border_style) => {
                style.border = Some(Border {
                    style: border_style,
                    color: color(&hints.border_color),
                    sides: text(&hints.border_sides)
                        .map_or(BorderSides::ALL, |sides| BorderSides::parse(&sides)),
                });
            }
            Err(message) => diagnostics.warn(Some(sheet), message),
        }
    }

    if let Some(raw) = text(&hints.horizontal) {
        match raw.parse::<HorizontalAlign>() {
            Ok(align) => style.horizontal = Some(align),
            Err(message) => diagnostics.warn(Some(sheet), message),
        }
    }
    if let Some(raw) = text(&hints.vertical) {
        match raw.parse::<VerticalAlign>() {
            Ok(align) => style.vertical = Some(align),
            Err(message) => diagnostics.warn(Some(sheet), message),
        }
    }

    if style.is_empty() { None } else { Some(style) }
}
