/*
 * expand.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Cell template expansion.
//!
//! A cell template is literal text with embedded `{{ path }}` or
//! `{{ path:hint }}` expressions. Expansion substitutes each expression,
//! decides the cell type, and turns `**bold**` / `_italic_` markers into a
//! style.

use std::borrow::Cow;

use chrono::NaiveDate;
use gxl_model::{CellType, Style};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::context::{ContextStack, Value};

static EXPRESSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").unwrap());

static TYPE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i):\s*(int|float|number|bool|boolean|date|string)\s*$").unwrap()
});

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+\.?\d*$").unwrap());

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$")
        .unwrap()
});

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

// `_x_` only counts when the underscores are not inside a word, so values
// like `snake_case_name` survive.
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[^\w])_([^_]+?)_($|[^\w])").unwrap());

/// The result of expanding one cell template.
#[derive(Debug, Clone, PartialEq)]
pub struct CellContent {
    pub text: String,
    pub cell_type: CellType,
    /// Style derived from emphasis markers, if any were present.
    pub style: Option<Style>,
}

/// Expand a grid cell template: substitute, type, and apply emphasis markers.
pub fn expand_cell(template: &str, stack: &ContextStack) -> CellContent {
    let mut count = 0usize;
    let mut hint = None;

    let text = EXPRESSION
        .replace_all(template, |caps: &Captures<'_>| {
            count += 1;
            if caps[1].trim().is_empty() {
                return caps[0].to_string();
            }
            let (path, type_hint) = split_type_hint(&caps[1]);
            if type_hint.is_some() {
                hint = type_hint;
            }
            resolve_path(stack, path)
        })
        .into_owned();

    let cell_type = if count > 1 {
        CellType::String
    } else {
        hint.unwrap_or_else(|| infer_type(&text))
    };

    if cell_type == CellType::Formula {
        return CellContent {
            text,
            cell_type,
            style: None,
        };
    }

    let (text, style) = apply_emphasis(&text);
    CellContent {
        text,
        cell_type,
        style,
    }
}

/// Substitute expressions in attribute text. Type hints are dropped.
pub fn expand_text(template: &str, stack: &ContextStack) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    EXPRESSION
        .replace_all(template, |caps: &Captures<'_>| {
            if caps[1].trim().is_empty() {
                return caps[0].to_string();
            }
            let (path, _) = split_type_hint(&caps[1]);
            resolve_path(stack, path)
        })
        .into_owned()
}

/// Split `x.y:int` into (`x.y`, `Some(Number)`).
pub fn split_type_hint(expression: &str) -> (&str, Option<CellType>) {
    let expression = expression.trim();
    match TYPE_HINT.captures(expression) {
        Some(caps) => {
            let whole = caps.get(0).map_or(expression.len(), |m| m.start());
            let cell_type = match caps[1].to_ascii_lowercase().as_str() {
                "int" | "float" | "number" => CellType::Number,
                "bool" | "boolean" => CellType::Boolean,
                "date" => CellType::Date,
                _ => CellType::String,
            };
            (expression[..whole].trim(), Some(cell_type))
        }
        None => (expression, None),
    }
}

/// Resolve an expression to a value.
///
/// Quoted literals (`"x"` or `'x'`) yield their contents, numeric-looking
/// tokens yield themselves and `true`/`false` yield booleans. Anything else is
/// a dotted path (a leading `.` is ignored) looked up innermost scope first.
pub fn resolve_value<'a>(stack: &'a ContextStack, expression: &str) -> Option<Cow<'a, Value>> {
    let expression = expression.trim();

    for quote in ['"', '\''] {
        if expression.len() >= 2 && expression.starts_with(quote) && expression.ends_with(quote) {
            let inner = &expression[1..expression.len() - 1];
            return Some(Cow::Owned(Value::String(inner.to_string())));
        }
    }
    if NUMBER.is_match(expression) {
        return Some(Cow::Owned(Value::String(expression.to_string())));
    }
    if expression.eq_ignore_ascii_case("true") {
        return Some(Cow::Owned(Value::Bool(true)));
    }
    if expression.eq_ignore_ascii_case("false") {
        return Some(Cow::Owned(Value::Bool(false)));
    }

    let path = expression.strip_prefix('.').unwrap_or(expression);
    let segments: Vec<&str> = path.split('.').map(str::trim).collect();
    stack.lookup(&segments).map(Cow::Borrowed)
}

/// Resolve an expression to text. Unresolved paths become the empty string.
pub fn resolve_path(stack: &ContextStack, expression: &str) -> String {
    resolve_value(stack, expression)
        .map(|value| value.render())
        .unwrap_or_default()
}

/// Infer a cell type from its final text.
///
/// Precedence: empty → String, leading `=` → Formula, `true`/`false` →
/// Boolean, signed decimal → Number, valid ISO date → Date, else String.
pub fn infer_type(text: &str) -> CellType {
    if text.is_empty() {
        return CellType::String;
    }
    if text.starts_with('=') {
        return CellType::Formula;
    }
    let lowered = text.trim().to_ascii_lowercase();
    if lowered == "true" || lowered == "false" {
        return CellType::Boolean;
    }
    if NUMBER.is_match(text) {
        return CellType::Number;
    }
    if is_date(text) {
        return CellType::Date;
    }
    CellType::String
}

/// `YYYY-MM-DD`, optionally followed by a time, naming a real calendar day.
pub fn is_date(text: &str) -> bool {
    DATE.captures(text.trim())
        .and_then(|caps| caps.get(1))
        .is_some_and(|day| NaiveDate::parse_from_str(day.as_str(), "%Y-%m-%d").is_ok())
}

/// Strip `**bold**` then `_italic_` markers, returning the clean text and the
/// style they imply.
pub fn apply_emphasis(text: &str) -> (String, Option<Style>) {
    let bold = BOLD.is_match(text);
    let cleaned = BOLD.replace_all(text, "$1");
    let italic = ITALIC.is_match(&cleaned);
    let cleaned = ITALIC.replace_all(&cleaned, "$1$2$3").into_owned();

    if !bold && !italic {
        return (cleaned, None);
    }
    let style = Style {
        bold,
        italic,
        ..Style::default()
    };
    (cleaned, Some(style))
}
