/*
 * units.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Column-width and row-height literal conversion.
//!
//! Column widths are expressed in characters (the spreadsheet's native width
//! unit) and row heights in points. Literals may carry a unit suffix:
//! `12`, `12ch`, `2.5cm`, `20mm`, `1in`, `14pt`, `100px`.

use thiserror::Error;

const PX_PER_INCH: f64 = 96.0;
const PT_PER_INCH: f64 = 72.0;
const CM_PER_INCH: f64 = 2.54;

/// A length literal whose numeric part could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid length literal '{literal}'")]
pub struct UnitError {
    pub literal: String,
}

/// Split `2.5cm` into (`2.5`, `cm`). The unit is lower-cased.
fn split_number_unit(literal: &str) -> (&str, String) {
    let s = literal.trim();
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-'))
        .map_or(s.len(), |(i, _)| i);
    (&s[..end], s[end..].trim().to_ascii_lowercase())
}

fn parse_number(number: &str, literal: &str) -> Result<f64, UnitError> {
    number.parse::<f64>().map_err(|_| UnitError {
        literal: literal.to_string(),
    })
}

/// Convert a column-width literal to characters.
///
/// Physical units go through pixels at 96 dpi; pixels map to characters with
/// the usual `(px - 5) / 7` padding formula, clamped at zero and rounded to
/// two decimals. Unknown units are treated as characters.
pub fn parse_col_width(literal: &str) -> Result<f64, UnitError> {
    let (number, unit) = split_number_unit(literal);
    let value = parse_number(number, literal)?;

    let px = match unit.as_str() {
        "" | "ch" => return Ok(value),
        "in" => value * PX_PER_INCH,
        "cm" => value / CM_PER_INCH * PX_PER_INCH,
        "mm" => value / 10.0 / CM_PER_INCH * PX_PER_INCH,
        "pt" => value / PT_PER_INCH * PX_PER_INCH,
        "px" => value,
        _ => return Ok(value),
    };

    let chars = ((px - 5.0) / 7.0).max(0.0);
    Ok((chars * 100.0).round() / 100.0)
}

/// Convert a row-height literal to points. Unknown units are treated as points.
pub fn parse_row_height(literal: &str) -> Result<f64, UnitError> {
    let (number, unit) = split_number_unit(literal);
    let value = parse_number(number, literal)?;

    Ok(match unit.as_str() {
        "" | "pt" => value,
        "in" => value * PT_PER_INCH,
        "cm" => value / CM_PER_INCH * PT_PER_INCH,
        "mm" => value / 10.0 / CM_PER_INCH * PT_PER_INCH,
        "px" => value / PX_PER_INCH * PT_PER_INCH,
        _ => value,
    })
}
