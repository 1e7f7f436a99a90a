/*
 * style.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Cell formatting values and the style cascade.
//!
//! A [`Style`] is an immutable value. Cascading is expressed by
//! [`Style::overlay`] (and the option-aware [`merge_styles`]): the overlay wins
//! field by field, booleans combine with logical OR, and an unset field never
//! clobbers a set one. A border is replaced wholesale when the overlay has one.
//!
//! `Style` implements `Hash` + `Eq` over every field, so identical values can be
//! interned by the encoder without a hand-written signature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            BorderStyle::Thin => "thin",
            BorderStyle::Medium => "medium",
            BorderStyle::Thick => "thick",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
        }
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thin" => Ok(BorderStyle::Thin),
            "medium" => Ok(BorderStyle::Medium),
            "thick" => Ok(BorderStyle::Thick),
            "dashed" => Ok(BorderStyle::Dashed),
            "dotted" => Ok(BorderStyle::Dotted),
            "double" => Ok(BorderStyle::Double),
            other => Err(format!("unknown border style '{}'", other)),
        }
    }
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which edges of a cell a border is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSides {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl BorderSides {
    pub const ALL: BorderSides = BorderSides {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub const NONE: BorderSides = BorderSides {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };

    /// Parse `all` or a comma list such as `top, bottom`.
    ///
    /// Unknown tokens are ignored. An empty list means all four sides.
    pub fn parse(spec: &str) -> Self {
        let mut sides = BorderSides::NONE;
        let mut any = false;
        for token in spec.split(',').map(|t| t.trim().to_ascii_lowercase()) {
            match token.as_str() {
                "all" => return BorderSides::ALL,
                "top" => sides.top = true,
                "right" => sides.right = true,
                "bottom" => sides.bottom = true,
                "left" => sides.left = true,
                _ => continue,
            }
            any = true;
        }
        if any { sides } else { BorderSides::ALL }
    }
}

impl Default for BorderSides {
    fn default() -> Self {
        BorderSides::ALL
    }
}

/// A cell border: one line style and optional color applied to a set of sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    /// RGB hex without `#`, upper-cased.
    pub color: Option<String>,
    pub sides: BorderSides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl HorizontalAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            HorizontalAlign::Left => "left",
            HorizontalAlign::Center => "center",
            HorizontalAlign::Right => "right",
            HorizontalAlign::Justify => "justify",
        }
    }
}

impl FromStr for HorizontalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(HorizontalAlign::Left),
            "center" | "centre" => Ok(HorizontalAlign::Center),
            "right" => Ok(HorizontalAlign::Right),
            "justify" => Ok(HorizontalAlign::Justify),
            other => Err(format!("unknown horizontal alignment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Center => "center",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(VerticalAlign::Top),
            "center" | "middle" => Ok(VerticalAlign::Center),
            "bottom" => Ok(VerticalAlign::Bottom),
            other => Err(format!("unknown vertical alignment '{}'", other)),
        }
    }
}

/// Formatting for a single cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_name: Option<String>,
    pub font_size: Option<u32>,
    /// RGB hex without `#`, upper-cased.
    pub font_color: Option<String>,
    /// RGB hex without `#`, upper-cased.
    pub fill_color: Option<String>,
    pub border: Option<Border>,
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
}

impl Style {
    /// True when no field is set; such a style is equivalent to no style.
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// Return a new style with `top` laid over `self`.
    pub fn overlay(&self, top: &Style) -> Style {
        Style {
            bold: self.bold || top.bold,
            italic: self.italic || top.italic,
            underline: self.underline || top.underline,
            font_name: top.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: top.font_size.or(self.font_size),
            font_color: top.font_color.clone().or_else(|| self.font_color.clone()),
            fill_color: top.fill_color.clone().or_else(|| self.fill_color.clone()),
            border: top.border.clone().or_else(|| self.border.clone()),
            horizontal: top.horizontal.or(self.horizontal),
            vertical: top.vertical.or(self.vertical),
        }
    }
}

/// Cascade `top` over `base`. Returns `None` only when neither side has a style.
pub fn merge_styles(base: Option<&Style>, top: Option<&Style>) -> Option<Style> {
    match (base, top) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(top)) => Some(top.clone()),
        (Some(base), Some(top)) => Some(base.overlay(top)),
    }
}

/// Normalize a color literal: trim, drop a leading `#`, upper-case.
pub fn normalize_color(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('#')
        .unwrap_or(trimmed)
        .to_ascii_uppercase()
}
