/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Errors raised while reading template markup.

use thiserror::Error;

/// Result type alias for gxl-markup operations.
pub type Result<T> = std::result::Result<T, MarkupError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// Malformed markup reported by the tokenizer.
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { message: String, position: u64 },

    /// The input ended while elements were still open.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("empty document: no root element found")]
    EmptyDocument,

    #[error("invalid document: multiple root elements")]
    MultipleRoots,

    /// Elements nested past [`crate::xml::MAX_NESTING_DEPTH`].
    #[error("elements nested deeper than {max_depth} levels at byte {position}")]
    TooDeep { max_depth: usize, position: u64 },

    /// A `<Sheet>` or `<Import>` appeared inside a sheet.
    #[error("<{child}> is not allowed inside sheet '{sheet}'")]
    InvalidNesting { child: String, sheet: String },
}

impl MarkupError {
    /// True for nesting violations, as opposed to malformed markup.
    pub fn is_structural(&self) -> bool {
        matches!(self, MarkupError::InvalidNesting { .. })
    }
}

