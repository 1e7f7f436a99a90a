/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template rendering.

use std::path::PathBuf;

use gxl_markup::MarkupError;
use gxl_model::A1ParseError;
use thiserror::Error;

/// Errors that can occur while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A cell or range reference could not be decoded.
    #[error("invalid reference '{reference}' in sheet '{sheet}': {source}")]
    InvalidReference {
        reference: String,
        sheet: String,
        #[source]
        source: A1ParseError,
    },

    /// A `<For each="...">` header is not of the form `name in path`.
    #[error("invalid loop header '{header}': expected '<name> in <path>'")]
    InvalidSyntax { header: String },

    /// An import chain re-entered a file that is still being resolved.
    #[error("circular import detected: {}", path.display())]
    CircularImport { path: PathBuf },

    /// Import nesting went deeper than the configured limit.
    #[error("import depth exceeded (max {max_depth}) while importing {}", path.display())]
    ImportDepthExceeded { path: PathBuf, max_depth: usize },

    /// The imported file has no sheet with the requested name.
    #[error("sheet \"{sheet}\" not found in {}", path.display())]
    SheetNotFound { sheet: String, path: PathBuf },

    /// The imported file does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// An imported file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Markup {
        path: PathBuf,
        #[source]
        source: MarkupError,
    },

    /// I/O error while reading an imported file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
