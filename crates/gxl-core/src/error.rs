/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error type for the gxl pipeline.

use std::path::PathBuf;

use gxl_markup::MarkupError;
use gxl_template::RenderError;
use gxl_xlsx::XlsxWriteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GxlError {
    /// The template markup is malformed or structurally invalid.
    #[error("parse error: {0}")]
    Parse(#[from] MarkupError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("write error: {0}")]
    Write(#[from] XlsxWriteError),

    /// A data file is not valid JSON/YAML or its top level is not a mapping.
    #[error("invalid data in {}: {message}", path.display())]
    DataFormat { path: PathBuf, message: String },

    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GxlError>;

/// Read a file, reporting a missing one as [`GxlError::MissingFile`].
pub(crate) fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => GxlError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => GxlError::Io(err),
    })
}
