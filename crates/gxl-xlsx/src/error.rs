/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for package writing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XlsxWriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The workbook cannot be represented as a valid package.
    #[error("invalid workbook: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, XlsxWriteError>;
