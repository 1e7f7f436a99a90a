/*
 * eval_context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render-wide settings and the diagnostic sink.
//!
//! [`DiagnosticCollector`] gathers non-fatal findings (a loop over something
//! that is not a list, an unknown border style) so callers can report them.
//! Rendering never depends on it: output is identical whether or not anyone
//! looks at the diagnostics.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Default bound on nested imports.
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 10;

/// A single render warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Sheet being rendered when the finding was made.
    pub sheet: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "warning [{}]: {}", sheet, self.message),
            None => write!(f, "warning: {}", self.message),
        }
    }
}

/// Collector for diagnostics raised during rendering.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Record a warning, also emitting it as a `tracing` event.
    pub fn warn(&mut self, sheet: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(sheet = sheet.unwrap_or_default(), "{}", message);
        self.diagnostics.push(Diagnostic {
            message,
            sheet: sheet.map(str::to_string),
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Settings for a render call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Directory for resolving relative imports when the template has no
    /// source path. Defaults to the working directory.
    pub base_dir: Option<PathBuf>,

    /// Maximum number of nested imports.
    pub max_import_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}
