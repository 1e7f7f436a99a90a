/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render configuration.

use std::path::PathBuf;

use gxl_template::{DEFAULT_MAX_IMPORT_DEPTH, RenderOptions};
use serde::Deserialize;

/// Settings for [`crate::render_with`].
///
/// Deserializable so embedders can keep it in their own config files:
///
/// ```yaml
/// base_dir: templates
/// max_import_depth: 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Resolves relative imports of a template that has no source path.
    /// Defaults to the working directory.
    pub base_dir: Option<PathBuf>,

    /// Maximum number of nested imports.
    pub max_import_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
        }
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        RenderOptions {
            base_dir: config.base_dir.clone(),
            max_import_depth: config.max_import_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RenderConfig = serde_yaml::from_str("base_dir: templates").unwrap();
        assert_eq!(config.base_dir, Some(PathBuf::from("templates")));
        assert_eq!(config.max_import_depth, 10);
    }

    #[test]
    fn test_config_converts_to_options() {
        let config = RenderConfig {
            base_dir: None,
            max_import_depth: 3,
        };
        let options = RenderOptions::from(&config);
        assert_eq!(options.max_import_depth, 3);
        assert_eq!(options.base_dir, None);
    }
}
