/*
 * data.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Loading render data from JSON or YAML files.

use std::path::Path;

use gxl_template::Value;

use crate::error::{GxlError, Result, read_file};

/// Data file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSyntax {
    Json,
    Yaml,
}

impl DataSyntax {
    /// `None` for extensions that are neither JSON nor YAML.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DataSyntax::Json),
            "yaml" | "yml" => Some(DataSyntax::Yaml),
            _ => None,
        }
    }
}

/// Load a data file into a mapping [`Value`].
///
/// Files with an unrecognized extension are tried as JSON, then as YAML.
pub fn load_data(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    let text = String::from_utf8(bytes).map_err(|err| GxlError::DataFormat {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let value = match DataSyntax::from_path(path) {
        Some(syntax) => parse_data(&text, syntax),
        None => parse_data(&text, DataSyntax::Json)
            .or_else(|_| parse_data(&text, DataSyntax::Yaml)),
    }
    .map_err(|message| GxlError::DataFormat {
        path: path.to_path_buf(),
        message,
    })?;

    tracing::debug!(path = %path.display(), "loaded data");
    Ok(value)
}

/// Parse data text. The top level must be a mapping.
pub fn parse_data(text: &str, syntax: DataSyntax) -> std::result::Result<Value, String> {
    let value = match syntax {
        DataSyntax::Json => serde_json::from_str::<serde_json::Value>(text)
            .map(Value::from)
            .map_err(|e| e.to_string())?,
        DataSyntax::Yaml => serde_yaml::from_str::<serde_yaml::Value>(text)
            .map(Value::from)
            .map_err(|e| e.to_string())?,
    };

    match value {
        Value::Map(_) => Ok(value),
        _ => Err("top-level value must be a mapping".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_syntax_from_extension() {
        assert_eq!(DataSyntax::from_path(Path::new("a.JSON")), Some(DataSyntax::Json));
        assert_eq!(DataSyntax::from_path(Path::new("a.yml")), Some(DataSyntax::Yaml));
        assert_eq!(DataSyntax::from_path(Path::new("a.txt")), None);
        assert_eq!(DataSyntax::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_yaml_keys_are_stringified() {
        let value = parse_data("1: one\ntrue: yes\n", DataSyntax::Yaml).unwrap();
        let map = value.as_map().unwrap();
        assert!(map.contains_key("1"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_non_mapping_top_level_is_rejected() {
        assert!(parse_data("[1, 2]", DataSyntax::Json).is_err());
        assert!(parse_data("just text", DataSyntax::Yaml).is_err());
    }

    #[test]
    fn test_invalid_json_reports_message() {
        let err = parse_data("{ nope", DataSyntax::Json).unwrap_err();
        assert!(!err.is_empty());
    }
}
