//! # Document Loading
//!
//! Reads specification documents, fragments and the version file from disk
//! into `serde_json::Value` trees. Key order is preserved (`preserve_order`),
//! so the output keeps the layout of the inputs.

use crate::error::{AppError, AppResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Serialized form of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.json` files.
    Json,
    /// Everything else (`.yaml`, `.yml`, ...).
    Yaml,
}

impl Format {
    /// Picks the format from a file extension. Unknown extensions are treated as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Reads a file, mapping a missing file to `AppError::MissingFile`.
pub fn read_input(path: &Path) -> AppResult<String> {
    if !path.exists() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Parses document text in the given format.
///
/// YAML is read through `serde_yaml::Value` first so that non-string mapping
/// keys (unquoted status codes such as `200:`) become JSON string keys
/// instead of failing.
pub fn parse_document(content: &str, format: Format, path: &Path) -> AppResult<Value> {
    let parse_err = |message: String| AppError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            serde_json::to_value(yaml).map_err(|e| parse_err(e.to_string()))
        }
    }
}

/// Loads and parses a document, choosing the format by extension.
pub fn load_document(path: &Path) -> AppResult<Value> {
    let content = read_input(path)?;
    parse_document(&content, Format::from_path(path), path)
}

/// Reads the version file and returns its trimmed contents.
pub fn load_version(path: &Path) -> AppResult<String> {
    let content = read_input(path)?;
    Ok(content.trim().to_string())
}

fn missing_schemas(path: &Path) -> AppError {
    AppError::MissingKey {
        path: path.to_path_buf(),
        key: "components.schemas".to_string(),
    }
}

/// Returns the `components.schemas` mapping of a specification document.
///
/// `path` is only used to label the error when the key is absent.
pub fn schemas<'a>(doc: &'a Value, path: &Path) -> AppResult<&'a Map<String, Value>> {
    doc.get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
        .ok_or_else(|| missing_schemas(path))
}

/// Mutable counterpart of [`schemas`].
pub fn schemas_mut<'a>(doc: &'a mut Value, path: &Path) -> AppResult<&'a mut Map<String, Value>> {
    doc.get_mut("components")
        .and_then(|c| c.get_mut("schemas"))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| missing_schemas(path))
}

/// Takes the `components.schemas` mapping out of a document, consuming it.
pub fn into_schemas(doc: Value, path: &Path) -> AppResult<Map<String, Value>> {
    let missing = || missing_schemas(path);

    match doc {
        Value::Object(mut root) => match root.remove("components") {
            Some(Value::Object(mut components)) => match components.remove("schemas") {
                Some(Value::Object(schemas)) => Ok(schemas),
                _ => Err(missing()),
            },
            _ => Err(missing()),
        },
        _ => Err(missing()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("a/b.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a/b.spec.yml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("VERSION")), Format::Yaml);
    }

    #[test]
    fn test_parse_yaml_numeric_keys_become_strings() {
        let yaml = r#"
responses:
  200:
    description: OK
  '404':
    description: Not found
"#;
        let value = parse_document(yaml, Format::Yaml, Path::new("x.yaml")).unwrap();
        let responses = value["responses"].as_object().unwrap();
        let keys: Vec<&String> = responses.keys().collect();
        assert_eq!(keys, vec!["200", "404"]);
    }

    #[test]
    fn test_parse_yaml_preserves_key_order() {
        let yaml = "zeta: 1\nalpha: 2\nmid: 3\n";
        let value = parse_document(yaml, Format::Yaml, Path::new("x.yaml")).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_document("{ not json", Format::Json, Path::new("fallback.json")).unwrap_err();
        match err {
            AppError::Parse { path, .. } => assert_eq!(path, PathBuf::from("fallback.json")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_document_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.yaml");
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, AppError::MissingFile(p) if p == path));
    }

    #[test]
    fn test_load_version_trims() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("VERSION");
        fs::write(&path, "  1.42.0\n\n").unwrap();
        assert_eq!(load_version(&path).unwrap(), "1.42.0");
    }

    #[test]
    fn test_schemas_mut_requires_components_schemas() {
        let mut doc: Value = serde_json::json!({ "components": {} });
        let err = schemas_mut(&mut doc, Path::new("base.yaml")).unwrap_err();
        assert!(matches!(err, AppError::MissingKey { ref key, .. } if key == "components.schemas"));

        let mut doc: Value = serde_json::json!({ "components": { "schemas": { "A": {} } } });
        assert!(schemas_mut(&mut doc, Path::new("base.yaml"))
            .unwrap()
            .contains_key("A"));
    }

    #[test]
    fn test_into_schemas() {
        let doc: Value = serde_json::json!({
            "openapi": "3.0.0",
            "components": { "schemas": { "C": { "type": "string" } } }
        });
        let schemas = into_schemas(doc, Path::new("fallback.yaml")).unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas["C"]["type"], "string");
    }
}
