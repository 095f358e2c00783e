//! # Output
//!
//! Renders the final document and writes it to disk.

use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Pretty-printed JSON with a trailing newline.
pub fn render_json(doc: &Value) -> AppResult<String> {
    let mut out = serde_json::to_string_pretty(doc)
        .map_err(|e| AppError::Serialize(format!("JSON serialization failed: {}", e)))?;
    out.push('\n');
    Ok(out)
}

/// Block-style YAML.
pub fn render_yaml(doc: &Value) -> AppResult<String> {
    serde_yaml::to_string(doc)
        .map_err(|e| AppError::Serialize(format!("YAML serialization failed: {}", e)))
}

/// Writes `content` to `path`, creating parent directories and replacing any existing file.
pub fn write_output(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::General(format!("Failed to create output directory {:?}: {}", parent, e))
            })?;
        }
    }
    fs::write(path, content)
        .map_err(|e| AppError::General(format!("Failed to write {:?}: {}", path, e)))
}

/// Writes the JSON and YAML renderings of `doc`. Both are rendered before
/// either file is touched.
pub fn persist(doc: &Value, json_path: &Path, yaml_path: &Path) -> AppResult<()> {
    let json = render_json(doc)?;
    let yaml = render_yaml(doc)?;
    write_output(json_path, &json)?;
    write_output(yaml_path, &yaml)?;
    Ok(())
}
