//! # Fragment Discovery and Merging
//!
//! Fragments are partial documents carrying only `schemas` and `paths`.
//! They are discovered by file-name suffix, processed in sorted order, and
//! folded into a single [`MergedFragments`] with last-write-wins semantics.

use crate::document::{parse_document, read_input, Format};
use crate::error::{AppError, AppResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The union of every fragment's `schemas` and `paths`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedFragments {
    /// Schema name -> definition.
    pub schemas: Map<String, Value>,
    /// Endpoint path -> path item.
    pub paths: Map<String, Value>,
    /// Number of fragment files folded in.
    pub fragment_count: usize,
}

impl MergedFragments {
    /// Folds one fragment in. Later fragments overwrite earlier entries with the
    /// same key; an overwritten key keeps its original position.
    pub fn merge(&mut self, source: &Path, schemas: Map<String, Value>, paths: Map<String, Value>) {
        merge_section(&mut self.schemas, schemas, source, "schemas");
        merge_section(&mut self.paths, paths, source, "paths");
        self.fragment_count += 1;
    }
}

fn merge_section(
    target: &mut Map<String, Value>,
    incoming: Map<String, Value>,
    source: &Path,
    section: &str,
) {
    for (key, value) in incoming {
        if target.insert(key.clone(), value).is_some() {
            tracing::debug!(
                fragment = %source.display(),
                section,
                key = %key,
                "fragment overrides earlier definition"
            );
        }
    }
}

/// Lists the files directly inside `dir` whose name ends with `suffix`,
/// sorted by file name so the merge order does not depend on the filesystem.
pub fn discover_fragments(dir: &Path, suffix: &str) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::MissingFile(dir.to_path_buf()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| AppError::General(format!("Failed to list {:?}: {}", dir, e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches {
            found.push(entry.into_path());
        }
    }

    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

/// Splits a parsed fragment into its `schemas` and `paths` maps.
///
/// Both keys are required and must be mappings.
pub fn split_fragment(
    value: Value,
    path: &Path,
) -> AppResult<(Map<String, Value>, Map<String, Value>)> {
    let mut root = match value {
        Value::Object(root) => root,
        _ => {
            return Err(AppError::Parse {
                path: path.to_path_buf(),
                message: "fragment is not a mapping".to_string(),
            })
        }
    };

    let mut take = |key: &str| match root.remove(key) {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(AppError::MissingKey {
            path: path.to_path_buf(),
            key: key.to_string(),
        }),
    };

    let schemas = take("schemas")?;
    let paths = take("paths")?;
    Ok((schemas, paths))
}

/// Loads every fragment in `paths`, in the given order, into one merged set.
pub fn load_fragments(paths: &[PathBuf]) -> AppResult<MergedFragments> {
    let mut merged = MergedFragments::default();

    for path in paths {
        let content = read_input(path)?;
        let value = parse_document(&content, Format::from_path(path), path)?;
        let (schemas, paths) = split_fragment(value, path)?;
        tracing::debug!(
            fragment = %path.display(),
            schemas = schemas.len(),
            paths = paths.len(),
            "loaded fragment"
        );
        merged.merge(path, schemas, paths);
    }

    Ok(merged)
}
