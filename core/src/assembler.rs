//! # Spec Assembler
//!
//! Pipeline: load base -> load version -> load fallback -> load & merge
//! fragments -> merge into base -> stamp metadata -> resolve dangling
//! references -> (sort schemas) -> persist.

use crate::document::{into_schemas, load_document, load_version, schemas_mut};
use crate::error::{AppError, AppResult};
use crate::fragments::{discover_fragments, load_fragments, MergedFragments};
use crate::output::persist;
use crate::refs::{resolve_dangling_refs, FallbackSchemas};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Server URL used when no path prefix is configured.
pub const DEFAULT_PATH_PREFIX: &str = "/mdw/v3";

/// Suffix identifying fragment files inside the docs directory.
pub const DEFAULT_FRAGMENT_SUFFIX: &str = ".spec.yaml";

/// Inputs and outputs of one assembler run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerConfig {
    /// Directory holding the base document and the fragments.
    pub docs_dir: PathBuf,
    /// Base document file name, relative to `docs_dir`.
    pub base_file: String,
    /// Fragment file-name suffix.
    pub fragment_suffix: String,
    /// Text file holding the version string.
    pub version_file: PathBuf,
    /// Optional full document whose schemas backfill dangling references.
    /// A path that does not exist is treated as an empty source.
    pub fallback: Option<PathBuf>,
    /// Value stamped into `servers[0].url`.
    pub path_prefix: String,
    /// JSON output path.
    pub json_out: PathBuf,
    /// YAML output path.
    pub yaml_out: PathBuf,
    /// Sort `components.schemas` by name before writing.
    pub sort_schemas: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs/swagger_v2"),
            base_file: "base.yaml".to_string(),
            fragment_suffix: DEFAULT_FRAGMENT_SUFFIX.to_string(),
            version_file: PathBuf::from("AEMDW_VERSION"),
            fallback: Some(PathBuf::from("docs/swagger_v2/swagger_v2_fallback.yaml")),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            json_out: PathBuf::from("priv/static/swagger/swagger_v3.json"),
            yaml_out: PathBuf::from("priv/static/swagger/swagger_v3.yaml"),
            sort_schemas: true,
        }
    }
}

impl AssemblerConfig {
    /// Full path of the base document.
    pub fn base_path(&self) -> PathBuf {
        self.docs_dir.join(&self.base_file)
    }
}

/// Result of an in-memory assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    /// The final document.
    pub document: Value,
    /// Number of fragment files merged.
    pub fragment_count: usize,
    /// Number of schemas copied from the fallback source.
    pub added_schemas: usize,
}

/// Loads the fallback schema table. `None` or a missing file yields an empty table.
pub fn load_fallback(path: Option<&Path>) -> AppResult<FallbackSchemas> {
    match path {
        Some(path) if path.exists() => {
            let doc = load_document(path)?;
            Ok(FallbackSchemas::new(into_schemas(doc, path)?))
        }
        Some(path) => {
            tracing::debug!(fallback = %path.display(), "fallback source not found, using empty table");
            Ok(FallbackSchemas::empty())
        }
        None => Ok(FallbackSchemas::empty()),
    }
}

/// Merges fragments into the base document and stamps version and server URL.
///
/// `paths` is replaced outright; fragment schemas are layered over the base's
/// schemas. `base_path` only labels errors.
pub fn merge_and_stamp(
    base: &mut Value,
    base_path: &Path,
    merged: MergedFragments,
    version: &str,
    server_url: &str,
) -> AppResult<()> {
    let schemas = schemas_mut(base, base_path)?;
    for (name, definition) in merged.schemas {
        schemas.insert(name, definition);
    }

    let root = base.as_object_mut().ok_or_else(|| AppError::Parse {
        path: base_path.to_path_buf(),
        message: "base document is not a mapping".to_string(),
    })?;

    root.insert("paths".to_string(), Value::Object(merged.paths));
    stamp_version(root, base_path, version)?;
    stamp_server_url(root, base_path, server_url)
}

fn stamp_version(root: &mut Map<String, Value>, base_path: &Path, version: &str) -> AppResult<()> {
    let info = root
        .entry("info")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| AppError::MissingKey {
            path: base_path.to_path_buf(),
            key: "info".to_string(),
        })?;
    info.insert("version".to_string(), Value::String(version.to_string()));
    Ok(())
}

fn stamp_server_url(root: &mut Map<String, Value>, base_path: &Path, url: &str) -> AppResult<()> {
    let invalid = || AppError::MissingKey {
        path: base_path.to_path_buf(),
        key: "servers".to_string(),
    };

    let servers = root
        .entry("servers")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(invalid)?;

    if servers.is_empty() {
        servers.push(json!({ "url": url }));
        return Ok(());
    }

    let first = servers[0].as_object_mut().ok_or_else(invalid)?;
    first.insert("url".to_string(), Value::String(url.to_string()));
    Ok(())
}

/// Rebuilds `components.schemas` with its keys in lexicographic order.
pub fn sort_schemas(doc: &mut Value, base_path: &Path) -> AppResult<()> {
    let schemas = schemas_mut(doc, base_path)?;
    let mut entries: Vec<(String, Value)> = std::mem::take(schemas).into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    schemas.extend(entries);
    Ok(())
}

/// Runs every step except writing the outputs.
pub fn assemble(config: &AssemblerConfig) -> AppResult<Assembled> {
    let base_path = config.base_path();
    let mut document = load_document(&base_path)?;
    let version = load_version(&config.version_file)?;
    let fallback = load_fallback(config.fallback.as_deref())?;

    let fragment_paths = discover_fragments(&config.docs_dir, &config.fragment_suffix)?;
    let merged = load_fragments(&fragment_paths)?;
    let fragment_count = merged.fragment_count;

    merge_and_stamp(&mut document, &base_path, merged, &version, &config.path_prefix)?;
    let added_schemas = resolve_dangling_refs(&mut document, &base_path, &fallback)?;

    if config.sort_schemas {
        sort_schemas(&mut document, &base_path)?;
    }

    Ok(Assembled {
        document,
        fragment_count,
        added_schemas,
    })
}

/// Assembles the document and writes both outputs.
pub fn run(config: &AssemblerConfig) -> AppResult<Assembled> {
    let assembled = assemble(config)?;
    persist(&assembled.document, &config.json_out, &config.yaml_out)?;
    Ok(assembled)
}
