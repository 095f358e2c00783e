//! # Schema Reference Closure
//!
//! Finds `#/components/schemas/<name>` pointers anywhere in a document and
//! backfills the ones that dangle from a fallback schema table until a fixed
//! point is reached.

use crate::document::{schemas, schemas_mut};
use crate::error::{AppError, AppResult};
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Extracts the schema name from a local `#/components/schemas/<name>...` pointer.
///
/// The name is the first segment after `schemas/`, so pointers into a schema
/// (`#/components/schemas/User/properties/id`) still name `User`. Pointer
/// escapes (`~1`, `~0`) and percent-encoding are decoded. Pointers into
/// other component sections and external documents return `None`.
pub fn schema_ref_name(ref_str: &str) -> Option<String> {
    static SCHEMA_REF_RE: OnceLock<Regex> = OnceLock::new();
    let re = SCHEMA_REF_RE.get_or_init(|| {
        Regex::new(r"^#/components/schemas/([^/]+)(?:/.*)?$").expect("Invalid regex")
    });

    let segment = re.captures(ref_str)?.get(1)?.as_str();
    let name = decode_pointer_segment(segment);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Collects every schema name pointed at anywhere under `value`.
///
/// Every string is checked, not only `$ref` values, so pointers held in
/// `discriminator.mapping` and similar places count too.
pub fn collect_schema_refs(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => {
            if let Some(name) = schema_ref_name(s) {
                names.insert(name);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                collect_schema_refs(v, names);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_schema_refs(v, names);
            }
        }
        _ => {}
    }
}

/// Names referenced somewhere in `doc` that are not keys of `schemas`.
pub fn dangling_refs(doc: &Value, schemas: &Map<String, Value>) -> BTreeSet<String> {
    let mut referenced = BTreeSet::new();
    collect_schema_refs(doc, &mut referenced);
    referenced.retain(|name| !schemas.contains_key(name));
    referenced
}

/// Read-only lookup table of schema definitions used for backfilling.
#[derive(Debug, Clone, Default)]
pub struct FallbackSchemas {
    schemas: Map<String, Value>,
}

impl FallbackSchemas {
    /// Wraps a `components.schemas` mapping.
    pub fn new(schemas: Map<String, Value>) -> Self {
        Self { schemas }
    }

    /// An empty table: every dangling reference is unresolved.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks a schema up by name.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Number of definitions available.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when no definitions are available.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Copies missing schema definitions from `fallback` into `doc`'s
/// `components.schemas` until no reference dangles.
///
/// Each pass scans the whole document, including definitions copied by the
/// previous pass, so transitive references are followed. Returns the number
/// of schemas added. A name the fallback cannot supply fails the whole
/// resolution with `AppError::UnresolvedReference`; `doc` may then hold the
/// schemas copied before the failure. `doc_path` only labels errors.
pub fn resolve_dangling_refs(
    doc: &mut Value,
    doc_path: &Path,
    fallback: &FallbackSchemas,
) -> AppResult<usize> {
    let mut added = 0;

    loop {
        let missing = dangling_refs(doc, schemas(doc, doc_path)?);
        if missing.is_empty() {
            return Ok(added);
        }

        let mut backfill = Vec::with_capacity(missing.len());
        for name in missing {
            let definition = fallback
                .lookup(&name)
                .ok_or_else(|| AppError::UnresolvedReference(name.clone()))?;
            backfill.push((name, definition.clone()));
        }

        let target = schemas_mut(doc, doc_path)?;
        for (name, definition) in backfill {
            tracing::info!(schema = %name, "backfilled schema from fallback source");
            target.insert(name, definition);
            added += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback(value: Value) -> FallbackSchemas {
        match value {
            Value::Object(map) => FallbackSchemas::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_schema_ref_name() {
        assert_eq!(
            schema_ref_name("#/components/schemas/Transaction").as_deref(),
            Some("Transaction")
        );
        assert_eq!(
            schema_ref_name("#/components/schemas/Name%20Claim~1v2").as_deref(),
            Some("Name Claim/v2")
        );
        assert_eq!(schema_ref_name("#/components/responses/NotFound"), None);
        assert_eq!(
            schema_ref_name("#/components/schemas/A/properties/b").as_deref(),
            Some("A")
        );
        assert_eq!(schema_ref_name("other.yaml#/components/schemas/A"), None);
        assert_eq!(schema_ref_name("#/components/schemas/"), None);
    }

    #[test]
    fn test_collect_schema_refs_walks_arrays_and_objects() {
        let doc = json!({
            "paths": {
                "/txs": {
                    "get": {
                        "responses": {
                            "200": { "content": { "application/json": { "schema": {
                                "oneOf": [
                                    { "$ref": "#/components/schemas/Tx" },
                                    { "$ref": "#/components/schemas/Block" }
                                ]
                            } } } }
                        },
                        "parameters": [{ "$ref": "#/components/parameters/Limit" }],
                        "description": "Returns #/components/schemas/Ghost entries"
                    }
                }
            }
        });
        let mut names = BTreeSet::new();
        collect_schema_refs(&doc, &mut names);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["Block", "Tx"]);
    }

    #[test]
    fn test_resolve_transitive_closure() {
        let mut doc = json!({
            "paths": { "/x": { "get": { "$ref": "#/components/schemas/B" } } },
            "components": { "schemas": { "A": { "type": "object" } } }
        });
        let source = fallback(json!({
            "B": { "$ref": "#/components/schemas/C" },
            "C": { "properties": { "d": { "$ref": "#/components/schemas/D" } } },
            "D": { "type": "string" },
            "Unused": { "type": "string" }
        }));

        let added = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &source).unwrap();
        assert_eq!(added, 3);
        let schemas = doc["components"]["schemas"].as_object().unwrap();
        let keys: Vec<&String> = schemas.keys().collect();
        assert_eq!(keys, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_resolve_self_reference_terminates() {
        let mut doc = json!({
            "components": { "schemas": { "Node": { "items": { "$ref": "#/components/schemas/Node" } } } }
        });
        let added = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &FallbackSchemas::empty()).unwrap();
        assert_eq!(added, 0);
    }

    #[test]
    fn test_resolve_cycle_through_fallback() {
        let mut doc = json!({
            "components": { "schemas": { "A": { "$ref": "#/components/schemas/B" } } }
        });
        let source = fallback(json!({
            "B": { "$ref": "#/components/schemas/C" },
            "C": { "$ref": "#/components/schemas/B" }
        }));
        assert_eq!(resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &source).unwrap(), 2);
    }

    #[test]
    fn test_resolve_unresolved_reference() {
        let mut doc = json!({
            "components": { "schemas": { "A": { "$ref": "#/components/schemas/Ghost" } } }
        });
        let err = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &FallbackSchemas::empty()).unwrap_err();
        assert!(matches!(err, AppError::UnresolvedReference(ref name) if name == "Ghost"));
    }

    #[test]
    fn test_collect_schema_refs_from_discriminator_mapping() {
        let doc = json!({
            "Pet": {
                "oneOf": [{ "$ref": "#/components/schemas/Dog" }],
                "discriminator": {
                    "propertyName": "kind",
                    "mapping": { "cat": "#/components/schemas/Cat" }
                }
            }
        });
        let mut names = BTreeSet::new();
        collect_schema_refs(&doc, &mut names);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["Cat", "Dog"]);
    }

    #[test]
    fn test_resolve_deep_pointer_to_missing_schema() {
        let mut doc = json!({
            "components": { "schemas": { "A": { "$ref": "#/components/schemas/Ghost/properties/id" } } }
        });
        let err = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &FallbackSchemas::empty())
            .unwrap_err();
        assert!(matches!(err, AppError::UnresolvedReference(ref name) if name == "Ghost"));

        let source = fallback(json!({ "Ghost": { "properties": { "id": { "type": "integer" } } } }));
        let added = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &source).unwrap();
        assert_eq!(added, 1);
    }

    #[test]
    fn test_resolve_discriminator_mapping_to_missing_schema() {
        let mut doc = json!({
            "components": { "schemas": { "Pet": {
                "discriminator": { "propertyName": "kind", "mapping": { "cat": "#/components/schemas/Cat" } }
            } } }
        });
        let err = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &FallbackSchemas::empty())
            .unwrap_err();
        assert!(matches!(err, AppError::UnresolvedReference(ref name) if name == "Cat"));
    }

    #[test]
    fn test_resolve_requires_components_schemas() {
        let mut doc = json!({ "paths": {} });
        let err = resolve_dangling_refs(&mut doc, Path::new("base.yaml"), &FallbackSchemas::empty())
            .unwrap_err();
        assert!(matches!(err, AppError::MissingKey { ref key, .. } if key == "components.schemas"));
    }
}
