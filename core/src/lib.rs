#![deny(missing_docs)]

//! # Swagger Docs Core
//!
//! Assembles a versioned OpenAPI document from a base template, a directory
//! of `*.spec.yaml` fragments and a fallback schema source, then writes it as
//! JSON and YAML.

/// Shared error types.
pub mod error;

/// Reading documents and the version file.
pub mod document;

/// Fragment discovery and last-write-wins merging.
pub mod fragments;

/// `$ref` scanning and fallback backfilling.
pub mod refs;

/// The end-to-end assembly pipeline.
pub mod assembler;

/// JSON/YAML rendering and file output.
pub mod output;

pub use assembler::{
    assemble, merge_and_stamp, run, Assembled, AssemblerConfig, DEFAULT_FRAGMENT_SUFFIX,
    DEFAULT_PATH_PREFIX,
};
pub use error::{AppError, AppResult};
pub use fragments::MergedFragments;
pub use refs::{resolve_dangling_refs, FallbackSchemas};
