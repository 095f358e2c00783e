//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// Only `std::io::Error` and `String` convert implicitly; every other variant
/// names the input it failed on and must be built explicitly.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// A required input file does not exist.
    #[from(ignore)]
    #[display("Missing file: {}", _0.display())]
    MissingFile(PathBuf),

    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// An input file exists but is not valid JSON/YAML.
    #[from(ignore)]
    #[display("Parse Error in {}: {message}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parser message.
        message: String,
    },

    /// An input parsed, but a key the assembler relies on is absent or has the wrong shape.
    #[from(ignore)]
    #[display("Parse Error in {}: missing or invalid `{key}`", path.display())]
    MissingKey {
        /// File the key was expected in.
        path: PathBuf,
        /// Dotted key path, e.g. `components.schemas`.
        key: String,
    },

    /// A schema is referenced but neither the document nor the fallback source defines it.
    #[from(ignore)]
    #[display("Unresolved reference: #/components/schemas/{_0} is not defined in the fallback source")]
    UnresolvedReference(String),

    /// The final document could not be rendered.
    #[from(ignore)]
    #[display("Serialization Error: {_0}")]
    Serialize(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
