//! Errors raised while loading or interpreting a schema document.

use std::path::PathBuf;
use thiserror::Error;

/// Schema loading error.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema text is not a valid document.
    #[error("invalid schema document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema checker reported errors.
    #[error("schema has {errors} error(s), first: {first}")]
    Invalid { errors: usize, first: String },

    /// A field `pattern` is not a valid regular expression.
    #[error("invalid pattern on `{model}.{field}`: {source}")]
    Pattern {
        model: String,
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A model named by the caller does not exist.
    #[error("unknown model `{0}`")]
    UnknownModel(String),
}

/// Result type for schema operations.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
