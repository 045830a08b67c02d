//! Schema layer for relshape.
//!
//! This crate turns a relational schema description into the two inputs of
//! the query engine:
//! - `document`: The JSON schema description (models, fields, enums)
//! - `check`: Schema diagnostics
//! - `extract`: Depth-bounded relation graph extraction
//! - `validators`: Per-model structural validator generation
//!
//! # Example
//!
//! ```ignore
//! use relshape_schema::{SchemaDocument, GraphConfig, extract_relation_graph, build_validator_registry};
//!
//! let schema = SchemaDocument::load("schema.json")?.validated()?;
//! let graph = extract_relation_graph(&schema, &GraphConfig::new().with_max_depth(2));
//! let validators = build_validator_registry(&schema)?;
//! ```

pub mod check;
pub mod document;
pub mod error;
pub mod extract;
pub mod validators;

pub use check::check;
pub use document::{FieldDef, FieldType, ModelDef, SchemaDocument};
pub use error::{SchemaError, SchemaResult};
pub use extract::{extract_relation_graph, GraphConfig, DEFAULT_MAX_DEPTH};
pub use validators::{build_validator_registry, ModelValidator};
