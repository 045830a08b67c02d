//! Core types for relshape.
//!
//! This crate provides the leaf data shared by every relshape layer:
//! - `entity`: Entity identifiers
//! - `graph`: Depth-bounded relation descriptors per entity
//! - `path`: Paths into reshaped values
//! - `validation`: The validator capability and structured failures
//! - `diagnostics`: Schema checking reports

pub mod diagnostics;
pub mod entity;
pub mod graph;
pub mod path;
pub mod validation;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, Location};
pub use entity::EntityId;
pub use graph::{Cardinality, RelationDescriptor, RelationGraph, RelationMap};
pub use path::{PathSegment, QueryPath};
pub use validation::{
    json_type_name, ValidationError, ValidationErrorCode, ValidationErrors, ValidationResult,
    Validator, ValidatorRegistry,
};
