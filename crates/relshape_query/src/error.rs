//! Query engine errors.

use relshape_core::{json_type_name, EntityId, QueryPath, ValidationErrors};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// The input a missing entity was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySource {
    RelationGraph,
    Validators,
}

impl fmt::Display for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelationGraph => f.write_str("relation graph"),
            Self::Validators => f.write_str("validator registry"),
        }
    }
}

/// The shape a raw value was required to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    Object,
    Array,
}

impl fmt::Display for ExpectedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Array => f.write_str("array"),
        }
    }
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownEntity,
    InvalidShape,
    ValidationFailure,
    DecodeError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownEntity => "UNKNOWN_ENTITY",
            Self::InvalidShape => "INVALID_SHAPE",
            Self::ValidationFailure => "VALIDATION_FAILURE",
            Self::DecodeError => "DECODE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building or running a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The entity is absent from one of the registry inputs.
    #[error("unknown entity `{entity}`: not in the {source_map}")]
    UnknownEntity {
        entity: String,
        source_map: EntitySource,
    },

    /// Raw data does not have the required structure.
    #[error("invalid shape for `{entity}` at {path}: expected {expected}, found {found}")]
    InvalidShape {
        entity: EntityId,
        path: QueryPath,
        expected: ExpectedShape,
        found: &'static str,
    },

    /// An entity validator rejected the data.
    #[error("validation failed for `{entity}` at {path}: {errors}")]
    Validation {
        entity: EntityId,
        /// Relation path from the root followed by the first error's field path.
        path: QueryPath,
        /// Name of the offending field, when known.
        field: Option<String>,
        errors: ValidationErrors,
    },

    /// A reshaped value could not be decoded into the requested type.
    #[error("cannot decode `{entity}` result: {message}")]
    Decode { entity: EntityId, message: String },
}

impl QueryError {
    pub(crate) fn invalid_shape(
        entity: &EntityId,
        path: &QueryPath,
        expected: ExpectedShape,
        found: &Value,
    ) -> Self {
        Self::InvalidShape {
            entity: entity.clone(),
            path: path.clone(),
            expected,
            found: json_type_name(found),
        }
    }

    /// Wraps a validator failure found at `relation_path`.
    pub(crate) fn validation(
        entity: &EntityId,
        relation_path: &QueryPath,
        errors: ValidationErrors,
    ) -> Self {
        let (path, field) = match errors.first() {
            Some(first) => (
                first.path.prefixed(relation_path),
                first.field().map(str::to_owned),
            ),
            None => (relation_path.clone(), None),
        };
        Self::Validation {
            entity: entity.clone(),
            path,
            field,
            errors,
        }
    }

    pub(crate) fn decode(entity: &EntityId, error: &serde_json::Error) -> Self {
        Self::Decode {
            entity: entity.clone(),
            message: error.to_string(),
        }
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownEntity { .. } => ErrorCode::UnknownEntity,
            Self::InvalidShape { .. } => ErrorCode::InvalidShape,
            Self::Validation { .. } => ErrorCode::ValidationFailure,
            Self::Decode { .. } => ErrorCode::DecodeError,
        }
    }

    /// Returns the entity the error is about.
    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            Self::UnknownEntity { entity, .. } => entity.as_str(),
            Self::InvalidShape { entity, .. }
            | Self::Validation { entity, .. }
            | Self::Decode { entity, .. } => entity.as_str(),
        }
    }

    /// Returns the path of the offending value, if the error has one.
    #[must_use]
    pub fn path(&self) -> Option<&QueryPath> {
        match self {
            Self::InvalidShape { path, .. } | Self::Validation { path, .. } => Some(path),
            Self::UnknownEntity { .. } | Self::Decode { .. } => None,
        }
    }

    /// Returns the validator failures, for [`QueryError::Validation`].
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl Serialize for QueryError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", &self.code())?;
        map.serialize_entry("message", &self.to_string())?;
        map.serialize_entry("entity", self.entity())?;
        if let Some(path) = self.path() {
            map.serialize_entry("path", path)?;
        }
        if let Self::Validation {
            field: Some(field), ..
        } = self
        {
            map.serialize_entry("field", field)?;
        }
        if let Some(errors) = self.validation_errors() {
            map.serialize_entry("issues", &errors.errors)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relshape_core::{PathSegment, ValidationError, ValidationErrorCode};
    use serde_json::json;

    #[test]
    fn test_validation_path_is_prefixed() {
        let errors = ValidationErrors::single(ValidationError::new(
            "title",
            ValidationErrorCode::MinLength,
            "must be at least 1 characters",
        ));
        let relation_path = QueryPath::from_iter([PathSegment::from("posts"), PathSegment::from(2usize)]);
        let error = QueryError::validation(&EntityId::from("post"), &relation_path, errors);

        assert_eq!(error.code(), ErrorCode::ValidationFailure);
        assert_eq!(error.path().unwrap().to_string(), "posts[2].title");
        assert!(matches!(&error, QueryError::Validation { field: Some(f), .. } if f == "title"));
    }

    #[test]
    fn test_serialize_invalid_shape() {
        let error = QueryError::invalid_shape(
            &EntityId::from("user"),
            &QueryPath::root().child("profile"),
            ExpectedShape::Object,
            &Value::Null,
        );
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "code": "INVALID_SHAPE",
                "message": "invalid shape for `user` at profile: expected object, found null",
                "entity": "user",
                "path": ["profile"]
            })
        );
    }

    #[test]
    fn test_unknown_entity_display() {
        let error = QueryError::UnknownEntity {
            entity: "ghost".into(),
            source_map: EntitySource::Validators,
        };
        assert_eq!(error.to_string(), "unknown entity `ghost`: not in the validator registry");
        assert_eq!(error.entity(), "ghost");
        assert!(error.path().is_none());
    }
}
