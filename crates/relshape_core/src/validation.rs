//! Structural validation capability.
//!
//! A [`Validator`] turns raw, untrusted data into an entity's structural value
//! or reports every problem it found as [`ValidationErrors`]. The query engine
//! treats validators as opaque: it only calls [`Validator::validate`].
//!
//! # Example
//!
//! ```ignore
//! use relshape_core::validation::{ValidatorRegistry, ValidationError, ValidationErrorCode};
//!
//! let mut validators = ValidatorRegistry::new();
//! validators.register("tag", |raw: &serde_json::Value| {
//!     if raw.get("label").is_some_and(|v| v.is_string()) {
//!         Ok(raw.clone())
//!     } else {
//!         Err(ValidationError::new("label", ValidationErrorCode::Required, "is required").into())
//!     }
//! });
//! ```

use crate::entity::EntityId;
use crate::path::QueryPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A validation error for a specific field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path to the offending value, relative to the validated object.
    pub path: QueryPath,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code.
    pub code: ValidationErrorCode,
    /// The constraint that was violated (for min/max etc).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error on a top-level field.
    pub fn new(
        field: impl Into<String>,
        code: ValidationErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self::at(QueryPath::root().child(field.into()), code, message)
    }

    /// Creates a new validation error at an arbitrary path.
    pub fn at(path: QueryPath, code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            code,
            constraint: None,
        }
    }

    /// Sets the constraint value.
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Returns the innermost field name, if the error is below the root.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.path.last_field()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    /// Value is required but missing.
    Required,
    /// Value has the wrong JSON type.
    InvalidType,
    /// String is too short.
    MinLength,
    /// String is too long.
    MaxLength,
    /// Number is too small.
    Min,
    /// Number is too large.
    Max,
    /// Invalid email format.
    InvalidEmail,
    /// Invalid URL format.
    InvalidUrl,
    /// Pattern mismatch.
    PatternMismatch,
    /// Value is not a member of the enum.
    InvalidEnumValue,
    /// Invalid format.
    InvalidFormat,
    /// Custom validation failed.
    Custom,
}

impl ValidationErrorCode {
    /// Returns the string representation of the code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "REQUIRED",
            Self::InvalidType => "INVALID_TYPE",
            Self::MinLength => "MIN_LENGTH",
            Self::MaxLength => "MAX_LENGTH",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidUrl => "INVALID_URL",
            Self::PatternMismatch => "PATTERN_MISMATCH",
            Self::InvalidEnumValue => "INVALID_ENUM_VALUE",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Collection of validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty error collection.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Creates errors from a single error.
    #[must_use]
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Adds an error.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the first error, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Returns `Ok(value)` when empty, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> ValidationResult<T> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(value)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<_> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

/// Returns the JSON type name of a value.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks raw input against an entity's structure.
pub trait Validator: Send + Sync {
    /// Validates `raw`, returning the (possibly normalized) value.
    fn validate(&self, raw: &Value) -> ValidationResult<Value>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> ValidationResult<Value> + Send + Sync,
{
    fn validate(&self, raw: &Value) -> ValidationResult<Value> {
        self(raw)
    }
}

/// Per-entity validators.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: IndexMap<EntityId, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator for an entity, replacing any previous one.
    pub fn register<V>(&mut self, entity: impl Into<EntityId>, validator: V)
    where
        V: Validator + 'static,
    {
        self.validators.insert(entity.into(), Arc::new(validator));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<V>(mut self, entity: impl Into<EntityId>, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.register(entity, validator);
        self
    }

    /// Gets the validator of an entity.
    #[must_use]
    pub fn get(&self, entity: &str) -> Option<&Arc<dyn Validator>> {
        self.validators.get(entity)
    }

    /// Returns true if the entity has a validator.
    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.validators.contains_key(entity)
    }

    /// Returns the registered entity ids.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.validators.keys()
    }

    /// Returns the number of validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if no validators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("entities", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn require_label(raw: &Value) -> ValidationResult<Value> {
        match raw.get("label") {
            Some(Value::String(_)) => Ok(raw.clone()),
            _ => Err(ValidationError::new("label", ValidationErrorCode::Required, "is required").into()),
        }
    }

    #[test]
    fn test_closure_validator() {
        let registry = ValidatorRegistry::new().with("tag", require_label);
        let validator = registry.get("tag").unwrap();

        assert!(validator.validate(&json!({"label": "rust"})).is_ok());
        let errors = validator.validate(&json!({})).unwrap_err();
        assert_eq!(errors.errors[0].code, ValidationErrorCode::Required);
        assert_eq!(errors.errors[0].field(), Some("label"));
    }

    #[test]
    fn test_errors_display() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::new("email", ValidationErrorCode::InvalidEmail, "bad"));
        errors.push(ValidationError::new("name", ValidationErrorCode::MinLength, "short"));

        assert_eq!(errors.first().and_then(ValidationError::field), Some("email"));
        assert_eq!(errors.to_string(), "email: bad; name: short");
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&Value::Null), "null");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(1).unwrap(), 1);
        let err = ValidationErrors::single(ValidationError::new(
            "x",
            ValidationErrorCode::Custom,
            "nope",
        ));
        assert!(err.into_result(1).is_err());
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_value(ValidationErrorCode::InvalidEnumValue).unwrap();
        assert_eq!(json, json!("INVALID_ENUM_VALUE"));
    }
}
