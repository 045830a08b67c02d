//! Per-model structural validators.
//!
//! A [`ModelValidator`] is generated from one model of a [`SchemaDocument`].
//! It checks every scalar and enum field, collects all failures, and returns
//! the object with relation fields and unknown keys stripped:
//!
//! - `minLength`, `maxLength`: string length, counted in characters
//! - `min`, `max`: numeric range
//! - `email`, `url`: string formats
//! - `pattern`: regex the whole string must match

use crate::document::{FieldDef, FieldType, SchemaDocument};
use crate::error::{SchemaError, SchemaResult};
use regex::Regex;
use relshape_core::{
    json_type_name, QueryPath, ValidationError, ValidationErrorCode, ValidationErrors,
    ValidationResult, Validator, ValidatorRegistry,
};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Compiled checks for one field.
#[derive(Debug)]
struct FieldRule {
    name: String,
    ty: FieldType,
    optional: bool,
    list: bool,
    enum_values: FxHashSet<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    email: bool,
    url: bool,
    pattern: Option<Regex>,
    min: Option<f64>,
    max: Option<f64>,
}

impl FieldRule {
    fn compile(schema: &SchemaDocument, model: &str, name: &str, def: &FieldDef) -> SchemaResult<Self> {
        let pattern = def
            .pattern
            .as_deref()
            .map(|p| {
                Regex::new(&format!("^(?:{p})$")).map_err(|source| SchemaError::Pattern {
                    model: model.to_string(),
                    field: name.to_string(),
                    source,
                })
            })
            .transpose()?;

        let enum_values = match (def.ty, def.target.as_deref()) {
            (FieldType::Enum, Some(target)) => schema
                .enum_values(target)
                .map(|values| values.iter().cloned().collect())
                .unwrap_or_default(),
            _ => FxHashSet::default(),
        };

        Ok(Self {
            name: name.to_string(),
            ty: def.ty,
            optional: def.optional,
            list: def.list,
            enum_values,
            min_length: def.min_length,
            max_length: def.max_length,
            email: def.email,
            url: def.url,
            pattern,
            min: def.min,
            max: def.max,
        })
    }

    fn check(&self, value: &Value, path: &QueryPath, errors: &mut ValidationErrors) {
        match self.ty {
            FieldType::String => match value.as_str() {
                Some(s) => self.check_string(s, path, errors),
                None => errors.push(type_error(path, "string", value)),
            },
            FieldType::Int => {
                if value.is_i64() || value.is_u64() {
                    self.check_range(value.as_f64(), path, errors);
                } else {
                    errors.push(type_error(path, "integer", value));
                }
            }
            FieldType::Float => {
                if value.is_number() {
                    self.check_range(value.as_f64(), path, errors);
                } else {
                    errors.push(type_error(path, "number", value));
                }
            }
            FieldType::Boolean => {
                if !value.is_boolean() {
                    errors.push(type_error(path, "boolean", value));
                }
            }
            FieldType::DateTime => match value.as_str() {
                Some(s) if TextFormat::DateTime.is_match(s) => {}
                Some(_) => errors.push(ValidationError::at(
                    path.clone(),
                    ValidationErrorCode::InvalidFormat,
                    "must be an RFC 3339 timestamp",
                )),
                None => errors.push(type_error(path, "timestamp string", value)),
            },
            FieldType::BigInt => self.check_numeric_text(value, TextFormat::Integer, "integer", path, errors),
            FieldType::Decimal => self.check_numeric_text(value, TextFormat::Decimal, "decimal", path, errors),
            FieldType::Bytes => {
                if !value.is_string() {
                    errors.push(type_error(path, "byte string", value));
                }
            }
            FieldType::Json => {}
            FieldType::Enum => match value.as_str() {
                Some(s) if self.enum_values.contains(s) => {}
                _ => {
                    let mut allowed: Vec<_> = self.enum_values.iter().map(String::as_str).collect();
                    allowed.sort_unstable();
                    errors.push(
                        ValidationError::at(
                            path.clone(),
                            ValidationErrorCode::InvalidEnumValue,
                            "must be one of the enum values",
                        )
                        .with_constraint(allowed.join("|")),
                    );
                }
            },
            // Relation fields never get a rule.
            FieldType::Relation => {}
        }
    }

    fn check_string(&self, value: &str, path: &QueryPath, errors: &mut ValidationErrors) {
        StringChecks {
            errors,
            path,
            value,
        }
        .min_length(self.min_length)
        .max_length(self.max_length)
        .email(self.email)
        .url(self.url)
        .pattern(self.pattern.as_ref());
    }

    fn check_numeric_text(
        &self,
        value: &Value,
        text_format: TextFormat,
        expected: &str,
        path: &QueryPath,
        errors: &mut ValidationErrors,
    ) {
        match value {
            Value::Number(n) => {
                if expected == "integer" && !(n.is_i64() || n.is_u64()) {
                    errors.push(type_error(path, expected, value));
                } else {
                    self.check_range(n.as_f64(), path, errors);
                }
            }
            Value::String(s) if text_format.is_match(s) => {
                self.check_range(s.parse().ok(), path, errors);
            }
            Value::String(_) => errors.push(ValidationError::at(
                path.clone(),
                ValidationErrorCode::InvalidFormat,
                format!("must be a {expected} string"),
            )),
            _ => errors.push(type_error(path, expected, value)),
        }
    }

    fn check_range(&self, value: Option<f64>, path: &QueryPath, errors: &mut ValidationErrors) {
        let Some(value) = value else {
            return;
        };
        NumericChecks {
            errors,
            path,
            value,
        }
        .min(self.min)
        .max(self.max);
    }
}

/// String constraint checks for one value.
struct StringChecks<'a> {
    errors: &'a mut ValidationErrors,
    path: &'a QueryPath,
    value: &'a str,
}

impl<'a> StringChecks<'a> {
    /// Validates minimum length.
    fn min_length(self, min: Option<usize>) -> Self {
        if let Some(min) = min {
            if self.value.chars().count() < min {
                self.errors.push(
                    ValidationError::at(
                        self.path.clone(),
                        ValidationErrorCode::MinLength,
                        format!("must be at least {min} characters"),
                    )
                    .with_constraint(min.to_string()),
                );
            }
        }
        self
    }

    /// Validates maximum length.
    fn max_length(self, max: Option<usize>) -> Self {
        if let Some(max) = max {
            if self.value.chars().count() > max {
                self.errors.push(
                    ValidationError::at(
                        self.path.clone(),
                        ValidationErrorCode::MaxLength,
                        format!("must be at most {max} characters"),
                    )
                    .with_constraint(max.to_string()),
                );
            }
        }
        self
    }

    /// Validates email format.
    fn email(self, enabled: bool) -> Self {
        if enabled && !is_valid_email(self.value) {
            self.errors.push(ValidationError::at(
                self.path.clone(),
                ValidationErrorCode::InvalidEmail,
                "must be a valid email address",
            ));
        }
        self
    }

    /// Validates URL format.
    fn url(self, enabled: bool) -> Self {
        if enabled && !is_valid_url(self.value) {
            self.errors.push(ValidationError::at(
                self.path.clone(),
                ValidationErrorCode::InvalidUrl,
                "must be a valid URL",
            ));
        }
        self
    }

    /// Validates against a regex pattern.
    fn pattern(self, pattern: Option<&Regex>) -> Self {
        if let Some(re) = pattern {
            if !re.is_match(self.value) {
                self.errors.push(
                    ValidationError::at(
                        self.path.clone(),
                        ValidationErrorCode::PatternMismatch,
                        "does not match the required pattern",
                    )
                    .with_constraint(re.as_str().to_string()),
                );
            }
        }
        self
    }
}

/// Numeric range checks for one value.
struct NumericChecks<'a> {
    errors: &'a mut ValidationErrors,
    path: &'a QueryPath,
    value: f64,
}

impl<'a> NumericChecks<'a> {
    /// Validates minimum value.
    fn min(self, min: Option<f64>) -> Self {
        if let Some(min) = min {
            if self.value < min {
                self.errors.push(
                    ValidationError::at(
                        self.path.clone(),
                        ValidationErrorCode::Min,
                        format!("must be at least {min}"),
                    )
                    .with_constraint(min.to_string()),
                );
            }
        }
        self
    }

    /// Validates maximum value.
    fn max(self, max: Option<f64>) -> Self {
        if let Some(max) = max {
            if self.value > max {
                self.errors.push(
                    ValidationError::at(
                        self.path.clone(),
                        ValidationErrorCode::Max,
                        format!("must be at most {max}"),
                    )
                    .with_constraint(max.to_string()),
                );
            }
        }
        self
    }
}

/// Structural validator for one model.
#[derive(Debug)]
pub struct ModelValidator {
    rules: Vec<FieldRule>,
}

impl ModelValidator {
    /// Generates the validator of `model`.
    pub fn from_model(schema: &SchemaDocument, model: &str) -> SchemaResult<Self> {
        let def = schema
            .model(model)
            .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))?;

        let rules = def
            .columns()
            .map(|(name, field)| FieldRule::compile(schema, model, name, field))
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Self { rules })
    }
}

impl Validator for ModelValidator {
    fn validate(&self, raw: &Value) -> ValidationResult<Value> {
        let Some(object) = raw.as_object() else {
            return Err(type_error(&QueryPath::root(), "object", raw).into());
        };

        let mut errors = ValidationErrors::new();
        let mut output = Map::new();

        for rule in &self.rules {
            let path = QueryPath::root().child(rule.name.as_str());
            match object.get(&rule.name) {
                None | Some(Value::Null) if rule.optional => {
                    if let Some(value) = object.get(&rule.name) {
                        output.insert(rule.name.clone(), value.clone());
                    }
                }
                None | Some(Value::Null) => {
                    errors.push(ValidationError::at(
                        path,
                        ValidationErrorCode::Required,
                        "is required",
                    ));
                }
                Some(Value::Array(items)) if rule.list => {
                    for (i, item) in items.iter().enumerate() {
                        rule.check(item, &path.child(i), &mut errors);
                    }
                    output.insert(rule.name.clone(), Value::Array(items.clone()));
                }
                Some(value) if rule.list => {
                    errors.push(type_error(&path, "array", value));
                }
                Some(value) => {
                    rule.check(value, &path, &mut errors);
                    output.insert(rule.name.clone(), value.clone());
                }
            }
        }

        errors.into_result(Value::Object(output))
    }
}

/// Generates a validator for every model in the schema.
pub fn build_validator_registry(schema: &SchemaDocument) -> SchemaResult<ValidatorRegistry> {
    let mut registry = ValidatorRegistry::new();
    for (name, _) in schema.models() {
        registry.register(name.as_str(), ModelValidator::from_model(schema, name)?);
    }
    tracing::debug!(validators = registry.len(), "relshape.validators.generated");
    Ok(registry)
}

fn type_error(path: &QueryPath, expected: &str, found: &Value) -> ValidationError {
    ValidationError::at(
        path.clone(),
        ValidationErrorCode::InvalidType,
        format!("expected {expected}, received {}", json_type_name(found)),
    )
}

/// Text formats matched by built-in regexes.
#[derive(Debug, Clone, Copy)]
enum TextFormat {
    DateTime,
    Integer,
    Decimal,
}

impl TextFormat {
    const fn pattern(self) -> &'static str {
        match self {
            Self::DateTime => r"^\d{4}-\d{2}-\d{2}[Tt ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[Zz]|[+-]\d{2}:\d{2})$",
            Self::Integer => r"^-?\d+$",
            Self::Decimal => r"^-?\d+(?:\.\d+)?$",
        }
    }

    fn cell(self) -> &'static OnceLock<Option<Regex>> {
        static DATETIME: OnceLock<Option<Regex>> = OnceLock::new();
        static INTEGER: OnceLock<Option<Regex>> = OnceLock::new();
        static DECIMAL: OnceLock<Option<Regex>> = OnceLock::new();
        match self {
            Self::DateTime => &DATETIME,
            Self::Integer => &INTEGER,
            Self::Decimal => &DECIMAL,
        }
    }

    /// Returns true if `text` has this format. A pattern that fails to
    /// compile matches nothing.
    fn is_match(self, text: &str) -> bool {
        self.cell()
            .get_or_init(|| Regex::new(self.pattern()).ok())
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }
}

/// Simple email validation (basic check).
fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && domain.split('.').all(|p| !p.is_empty())
}

/// Simple URL validation.
fn is_valid_url(url: &str) -> bool {
    let trimmed = url.trim();
    (trimmed.starts_with("http://") || trimmed.starts_with("https://")) && trimmed.len() > 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ModelDef;
    use serde_json::json;

    fn user_schema() -> SchemaDocument {
        SchemaDocument::new()
            .with_enum("Role", ["ADMIN", "USER"])
            .with_model(
                "user",
                ModelDef::new()
                    .field("id", FieldDef::new(FieldType::String))
                    .field("email", FieldDef::new(FieldType::String).email().min_length(1))
                    .field("name", FieldDef::new(FieldType::String).optional())
                    .field("age", FieldDef::new(FieldType::Int).optional().range(Some(0.0), Some(150.0)))
                    .field("role", FieldDef::enumeration("Role"))
                    .field("tags", FieldDef::new(FieldType::String).list().max_length(8))
                    .field("posts", FieldDef::relation("post").list()),
            )
            .with_model("post", ModelDef::new().field("title", FieldDef::new(FieldType::String)))
    }

    fn user_validator() -> ModelValidator {
        ModelValidator::from_model(&user_schema(), "user").unwrap()
    }

    #[test]
    fn test_valid_object_strips_relations_and_unknown_keys() {
        let value = user_validator()
            .validate(&json!({
                "id": "1",
                "email": "a@b.com",
                "role": "ADMIN",
                "tags": ["x"],
                "posts": [{"title": "ignored"}],
                "extra": true
            }))
            .unwrap();

        assert_eq!(
            value,
            json!({"id": "1", "email": "a@b.com", "role": "ADMIN", "tags": ["x"]})
        );
    }

    #[test]
    fn test_optional_null_is_kept() {
        let value = user_validator()
            .validate(&json!({"id": "1", "email": "a@b.com", "role": "USER", "tags": [], "name": null}))
            .unwrap();
        assert_eq!(value["name"], Value::Null);
        assert!(value.get("age").is_none());
    }

    #[test]
    fn test_empty_email_fails_on_email_path() {
        let errors = user_validator()
            .validate(&json!({"id": "1", "email": "", "role": "USER", "tags": []}))
            .unwrap_err();

        assert!(errors.errors.iter().all(|e| e.field() == Some("email")));
        let codes: Vec<_> = errors.errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            [ValidationErrorCode::MinLength, ValidationErrorCode::InvalidEmail]
        );
    }

    #[test]
    fn test_collects_all_failures() {
        let errors = user_validator()
            .validate(&json!({"id": 7, "email": "a@b.com", "age": 200, "role": "ROOT", "tags": ["ok", "much-too-long"]}))
            .unwrap_err();

        let paths: Vec<_> = errors.errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["id", "age", "role", "tags[1]"]);
        assert_eq!(errors.errors[3].code, ValidationErrorCode::MaxLength);
    }

    #[test]
    fn test_non_object_rejected() {
        let errors = user_validator().validate(&json!("user")).unwrap_err();
        assert_eq!(errors.errors[0].code, ValidationErrorCode::InvalidType);
        assert!(errors.errors[0].path.is_root());
    }

    #[test]
    fn test_scalar_formats() {
        let schema = SchemaDocument::new().with_model(
            "event",
            ModelDef::new()
                .field("at", FieldDef::new(FieldType::DateTime))
                .field("count", FieldDef::new(FieldType::BigInt))
                .field("price", FieldDef::new(FieldType::Decimal))
                .field("payload", FieldDef::new(FieldType::Json))
                .field("code", FieldDef::new(FieldType::String).pattern("[A-Z]{3}")),
        );
        let validator = ModelValidator::from_model(&schema, "event").unwrap();

        assert!(validator
            .validate(&json!({
                "at": "2024-01-02T03:04:05.678Z",
                "count": "9007199254740993",
                "price": 12.5,
                "payload": {"any": ["thing"]},
                "code": "ABC"
            }))
            .is_ok());

        let errors = validator
            .validate(&json!({
                "at": "yesterday",
                "count": 1.5,
                "price": "12,5",
                "payload": null,
                "code": "ABCD"
            }))
            .unwrap_err();
        let codes: Vec<_> = errors.errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            [
                ValidationErrorCode::InvalidFormat,
                ValidationErrorCode::InvalidType,
                ValidationErrorCode::InvalidFormat,
                ValidationErrorCode::Required,
                ValidationErrorCode::PatternMismatch,
            ]
        );
    }

    #[test]
    fn test_registry_covers_every_model() {
        let registry = build_validator_registry(&user_schema()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("post"));
    }

    #[test]
    fn test_unknown_model() {
        assert!(matches!(
            ModelValidator::from_model(&user_schema(), "ghost"),
            Err(SchemaError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_text_formats() {
        assert!(TextFormat::DateTime.is_match("2024-05-01T10:00:00.5+02:00"));
        assert!(!TextFormat::DateTime.is_match("2024-05-01"));
        assert!(TextFormat::Integer.is_match("-42"));
        assert!(!TextFormat::Integer.is_match("4.2"));
        assert!(TextFormat::Decimal.is_match("4.2"));
        assert!(!TextFormat::Decimal.is_match("4."));
    }

    #[test]
    fn test_email_and_url_helpers() {
        assert!(is_valid_email("test@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(is_valid_url("https://example.com"));
        assert!(!is_valid_url("ftp://example.com"));
    }
}
