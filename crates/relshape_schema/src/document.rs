//! Schema description documents.
//!
//! A schema document names the entities (models) of a relational schema, their
//! scalar, enum and relation fields, and the enums they use. It is loaded from
//! JSON:
//!
//! ```json
//! {
//!   "enums": { "Role": ["ADMIN", "USER"] },
//!   "models": {
//!     "user": {
//!       "fields": {
//!         "id":    { "type": "string" },
//!         "email": { "type": "string", "email": true, "minLength": 1 },
//!         "role":  { "type": "enum", "target": "Role" },
//!         "posts": { "type": "relation", "target": "post", "list": true }
//!       }
//!     }
//!   }
//! }
//! ```

use crate::check;
use crate::error::{SchemaError, SchemaResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    BigInt,
    Decimal,
    Bytes,
    Json,
    /// A member of the enum named by `target`.
    Enum,
    /// A relation to the model named by `target`.
    Relation,
}

impl FieldType {
    /// Returns true if string constraints (`minLength`, `email`, ...) apply.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String)
    }

    /// Returns true if numeric constraints (`min`, `max`) apply.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::BigInt | Self::Decimal)
    }
}

/// A field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDef {
    /// Field type.
    #[serde(rename = "type")]
    pub ty: FieldType,

    /// Enum or model name for `enum` and `relation` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Whether the field may be missing or `null`.
    #[serde(default)]
    pub optional: bool,

    /// Whether the field holds a list of values.
    #[serde(default)]
    pub list: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub email: bool,

    #[serde(default)]
    pub url: bool,

    /// Regular expression the whole string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FieldDef {
    /// Creates a field of the given type with no modifiers.
    #[must_use]
    pub const fn new(ty: FieldType) -> Self {
        Self {
            ty,
            target: None,
            optional: false,
            list: false,
            min_length: None,
            max_length: None,
            email: false,
            url: false,
            pattern: None,
            min: None,
            max: None,
        }
    }

    /// Creates a relation field pointing at `model`.
    pub fn relation(model: impl Into<String>) -> Self {
        Self {
            target: Some(model.into()),
            ..Self::new(FieldType::Relation)
        }
    }

    /// Creates an enum field of the enum `name`.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            target: Some(name.into()),
            ..Self::new(FieldType::Enum)
        }
    }

    /// Marks the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field as a list.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Requires an email address.
    #[must_use]
    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    /// Requires an http(s) URL.
    #[must_use]
    pub fn url(mut self) -> Self {
        self.url = true;
        self
    }

    /// Requires a regex match.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the numeric range.
    #[must_use]
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Returns true for relation fields.
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.ty, FieldType::Relation)
    }

    /// Returns true if any string constraint is set.
    #[must_use]
    pub fn has_string_constraints(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.email
            || self.url
            || self.pattern.is_some()
    }

    /// Returns true if any numeric constraint is set.
    #[must_use]
    pub fn has_numeric_constraints(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// A model (entity) definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDef {
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
}

impl ModelDef {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Returns the relation fields.
    pub fn relations(&self) -> impl Iterator<Item = (&String, &FieldDef)> {
        self.fields.iter().filter(|(_, f)| f.is_relation())
    }

    /// Returns the non-relation fields.
    pub fn columns(&self) -> impl Iterator<Item = (&String, &FieldDef)> {
        self.fields.iter().filter(|(_, f)| !f.is_relation())
    }
}

/// A full schema description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Enum name to allowed values.
    #[serde(default)]
    pub enums: IndexMap<String, Vec<String>>,

    /// Model name to definition.
    #[serde(default)]
    pub models: IndexMap<String, ModelDef>,
}

impl SchemaDocument {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a schema from JSON text.
    pub fn from_json(source: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Reads and parses a schema file.
    pub fn load(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    /// Runs the schema checker and fails on any error diagnostic.
    pub fn validated(self) -> SchemaResult<Self> {
        let diagnostics = check::check(&self);
        if diagnostics.has_errors() {
            let first = diagnostics
                .errors()
                .next()
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(SchemaError::Invalid {
                errors: diagnostics.error_count(),
                first,
            });
        }
        Ok(self)
    }

    /// Adds an enum.
    #[must_use]
    pub fn with_enum<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a model.
    #[must_use]
    pub fn with_model(mut self, name: impl Into<String>, model: ModelDef) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    /// Gets a model by name.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    /// Returns all models.
    pub fn models(&self) -> impl Iterator<Item = (&String, &ModelDef)> {
        self.models.iter()
    }

    /// Gets the values of an enum.
    #[must_use]
    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }
}
