//! Schema checker.
//!
//! Reports every problem in a [`SchemaDocument`] that would make relation
//! graph extraction or validator generation meaningless.

use crate::document::{FieldDef, FieldType, SchemaDocument};
use relshape_core::diagnostics::codes;
use relshape_core::{DiagnosticBag, Location};

/// Checks a schema document.
struct SchemaChecker<'a> {
    schema: &'a SchemaDocument,
    diagnostics: DiagnosticBag,
}

impl<'a> SchemaChecker<'a> {
    fn new(schema: &'a SchemaDocument) -> Self {
        Self {
            schema,
            diagnostics: DiagnosticBag::new(),
        }
    }

    fn check(mut self) -> DiagnosticBag {
        for (name, values) in &self.schema.enums {
            if values.is_empty() {
                self.diagnostics.warning(
                    codes::EMPTY_ENUM,
                    format!("enum `{name}` has no values"),
                    Location::item(name),
                );
            }
        }

        for (model, def) in self.schema.models() {
            if def.fields.is_empty() {
                self.diagnostics.warning(
                    codes::EMPTY_MODEL,
                    format!("model `{model}` has no fields"),
                    Location::item(model),
                );
            }
            for (field, field_def) in &def.fields {
                self.check_field(model, field, field_def);
            }
        }

        self.diagnostics
    }

    fn check_field(&mut self, model: &str, field: &str, def: &FieldDef) {
        let location = || Location::field(model, field);

        if matches!(def.ty, FieldType::Relation | FieldType::Enum) {
            let kind = if def.is_relation() { "model" } else { "enum" };
            let Some(target) = &def.target else {
                self.diagnostics.error(
                    codes::MISSING_TARGET,
                    format!("{kind} field without a `target`"),
                    location(),
                );
                return;
            };
            let known = if def.is_relation() {
                self.schema.model(target).is_some()
            } else {
                self.schema.enum_values(target).is_some()
            };
            if !known {
                let code = if def.is_relation() {
                    codes::UNKNOWN_MODEL
                } else {
                    codes::UNKNOWN_ENUM
                };
                self.diagnostics
                    .error(code, format!("unknown {kind} `{target}`"), location());
            }
        }

        if def.has_string_constraints() && !def.ty.is_textual() {
            self.diagnostics.error(
                codes::INVALID_CONSTRAINT,
                "string constraints on a non-string field",
                location(),
            );
        }
        if def.has_numeric_constraints() && !def.ty.is_numeric() {
            self.diagnostics.error(
                codes::INVALID_CONSTRAINT,
                "numeric constraints on a non-numeric field",
                location(),
            );
        }
        if let (Some(min), Some(max)) = (def.min_length, def.max_length) {
            if min > max {
                self.diagnostics.error(
                    codes::INVALID_CONSTRAINT,
                    format!("minLength {min} exceeds maxLength {max}"),
                    location(),
                );
            }
        }
        if let Some(pattern) = &def.pattern {
            if let Err(err) = regex::Regex::new(pattern) {
                self.diagnostics.add(
                    relshape_core::Diagnostic::error(
                        codes::INVALID_PATTERN,
                        format!("invalid pattern `{pattern}`"),
                    )
                    .with_message(err.to_string())
                    .at(location()),
                );
            }
        }
    }
}

/// Checks a schema document and returns every diagnostic found.
#[must_use]
pub fn check(schema: &SchemaDocument) -> DiagnosticBag {
    SchemaChecker::new(schema).check()
}
