//! Result reshaping.
//!
//! The reshaper walks a raw ORM result alongside the [`QuerySpec`] that
//! produced it. Levels that declared fields were narrowed by the ORM and are
//! trusted as-is; every other level goes through its entity's validator.
//! Relations are then reshaped recursively and written back into the base
//! object. The first failure at any depth aborts the whole call.
//!
//! `null` at a relation key is only accepted for an optional single
//! relation; a `null` many-relation or required single relation is an
//! [`QueryError::InvalidShape`], never passed through.

use crate::error::{EntitySource, ExpectedShape, QueryError, QueryResult};
use crate::spec::QuerySpec;
use relshape_core::{Cardinality, EntityId, QueryPath, RelationDescriptor, RelationMap, ValidatorRegistry};
use serde_json::Value;

/// Reshapes raw values against a validator registry.
#[derive(Debug, Clone, Copy)]
pub struct Reshaper<'a> {
    validators: &'a ValidatorRegistry,
}

impl<'a> Reshaper<'a> {
    /// Creates a reshaper.
    #[must_use]
    pub const fn new(validators: &'a ValidatorRegistry) -> Self {
        Self { validators }
    }

    /// Reshapes one raw item of `entity`.
    pub fn reshape(
        &self,
        spec: &QuerySpec,
        relations: &RelationMap,
        entity: &EntityId,
        raw: &Value,
    ) -> QueryResult<Value> {
        self.reshape_at(spec, relations, entity, raw, &QueryPath::root())
    }

    /// Reshapes a sequence of raw items, stopping at the first failure.
    pub fn reshape_items(
        &self,
        spec: &QuerySpec,
        relations: &RelationMap,
        entity: &EntityId,
        items: &[Value],
        path: &QueryPath,
    ) -> QueryResult<Vec<Value>> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| self.reshape_at(spec, relations, entity, item, &path.child(index)))
            .collect()
    }

    fn reshape_at(
        &self,
        spec: &QuerySpec,
        relations: &RelationMap,
        entity: &EntityId,
        raw: &Value,
        path: &QueryPath,
    ) -> QueryResult<Value> {
        let Value::Object(object) = raw else {
            return Err(QueryError::invalid_shape(entity, path, ExpectedShape::Object, raw));
        };

        let trusted = spec.has_fields();
        tracing::trace!(entity = %entity, path = %path, trusted, "relshape.reshape.item");

        let mut base = if trusted {
            object.clone()
        } else {
            match self.validate(entity, raw, path)? {
                Value::Object(validated) => validated,
                other => {
                    return Err(QueryError::invalid_shape(
                        entity,
                        path,
                        ExpectedShape::Object,
                        &other,
                    ))
                }
            }
        };

        for (name, relation) in spec.relations() {
            let Some(raw_relation) = object.get(name) else {
                continue;
            };
            let Some(descriptor) = relations.get(name) else {
                tracing::debug!(entity = %entity, relation = %name, "relshape.reshape.unknown_relation");
                continue;
            };

            let relation_path = path.child(name.as_str());
            let value = self.reshape_relation(relation.spec(), descriptor, raw_relation, &relation_path)?;
            base.insert(name.clone(), value);
        }

        Ok(Value::Object(base))
    }

    fn reshape_relation(
        &self,
        spec: &QuerySpec,
        descriptor: &RelationDescriptor,
        raw: &Value,
        path: &QueryPath,
    ) -> QueryResult<Value> {
        let target = &descriptor.target_entity;
        let nested = descriptor.nested_relations();

        if raw.is_null() {
            if descriptor.is_nullable() {
                return Ok(Value::Null);
            }
            let expected = if descriptor.cardinality.is_many() {
                ExpectedShape::Array
            } else {
                ExpectedShape::Object
            };
            return Err(QueryError::invalid_shape(target, path, expected, raw));
        }

        match descriptor.cardinality {
            Cardinality::One => self.reshape_at(spec, nested, target, raw, path),
            Cardinality::Many => {
                let Value::Array(items) = raw else {
                    return Err(QueryError::invalid_shape(target, path, ExpectedShape::Array, raw));
                };
                self.reshape_items(spec, nested, target, items, path)
                    .map(Value::Array)
            }
        }
    }

    fn validate(&self, entity: &EntityId, raw: &Value, path: &QueryPath) -> QueryResult<Value> {
        let validator = self
            .validators
            .get(entity.as_str())
            .ok_or_else(|| QueryError::UnknownEntity {
                entity: entity.to_string(),
                source_map: EntitySource::Validators,
            })?;

        validator
            .validate(raw)
            .map_err(|errors| QueryError::validation(entity, path, errors))
    }
}

/// Reshapes one raw item of `entity` against `spec`.
pub fn reshape(
    spec: &QuerySpec,
    relations: &RelationMap,
    validators: &ValidatorRegistry,
    entity: &EntityId,
    raw: &Value,
) -> QueryResult<Value> {
    Reshaper::new(validators).reshape(spec, relations, entity, raw)
}
