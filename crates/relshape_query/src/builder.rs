//! Per-entity query builders.

use crate::compiler::compile;
use crate::executor::QueryExecutor;
use crate::spec::QuerySpec;
use relshape_core::{EntityId, RelationMap, ValidatorRegistry};
use std::sync::Arc;

/// Builds executors for one entity.
///
/// Created by [`QueryRegistry::create_query`](crate::QueryRegistry::create_query),
/// which has already checked that the entity has relations and a validator.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    entity: EntityId,
    relations: Arc<RelationMap>,
    validators: Arc<ValidatorRegistry>,
}

impl QueryBuilder {
    pub(crate) fn new(
        entity: EntityId,
        relations: Arc<RelationMap>,
        validators: Arc<ValidatorRegistry>,
    ) -> Self {
        Self {
            entity,
            relations,
            validators,
        }
    }

    /// Returns the entity this builder queries.
    #[must_use]
    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    /// Returns the relations of the entity.
    #[must_use]
    pub fn relations(&self) -> &RelationMap {
        &self.relations
    }

    /// Compiles `spec` into a fresh executor.
    #[must_use]
    pub fn build(&self, spec: QuerySpec) -> QueryExecutor {
        let compiled = compile(&spec, &self.relations);
        tracing::debug!(
            entity = %self.entity,
            kind = compiled.kind().as_str(),
            entries = compiled.entries().len(),
            "relshape.query.build"
        );
        QueryExecutor::new(
            self.entity.clone(),
            spec,
            compiled,
            Arc::clone(&self.relations),
            Arc::clone(&self.validators),
        )
    }
}
