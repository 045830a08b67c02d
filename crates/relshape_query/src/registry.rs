//! Query registry.
//!
//! The [`QueryRegistry`] is the entry point of the engine. It is configured
//! once with the relation graph and validators of a schema and hands out a
//! [`QueryBuilder`] per entity. Nothing it holds is mutated after
//! construction, so one registry can serve any number of threads.

use crate::builder::QueryBuilder;
use crate::error::{EntitySource, QueryError, QueryResult};
use indexmap::IndexMap;
use relshape_core::{EntityId, RelationGraph, RelationMap, ValidatorRegistry};
use relshape_schema::{
    build_validator_registry, extract_relation_graph, GraphConfig, SchemaDocument, SchemaResult,
};
use std::sync::Arc;

/// Inputs of a [`QueryRegistry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Per-entity relation descriptors.
    pub graph: RelationGraph,
    /// Per-entity validators.
    pub validators: ValidatorRegistry,
}

impl RegistryConfig {
    /// Creates a config from explicit inputs.
    #[must_use]
    pub fn new(graph: RelationGraph, validators: ValidatorRegistry) -> Self {
        Self { graph, validators }
    }

    /// Extracts the relation graph and generates validators from a schema.
    pub fn from_schema(schema: &SchemaDocument, config: &GraphConfig) -> SchemaResult<Self> {
        Ok(Self {
            graph: extract_relation_graph(schema, config),
            validators: build_validator_registry(schema)?,
        })
    }
}

/// Hands out query builders for the entities of a schema.
#[derive(Debug, Clone)]
pub struct QueryRegistry {
    relations: IndexMap<EntityId, Arc<RelationMap>>,
    validators: Arc<ValidatorRegistry>,
}

impl QueryRegistry {
    /// Creates a registry.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        let RegistryConfig { graph, validators } = config;
        let relations: IndexMap<_, _> = graph
            .entities()
            .map(|(entity, relations)| (entity.clone(), Arc::new(relations.clone())))
            .collect();

        tracing::debug!(
            entities = relations.len(),
            validators = validators.len(),
            "relshape.registry.created"
        );
        Self {
            relations,
            validators: Arc::new(validators),
        }
    }

    /// Returns a builder for `entity`.
    ///
    /// Fails with [`QueryError::UnknownEntity`] if the entity is missing from
    /// the relation graph or the validators.
    pub fn create_query(&self, entity: &str) -> QueryResult<QueryBuilder> {
        let Some((id, relations)) = self.relations.get_key_value(entity) else {
            return Err(QueryError::UnknownEntity {
                entity: entity.to_owned(),
                source_map: EntitySource::RelationGraph,
            });
        };
        if !self.validators.contains(entity) {
            return Err(QueryError::UnknownEntity {
                entity: entity.to_owned(),
                source_map: EntitySource::Validators,
            });
        }

        Ok(QueryBuilder::new(
            id.clone(),
            Arc::clone(relations),
            Arc::clone(&self.validators),
        ))
    }

    /// Returns true if queries can be created for `entity`.
    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.relations.contains_key(entity) && self.validators.contains(entity)
    }

    /// Returns the entities queries can be created for.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.relations
            .keys()
            .filter(|entity| self.validators.contains(entity.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relshape_core::RelationDescriptor;
    use serde_json::Value;

    fn accept(raw: &Value) -> relshape_core::ValidationResult<Value> {
        Ok(raw.clone())
    }

    fn registry() -> QueryRegistry {
        let mut user = RelationMap::new();
        user.insert("posts".into(), RelationDescriptor::many("post"));

        let graph = RelationGraph::new()
            .with_entity("user", user)
            .with_entity("post", RelationMap::new())
            .with_entity("audit", RelationMap::new());
        let validators = ValidatorRegistry::new()
            .with("user", accept)
            .with("post", accept)
            .with("session", accept);
        QueryRegistry::new(RegistryConfig::new(graph, validators))
    }

    #[test]
    fn test_create_query() {
        let registry = registry();
        let builder = registry.create_query("user").unwrap();
        assert_eq!(builder.entity(), "user");
        assert!(builder.relations().contains_key("posts"));
    }

    #[test]
    fn test_unknown_entity_is_eager() {
        let registry = registry();
        for (entity, source) in [
            ("ghost", EntitySource::RelationGraph),
            ("session", EntitySource::RelationGraph),
            ("audit", EntitySource::Validators),
        ] {
            let err = registry.create_query(entity).unwrap_err();
            assert_eq!(
                err,
                QueryError::UnknownEntity {
                    entity: entity.to_owned(),
                    source_map: source,
                }
            );
        }
    }

    #[test]
    fn test_entities() {
        let registry = registry();
        let entities: Vec<_> = registry.entities().map(EntityId::as_str).collect();
        assert_eq!(entities, ["user", "post"]);
        assert!(!registry.contains("audit"));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryRegistry>();
        assert_send_sync::<QueryBuilder>();
        assert_send_sync::<crate::QueryExecutor>();
    }
}
