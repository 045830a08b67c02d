//! Relation graph extraction.
//!
//! Walks a [`SchemaDocument`] and produces, per model, the depth-bounded
//! relation map consumed by the query engine. Self-referential and cyclic
//! models terminate because every step into a relation spends one unit of
//! depth.

use crate::document::{FieldDef, SchemaDocument};
use relshape_core::{Cardinality, EntityId, RelationDescriptor, RelationGraph, RelationMap};

/// Default maximum relation nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Relation graph extraction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Number of relation levels kept below each entity. Always at least 1.
    pub max_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GraphConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum depth; values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }
}

/// Extracts the relation graph of every model in the schema.
///
/// Relations whose target model is missing are left out; run
/// [`check`](crate::check::check) first to report them.
#[must_use]
pub fn extract_relation_graph(schema: &SchemaDocument, config: &GraphConfig) -> RelationGraph {
    let max_depth = config.max_depth.max(1);
    let mut graph = RelationGraph::new();

    for (name, _) in schema.models() {
        let relations = relations_of(schema, name, 1, max_depth);
        tracing::trace!(model = %name, relations = relations.len(), "relshape.graph.model");
        graph.insert(EntityId::from(name), relations);
    }

    tracing::debug!(
        models = graph.len(),
        max_depth,
        depth = graph.depth(),
        "relshape.graph.extracted"
    );
    graph
}

/// Builds the relation map of `model` at `level` (1-based).
fn relations_of(schema: &SchemaDocument, model: &str, level: usize, max_depth: usize) -> RelationMap {
    let Some(def) = schema.model(model) else {
        return RelationMap::new();
    };

    let mut relations = RelationMap::new();
    for (field, field_def) in def.relations() {
        let Some(target) = field_def.target.as_deref() else {
            continue;
        };
        if schema.model(target).is_none() {
            continue;
        }

        let mut descriptor = descriptor_for(field_def, target);
        if level < max_depth {
            descriptor = descriptor.with_nested(relations_of(schema, target, level + 1, max_depth));
        }
        relations.insert(field.clone(), descriptor);
    }
    relations
}

fn descriptor_for(field: &FieldDef, target: &str) -> RelationDescriptor {
    RelationDescriptor {
        target_entity: EntityId::from(target),
        cardinality: if field.list {
            Cardinality::Many
        } else {
            Cardinality::One
        },
        optional: field.optional && !field.list,
        nested: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldType, ModelDef};

    fn comments() -> SchemaDocument {
        SchemaDocument::new().with_model(
            "comment",
            ModelDef::new()
                .field("id", FieldDef::new(FieldType::String))
                .field("parent", FieldDef::relation("comment").optional())
                .field("replies", FieldDef::relation("comment").list()),
        )
    }

    #[test]
    fn test_self_reference_is_truncated() {
        let graph = extract_relation_graph(&comments(), &GraphConfig::new().with_max_depth(2));
        assert_eq!(graph.depth(), 2);

        let root = graph.relations("comment").unwrap();
        let replies = &root["replies"];
        assert_eq!(replies.cardinality, Cardinality::Many);

        let second = &replies.nested_relations()["replies"];
        assert!(second.nested.is_none());
    }

    #[test]
    fn test_optional_single_relation() {
        let graph = extract_relation_graph(&comments(), &GraphConfig::default());
        let parent = &graph.relations("comment").unwrap()["parent"];
        assert!(parent.is_nullable());
        assert_eq!(graph.depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let schema = SchemaDocument::new()
            .with_model("user", ModelDef::new().field("posts", FieldDef::relation("post").list()))
            .with_model("post", ModelDef::new().field("author", FieldDef::relation("user")));

        let graph = extract_relation_graph(&schema, &GraphConfig::new().with_max_depth(4));
        assert_eq!(graph.depth(), 4);

        let author = &graph.relations("user").unwrap()["posts"].nested_relations()["author"];
        assert_eq!(author.target_entity, "user");
    }

    #[test]
    fn test_models_without_relations_are_present() {
        let schema = SchemaDocument::new()
            .with_model("tag", ModelDef::new().field("label", FieldDef::new(FieldType::String)));
        let graph = extract_relation_graph(&schema, &GraphConfig::new().with_max_depth(0));

        assert!(graph.relations("tag").unwrap().is_empty());
        assert_eq!(GraphConfig::new().with_max_depth(0).max_depth, 1);
    }

    #[test]
    fn test_unknown_target_is_skipped() {
        let schema = SchemaDocument::new()
            .with_model("post", ModelDef::new().field("author", FieldDef::relation("ghost")));
        let graph = extract_relation_graph(&schema, &GraphConfig::default());
        assert!(graph.relations("post").unwrap().is_empty());
    }
}
