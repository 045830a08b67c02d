//! Depth-bounded relation graph.
//!
//! A [`RelationGraph`] maps every entity to the relations it owns. Each
//! [`RelationDescriptor`] carries the relation map of its target one level
//! deeper, so the whole structure is a tree: cycles in the schema are cut by
//! the extractor before the graph is built, and nesting stops at the
//! configured maximum depth.

use crate::entity::EntityId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Relation maps keyed by relation name.
pub type RelationMap = IndexMap<String, RelationDescriptor>;

/// How many target records a relation resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// At most one target record.
    One,
    /// A sequence of target records.
    Many,
}

impl Cardinality {
    /// Returns true for `Many`.
    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::Many)
    }
}

/// One relation of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDescriptor {
    /// The entity this relation points at.
    pub target_entity: EntityId,

    /// Single or multi-valued.
    pub cardinality: Cardinality,

    /// Whether a single-valued relation may be absent (`null`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    /// Relations of the target, one level deeper. Absent once the depth
    /// bound is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<RelationMap>,
}

impl RelationDescriptor {
    /// Creates a required single-valued relation.
    pub fn one(target: impl Into<EntityId>) -> Self {
        Self {
            target_entity: target.into(),
            cardinality: Cardinality::One,
            optional: false,
            nested: None,
        }
    }

    /// Creates an optional single-valued relation.
    pub fn optional_one(target: impl Into<EntityId>) -> Self {
        Self {
            optional: true,
            ..Self::one(target)
        }
    }

    /// Creates a multi-valued relation.
    pub fn many(target: impl Into<EntityId>) -> Self {
        Self {
            target_entity: target.into(),
            cardinality: Cardinality::Many,
            optional: false,
            nested: None,
        }
    }

    /// Sets the nested relation map. Empty maps are stored as absent.
    #[must_use]
    pub fn with_nested(mut self, nested: RelationMap) -> Self {
        self.nested = if nested.is_empty() { None } else { Some(nested) };
        self
    }

    /// Returns true if `null` is an acceptable value for this relation.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.optional && matches!(self.cardinality, Cardinality::One)
    }

    /// Returns the nested relation map, or an empty map past the depth bound.
    #[must_use]
    pub fn nested_relations(&self) -> &RelationMap {
        self.nested.as_ref().unwrap_or(empty_relations())
    }
}

/// Per-entity relation maps for a whole schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationGraph {
    entities: IndexMap<EntityId, RelationMap>,
}

impl RelationGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity with its relations, replacing any previous entry.
    pub fn insert(&mut self, entity: impl Into<EntityId>, relations: RelationMap) {
        self.entities.insert(entity.into(), relations);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<EntityId>, relations: RelationMap) -> Self {
        self.insert(entity, relations);
        self
    }

    /// Gets the relation map of an entity.
    #[must_use]
    pub fn relations(&self, entity: &str) -> Option<&RelationMap> {
        self.entities.get(entity)
    }

    /// Returns true if the entity is known.
    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Returns all entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (&EntityId, &RelationMap)> {
        self.entities.iter()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the graph has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the deepest relation nesting found under any entity.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entities.values().map(map_depth).max().unwrap_or(0)
    }
}

fn map_depth(map: &RelationMap) -> usize {
    map.values()
        .map(|rel| 1 + rel.nested.as_ref().map_or(0, map_depth))
        .max()
        .unwrap_or(0)
}

fn empty_relations() -> &'static RelationMap {
    static EMPTY: std::sync::OnceLock<RelationMap> = std::sync::OnceLock::new();
    EMPTY.get_or_init(IndexMap::new)
}
