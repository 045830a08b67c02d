//! Query specifications.
//!
//! A [`QuerySpec`] says which scalar fields of an entity to keep and which
//! relations to traverse. In JSON it reads:
//!
//! ```json
//! { "fields": ["id", "email"], "relations": { "posts": { "fields": ["title"] }, "profile": true } }
//! ```
//!
//! A relation set to `true` is returned whole; `false` is the same as leaving
//! the relation out.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// The fields and relations requested for one level of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSpec", into = "RawSpec")]
pub struct QuerySpec {
    /// `None` means no field restriction was declared at this level.
    fields: Option<IndexSet<String>>,
    relations: IndexMap<String, RelationSpec>,
}

/// What to do with one requested relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationSpec {
    /// Return the related record(s) whole.
    All,
    /// Apply a nested query to the related record(s).
    Query(QuerySpec),
}

impl QuerySpec {
    /// Creates a spec that keeps every field and traverses no relation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared empty spec.
    #[must_use]
    pub fn empty() -> &'static Self {
        static EMPTY: OnceLock<QuerySpec> = OnceLock::new();
        EMPTY.get_or_init(QuerySpec::default)
    }

    /// Restricts the level to the given scalar fields.
    ///
    /// An empty field list is the same as declaring none.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: IndexSet<String> = fields.into_iter().map(Into::into).collect();
        self.fields = (!fields.is_empty()).then_some(fields);
        self
    }

    /// Adds one scalar field to the restriction.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.get_or_insert_with(IndexSet::new).insert(name.into());
        self
    }

    /// Requests a relation.
    #[must_use]
    pub fn relation(mut self, name: impl Into<String>, spec: RelationSpec) -> Self {
        self.relations.insert(name.into(), spec);
        self
    }

    /// Requests a relation returned whole.
    #[must_use]
    pub fn with(self, name: impl Into<String>) -> Self {
        self.relation(name, RelationSpec::All)
    }

    /// Requests a relation shaped by a nested spec.
    #[must_use]
    pub fn with_query(self, name: impl Into<String>, spec: QuerySpec) -> Self {
        self.relation(name, RelationSpec::Query(spec))
    }

    /// Returns the declared field restriction, if any.
    #[must_use]
    pub fn declared_fields(&self) -> Option<&IndexSet<String>> {
        self.fields.as_ref()
    }

    /// Returns true if this level declares a field restriction.
    #[must_use]
    pub fn has_fields(&self) -> bool {
        self.fields.is_some()
    }

    /// Returns the requested relations in declaration order.
    #[must_use]
    pub fn relations(&self) -> &IndexMap<String, RelationSpec> {
        &self.relations
    }

    /// Returns true if the spec neither restricts fields nor requests relations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_none() && self.relations.is_empty()
    }
}

impl RelationSpec {
    /// Returns the nested spec, or the shared empty spec for [`RelationSpec::All`].
    #[must_use]
    pub fn spec(&self) -> &QuerySpec {
        match self {
            Self::All => QuerySpec::empty(),
            Self::Query(spec) => spec,
        }
    }
}

impl From<QuerySpec> for RelationSpec {
    fn from(spec: QuerySpec) -> Self {
        Self::Query(spec)
    }
}

// Wire form.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    relations: IndexMap<String, RawRelation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawRelation {
    Flag(bool),
    Spec(RawSpec),
}

impl From<RawSpec> for QuerySpec {
    fn from(raw: RawSpec) -> Self {
        let mut spec = QuerySpec::new().fields(raw.fields.unwrap_or_default());
        for (name, relation) in raw.relations {
            match relation {
                RawRelation::Flag(false) => {}
                RawRelation::Flag(true) => spec = spec.with(name),
                RawRelation::Spec(nested) => spec = spec.with_query(name, nested.into()),
            }
        }
        spec
    }
}

impl From<QuerySpec> for RawSpec {
    fn from(spec: QuerySpec) -> Self {
        Self {
            fields: spec.fields.map(|fields| fields.into_iter().collect()),
            relations: spec
                .relations
                .into_iter()
                .map(|(name, relation)| {
                    let raw = match relation {
                        RelationSpec::All => RawRelation::Flag(true),
                        RelationSpec::Query(nested) => RawRelation::Spec(nested.into()),
                    };
                    (name, raw)
                })
                .collect(),
        }
    }
}
