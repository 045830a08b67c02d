//! Compiled ORM query objects.
//!
//! A [`CompiledQuery`] is the Prisma-style `select`/`include` object an ORM
//! executes to fetch exactly the data a query needs:
//!
//! ```json
//! { "select": { "id": true, "posts": { "select": { "title": true } } } }
//! ```

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Ordered entries of a `select` or `include` object.
pub type SelectionMap = IndexMap<String, Selection>;

/// The two ORM query kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Only the listed keys are fetched.
    Select,
    /// Every scalar is fetched, plus the listed relations.
    Include,
}

impl QueryKind {
    /// Returns the JSON key of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Include => "include",
        }
    }
}

/// A compiled `select` or `include` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompiledQuery {
    Select(SelectionMap),
    Include(SelectionMap),
}

/// One entry of a compiled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Serialized as `true`.
    All,
    /// A nested compiled query for a relation.
    Nested(CompiledQuery),
}

impl CompiledQuery {
    /// An empty `include`, which fetches every scalar and no relation.
    #[must_use]
    pub fn empty() -> Self {
        Self::Include(SelectionMap::new())
    }

    /// Returns the query kind.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        match self {
            Self::Select(_) => QueryKind::Select,
            Self::Include(_) => QueryKind::Include,
        }
    }

    #[must_use]
    pub const fn is_select(&self) -> bool {
        matches!(self, Self::Select(_))
    }

    #[must_use]
    pub const fn is_include(&self) -> bool {
        matches!(self, Self::Include(_))
    }

    /// Returns the entries.
    #[must_use]
    pub fn entries(&self) -> &SelectionMap {
        match self {
            Self::Select(entries) | Self::Include(entries) => entries,
        }
    }

    /// Consumes the query and returns its entries.
    #[must_use]
    pub fn into_entries(self) -> SelectionMap {
        match self {
            Self::Select(entries) | Self::Include(entries) => entries,
        }
    }

    /// Returns true for an `include` without entries.
    #[must_use]
    pub fn is_empty_include(&self) -> bool {
        self.is_include() && self.entries().is_empty()
    }

    /// Merges two compiled queries.
    ///
    /// The result is a `select` if either side is one. Keys present on both
    /// sides merge recursively, and [`Selection::All`] absorbs a nested query.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let select = self.is_select() || other.is_select();
        let mut entries = self.into_entries();

        for (key, selection) in other.into_entries() {
            match entries.get_mut(&key) {
                Some(existing) => {
                    let previous = std::mem::replace(existing, Selection::All);
                    *existing = previous.merge(selection);
                }
                None => {
                    entries.insert(key, selection);
                }
            }
        }

        if select {
            Self::Select(entries)
        } else {
            Self::Include(entries)
        }
    }

    /// Converts the query into a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let entries: Map<String, Value> = self
            .entries()
            .iter()
            .map(|(key, selection)| (key.clone(), selection.to_json()))
            .collect();

        let mut object = Map::with_capacity(1);
        object.insert(self.kind().as_str().to_owned(), Value::Object(entries));
        Value::Object(object)
    }
}

impl Default for CompiledQuery {
    fn default() -> Self {
        Self::empty()
    }
}

impl Selection {
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Nested(left), Self::Nested(right)) => Self::Nested(left.merge(right)),
            _ => Self::All,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::All => Value::Bool(true),
            Self::Nested(query) => query.to_json(),
        }
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_bool(true),
            Self::Nested(query) => query.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn select(keys: &[&str]) -> CompiledQuery {
        CompiledQuery::Select(keys.iter().map(|k| ((*k).to_owned(), Selection::All)).collect())
    }

    fn include(entries: Vec<(&str, Selection)>) -> CompiledQuery {
        CompiledQuery::Include(entries.into_iter().map(|(k, s)| (k.to_owned(), s)).collect())
    }

    #[test]
    fn test_to_json() {
        let query = select(&["id"]).merge(include(vec![(
            "posts",
            Selection::Nested(select(&["title"])),
        )]));

        let expected = json!({ "select": { "id": true, "posts": { "select": { "title": true } } } });
        assert_eq!(query.to_json(), expected);
        assert_eq!(serde_json::to_value(&query).unwrap(), expected);
    }

    #[test]
    fn test_merge_kinds() {
        assert!(select(&["id"]).merge(CompiledQuery::empty()).is_select());
        assert!(CompiledQuery::empty().merge(select(&["id"])).is_select());
        assert!(CompiledQuery::empty()
            .merge(include(vec![("posts", Selection::All)]))
            .is_include());
    }

    #[test]
    fn test_merge_keeps_order() {
        let merged = select(&["id", "email"]).merge(select(&["name", "id"]));
        let keys: Vec<_> = merged.entries().keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "email", "name"]);
    }

    #[test]
    fn test_merge_nested() {
        let left = include(vec![("posts", Selection::Nested(select(&["title"])))]);
        let right = include(vec![("posts", Selection::Nested(select(&["body"])))]);
        let merged = left.merge(right);
        assert_eq!(
            merged.to_json(),
            json!({ "include": { "posts": { "select": { "title": true, "body": true } } } })
        );

        let whole = merged.merge(include(vec![("posts", Selection::All)]));
        assert_eq!(whole.entries().get("posts"), Some(&Selection::All));
    }

    #[test]
    fn test_empty_include() {
        let empty = CompiledQuery::default();
        assert!(empty.is_empty_include());
        assert_eq!(empty.to_json(), json!({ "include": {} }));
        assert!(!select(&[]).is_empty_include());
    }
}
