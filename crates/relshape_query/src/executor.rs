//! Query executors.
//!
//! A [`QueryExecutor`] holds one compiled query and parses raw ORM results
//! for it. Executors are immutable and cheap to clone, so they can be kept
//! and reused across calls and threads.

use crate::compiled::CompiledQuery;
use crate::error::{ExpectedShape, QueryError, QueryResult};
use crate::reshape::Reshaper;
use crate::result::SafeParseResult;
use crate::spec::QuerySpec;
use relshape_core::{EntityId, QueryPath, RelationMap, ValidatorRegistry};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// A compiled query bound to its entity.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    entity: EntityId,
    spec: QuerySpec,
    compiled_query: CompiledQuery,
    relations: Arc<RelationMap>,
    validators: Arc<ValidatorRegistry>,
}

impl QueryExecutor {
    pub(crate) fn new(
        entity: EntityId,
        spec: QuerySpec,
        compiled_query: CompiledQuery,
        relations: Arc<RelationMap>,
        validators: Arc<ValidatorRegistry>,
    ) -> Self {
        Self {
            entity,
            spec,
            compiled_query,
            relations,
            validators,
        }
    }

    /// Returns the compiled ORM query.
    #[must_use]
    pub fn compiled_query(&self) -> &CompiledQuery {
        &self.compiled_query
    }

    /// Returns the spec the query was built from.
    #[must_use]
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Returns the root entity.
    #[must_use]
    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    /// Reshapes one raw result.
    pub fn parse(&self, raw: &Value) -> QueryResult<Value> {
        self.reshaper()
            .reshape(&self.spec, &self.relations, &self.entity, raw)
    }

    /// Like [`parse`](Self::parse), returning the failure as a value.
    #[must_use]
    pub fn safe_parse(&self, raw: &Value) -> SafeParseResult<Value> {
        self.parse(raw).into()
    }

    /// Reshapes one raw result and decodes it into `T`.
    pub fn parse_as<T: DeserializeOwned>(&self, raw: &Value) -> QueryResult<T> {
        let value = self.parse(raw)?;
        serde_json::from_value(value).map_err(|err| QueryError::decode(&self.entity, &err))
    }

    /// Returns an executor over sequences of raw results.
    #[must_use]
    pub fn array(&self) -> ArrayExecutor<'_> {
        ArrayExecutor { executor: self }
    }

    fn reshaper(&self) -> Reshaper<'_> {
        Reshaper::new(&self.validators)
    }
}

/// Parses sequences of raw results for a [`QueryExecutor`].
///
/// The first failing element aborts the whole sequence; its error path starts
/// with the element index.
#[derive(Debug, Clone, Copy)]
pub struct ArrayExecutor<'a> {
    executor: &'a QueryExecutor,
}

impl ArrayExecutor<'_> {
    /// Reshapes every element of a raw array, in order.
    pub fn parse(&self, raw: &Value) -> QueryResult<Vec<Value>> {
        let executor = self.executor;
        let Value::Array(items) = raw else {
            return Err(QueryError::invalid_shape(
                &executor.entity,
                &QueryPath::root(),
                ExpectedShape::Array,
                raw,
            ));
        };

        tracing::trace!(entity = %executor.entity, items = items.len(), "relshape.parse.array");
        executor.reshaper().reshape_items(
            &executor.spec,
            &executor.relations,
            &executor.entity,
            items,
            &QueryPath::root(),
        )
    }

    /// Like [`parse`](Self::parse), returning the failure as a value.
    #[must_use]
    pub fn safe_parse(&self, raw: &Value) -> SafeParseResult<Vec<Value>> {
        self.parse(raw).into()
    }

    /// Reshapes every element and decodes the sequence into `Vec<T>`.
    pub fn parse_as<T: DeserializeOwned>(&self, raw: &Value) -> QueryResult<Vec<T>> {
        self.parse(raw)?
            .into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|err| QueryError::decode(&self.executor.entity, &err))
            })
            .collect()
    }
}
