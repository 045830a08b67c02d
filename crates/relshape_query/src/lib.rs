//! # relshape query engine
//!
//! Compiles declarative query specs into ORM `select`/`include` objects and
//! reshapes the raw results back into validated values.
//!
//! ## Example
//!
//! ```ignore
//! use relshape_query::{QueryRegistry, QuerySpec, RegistryConfig};
//! use relshape_schema::{GraphConfig, SchemaDocument};
//!
//! let schema = SchemaDocument::load("schema.json")?.validated()?;
//! let registry = QueryRegistry::new(RegistryConfig::from_schema(&schema, &GraphConfig::default())?);
//!
//! let query = registry.create_query("user")?.build(
//!     QuerySpec::new()
//!         .fields(["id", "email"])
//!         .with_query("posts", QuerySpec::new().fields(["title"])),
//! );
//!
//! let orm_args = query.compiled_query().to_json();
//! // ... fetch `raw` with `orm_args` ...
//! let user = query.parse(&raw)?;
//! ```

pub mod builder;
pub mod compiled;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod registry;
pub mod reshape;
pub mod result;
pub mod spec;

pub use builder::QueryBuilder;
pub use compiled::{CompiledQuery, QueryKind, Selection, SelectionMap};
pub use compiler::compile;
pub use error::{EntitySource, ErrorCode, ExpectedShape, QueryError, QueryResult};
pub use executor::{ArrayExecutor, QueryExecutor};
pub use registry::{QueryRegistry, RegistryConfig};
pub use reshape::{reshape, Reshaper};
pub use result::SafeParseResult;
pub use spec::{QuerySpec, RelationSpec};
