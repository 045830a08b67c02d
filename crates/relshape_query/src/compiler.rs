//! Query compilation.
//!
//! Turns a [`QuerySpec`] into the [`CompiledQuery`] an ORM needs to fetch the
//! data the reshaper will read. A level that declares fields compiles to a
//! `select` of those fields plus its relations; any other level compiles to an
//! `include` of its relations.

use crate::compiled::{CompiledQuery, Selection, SelectionMap};
use crate::spec::{QuerySpec, RelationSpec};
use relshape_core::{RelationDescriptor, RelationMap};

/// Compiles a query spec against the relations of its entity.
///
/// Relations the spec names but `relations` does not describe are left out.
#[must_use]
pub fn compile(spec: &QuerySpec, relations: &RelationMap) -> CompiledQuery {
    let scalars = match spec.declared_fields() {
        Some(fields) => CompiledQuery::Select(
            fields
                .iter()
                .map(|field| (field.clone(), Selection::All))
                .collect(),
        ),
        None => CompiledQuery::empty(),
    };

    let mut related = SelectionMap::with_capacity(spec.relations().len());
    for (name, relation) in spec.relations() {
        let Some(descriptor) = relations.get(name) else {
            tracing::debug!(relation = %name, "relshape.compile.unknown_relation");
            continue;
        };
        related.insert(name.clone(), compile_relation(relation, descriptor));
    }

    scalars.merge(CompiledQuery::Include(related))
}

fn compile_relation(relation: &RelationSpec, descriptor: &RelationDescriptor) -> Selection {
    match relation {
        RelationSpec::All => Selection::All,
        RelationSpec::Query(spec) => {
            let nested = compile(spec, descriptor.nested_relations());
            if nested.is_empty_include() {
                Selection::All
            } else {
                Selection::Nested(nested)
            }
        }
    }
}
