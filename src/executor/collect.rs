use std::sync::{Arc, PoisonError};

use arcstr::ArcStr;
use fnv::FnvHashSet;
use indexmap::IndexMap;

use crate::{
    ast::{Directive, Field, NamedType, Selection, SelectionSet},
    executor::{ExecutionContext, values},
    schema::meta::MetaType,
};

/// Fields of a selection set grouped by response name, in document order.
pub(crate) type FieldMap = IndexMap<ArcStr, Vec<Arc<Field>>>;

/// Collects the fields the operation selects on its root type.
pub(crate) fn collect_root_fields(ctx: &ExecutionContext, root: &MetaType) -> Arc<FieldMap> {
    let mut fields = FieldMap::new();
    let mut visited = FnvHashSet::default();
    collect_fields(ctx, root, &ctx.operation.selection_set, &mut fields, &mut visited);
    Arc::new(fields)
}

/// Collects the fields selected below `field_asts` on the object type
/// `return_type`.
///
/// The result is memoized per object type and field occurrences, so list
/// items of the same type share it.
pub(crate) fn collect_subfields(
    ctx: &ExecutionContext,
    return_type: &MetaType,
    field_asts: &[Arc<Field>],
) -> Arc<FieldMap> {
    let key = (
        return_type.name().clone(),
        field_asts.iter().map(|f| Arc::as_ptr(f) as usize).collect::<Vec<_>>(),
    );
    if let Some(found) = ctx
        .subfields
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(found);
    }

    let mut fields = FieldMap::new();
    let mut visited = FnvHashSet::default();
    for ast in field_asts {
        if let Some(selection_set) = &ast.selection_set {
            collect_fields(ctx, return_type, selection_set, &mut fields, &mut visited);
        }
    }
    let fields = Arc::new(fields);

    ctx.subfields
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key, Arc::clone(&fields));
    fields
}

fn collect_fields(
    ctx: &ExecutionContext,
    runtime_type: &MetaType,
    selection_set: &SelectionSet,
    fields: &mut FieldMap,
    visited_fragments: &mut FnvHashSet<ArcStr>,
) {
    for selection in &selection_set.selections {
        if !should_include(ctx, selection.directives()) {
            continue;
        }
        match selection {
            Selection::Field(f) => {
                fields
                    .entry(f.response_name().clone())
                    .or_default()
                    .push(Arc::clone(f));
            }
            Selection::InlineFragment(frag) => {
                if !does_fragment_condition_match(ctx, frag.type_condition.as_deref(), runtime_type) {
                    continue;
                }
                collect_fields(ctx, runtime_type, &frag.selection_set, fields, visited_fragments);
            }
            Selection::FragmentSpread(spread) => {
                let name = &spread.name.item;
                if !visited_fragments.insert(name.clone()) {
                    continue;
                }
                let Some(fragment) = ctx.fragments.get(name) else {
                    continue;
                };
                if !does_fragment_condition_match(ctx, Some(&*fragment.type_condition), runtime_type) {
                    continue;
                }
                collect_fields(ctx, runtime_type, &fragment.selection_set, fields, visited_fragments);
            }
        }
    }
}

/// Evaluates `@skip` and `@include`.
fn should_include(ctx: &ExecutionContext, directives: &[Arc<Directive>]) -> bool {
    let condition = |name: &str| {
        let directive = directives.iter().find(|d| d.name.item == name)?;
        let def = ctx.schema.directive_by_name(name)?;
        let args = values::argument_values(&ctx.schema, &def.arguments, &directive.arguments, &ctx.variables).ok()?;
        args.get("if")?.as_boolean_value()
    };

    if condition("skip") == Some(true) {
        return false;
    }
    condition("include") != Some(false)
}

fn does_fragment_condition_match(
    ctx: &ExecutionContext,
    type_condition: Option<&NamedType>,
    runtime_type: &MetaType,
) -> bool {
    let Some(condition) = type_condition else {
        return true;
    };
    if &condition.name.item == runtime_type.name() {
        return true;
    }
    ctx.schema
        .concrete_type_by_name(&condition.name.item)
        .is_some_and(|t| t.is_abstract() && ctx.schema.is_possible_type(t, runtime_type))
}
