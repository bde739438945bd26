use std::sync::Arc;

use arcstr::ArcStr;
use fnv::{FnvHashMap, FnvHashSet};
use indexmap::IndexMap;

use crate::{
    ast::{Argument, Field, FragmentDefinition, Selection, SelectionSet, Type},
    parser::SourcePosition,
    schema::{meta::MetaType, model::Schema},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

#[derive(Debug)]
struct Conflict(ConflictReason, Vec<SourcePosition>, Vec<SourcePosition>);

#[derive(Clone, Debug, Eq, PartialEq)]
struct ConflictReason(ArcStr, ConflictReasonMessage);

#[derive(Clone, Debug, Eq, PartialEq)]
enum ConflictReasonMessage {
    Message(String),
    Nested(Vec<ConflictReason>),
}

/// A field selected under some response name, with the type it is selected
/// on and its return type, when known.
struct AstAndDef {
    parent_type: Option<ArcStr>,
    field: Arc<Field>,
    field_type: Option<Type>,
}

type AstAndDefCollection = IndexMap<ArcStr, Vec<AstAndDef>>;

/// Fields of a selection set, inline fragments flattened, by response name,
/// along with the names of the fragments it spreads.
struct FieldsAndFragmentNames {
    fields: AstAndDefCollection,
    fragment_names: Vec<ArcStr>,
}

/// Unordered pairs of fragment names already compared.
///
/// A pair compared with non mutually exclusive parents also answers for the
/// mutually exclusive case, but not the other way around.
#[derive(Debug, Default)]
struct PairSet(FnvHashSet<(ArcStr, ArcStr, bool)>);

impl PairSet {
    fn key(a: &ArcStr, b: &ArcStr, mutex: bool) -> (ArcStr, ArcStr, bool) {
        if a <= b {
            (a.clone(), b.clone(), mutex)
        } else {
            (b.clone(), a.clone(), mutex)
        }
    }

    fn contains(&self, a: &ArcStr, b: &ArcStr, mutex: bool) -> bool {
        self.0.contains(&Self::key(a, b, false))
            || (mutex && self.0.contains(&Self::key(a, b, true)))
    }

    fn insert(&mut self, a: &ArcStr, b: &ArcStr, mutex: bool) {
        self.0.insert(Self::key(a, b, mutex));
    }
}

/// Fields selected under the same response name must be mergeable into a
/// single result entry.
///
/// Two such fields conflict when they may apply to the same object and
/// select different fields or pass different arguments, when their return
/// types differ in shape or leaf type, or when their sub-selections
/// conflict in turn.
#[derive(Default)]
pub struct OverlappingFieldsCanBeMerged {
    compared_fragments: PairSet,
    cached_fields: FnvHashMap<usize, Arc<FieldsAndFragmentNames>>,
}

pub fn factory() -> OverlappingFieldsCanBeMerged {
    OverlappingFieldsCanBeMerged::default()
}

impl OverlappingFieldsCanBeMerged {
    fn find_conflicts_within_selection_set(
        &mut self,
        ctx: &ValidatorContext<'_>,
        parent_type: Option<&MetaType>,
        selection_set: &Arc<SelectionSet>,
    ) -> Vec<Conflict> {
        let mut conflicts = vec![];

        let field_map = self.fields_and_fragment_names(ctx, parent_type, selection_set);
        self.collect_conflicts_within(ctx, &mut conflicts, &field_map.fields);

        for (i, frag_name1) in field_map.fragment_names.iter().enumerate() {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                &field_map,
                frag_name1,
                false,
                &mut FnvHashSet::default(),
            );

            for frag_name2 in &field_map.fragment_names[i + 1..] {
                self.collect_conflicts_between_fragments(
                    ctx,
                    &mut conflicts,
                    frag_name1,
                    frag_name2,
                    false,
                );
            }
        }

        conflicts
    }

    fn collect_conflicts_between_fragments(
        &mut self,
        ctx: &ValidatorContext<'_>,
        conflicts: &mut Vec<Conflict>,
        fragment_name1: &ArcStr,
        fragment_name2: &ArcStr,
        mutually_exclusive: bool,
    ) {
        if fragment_name1 == fragment_name2 {
            return;
        }
        if self
            .compared_fragments
            .contains(fragment_name1, fragment_name2, mutually_exclusive)
        {
            return;
        }
        self.compared_fragments
            .insert(fragment_name1, fragment_name2, mutually_exclusive);

        let (Some(fragment1), Some(fragment2)) = (
            ctx.fragment(fragment_name1).cloned(),
            ctx.fragment(fragment_name2).cloned(),
        ) else {
            return;
        };

        let field_map1 = self.referenced_fields_and_fragment_names(ctx, &fragment1);
        let field_map2 = self.referenced_fields_and_fragment_names(ctx, &fragment2);

        self.collect_conflicts_between(
            ctx,
            conflicts,
            mutually_exclusive,
            &field_map1.fields,
            &field_map2.fields,
        );

        for other_fragment_name in &field_map2.fragment_names {
            self.collect_conflicts_between_fragments(
                ctx,
                conflicts,
                fragment_name1,
                other_fragment_name,
                mutually_exclusive,
            );
        }
        for other_fragment_name in &field_map1.fragment_names {
            self.collect_conflicts_between_fragments(
                ctx,
                conflicts,
                other_fragment_name,
                fragment_name2,
                mutually_exclusive,
            );
        }
    }

    /// Compares `field_map` against a fragment and everything the fragment
    /// spreads. `compared` guards against fragment cycles.
    fn collect_conflicts_between_fields_and_fragment(
        &mut self,
        ctx: &ValidatorContext<'_>,
        conflicts: &mut Vec<Conflict>,
        field_map: &Arc<FieldsAndFragmentNames>,
        fragment_name: &ArcStr,
        mutually_exclusive: bool,
        compared: &mut FnvHashSet<ArcStr>,
    ) {
        if !compared.insert(fragment_name.clone()) {
            return;
        }
        let Some(fragment) = ctx.fragment(fragment_name).cloned() else {
            return;
        };

        let field_map2 = self.referenced_fields_and_fragment_names(ctx, &fragment);
        if Arc::ptr_eq(field_map, &field_map2) {
            return;
        }

        self.collect_conflicts_between(
            ctx,
            conflicts,
            mutually_exclusive,
            &field_map.fields,
            &field_map2.fields,
        );

        for other_fragment_name in &field_map2.fragment_names {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                conflicts,
                field_map,
                other_fragment_name,
                mutually_exclusive,
                compared,
            );
        }
    }

    fn collect_conflicts_between(
        &mut self,
        ctx: &ValidatorContext<'_>,
        conflicts: &mut Vec<Conflict>,
        mutually_exclusive: bool,
        field_map1: &AstAndDefCollection,
        field_map2: &AstAndDefCollection,
    ) {
        for (response_name, fields1) in field_map1 {
            let Some(fields2) = field_map2.get(response_name) else {
                continue;
            };
            for field1 in fields1 {
                for field2 in fields2 {
                    if let Some(conflict) =
                        self.find_conflict(ctx, response_name, field1, field2, mutually_exclusive)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn collect_conflicts_within(
        &mut self,
        ctx: &ValidatorContext<'_>,
        conflicts: &mut Vec<Conflict>,
        field_map: &AstAndDefCollection,
    ) {
        for (response_name, fields) in field_map {
            for (i, field1) in fields.iter().enumerate() {
                for field2 in &fields[i + 1..] {
                    if let Some(conflict) =
                        self.find_conflict(ctx, response_name, field1, field2, false)
                    {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    fn find_conflict(
        &mut self,
        ctx: &ValidatorContext<'_>,
        response_name: &ArcStr,
        field1: &AstAndDef,
        field2: &AstAndDef,
        parents_mutually_exclusive: bool,
    ) -> Option<Conflict> {
        let schema = ctx.schema;
        let mutually_exclusive = parents_mutually_exclusive
            || (field1.parent_type != field2.parent_type
                && is_object_type(schema, field1.parent_type.as_ref())
                && is_object_type(schema, field2.parent_type.as_ref()));

        let (ast1, ast2) = (&field1.field, &field2.field);
        let conflict = |message: String| {
            Some(Conflict(
                ConflictReason(response_name.clone(), ConflictReasonMessage::Message(message)),
                vec![ast1.span.start],
                vec![ast2.span.start],
            ))
        };

        if !mutually_exclusive {
            if ast1.name.item != ast2.name.item {
                return conflict(format!(
                    "{} and {} are different fields",
                    ast1.name.item, ast2.name.item,
                ));
            }
            if !is_same_arguments(&ast1.arguments, &ast2.arguments) {
                return conflict("they have differing arguments".into());
            }
        }

        if let (Some(t1), Some(t2)) = (&field1.field_type, &field2.field_type) {
            if is_type_conflict(schema, t1, t2) {
                return conflict(format!("they return conflicting types {t1} and {t2}"));
            }
        }

        if let (Some(set1), Some(set2)) = (&ast1.selection_set, &ast2.selection_set) {
            let parent1 = field1
                .field_type
                .as_ref()
                .and_then(|t| schema.innermost_concrete_type(t));
            let parent2 = field2
                .field_type
                .as_ref()
                .and_then(|t| schema.innermost_concrete_type(t));
            let conflicts = self.find_conflicts_between_sub_selection_sets(
                ctx,
                mutually_exclusive,
                parent1,
                set1,
                parent2,
                set2,
            );
            return subfield_conflicts(
                conflicts,
                response_name,
                ast1.span.start,
                ast2.span.start,
            );
        }

        None
    }

    fn find_conflicts_between_sub_selection_sets(
        &mut self,
        ctx: &ValidatorContext<'_>,
        mutually_exclusive: bool,
        parent_type1: Option<&MetaType>,
        selection_set1: &Arc<SelectionSet>,
        parent_type2: Option<&MetaType>,
        selection_set2: &Arc<SelectionSet>,
    ) -> Vec<Conflict> {
        let mut conflicts = vec![];

        let field_map1 = self.fields_and_fragment_names(ctx, parent_type1, selection_set1);
        let field_map2 = self.fields_and_fragment_names(ctx, parent_type2, selection_set2);

        self.collect_conflicts_between(
            ctx,
            &mut conflicts,
            mutually_exclusive,
            &field_map1.fields,
            &field_map2.fields,
        );

        for fragment_name in &field_map2.fragment_names {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                &field_map1,
                fragment_name,
                mutually_exclusive,
                &mut FnvHashSet::default(),
            );
        }
        for fragment_name in &field_map1.fragment_names {
            self.collect_conflicts_between_fields_and_fragment(
                ctx,
                &mut conflicts,
                &field_map2,
                fragment_name,
                mutually_exclusive,
                &mut FnvHashSet::default(),
            );
        }

        for fragment_name1 in &field_map1.fragment_names {
            for fragment_name2 in &field_map2.fragment_names {
                self.collect_conflicts_between_fragments(
                    ctx,
                    &mut conflicts,
                    fragment_name1,
                    fragment_name2,
                    mutually_exclusive,
                );
            }
        }

        conflicts
    }

    fn referenced_fields_and_fragment_names(
        &mut self,
        ctx: &ValidatorContext<'_>,
        fragment: &FragmentDefinition,
    ) -> Arc<FieldsAndFragmentNames> {
        let fragment_type = ctx
            .schema
            .concrete_type_by_name(&fragment.type_condition.name.item);
        self.fields_and_fragment_names(ctx, fragment_type, &fragment.selection_set)
    }

    /// Memoized per selection set.
    fn fields_and_fragment_names(
        &mut self,
        ctx: &ValidatorContext<'_>,
        parent_type: Option<&MetaType>,
        selection_set: &Arc<SelectionSet>,
    ) -> Arc<FieldsAndFragmentNames> {
        let key = Arc::as_ptr(selection_set) as usize;
        if let Some(cached) = self.cached_fields.get(&key) {
            return Arc::clone(cached);
        }

        let mut result = FieldsAndFragmentNames {
            fields: IndexMap::new(),
            fragment_names: vec![],
        };
        collect_fields_and_fragment_names(ctx.schema, parent_type, selection_set, &mut result);

        let result = Arc::new(result);
        self.cached_fields.insert(key, Arc::clone(&result));
        result
    }
}

fn collect_fields_and_fragment_names(
    schema: &Schema,
    parent_type: Option<&MetaType>,
    selection_set: &SelectionSet,
    result: &mut FieldsAndFragmentNames,
) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                let field_type = parent_type
                    .and_then(|t| schema.field_def(t, &field.name.item))
                    .map(|def| def.field_type.clone());
                result
                    .fields
                    .entry(field.response_name().clone())
                    .or_default()
                    .push(AstAndDef {
                        parent_type: parent_type.map(|t| t.name().clone()),
                        field: Arc::clone(field),
                        field_type,
                    });
            }
            Selection::FragmentSpread(spread) => {
                if !result.fragment_names.contains(&spread.name.item) {
                    result.fragment_names.push(spread.name.item.clone());
                }
            }
            Selection::InlineFragment(inline) => {
                let inline_type = inline
                    .type_condition
                    .as_ref()
                    .and_then(|cond| schema.concrete_type_by_name(&cond.name.item))
                    .or(parent_type);
                collect_fields_and_fragment_names(
                    schema,
                    inline_type,
                    &inline.selection_set,
                    result,
                );
            }
        }
    }
}

fn subfield_conflicts(
    conflicts: Vec<Conflict>,
    response_name: &ArcStr,
    pos1: SourcePosition,
    pos2: SourcePosition,
) -> Option<Conflict> {
    if conflicts.is_empty() {
        return None;
    }

    let mut reasons = vec![];
    let mut positions1 = vec![pos1];
    let mut positions2 = vec![pos2];
    for Conflict(reason, p1, p2) in conflicts {
        reasons.push(reason);
        positions1.extend(p1);
        positions2.extend(p2);
    }

    Some(Conflict(
        ConflictReason(response_name.clone(), ConflictReasonMessage::Nested(reasons)),
        positions1,
        positions2,
    ))
}

/// Whether two return types can never be merged: their list and non-null
/// wrappers differ, or they end in different leaf types.
fn is_type_conflict(schema: &Schema, t1: &Type, t2: &Type) -> bool {
    match (t1, t2) {
        (Type::List(inner1), Type::List(inner2))
        | (Type::NonNullList(inner1), Type::NonNullList(inner2)) => {
            is_type_conflict(schema, inner1, inner2)
        }
        (Type::NonNullNamed(n1), Type::NonNullNamed(n2)) | (Type::Named(n1), Type::Named(n2)) => {
            let leaf = |n: &ArcStr| {
                schema
                    .concrete_type_by_name(n)
                    .is_some_and(MetaType::is_leaf)
            };
            (leaf(n1) || leaf(n2)) && n1 != n2
        }
        _ => true,
    }
}

fn is_same_arguments(args1: &[Arc<Argument>], args2: &[Arc<Argument>]) -> bool {
    args1.len() == args2.len()
        && args1.iter().all(|arg1| {
            args2
                .iter()
                .find(|arg2| arg2.name.item == arg1.name.item)
                .is_some_and(|arg2| arg1.value.item.unlocated_eq(&arg2.value.item))
        })
}

fn is_object_type(schema: &Schema, type_name: Option<&ArcStr>) -> bool {
    matches!(
        type_name.and_then(|n| schema.concrete_type_by_name(n)),
        Some(MetaType::Object(_)),
    )
}

impl<'a> Visitor<ValidatorContext<'a>> for OverlappingFieldsCanBeMerged {
    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        selection_set: &Arc<SelectionSet>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let parent_type = ctx.type_info().parent_type();
        let conflicts = self.find_conflicts_within_selection_set(ctx, parent_type, selection_set);

        for Conflict(ConflictReason(reason_name, reason), mut p1, p2) in conflicts {
            p1.extend(p2);
            ctx.report_error(&error_message(&reason_name, &reason), &p1);
        }
        VisitAction::Continue
    }
}

fn error_message(reason_name: &str, reason: &ConflictReasonMessage) -> String {
    format!(
        r#"Fields "{reason_name}" conflict because {}. Use different aliases on the fields to fetch both if this was intentional."#,
        format_reason(reason),
    )
}

fn format_reason(reason: &ConflictReasonMessage) -> String {
    match reason {
        ConflictReasonMessage::Message(message) => message.clone(),
        ConflictReasonMessage::Nested(nested) => nested
            .iter()
            .map(|ConflictReason(name, subreason)| {
                format!(
                    r#"subfields "{name}" conflict because {}"#,
                    format_reason(subreason),
                )
            })
            .collect::<Vec<_>>()
            .join(" and "),
    }
}
