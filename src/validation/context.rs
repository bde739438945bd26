use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{
        Document, FragmentDefinition, FragmentSpread, InputValue, Node, OperationDefinition,
        Selection, SelectionSet, Type, ValueNode, VariableDefinition,
    },
    parser::SourcePosition,
    schema::model::Schema,
    visitor::{HasTypeInfo, TypeInfo, TypeInfoVisitor, VisitAction, VisitInfo, Visitor, visit},
};

/// Query validation error
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// Access the message for a validation error
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Access the positions of the validation error
    ///
    /// All validation errors contain at least one source position, but some
    /// validators supply extra context through multiple positions.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message.trim_end_matches('.'))
    }
}

impl std::error::Error for RuleError {}

/// A variable reference found in an operation or a fragment, with the input
/// type expected where it is used.
#[derive(Clone, Debug)]
pub struct VariableUsage {
    /// Variable name, without the `$`.
    pub name: ArcStr,
    /// Where the reference is written.
    pub position: SourcePosition,
    /// Type expected at the reference, if known.
    pub input_type: Option<Type>,
}

/// State shared by all rules during a validation pass.
#[doc(hidden)]
pub struct ValidatorContext<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    type_info: TypeInfo<'a>,
    errors: Vec<RuleError>,
    fragments: FnvHashMap<ArcStr, Arc<FragmentDefinition>>,
    spreads: FnvHashMap<usize, Arc<[Arc<FragmentSpread>]>>,
    referenced_fragments: FnvHashMap<usize, Arc<[Arc<FragmentDefinition>]>>,
    variable_usages: FnvHashMap<usize, Arc<[VariableUsage]>>,
}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(schema: &'a Schema, document: &'a Document) -> Self {
        let mut fragments = FnvHashMap::default();
        for frag in document.fragments() {
            fragments
                .entry(frag.name.item.clone())
                .or_insert_with(|| Arc::clone(frag));
        }

        Self {
            schema,
            document,
            type_info: TypeInfo::new(schema),
            errors: vec![],
            fragments,
            spreads: FnvHashMap::default(),
            referenced_fragments: FnvHashMap::default(),
            variable_usages: FnvHashMap::default(),
        }
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations))
    }

    #[doc(hidden)]
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    /// Types at the current position of the walk.
    pub fn type_info(&self) -> &TypeInfo<'a> {
        &self.type_info
    }

    /// Looks up a fragment of the document by name. The first definition
    /// wins when a name is defined twice.
    pub fn fragment(&self, name: &str) -> Option<&Arc<FragmentDefinition>> {
        self.fragments.get(name)
    }

    /// Fragment spreads found anywhere below a selection set, without
    /// following them into their fragments.
    pub fn fragment_spreads(&mut self, set: &Arc<SelectionSet>) -> Arc<[Arc<FragmentSpread>]> {
        let key = Arc::as_ptr(set) as usize;
        if let Some(spreads) = self.spreads.get(&key) {
            return Arc::clone(spreads);
        }

        let mut spreads = vec![];
        let mut sets = vec![Arc::clone(set)];
        while let Some(set) = sets.pop() {
            for selection in &set.selections {
                match selection {
                    Selection::FragmentSpread(spread) => spreads.push(Arc::clone(spread)),
                    Selection::InlineFragment(inline) => {
                        sets.push(Arc::clone(&inline.selection_set));
                    }
                    Selection::Field(field) => {
                        if let Some(set) = &field.selection_set {
                            sets.push(Arc::clone(set));
                        }
                    }
                }
            }
        }

        let spreads: Arc<[_]> = spreads.into();
        self.spreads.insert(key, Arc::clone(&spreads));
        spreads
    }

    /// Fragments transitively spread by an operation, each listed once.
    pub fn recursively_referenced_fragments(
        &mut self,
        operation: &Arc<OperationDefinition>,
    ) -> Arc<[Arc<FragmentDefinition>]> {
        let key = Arc::as_ptr(operation) as usize;
        if let Some(frags) = self.referenced_fragments.get(&key) {
            return Arc::clone(frags);
        }

        let mut frags = vec![];
        let mut collected = FnvHashSet::default();
        let mut sets = vec![Arc::clone(&operation.selection_set)];
        while let Some(set) = sets.pop() {
            for spread in self.fragment_spreads(&set).iter() {
                if !collected.insert(spread.name.item.clone()) {
                    continue;
                }
                if let Some(frag) = self.fragment(&spread.name.item).cloned() {
                    sets.push(Arc::clone(&frag.selection_set));
                    frags.push(frag);
                }
            }
        }

        let frags: Arc<[_]> = frags.into();
        self.referenced_fragments.insert(key, Arc::clone(&frags));
        frags
    }

    /// Variable references inside a node, with their expected input types.
    ///
    /// Variable definitions themselves are not searched.
    pub fn variable_usages(&mut self, node: &Node) -> Arc<[VariableUsage]> {
        let key = match node {
            Node::OperationDefinition(op) => Arc::as_ptr(op) as usize,
            Node::FragmentDefinition(frag) => Arc::as_ptr(frag) as usize,
            _ => return Vec::new().into(),
        };
        if let Some(usages) = self.variable_usages.get(&key) {
            return Arc::clone(usages);
        }

        let mut collector = TypeInfoVisitor::new(UsageCollector::default());
        let mut type_info = TypeInfo::new(self.schema);
        // Read-only walk, it cannot fail.
        let _ = visit(node.clone(), &mut collector, &mut type_info);

        let usages: Arc<[_]> = collector.into_inner().0.into();
        self.variable_usages.insert(key, Arc::clone(&usages));
        usages
    }

    /// Variable references of an operation and of every fragment it spreads.
    pub fn recursive_variable_usages(
        &mut self,
        operation: &Arc<OperationDefinition>,
    ) -> Vec<VariableUsage> {
        let mut usages = self
            .variable_usages(&Node::OperationDefinition(Arc::clone(operation)))
            .to_vec();
        for frag in self.recursively_referenced_fragments(operation).iter() {
            usages.extend(
                self.variable_usages(&Node::FragmentDefinition(Arc::clone(frag)))
                    .iter()
                    .cloned(),
            );
        }
        usages
    }
}

impl<'a> HasTypeInfo<'a> for ValidatorContext<'a> {
    fn type_info(&self) -> &TypeInfo<'a> {
        &self.type_info
    }

    fn type_info_mut(&mut self) -> &mut TypeInfo<'a> {
        &mut self.type_info
    }
}

#[derive(Default)]
struct UsageCollector(Vec<VariableUsage>);

impl<'s> Visitor<TypeInfo<'s>> for UsageCollector {
    fn enter_variable_definition(
        &mut self,
        _: &mut TypeInfo<'s>,
        _: &Arc<VariableDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }

    fn enter_value(
        &mut self,
        cx: &mut TypeInfo<'s>,
        value: &Arc<ValueNode>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if let InputValue::Variable(name) = &value.item {
            self.0.push(VariableUsage {
                name: name.clone(),
                position: value.span.start,
                input_type: cx.input_type().cloned(),
            });
        }
        VisitAction::Continue
    }
}
