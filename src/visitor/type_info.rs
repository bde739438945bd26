use std::marker::PhantomData;

use crate::{
    ast::{InputValue, Node, OperationType, Type},
    schema::{
        meta::{Argument, EnumValue, Field, MetaType},
        model::{DirectiveType, Schema},
    },
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Schema types found at the current position of a walk over a document.
///
/// Call [`TypeInfo::enter()`] and [`TypeInfo::leave()`] for every node, in
/// walk order, or let a [`TypeInfoVisitor`] do it. Positions the schema does
/// not know about yield `None`.
#[derive(Debug)]
pub struct TypeInfo<'s> {
    schema: &'s Schema,
    type_stack: Vec<Option<Type>>,
    parent_type_stack: Vec<Option<&'s MetaType>>,
    input_type_stack: Vec<Option<Type>>,
    field_def_stack: Vec<Option<&'s Field>>,
    default_value_stack: Vec<Option<&'s InputValue>>,
    directive: Option<&'s DirectiveType>,
    argument: Option<&'s Argument>,
    enum_value: Option<&'s EnumValue>,
}

impl<'s> TypeInfo<'s> {
    /// Starts tracking types of `schema`, outside of any node.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            type_stack: vec![],
            parent_type_stack: vec![],
            input_type_stack: vec![],
            field_def_stack: vec![],
            default_value_stack: vec![],
            directive: None,
            argument: None,
            enum_value: None,
        }
    }

    /// The schema types are looked up in.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Output type of the current field, operation or fragment.
    pub fn current_type(&self) -> Option<&Type> {
        self.type_stack.last()?.as_ref()
    }

    /// Composite type the current selection set selects on.
    pub fn parent_type(&self) -> Option<&'s MetaType> {
        *self.parent_type_stack.last()?
    }

    /// Type expected for the current input value.
    pub fn input_type(&self) -> Option<&Type> {
        self.input_type_stack.last()?.as_ref()
    }

    /// Type expected for the input value containing the current one.
    pub fn parent_input_type(&self) -> Option<&Type> {
        let len = self.input_type_stack.len();
        self.input_type_stack.get(len.checked_sub(2)?)?.as_ref()
    }

    /// Definition of the current field.
    pub fn field_def(&self) -> Option<&'s Field> {
        *self.field_def_stack.last()?
    }

    /// Default of the current argument or input field.
    pub fn default_value(&self) -> Option<&'s InputValue> {
        *self.default_value_stack.last()?
    }

    /// Definition of the current directive.
    pub fn directive(&self) -> Option<&'s DirectiveType> {
        self.directive
    }

    /// Definition of the current argument.
    pub fn argument(&self) -> Option<&'s Argument> {
        self.argument
    }

    /// Definition of the current enum value.
    pub fn enum_value(&self) -> Option<&'s EnumValue> {
        self.enum_value
    }

    fn named_output_type(&self, name: &str) -> Option<Type> {
        self.schema
            .concrete_type_by_name(name)
            .filter(|t| t.is_output())
            .map(|t| Type::Named(t.name().clone()))
    }

    fn input_type_of(&self, t: &Type) -> Option<Type> {
        self.schema
            .innermost_concrete_type(t)
            .is_some_and(MetaType::is_input)
            .then(|| t.clone())
    }

    /// Updates the state for arriving at `node`.
    pub fn enter(&mut self, node: &Node) {
        let schema = self.schema;
        match node {
            Node::SelectionSet(_) => {
                let parent = self
                    .current_type()
                    .and_then(|t| schema.innermost_concrete_type(t))
                    .filter(|t| t.is_composite());
                self.parent_type_stack.push(parent);
            }
            Node::Field(f) => {
                let def = self
                    .parent_type()
                    .and_then(|parent| schema.field_def(parent, &f.name.item));
                let field_type = def
                    .map(|d| &d.field_type)
                    .filter(|t| schema.innermost_concrete_type(t).is_some_and(MetaType::is_output))
                    .cloned();
                self.field_def_stack.push(def);
                self.type_stack.push(field_type);
            }
            Node::Directive(d) => {
                self.directive = schema.directive_by_name(&d.name.item);
            }
            Node::OperationDefinition(op) => {
                let root = match op.operation {
                    OperationType::Query => Some(schema.query_type()),
                    OperationType::Mutation => schema.mutation_type(),
                    OperationType::Subscription => schema.subscription_type(),
                };
                self.type_stack
                    .push(root.map(|t| Type::Named(t.name().clone())));
            }
            Node::InlineFragment(frag) => {
                let output_type = match &frag.type_condition {
                    Some(cond) => self.named_output_type(&cond.name.item),
                    None => self
                        .current_type()
                        .and_then(|t| self.named_output_type(t.innermost_name())),
                };
                self.type_stack.push(output_type);
            }
            Node::FragmentDefinition(frag) => {
                let output_type = self.named_output_type(&frag.type_condition.name.item);
                self.type_stack.push(output_type);
            }
            Node::VariableDefinition(def) => {
                let input_type = self.input_type_of(&def.var_type.to_type());
                self.input_type_stack.push(input_type);
            }
            Node::Argument(arg) => {
                let arguments = match self.directive {
                    Some(d) => Some(&d.arguments),
                    None => self.field_def().map(|f| &f.arguments),
                };
                let def = arguments.and_then(|args| args.get(&arg.name.item));
                self.argument = def;
                self.default_value_stack
                    .push(def.and_then(|d| d.default_value.as_ref()));
                let input_type = def.and_then(|d| self.input_type_of(&d.arg_type));
                self.input_type_stack.push(input_type);
            }
            Node::Value(v) => match &v.item {
                InputValue::List(_) => {
                    let item_type = self.input_type().map(|t| match t.list_contents() {
                        Some(item) => item.clone(),
                        None => t.nullable(),
                    });
                    let item_type = item_type.and_then(|t| self.input_type_of(&t));
                    self.default_value_stack.push(None);
                    self.input_type_stack.push(item_type);
                }
                InputValue::Enum(name) => {
                    self.enum_value = match self
                        .input_type()
                        .and_then(|t| schema.innermost_concrete_type(t))
                    {
                        Some(MetaType::Enum(e)) => e.values.get(name),
                        _ => None,
                    };
                }
                _ => {}
            },
            Node::ObjectField(field) => {
                let def = self
                    .input_type()
                    .and_then(|t| schema.innermost_concrete_type(t))
                    .and_then(|t| match t {
                        MetaType::InputObject(io) => io.input_fields.get(&field.name.item),
                        _ => None,
                    });
                self.default_value_stack
                    .push(def.and_then(|d| d.default_value.as_ref()));
                let input_type = def.and_then(|d| self.input_type_of(&d.arg_type));
                self.input_type_stack.push(input_type);
            }
            _ => {}
        }
    }

    /// Updates the state for leaving `node`. Must follow a matching
    /// [`TypeInfo::enter()`].
    pub fn leave(&mut self, node: &Node) {
        match node {
            Node::SelectionSet(_) => {
                self.parent_type_stack.pop();
            }
            Node::Field(_) => {
                self.field_def_stack.pop();
                self.type_stack.pop();
            }
            Node::Directive(_) => self.directive = None,
            Node::OperationDefinition(_) | Node::InlineFragment(_) | Node::FragmentDefinition(_) => {
                self.type_stack.pop();
            }
            Node::VariableDefinition(_) => {
                self.input_type_stack.pop();
            }
            Node::Argument(_) => {
                self.argument = None;
                self.default_value_stack.pop();
                self.input_type_stack.pop();
            }
            Node::Value(v) => match &v.item {
                InputValue::List(_) => {
                    self.default_value_stack.pop();
                    self.input_type_stack.pop();
                }
                InputValue::Enum(_) => self.enum_value = None,
                _ => {}
            },
            Node::ObjectField(_) => {
                self.default_value_stack.pop();
                self.input_type_stack.pop();
            }
            _ => {}
        }
    }
}

/// Context giving access to a [`TypeInfo`] kept up to date by a
/// [`TypeInfoVisitor`].
pub trait HasTypeInfo<'s> {
    /// The tracked types.
    fn type_info(&self) -> &TypeInfo<'s>;

    /// The tracked types, for updating.
    fn type_info_mut(&mut self) -> &mut TypeInfo<'s>;
}

impl<'s> HasTypeInfo<'s> for TypeInfo<'s> {
    fn type_info(&self) -> &TypeInfo<'s> {
        self
    }

    fn type_info_mut(&mut self) -> &mut TypeInfo<'s> {
        self
    }
}

/// Keeps the context's [`TypeInfo`] in step with the walk around an inner
/// visitor.
///
/// On enter, the types are updated before the inner visitor runs; on leave,
/// after it. When the inner visitor edits the tree, the types follow the
/// edit.
pub struct TypeInfoVisitor<'s, V> {
    inner: V,
    _schema: PhantomData<&'s Schema>,
}

impl<V> TypeInfoVisitor<'_, V> {
    /// Wraps `inner`.
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            _schema: PhantomData,
        }
    }

    /// Gives the inner visitor back.
    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<'s, C, V> Visitor<C> for TypeInfoVisitor<'s, V>
where
    C: HasTypeInfo<'s>,
    V: Visitor<C>,
{
    fn enter(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        cx.type_info_mut().enter(node);
        let action = self.inner.enter(cx, node, info);
        match &action {
            VisitAction::Continue => {}
            VisitAction::Skip | VisitAction::Stop | VisitAction::Delete => {
                cx.type_info_mut().leave(node);
            }
            VisitAction::Replace(new) => {
                cx.type_info_mut().leave(node);
                cx.type_info_mut().enter(new);
            }
        }
        action
    }

    fn leave(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        let action = self.inner.leave(cx, node, info);
        cx.type_info_mut().leave(node);
        action
    }
}
