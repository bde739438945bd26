use std::sync::Arc;

use crate::{
    ast::{
        Argument, Definition, Directive, DirectiveDefinition, Document, EnumTypeDefinition,
        EnumValueDefinition, Field, FieldDefinition, FragmentDefinition, FragmentSpread,
        InlineFragment, InputObjectTypeDefinition, InputValue, InputValueDefinition,
        InterfaceTypeDefinition, ListType, NamedType, NonNullType, ObjectField,
        ObjectTypeDefinition, OperationDefinition, OperationTypeDefinition, ScalarTypeDefinition,
        SchemaDefinition, Selection, SelectionSet, TypeExtensionDefinition, TypeNode,
        UnionTypeDefinition, ValueNode, VariableDefinition,
    },
    parser::{Span, Spanning},
    visitor::VisitError,
};

macro_rules! define_nodes {
    ($($variant:ident($ty:ty),)*) => {
        /// Any node of a syntax tree, as seen by a [`Visitor`].
        ///
        /// Cloning is cheap: it only bumps a reference count.
        ///
        /// [`Visitor`]: crate::visitor::Visitor
        #[expect(missing_docs, reason = "self-explanatory")]
        #[derive(Clone, Debug, PartialEq)]
        pub enum Node {
            $($variant(Arc<$ty>),)*
        }

        /// Kind of a [`Node`], without its payload.
        #[expect(missing_docs, reason = "self-explanatory")]
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum NodeKind {
            $($variant,)*
        }

        impl Node {
            /// Kind of this node.
            pub fn kind(&self) -> NodeKind {
                match self {
                    $(Self::$variant(_) => NodeKind::$variant,)*
                }
            }
        }

        $(
            impl From<Arc<$ty>> for Node {
                fn from(node: Arc<$ty>) -> Self {
                    Self::$variant(node)
                }
            }

            impl TryFrom<Node> for Arc<$ty> {
                type Error = Node;

                fn try_from(node: Node) -> Result<Self, Node> {
                    match node {
                        Node::$variant(n) => Ok(n),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

define_nodes! {
    Document(Document),
    OperationDefinition(OperationDefinition),
    VariableDefinition(VariableDefinition),
    SelectionSet(SelectionSet),
    Field(Field),
    Argument(Argument),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
    FragmentDefinition(FragmentDefinition),
    Value(ValueNode),
    ObjectField(ObjectField),
    Directive(Directive),
    NamedType(NamedType),
    ListType(ListType),
    NonNullType(NonNullType),
    SchemaDefinition(SchemaDefinition),
    OperationTypeDefinition(OperationTypeDefinition),
    ScalarTypeDefinition(ScalarTypeDefinition),
    ObjectTypeDefinition(ObjectTypeDefinition),
    FieldDefinition(FieldDefinition),
    InputValueDefinition(InputValueDefinition),
    InterfaceTypeDefinition(InterfaceTypeDefinition),
    UnionTypeDefinition(UnionTypeDefinition),
    EnumTypeDefinition(EnumTypeDefinition),
    EnumValueDefinition(EnumValueDefinition),
    InputObjectTypeDefinition(InputObjectTypeDefinition),
    TypeExtensionDefinition(TypeExtensionDefinition),
    DirectiveDefinition(DirectiveDefinition),
}

impl From<Selection> for Node {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Field(f) => Self::Field(f),
            Selection::FragmentSpread(s) => Self::FragmentSpread(s),
            Selection::InlineFragment(i) => Self::InlineFragment(i),
        }
    }
}

impl TryFrom<Node> for Selection {
    type Error = Node;

    fn try_from(node: Node) -> Result<Self, Node> {
        match node {
            Node::Field(f) => Ok(Self::Field(f)),
            Node::FragmentSpread(s) => Ok(Self::FragmentSpread(s)),
            Node::InlineFragment(i) => Ok(Self::InlineFragment(i)),
            other => Err(other),
        }
    }
}

impl From<Definition> for Node {
    fn from(definition: Definition) -> Self {
        match definition {
            Definition::Operation(d) => Self::OperationDefinition(d),
            Definition::Fragment(d) => Self::FragmentDefinition(d),
            Definition::Schema(d) => Self::SchemaDefinition(d),
            Definition::Scalar(d) => Self::ScalarTypeDefinition(d),
            Definition::Object(d) => Self::ObjectTypeDefinition(d),
            Definition::Interface(d) => Self::InterfaceTypeDefinition(d),
            Definition::Union(d) => Self::UnionTypeDefinition(d),
            Definition::Enum(d) => Self::EnumTypeDefinition(d),
            Definition::InputObject(d) => Self::InputObjectTypeDefinition(d),
            Definition::TypeExtension(d) => Self::TypeExtensionDefinition(d),
            Definition::Directive(d) => Self::DirectiveDefinition(d),
        }
    }
}

impl TryFrom<Node> for Definition {
    type Error = Node;

    fn try_from(node: Node) -> Result<Self, Node> {
        Ok(match node {
            Node::OperationDefinition(d) => Self::Operation(d),
            Node::FragmentDefinition(d) => Self::Fragment(d),
            Node::SchemaDefinition(d) => Self::Schema(d),
            Node::ScalarTypeDefinition(d) => Self::Scalar(d),
            Node::ObjectTypeDefinition(d) => Self::Object(d),
            Node::InterfaceTypeDefinition(d) => Self::Interface(d),
            Node::UnionTypeDefinition(d) => Self::Union(d),
            Node::EnumTypeDefinition(d) => Self::Enum(d),
            Node::InputObjectTypeDefinition(d) => Self::InputObject(d),
            Node::TypeExtensionDefinition(d) => Self::TypeExtension(d),
            Node::DirectiveDefinition(d) => Self::Directive(d),
            other => return Err(other),
        })
    }
}

impl From<TypeNode> for Node {
    fn from(ty: TypeNode) -> Self {
        match ty {
            TypeNode::Named(n) => Self::NamedType(n),
            TypeNode::List(l) => Self::ListType(l),
            TypeNode::NonNull(nn) => Self::NonNullType(nn),
        }
    }
}

impl TryFrom<Node> for TypeNode {
    type Error = Node;

    fn try_from(node: Node) -> Result<Self, Node> {
        match node {
            Node::NamedType(n) => Ok(Self::Named(n)),
            Node::ListType(l) => Ok(Self::List(l)),
            Node::NonNullType(nn) => Ok(Self::NonNull(nn)),
            other => Err(other),
        }
    }
}

/// Shape of a visitable child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Shape {
    /// Exactly one child, which cannot be deleted.
    One,
    /// Zero or one child.
    Maybe,
    /// Any number of children.
    Many,
}

/// A child of a node, as enumerated by [`Node::children()`].
#[derive(Clone, Debug)]
pub(crate) struct Child {
    /// Index of the slot the child belongs to.
    pub slot: usize,
    /// Position inside a [`Shape::Many`] slot.
    pub index: Option<usize>,
    pub node: Node,
}

/// Edited children of one node, handed back to [`Node::rebuild()`] in
/// slot order.
pub(crate) struct Slots {
    parent: NodeKind,
    slots: std::vec::IntoIter<(&'static str, Vec<Node>)>,
}

impl Slots {
    fn next(&mut self) -> (&'static str, Vec<Node>) {
        self.slots.next().unwrap_or(("", Vec::new()))
    }

    fn convert<T: TryFrom<Node, Error = Node>>(&self, key: &'static str, node: Node) -> Result<T, VisitError> {
        T::try_from(node).map_err(|found| VisitError::WrongKind {
            parent: self.parent,
            key,
            found: found.kind(),
        })
    }

    fn one<T: TryFrom<Node, Error = Node>>(&mut self) -> Result<T, VisitError> {
        let (key, mut nodes) = self.next();
        match nodes.pop() {
            Some(node) => self.convert(key, node),
            None => Err(VisitError::RequiredChild {
                parent: self.parent,
                key,
            }),
        }
    }

    fn maybe<T: TryFrom<Node, Error = Node>>(&mut self) -> Result<Option<T>, VisitError> {
        let (key, mut nodes) = self.next();
        nodes.pop().map(|n| self.convert(key, n)).transpose()
    }

    fn many<T: TryFrom<Node, Error = Node>>(&mut self) -> Result<Vec<T>, VisitError> {
        let (key, nodes) = self.next();
        nodes.into_iter().map(|n| self.convert(key, n)).collect()
    }
}

type SlotList = Vec<(&'static str, Shape, Vec<Node>)>;

fn one(key: &'static str, node: impl Into<Node>) -> (&'static str, Shape, Vec<Node>) {
    (key, Shape::One, vec![node.into()])
}

fn maybe<T: Clone + Into<Node>>(key: &'static str, node: &Option<T>) -> (&'static str, Shape, Vec<Node>) {
    (key, Shape::Maybe, node.iter().cloned().map(Into::into).collect())
}

fn many<T: Clone + Into<Node>>(key: &'static str, nodes: &[T]) -> (&'static str, Shape, Vec<Node>) {
    (key, Shape::Many, nodes.iter().cloned().map(Into::into).collect())
}

impl Node {
    /// Visitable child slots of this node, in visiting order: the slot key,
    /// its shape, and the nodes it holds.
    pub(crate) fn slots(&self) -> SlotList {
        match self {
            Self::Document(d) => vec![many("definitions", &d.definitions)],
            Self::OperationDefinition(op) => vec![
                many("variable_definitions", &op.variable_definitions),
                many("directives", &op.directives),
                one("selection_set", op.selection_set.clone()),
            ],
            Self::VariableDefinition(v) => vec![
                one("type", v.var_type.clone()),
                maybe("default_value", &v.default_value),
            ],
            Self::SelectionSet(s) => vec![many("selections", &s.selections)],
            Self::Field(f) => vec![
                many("arguments", &f.arguments),
                many("directives", &f.directives),
                maybe("selection_set", &f.selection_set),
            ],
            Self::Argument(a) => vec![one("value", a.value.clone())],
            Self::FragmentSpread(s) => vec![many("directives", &s.directives)],
            Self::InlineFragment(i) => vec![
                maybe("type_condition", &i.type_condition),
                many("directives", &i.directives),
                one("selection_set", i.selection_set.clone()),
            ],
            Self::FragmentDefinition(f) => vec![
                one("type_condition", f.type_condition.clone()),
                many("directives", &f.directives),
                one("selection_set", f.selection_set.clone()),
            ],
            Self::Value(v) => match &v.item {
                InputValue::List(items) => vec![many("values", items)],
                InputValue::Object(fields) => vec![many("fields", fields)],
                _ => vec![],
            },
            Self::ObjectField(f) => vec![one("value", f.value.clone())],
            Self::Directive(d) => vec![many("arguments", &d.arguments)],
            Self::NamedType(_) => vec![],
            Self::ListType(l) => vec![one("type", l.of_type.clone())],
            Self::NonNullType(nn) => vec![one("type", nn.of_type.clone())],
            Self::SchemaDefinition(s) => vec![
                many("directives", &s.directives),
                many("operation_types", &s.operation_types),
            ],
            Self::OperationTypeDefinition(o) => vec![one("type", o.type_name.clone())],
            Self::ScalarTypeDefinition(s) => vec![many("directives", &s.directives)],
            Self::ObjectTypeDefinition(o) => vec![
                many("interfaces", &o.interfaces),
                many("directives", &o.directives),
                many("fields", &o.fields),
            ],
            Self::FieldDefinition(f) => vec![
                many("arguments", &f.arguments),
                one("type", f.field_type.clone()),
                many("directives", &f.directives),
            ],
            Self::InputValueDefinition(i) => vec![
                one("type", i.value_type.clone()),
                maybe("default_value", &i.default_value),
                many("directives", &i.directives),
            ],
            Self::InterfaceTypeDefinition(i) => vec![
                many("directives", &i.directives),
                many("fields", &i.fields),
            ],
            Self::UnionTypeDefinition(u) => vec![
                many("directives", &u.directives),
                many("types", &u.types),
            ],
            Self::EnumTypeDefinition(e) => vec![
                many("directives", &e.directives),
                many("values", &e.values),
            ],
            Self::EnumValueDefinition(e) => vec![many("directives", &e.directives)],
            Self::InputObjectTypeDefinition(i) => vec![
                many("directives", &i.directives),
                many("fields", &i.fields),
            ],
            Self::TypeExtensionDefinition(t) => vec![one("definition", t.definition.clone())],
            Self::DirectiveDefinition(d) => vec![many("arguments", &d.arguments)],
        }
    }

    /// Builds a copy of this node whose children are replaced by `edited`,
    /// given in the order of [`Node::slots()`].
    pub(crate) fn rebuild(&self, edited: Vec<(&'static str, Vec<Node>)>) -> Result<Node, VisitError> {
        let mut s = Slots {
            parent: self.kind(),
            slots: edited.into_iter(),
        };

        Ok(match self {
            Self::Document(d) => Self::Document(Arc::new(Document {
                definitions: s.many()?,
                ..(**d).clone()
            })),
            Self::OperationDefinition(op) => Self::OperationDefinition(Arc::new(OperationDefinition {
                variable_definitions: s.many()?,
                directives: s.many()?,
                selection_set: s.one()?,
                ..(**op).clone()
            })),
            Self::VariableDefinition(v) => Self::VariableDefinition(Arc::new(VariableDefinition {
                var_type: s.one()?,
                default_value: s.maybe()?,
                ..(**v).clone()
            })),
            Self::SelectionSet(set) => Self::SelectionSet(Arc::new(SelectionSet {
                selections: s.many()?,
                span: set.span,
            })),
            Self::Field(f) => Self::Field(Arc::new(Field {
                arguments: s.many()?,
                directives: s.many()?,
                selection_set: s.maybe()?,
                ..(**f).clone()
            })),
            Self::Argument(a) => Self::Argument(Arc::new(Argument {
                value: s.one()?,
                ..(**a).clone()
            })),
            Self::FragmentSpread(spread) => Self::FragmentSpread(Arc::new(FragmentSpread {
                directives: s.many()?,
                ..(**spread).clone()
            })),
            Self::InlineFragment(i) => Self::InlineFragment(Arc::new(InlineFragment {
                type_condition: s.maybe()?,
                directives: s.many()?,
                selection_set: s.one()?,
                span: i.span,
            })),
            Self::FragmentDefinition(f) => Self::FragmentDefinition(Arc::new(FragmentDefinition {
                type_condition: s.one()?,
                directives: s.many()?,
                selection_set: s.one()?,
                ..(**f).clone()
            })),
            Self::Value(v) => {
                let item = match &v.item {
                    InputValue::List(_) => InputValue::List(s.many()?),
                    InputValue::Object(_) => InputValue::Object(s.many()?),
                    other => other.clone(),
                };
                Self::Value(Arc::new(Spanning::new(v.span, item)))
            }
            Self::ObjectField(f) => Self::ObjectField(Arc::new(ObjectField {
                value: s.one()?,
                ..(**f).clone()
            })),
            Self::Directive(d) => Self::Directive(Arc::new(Directive {
                arguments: s.many()?,
                ..(**d).clone()
            })),
            Self::NamedType(n) => Self::NamedType(n.clone()),
            Self::ListType(l) => Self::ListType(Arc::new(ListType {
                of_type: s.one()?,
                span: l.span,
            })),
            Self::NonNullType(nn) => {
                let of_type: TypeNode = s.one()?;
                if let TypeNode::NonNull(_) = of_type {
                    return Err(VisitError::WrongKind {
                        parent: NodeKind::NonNullType,
                        key: "type",
                        found: NodeKind::NonNullType,
                    });
                }
                Self::NonNullType(Arc::new(NonNullType {
                    of_type,
                    span: nn.span,
                }))
            }
            Self::SchemaDefinition(sd) => Self::SchemaDefinition(Arc::new(SchemaDefinition {
                directives: s.many()?,
                operation_types: s.many()?,
                span: sd.span,
            })),
            Self::OperationTypeDefinition(o) => {
                Self::OperationTypeDefinition(Arc::new(OperationTypeDefinition {
                    type_name: s.one()?,
                    ..(**o).clone()
                }))
            }
            Self::ScalarTypeDefinition(d) => {
                Self::ScalarTypeDefinition(Arc::new(ScalarTypeDefinition {
                    directives: s.many()?,
                    ..(**d).clone()
                }))
            }
            Self::ObjectTypeDefinition(o) => {
                Self::ObjectTypeDefinition(Arc::new(ObjectTypeDefinition {
                    interfaces: s.many()?,
                    directives: s.many()?,
                    fields: s.many()?,
                    ..(**o).clone()
                }))
            }
            Self::FieldDefinition(f) => Self::FieldDefinition(Arc::new(FieldDefinition {
                arguments: s.many()?,
                field_type: s.one()?,
                directives: s.many()?,
                ..(**f).clone()
            })),
            Self::InputValueDefinition(i) => {
                Self::InputValueDefinition(Arc::new(InputValueDefinition {
                    value_type: s.one()?,
                    default_value: s.maybe()?,
                    directives: s.many()?,
                    ..(**i).clone()
                }))
            }
            Self::InterfaceTypeDefinition(i) => {
                Self::InterfaceTypeDefinition(Arc::new(InterfaceTypeDefinition {
                    directives: s.many()?,
                    fields: s.many()?,
                    ..(**i).clone()
                }))
            }
            Self::UnionTypeDefinition(u) => Self::UnionTypeDefinition(Arc::new(UnionTypeDefinition {
                directives: s.many()?,
                types: s.many()?,
                ..(**u).clone()
            })),
            Self::EnumTypeDefinition(e) => Self::EnumTypeDefinition(Arc::new(EnumTypeDefinition {
                directives: s.many()?,
                values: s.many()?,
                ..(**e).clone()
            })),
            Self::EnumValueDefinition(e) => {
                Self::EnumValueDefinition(Arc::new(EnumValueDefinition {
                    directives: s.many()?,
                    ..(**e).clone()
                }))
            }
            Self::InputObjectTypeDefinition(i) => {
                Self::InputObjectTypeDefinition(Arc::new(InputObjectTypeDefinition {
                    directives: s.many()?,
                    fields: s.many()?,
                    ..(**i).clone()
                }))
            }
            Self::TypeExtensionDefinition(t) => {
                Self::TypeExtensionDefinition(Arc::new(TypeExtensionDefinition {
                    definition: s.one()?,
                    span: t.span,
                }))
            }
            Self::DirectiveDefinition(d) => {
                Self::DirectiveDefinition(Arc::new(DirectiveDefinition {
                    arguments: s.many()?,
                    ..(**d).clone()
                }))
            }
        })
    }

    /// Source range this node was parsed from.
    pub fn span(&self) -> Span {
        match self {
            Self::Document(n) => n.span,
            Self::OperationDefinition(n) => n.span,
            Self::VariableDefinition(n) => n.span,
            Self::SelectionSet(n) => n.span,
            Self::Field(n) => n.span,
            Self::Argument(n) => n.span,
            Self::FragmentSpread(n) => n.span,
            Self::InlineFragment(n) => n.span,
            Self::FragmentDefinition(n) => n.span,
            Self::Value(n) => n.span,
            Self::ObjectField(n) => n.span,
            Self::Directive(n) => n.span,
            Self::NamedType(n) => n.name.span,
            Self::ListType(n) => n.span,
            Self::NonNullType(n) => n.span,
            Self::SchemaDefinition(n) => n.span,
            Self::OperationTypeDefinition(n) => n.span,
            Self::ScalarTypeDefinition(n) => n.span,
            Self::ObjectTypeDefinition(n) => n.span,
            Self::FieldDefinition(n) => n.span,
            Self::InputValueDefinition(n) => n.span,
            Self::InterfaceTypeDefinition(n) => n.span,
            Self::UnionTypeDefinition(n) => n.span,
            Self::EnumTypeDefinition(n) => n.span,
            Self::EnumValueDefinition(n) => n.span,
            Self::InputObjectTypeDefinition(n) => n.span,
            Self::TypeExtensionDefinition(n) => n.span,
            Self::DirectiveDefinition(n) => n.span,
        }
    }
}
