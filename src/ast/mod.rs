//! Syntax tree of GraphQL documents.
//!
//! Nodes are immutable once built. Children are held in [`Arc`]s, so editing
//! a tree (see [`crate::visitor`]) rebuilds only the path from the root to the
//! edited node and shares every other subtree with the original.

pub(crate) mod node;
mod printer;

use std::{fmt, sync::Arc};

use arcstr::ArcStr;

use crate::parser::{Span, Spanning};

pub use self::node::{Node, NodeKind};

/// A type literal as understood by the schema.
///
/// This enum carries no semantic information and might refer to types that do
/// not exist. A non-null type never wraps another non-null type, which the
/// variants make unrepresentable.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    /// A nullable named type, e.g. `String`
    Named(ArcStr),
    /// A nullable list type, e.g. `[String]`
    ///
    /// The list itself is what's nullable, the containing type might be non-null.
    List(Box<Type>),
    /// A non-null named type, e.g. `String!`
    NonNullNamed(ArcStr),
    /// A non-null list type, e.g. `[String]!`.
    ///
    /// The list itself is what's non-null, the containing type might be null.
    NonNullList(Box<Type>),
}

impl Type {
    /// Nullable named type.
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self::Named(name.into())
    }

    /// Non-null named type.
    pub fn non_null_named(name: impl Into<ArcStr>) -> Self {
        Self::NonNullNamed(name.into())
    }

    /// Nullable list of `of`.
    pub fn list(of: Type) -> Self {
        Self::List(Box::new(of))
    }

    /// Non-null list of `of`.
    pub fn non_null_list(of: Type) -> Self {
        Self::NonNullList(Box::new(of))
    }

    /// Get the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&ArcStr> {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Some(n),
            Self::List(..) | Self::NonNullList(..) => None,
        }
    }

    /// Get the innermost name by unpacking lists
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &ArcStr {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(..) | Self::NonNullList(..))
    }

    /// Determines if this type is a list, nullable or not.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(..) | Self::NonNullList(..))
    }

    /// The item type of a list type.
    pub fn list_contents(&self) -> Option<&Type> {
        match self {
            Self::List(l) | Self::NonNullList(l) => Some(l),
            Self::Named(..) | Self::NonNullNamed(..) => None,
        }
    }

    /// Strips the outermost non-null marker.
    pub fn nullable(&self) -> Type {
        match self {
            Self::NonNullNamed(n) => Self::Named(n.clone()),
            Self::NonNullList(l) => Self::List(l.clone()),
            t => t.clone(),
        }
    }

    /// Adds a non-null marker, if not present yet.
    pub fn non_null(&self) -> Type {
        match self {
            Self::Named(n) => Self::NonNullNamed(n.clone()),
            Self::List(l) => Self::NonNullList(l.clone()),
            t => t.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// Source text a [`Document`] was parsed from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    /// Full text.
    pub body: String,
    /// Name reported in errors, `GraphQL` unless set otherwise.
    pub name: String,
}

impl Source {
    /// Wraps a query text with the default name.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            name: "GraphQL".into(),
        }
    }
}

/// Root of a parsed GraphQL text.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub definitions: Vec<Definition>,
    pub span: Span,
    /// Source the document was parsed from, unless parsed with `no_source`.
    pub source: Option<Arc<Source>>,
}

impl Document {
    /// Operations defined in this document, in source order.
    pub fn operations(&self) -> impl Iterator<Item = &Arc<OperationDefinition>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            _ => None,
        })
    }

    /// Fragments defined in this document, in source order.
    pub fn fragments(&self) -> impl Iterator<Item = &Arc<FragmentDefinition>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Fragment(f) => Some(f),
            _ => None,
        })
    }
}

/// Top-level definition of a [`Document`].
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Operation(Arc<OperationDefinition>),
    Fragment(Arc<FragmentDefinition>),
    Schema(Arc<SchemaDefinition>),
    Scalar(Arc<ScalarTypeDefinition>),
    Object(Arc<ObjectTypeDefinition>),
    Interface(Arc<InterfaceTypeDefinition>),
    Union(Arc<UnionTypeDefinition>),
    Enum(Arc<EnumTypeDefinition>),
    InputObject(Arc<InputObjectTypeDefinition>),
    TypeExtension(Arc<TypeExtensionDefinition>),
    Directive(Arc<DirectiveDefinition>),
}

#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationDefinition {
    pub operation: OperationType,
    pub name: Option<Spanning<ArcStr>>,
    pub variable_definitions: Vec<Arc<VariableDefinition>>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Arc<SelectionSet>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    /// Variable name, without the `$`.
    pub variable: Spanning<ArcStr>,
    pub var_type: TypeNode,
    pub default_value: Option<Arc<ValueNode>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
    pub span: Span,
}

/// Entry in a GraphQL selection set
///
/// This enum represents one of the three variants of a selection that exists
/// in GraphQL: a field, a fragment spread, or an inline fragment.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(Arc<Field>),
    FragmentSpread(Arc<FragmentSpread>),
    InlineFragment(Arc<InlineFragment>),
}

impl Selection {
    /// Directives attached to this selection.
    pub fn directives(&self) -> &[Arc<Directive>] {
        match self {
            Self::Field(f) => &f.directives,
            Self::FragmentSpread(s) => &s.directives,
            Self::InlineFragment(i) => &i.directives,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub alias: Option<Spanning<ArcStr>>,
    pub name: Spanning<ArcStr>,
    pub arguments: Vec<Arc<Argument>>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Option<Arc<SelectionSet>>,
    pub span: Span,
}

impl Field {
    /// Key under which this field appears in a response: its alias, or its name.
    pub fn response_name(&self) -> &ArcStr {
        self.alias.as_ref().map_or(&self.name.item, |a| &a.item)
    }

    /// Looks up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Arc<Argument>> {
        self.arguments.iter().find(|a| a.name.item == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: Spanning<ArcStr>,
    pub value: Arc<ValueNode>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<Arc<NamedType>>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Arc<SelectionSet>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentDefinition {
    pub name: Spanning<ArcStr>,
    pub type_condition: Arc<NamedType>,
    pub directives: Vec<Arc<Directive>>,
    pub selection_set: Arc<SelectionSet>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub name: Spanning<ArcStr>,
    pub arguments: Vec<Arc<Argument>>,
    pub span: Span,
}

impl Directive {
    /// Looks up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Arc<Argument>> {
        self.arguments.iter().find(|a| a.name.item == name)
    }
}

/// A literal value in the syntax tree, with its location.
pub type ValueNode = Spanning<InputValue>;

/// A JSON-like literal written in a document, either as an argument, a
/// default value, or inside other literals.
///
/// Numbers keep their source text; they are coerced against the expected
/// input type during validation and execution.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Null,
    Int(ArcStr),
    Float(ArcStr),
    String(String),
    Boolean(bool),
    Enum(ArcStr),
    /// Variable reference, without the `$`.
    Variable(ArcStr),
    List(Vec<Arc<ValueNode>>),
    Object(Vec<Arc<ObjectField>>),
}

impl InputValue {
    /// Whether this literal is a variable reference.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Names of all variables referenced by this literal, recursively.
    pub fn referenced_variables(&self) -> Vec<&ArcStr> {
        match self {
            Self::Variable(name) => vec![name],
            Self::List(items) => items
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(fields) => fields
                .iter()
                .flat_map(|f| f.value.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }

    /// Structural equality ignoring source locations.
    pub fn unlocated_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(l1), Self::List(l2)) => {
                l1.len() == l2.len()
                    && l1.iter().zip(l2).all(|(a, b)| a.item.unlocated_eq(&b.item))
            }
            (Self::Object(o1), Self::Object(o2)) => {
                o1.len() == o2.len()
                    && o1.iter().all(|f1| {
                        o2.iter().any(|f2| {
                            f1.name.item == f2.name.item && f1.value.item.unlocated_eq(&f2.value.item)
                        })
                    })
            }
            (a, b) => a == b,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectField {
    pub name: Spanning<ArcStr>,
    pub value: Arc<ValueNode>,
    pub span: Span,
}

/// A type reference written in a document.
#[expect(missing_docs, reason = "self-explanatory")]
#[derive(Clone, Debug, PartialEq)]
pub enum TypeNode {
    Named(Arc<NamedType>),
    List(Arc<ListType>),
    NonNull(Arc<NonNullType>),
}

impl TypeNode {
    /// Converts into the location-free [`Type`] literal.
    pub fn to_type(&self) -> Type {
        match self {
            Self::Named(n) => Type::Named(n.name.item.clone()),
            Self::List(l) => Type::list(l.of_type.to_type()),
            Self::NonNull(nn) => nn.of_type.to_type().non_null(),
        }
    }

    /// Location of this type reference.
    pub fn span(&self) -> Span {
        match self {
            Self::Named(n) => n.name.span,
            Self::List(l) => l.span,
            Self::NonNull(nn) => nn.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedType {
    pub name: Spanning<ArcStr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListType {
    pub of_type: TypeNode,
    pub span: Span,
}

/// Non-null wrapper. Its `of_type` is never itself a [`TypeNode::NonNull`].
#[derive(Clone, Debug, PartialEq)]
pub struct NonNullType {
    pub of_type: TypeNode,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDefinition {
    pub directives: Vec<Arc<Directive>>,
    pub operation_types: Vec<Arc<OperationTypeDefinition>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationTypeDefinition {
    pub operation: OperationType,
    pub type_name: Arc<NamedType>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarTypeDefinition {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTypeDefinition {
    pub name: Spanning<ArcStr>,
    pub interfaces: Vec<Arc<NamedType>>,
    pub directives: Vec<Arc<Directive>>,
    pub fields: Vec<Arc<FieldDefinition>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub name: Spanning<ArcStr>,
    pub arguments: Vec<Arc<InputValueDefinition>>,
    pub field_type: TypeNode,
    pub directives: Vec<Arc<Directive>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputValueDefinition {
    pub name: Spanning<ArcStr>,
    pub value_type: TypeNode,
    pub default_value: Option<Arc<ValueNode>>,
    pub directives: Vec<Arc<Directive>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceTypeDefinition {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub fields: Vec<Arc<FieldDefinition>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionTypeDefinition {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub types: Vec<Arc<NamedType>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumTypeDefinition {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub values: Vec<Arc<EnumValueDefinition>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumValueDefinition {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectTypeDefinition {
    pub name: Spanning<ArcStr>,
    pub directives: Vec<Arc<Directive>>,
    pub fields: Vec<Arc<InputValueDefinition>>,
    pub span: Span,
}

/// `extend type ...`
#[derive(Clone, Debug, PartialEq)]
pub struct TypeExtensionDefinition {
    pub definition: Arc<ObjectTypeDefinition>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveDefinition {
    pub name: Spanning<ArcStr>,
    pub arguments: Vec<Arc<InputValueDefinition>>,
    pub locations: Vec<Spanning<ArcStr>>,
    pub span: Span,
}
