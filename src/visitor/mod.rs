//! Generic walk over syntax trees, with editing.
//!
//! [`visit()`] walks a tree depth-first, calling [`Visitor::enter()`] when
//! arriving at a node and [`Visitor::leave()`] once all of its children are
//! done. Each call answers with a [`VisitAction`] which may skip a subtree,
//! stop the walk or edit the tree. Edits produce a new tree that shares
//! every untouched subtree with the original one.

mod parallel;
pub mod type_info;

use std::sync::Arc;

use derive_more::with_trait::{Display, Error};

use crate::ast::{
    Argument, Directive, DirectiveDefinition, Document, EnumTypeDefinition, EnumValueDefinition,
    Field, FieldDefinition, FragmentDefinition, FragmentSpread, InlineFragment,
    InputObjectTypeDefinition, InputValueDefinition, InterfaceTypeDefinition, ListType, NamedType,
    Node, NodeKind, NonNullType, ObjectField, ObjectTypeDefinition, OperationDefinition,
    OperationTypeDefinition, ScalarTypeDefinition, SchemaDefinition, SelectionSet,
    TypeExtensionDefinition, UnionTypeDefinition, ValueNode, VariableDefinition,
    node::{Child, Shape},
};

pub use self::{
    parallel::ParallelVisitor,
    type_info::{HasTypeInfo, TypeInfo, TypeInfoVisitor},
};

/// What a [`Visitor`] wants done with the node it was just given.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum VisitAction {
    /// Carry on normally.
    #[default]
    Continue,
    /// On enter, do not descend into this node, and do not call `leave` for
    /// it. No-op on leave.
    Skip,
    /// Abort the walk. Edits made so far are kept.
    Stop,
    /// Substitute the node. When entering, the walk continues into the
    /// replacement's children.
    Replace(Node),
    /// Remove the node from its parent. When entering, the subtree is
    /// skipped.
    Delete,
}

/// Key under which a node sits in its parent.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum PathKey {
    /// Name of the parent's slot, e.g. `selection_set`.
    Name(&'static str),
    /// Position inside a list slot.
    Index(usize),
}

/// Where the node handed to a [`Visitor`] lives.
#[derive(Clone, Copy, Debug)]
pub struct VisitInfo<'a> {
    /// Keys leading from the root to the node. Empty for the root.
    pub path: &'a [PathKey],
    /// Nodes from the root down to the node's parent, inclusive.
    pub ancestors: &'a [Node],
}

impl VisitInfo<'_> {
    /// Key under which the node sits in its parent.
    pub fn key(&self) -> Option<PathKey> {
        self.path.last().copied()
    }

    /// Parent of the node, if it is not the root.
    pub fn parent(&self) -> Option<&Node> {
        self.ancestors.last()
    }
}

/// Failure to apply an edit requested by a [`Visitor`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum VisitError {
    /// A required child was deleted.
    #[display("cannot delete required child `{key}` of `{parent:?}` node")]
    RequiredChild {
        /// Kind of the parent node.
        parent: NodeKind,
        /// Slot of the parent the child was deleted from.
        key: &'static str,
    },

    /// A child was replaced with a node that cannot live in its slot.
    #[display("`{found:?}` node cannot be the `{key}` of a `{parent:?}` node")]
    WrongKind {
        /// Kind of the parent node.
        parent: NodeKind,
        /// Slot of the parent.
        key: &'static str,
        /// Kind of the offending replacement.
        found: NodeKind,
    },
}

macro_rules! visitor_trait {
    ($($variant:ident($ty:ty) => $enter:ident, $leave:ident;)*) => {
        /// Callbacks of a walk over a syntax tree, with a context of type `C`
        /// threaded through.
        ///
        /// The provided [`Visitor::enter()`] and [`Visitor::leave()`] dispatch
        /// to one method per node kind, each doing nothing by default.
        /// Implementors override the per-kind methods they care about, or
        /// `enter`/`leave` themselves to see every node.
        pub trait Visitor<C = ()> {
            /// Called when arriving at a node, before its children.
            fn enter(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
                match node {
                    $(Node::$variant(n) => self.$enter(cx, n, info),)*
                }
            }

            /// Called after all children of a node were visited.
            fn leave(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
                match node {
                    $(Node::$variant(n) => self.$leave(cx, n, info),)*
                }
            }

            $(
                #[doc = concat!("Called when entering a [`", stringify!($ty), "`].")]
                fn $enter(&mut self, _: &mut C, _: &Arc<$ty>, _: &VisitInfo<'_>) -> VisitAction {
                    VisitAction::Continue
                }

                #[doc = concat!("Called when leaving a [`", stringify!($ty), "`].")]
                fn $leave(&mut self, _: &mut C, _: &Arc<$ty>, _: &VisitInfo<'_>) -> VisitAction {
                    VisitAction::Continue
                }
            )*
        }
    };
}

visitor_trait! {
    Document(Document) => enter_document, leave_document;
    OperationDefinition(OperationDefinition) => enter_operation_definition, leave_operation_definition;
    VariableDefinition(VariableDefinition) => enter_variable_definition, leave_variable_definition;
    SelectionSet(SelectionSet) => enter_selection_set, leave_selection_set;
    Field(Field) => enter_field, leave_field;
    Argument(Argument) => enter_argument, leave_argument;
    FragmentSpread(FragmentSpread) => enter_fragment_spread, leave_fragment_spread;
    InlineFragment(InlineFragment) => enter_inline_fragment, leave_inline_fragment;
    FragmentDefinition(FragmentDefinition) => enter_fragment_definition, leave_fragment_definition;
    Value(ValueNode) => enter_value, leave_value;
    ObjectField(ObjectField) => enter_object_field, leave_object_field;
    Directive(Directive) => enter_directive, leave_directive;
    NamedType(NamedType) => enter_named_type, leave_named_type;
    ListType(ListType) => enter_list_type, leave_list_type;
    NonNullType(NonNullType) => enter_non_null_type, leave_non_null_type;
    SchemaDefinition(SchemaDefinition) => enter_schema_definition, leave_schema_definition;
    OperationTypeDefinition(OperationTypeDefinition) => enter_operation_type_definition, leave_operation_type_definition;
    ScalarTypeDefinition(ScalarTypeDefinition) => enter_scalar_type_definition, leave_scalar_type_definition;
    ObjectTypeDefinition(ObjectTypeDefinition) => enter_object_type_definition, leave_object_type_definition;
    FieldDefinition(FieldDefinition) => enter_field_definition, leave_field_definition;
    InputValueDefinition(InputValueDefinition) => enter_input_value_definition, leave_input_value_definition;
    InterfaceTypeDefinition(InterfaceTypeDefinition) => enter_interface_type_definition, leave_interface_type_definition;
    UnionTypeDefinition(UnionTypeDefinition) => enter_union_type_definition, leave_union_type_definition;
    EnumTypeDefinition(EnumTypeDefinition) => enter_enum_type_definition, leave_enum_type_definition;
    EnumValueDefinition(EnumValueDefinition) => enter_enum_value_definition, leave_enum_value_definition;
    InputObjectTypeDefinition(InputObjectTypeDefinition) => enter_input_object_type_definition, leave_input_object_type_definition;
    TypeExtensionDefinition(TypeExtensionDefinition) => enter_type_extension_definition, leave_type_extension_definition;
    DirectiveDefinition(DirectiveDefinition) => enter_directive_definition, leave_directive_definition;
}

impl<C, V: Visitor<C> + ?Sized> Visitor<C> for Box<V> {
    fn enter(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        (**self).enter(cx, node, info)
    }

    fn leave(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        (**self).leave(cx, node, info)
    }
}

impl<C, V: Visitor<C> + ?Sized> Visitor<C> for &mut V {
    fn enter(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        (**self).enter(cx, node, info)
    }

    fn leave(&mut self, cx: &mut C, node: &Node, info: &VisitInfo<'_>) -> VisitAction {
        (**self).leave(cx, node, info)
    }
}

/// A node whose children are being walked.
struct Frame {
    node: Node,
    /// Whether `node` is not the one found in the parent.
    replaced: bool,
    /// Length of the walker path once this node's keys are pushed.
    path_len: usize,
    children: Vec<Child>,
    next: usize,
    /// Children as they are after visiting, per slot.
    results: Vec<(&'static str, Vec<Node>)>,
    dirty: bool,
}

struct Walker {
    stack: Vec<Frame>,
    path: Vec<PathKey>,
    ancestors: Vec<Node>,
    root: Option<Node>,
}

impl Walker {
    fn info(&self) -> VisitInfo<'_> {
        VisitInfo {
            path: &self.path,
            ancestors: &self.ancestors,
        }
    }

    fn push(&mut self, node: Node, replaced: bool) {
        let mut children = Vec::new();
        let mut results = Vec::new();
        for (slot, (key, shape, nodes)) in node.slots().into_iter().enumerate() {
            results.push((key, Vec::with_capacity(nodes.len())));
            children.extend(nodes.into_iter().enumerate().map(|(i, node)| Child {
                slot,
                index: (shape == Shape::Many).then_some(i),
                node,
            }));
        }

        self.ancestors.push(node.clone());
        self.stack.push(Frame {
            node,
            replaced,
            path_len: self.path.len(),
            children,
            next: 0,
            results,
            dirty: false,
        });
    }

    /// Takes the next unvisited child of the current node, pushing its keys
    /// onto the path.
    fn next_child(&mut self) -> Option<Node> {
        let frame = self.stack.last_mut()?;
        let child = frame.children.get(frame.next)?.clone();
        frame.next += 1;

        self.path.push(PathKey::Name(frame.results[child.slot].0));
        if let Some(i) = child.index {
            self.path.push(PathKey::Index(i));
        }
        Some(child.node)
    }

    /// Pops the current node, rebuilding it if any of its children changed.
    ///
    /// Children not visited yet are kept as they are.
    fn pop(&mut self) -> Result<Option<(Node, bool)>, VisitError> {
        let Some(mut frame) = self.stack.pop() else {
            return Ok(None);
        };
        self.ancestors.pop();

        if !frame.dirty {
            return Ok(Some((frame.node, frame.replaced)));
        }
        for child in frame.children.drain(frame.next..) {
            frame.results[child.slot].1.push(child.node);
        }
        Ok(Some((frame.node.rebuild(frame.results)?, true)))
    }

    /// Hands the outcome of visiting a node over to its parent.
    fn deliver(&mut self, node: Option<Node>, changed: bool) {
        let Some(parent) = self.stack.last_mut() else {
            self.root = node;
            return;
        };
        self.path.truncate(parent.path_len);

        if let Some(node) = node {
            let slot = parent.children[parent.next - 1].slot;
            parent.results[slot].1.push(node);
        }
        if changed {
            parent.dirty = true;
        }
    }

    /// Applies pending edits all the way up, without calling `leave`.
    fn unwind(mut self) -> Result<Option<Node>, VisitError> {
        while let Some((node, changed)) = self.pop()? {
            self.deliver(Some(node), changed);
        }
        Ok(self.root)
    }
}

/// Walks the tree rooted at `root` depth-first, calling `visitor` on every
/// node.
///
/// Returns the edited tree, which is `root` itself when nothing was edited,
/// or [`None`] if the root was deleted.
///
/// # Errors
///
/// Fails if an edit would produce an invalid tree: deleting a required
/// child, or replacing a child with a node of a kind its parent cannot hold.
pub fn visit<C, V>(root: Node, visitor: &mut V, cx: &mut C) -> Result<Option<Node>, VisitError>
where
    V: Visitor<C> + ?Sized,
{
    let mut walker = Walker {
        stack: Vec::new(),
        path: Vec::new(),
        ancestors: Vec::new(),
        root: None,
    };
    let mut entering = Some(root);

    loop {
        if let Some(node) = entering.take() {
            let action = visitor.enter(cx, &node, &walker.info());
            match action {
                VisitAction::Continue => walker.push(node, false),
                VisitAction::Replace(new) => walker.push(new, true),
                VisitAction::Skip => walker.deliver(Some(node), false),
                VisitAction::Delete => walker.deliver(None, true),
                VisitAction::Stop => {
                    walker.deliver(Some(node), false);
                    return walker.unwind();
                }
            }
        }

        if walker.stack.is_empty() {
            return Ok(walker.root);
        }

        if let Some(child) = walker.next_child() {
            entering = Some(child);
            continue;
        }

        let Some((node, changed)) = walker.pop()? else {
            return Ok(walker.root);
        };
        let action = visitor.leave(cx, &node, &walker.info());
        match action {
            VisitAction::Continue | VisitAction::Skip => walker.deliver(Some(node), changed),
            VisitAction::Replace(new) => walker.deliver(Some(new), true),
            VisitAction::Delete => walker.deliver(None, true),
            VisitAction::Stop => {
                walker.deliver(Some(node), changed);
                return walker.unwind();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::{visit, PathKey, VisitAction, VisitError, VisitInfo, Visitor};
    use crate::{
        ast::{Document, Field, Node, NodeKind, ValueNode, InputValue},
        parser::{parse_document, ParseOptions, Spanning},
    };

    fn parse(s: &str) -> Node {
        Node::Document(Arc::new(
            parse_document(s, ParseOptions::pure()).expect("parse failed"),
        ))
    }

    fn print(node: Option<Node>) -> String {
        node.map(|n| n.to_string()).unwrap_or_default()
    }

    /// Records `enter`/`leave` calls.
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl Recorder {
        fn record(&mut self, what: &str, node: &Node) {
            let label = match node {
                Node::Field(f) => format!("{what} Field {}", f.name.item),
                Node::NamedType(n) => format!("{what} NamedType {}", n.name.item),
                n => format!("{what} {:?}", n.kind()),
            };
            self.0.push(label);
        }
    }

    impl Visitor for Recorder {
        fn enter(&mut self, _: &mut (), node: &Node, _: &VisitInfo<'_>) -> VisitAction {
            self.record("enter", node);
            VisitAction::Continue
        }

        fn leave(&mut self, _: &mut (), node: &Node, _: &VisitInfo<'_>) -> VisitAction {
            self.record("leave", node);
            VisitAction::Continue
        }
    }

    #[test]
    fn visits_in_document_order() {
        let mut rec = Recorder::default();
        let res = visit(parse("{ a(x: 1) { b } }"), &mut rec, &mut ()).expect("visit failed");

        assert_eq!(
            rec.0,
            [
                "enter Document",
                "enter OperationDefinition",
                "enter SelectionSet",
                "enter Field a",
                "enter Argument",
                "enter Value",
                "leave Value",
                "leave Argument",
                "enter SelectionSet",
                "enter Field b",
                "leave Field b",
                "leave SelectionSet",
                "leave Field a",
                "leave SelectionSet",
                "leave OperationDefinition",
                "leave Document",
            ],
        );
        assert_eq!(res, Some(parse("{ a(x: 1) { b } }")));
    }

    #[test]
    fn unedited_tree_is_shared() {
        let root = parse("{ a { b } }");
        let res = visit(root.clone(), &mut Recorder::default(), &mut ()).expect("visit failed");

        let (Node::Document(before), Some(Node::Document(after))) = (root, res) else {
            panic!("expected documents");
        };
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn reports_path_and_parent() {
        struct Paths(Vec<(String, Option<NodeKind>)>);

        impl Visitor for Paths {
            fn enter_field(&mut self, _: &mut (), _: &Arc<Field>, info: &VisitInfo<'_>) -> VisitAction {
                let path = info.path.iter().map(ToString::to_string).collect::<Vec<_>>();
                self.0.push((path.join("."), info.parent().map(Node::kind)));
                VisitAction::Continue
            }
        }

        let mut paths = Paths(vec![]);
        visit(parse("{ a b { c } }"), &mut paths, &mut ()).expect("visit failed");

        assert_eq!(
            paths.0,
            [
                (
                    "definitions.0.selection_set.selections.0".to_owned(),
                    Some(NodeKind::SelectionSet),
                ),
                (
                    "definitions.0.selection_set.selections.1".to_owned(),
                    Some(NodeKind::SelectionSet),
                ),
                (
                    "definitions.0.selection_set.selections.1.selection_set.selections.0".to_owned(),
                    Some(NodeKind::SelectionSet),
                ),
            ],
        );
        assert_eq!(PathKey::Index(3).to_string(), "3");
    }

    #[test]
    fn skip_does_not_descend_or_leave() {
        struct SkipA(Vec<String>);

        impl Visitor for SkipA {
            fn enter_field(&mut self, _: &mut (), f: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                self.0.push(format!("enter {}", f.name.item));
                if f.name.item == "a" {
                    VisitAction::Skip
                } else {
                    VisitAction::Continue
                }
            }

            fn leave_field(&mut self, _: &mut (), f: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                self.0.push(format!("leave {}", f.name.item));
                VisitAction::Continue
            }
        }

        let mut v = SkipA(vec![]);
        visit(parse("{ a { x } b }"), &mut v, &mut ()).expect("visit failed");

        assert_eq!(v.0, ["enter a", "enter b", "leave b"]);
    }

    #[test]
    fn stop_aborts_but_keeps_edits() {
        struct RenameThenStop(Vec<String>);

        impl Visitor for RenameThenStop {
            fn enter_field(&mut self, _: &mut (), f: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                self.0.push(f.name.item.to_string());
                match f.name.item.as_str() {
                    "a" => VisitAction::Replace(Node::Field(Arc::new(Field {
                        name: Spanning::unlocated("renamed".into()),
                        ..(**f).clone()
                    }))),
                    "b" => VisitAction::Stop,
                    _ => VisitAction::Continue,
                }
            }
        }

        let mut v = RenameThenStop(vec![]);
        let res = visit(parse("{ a b c }"), &mut v, &mut ()).expect("visit failed");

        assert_eq!(v.0, ["a", "b"]);
        assert_eq!(print(res), "{\n  renamed\n  b\n  c\n}\n");
    }

    #[test]
    fn replace_on_enter_descends_into_replacement() {
        struct Replacer {
            entered: Vec<String>,
        }

        impl Visitor for Replacer {
            fn enter_field(&mut self, _: &mut (), f: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                self.entered.push(f.name.item.to_string());
                if f.name.item == "a" {
                    let Node::Document(doc) = parse("{ z { y } }") else {
                        unreachable!();
                    };
                    let op = doc.operations().next().cloned().expect("no operation");
                    VisitAction::Replace(op.selection_set.selections[0].clone().into())
                } else {
                    VisitAction::Continue
                }
            }
        }

        let mut v = Replacer { entered: vec![] };
        let res = visit(parse("{ a { b } }"), &mut v, &mut ()).expect("visit failed");

        assert_eq!(v.entered, ["a", "y"]);
        assert_eq!(print(res), "{\n  z {\n    y\n  }\n}\n");
    }

    #[test]
    fn delete_removes_from_lists_and_optional_slots() {
        struct DeleteB;

        impl Visitor for DeleteB {
            fn leave_field(&mut self, _: &mut (), f: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                if f.name.item == "b" {
                    VisitAction::Delete
                } else {
                    VisitAction::Continue
                }
            }

            fn enter_value(&mut self, _: &mut (), v: &Arc<ValueNode>, _: &VisitInfo<'_>) -> VisitAction {
                if v.item == InputValue::Int("2".into()) {
                    VisitAction::Delete
                } else {
                    VisitAction::Continue
                }
            }
        }

        let res = visit(parse("{ a(l: [1, 2, 3]) b c }"), &mut DeleteB, &mut ()).expect("visit failed");
        assert_eq!(print(res), "{\n  a(l: [1, 3])\n  c\n}\n");
    }

    #[test]
    fn deleting_required_child_fails() {
        struct DeleteSelectionSets;

        impl Visitor for DeleteSelectionSets {
            fn enter(&mut self, _: &mut (), node: &Node, _: &VisitInfo<'_>) -> VisitAction {
                match node {
                    Node::SelectionSet(_) => VisitAction::Delete,
                    _ => VisitAction::Continue,
                }
            }
        }

        assert_eq!(
            visit(parse("{ a }"), &mut DeleteSelectionSets, &mut ()),
            Err(VisitError::RequiredChild {
                parent: NodeKind::OperationDefinition,
                key: "selection_set",
            }),
        );
    }

    #[test]
    fn replacing_with_wrong_kind_fails() {
        struct FieldToDocument;

        impl Visitor for FieldToDocument {
            fn enter_field(&mut self, _: &mut (), _: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                VisitAction::Replace(Node::Document(Arc::new(Document {
                    definitions: vec![],
                    span: crate::parser::Span::unlocated(),
                    source: None,
                })))
            }
        }

        assert_eq!(
            visit(parse("{ a }"), &mut FieldToDocument, &mut ()),
            Err(VisitError::WrongKind {
                parent: NodeKind::SelectionSet,
                key: "selections",
                found: NodeKind::Document,
            }),
        );
    }

    #[test]
    fn deleting_the_root_yields_nothing() {
        struct DeleteAll;

        impl Visitor for DeleteAll {
            fn enter(&mut self, _: &mut (), _: &Node, _: &VisitInfo<'_>) -> VisitAction {
                VisitAction::Delete
            }
        }

        assert_eq!(visit(parse("{ a }"), &mut DeleteAll, &mut ()), Ok(None));
    }

    #[test]
    fn context_is_threaded_through() {
        struct CountFields;

        impl Visitor<usize> for CountFields {
            fn enter_field(&mut self, cx: &mut usize, _: &Arc<Field>, _: &VisitInfo<'_>) -> VisitAction {
                *cx += 1;
                VisitAction::Continue
            }
        }

        let mut count = 0;
        visit(parse("{ a { b c } ...F } fragment F on T { d }"), &mut CountFields, &mut count)
            .expect("visit failed");
        assert_eq!(count, 4);
    }
}
