//! Index arena implementing [`FormatWriter`] for backends whose native tree
//! owns its children by value.
//!
//! Nodes are recorded flat while the engine walks the value and linked by
//! index; [`TreeWriter::finish`] then assembles them bottom-up into the
//! backend's own node type.

use crate::{FormatWriter, ScalarValue};

/// Index of a node in a [`TreeWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An open array. Not `Copy`: closing consumes it.
#[derive(Debug)]
pub struct ArrayHandle(NodeId);

/// An open object. Not `Copy`: closing consumes it.
#[derive(Debug)]
pub struct ObjectHandle(NodeId);

#[derive(Debug)]
enum Slot<S> {
    Null,
    Leaf(S),
    Array {
        items: Vec<NodeId>,
        open: bool,
    },
    Object {
        entries: Vec<(String, NodeId)>,
        open: bool,
    },
}

/// One node handed to the assembly callback, children already assembled.
#[derive(Debug)]
pub enum Built<N, S> {
    /// A null node.
    Null,
    /// A leaf produced by the writer's leaf constructor.
    Leaf(S),
    /// An array of finished children.
    Array(Vec<N>),
    /// An object of finished children, in insertion order.
    Object(Vec<(String, N)>),
}

/// Arena-backed [`FormatWriter`] producing leaves of type `S`.
pub struct TreeWriter<S> {
    slots: Vec<Slot<S>>,
    root: Option<NodeId>,
    leaf: fn(ScalarValue<'_>) -> S,
}

impl<S> TreeWriter<S> {
    /// Create an empty writer converting scalars with `leaf`.
    pub fn new(leaf: fn(ScalarValue<'_>) -> S) -> Self {
        TreeWriter {
            slots: Vec::new(),
            root: None,
            leaf,
        }
    }

    /// Assemble the recorded nodes into the backend's tree.
    ///
    /// `build` is called once per node, children before parents. A writer
    /// that never received a root assembles to a single null.
    pub fn finish<N>(self, mut build: impl FnMut(Built<N, S>) -> N) -> N {
        let TreeWriter { slots, root, .. } = self;
        let mut slots: Vec<Option<Slot<S>>> = slots.into_iter().map(Some).collect();
        match root {
            Some(root) => assemble(&mut slots, root, &mut build),
            None => build(Built::Null),
        }
    }

    fn push(&mut self, slot: Slot<S>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(slot);
        id
    }

    fn set_root(&mut self, slot: Slot<S>) -> NodeId {
        debug_assert!(self.root.is_none(), "root written twice");
        let id = self.push(slot);
        self.root = Some(id);
        id
    }

    fn push_item(&mut self, parent: &ArrayHandle, slot: Slot<S>) -> NodeId {
        let id = self.push(slot);
        match &mut self.slots[parent.0.0] {
            Slot::Array { items, open } => {
                debug_assert!(*open, "item added to a closed array");
                items.push(id);
            }
            _ => unreachable!("array handle points at a non-array node"),
        }
        id
    }

    fn push_entry(&mut self, parent: &ObjectHandle, name: &str, slot: Slot<S>) -> NodeId {
        let id = self.push(slot);
        match &mut self.slots[parent.0.0] {
            Slot::Object { entries, open } => {
                debug_assert!(*open, "entry added to a closed object");
                entries.push((name.to_owned(), id));
            }
            _ => unreachable!("object handle points at a non-object node"),
        }
        id
    }

    fn is_open(&self, id: NodeId) -> bool {
        matches!(
            self.slots[id.0],
            Slot::Array { open: true, .. } | Slot::Object { open: true, .. }
        )
    }

    fn children_closed(&self, id: NodeId) -> bool {
        match &self.slots[id.0] {
            Slot::Array { items, .. } => items.iter().all(|c| !self.is_open(*c)),
            Slot::Object { entries, .. } => entries.iter().all(|(_, c)| !self.is_open(*c)),
            _ => true,
        }
    }

    fn close(&mut self, id: NodeId) {
        debug_assert!(self.children_closed(id), "container closed before its children");
        if let Slot::Array { open, .. } | Slot::Object { open, .. } = &mut self.slots[id.0] {
            debug_assert!(*open, "container closed twice");
            *open = false;
        }
    }

    fn array_slot(size: usize) -> Slot<S> {
        Slot::Array {
            items: Vec::with_capacity(size),
            open: true,
        }
    }

    fn object_slot(size: usize) -> Slot<S> {
        Slot::Object {
            entries: Vec::with_capacity(size),
            open: true,
        }
    }
}

fn assemble<N, S>(
    slots: &mut [Option<Slot<S>>],
    id: NodeId,
    build: &mut impl FnMut(Built<N, S>) -> N,
) -> N {
    match slots[id.0].take() {
        None | Some(Slot::Null) => build(Built::Null),
        Some(Slot::Leaf(leaf)) => build(Built::Leaf(leaf)),
        Some(Slot::Array { items, .. }) => {
            let items = items
                .into_iter()
                .map(|child| assemble(slots, child, build))
                .collect();
            build(Built::Array(items))
        }
        Some(Slot::Object { entries, .. }) => {
            let entries = entries
                .into_iter()
                .map(|(name, child)| (name, assemble(slots, child, build)))
                .collect();
            build(Built::Object(entries))
        }
    }
}

impl<S> FormatWriter for TreeWriter<S> {
    type Array = ArrayHandle;
    type Object = ObjectHandle;
    type Var = NodeId;

    fn array_as_root(&mut self, size: usize) -> ArrayHandle {
        ArrayHandle(self.set_root(Self::array_slot(size)))
    }

    fn object_as_root(&mut self, size: usize) -> ObjectHandle {
        ObjectHandle(self.set_root(Self::object_slot(size)))
    }

    fn null_as_root(&mut self) -> NodeId {
        self.set_root(Slot::Null)
    }

    fn value_as_root(&mut self, value: ScalarValue<'_>) -> NodeId {
        let leaf = (self.leaf)(value);
        self.set_root(Slot::Leaf(leaf))
    }

    fn add_array_to_array(&mut self, size: usize, parent: &mut ArrayHandle) -> ArrayHandle {
        ArrayHandle(self.push_item(parent, Self::array_slot(size)))
    }

    fn add_array_to_object(
        &mut self,
        name: &str,
        size: usize,
        parent: &mut ObjectHandle,
    ) -> ArrayHandle {
        ArrayHandle(self.push_entry(parent, name, Self::array_slot(size)))
    }

    fn add_object_to_array(&mut self, size: usize, parent: &mut ArrayHandle) -> ObjectHandle {
        ObjectHandle(self.push_item(parent, Self::object_slot(size)))
    }

    fn add_object_to_object(
        &mut self,
        name: &str,
        size: usize,
        parent: &mut ObjectHandle,
    ) -> ObjectHandle {
        ObjectHandle(self.push_entry(parent, name, Self::object_slot(size)))
    }

    fn add_value_to_array(&mut self, value: ScalarValue<'_>, parent: &mut ArrayHandle) -> NodeId {
        let leaf = (self.leaf)(value);
        self.push_item(parent, Slot::Leaf(leaf))
    }

    fn add_value_to_object(
        &mut self,
        name: &str,
        value: ScalarValue<'_>,
        parent: &mut ObjectHandle,
    ) -> NodeId {
        let leaf = (self.leaf)(value);
        self.push_entry(parent, name, Slot::Leaf(leaf))
    }

    fn add_null_to_array(&mut self, parent: &mut ArrayHandle) -> NodeId {
        self.push_item(parent, Slot::Null)
    }

    fn add_null_to_object(&mut self, name: &str, parent: &mut ObjectHandle) -> NodeId {
        self.push_entry(parent, name, Slot::Null)
    }

    fn end_array(&mut self, array: ArrayHandle) {
        self.close(array.0);
    }

    fn end_object(&mut self, object: ObjectHandle) {
        self.close(object.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Node {
        Null,
        Text(String),
        List(Vec<Node>),
        Map(Vec<(String, Node)>),
    }

    fn leaf(value: ScalarValue<'_>) -> String {
        match value {
            ScalarValue::Str(s) => s.to_owned(),
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::F64(v) => v.to_string(),
            ScalarValue::I64(v) => v.to_string(),
            ScalarValue::U64(v) => v.to_string(),
        }
    }

    fn build(built: Built<Node, String>) -> Node {
        match built {
            Built::Null => Node::Null,
            Built::Leaf(s) => Node::Text(s),
            Built::Array(items) => Node::List(items),
            Built::Object(entries) => Node::Map(entries),
        }
    }

    #[tessera_testhelpers::test]
    fn nested_containers_assemble_in_order() {
        let mut w = TreeWriter::new(leaf);
        let mut root = w.object_as_root(2);
        w.add_value_to_object("name", ScalarValue::Str("x"), &mut root);
        let mut list = w.add_array_to_object("list", 2, &mut root);
        w.add_value_to_array(ScalarValue::U64(1), &mut list);
        w.add_null_to_array(&mut list);
        w.end_array(list);
        w.end_object(root);

        assert_eq!(
            w.finish(build),
            Node::Map(vec![
                ("name".into(), Node::Text("x".into())),
                (
                    "list".into(),
                    Node::List(vec![Node::Text("1".into()), Node::Null])
                ),
            ])
        );
    }

    #[tessera_testhelpers::test]
    fn empty_writer_assembles_to_null() {
        let w = TreeWriter::new(leaf);
        assert_eq!(w.finish(build), Node::Null);
    }

    #[tessera_testhelpers::test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "container closed before its children")]
    fn closing_parent_first_is_caught() {
        let mut w = TreeWriter::new(leaf);
        let mut root = w.array_as_root(1);
        let inner = w.add_array_to_array(0, &mut root);
        w.end_array(root);
        w.end_array(inner);
    }
}
