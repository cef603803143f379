use std::collections::BTreeMap;

use crate::error::{PackedRTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rtree::rect::Rect;

/// What an entry points at.
///
/// Object ids and node ids are independent id spaces, so every reference carries its kind
/// rather than relying on the owning node's leaf flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryRef {
    /// A child node of an internal node.
    Node(u32),
    /// An indexed object, referenced from a leaf.
    Object(u32),
}

impl EntryRef {
    /// The referenced id, regardless of kind.
    pub fn id(&self) -> u32 {
        match self {
            Self::Node(id) | Self::Object(id) => *id,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }
}

/// A single `(reference, rectangle)` pair stored in a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<N: IndexableNum> {
    pub target: EntryRef,
    pub rect: Rect<N>,
}

impl<N: IndexableNum> Entry<N> {
    pub fn new(target: EntryRef, rect: Rect<N>) -> Self {
        Self { target, rect }
    }
}

/// One page of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N: IndexableNum> {
    id: u32,
    is_internal: bool,
    entries: Vec<Entry<N>>,
    bounds: Rect<N>,
}

impl<N: IndexableNum> Node<N> {
    /// Create a node from `(referenced_id, rectangle)` pairs. References are tagged as child
    /// nodes when `is_internal`, and as objects otherwise.
    ///
    /// The node's bounds are the union of its entries, so a node without entries is rejected.
    pub(crate) fn new(
        id: u32,
        is_internal: bool,
        entries: impl IntoIterator<Item = (u32, Rect<N>)>,
    ) -> Result<Self> {
        let entries: Vec<Entry<N>> = entries
            .into_iter()
            .map(|(ref_id, rect)| {
                let target = if is_internal {
                    EntryRef::Node(ref_id)
                } else {
                    EntryRef::Object(ref_id)
                };
                Entry::new(target, rect)
            })
            .collect();
        let bounds = Rect::union_all(entries.iter().map(|entry| entry.rect))?;
        Ok(Self {
            id,
            is_internal,
            entries,
            bounds,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns `true` if the entries of this node reference child nodes.
    pub fn is_internal(&self) -> bool {
        self.is_internal
    }

    /// Returns `true` if the entries of this node reference objects.
    pub fn is_leaf(&self) -> bool {
        !self.is_internal
    }

    pub fn entries(&self) -> &[Entry<N>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The union of all entry rectangles.
    pub fn bounds(&self) -> &Rect<N> {
        &self.bounds
    }
}

/// An immutable, bulk-loaded RTree.
///
/// Usually this will be created from scratch via [`RTreeBuilder`][crate::rtree::RTreeBuilder],
/// or loaded from persisted node records via [`RTree::read_records`].
///
/// The tree owns all of its nodes and is never mutated after construction, so a shared
/// reference can be queried from many threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct RTree<N: IndexableNum> {
    pub(crate) nodes: BTreeMap<u32, Node<N>>,
    pub(crate) root_id: u32,
    pub(crate) num_items: usize,
}

impl<N: IndexableNum> RTree<N> {
    /// Assemble a tree from its nodes and an explicit root id.
    pub(crate) fn from_parts(nodes: BTreeMap<u32, Node<N>>, root_id: u32) -> Self {
        let num_items = nodes
            .values()
            .filter(|node| node.is_leaf())
            .map(|node| node.len())
            .sum();
        Self {
            nodes,
            root_id,
            num_items,
        }
    }

    /// The id of the root node.
    pub fn root_id(&self) -> u32 {
        self.root_id
    }

    /// Look up a node by id.
    pub fn node(&self, id: u32) -> Result<&Node<N>> {
        self.nodes
            .get(&id)
            .ok_or(PackedRTreeError::UnknownNodeReference(id))
    }

    /// All nodes in ascending id order. For a tree built here that is bottom-up, level by level,
    /// with the root last.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> {
        self.nodes.values()
    }

    /// The total number of objects referenced by leaf nodes.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// The total number of nodes, including both leaf and intermediate nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The bounding rectangle of everything in the tree.
    pub fn bounds(&self) -> Result<&Rect<N>> {
        Ok(self.node(self.root_id)?.bounds())
    }
}
