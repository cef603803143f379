//! Utilities to traverse the RTree structure.

use std::marker::PhantomData;

use geo_traits::RectTrait;

use crate::error::Result;
use crate::r#type::IndexableNum;
use crate::rtree::index::{EntryRef, Node};
use crate::rtree::rect::{Coord, Rect};
use crate::rtree::RTreeIndex;

/// A node of the RTree together with the tree it belongs to, for manual traversal.
#[derive(Debug)]
pub struct NodeRef<'a, N: IndexableNum, T: RTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// The stored node, resolved once when this reference is created.
    node: &'a Node<N>,

    phantom: PhantomData<N>,
}

impl<N: IndexableNum, T: RTreeIndex<N>> Clone for NodeRef<'_, N, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableNum, T: RTreeIndex<N>> Copy for NodeRef<'_, N, T> {}

impl<'a, N: IndexableNum, T: RTreeIndex<N>> NodeRef<'a, N, T> {
    /// Resolve node `id` in `tree`.
    pub(crate) fn new(tree: &'a T, id: u32) -> Result<Self> {
        Ok(Self {
            tree,
            node: tree.node(id)?,
            phantom: PhantomData,
        })
    }

    /// The id of this node.
    pub fn id(&self) -> u32 {
        self.node.id()
    }

    /// The stored node.
    pub fn node(&self) -> &'a Node<N> {
        self.node
    }

    /// The union of the rectangles of this node's entries.
    pub fn bounds(&self) -> &'a Rect<N> {
        self.node.bounds()
    }

    /// Returns `true` if this is a leaf node whose entries are objects.
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    pub fn is_parent(&self) -> bool {
        self.node.is_internal()
    }

    /// Returns `true` if the bounds of this node intersect those of another node.
    pub fn intersects<T2: RTreeIndex<N>>(&self, other: &NodeRef<N, T2>) -> bool {
        self.bounds().intersects(other.bounds())
    }

    /// Returns an iterator over the child nodes of this node. Leaves have no children.
    ///
    /// A child id that is missing from the tree yields an
    /// [`UnknownNodeReference`][crate::PackedRTreeError::UnknownNodeReference] error.
    pub fn children(&self) -> impl Iterator<Item = Result<NodeRef<'a, N, T>>> + 'a {
        let tree = self.tree;
        self.node
            .entries()
            .iter()
            .filter_map(|entry| match entry.target {
                EntryRef::Node(child_id) => Some(child_id),
                EntryRef::Object(_) => None,
            })
            .map(move |child_id| NodeRef::new(tree, child_id))
    }

    /// Returns an iterator over the `(object_id, rectangle)` pairs of a leaf. Intermediate
    /// nodes have no objects.
    pub fn objects(&self) -> impl Iterator<Item = (u32, &'a Rect<N>)> + 'a {
        self.node
            .entries()
            .iter()
            .filter_map(|entry| match entry.target {
                EntryRef::Object(object_id) => Some((object_id, &entry.rect)),
                EntryRef::Node(_) => None,
            })
    }
}

impl<N: IndexableNum, T: RTreeIndex<N>> RectTrait for NodeRef<'_, N, T> {
    type T = N;
    type CoordType<'b>
        = Coord<N>
    where
        Self: 'b;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        self.bounds().min()
    }

    fn max(&self) -> Self::CoordType<'_> {
        self.bounds().max()
    }
}
