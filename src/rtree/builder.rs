use std::collections::BTreeMap;

use geo_traits::RectTrait;

use crate::error::{PackedRTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rtree::index::{Entry, EntryRef, Node, RTree};
use crate::rtree::options::RTreeOptions;
use crate::rtree::rect::{rect_from_trait, Rect};
use crate::rtree::sort::{Sort, SortParams, ZOrderSort};
use crate::rtree::util::pack_chunks;

/// A builder to create an [`RTree`].
///
/// ```
/// use packed_rtree::rtree::RTreeBuilder;
/// use packed_rtree::rtree::sort::ZOrderSort;
///
/// let mut builder = RTreeBuilder::<f64>::new();
/// builder.add(0., 0., 2., 2.);
/// builder.add(1., 1., 3., 3.);
/// builder.add(2., 2., 4., 4.);
/// let tree = builder.finish::<ZOrderSort>().unwrap();
/// assert_eq!(tree.num_items(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RTreeBuilder<N: IndexableNum> {
    entries: Vec<Entry<N>>,
    options: RTreeOptions,
}

impl<N: IndexableNum> RTreeBuilder<N> {
    /// Create a new builder with the default node capacity.
    pub fn new() -> Self {
        Self::new_with_options(RTreeOptions::default())
    }

    /// Create a new builder with the provided node capacity.
    pub fn new_with_options(options: RTreeOptions) -> Self {
        Self {
            entries: vec![],
            options,
        }
    }

    /// Reserve space for `additional` more objects.
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Access the node capacity used by this builder.
    pub fn options(&self) -> &RTreeOptions {
        &self.options
    }

    /// The number of objects added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a given rectangle to the RTree.
    ///
    /// This returns the insertion index, which is used as the object id. Queries return this
    /// same id, which allows you to reference your original collection.
    ///
    /// Rectangles are validated when the tree is built in [`RTreeBuilder::finish`].
    #[inline]
    pub fn add(&mut self, min_x: N, min_y: N, max_x: N, max_y: N) -> u32 {
        let id = self.entries.len() as u32;
        self.add_object(id, Rect::new(min_x, min_y, max_x, max_y));
        id
    }

    /// Add a given rectangle to the RTree.
    ///
    /// This returns the insertion index, which is used as the object id.
    #[inline]
    pub fn add_rect(&mut self, rect: &impl RectTrait<T = N>) -> u32 {
        let id = self.entries.len() as u32;
        self.add_object(id, rect_from_trait(rect));
        id
    }

    /// Add an object with an explicit id.
    ///
    /// Mixing this with [`RTreeBuilder::add`] is allowed, but the caller is then responsible for
    /// keeping ids distinct.
    #[inline]
    pub fn add_object(&mut self, id: u32, rect: Rect<N>) {
        self.entries.push(Entry::new(EntryRef::Object(id), rect));
    }

    /// Consume this builder, performing the sort and packing every level of the tree bottom-up.
    ///
    /// [`ZOrderSort`] and [`HilbertSort`] both implement [`Sort`], allowing you to choose the
    /// order in which objects are packed into leaves.
    ///
    /// Fails with [`PackedRTreeError::EmptyInput`] when no objects were added, and with
    /// [`PackedRTreeError::InvalidGeometry`] when any rectangle is malformed. Either way no
    /// partial tree is produced.
    ///
    /// [`HilbertSort`]: crate::rtree::sort::HilbertSort
    pub fn finish<S: Sort<N>>(mut self) -> Result<RTree<N>> {
        self.options.validate()?;
        if self.entries.is_empty() {
            return Err(PackedRTreeError::EmptyInput);
        }
        for entry in &self.entries {
            entry.rect.validate().map_err(|err| {
                PackedRTreeError::InvalidGeometry(format!(
                    "object {}: {}",
                    entry.target.id(),
                    err
                ))
            })?;
        }

        let extent = Rect::union_all(self.entries.iter().map(|entry| entry.rect))?;
        S::sort(&SortParams::new(extent), &mut self.entries);

        let mut node_ids = NodeIdCounter::default();
        let mut nodes = BTreeMap::new();

        let mut level = build_level(&self.entries, false, &self.options, &mut node_ids)?;
        let mut level_index = 0;
        log::debug!("{} nodes at level {}", level.len(), level_index);

        while level.len() > 1 {
            let entries: Vec<Entry<N>> = level
                .iter()
                .map(|node| Entry::new(EntryRef::Node(node.id()), *node.bounds()))
                .collect();
            nodes.extend(level.into_iter().map(|node| (node.id(), node)));

            level = build_level(&entries, true, &self.options, &mut node_ids)?;
            level_index += 1;
            log::debug!("{} nodes at level {}", level.len(), level_index);
        }

        // The loop above ends with exactly one node, which is the root
        let root_id = level[0].id();
        nodes.extend(level.into_iter().map(|node| (node.id(), node)));

        let tree = RTree::from_parts(nodes, root_id);
        log::info!(
            "Bulk loaded {} objects into {} nodes over {} levels",
            tree.num_items(),
            tree.num_nodes(),
            level_index + 1
        );
        Ok(tree)
    }
}

impl<N: IndexableNum> Default for RTreeBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: IndexableNum> RTree<N> {
    /// Bulk load a tree from `(object_id, rectangle)` pairs, packed in z-order.
    ///
    /// ```
    /// use packed_rtree::rtree::{Rect, RTree, RTreeIndex, RTreeOptions};
    ///
    /// let objects = (0..50u32).map(|i| (i, Rect::from_point(i as f64, 0.)));
    /// let tree = RTree::bulk_load(objects, RTreeOptions::default()).unwrap();
    /// assert_eq!(tree.neighbors(10.2, 0., Some(2), None).unwrap(), vec![10, 11]);
    /// ```
    pub fn bulk_load(
        objects: impl IntoIterator<Item = (u32, Rect<N>)>,
        options: RTreeOptions,
    ) -> Result<Self> {
        let mut builder = RTreeBuilder::new_with_options(options);
        for (id, rect) in objects {
            builder.add_object(id, rect);
        }
        builder.finish::<ZOrderSort>()
    }
}

/// Sequential node ids for a single build.
#[derive(Debug, Default)]
struct NodeIdCounter(u32);

impl NodeIdCounter {
    fn next_id(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

/// Pack one level of entries into nodes, in order.
fn build_level<N: IndexableNum>(
    entries: &[Entry<N>],
    is_internal: bool,
    options: &RTreeOptions,
    node_ids: &mut NodeIdCounter,
) -> Result<Vec<Node<N>>> {
    pack_chunks(entries.len(), options.min_entries(), options.max_entries())
        .into_iter()
        .map(|chunk| {
            Node::new(
                node_ids.next_id(),
                is_internal,
                entries[chunk]
                    .iter()
                    .map(|entry| (entry.target.id(), entry.rect)),
            )
        })
        .collect()
}
