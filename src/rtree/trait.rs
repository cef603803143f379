use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::error::{PackedRTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rtree::index::{EntryRef, Node, RTree};
use crate::rtree::rect::{rect_from_trait, Rect};
use crate::rtree::traversal::NodeRef;

/// A trait for searching and accessing data out of an RTree.
///
/// Both queries only read the tree, so any number of them may run concurrently against the
/// same index. Every query either completes or fails with an error; a node reference that
/// cannot be resolved aborts the query with [`PackedRTreeError::UnknownNodeReference`] rather
/// than returning a partial result.
pub trait RTreeIndex<N: IndexableNum>: Sized {
    /// The id of the root node.
    fn root_id(&self) -> u32;

    /// Resolve a node by id.
    fn node(&self, id: u32) -> Result<&Node<N>>;

    /// Search an RTree given the provided bounding box.
    ///
    /// Returns the ids of all objects whose rectangle intersects (or touches) the query box.
    /// Results are in traversal order, one id per stored entry. Sort them if you need a
    /// canonical order.
    fn search(&self, min_x: N, min_y: N, max_x: N, max_y: N) -> Result<Vec<u32>> {
        let query = Rect::new(min_x, min_y, max_x, max_y);
        if let Err(err) = query.validate() {
            log::warn!("Rejecting bounding box query: {}", err);
            return Err(err);
        }

        // Use TinyVec to avoid heap allocations for shallow trees. Depth-first, so the stack holds
        // at most about height * max_entries node ids
        let mut stack: TinyVec<[u32; 32]> = TinyVec::new();
        stack.push(self.root_id());

        let mut results = vec![];

        while let Some(node_id) = stack.pop() {
            let node = self.node(node_id)?;
            for entry in node.entries() {
                if !entry.rect.intersects(&query) {
                    continue;
                }
                match entry.target {
                    EntryRef::Node(child_id) => stack.push(child_id),
                    EntryRef::Object(object_id) => results.push(object_id),
                }
            }
        }

        Ok(results)
    }

    /// Search an RTree given the provided bounding box.
    ///
    /// Results are the ids of objects intersecting the box, in traversal order.
    fn search_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<u32>> {
        let rect = rect_from_trait(rect);
        self.search(rect.min_x(), rect.min_y(), rect.max_x(), rect.max_y())
    }

    /// Search items in order of distance from the given point.
    ///
    /// Returns at most `max_results` object ids, nearest first, skipping anything farther than
    /// `max_distance`. Distances are measured from the point to each object's rectangle; ties
    /// are returned in ascending object id order.
    ///
    /// ```
    /// use packed_rtree::rtree::{RTreeBuilder, RTreeIndex};
    /// use packed_rtree::rtree::sort::ZOrderSort;
    ///
    /// // Create an RTree
    /// let mut builder = RTreeBuilder::<f64>::new();
    /// builder.add(0., 0., 2., 2.);
    /// builder.add(1., 1., 3., 3.);
    /// builder.add(2., 2., 4., 4.);
    /// let tree = builder.finish::<ZOrderSort>().unwrap();
    ///
    /// let results = tree.neighbors(5., 5., None, None).unwrap();
    /// assert_eq!(results, vec![2, 1, 0]);
    /// ```
    fn neighbors(
        &self,
        x: N,
        y: N,
        max_results: Option<usize>,
        max_distance: Option<f64>,
    ) -> Result<Vec<u32>> {
        Ok(self
            .neighbors_with_distance(x, y, max_results, max_distance)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Search items in order of distance from the given point, returning each object id
    /// together with its distance.
    ///
    /// This is a best-first search: the queue holds nodes and objects keyed by the distance from
    /// the point to their rectangle. That distance is a lower bound for everything below a
    /// node, so an object popped from the queue is never farther than anything still queued.
    fn neighbors_with_distance(
        &self,
        x: N,
        y: N,
        max_results: Option<usize>,
        max_distance: Option<f64>,
    ) -> Result<Vec<(u32, f64)>> {
        let (x, y): (f64, f64) = (x.as_(), y.as_());
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Rejecting neighbors query with non-finite coordinates");
            return Err(PackedRTreeError::InvalidGeometry(format!(
                "query point ({}, {}) is not finite",
                x, y
            )));
        }

        if let Some(max_distance) = max_distance {
            if max_distance.is_nan() || max_distance < 0. {
                log::warn!("Rejecting neighbors query with max_distance {}", max_distance);
                return Err(PackedRTreeError::InvalidGeometry(format!(
                    "max_distance {} must be a non-negative number",
                    max_distance
                )));
            }
        }

        let max_results = max_results.unwrap_or(usize::MAX);
        let max_distance = max_distance.unwrap_or(f64::INFINITY);

        let mut results = vec![];
        if max_results == 0 {
            return Ok(results);
        }

        let mut queue = BinaryHeap::new();
        let mut visited = HashSet::new();
        queue.push(Reverse(NeighborNode {
            dist: 0.,
            target: EntryRef::Node(self.root_id()),
        }));

        while let Some(Reverse(item)) = queue.pop() {
            if item.dist > max_distance {
                break;
            }
            if !visited.insert(item.target) {
                continue;
            }

            match item.target {
                EntryRef::Node(node_id) => {
                    // add child nodes to the queue
                    for entry in self.node(node_id)?.entries() {
                        let dist = entry.rect.distance_to_point(x, y);
                        if dist > max_distance {
                            continue;
                        }
                        queue.push(Reverse(NeighborNode {
                            dist,
                            target: entry.target,
                        }));
                    }
                }
                EntryRef::Object(object_id) => {
                    results.push((object_id, item.dist));
                    if results.len() == max_results {
                        break;
                    }
                }
            }
        }

        Ok(results)
    }

    /// Search items in order of distance from the given coordinate.
    fn neighbors_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        max_results: Option<usize>,
        max_distance: Option<f64>,
    ) -> Result<Vec<u32>> {
        self.neighbors(coord.x(), coord.y(), max_results, max_distance)
    }

    /// Access the root node of the RTree for manual traversal.
    fn root_node(&self) -> Result<NodeRef<'_, N, Self>> {
        NodeRef::new(self, self.root_id())
    }

    /// The number of levels (height) of the tree, following the first entry of each node down
    /// to a leaf.
    fn height(&self) -> Result<usize> {
        let mut node = self.root_node()?;
        let mut height = 1;
        while node.is_parent() {
            let first_child = node.children().next();
            node = match first_child {
                Some(child) => child?,
                None => break,
            };
            height += 1;
        }
        Ok(height)
    }
}

/// A queued node or object keyed by its distance from the query point.
///
/// The order is total: by distance, then nodes before objects, then by id. Expanding every
/// node at a given distance before emitting objects at that distance makes ties come out in
/// ascending object id order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NeighborNode {
    dist: f64,
    target: EntryRef,
}

impl Eq for NeighborNode {}

impl Ord for NeighborNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.target.cmp(&other.target))
    }
}

impl PartialOrd for NeighborNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: IndexableNum> RTreeIndex<N> for RTree<N> {
    fn root_id(&self) -> u32 {
        self.root_id
    }

    fn node(&self, id: u32) -> Result<&Node<N>> {
        RTree::node(self, id)
    }
}
