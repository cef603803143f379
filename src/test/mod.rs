//! Fixtures, brute-force oracles and a structural checker shared by the tree tests.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::r#type::IndexableNum;
use crate::rtree::{EntryRef, RTree, RTreeIndex, RTreeOptions, Rect};

/// Twelve unit points on a 4 x 3 grid, id `i` at `(i % 4, i / 4)`.
pub(crate) fn grid_objects() -> Vec<(u32, Rect<f64>)> {
    (0..12u32)
        .map(|i| (i, Rect::from_point((i % 4) as f64, (i / 4) as f64)))
        .collect()
}

/// `n` random rectangles in `[0, 1000]^2`, about a quarter of them points.
pub(crate) fn random_objects(seed: u64, n: usize) -> Vec<(u32, Rect<f64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n as u32)
        .map(|id| {
            let x = rng.gen_range(0.0..1000.0);
            let y = rng.gen_range(0.0..1000.0);
            let rect = if rng.gen_bool(0.25) {
                Rect::from_point(x, y)
            } else {
                Rect::new(
                    x,
                    y,
                    x + rng.gen_range(0.0..25.0),
                    y + rng.gen_range(0.0..25.0),
                )
            };
            (id, rect)
        })
        .collect()
}

/// A random, valid query window in `[-50, 1050]^2`.
pub(crate) fn random_window(rng: &mut impl Rng) -> Rect<f64> {
    let x = rng.gen_range(-50.0..1050.0);
    let y = rng.gen_range(-50.0..1050.0);
    Rect::new(
        x,
        y,
        x + rng.gen_range(0.0..200.0),
        y + rng.gen_range(0.0..200.0),
    )
}

/// Ids of every object intersecting `query`, sorted.
pub(crate) fn brute_force_search(objects: &[(u32, Rect<f64>)], query: &Rect<f64>) -> Vec<u32> {
    let mut ids: Vec<u32> = objects
        .iter()
        .filter(|(_, rect)| rect.intersects(query))
        .map(|(id, _)| *id)
        .collect();
    ids.sort();
    ids
}

/// Every object with its distance from `(x, y)`, ordered by distance and then by id.
pub(crate) fn brute_force_neighbors(
    objects: &[(u32, Rect<f64>)],
    x: f64,
    y: f64,
) -> Vec<(u32, f64)> {
    let mut all: Vec<(u32, f64)> = objects
        .iter()
        .map(|(id, rect)| (*id, rect.distance_to_point(x, y)))
        .collect();
    all.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    all
}

/// Walk the whole tree from the root and assert its structural invariants:
///
/// - every non-root node holds between `min_entries` and `max_entries` entries, and the root
///   at most `max_entries`
/// - a node's bounds are the union of its entries, and an internal entry's rectangle equals
///   the bounds of the child it references
/// - every stored node is reached exactly once and all leaves sit at the same depth
/// - the leaves reference exactly `expected_ids`
pub(crate) fn check_invariants<N: IndexableNum>(
    tree: &RTree<N>,
    options: &RTreeOptions,
    expected_ids: &[u32],
) {
    let mut seen_nodes = HashSet::new();
    let mut object_ids = vec![];
    let mut leaf_depths = HashSet::new();

    let mut stack = vec![(tree.root_id(), 1usize)];
    while let Some((node_id, depth)) = stack.pop() {
        assert!(seen_nodes.insert(node_id), "node {node_id} reached twice");
        let node = tree.node(node_id).unwrap();

        assert!(node.len() <= options.max_entries(), "node {node_id} overflows");
        if node_id != tree.root_id() {
            assert!(node.len() >= options.min_entries(), "node {node_id} underflows");
        }
        let union = Rect::union_all(node.entries().iter().map(|entry| entry.rect)).unwrap();
        assert_eq!(node.bounds(), &union, "bounds of node {node_id}");

        for entry in node.entries() {
            match entry.target {
                EntryRef::Node(child_id) => {
                    assert!(node.is_internal());
                    assert_eq!(tree.node(child_id).unwrap().bounds(), &entry.rect);
                    stack.push((child_id, depth + 1));
                }
                EntryRef::Object(object_id) => {
                    assert!(node.is_leaf());
                    object_ids.push(object_id);
                }
            }
        }
        if node.is_leaf() {
            leaf_depths.insert(depth);
        }
    }

    assert_eq!(seen_nodes.len(), tree.num_nodes(), "unreachable nodes");
    assert_eq!(leaf_depths.len(), 1, "leaves at different depths");
    assert_eq!(leaf_depths.into_iter().next().unwrap(), tree.height().unwrap());

    object_ids.sort();
    let mut expected_ids = expected_ids.to_vec();
    expected_ids.sort();
    assert_eq!(object_ids, expected_ids);
    assert_eq!(tree.num_items(), expected_ids.len());
}
