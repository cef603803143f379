use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::AABB;

use crate::rtree::sort::{HilbertSort, Sort};
use crate::rtree::{RTree, RTreeBuilder, RTreeIndex, RTreeOptions, Rect};
use crate::test::{
    brute_force_neighbors, brute_force_search, check_invariants, grid_objects, random_objects,
    random_window,
};

type RStarObject = GeomWithData<Rectangle<[f64; 2]>, u32>;

fn build<S: Sort<f64>>(objects: &[(u32, Rect<f64>)], options: RTreeOptions) -> RTree<f64> {
    let mut builder = RTreeBuilder::new_with_options(options);
    for (id, rect) in objects {
        builder.add_object(*id, *rect);
    }
    builder.finish::<S>().unwrap()
}

fn construct_rstar(objects: &[(u32, Rect<f64>)]) -> rstar::RTree<RStarObject> {
    let items = objects
        .iter()
        .map(|(id, rect)| {
            let rectangle = Rectangle::from_corners(
                [rect.min_x(), rect.min_y()],
                [rect.max_x(), rect.max_y()],
            );
            GeomWithData::new(rectangle, *id)
        })
        .collect();
    rstar::RTree::bulk_load(items)
}

fn ids(objects: &[(u32, Rect<f64>)]) -> Vec<u32> {
    objects.iter().map(|(id, _)| *id).collect()
}

#[test]
fn grid_builds_two_levels() {
    let objects = grid_objects();
    let options = RTreeOptions::new(2, 4).unwrap();
    let tree = RTree::bulk_load(objects.clone(), options).unwrap();

    assert_eq!(tree.height().unwrap(), 2);
    let root = tree.root_node().unwrap();
    assert!(root.is_parent());
    for leaf in root.children() {
        let leaf = leaf.unwrap();
        assert!(leaf.is_leaf());
        assert!((2..=4).contains(&leaf.node().len()));
    }
    check_invariants(&tree, &options, &ids(&objects));
}

#[test]
fn grid_search() {
    let tree = RTree::bulk_load(grid_objects(), RTreeOptions::new(2, 4).unwrap()).unwrap();
    let mut found = tree.search(-0.5, -0.5, 2.5, 0.5).unwrap();
    found.sort();
    assert_eq!(found, vec![0, 1, 2]);

    // Closed intervals: touching the edge of a point counts
    let mut found = tree.search(3., 2., 10., 10.).unwrap();
    found.sort();
    assert_eq!(found, vec![11]);

    assert!(tree.search(10., 10., 20., 20.).unwrap().is_empty());
}

#[test]
fn grid_neighbors() {
    let tree = RTree::bulk_load(grid_objects(), RTreeOptions::new(2, 4).unwrap()).unwrap();
    assert_eq!(tree.neighbors(0., 0., Some(3), None).unwrap(), vec![0, 1, 4]);

    let with_distance = tree
        .neighbors_with_distance(0., 0., Some(3), None)
        .unwrap();
    assert_eq!(with_distance, vec![(0, 0.), (1, 1.), (4, 1.)]);
}

#[test]
fn single_object() {
    let objects = vec![(42, Rect::new(1., 1., 2., 2.))];
    let tree = RTree::bulk_load(objects, Default::default()).unwrap();

    assert_eq!(tree.num_nodes(), 1);
    let root = tree.root_node().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.node().len(), 1);

    assert_eq!(tree.search(0., 0., 1.5, 1.5).unwrap(), vec![42]);
    assert!(tree.search(3., 3., 4., 4.).unwrap().is_empty());
    assert_eq!(tree.neighbors(10., -3., Some(1), None).unwrap(), vec![42]);
}

#[test]
fn more_neighbors_than_objects() {
    let objects = grid_objects();
    let tree = RTree::bulk_load(objects.clone(), RTreeOptions::new(2, 4).unwrap()).unwrap();
    let results = tree.neighbors_with_distance(1.2, 0.9, Some(100), None).unwrap();
    let expected = brute_force_neighbors(&objects, 1.2, 0.9);
    assert_eq!(results, expected);
}

#[test]
fn duplicate_rectangles() {
    let objects: Vec<_> = (0..25u32).map(|i| (i, Rect::new(5., 5., 6., 6.))).collect();
    let options = RTreeOptions::new(2, 4).unwrap();
    let tree = RTree::bulk_load(objects.clone(), options).unwrap();
    check_invariants(&tree, &options, &ids(&objects));

    let mut found = tree.search(5.5, 5.5, 5.5, 5.5).unwrap();
    found.sort();
    assert_eq!(found, ids(&objects));
    assert_eq!(
        tree.neighbors(0., 0., Some(5), None).unwrap(),
        vec![0, 1, 2, 3, 4]
    );
}

#[test]
fn integer_coordinates() {
    let mut builder = RTreeBuilder::<i32>::new_with_options(RTreeOptions::new(2, 4).unwrap());
    for i in 0..40 {
        builder.add(i * 10, 0, i * 10 + 5, 5);
    }
    let tree = builder.finish::<HilbertSort>().unwrap();
    let mut found = tree.search(12, 0, 25, 0).unwrap();
    found.sort();
    assert_eq!(found, vec![1, 2]);
    assert_eq!(tree.neighbors(100, 20, Some(2), None).unwrap(), vec![10, 9]);
}

#[test]
fn queries_are_idempotent() {
    let objects = random_objects(7, 500);
    let tree = RTree::bulk_load(objects, Default::default()).unwrap();
    let first = tree.search(100., 100., 400., 300.).unwrap();
    let second = tree.search(100., 100., 400., 300.).unwrap();
    assert_eq!(first, second);

    let first = tree.neighbors_with_distance(500., 500., Some(20), None).unwrap();
    let second = tree.neighbors_with_distance(500., 500., Some(20), None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn build_is_deterministic() {
    let objects = random_objects(11, 300);
    let a = RTree::bulk_load(objects.clone(), Default::default()).unwrap();
    let b = RTree::bulk_load(objects, Default::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn concurrent_queries() {
    let objects = random_objects(3, 1000);
    let tree = RTree::bulk_load(objects.clone(), Default::default()).unwrap();
    std::thread::scope(|scope| {
        for t in 0..4 {
            let tree = &tree;
            let objects = &objects;
            scope.spawn(move || {
                let x = 250. * t as f64;
                let mut found = tree.search(x, 0., x + 100., 1000.).unwrap();
                found.sort();
                let query = Rect::new(x, 0., x + 100., 1000.);
                assert_eq!(found, brute_force_search(objects, &query));
            });
        }
    });
}

#[test]
fn invariants_hold_for_many_sizes() {
    for (min_entries, max_entries) in [(2, 3), (2, 4), (3, 7), (8, 20), (1, 2)] {
        let options = RTreeOptions::new(min_entries, max_entries).unwrap();
        for n in [1, 2, 3, 5, 17, 64, 65, 257, 1000] {
            let objects = random_objects(n as u64, n);
            let tree = build::<HilbertSort>(&objects, options);
            check_invariants(&tree, &options, &ids(&objects));
            let tree = RTree::bulk_load(objects.clone(), options).unwrap();
            check_invariants(&tree, &options, &ids(&objects));
        }
    }
}

#[test]
fn search_matches_brute_force() {
    let objects = random_objects(1, 2000);
    let tree = RTree::bulk_load(objects.clone(), Default::default()).unwrap();
    let hilbert_tree = build::<HilbertSort>(&objects, Default::default());

    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let query = random_window(&mut rng);
        let expected = brute_force_search(&objects, &query);
        for tree in [&tree, &hilbert_tree] {
            let mut found = tree.search_rect(&query).unwrap();
            found.sort();
            assert_eq!(found, expected);
        }
    }
}

#[test]
fn neighbors_match_brute_force() {
    let objects = random_objects(2, 2000);
    let tree = RTree::bulk_load(objects.clone(), RTreeOptions::new(3, 9).unwrap()).unwrap();

    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..100 {
        let (x, y) = (rng.gen_range(-100.0..1100.0), rng.gen_range(-100.0..1100.0));
        let k = rng.gen_range(1..50);
        let expected = brute_force_neighbors(&objects, x, y);
        let results = tree.neighbors_with_distance(x, y, Some(k), None).unwrap();
        assert_eq!(results, expected[..k]);
    }
}

#[test]
fn search_matches_rstar() {
    let objects = random_objects(5, 3000);
    let tree = RTree::bulk_load(objects.clone(), Default::default()).unwrap();
    let rstar_tree = construct_rstar(&objects);

    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..100 {
        let query = random_window(&mut rng);
        let mut found = tree.search_rect(&query).unwrap();
        found.sort();

        let envelope = AABB::from_corners(
            [query.min_x(), query.min_y()],
            [query.max_x(), query.max_y()],
        );
        let mut expected: Vec<u32> = rstar_tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|object| object.data)
            .collect();
        expected.sort();
        assert_eq!(found, expected);
    }
}

#[test]
fn neighbor_distances_match_rstar() {
    let objects = random_objects(6, 3000);
    let tree = build::<HilbertSort>(&objects, Default::default());
    let rstar_tree = construct_rstar(&objects);

    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..100 {
        let (x, y) = (rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
        let distances: Vec<f64> = tree
            .neighbors_with_distance(x, y, Some(10), None)
            .unwrap()
            .into_iter()
            .map(|(_, dist)| dist)
            .collect();
        let expected: Vec<f64> = rstar_tree
            .nearest_neighbor_iter_with_distance_2(&[x, y])
            .take(10)
            .map(|(_, dist_2)| dist_2.sqrt())
            .collect();
        assert_eq!(distances.len(), expected.len());
        for (a, b) in distances.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }
}
