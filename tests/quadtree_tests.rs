use stopmesh::quadtree::{Bounds, Item, QuadTree};

#[test]
fn exhaustive_walk_recovers_all_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    for i in 0..100u32 {
        let x = (i % 10) as f64;
        let y = (i / 10) as f64;
        tree.insert(Item::new(i, x, y));
    }
    assert_eq!(tree.len(), 100);

    let mut payloads: Vec<u32> = tree.items().iter().map(|item| item.payload).collect();
    payloads.sort_unstable();
    let expected: Vec<u32> = (0..100).collect();
    assert_eq!(payloads, expected);
}

#[test]
fn range_query_full_extent_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    for i in 0..100u32 {
        tree.insert(Item::new(i, (i % 10) as f64, (i / 10) as f64));
    }
    let hits = tree.query(&tree.bounds());
    assert_eq!(hits.len(), 100);
}

#[test]
fn range_query_disjoint_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    for i in 0..100u32 {
        tree.insert(Item::new(i, (i % 10) as f64, (i / 10) as f64));
    }
    let hits = tree.query(&Bounds::new(50.0, 60.0, 50.0, 60.0));
    assert!(hits.is_empty());
}

#[test]
fn range_query_subwindow_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    for i in 0..100u32 {
        tree.insert(Item::new(i, (i % 10) as f64, (i / 10) as f64));
    }
    // Grid points at integer coordinates: x and y in {2, 3, 4} qualify.
    let hits = tree.query(&Bounds::new(2.0, 4.0, 2.0, 4.0));
    assert_eq!(hits.len(), 9);
    for item in hits {
        assert!((2.0..=4.0).contains(&item.x));
        assert!((2.0..=4.0).contains(&item.y));
    }
}

#[test]
fn split_line_items_query_once_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    // Three items sit exactly on the vertical split line at x = 5.
    tree.insert(Item::new(1, 5.0, 1.0));
    tree.insert(Item::new(2, 5.0, 2.0));
    tree.insert(Item::new(3, 5.0, 3.0));
    tree.insert(Item::new(4, 1.0, 1.0));
    tree.insert(Item::new(5, 9.0, 9.0));
    tree.insert(Item::new(6, 2.0, 8.0));

    let on_line = tree.query(&Bounds::new(5.0, 5.0, 0.0, 10.0));
    let mut payloads: Vec<u32> = on_line.iter().map(|item| item.payload).collect();
    payloads.sort_unstable();
    assert_eq!(payloads, vec![1, 2, 3]);

    let everything = tree.query(&tree.bounds());
    assert_eq!(everything.len(), 6);
}

#[test]
fn rebound_encloses_all_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    tree.insert(Item::new('a', 3.0, 3.0));
    tree.insert(Item::new('b', 7.0, 7.0));
    tree.insert(Item::new('c', 200.0, 200.0));

    assert_eq!(tree.len(), 3);
    let bounds = tree.bounds();
    assert_eq!(bounds.left(), 3.0);
    assert_eq!(bounds.right(), 200.0);
    assert_eq!(bounds.bottom(), 3.0);
    assert_eq!(bounds.top(), 200.0);

    let mut payloads: Vec<char> = tree.items().iter().map(|item| item.payload).collect();
    payloads.sort_unstable();
    assert_eq!(payloads, vec!['a', 'b', 'c']);

    let hits = tree.query(&bounds);
    assert_eq!(hits.len(), 3);
}

#[test]
fn default_bounds_test() {
    let mut tree: QuadTree<u32> = QuadTree::new();
    assert!(tree.is_empty());
    tree.insert(Item::new(7, 2.0, 2.0));
    let hits = tree.query(&tree.bounds());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].payload, 7);
}

#[test]
#[should_panic]
fn negative_width_bounds_test() {
    let _ = Bounds::new(5.0, 1.0, 0.0, 10.0);
}

#[test]
#[should_panic]
fn negative_height_bounds_test() {
    let _ = Bounds::new(0.0, 10.0, 8.0, 2.0);
}
