use std::fmt::Display;

use tracing::{debug, error};

/// How many items a node may hold before it splits into four children.
pub const MAX_CAPACITY: usize = 4;
/// Subdivision stops at this depth; a node this deep holds items past
/// capacity, which keeps piles of co-located points from recursing forever.
pub const MAX_DEPTH: usize = 16;

const DEFAULT_BOUNDS: Bounds = Bounds {
    left: 0.0,
    right: 10.0,
    bottom: 0.0,
    top: 10.0,
};

/// An axis-aligned rectangle. All four edges are inclusive, for both
/// [`contains`](Self::contains) and [`intersects`](Self::intersects), so a
/// point sitting exactly on a shared split line is contained by every
/// quadrant that touches it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "({}, {}) to ({}, {})",
            self.left, self.bottom, self.right, self.top
        ))
    }
}

impl Bounds {
    /// Panics when the rectangle would have negative width or height.
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        assert!(
            right >= left && top >= bottom,
            "bounds must have non-negative width and height: ({left}, {bottom}) to ({right}, {top})"
        );
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    pub const fn left(&self) -> f64 {
        self.left
    }

    pub const fn right(&self) -> f64 {
        self.right
    }

    pub const fn bottom(&self) -> f64 {
        self.bottom
    }

    pub const fn top(&self) -> f64 {
        self.top
    }

    pub const fn width(&self) -> f64 {
        self.right - self.left
    }

    pub const fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub const fn contains(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.bottom <= y && y <= self.top
    }

    pub const fn intersects(&self, other: &Self) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    /// The four equal quadrants tiling this rectangle, in a fixed order:
    /// bottom-left, bottom-right, top-left, top-right.
    fn quadrants(&self) -> [Self; 4] {
        let center_x = self.left + self.width() / 2.0;
        let center_y = self.bottom + self.height() / 2.0;
        [
            Self::new(self.left, center_x, self.bottom, center_y),
            Self::new(center_x, self.right, self.bottom, center_y),
            Self::new(self.left, center_x, center_y, self.top),
            Self::new(center_x, self.right, center_y, self.top),
        ]
    }
}

/// A payload pinned to a 2-D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item<T> {
    pub payload: T,
    pub x: f64,
    pub y: f64,
}

impl<T> Item<T> {
    pub const fn new(payload: T, x: f64, y: f64) -> Self {
        Self { payload, x, y }
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    bounds: Bounds,
    level: usize,
    items: Vec<Item<T>>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T> Node<T> {
    fn new(bounds: Bounds, level: usize) -> Self {
        Self {
            bounds,
            level,
            items: Vec::new(),
            children: None,
        }
    }

    /// Precondition: `self.bounds` contains the item's point.
    fn insert(&mut self, item: Item<T>) {
        if let Some(children) = self.children.as_mut() {
            match children
                .iter_mut()
                .find(|child| child.bounds.contains(item.x, item.y))
            {
                Some(child) => child.insert(item),
                None => {
                    // The quadrants tile the node exactly, so a contained
                    // point always matches at least one child.
                    debug_assert!(false, "item matched no quadrant of {}", self.bounds);
                    error!(
                        "point ({}, {}) matched no quadrant of {}, keeping it at the parent",
                        item.x, item.y, self.bounds
                    );
                    self.items.push(item);
                }
            }
            return;
        }

        self.items.push(item);
        if self.items.len() > MAX_CAPACITY && self.level < MAX_DEPTH {
            self.split();
        }
    }

    fn split(&mut self) {
        let children = Box::new(
            self.bounds
                .quadrants()
                .map(|bounds| Node::new(bounds, self.level + 1)),
        );
        self.children = Some(children);

        // Redistribute out of a drained local buffer, never the live list.
        let held = std::mem::take(&mut self.items);
        for item in held {
            self.insert(item);
        }
    }

    fn query<'a>(&'a self, bounds: &Bounds, hits: &mut Vec<&'a Item<T>>) {
        hits.extend(
            self.items
                .iter()
                .filter(|item| bounds.contains(item.x, item.y)),
        );
        if let Some(children) = &self.children {
            for child in children
                .iter()
                .filter(|child| child.bounds.intersects(bounds))
            {
                child.query(bounds, hits);
            }
        }
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Item<T>>) {
        out.extend(self.items.iter());
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.walk(out);
            }
        }
    }

    fn drain(&mut self, out: &mut Vec<Item<T>>) {
        out.append(&mut self.items);
        if let Some(mut children) = self.children.take() {
            for child in children.iter_mut() {
                child.drain(out);
            }
        }
    }
}

/// An adaptive quad-tree over point-tagged payloads.
///
/// Nodes split once they hold more than [`MAX_CAPACITY`] items, and the whole
/// tree is rebuilt with widened bounds whenever an item lands outside the
/// current extent, so no insertion is ever rejected. Callers that know their
/// extent up front should presize through [`with_bounds`](Self::with_bounds)
/// to avoid repeated rebuilds.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QuadTree<T> {
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_BOUNDS)
    }

    pub fn with_bounds(bounds: Bounds) -> Self {
        Self {
            root: Node::new(bounds, 0),
            len: 0,
        }
    }

    /// The rectangle currently covered by the index.
    pub const fn bounds(&self) -> Bounds {
        self.root.bounds
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds an item, rebuilding the whole tree with widened bounds first if
    /// the item's point falls outside the current extent.
    pub fn insert(&mut self, item: Item<T>) {
        if !self.root.bounds.contains(item.x, item.y) {
            self.rebound(item);
            return;
        }
        self.root.insert(item);
        self.len += 1;
    }

    /// Collects every held item, grows the bounds to the minimal rectangle
    /// enclosing them plus the newcomer, and reinserts everything into a
    /// fresh root.
    fn rebound(&mut self, item: Item<T>) {
        debug!(
            "rebounding index of {} items to reach ({}, {})",
            self.len, item.x, item.y
        );
        let mut held = Vec::with_capacity(self.len + 1);
        self.root.drain(&mut held);
        held.push(item);

        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut bottom = f64::INFINITY;
        let mut top = f64::NEG_INFINITY;
        for item in &held {
            left = left.min(item.x);
            right = right.max(item.x);
            bottom = bottom.min(item.y);
            top = top.max(item.y);
        }

        self.root = Node::new(Bounds::new(left, right, bottom, top), 0);
        self.len = 0;
        for item in held {
            self.root.insert(item);
            self.len += 1;
        }
    }

    /// Every item whose point lies inside the given rectangle. Only children
    /// whose bounds intersect the query are descended into.
    pub fn query(&self, bounds: &Bounds) -> Vec<&Item<T>> {
        let mut hits = Vec::new();
        self.root.query(bounds, &mut hits);
        hits
    }

    /// Exhaustive walk over the root and every descendant.
    pub fn items(&self) -> Vec<&Item<T>> {
        let mut out = Vec::with_capacity(self.len);
        self.root.walk(&mut out);
        out
    }
}

#[test]
fn contains_is_inclusive_test() {
    let bounds = Bounds::new(0.0, 10.0, 0.0, 10.0);
    assert!(bounds.contains(0.0, 0.0));
    assert!(bounds.contains(10.0, 10.0));
    assert!(bounds.contains(5.0, 10.0));
    assert!(!bounds.contains(10.1, 5.0));
}

#[test]
fn intersects_test() {
    let bounds = Bounds::new(0.0, 10.0, 0.0, 10.0);
    assert!(bounds.intersects(&Bounds::new(5.0, 15.0, 5.0, 15.0)));
    assert!(bounds.intersects(&Bounds::new(10.0, 20.0, 10.0, 20.0)));
    assert!(!bounds.intersects(&Bounds::new(10.5, 20.0, 0.0, 10.0)));
}

#[test]
fn quadrants_tile_parent_test() {
    let bounds = Bounds::new(0.0, 10.0, 0.0, 10.0);
    let quadrants = bounds.quadrants();
    assert_eq!(quadrants[0], Bounds::new(0.0, 5.0, 0.0, 5.0));
    assert_eq!(quadrants[1], Bounds::new(5.0, 10.0, 0.0, 5.0));
    assert_eq!(quadrants[2], Bounds::new(0.0, 5.0, 5.0, 10.0));
    assert_eq!(quadrants[3], Bounds::new(5.0, 10.0, 5.0, 10.0));
}

#[test]
fn split_clears_parent_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    for i in 0..(MAX_CAPACITY + 1) {
        let offset = i as f64 * 0.5;
        tree.insert(Item::new(i, 1.0 + offset, 1.0 + offset));
    }
    assert!(tree.root.children.is_some());
    assert!(tree.root.items.is_empty());
    assert_eq!(tree.len(), MAX_CAPACITY + 1);
}

#[test]
fn co_located_points_stop_splitting_test() {
    let mut tree = QuadTree::with_bounds(Bounds::new(0.0, 10.0, 0.0, 10.0));
    for i in 0..50 {
        tree.insert(Item::new(i, 3.0, 3.0));
    }
    assert_eq!(tree.items().len(), 50);
}
