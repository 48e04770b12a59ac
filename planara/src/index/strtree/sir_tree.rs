use serde::{Deserialize, Serialize};

use super::tree::{pack, Boundable, Bounds, ItemsTree, Node, Tree};
use crate::error::PlanaraError;

/// A closed interval on the real line.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    /// Creates an interval between the two values, in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower end.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper end.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Middle of the interval.
    pub fn centre(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Bounds for Interval {
    fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn intersects(&self, other: &Self) -> bool {
        !(other.min > self.max || other.max < self.min)
    }

    fn create_parents(
        mut children: Vec<Boundable<Self>>,
        capacity: usize,
        level: i32,
    ) -> Vec<Node<Self>> {
        children.sort_by(|a, b| a.bounds().centre().total_cmp(&b.bounds().centre()));
        pack(children, capacity, level)
    }
}

/// One-dimensional version of the [`StrTree`](super::StrTree): a static tree of intervals.
///
/// Items are sorted by the centres of their intervals and packed into nodes of
/// `node_capacity` children.
#[derive(Debug, Clone)]
pub struct SirTree<T> {
    tree: Tree<Interval, T>,
}

impl<T> Default for SirTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SirTree<T> {
    /// Creates a tree with the default node capacity of 10.
    pub fn new() -> Self {
        Self {
            tree: Tree::default(),
        }
    }

    /// Creates a tree with the given node capacity. The capacity must be at least 2.
    pub fn with_node_capacity(node_capacity: usize) -> Result<Self, PlanaraError> {
        Ok(Self {
            tree: Tree::new(node_capacity)?,
        })
    }

    /// Maximum number of children of a node.
    pub fn node_capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Adds an item with the interval between `x1` and `x2`.
    ///
    /// Fails with [`PlanaraError::TreeAlreadyBuilt`] once the tree is built.
    pub fn insert(&mut self, x1: f64, x2: f64, item: T) -> Result<(), PlanaraError> {
        self.tree.insert(Interval::new(x1, x2), item)
    }

    /// Builds the tree. Calling it more than once has no effect. Queries build the tree
    /// automatically.
    pub fn build(&self) {
        self.tree.build();
    }

    /// Returns items whose intervals intersect the interval between `x1` and `x2`.
    pub fn query(&self, x1: f64, x2: f64) -> Vec<&T> {
        let mut result = vec![];
        self.query_with(x1, x2, |item| result.push(item));
        result
    }

    /// Calls the visitor for every item whose interval intersects the interval between `x1`
    /// and `x2`.
    pub fn query_with<'a>(&'a self, x1: f64, x2: f64, mut visitor: impl FnMut(&'a T)) {
        self.tree.query_with(&Interval::new(x1, x2), &mut visitor);
    }

    /// Removes one item equal to `item` with an interval intersecting `x1..x2`.
    pub fn remove(&mut self, x1: f64, x2: f64, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.tree.remove(&Interval::new(x1, x2), item)
    }

    /// Number of items in the tree.
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Whether the tree has no items.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of node levels.
    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    /// Intervals of the boundables at the given level, see
    /// [`StrTree::boundables_at_level`](super::StrTree::boundables_at_level).
    pub fn boundables_at_level(&self, level: i32) -> Vec<Interval> {
        self.tree.boundables_at_level(level)
    }

    /// Items grouped by the nodes of the tree.
    pub fn items_tree(&self) -> Vec<ItemsTree<'_, T>> {
        self.tree.items_tree()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn sample() -> SirTree<&'static str> {
        let mut tree = SirTree::with_node_capacity(2).expect("capacity");
        for (x1, x2, name) in [
            (2.0, 6.0, "A"),
            (2.0, 4.0, "B"),
            (2.0, 3.0, "C"),
            (2.0, 4.0, "D"),
            (0.0, 1.0, "E"),
            (2.0, 4.0, "F"),
            (5.0, 6.0, "G"),
        ] {
            tree.insert(x1, x2, name).expect("insert");
        }
        tree
    }

    #[test]
    fn levels_and_queries() {
        let tree = sample();
        tree.build();

        assert_eq!(tree.boundables_at_level(-1).len(), 7);
        assert_eq!(tree.boundables_at_level(0).len(), 4);
        assert_eq!(tree.boundables_at_level(1).len(), 2);
        assert_eq!(tree.boundables_at_level(2).len(), 1);
        assert_eq!(tree.boundables_at_level(2)[0], Interval::new(0.0, 6.0));
        assert!(tree.boundables_at_level(3).is_empty());
        assert!(tree.boundables_at_level(-2).is_empty());
        assert_eq!(tree.depth(), 3);

        assert_eq!(tree.query(0.5, 0.5), vec![&"E"]);
        assert!(tree.query(1.5, 1.5).is_empty());
        let mut found = tree.query(4.5, 5.5);
        found.sort();
        assert_eq!(found, vec![&"A", &"G"]);
    }

    #[test]
    fn parent_count_is_ceiling_of_children() {
        for count in [1, 2, 9, 10, 11, 57] {
            let mut tree = SirTree::with_node_capacity(3).expect("capacity");
            for i in 0..count {
                let x = i as f64;
                tree.insert(x, x + 1.0, i).expect("insert");
            }

            let mut expected: usize = count;
            let mut level = 0;
            loop {
                expected = expected.div_ceil(3);
                assert_eq!(tree.boundables_at_level(level).len(), expected);
                if expected == 1 {
                    break;
                }
                level += 1;
            }
            assert!(tree.boundables_at_level(level + 1).is_empty());
        }
    }

    #[test]
    fn insert_after_build() {
        let mut tree = sample();
        assert_eq!(tree.size(), 7);
        assert_matches!(tree.insert(0.0, 1.0, "H"), Err(PlanaraError::TreeAlreadyBuilt));
        assert_matches!(tree.insert(0.0, 1.0, "H"), Err(PlanaraError::TreeAlreadyBuilt));
        assert_eq!(tree.size(), 7);
    }

    #[test]
    fn remove_items() {
        let mut tree = sample();
        assert!(tree.remove(0.0, 1.0, &"E"));
        assert!(!tree.remove(0.0, 1.0, &"E"));
        assert!(tree.query(0.5, 0.5).is_empty());
        assert_eq!(tree.size(), 6);
    }

    #[test]
    fn invalid_capacity() {
        assert_matches!(
            SirTree::<u8>::with_node_capacity(1),
            Err(PlanaraError::Assertion(_))
        );
    }

    #[test]
    fn empty_tree() {
        let tree = SirTree::<u8>::new();
        assert!(tree.query(0.0, 10.0).is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.is_empty());
        assert!(tree.items_tree().is_empty());
        assert!(tree.boundables_at_level(0).is_empty());
    }
}
