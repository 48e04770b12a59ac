use planara_types::Envelope;

use super::nearest::NearestSearch;
use super::tree::{pack, Boundable, Bounds, ItemsTree, Node, Tree};
use crate::error::PlanaraError;

impl Bounds for Envelope {
    fn merge(&self, other: &Self) -> Self {
        Envelope::merge(self, other)
    }

    fn intersects(&self, other: &Self) -> bool {
        Envelope::intersects(self, other)
    }

    /// Sort-tile-recursive packing: the boundables are sorted by `x` and split into vertical
    /// slices, then every slice is sorted by `y` and packed into nodes.
    fn create_parents(
        mut children: Vec<Boundable<Self>>,
        capacity: usize,
        level: i32,
    ) -> Vec<Node<Self>> {
        let min_leaf_count = children.len().div_ceil(capacity);
        let slice_count = ((min_leaf_count as f64).sqrt().ceil() as usize).max(1);
        let slice_capacity = children.len().div_ceil(slice_count);

        children.sort_by(|a, b| centre_x(a.bounds()).total_cmp(&centre_x(b.bounds())));

        let mut parents = vec![];
        let mut children = children.into_iter();
        loop {
            let mut slice: Vec<_> = children.by_ref().take(slice_capacity).collect();
            if slice.is_empty() {
                break;
            }
            slice.sort_by(|a, b| centre_y(a.bounds()).total_cmp(&centre_y(b.bounds())));
            parents.extend(pack(slice, capacity, level));
        }
        parents
    }
}

fn centre_x(env: &Envelope) -> f64 {
    (env.min_x() + env.max_x()) / 2.0
}

fn centre_y(env: &Envelope) -> f64 {
    (env.min_y() + env.max_y()) / 2.0
}

/// A static R-tree packed with the Sort-Tile-Recursive algorithm.
///
/// Items are added with [`StrTree::insert`] and the tree is built, either explicitly with
/// [`StrTree::build`] or on the first query. Once built, no more items can be added, but items
/// can still be removed. A built tree can be queried from several threads at once.
///
/// ```
/// use planara::index::strtree::StrTree;
/// use planara::types::Envelope;
///
/// let mut tree = StrTree::new();
/// tree.insert(&Envelope::new(0.0, 1.0, 0.0, 1.0), "a").unwrap();
/// tree.insert(&Envelope::new(5.0, 6.0, 5.0, 6.0), "b").unwrap();
///
/// assert_eq!(tree.query(&Envelope::new(0.5, 2.0, 0.5, 2.0)), vec![&"a"]);
/// assert!(tree.insert(&Envelope::new(0.0, 1.0, 0.0, 1.0), "c").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StrTree<T> {
    pub(super) tree: Tree<Envelope, T>,
}

impl<T> Default for StrTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StrTree<T> {
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

    /// Adds an item to the tree. Items with a null envelope are ignored.
    ///
    /// Fails with [`PlanaraError::TreeAlreadyBuilt`] if the tree has been built already.
    pub fn insert(&mut self, item_env: &Envelope, item: T) -> Result<(), PlanaraError> {
        if self.tree.is_built() {
            return Err(PlanaraError::TreeAlreadyBuilt);
        }
        if item_env.is_null() {
            return Ok(());
        }
        self.tree.insert(*item_env, item)
    }

    /// Builds the tree. Calling it again has no effect.
    pub fn build(&self) {
        self.tree.build();
    }

    /// Returns the items whose envelopes intersect the search envelope.
    pub fn query(&self, search_env: &Envelope) -> Vec<&T> {
        let mut result = vec![];
        self.query_with(search_env, |item| result.push(item));
        result
    }

    /// Calls the visitor for every item whose envelope intersects the search envelope.
    pub fn query_with<'a>(&'a self, search_env: &Envelope, mut visitor: impl FnMut(&'a T)) {
        self.tree.query_with(search_env, &mut visitor);
    }

    /// Removes one item equal to `item` whose envelope intersects `item_env`. Builds the tree if
    /// needed.
    pub fn remove(&mut self, item_env: &Envelope, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.tree.remove(item_env, item)
    }

    /// Number of items in the tree.
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Whether the tree has no items.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of node levels, `0` for an empty tree.
    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    /// Envelopes of all boundables at the given level.
    ///
    /// Level `0` contains the leaf nodes, every next level their parents, up to the root. Level
    /// `-1` returns the envelopes of the items. Lower levels are empty.
    pub fn boundables_at_level(&self, level: i32) -> Vec<Envelope> {
        self.tree.boundables_at_level(level)
    }

    /// Items grouped by the nodes of the tree.
    pub fn items_tree(&self) -> Vec<ItemsTree<'_, T>> {
        self.tree.items_tree()
    }

    /// Finds the two nearest distinct items of the tree, using the given item distance.
    ///
    /// The distance must be consistent with envelope distance: the distance between two items
    /// cannot be smaller than the distance between their envelopes. Returns `None` if the tree
    /// has fewer than 2 items.
    pub fn nearest_neighbour<F>(&self, item_distance: F) -> Option<(&T, &T)>
    where
        F: Fn(&T, &T) -> f64,
    {
        let root = self.tree.root()?;
        NearestSearch::new(&self.tree, Some(&self.tree), item_distance)
            .distinct()
            .between_nodes(root, root)
    }

    /// Finds the nearest pair of items between this tree and another one.
    pub fn nearest_neighbour_with<'a, U, F>(
        &'a self,
        other: &'a StrTree<U>,
        item_distance: F,
    ) -> Option<(&'a T, &'a U)>
    where
        F: Fn(&T, &U) -> f64,
    {
        let root = self.tree.root()?;
        let other_root = other.tree.root()?;
        NearestSearch::new(&self.tree, Some(&other.tree), item_distance)
            .between_nodes(root, other_root)
    }

    /// Finds the item of the tree nearest to the given item, which does not need to be in the
    /// tree. If it is, it will be returned itself.
    pub fn nearest_to<U, F>(&self, item_env: &Envelope, item: &U, item_distance: F) -> Option<&T>
    where
        F: Fn(&T, &U) -> f64,
    {
        let root = self.tree.root()?;
        NearestSearch::new(&self.tree, None, item_distance)
            .to_item(root, item_env, item)
            .map(|(found, _)| found)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use planara_types::Coordinate;

    use super::*;

    fn grid(size: usize) -> Vec<Coordinate> {
        let mut points = vec![];
        for i in 0..size {
            for j in 0..size {
                // Slightly irregular grid.
                let x = i as f64 * 10.0 + (j % 3) as f64 * 0.7;
                let y = j as f64 * 10.0 + (i % 5) as f64 * 0.3;
                points.push(Coordinate::new(x, y));
            }
        }
        points
    }

    fn point_tree(points: &[Coordinate]) -> StrTree<Coordinate> {
        let mut tree = StrTree::new();
        for p in points {
            tree.insert(&Envelope::from_coord(p), *p).expect("insert");
        }
        tree
    }

    #[test]
    fn query_matches_brute_force() {
        let points = grid(20);
        let tree = point_tree(&points);

        for (x, y) in [(0.0, 0.0), (55.0, 31.0), (199.0, 199.0), (-5.0, 100.0)] {
            let env = Envelope::new(x, x + 25.0, y, y + 17.0);
            let mut found: Vec<_> = tree.query(&env).into_iter().copied().collect();
            found.sort();
            let mut expected: Vec<_> = points
                .iter()
                .filter(|p| env.contains_coord(p))
                .copied()
                .collect();
            expected.sort();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn levels() {
        let points = grid(10);
        let tree = point_tree(&points);
        assert_eq!(tree.boundables_at_level(-1).len(), 100);

        // 10 leaves needed, 4 slices of 25 boundables make 3 nodes each.
        assert_eq!(tree.boundables_at_level(0).len(), 12);
        assert_eq!(tree.boundables_at_level(1).len(), 2);
        assert_eq!(tree.boundables_at_level(2).len(), 1);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.size(), 100);

        let root = tree.boundables_at_level(2)[0];
        assert_eq!(root, Envelope::from_points(&points));

        let items = tree.items_tree();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn insert_after_build_fails() {
        let mut tree = point_tree(&grid(3));
        tree.build();
        let env = Envelope::new(0.0, 1.0, 0.0, 1.0);
        assert_matches!(
            tree.insert(&env, Coordinate::default()),
            Err(PlanaraError::TreeAlreadyBuilt)
        );
        assert_matches!(
            tree.insert(&Envelope::null(), Coordinate::default()),
            Err(PlanaraError::TreeAlreadyBuilt)
        );
        assert_eq!(tree.size(), 9);
    }

    #[test]
    fn null_envelopes_are_ignored() {
        let mut tree = StrTree::new();
        tree.insert(&Envelope::null(), 1).expect("insert");
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.query(&Envelope::new(-1.0, 1.0, -1.0, 1.0)).is_empty());
    }

    #[test]
    fn remove_prunes_items() {
        let points = grid(5);
        let mut tree = point_tree(&points);
        let target = points[7];
        let env = Envelope::from_coord(&target);

        assert!(tree.remove(&env, &target));
        assert!(!tree.remove(&env, &target));
        assert!(tree.query(&env).is_empty());
        assert_eq!(tree.size(), 24);
    }

    fn brute_force_nearest(points: &[Coordinate]) -> f64 {
        let mut min = f64::INFINITY;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                min = min.min(a.distance(b));
            }
        }
        min
    }

    #[test]
    fn nearest_neighbour_in_tree() {
        let points = grid(12);
        let tree = point_tree(&points);
        let (a, b) = tree
            .nearest_neighbour(|a, b| a.distance(b))
            .expect("two items");
        assert_ne!(a, b);
        assert_eq!(a.distance(b), brute_force_nearest(&points));
    }

    #[test]
    fn nearest_neighbour_with_duplicates() {
        let points = [Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.0)];
        let tree = point_tree(&points);
        let (a, b) = tree
            .nearest_neighbour(|a, b| a.distance(b))
            .expect("two items");
        assert_eq!(a.distance(b), 0.0);
    }

    #[test]
    fn nearest_neighbour_needs_two_items() {
        let tree = point_tree(&[Coordinate::new(1.0, 1.0)]);
        assert!(tree.nearest_neighbour(|a, b| a.distance(b)).is_none());
        assert!(StrTree::<Coordinate>::new()
            .nearest_neighbour(|a, b| a.distance(b))
            .is_none());
    }

    #[test]
    fn nearest_between_trees() {
        let left = point_tree(&grid(6));
        let right_points: Vec<_> = grid(4)
            .into_iter()
            .map(|p| Coordinate::new(p.x + 200.0, p.y + 3.0))
            .collect();
        let right = point_tree(&right_points);

        let (a, b) = left
            .nearest_neighbour_with(&right, |a, b| a.distance(b))
            .expect("pair");

        let mut expected = f64::INFINITY;
        for p in grid(6) {
            for q in &right_points {
                expected = expected.min(p.distance(q));
            }
        }
        assert_eq!(a.distance(b), expected);
    }

    #[test]
    fn nearest_to_external_item() {
        let points = grid(8);
        let tree = point_tree(&points);
        let target = Coordinate::new(33.0, 48.0);
        let found = tree
            .nearest_to(&Envelope::from_coord(&target), &target, |a, b| a.distance(b))
            .expect("item");

        let expected = points
            .iter()
            .map(|p| p.distance(&target))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(found.distance(&target), expected);
    }

    #[test]
    fn concurrent_queries() {
        let tree = Arc::new(point_tree(&grid(10)));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tree = tree.clone();
                std::thread::spawn(move || {
                    let x = i as f64 * 20.0;
                    tree.query(&Envelope::new(x, x + 9.0, 0.0, 100.0)).len()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), 10);
        }
    }
}
