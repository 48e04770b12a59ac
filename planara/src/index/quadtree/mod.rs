//! MX-CIF quadtree.
//!
//! The quadtree stores items keyed by envelopes. Each item is stored in the smallest quadrant
//! that fully contains its envelope, so items that cross a quadrant's centre lines stay at that
//! node. The tree has no fixed extent: it grows upward when items are added outside of the
//! existing quadrants.

mod key;
mod node;

use parking_lot::RwLock;
use planara_types::Envelope;

use self::node::Node;
use crate::error::PlanaraError;

/// MX-CIF quadtree index.
///
/// Query results are a primary filter: every item with an envelope intersecting the query
/// envelope is returned, along with some items that do not intersect it.
#[derive(Debug, Clone)]
pub struct Quadtree<T> {
    root: Node<T>,
    // Smallest non-zero extent of inserted items. Used to give zero-extent envelopes a size.
    min_extent: f64,
}

impl<T> Default for Quadtree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Quadtree<T> {
    /// Creates an empty quadtree.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            min_extent: 1.0,
        }
    }

    /// Inserts an item with the given envelope.
    ///
    /// Returns an error if the envelope is null or not finite.
    pub fn insert(&mut self, item_env: &Envelope, item: T) -> Result<(), PlanaraError> {
        check_envelope(item_env)?;
        self.collect_stats(item_env);
        let insert_env = ensure_extent(item_env, self.min_extent);
        self.root.insert_into_root(&insert_env, item)
    }

    /// Removes one item equal to `item` that was inserted with the envelope `item_env`.
    ///
    /// Returns `false` if no such item was found; the tree is not changed in this case.
    pub fn remove(&mut self, item_env: &Envelope, item: &T) -> bool
    where
        T: PartialEq,
    {
        if check_envelope(item_env).is_err() {
            return false;
        }
        let search_env = ensure_extent(item_env, self.min_extent);
        self.root.remove(&search_env, item)
    }

    /// Returns all items whose envelopes may intersect the search envelope.
    pub fn query(&self, search_env: &Envelope) -> Vec<&T> {
        let mut result = vec![];
        self.query_with(search_env, |item| result.push(item));
        result
    }

    /// Calls the visitor for all items whose envelopes may intersect the search envelope.
    pub fn query_with<'a>(&'a self, search_env: &Envelope, mut visitor: impl FnMut(&'a T)) {
        self.root.visit(search_env, &mut visitor);
    }

    /// Returns all items in the tree.
    pub fn query_all(&self) -> Vec<&T> {
        let mut result = vec![];
        self.root.visit_all(&mut |item| result.push(item));
        result
    }

    /// Number of levels in the tree, the root included.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of items in the tree.
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Whether the tree has no items.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    fn collect_stats(&mut self, item_env: &Envelope) {
        let del_x = item_env.width();
        if del_x < self.min_extent && del_x > 0.0 {
            self.min_extent = del_x;
        }

        let del_y = item_env.height();
        if del_y < self.min_extent && del_y > 0.0 {
            self.min_extent = del_y;
        }
    }
}

fn check_envelope(env: &Envelope) -> Result<(), PlanaraError> {
    let finite = env.min_x().is_finite()
        && env.max_x().is_finite()
        && env.min_y().is_finite()
        && env.max_y().is_finite();
    if env.is_null() || !finite {
        return Err(PlanaraError::Assertion(format!("cannot index envelope {env:?}")));
    }
    Ok(())
}

/// Pads a zero width or height envelope to `min_extent` so it can be placed in the tree.
fn ensure_extent(item_env: &Envelope, min_extent: f64) -> Envelope {
    let mut min_x = item_env.min_x();
    let mut max_x = item_env.max_x();
    let mut min_y = item_env.min_y();
    let mut max_y = item_env.max_y();

    if min_x != max_x && min_y != max_y {
        return *item_env;
    }

    if min_x == max_x {
        min_x -= min_extent / 2.0;
        max_x += min_extent / 2.0;
    }
    if min_y == max_y {
        min_y -= min_extent / 2.0;
        max_y += min_extent / 2.0;
    }
    Envelope::new(min_x, max_x, min_y, max_y)
}

/// A quadtree that can be shared between threads.
///
/// Every operation takes the lock for its whole duration, so insertions and removals are
/// serialized against each other and against queries.
#[derive(Debug)]
pub struct SyncQuadtree<T> {
    inner: RwLock<Quadtree<T>>,
}

impl<T> Default for SyncQuadtree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncQuadtree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Quadtree::new()),
        }
    }

    /// See [`Quadtree::insert`].
    pub fn insert(&self, item_env: &Envelope, item: T) -> Result<(), PlanaraError> {
        self.inner.write().insert(item_env, item)
    }

    /// See [`Quadtree::remove`].
    pub fn remove(&self, item_env: &Envelope, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.inner.write().remove(item_env, item)
    }

    /// Returns copies of the items whose envelopes may intersect the search envelope.
    pub fn query(&self, search_env: &Envelope) -> Vec<T>
    where
        T: Clone,
    {
        let tree = self.inner.read();
        let mut result = vec![];
        tree.query_with(search_env, |item| result.push(item.clone()));
        result
    }

    /// Calls the visitor for all items whose envelopes may intersect the search envelope while
    /// holding the read lock.
    pub fn query_with(&self, search_env: &Envelope, mut visitor: impl FnMut(&T)) {
        self.inner.read().query_with(search_env, |item| visitor(item));
    }

    /// Number of items in the tree.
    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    /// Consumes the wrapper and returns the tree.
    pub fn into_inner(self) -> Quadtree<T> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Deterministic pseudo random envelopes.
    fn envelopes(count: usize) -> Vec<Envelope> {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % 10_000) as f64 / 10.0 - 500.0
        };

        (0..count)
            .map(|i| {
                let x = next();
                let y = next();
                // Mix zero size, thin and regular envelopes.
                let (w, h) = match i % 4 {
                    0 => (0.0, 0.0),
                    1 => (next().abs() / 10.0, 0.0),
                    _ => (next().abs() / 10.0, next().abs() / 10.0),
                };
                Envelope::new(x, x + w, y, y + h)
            })
            .collect()
    }

    #[test]
    fn query_returns_all_intersecting_items() {
        let envs = envelopes(500);
        let mut tree = Quadtree::new();
        for (i, env) in envs.iter().enumerate() {
            tree.insert(env, i).expect("insert");
        }
        assert_eq!(tree.size(), envs.len());

        for query in envelopes(50) {
            let query = query.expanded_by(20.0);
            let result = tree.query(&query);
            for (i, env) in envs.iter().enumerate() {
                if env.intersects(&query) {
                    assert!(result.contains(&&i), "item {i} {env:?} missing for {query:?}");
                }
            }
        }
    }

    #[test]
    fn insert_then_remove_all() {
        let envs = envelopes(200);
        let mut tree = Quadtree::new();
        for (i, env) in envs.iter().enumerate() {
            tree.insert(env, i).expect("insert");
        }

        assert!(!tree.remove(&envs[0], &1000));
        assert_eq!(tree.size(), envs.len());

        for (i, env) in envs.iter().enumerate() {
            assert!(tree.remove(env, &i), "item {i} not removed");
        }

        assert_eq!(tree.size(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 1);
        assert!(!tree.remove(&envs[0], &0));
    }

    #[test]
    fn items_crossing_axes_stay_in_root() {
        let mut tree = Quadtree::new();
        tree.insert(&Envelope::new(-1.0, 1.0, -1.0, 1.0), "centre")
            .expect("insert");
        assert_eq!(tree.depth(), 1);
        tree.insert(&Envelope::new(10.0, 11.0, 10.0, 11.0), "ne")
            .expect("insert");
        assert!(tree.depth() > 1);
        assert_eq!(
            tree.query(&Envelope::new(-0.5, -0.4, -0.5, -0.4)),
            vec![&"centre"]
        );
    }

    #[test]
    fn point_items() {
        let mut tree = Quadtree::new();
        for i in 0..100 {
            let x = i as f64 * 0.001 + 1000.0;
            tree.insert(&Envelope::new(x, x, 5.0, 5.0), i).expect("insert");
        }

        let result = tree.query(&Envelope::new(1000.0105, 1000.0105, 5.0, 5.0));
        assert!(result.contains(&&10));
        assert!(result.contains(&&11));
    }

    #[test]
    fn invalid_envelope() {
        let mut tree = Quadtree::new();
        assert!(tree.insert(&Envelope::null(), 1).is_err());
        assert!(tree
            .insert(&Envelope::new(0.0, f64::INFINITY, 0.0, 1.0), 1)
            .is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn query_all_and_visitor() {
        let mut tree = Quadtree::new();
        for (i, env) in envelopes(20).iter().enumerate() {
            tree.insert(env, i).expect("insert");
        }
        let mut all: Vec<usize> = tree.query_all().into_iter().copied().collect();
        all.sort();
        assert_eq!(all, (0..20).collect::<Vec<_>>());

        let mut count = 0;
        tree.query_with(&Envelope::new(-1000.0, 1000.0, -1000.0, 1000.0), |_| {
            count += 1
        });
        assert_eq!(count, 20);
    }

    #[test]
    fn shared_between_threads() {
        let tree = Arc::new(SyncQuadtree::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let tree = tree.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let x = (t * 25 + i) as f64;
                        tree.insert(&Envelope::new(x, x + 0.5, x, x + 0.5), t * 25 + i)
                            .expect("insert");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        assert_eq!(tree.size(), 100);
        let mut found = tree.query(&Envelope::new(10.0, 20.0, 10.0, 20.0));
        found.sort();
        assert!((10..=20).all(|i| found.contains(&i)));
    }
}
