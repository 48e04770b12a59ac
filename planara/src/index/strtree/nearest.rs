//! Branch-and-bound nearest neighbour search over pairs of tree nodes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use planara_types::Envelope;

use super::tree::{Boundable, Node, Tree};

/// One side of a candidate pair: a node of a tree or a single item.
enum Side<'a, T> {
    Node(&'a Node<Envelope>),
    Item {
        env: Envelope,
        item: &'a T,
        // Entry index in the tree, `None` for items outside of any tree.
        index: Option<usize>,
    },
}

impl<T> Clone for Side<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Side<'_, T> {}

impl<'a, T> Side<'a, T> {
    fn from_child(tree: &'a Tree<Envelope, T>, child: &'a Boundable<Envelope>) -> Option<Self> {
        match child {
            Boundable::Node(node) => Some(Side::Node(node)),
            Boundable::Item { bounds, index } => tree.item(*index).map(|item| Side::Item {
                env: *bounds,
                item,
                index: Some(*index),
            }),
        }
    }

    fn env(&self) -> &Envelope {
        match self {
            Side::Node(node) => &node.bounds,
            Side::Item { env, .. } => env,
        }
    }
}

struct Pair<'a, 'b, T, U> {
    a: Side<'a, T>,
    b: Side<'b, U>,
    distance: f64,
}

impl<T, U> PartialEq for Pair<'_, '_, T, U> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, U> Eq for Pair<'_, '_, T, U> {}

impl<T, U> PartialOrd for Pair<'_, '_, T, U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, U> Ord for Pair<'_, '_, T, U> {
    // Reversed, so that the binary heap pops the closest pair first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.total_cmp(&self.distance)
    }
}

/// Search for the nearest pair of items from two sides.
///
/// Pairs are taken from a priority queue ordered by the minimum distance they can have. Pairs
/// of nodes are expanded by replacing the node with the larger area by its children, and pairs
/// that cannot be closer than the best pair found so far are dropped.
pub(super) struct NearestSearch<'a, 'b, T, U, F> {
    tree_a: &'a Tree<Envelope, T>,
    tree_b: Option<&'b Tree<Envelope, U>>,
    item_distance: F,
    distinct: bool,
}

impl<'a, 'b, T, U, F> NearestSearch<'a, 'b, T, U, F>
where
    F: Fn(&T, &U) -> f64,
{
    pub fn new(
        tree_a: &'a Tree<Envelope, T>,
        tree_b: Option<&'b Tree<Envelope, U>>,
        item_distance: F,
    ) -> Self {
        Self {
            tree_a,
            tree_b,
            item_distance,
            distinct: false,
        }
    }

    /// Both sides are the same tree: pairs of an item with itself are skipped.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn between_nodes(
        &self,
        a: &'a Node<Envelope>,
        b: &'b Node<Envelope>,
    ) -> Option<(&'a T, &'b U)> {
        let pair = self.pair(Side::Node(a), Side::Node(b))?;
        self.search(pair)
    }

    pub fn to_item(
        &self,
        a: &'a Node<Envelope>,
        env: &Envelope,
        item: &'b U,
    ) -> Option<(&'a T, &'b U)> {
        let b = Side::Item {
            env: *env,
            item,
            index: None,
        };
        let pair = self.pair(Side::Node(a), b)?;
        self.search(pair)
    }

    fn pair(&self, a: Side<'a, T>, b: Side<'b, U>) -> Option<Pair<'a, 'b, T, U>> {
        let distance = match (&a, &b) {
            (
                Side::Item {
                    item: item_a,
                    index: index_a,
                    ..
                },
                Side::Item {
                    item: item_b,
                    index: index_b,
                    ..
                },
            ) => {
                if self.distinct && index_a.is_some() && index_a == index_b {
                    return None;
                }
                (self.item_distance)(*item_a, *item_b)
            }
            _ => a.env().distance(b.env()),
        };
        Some(Pair { a, b, distance })
    }

    fn search(&self, init: Pair<'a, 'b, T, U>) -> Option<(&'a T, &'b U)> {
        let mut distance_bound = f64::INFINITY;
        let mut best = None;
        let mut queue = BinaryHeap::new();
        queue.push(init);

        let mut examined = 0usize;
        while distance_bound > 0.0 {
            let Some(pair) = queue.pop() else {
                break;
            };
            examined += 1;
            if pair.distance >= distance_bound {
                break;
            }

            match (pair.a, pair.b) {
                (Side::Item { item: a, .. }, Side::Item { item: b, .. }) => {
                    distance_bound = pair.distance;
                    best = Some((a, b));
                }
                _ => self.expand(&pair, &mut queue, distance_bound),
            }
        }

        log::trace!("Nearest neighbour search examined {examined} pairs");
        best
    }

    fn expand(
        &self,
        pair: &Pair<'a, 'b, T, U>,
        queue: &mut BinaryHeap<Pair<'a, 'b, T, U>>,
        distance_bound: f64,
    ) {
        match (pair.a, pair.b) {
            (Side::Node(a), Side::Node(b)) if a.bounds.area() > b.bounds.area() => {
                self.expand_a(a, pair.b, queue, distance_bound)
            }
            (_, Side::Node(b)) => self.expand_b(pair.a, b, queue, distance_bound),
            (Side::Node(a), Side::Item { .. }) => {
                self.expand_a(a, pair.b, queue, distance_bound)
            }
            (Side::Item { .. }, Side::Item { .. }) => {}
        }
    }

    fn expand_a(
        &self,
        node: &'a Node<Envelope>,
        other: Side<'b, U>,
        queue: &mut BinaryHeap<Pair<'a, 'b, T, U>>,
        distance_bound: f64,
    ) {
        for child in &node.children {
            let Some(side) = Side::from_child(self.tree_a, child) else {
                continue;
            };
            self.push(side, other, queue, distance_bound);
        }
    }

    fn expand_b(
        &self,
        other: Side<'a, T>,
        node: &'b Node<Envelope>,
        queue: &mut BinaryHeap<Pair<'a, 'b, T, U>>,
        distance_bound: f64,
    ) {
        let Some(tree_b) = self.tree_b else {
            return;
        };
        for child in &node.children {
            let Some(side) = Side::from_child(tree_b, child) else {
                continue;
            };
            self.push(other, side, queue, distance_bound);
        }
    }

    fn push(
        &self,
        a: Side<'a, T>,
        b: Side<'b, U>,
        queue: &mut BinaryHeap<Pair<'a, 'b, T, U>>,
        distance_bound: f64,
    ) {
        if let Some(pair) = self.pair(a, b) {
            if pair.distance < distance_bound {
                queue.push(pair);
            }
        }
    }
}
