//! Packed R-tree over a fixed sequence of vertices.

use planara_types::{Coordinate, Envelope};

/// Default number of children of a node.
pub const NODE_CAPACITY: usize = 16;

/// An R-tree built over a sequence of vertices, grouping consecutive vertices into nodes.
///
/// The tree structure is implicit: node `i` of a level covers nodes `i * capacity ..
/// (i + 1) * capacity` of the level below. Since vertices of a ring are spatially coherent,
/// the grouping gives tight bounds without sorting.
///
/// Items can be removed, which is used by the ear clipper to drop vertices that are no longer a
/// part of the ring. Nodes that have no items left below them are pruned from queries.
#[derive(Debug, Clone)]
pub struct VertexSequencePackedRtree {
    items: Vec<Coordinate>,
    removed: Vec<bool>,
    node_capacity: usize,
    // Node bounds per level, starting with the leaves. `None` for pruned nodes.
    levels: Vec<Vec<Option<Envelope>>>,
}

impl VertexSequencePackedRtree {
    /// Builds a tree over the given vertices with the default node capacity.
    pub fn new(items: Vec<Coordinate>) -> Self {
        Self::with_node_capacity(items, NODE_CAPACITY)
    }

    /// Builds a tree with the given node capacity. Capacities below 2 are raised to 2.
    pub fn with_node_capacity(items: Vec<Coordinate>, node_capacity: usize) -> Self {
        let node_capacity = node_capacity.max(2);
        let levels = build_levels(&items, node_capacity);
        Self {
            removed: vec![false; items.len()],
            items,
            node_capacity,
            levels,
        }
    }

    /// The vertices of the tree.
    pub fn items(&self) -> &[Coordinate] {
        &self.items
    }

    /// Number of node levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Bounds of the nodes of a level, `0` being the leaves. Pruned nodes have no bounds.
    pub fn level_bounds(&self, level: usize) -> &[Option<Envelope>] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether the vertex with the given index was removed.
    pub fn is_removed(&self, index: usize) -> bool {
        self.removed.get(index).copied().unwrap_or(true)
    }

    /// Indices of all vertices that are inside the envelope and have not been removed, in
    /// ascending order.
    pub fn query(&self, query_env: &Envelope) -> Vec<usize> {
        let mut result = vec![];
        if let Some(top) = self.levels.len().checked_sub(1) {
            for node in 0..self.levels[top].len() {
                self.query_node(query_env, top, node, &mut result);
            }
        }
        result
    }

    fn query_node(&self, query_env: &Envelope, level: usize, node: usize, result: &mut Vec<usize>) {
        let Some(Some(bounds)) = self.levels.get(level).and_then(|nodes| nodes.get(node)) else {
            return;
        };
        if !query_env.intersects(bounds) {
            return;
        }

        let start = node * self.node_capacity;
        if level == 0 {
            let end = (start + self.node_capacity).min(self.items.len());
            for index in start..end {
                if !self.removed[index] && query_env.intersects_coord(&self.items[index]) {
                    result.push(index);
                }
            }
        } else {
            let end = (start + self.node_capacity).min(self.levels[level - 1].len());
            for child in start..end {
                self.query_node(query_env, level - 1, child, result);
            }
        }
    }

    /// Removes a vertex from the tree. Every node left without any vertices below it is
    /// pruned, up to the root.
    pub fn remove(&mut self, index: usize) {
        let Some(removed) = self.removed.get_mut(index) else {
            return;
        };
        *removed = true;

        let capacity = self.node_capacity;
        let mut node = index / capacity;
        let start = node * capacity;
        let end = (start + capacity).min(self.items.len());
        if self.removed[start..end].iter().any(|removed| !removed) {
            return;
        }
        self.levels[0][node] = None;

        for level in 1..self.levels.len() {
            let parent = node / capacity;
            let start = parent * capacity;
            let end = (start + capacity).min(self.levels[level - 1].len());
            if self.levels[level - 1][start..end].iter().any(Option::is_some) {
                return;
            }
            self.levels[level][parent] = None;
            node = parent;
        }
    }
}

fn build_levels(items: &[Coordinate], capacity: usize) -> Vec<Vec<Option<Envelope>>> {
    let mut levels = vec![];
    if items.is_empty() {
        return levels;
    }

    let mut current: Vec<_> = items
        .chunks(capacity)
        .map(|chunk| Some(Envelope::from_points(chunk)))
        .collect();
    while current.len() > 1 {
        let parents = current
            .chunks(capacity)
            .map(|chunk| chunk.iter().flatten().copied().reduce(|a, b| a.merge(&b)))
            .collect();
        levels.push(std::mem::replace(&mut current, parents));
    }
    levels.push(current);
    levels
}
