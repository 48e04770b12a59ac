use std::collections::BTreeMap;

use planara_types::Coordinate;

use super::label::Label;
use super::{DirEdgeId, NodeId};

/// A point of a topology graph where edges meet.
#[derive(Debug, Clone)]
pub struct Node {
    coord: Coordinate,
    pub(crate) label: Label,
    // Outgoing directed edges, ordered counterclockwise by direction.
    pub(crate) star: Vec<DirEdgeId>,
}

impl Node {
    fn new(coord: Coordinate) -> Self {
        Self {
            coord,
            label: Label::default(),
            star: vec![],
        }
    }

    /// Position of the node.
    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }

    /// Labelling of the node.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Outgoing directed edges, counterclockwise.
    pub fn star(&self) -> &[DirEdgeId] {
        &self.star
    }

    /// Number of outgoing directed edges.
    pub fn degree(&self) -> usize {
        self.star.len()
    }

    /// A node is isolated if it is labelled with only one of the input geometries.
    pub fn is_isolated(&self) -> bool {
        self.label.geometry_count() == 1
    }
}

/// Nodes of a graph, indexed by their position.
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    nodes: Vec<Node>,
    index: BTreeMap<Coordinate, NodeId>,
}

impl NodeMap {
    /// Returns the node at the point, creating it if it does not exist.
    pub fn add_node(&mut self, coord: Coordinate) -> NodeId {
        *self.index.entry(coord).or_insert_with(|| {
            self.nodes.push(Node::new(coord));
            self.nodes.len() - 1
        })
    }

    /// Node at the point.
    pub fn find(&self, coord: &Coordinate) -> Option<NodeId> {
        self.index.get(coord).copied()
    }

    /// Node with the given id.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Node ids ordered by the node position.
    pub fn ids(&self) -> Vec<NodeId> {
        self.index.values().copied().collect()
    }

    /// Nodes ordered by position.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.index.values().map(|id| &self.nodes[*id])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
