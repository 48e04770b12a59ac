//! Labelled topology graphs.
//!
//! A [`GeometryGraph`] holds the edges and nodes of a single input geometry, labelled with their
//! location relative to it. Operations node the edges of their inputs against each other, split
//! them at the intersections and merge them into a [`PlanarGraph`], in which every edge knows its
//! location relative to both inputs.
//!
//! All graph components live in arenas and reference each other by index.

pub mod depth;
pub mod directed_edge;
pub mod edge;
pub mod edge_end;
pub mod edge_list;
pub mod edge_ring;
pub mod geometry_graph;
pub mod label;
pub mod node;
pub mod noding;
pub mod planar_graph;
pub mod quadrant;

/// Index of an edge in a graph.
pub type EdgeId = usize;
/// Index of a directed edge in a planar graph.
pub type DirEdgeId = usize;
/// Index of a node in a node map.
pub type NodeId = usize;
/// Index of an edge ring in an [`EdgeRings`] arena.
pub type RingId = usize;

pub use depth::Depth;
pub use directed_edge::{sym, DirectedEdge};
pub use edge::{Edge, EdgeIntersection, EdgeIntersectionList};
pub use edge_end::EdgeEnd;
pub use edge_list::EdgeList;
pub use edge_ring::{EdgeRing, EdgeRings, RingKind};
pub use geometry_graph::GeometryGraph;
pub use label::{Label, TopologyLocation};
pub use node::{Node, NodeMap};
pub use noding::SegmentIntersector;
pub use planar_graph::PlanarGraph;
pub use quadrant::Quadrant;
