//! Operations on geometries built on the topology graph.

pub mod overlay;
pub mod valid;
