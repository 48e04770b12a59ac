//! Spatial indexing and planar topology engine.
//!
//! The crate provides:
//!
//! * spatial indexes: an MX-CIF [`Quadtree`](index::quadtree::Quadtree), the bulk-loaded
//!   [`StrTree`](index::strtree::StrTree) with its one dimensional variant
//!   [`SirTree`](index::strtree::SirTree);
//! * boolean overlay of geometries ([`OverlayOp`](operation::overlay::OverlayOp)) built on a
//!   labelled planar graph;
//! * validity checking ([`IsValidOp`](operation::valid::IsValidOp));
//! * polygon triangulation by ear clipping with optional Delaunay improvement
//!   ([`PolygonTriangulator`](triangulate::PolygonTriangulator)).
//!
//! Geometries are taken from the [`planara_types`] crate, which is re-exported as [`types`].

pub mod error;
pub mod geomgraph;
pub mod index;
pub mod operation;
pub mod triangulate;

pub use error::PlanaraError;
pub use planara_types as types;
