//! Planar geometry model used by `planara`.
//!
//! This crate contains everything the topology engine consumes from the outside world:
//! coordinates and envelopes, the OGC Simple Features geometry model, a geometry factory with a
//! precision model, robust orientation predicates, a robust line intersector and point location
//! against geometries.

pub mod algorithm;
pub mod error;
pub mod geometry;

mod coordinate;
mod envelope;
mod factory;
mod location;
mod orient;
mod segment;

#[cfg(feature = "geo-types")]
mod geo_types;

pub use coordinate::Coordinate;
pub use envelope::Envelope;
pub use factory::{GeometryFactory, InstantiationPolicy, PrecisionModel};
pub use geometry::{
    Dimension, Geometry, GeometryCollection, GeometryType, LineString, LinearRing,
    MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
pub use location::{Location, Position};
pub use orient::Orientation;
pub use segment::Segment;
