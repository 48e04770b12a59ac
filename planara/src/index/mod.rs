//! Spatial indexes.
//!
//! All indexes are primary filters: a query returns every item whose envelope intersects the
//! query envelope, and possibly some more. Exact intersection tests are up to the caller.

pub mod interval_size;
pub mod packed_rtree;
pub mod quadtree;
pub mod strtree;
