//! Basic computational geometry algorithms the topology engine is built on.

pub mod angle;
pub mod line_intersector;
pub mod locate;
pub mod ring;
pub mod triangle;

pub use crate::orient::is_in_circle_robust;
pub use line_intersector::{IntersectionKind, LineIntersector};
pub use locate::{locate_in_area, PointLocator};
