//! Error type used by the crate.

use thiserror::Error;

use crate::Coordinate;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypesError {
    /// A linear ring was built from a coordinate sequence that is not closed.
    #[error("points of a linear ring do not form a closed line string (first point {0})")]
    RingNotClosed(Coordinate),
    /// A geometry part has fewer points than its type requires.
    #[error("invalid number of points in {kind}: {count}")]
    TooFewPoints {
        /// Kind of the part being built.
        kind: &'static str,
        /// Number of points that were given.
        count: usize,
    },
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
}
