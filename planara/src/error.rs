//! Error types used by the crate.

use planara_types::error::TypesError;
use planara_types::Coordinate;
use thiserror::Error;

use crate::operation::overlay::OverlayOpCode;

/// Planara error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanaraError {
    /// The topology of the input or of an intermediate graph is inconsistent.
    #[error("topology error: {message}{}", fmt_location(.coordinate))]
    Topology {
        /// Description of the problem.
        message: String,
        /// Location of the problem, if known.
        coordinate: Option<Coordinate>,
    },
    /// An item was inserted into an STR or SIR tree after it had been built.
    #[error("cannot insert items into a tree after it has been built")]
    TreeAlreadyBuilt,
    /// The ear clipping triangulator could not make progress.
    #[error("ear clipping failed: {message} [{coordinate}]")]
    EarClipping {
        /// Description of the problem.
        message: String,
        /// Vertex at which the algorithm stopped.
        coordinate: Coordinate,
    },
    /// An internal precondition was violated.
    #[error("assertion failed: {0}")]
    Assertion(String),
    /// Invalid input geometry.
    #[error(transparent)]
    Types(#[from] TypesError),
    /// Overlay operation failed.
    #[error("{op} overlay failed")]
    Overlay {
        /// Operation that failed.
        op: OverlayOpCode,
        /// The underlying error.
        #[source]
        source: Box<PlanaraError>,
    },
}

impl PlanaraError {
    pub(crate) fn topology(message: impl Into<String>, coordinate: Option<Coordinate>) -> Self {
        Self::Topology {
            message: message.into(),
            coordinate,
        }
    }
}

fn fmt_location(coordinate: &Option<Coordinate>) -> String {
    match coordinate {
        Some(c) => format!(" [{c}]"),
        None => String::new(),
    }
}
