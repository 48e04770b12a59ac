use serde::{Deserialize, Serialize};

use crate::{Coordinate, Envelope};

/// A single point. An empty point has no coordinate.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coord: Option<Coordinate>,
}

impl Point {
    /// Creates a new point.
    pub fn new(coord: Coordinate) -> Self {
        Self { coord: Some(coord) }
    }

    /// Creates an empty point.
    pub fn empty() -> Self {
        Self { coord: None }
    }

    /// The coordinate of the point.
    pub fn coord(&self) -> Option<&Coordinate> {
        self.coord.as_ref()
    }

    pub(crate) fn coord_mut(&mut self) -> Option<&mut Coordinate> {
        self.coord.as_mut()
    }

    /// Whether the point is empty.
    pub fn is_empty(&self) -> bool {
        self.coord.is_none()
    }

    /// Envelope of the point, null for the empty point.
    pub fn envelope(&self) -> Envelope {
        self.coord
            .as_ref()
            .map(Envelope::from_coord)
            .unwrap_or_default()
    }
}

impl From<Coordinate> for Point {
    fn from(value: Coordinate) -> Self {
        Self::new(value)
    }
}
