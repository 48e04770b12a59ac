use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Topological location of a point relative to a geometry.
///
/// An unknown location is represented as `Option::<Location>::None` wherever it may occur.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    /// The point lies in the interior of the geometry.
    Interior,
    /// The point lies on the boundary of the geometry.
    Boundary,
    /// The point lies outside the geometry.
    Exterior,
}

impl Location {
    /// Symbol used in labels and debug output.
    pub fn symbol(self) -> char {
        match self {
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Position relative to a directed line: on it, to the left or to the right.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// On the line.
    On = 0,
    /// Left of the line.
    Left = 1,
    /// Right of the line.
    Right = 2,
}

impl Position {
    /// Returns `Left` for `Right` and vice versa. `On` stays unchanged.
    pub fn opposite(self) -> Self {
        match self {
            Position::On => Position::On,
            Position::Left => Position::Right,
            Position::Right => Position::Left,
        }
    }

    /// Index of the position used for array-backed labels.
    pub fn index(self) -> usize {
        self as usize
    }
}
