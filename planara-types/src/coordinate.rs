use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A position in the plane with optional `z` and `m` ordinates.
///
/// Only `x` and `y` take part in topology. Equality, ordering and hashing are all two-dimensional
/// and consistent with each other: ordering is lexicographic on `x` then `y`, and `-0.0` is
/// treated as equal to `0.0`. The `z` and `m` ordinates are carried through operations but never
/// compared.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct Coordinate {
    /// X ordinate.
    pub x: f64,
    /// Y ordinate.
    pub y: f64,
    /// Optional elevation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Optional measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
}

impl Coordinate {
    /// Creates a new 2d coordinate.
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    /// Creates a new coordinate with an elevation.
    pub const fn new_xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    /// Returns a copy of the coordinate with the given measure.
    pub const fn with_m(self, m: f64) -> Self {
        Self { m: Some(m), ..self }
    }

    /// Returns true if both ordinates are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Two-dimensional equality.
    pub fn equals_2d(&self, other: &Coordinate) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Two-dimensional equality within the given tolerance on each axis.
    pub fn equals_2d_with_tolerance(&self, other: &Coordinate, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Euclidean distance between the coordinates in the plane.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Squared euclidean distance between the coordinates in the plane.
    pub fn distance_sq(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Lexicographic comparison on `x` then `y`.
    pub fn compare_xy(&self, other: &Coordinate) -> Ordering {
        canonical(self.x)
            .total_cmp(&canonical(other.x))
            .then_with(|| canonical(self.y).total_cmp(&canonical(other.y)))
    }
}

fn canonical(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.compare_xy(other) == Ordering::Equal
    }
}

impl Eq for Coordinate {}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_xy(other)
    }
}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical(self.x).to_bits().hash(state);
        canonical(self.y).to_bits().hash(state);
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.z {
            Some(z) => write!(f, "({} {} {})", self.x, self.y, z),
            None => write!(f, "({} {})", self.x, self.y),
        }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}
