use planara_types::Coordinate;

/// Quadrant of a direction vector, numbered counterclockwise starting from the positive x axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quadrant {
    /// `dx >= 0, dy >= 0`
    NorthEast = 0,
    /// `dx < 0, dy >= 0`
    NorthWest = 1,
    /// `dx < 0, dy < 0`
    SouthWest = 2,
    /// `dx >= 0, dy < 0`
    SouthEast = 3,
}

impl Quadrant {
    /// Quadrant of the vector `(dx, dy)`. A zero vector is in the north-east quadrant.
    pub fn of(dx: f64, dy: f64) -> Self {
        match (dx >= 0.0, dy >= 0.0) {
            (true, true) => Quadrant::NorthEast,
            (true, false) => Quadrant::SouthEast,
            (false, true) => Quadrant::NorthWest,
            (false, false) => Quadrant::SouthWest,
        }
    }

    /// Quadrant of the direction from `p0` to `p1`.
    pub fn of_segment(p0: &Coordinate, p1: &Coordinate) -> Self {
        Self::of(p1.x - p0.x, p1.y - p0.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_are_ordered_counterclockwise() {
        let mut quadrants = [
            Quadrant::of(1.0, -1.0),
            Quadrant::of(-1.0, -1.0),
            Quadrant::of(-1.0, 1.0),
            Quadrant::of(1.0, 1.0),
        ];
        quadrants.sort();
        assert_eq!(
            quadrants,
            [
                Quadrant::NorthEast,
                Quadrant::NorthWest,
                Quadrant::SouthWest,
                Quadrant::SouthEast
            ]
        );

        assert_eq!(Quadrant::of(0.0, 1.0), Quadrant::NorthEast);
        assert_eq!(Quadrant::of(-1.0, 0.0), Quadrant::NorthWest);
        assert_eq!(Quadrant::of(0.0, -1.0), Quadrant::SouthEast);
    }
}
