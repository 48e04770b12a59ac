//! Angle calculations. All angles are in radians.

use std::f64::consts::PI;

use crate::Coordinate;

/// Angle of the vector `p0 -> p1` against the positive x axis, in `(-pi, pi]`.
pub fn angle(p0: &Coordinate, p1: &Coordinate) -> f64 {
    (p1.y - p0.y).atan2(p1.x - p0.x)
}

/// Oriented smallest angle between the vectors `tail -> tip1` and `tail -> tip2`, in
/// `(-pi, pi]`. Positive values mean the second vector is counterclockwise from the first.
pub fn angle_between_oriented(tip1: &Coordinate, tail: &Coordinate, tip2: &Coordinate) -> f64 {
    let a1 = angle(tail, tip1);
    let a2 = angle(tail, tip2);
    let ang = a2 - a1;

    if ang <= -PI {
        ang + 2.0 * PI
    } else if ang > PI {
        ang - 2.0 * PI
    } else {
        ang
    }
}

/// Unoriented angle at `tail` between the two vectors, in `[0, pi]`.
pub fn angle_between(tip1: &Coordinate, tail: &Coordinate, tip2: &Coordinate) -> f64 {
    angle_between_oriented(tip1, tail, tip2).abs()
}

/// Normalizes the angle to the `[0, 2pi)` range.
pub fn normalize_positive(angle: f64) -> f64 {
    let a = angle % (2.0 * PI);
    if a < 0.0 {
        a + 2.0 * PI
    } else {
        a
    }
}
