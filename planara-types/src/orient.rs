use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Relative error bound of the floating point orientation determinant. Determinants larger than
/// this share of their terms have a reliable sign.
const DP_SAFE_EPSILON: f64 = 1e-15;

/// Orientation of a triplet of points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Clockwise
    Clockwise,
    /// Counterclockwise
    Counterclockwise,
    /// Collinear
    Collinear,
}

impl Orientation {
    /// Determines the orientation of the point `q` relative to the directed segment `p1`-`p2`.
    ///
    /// `Counterclockwise` means `q` is to the left of the segment, `Clockwise` to the right.
    /// The result is exact: a fast floating point filter is used first, and if its result is
    /// unreliable the determinant is re-evaluated in double-double arithmetic.
    pub fn index(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> Self {
        let sign = match orientation_filter(p1, p2, q) {
            Some(sign) => sign,
            None => orientation_dd(p1, p2, q),
        };
        Self::from_sign(sign)
    }

    /// Same as [`Orientation::index`], with the points named as a corner `p -> q -> r`.
    pub fn triplet(p: &Coordinate, q: &Coordinate, r: &Coordinate) -> Self {
        Self::index(p, q, r)
    }

    /// Converts a determinant sign into orientation.
    pub fn from_sign(sign: i32) -> Self {
        match sign {
            s if s > 0 => Self::Counterclockwise,
            s if s < 0 => Self::Clockwise,
            _ => Self::Collinear,
        }
    }

    /// `1` for counterclockwise, `-1` for clockwise and `0` for collinear.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Counterclockwise => 1,
            Self::Clockwise => -1,
            Self::Collinear => 0,
        }
    }
}

/// Tests if the point `p` lies strictly inside the circumcircle of the triangle `a`, `b`, `c`,
/// where the triangle is oriented counterclockwise.
///
/// Evaluated in double-double arithmetic so that nearly co-circular points give the correct
/// answer.
pub fn is_in_circle_robust(a: &Coordinate, b: &Coordinate, c: &Coordinate, p: &Coordinate) -> bool {
    let adx = DD::from(a.x) - DD::from(p.x);
    let ady = DD::from(a.y) - DD::from(p.y);
    let bdx = DD::from(b.x) - DD::from(p.x);
    let bdy = DD::from(b.y) - DD::from(p.y);
    let cdx = DD::from(c.x) - DD::from(p.x);
    let cdy = DD::from(c.y) - DD::from(p.y);

    let abdet = adx * bdy - bdx * ady;
    let bcdet = bdx * cdy - cdx * bdy;
    let cadet = cdx * ady - adx * cdy;
    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let sum = alift * bcdet + blift * cadet + clift * abdet;
    sum.signum() > 0
}

fn orientation_filter(pa: &Coordinate, pb: &Coordinate, pc: &Coordinate) -> Option<i32> {
    let detleft = (pa.x - pc.x) * (pb.y - pc.y);
    let detright = (pa.y - pc.y) * (pb.x - pc.x);
    let det = detleft - detright;

    let detsum = if detleft > 0.0 {
        if detright <= 0.0 {
            return Some(signum(det));
        }
        detleft + detright
    } else if detleft < 0.0 {
        if detright >= 0.0 {
            return Some(signum(det));
        }
        -detleft - detright
    } else {
        return Some(signum(det));
    };

    let errbound = DP_SAFE_EPSILON * detsum;
    if det >= errbound || -det >= errbound {
        return Some(signum(det));
    }

    None
}

fn orientation_dd(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> i32 {
    let dx1 = DD::from(p2.x) - DD::from(p1.x);
    let dy1 = DD::from(p2.y) - DD::from(p1.y);
    let dx2 = DD::from(q.x) - DD::from(p2.x);
    let dy2 = DD::from(q.y) - DD::from(p2.y);

    (dx1 * dy2 - dy1 * dx2).signum()
}

fn signum(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Double-double number: an unevaluated sum of two doubles giving about 106 bits of mantissa.
#[derive(Debug, Copy, Clone)]
struct DD {
    hi: f64,
    lo: f64,
}

impl From<f64> for DD {
    fn from(hi: f64) -> Self {
        Self { hi, lo: 0.0 }
    }
}

impl DD {
    fn signum(self) -> i32 {
        if self.hi > 0.0 {
            1
        } else if self.hi < 0.0 {
            -1
        } else {
            signum(self.lo)
        }
    }
}

fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    (s, b - (s - a))
}

fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

impl std::ops::Add for DD {
    type Output = DD;

    fn add(self, rhs: DD) -> DD {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let (t, f) = two_sum(self.lo, rhs.lo);
        let (s, e) = quick_two_sum(s, e + t);
        let (hi, lo) = quick_two_sum(s, e + f);
        DD { hi, lo }
    }
}

impl std::ops::Neg for DD {
    type Output = DD;

    fn neg(self) -> DD {
        DD {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl std::ops::Sub for DD {
    type Output = DD;

    fn sub(self, rhs: DD) -> DD {
        self + (-rhs)
    }
}

impl std::ops::Mul for DD {
    type Output = DD;

    fn mul(self, rhs: DD) -> DD {
        let (p, e) = two_prod(self.hi, rhs.hi);
        let e = e + (self.hi * rhs.lo + self.lo * rhs.hi);
        let (hi, lo) = quick_two_sum(p, e);
        DD { hi, lo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_orientation() {
        let p1 = Coordinate::new(0.0, 0.0);
        let p2 = Coordinate::new(10.0, 0.0);
        assert_eq!(
            Orientation::index(&p1, &p2, &Coordinate::new(5.0, 1.0)),
            Orientation::Counterclockwise
        );
        assert_eq!(
            Orientation::index(&p1, &p2, &Coordinate::new(5.0, -1.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            Orientation::index(&p1, &p2, &Coordinate::new(20.0, 0.0)),
            Orientation::Collinear
        );
    }

    #[test]
    fn orientation_is_consistent_for_nearly_collinear_points() {
        // Points that naive floating point evaluation classifies inconsistently.
        let p1 = Coordinate::new(0.5, 0.5);
        let p2 = Coordinate::new(12.0, 12.0);
        let q = Coordinate::new(24.0, 24.0);
        assert_eq!(Orientation::index(&p1, &p2, &q), Orientation::Collinear);

        let a = Coordinate::new(219.3649559090992, 140.84159161824724);
        let b = Coordinate::new(168.9018919682399, -5.713787599646864);
        let c = Coordinate::new(186.80814046338352, 46.28973405831556);
        let abc = Orientation::index(&a, &b, &c);
        let bca = Orientation::index(&b, &c, &a);
        let cab = Orientation::index(&c, &a, &b);
        assert_eq!(abc, bca);
        assert_eq!(bca, cab);
    }

    fn naive_determinant(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> f64 {
        (p2.x - p1.x) * (q.y - p2.y) - (p2.y - p1.y) * (q.x - p2.x)
    }

    #[test]
    fn orientation_sign_is_exact_where_floating_point_fails() {
        // Rounding flips the sign of the plain determinant.
        let a = Coordinate::new(878.576864270565, 487.6842373342422);
        let b = Coordinate::new(-167.655474469949, -495.2837954403293);
        let c = Coordinate::new(869.7045394400674, 479.3484104229176);
        assert!(naive_determinant(&a, &b, &c) < 0.0);
        assert_eq!(Orientation::index(&a, &b, &c), Orientation::Counterclockwise);
        assert_eq!(Orientation::index(&b, &a, &c), Orientation::Clockwise);

        // Rounding cancels the determinant to zero.
        let p = Coordinate::new(0.5, 0.5000000000000001);
        let q = Coordinate::new(12.0, 12.0);
        let r = Coordinate::new(24.0, 24.0);
        assert_eq!(naive_determinant(&p, &q, &r), 0.0);
        assert_eq!(Orientation::index(&p, &q, &r), Orientation::Counterclockwise);
    }

    #[test]
    fn in_circle() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(2.0, 0.0);
        let c = Coordinate::new(0.0, 2.0);
        assert!(is_in_circle_robust(&a, &b, &c, &Coordinate::new(1.0, 1.0)));
        assert!(!is_in_circle_robust(&a, &b, &c, &Coordinate::new(3.0, 3.0)));
        // Co-circular point is not strictly inside.
        assert!(!is_in_circle_robust(&a, &b, &c, &Coordinate::new(2.0, 2.0)));
    }
}
