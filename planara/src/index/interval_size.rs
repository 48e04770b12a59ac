//! Helpers that detect when a floating point interval is too narrow to subdivide.

/// Intervals narrower than `2^MIN_BINARY_EXPONENT` relative to their magnitude are treated as
/// having zero width. This leaves a safety margin of a few bits of the 52 bit mantissa.
pub const MIN_BINARY_EXPONENT: i32 = -50;

const EXPONENT_BIAS: i64 = 1023;

/// Unbiased binary exponent of the number, as stored in its IEEE 754 representation.
///
/// Zero and subnormal numbers give `-1023`.
pub fn exponent(value: f64) -> i32 {
    let bits = value.to_bits() as i64;
    (((bits >> 52) & 0x7ff) - EXPONENT_BIAS) as i32
}

/// `2^exp` for exponents representable as a normal double.
pub fn power_of_2(exp: i32) -> f64 {
    2f64.powi(exp)
}

/// Whether the interval `[min, max]` is too narrow to be reliably subdivided.
///
/// This is the case when its width is zero or negligible compared to the magnitude of its
/// bounds.
pub fn is_zero_width(min: f64, max: f64) -> bool {
    let width = max - min;
    if width == 0.0 {
        return true;
    }

    let max_abs = min.abs().max(max.abs());
    let scaled_interval = width / max_abs;
    exponent(scaled_interval) <= MIN_BINARY_EXPONENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponents() {
        assert_eq!(exponent(1.0), 0);
        assert_eq!(exponent(3.0), 1);
        assert_eq!(exponent(0.5), -1);
        assert_eq!(exponent(1024.0), 10);
        assert_eq!(exponent(0.0), -1023);
        assert_eq!(power_of_2(-3), 0.125);
        assert_eq!(power_of_2(10), 1024.0);
    }

    #[test]
    fn zero_width() {
        assert!(is_zero_width(1.0, 1.0));
        assert!(is_zero_width(1000.0, 1000.0 + 1e-12));
        assert!(!is_zero_width(1000.0, 1000.1));
        assert!(!is_zero_width(0.0, 1e-300));
    }
}
