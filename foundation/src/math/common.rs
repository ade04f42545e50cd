//! Common

use num_traits::Num;
use std::ops::{Add, Mul, Neg};

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// Value used where a reciprocal of zero is requested.
pub const MATH_HUGE: Float = INFINITY;

/// PI (π)
pub const PI: Float = std::f32::consts::PI;

/// PI/180 (π/180)
pub const DEGREES: Float = PI / 180.0;

/// Values whose magnitude is below this are treated as zero (2^-20).
pub const MATH_TINY: Float = 9.536_743e-7;

/// Tolerance used for unit length and orthogonality checks on directions.
pub const GEOMETRY_EPSILON: Float = 1.0e-4;

/// Machine Epsilon
pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;

/// Converts an angle in degrees to radians.
///
/// * `d` - Angle in degrees.
#[inline(always)]
pub fn degrees(d: Float) -> Float {
    d * DEGREES
}

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Returns the minimum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Returns `v^2`.
///
/// * `v` - The value.
#[inline(always)]
pub fn sqr<T: Mul<T, Output = T> + Copy>(v: T) -> T {
    v * v
}

/// Linearly interpolate between two points for parameters in [0, 1] and
/// extrapolate for parameters outside that interval.
///
/// * `t` - Parameter.
/// * `p0` - Point at t=0.
/// * `p1` - Point at t=1.
#[inline(always)]
pub fn lerp<P>(t: Float, p0: P, p1: P) -> P
where
    Float: Mul<P, Output = P>,
    P: Add<P, Output = P>,
{
    (1.0 - t) * p0 + t * p1
}

/// Returns true if the magnitude of `x` is below `MATH_TINY`.
///
/// * `x` - The value.
#[inline(always)]
pub fn is_tiny(x: Float) -> bool {
    abs(x) < MATH_TINY
}

/// Returns true if `x` lies in [0, 1].
///
/// * `x` - The value.
#[inline(always)]
pub fn is_unit_range(x: Float) -> bool {
    (0.0..=1.0).contains(&x)
}

/// Checks whether two values are equal within a relative error.
///
/// * `a`                  - First value.
/// * `b`                  - Second value.
/// * `max_relative_error` - Allowed error relative to the larger magnitude.
pub fn dd_equal(a: Float, b: Float, max_relative_error: Float) -> bool {
    let margin = max_relative_error * max(abs(a), abs(b));
    float_cmp::approx_eq!(Float, a, b, epsilon = max(margin, MATH_TINY))
}

/// Convert a 32-bit floating point value to its constituent bits and
/// return the representation as 32-bit unsigned integer.
///
/// * `f` - The 32-bit floating point number.
#[inline(always)]
pub fn float_to_bits(f: f32) -> u32 {
    f.to_bits()
}

/// Convert the bits of a 32-bit unsigned interger value and return the
/// representation as a 32-bit floating point value.
///
/// * `i` - The 32-bit unsigned interger.
#[inline(always)]
pub fn bits_to_float(i: u32) -> f32 {
    f32::from_bits(i)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn degrees_to_radians() {
        assert!(float_cmp::approx_eq!(Float, degrees(180.0), PI, ulps = 2));
        assert!(float_cmp::approx_eq!(Float, degrees(3.0), 0.05235988, epsilon = 1e-7));
    }

    #[test]
    fn tiny_values() {
        assert!(is_tiny(0.0));
        assert!(is_tiny(-1e-8));
        assert!(!is_tiny(1e-3));
    }

    #[test]
    fn relative_equality() {
        assert!(dd_equal(1000.0, 1000.1, 1e-3));
        assert!(!dd_equal(1000.0, 1002.0, 1e-3));
        assert!(dd_equal(0.0, 1e-8, 1e-3));
    }

    proptest! {
        #[test]
        fn bits_round_trip(f in -1000.0..1000.0f32) {
            prop_assert_eq!(bits_to_float(float_to_bits(f)), f);
        }

        #[test]
        fn lerp_end_points(a in -100.0..100.0f32, b in -100.0..100.0f32) {
            prop_assert_eq!(lerp(0.0, a, b), a);
            prop_assert_eq!(lerp(1.0, a, b), b);
        }
    }
}
