//! Sampled Spectrum.

use crate::math::*;
use itertools::Itertools;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// A spectral sample with one value per channel of the active ISR.
///
/// The number of channels is only known at runtime. All binary operations
/// require both operands to have the same number of channels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    /// The sampled spectral values.
    c: Vec<Float>,
}

impl Spectrum {
    /// Create a new `Spectrum` with a constant value across all channels.
    ///
    /// * `channels` - Number of channels.
    /// * `v`        - Constant value.
    pub fn new(channels: usize, v: Float) -> Self {
        Self {
            c: vec![v; channels],
        }
    }

    /// Create a new `Spectrum` with all values set to 0.
    ///
    /// * `channels` - Number of channels.
    pub fn zero(channels: usize) -> Self {
        Self::new(channels, 0.0)
    }

    /// Create a new `Spectrum` with all values set to 1.
    ///
    /// * `channels` - Number of channels.
    pub fn one(channels: usize) -> Self {
        Self::new(channels, 1.0)
    }

    /// Returns the number of channels.
    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.c.len()
    }

    /// Returns the stored samples.
    #[inline(always)]
    pub fn samples(&self) -> &[Float] {
        &self.c
    }

    /// Returns stored samples as mutable.
    #[inline(always)]
    pub fn samples_mut(&mut self) -> &mut [Float] {
        &mut self.c
    }

    /// Sets all channels to a constant value.
    ///
    /// * `v` - The value.
    pub fn set_all(&mut self, v: Float) {
        self.c.iter_mut().for_each(|s| *s = v);
    }

    /// Returns true if any value is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if the values are zero everywhere.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns true if no value is NaN or infinite.
    pub fn is_valid(&self) -> bool {
        self.c.iter().all(|v| v.is_finite())
    }

    /// Returns true if no value is below `-epsilon`.
    ///
    /// * `epsilon` - Tolerance for slightly negative values.
    pub fn is_nonnegative(&self, epsilon: Float) -> bool {
        self.c.iter().all(|v| *v >= -epsilon)
    }

    /// Applies a function to every value and returns the result.
    ///
    /// * `f` - The function.
    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self {
            c: self.c.iter().map(|v| f(*v)).collect(),
        }
    }

    /// Combines the values with those of another spectrum.
    ///
    /// * `other` - The other spectrum.
    /// * `f`     - The combining function.
    pub fn zip_map<F: Fn(Float, Float) -> Float>(&self, other: &Self, f: F) -> Self {
        assert_eq!(self.channels(), other.channels());
        Self {
            c: self
                .c
                .iter()
                .zip(other.c.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }

    /// Takes the square root of all sample values.
    pub fn sqrt(&self) -> Self {
        self.map(|v| v.sqrt())
    }

    /// Raises the sample values to a given power.
    ///
    /// * `p` - The power.
    pub fn pow(&self, p: Float) -> Self {
        self.map(|v| v.powf(p))
    }

    /// Raises the sample values to a given negative power.
    ///
    /// * `p` - The power that is negated.
    pub fn negpow(&self, p: Float) -> Self {
        self.map(|v| v.powf(-p))
    }

    /// Raises a constant base to the power of each sample value.
    ///
    /// * `d` - The base.
    pub fn exp_base(&self, d: Float) -> Self {
        self.map(|v| d.powf(v))
    }

    /// Returns the reciprocal of each value. Zero maps to `MATH_HUGE`.
    pub fn inv(&self) -> Self {
        self.map(|v| if v == 0.0 { MATH_HUGE } else { 1.0 / v })
    }

    /// Returns `1 - v` for each value.
    pub fn complement_from_one(&self) -> Self {
        self.map(|v| 1.0 - v)
    }

    /// Returns `self + (other - self) * t`.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - Value at t=1.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        self.zip_map(other, |a, b| a + (b - a) * t)
    }

    /// Returns `d * self + other`.
    ///
    /// * `d`     - Scale factor.
    /// * `other` - The spectrum added after scaling.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        self.zip_map(other, |a, b| d * a + b)
    }

    /// Returns the channelwise minimum with another spectrum.
    ///
    /// * `other` - The other spectrum.
    pub fn min_with(&self, other: &Self) -> Self {
        self.zip_map(other, min)
    }

    /// Returns the channelwise maximum with another spectrum.
    ///
    /// * `other` - The other spectrum.
    pub fn max_with(&self, other: &Self) -> Self {
        self.zip_map(other, max)
    }

    /// Returns the average value.
    pub fn avg(&self) -> Float {
        if self.c.is_empty() {
            0.0
        } else {
            self.c.iter().sum::<Float>() / self.c.len() as Float
        }
    }

    /// Returns the maximum sample value.
    pub fn max(&self) -> Float {
        self.c.iter().fold(-INFINITY, |m, v| max(m, *v))
    }

    /// Returns the minimum sample value.
    pub fn min(&self) -> Float {
        self.c.iter().fold(INFINITY, |m, v| min(m, *v))
    }

    /// Returns the sum of absolute values.
    pub fn l1_norm(&self) -> Float {
        self.c.iter().map(|v| abs(*v)).sum()
    }

    /// Returns the largest absolute difference to another spectrum.
    ///
    /// * `other` - The other spectrum.
    pub fn max_diff(&self, other: &Self) -> Float {
        assert_eq!(self.channels(), other.channels());
        self.c
            .iter()
            .zip(other.c.iter())
            .fold(0.0, |m, (a, b)| max(m, abs(a - b)))
    }

    /// Returns true if all values are within a relative error of another
    /// spectrum.
    ///
    /// * `other`              - The other spectrum.
    /// * `max_relative_error` - Allowed relative error.
    pub fn approx_equal(&self, other: &Self, max_relative_error: Float) -> bool {
        self.channels() == other.channels()
            && self
                .c
                .iter()
                .zip(other.c.iter())
                .all(|(a, b)| dd_equal(*a, *b, max_relative_error))
    }

    /// Adds the sample values from another SPD in place.
    ///
    /// * `other` - The other SPD.
    fn add_in_place(&mut self, other: &Self) {
        debug_assert!(!self.has_nans());
        assert_eq!(self.channels(), other.channels());
        for (s, o) in self.c.iter_mut().zip(other.c.iter()) {
            *s += *o;
        }
    }

    /// Subtract the sample values from another SPD in place.
    ///
    /// * `other` - The other SPD.
    fn sub_in_place(&mut self, other: &Self) {
        debug_assert!(!self.has_nans());
        assert_eq!(self.channels(), other.channels());
        for (s, o) in self.c.iter_mut().zip(other.c.iter()) {
            *s -= *o;
        }
    }

    /// Multiplies the sample values from another SPD in place.
    ///
    /// * `other` - The other SPD.
    fn mul_in_place(&mut self, other: &Self) {
        debug_assert!(!self.has_nans());
        assert_eq!(self.channels(), other.channels());
        for (s, o) in self.c.iter_mut().zip(other.c.iter()) {
            *s *= *o;
        }
    }

    /// Divides the sample values from another SPD in place.
    ///
    /// * `other` - The other SPD.
    fn div_in_place(&mut self, other: &Self) {
        debug_assert!(!self.has_nans());
        assert_eq!(self.channels(), other.channels());
        for (s, o) in self.c.iter_mut().zip(other.c.iter()) {
            *s /= *o;
        }
    }

    /// Scales the sample values by a constant factor in place.
    ///
    /// * `f` - The factor.
    pub fn scale(&mut self, f: Float) {
        for s in self.c.iter_mut() {
            *s *= f;
        }
    }
}

impl From<Vec<Float>> for Spectrum {
    /// Create a new `Spectrum` from sampled spectral values.
    ///
    /// * `c` - Sample values.
    fn from(c: Vec<Float>) -> Self {
        Self { c }
    }
}

impl From<&[Float]> for Spectrum {
    /// Create a new `Spectrum` from sampled spectral values.
    ///
    /// * `c` - Sample values.
    fn from(c: &[Float]) -> Self {
        Self { c: c.to_vec() }
    }
}

impl Add for Spectrum {
    type Output = Self;

    /// Adds the sample values of another SPD and returns a new SPD.
    ///
    /// * `other` - The other SPD.
    fn add(mut self, other: Self) -> Self::Output {
        self.add_in_place(&other);
        self
    }
}

impl Add<&Spectrum> for &Spectrum {
    type Output = Spectrum;

    /// Adds the sample values of another SPD and returns a new SPD.
    ///
    /// * `other` - The other SPD.
    fn add(self, other: &Spectrum) -> Self::Output {
        let mut ret = self.clone();
        ret.add_in_place(other);
        ret
    }
}

impl AddAssign<&Spectrum> for Spectrum {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The other SPD.
    fn add_assign(&mut self, other: &Spectrum) {
        self.add_in_place(other);
    }
}

impl AddAssign for Spectrum {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The other SPD.
    fn add_assign(&mut self, other: Self) {
        self.add_in_place(&other);
    }
}

impl Sub for Spectrum {
    type Output = Self;

    /// Subtracts the sample values of another SPD and returns a new SPD.
    ///
    /// * `other` - The other SPD.
    fn sub(mut self, other: Self) -> Self::Output {
        self.sub_in_place(&other);
        self
    }
}

impl Sub<&Spectrum> for &Spectrum {
    type Output = Spectrum;

    /// Subtracts the sample values of another SPD and returns a new SPD.
    ///
    /// * `other` - The other SPD.
    fn sub(self, other: &Spectrum) -> Self::Output {
        let mut ret = self.clone();
        ret.sub_in_place(other);
        ret
    }
}

impl SubAssign<&Spectrum> for Spectrum {
    /// Performs the `-=` operation.
    ///
    /// * `other` - The other SPD.
    fn sub_assign(&mut self, other: &Spectrum) {
        self.sub_in_place(other);
    }
}

impl Mul for Spectrum {
    type Output = Self;

    /// Multiplies the sample values of another SPD and returns a new SPD.
    ///
    /// * `other` - The other SPD.
    fn mul(mut self, other: Self) -> Self::Output {
        self.mul_in_place(&other);
        self
    }
}

impl Mul<&Spectrum> for &Spectrum {
    type Output = Spectrum;

    /// Multiplies the sample values of another SPD and returns a new SPD.
    ///
    /// * `other` - The other SPD.
    fn mul(self, other: &Spectrum) -> Self::Output {
        let mut ret = self.clone();
        ret.mul_in_place(other);
        ret
    }
}

impl Mul<Float> for Spectrum {
    type Output = Self;

    /// Scales the sample values by a constant and returns a new SPD.
    ///
    /// * `f` - The scaling factor.
    fn mul(mut self, f: Float) -> Self::Output {
        self.scale(f);
        self
    }
}

impl Mul<Float> for &Spectrum {
    type Output = Spectrum;

    /// Scales the sample values by a constant and returns a new SPD.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        let mut ret = self.clone();
        ret.scale(f);
        ret
    }
}

impl Mul<Spectrum> for Float {
    type Output = Spectrum;

    /// Scales the sample values by a constant and returns a new SPD.
    ///
    /// * `s` - The SPD.
    fn mul(self, s: Spectrum) -> Self::Output {
        s * self
    }
}

impl Mul<&Spectrum> for Float {
    type Output = Spectrum;

    /// Scales the sample values by a constant and returns a new SPD.
    ///
    /// * `s` - The SPD.
    fn mul(self, s: &Spectrum) -> Self::Output {
        s * self
    }
}

impl MulAssign<&Spectrum> for Spectrum {
    /// Performs the `*=` operation.
    ///
    /// * `other` - The other SPD.
    fn mul_assign(&mut self, other: &Spectrum) {
        self.mul_in_place(other);
    }
}

impl MulAssign<Float> for Spectrum {
    /// Performs the `*=` operation.
    ///
    /// * `f` - The scaling factor.
    fn mul_assign(&mut self, f: Float) {
        self.scale(f);
    }
}

impl Div<&Spectrum> for &Spectrum {
    type Output = Spectrum;

    /// Divides the sample values by those of another SPD and returns a new
    /// SPD.
    ///
    /// * `other` - The other SPD.
    fn div(self, other: &Spectrum) -> Self::Output {
        let mut ret = self.clone();
        ret.div_in_place(other);
        ret
    }
}

impl Div<Float> for &Spectrum {
    type Output = Spectrum;

    /// Divides the sample values by a constant and returns a new SPD.
    ///
    /// * `f` - The divisor.
    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        let mut ret = self.clone();
        ret.scale(1.0 / f);
        ret
    }
}

impl DivAssign<Float> for Spectrum {
    /// Performs the `/=` operation.
    ///
    /// * `f` - The divisor.
    fn div_assign(&mut self, f: Float) {
        debug_assert!(f != 0.0);
        self.scale(1.0 / f);
    }
}

impl Neg for Spectrum {
    type Output = Self;

    /// Scales the sample values by -1.
    fn neg(mut self) -> Self::Output {
        self.scale(-1.0);
        self
    }
}

impl Index<usize> for Spectrum {
    type Output = Float;

    /// Index the SPD to get the immutable sample value.
    ///
    /// * `index` - Channel index.
    fn index(&self, index: usize) -> &Self::Output {
        &self.c[index]
    }
}

impl IndexMut<usize> for Spectrum {
    /// Index the SPD to get the mutable sample value.
    ///
    /// * `index` - Channel index.
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.c[index]
    }
}

impl Clamp<Float> for Spectrum {
    /// Clamps the sample values to given [low, high] interval.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        self.map(|v| clamp(v, low, high))
    }
}

impl fmt::Display for Spectrum {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.c.iter().join(", "))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
