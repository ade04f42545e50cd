//! Crosstalk of the internal spectral representation

use super::{crosstalk_entries, crosstalk_index};
use foundation::math::*;
use foundation::spectrum::Spectrum;
use itertools::iproduct;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

/// Fluorescence transfer matrix for the channels of an ISR.
#[derive(Clone, Debug, PartialEq)]
pub struct Crosstalk {
    /// Number of spectral channels.
    channels: usize,

    /// Lower triangle entries, row by row.
    x: Vec<Float>,
}

impl Crosstalk {
    /// Create a new zero `Crosstalk`.
    ///
    /// * `channels` - Number of spectral channels.
    pub fn new(channels: usize) -> Self {
        Self::from_value(channels, 0.0)
    }

    /// Create a new `Crosstalk` with all entries set to a constant.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `d`        - Non-negative entry value.
    pub fn from_value(channels: usize, d: Float) -> Self {
        foundation_assert!(d >= 0.0, "d = {}", d);
        Self {
            channels,
            x: vec![d; crosstalk_entries(channels)],
        }
    }

    /// Create a new `Crosstalk` from lower triangle entries stored row by row.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `x`        - The entries.
    pub fn from_entries(channels: usize, x: Vec<Float>) -> Self {
        foundation_assert!(
            x.len() == crosstalk_entries(channels),
            "{} entries for {} channels",
            x.len(),
            channels
        );
        Self { channels, x }
    }

    /// Shared zero crosstalk. Not available yet.
    pub fn none() -> &'static Self {
        work_in_progress!()
    }

    /// Returns the number of spectral channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the lower triangle entries.
    pub fn entries(&self) -> &[Float] {
        &self.x
    }

    /// Returns the fraction of energy moved from channel `x` to channel `y`.
    /// Entries on or above the diagonal are 0.
    ///
    /// * `x` - Excitation channel.
    /// * `y` - Emission channel.
    pub fn xy(&self, x: usize, y: usize) -> Float {
        if y > x && y < self.channels {
            self.x[crosstalk_index(x, y)]
        } else {
            0.0
        }
    }

    /// Sets the fraction of energy moved from channel `x` to channel `y`.
    ///
    /// * `x` - Excitation channel.
    /// * `y` - Emission channel; must be greater than `x`.
    /// * `v` - The value.
    pub fn set_xy(&mut self, x: usize, y: usize, v: Float) {
        foundation_assert!(
            y > x && y < self.channels,
            "({}, {}) outside lower triangle of {} channels",
            x,
            y,
            self.channels
        );
        self.x[crosstalk_index(x, y)] = v;
    }

    /// Matrix norm. Not available yet.
    pub fn norm(&self) -> Float {
        work_in_progress!()
    }

    /// Returns the smallest entry.
    pub fn min(&self) -> Float {
        let m = self.x.iter().fold(INFINITY, |m, v| min(m, *v));
        let m = if self.x.is_empty() { 0.0 } else { m };
        foundation_assert!(m >= 0.0, "min = {}", m);
        m
    }

    /// Returns the largest entry.
    pub fn max(&self) -> Float {
        let m = self.x.iter().fold(0.0, |m, v| max(m, *v));
        foundation_assert!(m >= 0.0, "max = {}", m);
        m
    }

    /// Returns the average entry.
    pub fn avg(&self) -> Float {
        let m = if self.x.is_empty() {
            0.0
        } else {
            self.x.iter().sum::<Float>() / self.x.len() as Float
        };
        foundation_assert!(m >= 0.0, "avg = {}", m);
        m
    }

    /// Scales all entries in place.
    ///
    /// * `d` - Non-negative factor.
    pub fn scale(&mut self, d: Float) {
        foundation_assert!(d >= 0.0, "d = {}", d);
        self.x.iter_mut().for_each(|v| *v *= d);
    }

    /// Multiplies each emission row with the filter value of its channel,
    /// so that the re-emitted energy is filtered like the direct part.
    ///
    /// * `s` - Non-negative filter spectrum.
    pub fn mul_spectrum(&mut self, s: &Spectrum) {
        foundation_assert!(
            s.channels() == self.channels,
            "{} channels applied to crosstalk of {}",
            s.channels(),
            self.channels
        );
        for i in 1..self.channels {
            let start = crosstalk_index(0, i);
            self.x[start..start + i].iter_mut().for_each(|v| *v *= s[i]);
        }
    }

    /// Returns `d * self + other`.
    ///
    /// * `d`     - Non-negative factor.
    /// * `other` - The crosstalk added after scaling.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        foundation_assert!(d >= 0.0, "d = {}", d);
        self.zip_map(other, |a, b| d * a + b)
    }

    /// Raises every entry to a power.
    ///
    /// * `p` - The power.
    pub fn pow(&self, p: Float) -> Self {
        self.map(|v| v.powf(p))
    }

    /// Raises every entry to a negated power.
    ///
    /// * `p` - The power that is negated.
    pub fn negpow(&self, p: Float) -> Self {
        self.map(|v| v.powf(-p))
    }

    /// Raises a constant base to the power of every entry.
    ///
    /// * `d` - The base.
    pub fn exp_base(&self, d: Float) -> Self {
        self.map(|v| d.powf(v))
    }

    /// Raises a constant base to the negated power of every entry.
    ///
    /// * `d` - The base.
    pub fn exp_base_neg(&self, d: Float) -> Self {
        self.map(|v| d.powf(-v))
    }

    /// Returns `self + (other - self) * t`.
    ///
    /// * `t`     - Interpolation parameter in [0, 1].
    /// * `other` - Value at t=1.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        foundation_assert!(is_unit_range(t), "t = {}", t);
        self.zip_map(other, |a, b| a + (b - a) * t)
    }

    /// Returns `-v` for every entry. The result is not a valid crosstalk and
    /// only serves as an intermediate of attenuation differences.
    pub fn negated(&self) -> Self {
        self.map(|v| -v)
    }

    /// Returns `1 - v` for every entry.
    pub fn complement_from_one(&self) -> Self {
        self.map(|v| 1.0 - v)
    }

    /// Returns a crosstalk that keeps `1 - v` for the emission row of channel
    /// `i0` and is zero everywhere else.
    ///
    /// * `i0` - Emission channel.
    pub fn singleband_complement_from_one(&self, i0: usize) -> Self {
        foundation_assert!(i0 < self.channels, "i0 = {}", i0);
        let mut ret = Self::new(self.channels);
        for x in 0..i0 {
            ret.set_xy(x, i0, 1.0 - self.xy(x, i0));
        }
        ret
    }

    /// Overwrites the emission row of channel `i0` with the scaled row of
    /// another crosstalk. Other rows are left unchanged.
    ///
    /// * `d`      - Non-negative factor.
    /// * `i0`     - Emission channel.
    /// * `source` - The crosstalk the row is copied from.
    pub fn singleband_mul_copy(&mut self, d: Float, i0: usize, source: &Self) {
        foundation_assert!(d >= 0.0, "d = {}", d);
        foundation_assert!(i0 < self.channels, "i0 = {}", i0);
        for x in 0..i0 {
            self.set_xy(x, i0, d * source.xy(x, i0));
        }
    }

    /// Divides every entry by a constant.
    ///
    /// * `d` - Non-zero divisor.
    pub fn cw_div(&mut self, d: Float) {
        foundation_assert!(d != 0.0, "d = {}", d);
        self.x.iter_mut().for_each(|v| *v /= d);
    }

    /// Returns the reciprocal of every entry. Zero entries map to
    /// `MATH_HUGE`.
    pub fn inv(&self) -> Self {
        self.map(|v| if v == 0.0 { MATH_HUGE } else { 1.0 / v })
    }

    /// Returns true if every entry is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        let valid = self.x.len() == crosstalk_entries(self.channels)
            && self.x.iter().all(|v| v.is_finite() && *v >= 0.0);
        if !valid {
            warn!("at least one component of crosstalk data is invalid (negative, NaN or Inf)");
        }
        valid
    }

    /// Returns true if all entries are within a relative error of another
    /// crosstalk.
    ///
    /// * `other`              - The other crosstalk.
    /// * `max_relative_error` - Allowed relative error.
    pub fn approx_equal(&self, other: &Self, max_relative_error: Float) -> bool {
        self.channels == other.channels
            && self
                .x
                .iter()
                .zip(other.x.iter())
                .all(|(a, b)| dd_equal(*a, *b, max_relative_error))
    }

    /// Returns the energy re-emitted into each channel, i.e. the strictly
    /// lower triangle applied to a spectrum.
    ///
    /// * `s` - The incoming spectrum.
    pub fn redistribute(&self, s: &Spectrum) -> Spectrum {
        foundation_assert!(
            s.channels() == self.channels,
            "{} channels applied to crosstalk of {}",
            s.channels(),
            self.channels
        );
        let mut ret = Spectrum::zero(self.channels);
        for i in 1..self.channels {
            let row = &self.x[crosstalk_index(0, i)..crosstalk_index(0, i) + i];
            ret[i] = row
                .iter()
                .zip(s.samples().iter())
                .fold(0.0, |acc, (x, l)| acc + l * x);
        }
        ret
    }

    /// Applies a full fluorescent transfer, diagonal plus crosstalk, to a
    /// spectrum.
    ///
    /// * `direct` - The diagonal of the transfer matrix.
    /// * `s`      - The incoming spectrum.
    pub fn apply(&self, direct: &Spectrum, s: &Spectrum) -> Spectrum {
        let mut ret = direct * s;
        ret += &self.redistribute(s);
        ret
    }

    fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self {
            channels: self.channels,
            x: self.x.iter().map(|v| f(*v)).collect(),
        }
    }

    fn zip_map<F: Fn(Float, Float) -> Float>(&self, other: &Self, f: F) -> Self {
        foundation_assert!(
            self.channels == other.channels,
            "crosstalk of {} and {} channels",
            self.channels,
            other.channels
        );
        Self {
            channels: self.channels,
            x: self
                .x
                .iter()
                .zip(other.x.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }
}

/// Concatenates two fluorescent transfers where light passes the first one
/// and then the second. Both are expanded into dense lower triangular
/// matrices `M0` and `M1` and the result is `M1 * M0`, summed in ascending
/// order of the inner index. Missing crosstalk is treated as zero.
///
/// * `d0` - Diagonal of the first transfer.
/// * `x0` - Crosstalk of the first transfer.
/// * `d1` - Diagonal of the second transfer.
/// * `x1` - Crosstalk of the second transfer.
pub fn concatenate_fluorescent(
    d0: &Spectrum,
    x0: Option<&Crosstalk>,
    d1: &Spectrum,
    x1: Option<&Crosstalk>,
) -> (Spectrum, Crosstalk) {
    let n = d0.channels();
    let m0 = dense(d0, x0);
    let m1 = dense(d1, x1);

    let mut diagonal = Spectrum::zero(n);
    let mut crosstalk = Crosstalk::new(n);
    for (i, j) in iproduct!(0..n, 0..n).filter(|(i, j)| j <= i) {
        let v = (0..n).fold(0.0, |acc, k| acc + m1[i * n + k] * m0[k * n + j]);
        if i == j {
            diagonal[i] = v;
        } else {
            crosstalk.set_xy(j, i, v);
        }
    }
    (diagonal, crosstalk)
}

/// Expands a transfer into a dense row major `N x N` matrix where row `i`
/// collects the energy arriving in channel `i`.
fn dense(direct: &Spectrum, crosstalk: Option<&Crosstalk>) -> Vec<Float> {
    let n = direct.channels();
    let mut m = vec![0.0; n * n];
    for i in 0..n {
        m[i * n + i] = direct[i];
        if let Some(x) = crosstalk {
            for j in 0..i {
                m[i * n + j] = x.xy(j, i);
            }
        }
    }
    m
}

impl Add<&Crosstalk> for &Crosstalk {
    type Output = Crosstalk;

    /// Adds the entries of two crosstalk matrices.
    ///
    /// * `other` - The other crosstalk.
    fn add(self, other: &Crosstalk) -> Self::Output {
        self.zip_map(other, |a, b| a + b)
    }
}

impl AddAssign<&Crosstalk> for Crosstalk {
    /// Adds the entries of another crosstalk in place.
    ///
    /// * `other` - The other crosstalk.
    fn add_assign(&mut self, other: &Crosstalk) {
        *self = &*self + other;
    }
}

impl Sub<&Crosstalk> for &Crosstalk {
    type Output = Crosstalk;

    /// Subtracts the entries of two crosstalk matrices.
    ///
    /// * `other` - The other crosstalk.
    fn sub(self, other: &Crosstalk) -> Self::Output {
        self.zip_map(other, |a, b| a - b)
    }
}

impl Mul<Float> for &Crosstalk {
    type Output = Crosstalk;

    /// Scales the entries.
    ///
    /// * `d` - Non-negative factor.
    fn mul(self, d: Float) -> Self::Output {
        let mut ret = self.clone();
        ret.scale(d);
        ret
    }
}

impl MulAssign<Float> for Crosstalk {
    /// Scales the entries in place.
    ///
    /// * `d` - Non-negative factor.
    fn mul_assign(&mut self, d: Float) {
        self.scale(d);
    }
}

impl Clamp<Float> for Crosstalk {
    /// Clamps the entries to given [low, high] interval.
    ///
    /// * `low`  - Non-negative low value.
    /// * `high` - Non-negative high value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        foundation_assert!(low >= 0.0 && high >= 0.0, "[{}, {}]", low, high);
        self.map(|v| clamp(v, low, high))
    }
}

impl fmt::Display for Crosstalk {
    /// Formats the matrix row by row, including the zero upper triangle.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Crosstalk {}x{} {{", self.channels, self.channels)?;
        for y in 0..self.channels {
            let row: Vec<String> = (0..self.channels)
                .map(|x| format!("{:6.4}", self.xy(x, y)))
                .collect();
            writeln!(f, "  {{ {} }}", row.join(", "))?;
        }
        write!(f, "}}")
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::collection::vec;
    use proptest::prelude::*;

    const CHANNELS: usize = 4;

    prop_compose! {
        fn crosstalk()(x in vec(0.0..1.0f32, crosstalk_entries(CHANNELS))) -> Crosstalk {
            Crosstalk::from_entries(CHANNELS, x)
        }
    }

    prop_compose! {
        fn spectrum()(c in vec(0.0..2.0f32, CHANNELS)) -> Spectrum {
            Spectrum::from(c)
        }
    }

    fn ramp() -> Crosstalk {
        Crosstalk::from_entries(CHANNELS, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6])
    }

    #[test]
    fn lower_triangle_access() {
        let mut x = ramp();
        assert_eq!(x.xy(0, 1), 0.1);
        assert_eq!(x.xy(1, 2), 0.3);
        assert_eq!(x.xy(2, 3), 0.6);
        assert_eq!(x.xy(1, 1), 0.0);
        assert_eq!(x.xy(3, 0), 0.0);
        assert_eq!(x.xy(0, 4), 0.0);

        x.set_xy(0, 3, 0.9);
        assert_eq!(x.xy(0, 3), 0.9);
    }

    #[cfg(feature = "foundation-assertions")]
    #[test]
    #[should_panic]
    fn set_on_diagonal_is_fatal() {
        let mut x = ramp();
        x.set_xy(2, 2, 1.0);
    }

    #[cfg(feature = "foundation-assertions")]
    #[test]
    #[should_panic]
    fn negative_value_is_fatal() {
        Crosstalk::from_value(CHANNELS, -1.0);
    }

    #[test]
    #[should_panic(expected = "code is work in progress")]
    fn norm_is_work_in_progress() {
        ramp().norm();
    }

    #[test]
    #[should_panic(expected = "code is work in progress")]
    fn none_is_work_in_progress() {
        Crosstalk::none();
    }

    #[test]
    fn filter_scales_emission_rows() {
        let filter = Spectrum::from(vec![1.0, 0.5, 0.0, 2.0]);
        let mut x = ramp();
        x.mul_spectrum(&filter);
        assert_eq!(x.xy(0, 1), 0.05);
        assert_eq!(x.xy(0, 2), 0.0);
        assert_eq!(x.xy(1, 2), 0.0);
        assert_eq!(x.xy(2, 3), 1.2);
        assert_eq!(x.channels(), CHANNELS);

        let s = Spectrum::from(vec![1.0, 2.0, 3.0, 4.0]);
        let expected = &ramp().redistribute(&s) * &filter;
        for (a, b) in x.redistribute(&s).samples().iter().zip(expected.samples()) {
            assert!(approx_eq!(Float, *a, *b, epsilon = 1e-6));
        }
    }

    #[test]
    fn negated_entries_are_invalid() {
        let x = ramp().negated();
        assert_eq!(x.xy(1, 2), -0.3);
        assert!(!x.is_valid());
        assert_eq!(x.negated(), ramp());
    }

    #[test]
    fn reductions() {
        let x = ramp();
        assert_eq!(x.min(), 0.1);
        assert_eq!(x.max(), 0.6);
        assert!(approx_eq!(Float, x.avg(), 0.35, epsilon = 1e-6));

        let single = Crosstalk::new(1);
        assert_eq!(single.min(), 0.0);
        assert_eq!(single.max(), 0.0);
        assert_eq!(single.avg(), 0.0);
        assert!(single.is_valid());
    }

    #[test]
    fn inversion_maps_zero_to_huge() {
        let mut x = ramp();
        x.set_xy(0, 1, 0.0);
        let inv = x.inv();
        assert_eq!(inv.xy(0, 1), MATH_HUGE);
        assert!(approx_eq!(Float, inv.xy(0, 2), 5.0, epsilon = 1e-5));
        assert!(!inv.is_valid());
    }

    #[test]
    fn powers() {
        let x = Crosstalk::from_value(3, 0.25);
        assert!(approx_eq!(Float, x.pow(2.0).xy(0, 1), 0.0625, epsilon = 1e-6));
        assert!(approx_eq!(Float, x.negpow(1.0).xy(0, 2), 4.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, x.exp_base(16.0).xy(1, 2), 2.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, x.exp_base_neg(16.0).xy(1, 2), 0.5, epsilon = 1e-6));
    }

    #[test]
    fn singleband_complement_keeps_one_row() {
        let x = ramp().singleband_complement_from_one(2);
        assert!(approx_eq!(Float, x.xy(0, 2), 0.8, epsilon = 1e-6));
        assert!(approx_eq!(Float, x.xy(1, 2), 0.7, epsilon = 1e-6));
        assert_eq!(x.xy(0, 1), 0.0);
        assert_eq!(x.xy(0, 3), 0.0);
        assert_eq!(x.xy(2, 3), 0.0);
    }

    #[test]
    fn singleband_mul_copy_overwrites_one_row() {
        let mut x = Crosstalk::from_value(CHANNELS, 1.0);
        x.singleband_mul_copy(2.0, 3, &ramp());
        assert!(approx_eq!(Float, x.xy(0, 3), 0.8, epsilon = 1e-6));
        assert!(approx_eq!(Float, x.xy(1, 3), 1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, x.xy(2, 3), 1.2, epsilon = 1e-6));
        assert_eq!(x.xy(0, 1), 1.0);
        assert_eq!(x.xy(1, 2), 1.0);
    }

    #[test]
    fn componentwise_division() {
        let mut x = ramp();
        x.cw_div(0.5);
        assert!(approx_eq!(Float, x.xy(2, 3), 1.2, epsilon = 1e-6));
    }

    #[test]
    fn redistribution_moves_energy_to_longer_channels() {
        let x = ramp();
        let s = Spectrum::from(vec![1.0, 2.0, 0.0, 0.0]);
        let r = x.redistribute(&s);
        assert_eq!(r[0], 0.0);
        assert!(approx_eq!(Float, r[1], 0.1, epsilon = 1e-6));
        assert!(approx_eq!(Float, r[2], 0.2 + 0.6, epsilon = 1e-6));
        assert!(approx_eq!(Float, r[3], 0.4 + 1.0, epsilon = 1e-6));

        let direct = Spectrum::new(CHANNELS, 0.5);
        let a = x.apply(&direct, &s);
        assert!(approx_eq!(Float, a[0], 0.5, epsilon = 1e-6));
        assert!(approx_eq!(Float, a[1], 1.1, epsilon = 1e-6));
    }

    #[test]
    fn non_fluorescent_concatenation_is_diagonal_product() {
        let d0 = Spectrum::from(vec![0.5, 0.25, 1.0, 0.0]);
        let d1 = Spectrum::from(vec![0.5, 2.0, 0.5, 1.0]);
        let (d, x) = concatenate_fluorescent(&d0, None, &d1, None);
        assert_eq!(d.samples(), &[0.25, 0.5, 0.5, 0.0]);
        assert_eq!(x, Crosstalk::new(CHANNELS));
    }

    #[test]
    fn display_lists_full_matrix() {
        let s = format!("{}", Crosstalk::from_value(2, 0.5));
        assert!(s.starts_with("Crosstalk 2x2 {"));
        assert!(s.contains("0.5000"));
    }

    proptest! {
        #[test]
        fn combinators_keep_entries_valid(
            x0 in crosstalk(),
            x1 in crosstalk(),
            d in 0.0..10.0f32,
            t in 0.0..1.0f32,
        ) {
            prop_assert!((&x0 + &x1).is_valid());
            prop_assert!((&x0 * d).is_valid());
            prop_assert!(x0.mul_add(d, &x1).is_valid());
            prop_assert!(x0.interpolate(t, &x1).is_valid());
            prop_assert!(Clamp::clamp(&x0, 0.2, 0.5).is_valid());
        }

        #[test]
        fn concatenation_matches_sequential_application(
            d0 in spectrum(),
            x0 in crosstalk(),
            d1 in spectrum(),
            x1 in crosstalk(),
            l in spectrum(),
        ) {
            let sequential = x1.apply(&d1, &x0.apply(&d0, &l));
            let (d, x) = concatenate_fluorescent(&d0, Some(&x0), &d1, Some(&x1));
            let combined = x.apply(&d, &l);
            for i in 0..CHANNELS {
                prop_assert!(
                    approx_eq!(Float, sequential[i], combined[i], epsilon = 1e-4),
                    "{} != {}", sequential, combined
                );
            }
        }
    }
}
