//! Plain Light

use crate::polarisation::StokesVector;
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Unpolarised light described by its spectral intensity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlainLight {
    /// Spectral intensity.
    pub spectrum: Spectrum,
}

impl PlainLight {
    /// Create a new `PlainLight`.
    ///
    /// * `spectrum` - Spectral intensity.
    pub fn new(spectrum: Spectrum) -> Self {
        Self { spectrum }
    }

    /// Create light with a constant intensity.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `d`        - Intensity.
    pub fn from_value(channels: usize, d: Float) -> Self {
        Self::new(Spectrum::new(channels, d))
    }

    /// Create light from a Stokes vector. Only the intensity is kept.
    ///
    /// * `sv` - The Stokes vector.
    pub fn from_stokes(sv: &StokesVector) -> Self {
        Self::new(sv.intensity().clone())
    }

    /// Returns the spectral intensity.
    pub fn intensity(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Returns the light as an unpolarised Stokes vector.
    pub fn to_stokes(&self) -> StokesVector {
        StokesVector::unpolarised(self.spectrum.clone())
    }

    /// Scales the intensity in place.
    ///
    /// * `d` - Factor.
    pub fn scale(&mut self, d: Float) {
        self.spectrum.scale(d);
    }

    /// Returns the intensity divided by a constant.
    ///
    /// * `d` - Divisor.
    pub fn div_scalar(&self, d: Float) -> Self {
        Self::new(&self.spectrum / d)
    }

    /// Adds two lights. Plain light has no reference frame, so the
    /// tolerance is unused.
    ///
    /// * `other`      - The other light.
    /// * `_tolerance` - Coaxiality tolerance in radians.
    pub fn sloppy_add(&self, other: &Self, _tolerance: Float) -> Self {
        self + other
    }

    /// Returns `d * self + other`.
    ///
    /// * `d`     - Factor.
    /// * `other` - Light added after scaling.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        Self::new(self.spectrum.mul_add(d, &other.spectrum))
    }

    /// Raises the intensity to a power.
    ///
    /// * `p` - The power.
    pub fn pow(&self, p: Float) -> Self {
        Self::new(self.spectrum.pow(p))
    }

    /// Returns `self + (other - self) * t`.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - Value at t=1.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        Self::new(self.spectrum.interpolate(t, &other.spectrum))
    }

    /// Multiplies the intensity channelwise with another light.
    ///
    /// * `other` - The other light.
    pub fn mul_light(&self, other: &Self) -> Self {
        Self::new(&self.spectrum * &other.spectrum)
    }

    /// Returns the channelwise minimum.
    ///
    /// * `other` - The other light.
    pub fn min_with(&self, other: &Self) -> Self {
        Self::new(self.spectrum.min_with(&other.spectrum))
    }

    /// Returns the channelwise maximum.
    ///
    /// * `other` - The other light.
    pub fn max_with(&self, other: &Self) -> Self {
        Self::new(self.spectrum.max_with(&other.spectrum))
    }

    /// Returns the reciprocal intensity.
    pub fn inv(&self) -> Self {
        Self::new(self.spectrum.inv())
    }

    /// Returns true if the intensity is a valid spectrum with no negative
    /// channels.
    pub fn is_valid(&self) -> bool {
        if !self.spectrum.is_valid() {
            warn!("light spectrum {} is invalid", self.spectrum);
            return false;
        }
        match self.spectrum.samples().iter().position(|v| *v < 0.0) {
            Some(i) => {
                warn!("colour channel {} is negative", i);
                false
            }
            None => true,
        }
    }
}

impl Add<&PlainLight> for &PlainLight {
    type Output = PlainLight;

    /// Adds the intensities.
    ///
    /// * `other` - The other light.
    fn add(self, other: &PlainLight) -> Self::Output {
        PlainLight::new(&self.spectrum + &other.spectrum)
    }
}

impl AddAssign<&PlainLight> for PlainLight {
    /// Adds another intensity in place.
    ///
    /// * `other` - The other light.
    fn add_assign(&mut self, other: &PlainLight) {
        self.spectrum += &other.spectrum;
    }
}

impl Sub<&PlainLight> for &PlainLight {
    type Output = PlainLight;

    /// Subtracts the intensities.
    ///
    /// * `other` - The other light.
    fn sub(self, other: &PlainLight) -> Self::Output {
        PlainLight::new(&self.spectrum - &other.spectrum)
    }
}

impl Mul<Float> for &PlainLight {
    type Output = PlainLight;

    /// Scales the intensity.
    ///
    /// * `d` - Factor.
    fn mul(self, d: Float) -> Self::Output {
        PlainLight::new(&self.spectrum * d)
    }
}

impl Clamp<Float> for PlainLight {
    /// Clamps the intensity to given [low, high] interval.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        Self::new(self.spectrum.clamp(low, high))
    }
}

impl fmt::Display for PlainLight {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlainLight {}", self.spectrum)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn light(v: &[Float]) -> PlainLight {
        PlainLight::new(Spectrum::from(v))
    }

    #[test]
    fn algebra() {
        let a = light(&[1.0, 2.0]);
        let b = light(&[0.5, 0.5]);
        assert_eq!(&a + &b, light(&[1.5, 2.5]));
        assert_eq!(&a - &b, light(&[0.5, 1.5]));
        assert_eq!(&a * 2.0, light(&[2.0, 4.0]));
        assert_eq!(a.div_scalar(2.0), light(&[0.5, 1.0]));
        assert_eq!(a.mul_add(2.0, &b), light(&[2.5, 4.5]));
        assert_eq!(a.mul_light(&b), light(&[0.5, 1.0]));
        assert_eq!(a.interpolate(0.5, &b), light(&[0.75, 1.25]));
        assert_eq!(a.pow(2.0), light(&[1.0, 4.0]));
        assert_eq!(a.min_with(&light(&[2.0, 0.0])), light(&[1.0, 0.0]));
        assert_eq!(a.max_with(&light(&[2.0, 0.0])), light(&[2.0, 2.0]));
        assert_eq!(Clamp::clamp(&a, 0.0, 1.5), light(&[1.0, 1.5]));
        assert_eq!(a.inv(), light(&[1.0, 0.5]));

        let mut c = a.clone();
        c += &b;
        c.scale(2.0);
        assert_eq!(c, light(&[3.0, 5.0]));
    }

    #[test]
    fn sloppy_add_ignores_tolerance() {
        let a = light(&[1.0, 2.0]);
        let b = light(&[0.5, 0.25]);
        assert_eq!(a.sloppy_add(&b, 0.0), light(&[1.5, 2.25]));
        assert_eq!(a.sloppy_add(&b, 1.0), &a + &b);
    }

    #[test]
    fn stokes_conversion_keeps_intensity() {
        let a = light(&[1.0, 2.0]);
        let sv = a.to_stokes();
        assert!(sv[1].is_black());
        assert_eq!(PlainLight::from_stokes(&sv), a);
        assert_eq!(PlainLight::from_value(2, 0.5), light(&[0.5, 0.5]));
    }

    #[test]
    fn negative_channels_are_invalid() {
        assert!(light(&[0.0, 1.0]).is_valid());
        assert!(!light(&[0.5, -1.0]).is_valid());
        assert!(!light(&[Float::NAN, 1.0]).is_valid());
    }
}
