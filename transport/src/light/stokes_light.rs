//! Stokes Light

use crate::polarisation::{StokesVector, STOKES_COMPONENTS};
use crate::reference_frame::{ReferenceFrame, DEFAULT_COAXIALITY_TOLERANCE};
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Maximum amount by which the polarised part of a Stokes vector may exceed
/// its intensity before the light counts as over-polarised.
pub const OVERPOLARISATION_EPSILON: Float = 0.00001;

/// Light carrying a spectral Stokes vector. Unpolarised light has no
/// reference frame and only its intensity is meaningful. Polarised light
/// measures components 1..3 against its reference frame.
#[derive(Clone, Debug, PartialEq)]
pub struct StokesLight {
    /// The Stokes vector.
    sv: StokesVector,

    /// Reference frame, present exactly when the light is polarised.
    frame: Option<ReferenceFrame>,
}

impl StokesLight {
    /// Create unpolarised light.
    ///
    /// * `intensity` - Spectral intensity.
    pub fn from_intensity(intensity: Spectrum) -> Self {
        Self {
            sv: StokesVector::unpolarised(intensity),
            frame: None,
        }
    }

    /// Create unpolarised light with zero intensity.
    ///
    /// * `channels` - Number of spectral channels.
    pub fn none(channels: usize) -> Self {
        Self::from_intensity(Spectrum::zero(channels))
    }

    /// Create unpolarised light with unit intensity.
    ///
    /// * `channels` - Number of spectral channels.
    pub fn unit(channels: usize) -> Self {
        Self::from_value(channels, 1.0)
    }

    /// Create unpolarised light with a constant intensity.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `d`        - Intensity.
    pub fn from_value(channels: usize, d: Float) -> Self {
        Self::from_intensity(Spectrum::new(channels, d))
    }

    /// Create polarised light.
    ///
    /// * `sv`    - The Stokes vector.
    /// * `frame` - Reference frame the components are measured in.
    pub fn from_stokes(sv: StokesVector, frame: ReferenceFrame) -> Self {
        Self {
            sv,
            frame: Some(frame),
        }
    }

    /// Returns the number of spectral channels.
    pub fn channels(&self) -> usize {
        self.sv.channels()
    }

    /// Returns the spectral intensity.
    pub fn intensity(&self) -> &Spectrum {
        self.sv.intensity()
    }

    /// Returns the Stokes vector.
    pub fn stokes(&self) -> &StokesVector {
        &self.sv
    }

    /// Returns a copy of the Stokes vector.
    pub fn to_stokes(&self) -> StokesVector {
        self.sv.clone()
    }

    /// Returns true if the light carries polarisation state.
    pub fn is_polarised(&self) -> bool {
        self.frame.is_some()
    }

    /// Returns the reference frame of polarised light.
    pub fn frame(&self) -> Option<&ReferenceFrame> {
        self.frame.as_ref()
    }

    /// Returns the Stokes vector expressed in a coaxial frame. Unpolarised
    /// light has zero polarised components in every frame.
    ///
    /// * `target`    - The frame to express the components in.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realigned_stokes(&self, target: &ReferenceFrame, tolerance: Float) -> StokesVector {
        match &self.frame {
            Some(frame) => {
                assert_coaxial_frames!(frame, target, tolerance);
                if frame.equal(target) {
                    self.sv.clone()
                } else {
                    let (cos2, sin2) = frame.stokes_rotation_to(target);
                    self.sv.rotated(cos2, sin2)
                }
            }
            None => StokesVector::unpolarised(self.intensity().clone()),
        }
    }

    /// Re-expresses polarised light in a coaxial frame. Unpolarised light is
    /// left unchanged.
    ///
    /// * `target`    - The new frame.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realign_to_coaxial_frame(&mut self, target: &ReferenceFrame, tolerance: Float) {
        if self.is_polarised() {
            self.sv = self.realigned_stokes(target, tolerance);
            self.frame = Some(*target);
        }
    }

    /// Returns a copy re-expressed in a coaxial frame.
    ///
    /// * `target`    - The new frame.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realigned_to_coaxial_frame(&self, target: &ReferenceFrame, tolerance: Float) -> Self {
        let mut ret = self.clone();
        ret.realign_to_coaxial_frame(target, tolerance);
        ret
    }

    /// Expresses two lights in a common frame. The frame of `second` wins if
    /// it is polarised, otherwise that of `first`. Returns `None` for the
    /// frame if neither light is polarised.
    ///
    /// * `first`     - First light.
    /// * `second`    - Second light.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn align_pair(
        first: &Self,
        second: &Self,
        tolerance: Float,
    ) -> (StokesVector, StokesVector, Option<ReferenceFrame>) {
        match (&first.frame, &second.frame) {
            (_, Some(frame)) => (
                first.realigned_stokes(frame, tolerance),
                second.sv.clone(),
                Some(*frame),
            ),
            (Some(frame), None) => (
                first.sv.clone(),
                second.realigned_stokes(frame, tolerance),
                Some(*frame),
            ),
            (None, None) => (first.sv.clone(), second.sv.clone(), None),
        }
    }

    /// Combines two lights componentwise in their common frame. Only the
    /// intensity is combined when neither light is polarised.
    ///
    /// * `first`     - First light.
    /// * `second`    - Second light.
    /// * `tolerance` - Coaxiality tolerance in radians.
    /// * `op`        - Componentwise operation.
    fn combine<F>(first: &Self, second: &Self, tolerance: Float, op: F) -> Self
    where
        F: Fn(&Spectrum, &Spectrum) -> Spectrum,
    {
        if !first.is_polarised() && !second.is_polarised() {
            return Self::from_intensity(op(first.intensity(), second.intensity()));
        }

        let (sv0, sv1, frame) = Self::align_pair(first, second, tolerance);
        Self {
            sv: StokesVector::new(std::array::from_fn(|i| op(&sv0[i], &sv1[i]))),
            frame,
        }
    }

    /// Applies an operation to every meaningful component.
    ///
    /// * `op` - Componentwise operation.
    fn map_components<F>(&self, op: F) -> Self
    where
        F: Fn(&Spectrum) -> Spectrum,
    {
        if self.is_polarised() {
            Self {
                sv: StokesVector::new(std::array::from_fn(|i| op(&self.sv[i]))),
                frame: self.frame,
            }
        } else {
            Self::from_intensity(op(self.intensity()))
        }
    }

    /// Adds two lights whose frames may differ by up to a given tolerance.
    ///
    /// * `other`     - The other light.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn sloppy_add(&self, other: &Self, tolerance: Float) -> Self {
        Self::combine(self, other, tolerance, |a, b| a + b)
    }

    /// Returns `d * self + other` in the frame of `other` if it is
    /// polarised.
    ///
    /// * `d`     - Factor.
    /// * `other` - Light added after scaling.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        Self::combine(self, other, DEFAULT_COAXIALITY_TOLERANCE, |a, b| {
            a.mul_add(d, b)
        })
    }

    /// Returns `self + (other - self) * t`.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - Value at t=1.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        Self::combine(self, other, DEFAULT_COAXIALITY_TOLERANCE, |a, b| {
            a.interpolate(t, b)
        })
    }

    /// Scales all components in place.
    ///
    /// * `d` - Factor.
    pub fn scale(&mut self, d: Float) {
        let n = if self.is_polarised() {
            STOKES_COMPONENTS
        } else {
            1
        };
        self.sv.c[..n].iter_mut().for_each(|s| s.scale(d));
    }

    /// Returns all components divided by a constant.
    ///
    /// * `d` - Divisor.
    pub fn div_scalar(&self, d: Float) -> Self {
        self.map_components(|s| s / d)
    }

    /// Raises all components to a power.
    ///
    /// * `p` - The power.
    pub fn pow(&self, p: Float) -> Self {
        self.map_components(|s| s.pow(p))
    }

    /// Multiplies all components with a spectral attenuation that has no
    /// polarising effect.
    ///
    /// * `s` - Channelwise factor.
    pub fn mul_intensity(&self, s: &Spectrum) -> Self {
        self.map_components(|c| c * s)
    }

    /// Adds unpolarised intensity.
    ///
    /// * `s` - The intensity.
    pub fn add_intensity(&mut self, s: &Spectrum) {
        self.sv.c[0] += s;
    }

    /// Multiplies the intensities channelwise. Only meaningful for masking
    /// and windowing; the result is unpolarised.
    ///
    /// * `other` - The other light.
    pub fn mul_light(&self, other: &Self) -> Self {
        warn!("multiplication of two light samples is not physically meaningful");
        Self::from_intensity(self.intensity() * other.intensity())
    }

    /// Multiplies the intensity channelwise with another light in place.
    /// The result is unpolarised.
    ///
    /// * `other` - The other light.
    pub fn mul_light_assign(&mut self, other: &Self) {
        *self = self.mul_light(other);
    }

    /// Returns the channelwise minimum intensity as unpolarised light.
    ///
    /// * `other` - The other light.
    pub fn min_with(&self, other: &Self) -> Self {
        Self::from_intensity(self.intensity().min_with(other.intensity()))
    }

    /// Returns the channelwise maximum intensity as unpolarised light.
    ///
    /// * `other` - The other light.
    pub fn max_with(&self, other: &Self) -> Self {
        Self::from_intensity(self.intensity().max_with(other.intensity()))
    }

    /// Returns the largest intensity channel.
    pub fn max(&self) -> Float {
        self.intensity().max()
    }

    /// Returns the smallest intensity channel.
    pub fn min(&self) -> Float {
        self.intensity().min()
    }

    /// Returns the largest channelwise intensity difference.
    ///
    /// * `other` - The other light.
    pub fn max_diff(&self, other: &Self) -> Float {
        self.intensity().max_diff(other.intensity())
    }

    /// Returns the L1 norm of the intensity.
    pub fn norm(&self) -> Float {
        self.intensity().l1_norm()
    }

    /// Reciprocal of polarised light. Not implemented yet.
    pub fn inv(&self) -> Self {
        work_in_progress!()
    }

    /// Collinearity test of two Stokes lights. Not implemented yet.
    ///
    /// * `_other` - The other light.
    pub fn collinear(&self, _other: &Self) -> bool {
        work_in_progress!()
    }

    /// Returns true if the intensity is valid and, for polarised light, the
    /// polarised components and frame are valid and the light is not
    /// over-polarised.
    pub fn is_valid(&self) -> bool {
        if !self.intensity().is_valid() {
            warn!("light intensity {} is invalid", self.intensity());
            return false;
        }

        if let Some(frame) = &self.frame {
            if !self.sv.is_valid() {
                warn!("Stokes vector {} is invalid", self.sv);
                return false;
            }
            if !frame.is_valid() {
                return false;
            }
            if let Some(i) = self.sv.overpolarised_channel(OVERPOLARISATION_EPSILON) {
                warn!("Stokes vector is overpolarised in channel {}: {}", i, self.sv);
                return false;
            }
        }
        true
    }

    /// Returns true if the light is within a relative error of another light
    /// with the same polarisation state.
    ///
    /// * `other`              - The other light.
    /// * `max_relative_error` - Allowed relative error.
    pub fn approx_equal(&self, other: &Self, max_relative_error: Float) -> bool {
        match (&self.frame, &other.frame) {
            (None, None) => self
                .intensity()
                .approx_equal(other.intensity(), max_relative_error),
            (Some(f0), Some(f1)) => {
                f0.approx_equal(f1, max_relative_error)
                    && self.sv.approx_equal(&other.sv, max_relative_error)
            }
            _ => false,
        }
    }
}

impl Add<&StokesLight> for &StokesLight {
    type Output = StokesLight;

    /// Adds two lights in the frame of `other` if it is polarised.
    ///
    /// * `other` - The other light.
    fn add(self, other: &StokesLight) -> Self::Output {
        StokesLight::combine(self, other, DEFAULT_COAXIALITY_TOLERANCE, |a, b| a + b)
    }
}

impl AddAssign<&StokesLight> for StokesLight {
    /// Adds another light in place, keeping this light's frame if it is
    /// polarised.
    ///
    /// * `other` - The other light.
    fn add_assign(&mut self, other: &StokesLight) {
        *self = StokesLight::combine(other, self, DEFAULT_COAXIALITY_TOLERANCE, |o, s| s + o);
    }
}

impl Sub<&StokesLight> for &StokesLight {
    type Output = StokesLight;

    /// Subtracts two lights in the frame of `other` if it is polarised.
    ///
    /// * `other` - The other light.
    fn sub(self, other: &StokesLight) -> Self::Output {
        StokesLight::combine(self, other, DEFAULT_COAXIALITY_TOLERANCE, |a, b| a - b)
    }
}

impl Mul<Float> for &StokesLight {
    type Output = StokesLight;

    /// Scales all components.
    ///
    /// * `d` - Factor.
    fn mul(self, d: Float) -> Self::Output {
        self.map_components(|s| s * d)
    }
}

impl Clamp<Float> for StokesLight {
    /// Clamps all components to given [low, high] interval.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        self.map_components(|s| s.clamp(low, high))
    }
}

impl fmt::Display for StokesLight {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.frame {
            Some(frame) => write!(f, "StokesLight {} {}", self.sv, frame),
            None => write!(f, "StokesLight {} unpolarised", self.intensity()),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
