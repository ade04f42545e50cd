//! Direct Attenuation

use super::mueller_direct::MuellerDirectAttenuation;
use super::plain_direct::{polarisation_unavailable, PlainDirectAttenuation};
use crate::crosstalk::Crosstalk;
use crate::light::Light;
use crate::reference_frame::ReferenceFrame;
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;

/// Aborts on plain attenuation functionality used on polarising data.
pub(super) fn polarisation_aware_only() -> ! {
    fatal_error!("non-polarisation aware attenuation functionality used on a polarising attenuation struct")
}

/// Aborts on operands of different representations.
fn mismatch(op: &str) -> ! {
    fatal_error!("{} of plain and polarising attenuation", op)
}

/// The part of an attenuation that maps each channel onto itself, in the
/// representation chosen by the light configuration type.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectAttenuation {
    /// A transmittance per channel.
    Plain(PlainDirectAttenuation),

    /// A spectral Mueller matrix with reference frames.
    Mueller(MuellerDirectAttenuation),
}

impl DirectAttenuation {
    /// Returns the number of spectral channels.
    pub fn channels(&self) -> usize {
        self.diagonal().channels()
    }

    /// Returns true if the attenuation changes the polarisation state of
    /// light. Plain attenuation never does.
    pub fn is_polarising(&self) -> bool {
        match self {
            Self::Plain(_) => false,
            Self::Mueller(m) => m.is_general(),
        }
    }

    /// Returns the entry reference frame.
    pub fn entry_frame(&self) -> &ReferenceFrame {
        match self {
            Self::Plain(p) => p.entry_frame(),
            Self::Mueller(m) => &m.entry,
        }
    }

    /// Returns the exit reference frame.
    pub fn exit_frame(&self) -> &ReferenceFrame {
        match self {
            Self::Plain(p) => p.exit_frame(),
            Self::Mueller(m) => &m.exit,
        }
    }

    /// Returns the per channel intensity transmittance.
    pub fn diagonal(&self) -> &Spectrum {
        match self {
            Self::Plain(p) => p.diagonal(),
            Self::Mueller(m) => m.diagonal(),
        }
    }

    /// Replaces the per channel intensity transmittance.
    ///
    /// * `s` - The new transmittance.
    pub fn set_diagonal(&mut self, s: Spectrum) {
        match self {
            Self::Plain(p) => p.spectrum = s,
            Self::Mueller(m) => m.set_diagonal(s),
        }
    }

    /// Returns a copy re-expressed for a coaxial exit frame.
    ///
    /// * `target`    - The new exit frame.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realigned_to_coaxial_exit_frame(&self, target: &ReferenceFrame, tolerance: Float) -> Self {
        match self {
            Self::Plain(_) => polarisation_unavailable(),
            Self::Mueller(m) => Self::Mueller(m.realigned_to_coaxial_exit_frame(target, tolerance)),
        }
    }

    /// Returns the average transmittance.
    pub fn avg(&self) -> Float {
        self.diagonal().avg()
    }

    /// Returns the L1 norm of the transmittance.
    pub fn norm(&self) -> Float {
        self.diagonal().l1_norm()
    }

    /// Returns the largest transmittance.
    pub fn max(&self) -> Float {
        self.diagonal().max()
    }

    /// Returns the smallest transmittance.
    pub fn min(&self) -> Float {
        self.diagonal().min()
    }

    /// Returns the channelwise reciprocal.
    pub fn inv(&self) -> Self {
        self.map_plain(|s| s.inv())
    }

    /// Returns the sum of two attenuations acting in parallel.
    ///
    /// * `other` - The other attenuation.
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => Self::plain(&a.spectrum + &b.spectrum),
            (Self::Mueller(a), Self::Mueller(b)) => Self::Mueller(a.add(b)),
            _ => mismatch("addition"),
        }
    }

    /// Returns the difference of two attenuations.
    ///
    /// * `other` - The attenuation to subtract.
    pub fn sub(&self, other: &Self) -> Self {
        self.zip_plain(other, "subtraction", |a, b| a - b)
    }

    /// Returns `d * self + other`.
    ///
    /// * `d`     - Factor.
    /// * `other` - The attenuation to add.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        self.zip_plain(other, "multiply-add", |a, b| a.mul_add(d, b))
    }

    /// Returns the linear interpolation `(1 - t) * self + t * other`.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - The other attenuation.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        self.zip_plain(other, "interpolation", |a, b| a.interpolate(t, b))
    }

    /// Returns the channelwise maximum of two attenuations.
    ///
    /// * `other` - The other attenuation.
    pub fn max_with(&self, other: &Self) -> Self {
        self.zip_plain(other, "maximum", |a, b| a.max_with(b))
    }

    /// Returns the channelwise minimum of two attenuations.
    ///
    /// * `other` - The other attenuation.
    pub fn min_with(&self, other: &Self) -> Self {
        self.zip_plain(other, "minimum", |a, b| a.min_with(b))
    }

    /// Returns the largest channelwise difference to another attenuation.
    ///
    /// * `other` - The other attenuation.
    pub fn max_diff(&self, other: &Self) -> Float {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => a.spectrum.max_diff(&b.spectrum),
            (Self::Mueller(_), Self::Mueller(_)) => work_in_progress!(),
            _ => mismatch("difference"),
        }
    }

    /// Scales the attenuation.
    ///
    /// * `d` - Factor.
    pub fn scale(&mut self, d: Float) {
        match self {
            Self::Plain(p) => p.spectrum.scale(d),
            Self::Mueller(m) => m.scale(d),
        }
    }

    /// Multiplies the attenuation channelwise with a filter spectrum.
    ///
    /// * `s` - The filter spectrum.
    pub fn mul_spectrum(&mut self, s: &Spectrum) {
        match self {
            Self::Plain(p) => p.spectrum *= s,
            Self::Mueller(m) => m.mul_spectrum(s),
        }
    }

    /// Returns the channelwise power `v^p`.
    ///
    /// * `p` - Exponent.
    pub fn pow(&self, p: Float) -> Self {
        self.map_plain(|s| s.pow(p))
    }

    /// Returns the channelwise power `v^-p`.
    ///
    /// * `p` - Exponent.
    pub fn negpow(&self, p: Float) -> Self {
        self.map_plain(|s| s.negpow(p))
    }

    /// Returns the attenuation clamped to `[low, high]`.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        self.map_plain(|s| Clamp::clamp(s, low, high))
    }

    /// Returns `1 - v` for every channel.
    pub fn complement_from_one(&self) -> Self {
        match self {
            Self::Plain(p) => Self::Plain(p.complement_from_one()),
            Self::Mueller(_) => work_in_progress!(),
        }
    }

    /// Returns an attenuation that is zero except for channel `i0`, which
    /// holds `1 - v`.
    ///
    /// * `i0` - The channel.
    pub fn singleband_complement_from_one(&self, i0: usize) -> Self {
        match self {
            Self::Plain(p) => Self::Plain(p.singleband_complement_from_one(i0)),
            Self::Mueller(_) => work_in_progress!(),
        }
    }

    /// Overwrites channel `i0` with the scaled channel of another
    /// attenuation.
    ///
    /// * `d`      - Factor.
    /// * `i0`     - The channel.
    /// * `source` - The attenuation the channel is copied from.
    pub fn singleband_mul_copy(&mut self, d: Float, i0: usize, source: &Self) {
        match (self, source) {
            (Self::Plain(a), Self::Plain(b)) => a.singleband_mul_copy(d, i0, b),
            (Self::Mueller(_), Self::Mueller(_)) => work_in_progress!(),
            _ => mismatch("single band copy"),
        }
    }

    /// Returns the concatenation where light passes `self` and then `next`.
    ///
    /// * `next` - The attenuation acting second.
    pub fn concatenate(&self, next: &Self) -> Self {
        match (self, next) {
            (Self::Plain(a), Self::Plain(b)) => Self::plain(&b.spectrum * &a.spectrum),
            (Self::Mueller(a), Self::Mueller(b)) => Self::Mueller(a.concatenate(b)),
            _ => mismatch("concatenation"),
        }
    }

    /// Attenuates light in place, adding fluorescent emission when a
    /// crosstalk is given.
    ///
    /// * `crosstalk` - Optional crosstalk.
    /// * `l`         - The light.
    pub fn apply(&self, crosstalk: Option<&Crosstalk>, l: &mut Light) {
        match (self, l, crosstalk) {
            (Self::Plain(a), Light::Plain(p), None) => a.apply(p),
            (Self::Plain(a), Light::Plain(p), Some(x)) => {
                p.spectrum = x.apply(&a.spectrum, &p.spectrum);
            }
            (Self::Mueller(a), Light::Stokes(s), None) => a.apply(s),
            (Self::Mueller(a), Light::Stokes(s), Some(x)) => a.apply_fluorescent(x, s),
            _ => fatal_error!("attenuation and light sample of different light configuration types"),
        }
    }

    /// Returns true if the attenuation holds valid data.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Plain(p) => p.is_valid(),
            Self::Mueller(m) => m.is_valid(),
        }
    }

    fn plain(s: Spectrum) -> Self {
        Self::Plain(PlainDirectAttenuation::new(s))
    }

    /// Applies a spectral operation to plain data. Mueller matrices do not
    /// support it.
    fn map_plain<F: Fn(&Spectrum) -> Spectrum>(&self, f: F) -> Self {
        match self {
            Self::Plain(p) => Self::plain(f(&p.spectrum)),
            Self::Mueller(_) => work_in_progress!(),
        }
    }

    /// Applies a binary spectral operation to plain data. Mueller matrices
    /// do not support it.
    fn zip_plain<F: Fn(&Spectrum, &Spectrum) -> Spectrum>(&self, other: &Self, op: &str, f: F) -> Self {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => Self::plain(f(&a.spectrum, &b.spectrum)),
            (Self::Mueller(_), Self::Mueller(_)) => work_in_progress!(),
            _ => mismatch(op),
        }
    }
}

impl From<PlainDirectAttenuation> for DirectAttenuation {
    /// Wraps plain attenuation.
    ///
    /// * `a` - The attenuation.
    fn from(a: PlainDirectAttenuation) -> Self {
        Self::Plain(a)
    }
}

impl From<MuellerDirectAttenuation> for DirectAttenuation {
    /// Wraps Mueller attenuation.
    ///
    /// * `a` - The attenuation.
    fn from(a: MuellerDirectAttenuation) -> Self {
        Self::Mueller(a)
    }
}

impl fmt::Display for DirectAttenuation {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(p) => write!(f, "{}", p),
            Self::Mueller(m) => write!(f, "{}", m),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
