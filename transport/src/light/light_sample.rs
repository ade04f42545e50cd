//! Light Sample

use super::{PlainLight, StokesLight};
use crate::context::TransportContext;
use crate::polarisation::StokesVector;
use crate::reference_frame::ReferenceFrame;
use foundation::math::*;
use foundation::spectrum::Spectrum;
use foundation::wavelength::{Wavelength, HERO_SAMPLES};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A light sample in the representation selected by the transport context.
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    /// Spectral intensity only.
    Plain(PlainLight),

    /// Spectral Stokes vector.
    Stokes(StokesLight),
}

/// Aborts on operands of different light representations.
///
/// * `op` - Name of the operation.
fn mismatch(op: &str) -> ! {
    fatal_error!("{} of plain and polarisable light", op)
}

/// Dispatches a binary operation on two lights of the same representation.
macro_rules! dispatch_pair {
    ($op: literal, $a: expr, $b: expr, |$x: ident, $y: ident| $e: expr) => {
        match ($a, $b) {
            (Light::Plain($x), Light::Plain($y)) => $e,
            (Light::Stokes($x), Light::Stokes($y)) => $e,
            _ => mismatch($op),
        }
    };
}

impl Light {
    /// Create light from a spectral intensity.
    ///
    /// * `ctx`       - The transport context.
    /// * `intensity` - Spectral intensity.
    pub fn from_intensity(ctx: &TransportContext, intensity: Spectrum) -> Self {
        foundation_assert!(
            intensity.channels() == ctx.channels(),
            "spectrum has {} channels, expected {}",
            intensity.channels(),
            ctx.channels()
        );
        if ctx.is_polarisable() {
            Self::Stokes(StokesLight::from_intensity(intensity))
        } else {
            Self::Plain(PlainLight::new(intensity))
        }
    }

    /// Create light with zero intensity.
    ///
    /// * `ctx` - The transport context.
    pub fn none(ctx: &TransportContext) -> Self {
        Self::from_intensity(ctx, ctx.isr().zero_spectrum())
    }

    /// Create light with unit intensity.
    ///
    /// * `ctx` - The transport context.
    pub fn unit(ctx: &TransportContext) -> Self {
        Self::from_value(ctx, 1.0)
    }

    /// Create light with constant intensity.
    ///
    /// * `ctx` - The transport context.
    /// * `d`   - Intensity.
    pub fn from_value(ctx: &TransportContext, d: Float) -> Self {
        Self::from_intensity(ctx, ctx.isr().spectrum(d))
    }

    /// Create light from a Stokes vector. Plain light keeps only the
    /// intensity.
    ///
    /// * `ctx`   - The transport context.
    /// * `sv`    - The Stokes vector.
    /// * `frame` - Reference frame the components are measured in.
    pub fn from_stokes(ctx: &TransportContext, sv: StokesVector, frame: ReferenceFrame) -> Self {
        if ctx.is_polarisable() {
            Self::Stokes(StokesLight::from_stokes(sv, frame))
        } else {
            Self::Plain(PlainLight::from_stokes(&sv))
        }
    }

    /// Returns the spectral intensity.
    pub fn intensity(&self) -> &Spectrum {
        match self {
            Self::Plain(l) => l.intensity(),
            Self::Stokes(l) => l.intensity(),
        }
    }

    /// Returns the light as a Stokes vector.
    pub fn to_stokes(&self) -> StokesVector {
        match self {
            Self::Plain(l) => l.to_stokes(),
            Self::Stokes(l) => l.to_stokes(),
        }
    }

    /// Returns true if the light carries polarisation state.
    pub fn is_polarised(&self) -> bool {
        match self {
            Self::Plain(_) => false,
            Self::Stokes(l) => l.is_polarised(),
        }
    }

    /// Returns the reference frame of polarised light.
    pub fn frame(&self) -> Option<&ReferenceFrame> {
        match self {
            Self::Plain(_) => None,
            Self::Stokes(l) => l.frame(),
        }
    }

    /// Re-expresses the light in a coaxial frame. Plain light is unchanged.
    ///
    /// * `target`    - The new frame.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realign_to_coaxial_frame(&mut self, target: &ReferenceFrame, tolerance: Float) {
        if let Self::Stokes(l) = self {
            l.realign_to_coaxial_frame(target, tolerance);
        }
    }

    /// Adds two lights whose frames may differ by up to a given tolerance.
    ///
    /// * `other`     - The other light.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn sloppy_add(&self, other: &Self, tolerance: Float) -> Self {
        dispatch_pair!("sloppy addition", self, other, |a, b| a.sloppy_add(b, tolerance).into())
    }

    /// Returns `d * self + other`.
    ///
    /// * `d`     - Factor.
    /// * `other` - Light added after scaling.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        dispatch_pair!("multiply-add", self, other, |a, b| a.mul_add(d, b).into())
    }

    /// Returns `self + (other - self) * t`.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - Value at t=1.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        dispatch_pair!("interpolation", self, other, |a, b| a.interpolate(t, b).into())
    }

    /// Multiplies the intensities channelwise. Not physically meaningful.
    ///
    /// * `other` - The other light.
    pub fn mul_light(&self, other: &Self) -> Self {
        dispatch_pair!("multiplication", self, other, |a, b| a.mul_light(b).into())
    }

    /// Returns the channelwise minimum intensity.
    ///
    /// * `other` - The other light.
    pub fn min_with(&self, other: &Self) -> Self {
        dispatch_pair!("minimum", self, other, |a, b| a.min_with(b).into())
    }

    /// Returns the channelwise maximum intensity.
    ///
    /// * `other` - The other light.
    pub fn max_with(&self, other: &Self) -> Self {
        dispatch_pair!("maximum", self, other, |a, b| a.max_with(b).into())
    }

    /// Returns the largest channelwise intensity difference.
    ///
    /// * `other` - The other light.
    pub fn max_diff(&self, other: &Self) -> Float {
        self.intensity().max_diff(other.intensity())
    }

    /// Scales the light in place.
    ///
    /// * `d` - Factor.
    pub fn scale(&mut self, d: Float) {
        match self {
            Self::Plain(l) => l.scale(d),
            Self::Stokes(l) => l.scale(d),
        }
    }

    /// Returns the light divided by a constant.
    ///
    /// * `d` - Divisor.
    pub fn div_scalar(&self, d: Float) -> Self {
        match self {
            Self::Plain(l) => l.div_scalar(d).into(),
            Self::Stokes(l) => l.div_scalar(d).into(),
        }
    }

    /// Raises the light to a power.
    ///
    /// * `p` - The power.
    pub fn pow(&self, p: Float) -> Self {
        match self {
            Self::Plain(l) => l.pow(p).into(),
            Self::Stokes(l) => l.pow(p).into(),
        }
    }

    /// Returns the largest intensity channel.
    pub fn max(&self) -> Float {
        self.intensity().max()
    }

    /// Returns the smallest intensity channel.
    pub fn min(&self) -> Float {
        self.intensity().min()
    }

    /// Returns the L1 norm of the intensity.
    pub fn norm(&self) -> Float {
        self.intensity().l1_norm()
    }

    /// Adds unpolarised intensity.
    ///
    /// * `s` - The intensity.
    pub fn add_intensity(&mut self, s: &Spectrum) {
        match self {
            Self::Plain(l) => l.spectrum += s,
            Self::Stokes(l) => l.add_intensity(s),
        }
    }

    /// Adds unpolarised intensity sampled at the hero wavelengths by
    /// splatting each value onto its neighbouring ISR channels.
    ///
    /// * `ctx`    - The transport context.
    /// * `w`      - The hero wavelengths.
    /// * `values` - Intensity per hero wavelength.
    pub fn add_hero_intensity(
        &mut self,
        ctx: &TransportContext,
        w: &Wavelength,
        values: &[Float; HERO_SAMPLES],
    ) {
        let mut s = ctx.isr().zero_spectrum();
        ctx.splatting_data().splat(&mut s, w, values);
        self.add_intensity(&s);
    }

    /// Returns true if the light is physically valid.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Plain(l) => l.is_valid(),
            Self::Stokes(l) => l.is_valid(),
        }
    }
}

impl From<PlainLight> for Light {
    /// Wraps plain light.
    ///
    /// * `l` - The light.
    fn from(l: PlainLight) -> Self {
        Self::Plain(l)
    }
}

impl From<StokesLight> for Light {
    /// Wraps Stokes light.
    ///
    /// * `l` - The light.
    fn from(l: StokesLight) -> Self {
        Self::Stokes(l)
    }
}

impl Add<&Light> for &Light {
    type Output = Light;

    /// Adds two lights.
    ///
    /// * `other` - The other light.
    fn add(self, other: &Light) -> Self::Output {
        dispatch_pair!("addition", self, other, |a, b| (a + b).into())
    }
}

impl AddAssign<&Light> for Light {
    /// Adds another light in place.
    ///
    /// * `other` - The other light.
    fn add_assign(&mut self, other: &Light) {
        match (self, other) {
            (Light::Plain(a), Light::Plain(b)) => *a += b,
            (Light::Stokes(a), Light::Stokes(b)) => *a += b,
            _ => mismatch("addition"),
        }
    }
}

impl Sub<&Light> for &Light {
    type Output = Light;

    /// Subtracts two lights.
    ///
    /// * `other` - The other light.
    fn sub(self, other: &Light) -> Self::Output {
        dispatch_pair!("subtraction", self, other, |a, b| (a - b).into())
    }
}

impl Mul<Float> for &Light {
    type Output = Light;

    /// Scales the light.
    ///
    /// * `d` - Factor.
    fn mul(self, d: Float) -> Self::Output {
        match self {
            Light::Plain(l) => (l * d).into(),
            Light::Stokes(l) => (l * d).into(),
        }
    }
}

impl Clamp<Float> for Light {
    /// Clamps the light to given [low, high] interval.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        match self {
            Light::Plain(l) => Clamp::clamp(l, low, high).into(),
            Light::Stokes(l) => Clamp::clamp(l, low, high).into(),
        }
    }
}

impl fmt::Display for Light {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Light::Plain(l) => write!(f, "{}", l),
            Light::Stokes(l) => write!(f, "{}", l),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use foundation::spectrum::Isr;

    fn isr() -> Isr {
        Isr::new(4, 400.0, 75.0).unwrap()
    }

    fn stokes(i: Float, q: Float) -> StokesVector {
        StokesVector::new([
            Spectrum::new(4, i),
            Spectrum::new(4, q),
            Spectrum::zero(4),
            Spectrum::zero(4),
        ])
    }

    #[test]
    fn representation_follows_context() {
        let plain = TransportContext::plain(isr()).unwrap();
        let polarisable = TransportContext::polarisable(isr()).unwrap();

        assert!(matches!(Light::unit(&plain), Light::Plain(_)));
        assert!(matches!(Light::unit(&polarisable), Light::Stokes(_)));

        let frame = ReferenceFrame::default();
        let l = Light::from_stokes(&plain, stokes(1.0, 0.5), frame);
        assert!(!l.is_polarised());
        assert_eq!(l.frame(), None);
        assert_eq!(l.intensity(), &Spectrum::new(4, 1.0));

        let l = Light::from_stokes(&polarisable, stokes(1.0, 0.5), frame);
        assert!(l.is_polarised());
        assert_eq!(l.frame(), Some(&frame));
        assert_eq!(l.to_stokes(), stokes(1.0, 0.5));
    }

    #[test]
    fn polarised_sum() {
        let ctx = TransportContext::polarisable(isr()).unwrap();
        let frame = ReferenceFrame::default();
        let a = Light::unit(&ctx);
        let b = Light::from_stokes(&ctx, stokes(1.0, 0.5), frame);

        let r = &a + &b;
        assert!(r.is_polarised());
        assert_eq!(r.frame(), Some(&frame));
        assert_eq!(r.to_stokes(), stokes(2.0, 0.5));

        let mut c = a.clone();
        c += &b;
        assert_eq!(c, r);
        assert_eq!((&r - &b).intensity(), a.intensity());
    }

    #[test]
    fn forwarded_algebra() {
        let ctx = TransportContext::plain(isr()).unwrap();
        let a = Light::from_value(&ctx, 2.0);
        let b = Light::unit(&ctx);

        assert_eq!((&a * 0.5).intensity(), b.intensity());
        assert_eq!(a.div_scalar(2.0), b);
        assert_eq!(a.mul_add(0.5, &b), a);
        assert_eq!(a.interpolate(1.0, &b), b);
        assert_eq!(a.min_with(&b), b);
        assert_eq!(a.max_with(&b), a);
        assert_eq!(a.max_diff(&b), 1.0);
        assert_eq!(a.pow(2.0), Light::from_value(&ctx, 4.0));
        assert_eq!(Clamp::clamp(&a, 0.0, 1.0), b);
        assert_eq!(a.norm(), 8.0);
        assert_eq!(a.max(), 2.0);
        assert_eq!(Light::none(&ctx).min(), 0.0);
        assert_eq!(a.sloppy_add(&b, 0.1), Light::from_value(&ctx, 3.0));
        assert!(a.is_valid());

        let mut s = a.clone();
        s.scale(0.5);
        assert_eq!(s, b);
    }

    #[test]
    fn hero_intensity_is_splatted() {
        let ctx = TransportContext::plain(isr()).unwrap();
        let mut l = Light::none(&ctx);
        let w = Wavelength::sample(ctx.sampling_data(), 0.1);
        l.add_hero_intensity(&ctx, &w, &[1.0, 1.0, 1.0, 1.0]);
        assert!(approx_eq!(Float, l.norm(), 4.0, epsilon = 1e-4));
    }

    #[test]
    #[should_panic(expected = "addition of plain and polarisable light")]
    fn mixed_representations_are_fatal() {
        let plain = TransportContext::plain(isr()).unwrap();
        let polarisable = TransportContext::polarisable(isr()).unwrap();
        let _ = &Light::unit(&plain) + &Light::unit(&polarisable);
    }
}
