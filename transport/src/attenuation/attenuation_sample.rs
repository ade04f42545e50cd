//! Attenuation Sample

use super::direct::{polarisation_aware_only, DirectAttenuation};
use super::mueller_direct::MuellerDirectAttenuation;
use super::plain_direct::{polarisation_unavailable, PlainDirectAttenuation};
use crate::context::TransportContext;
use crate::crosstalk::{concatenate_fluorescent, Crosstalk};
use crate::light::Light;
use crate::polarisation::MuellerMatrix;
use crate::reference_frame::{ReferenceFrame, DEFAULT_COAXIALITY_TOLERANCE};
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;

/// A light modifying operator: a direct term acting on each channel and an
/// optional crosstalk that moves energy to longer wavelengths.
///
/// An uninitialised attenuation stands for "nothing has happened yet" and
/// acts as the identity in binary operations.
#[derive(Clone, Debug, PartialEq)]
pub struct Attenuation {
    /// The direct term.
    direct: DirectAttenuation,

    /// Fluorescent re-emission, if any.
    crosstalk: Option<Crosstalk>,

    /// False for a deactivated value.
    initialised: bool,
}

/// Picks the result of a binary operation when an operand is uninitialised.
/// Returns `None` when both operands need to be combined.
///
/// * `a0` - First operand.
/// * `a1` - Second operand.
fn transparent_operand(a0: &Attenuation, a1: &Attenuation) -> Option<Attenuation> {
    match (a0.initialised, a1.initialised) {
        (true, true) => None,
        (true, false) => Some(a0.clone()),
        (false, _) => Some(a1.clone()),
    }
}

impl Attenuation {
    /// Create a new `Attenuation`.
    ///
    /// * `direct`    - The direct term.
    /// * `crosstalk` - Optional crosstalk.
    fn new(direct: DirectAttenuation, crosstalk: Option<Crosstalk>) -> Self {
        Self {
            direct,
            crosstalk,
            initialised: true,
        }
    }

    /// Create an uninitialised attenuation.
    ///
    /// * `ctx` - The transport context.
    pub fn uninitialised(ctx: &TransportContext) -> Self {
        let zero = Spectrum::zero(ctx.channels());
        let direct = if ctx.is_polarisable() {
            MuellerDirectAttenuation::nonpolarising(zero, ReferenceFrame::default(), ReferenceFrame::default())
                .into()
        } else {
            PlainDirectAttenuation::new(zero).into()
        };
        Self {
            direct,
            crosstalk: None,
            initialised: false,
        }
    }

    /// Create an attenuation with the same transmittance in every channel.
    /// Only available for plain light.
    ///
    /// * `ctx` - The transport context.
    /// * `d`   - Transmittance.
    pub fn from_value(ctx: &TransportContext, d: Float) -> Self {
        Self::from_spectrum(ctx, ctx.isr().spectrum(d))
    }

    /// Create an attenuation from a transmittance spectrum. Only available
    /// for plain light.
    ///
    /// * `ctx` - The transport context.
    /// * `s`   - Transmittance.
    pub fn from_spectrum(ctx: &TransportContext, s: Spectrum) -> Self {
        if ctx.is_polarisable() {
            polarisation_aware_only()
        }
        assert_valid!(s);
        Self::new(PlainDirectAttenuation::new(s).into(), None)
    }

    /// Create a fluorescent attenuation. Only available for plain light.
    ///
    /// * `ctx` - The transport context.
    /// * `s`   - Transmittance.
    /// * `x`   - Crosstalk.
    pub fn from_spectrum_crosstalk(ctx: &TransportContext, s: Spectrum, x: Crosstalk) -> Self {
        let mut a = Self::from_spectrum(ctx, s);
        assert_valid!(x);
        a.crosstalk = Some(x);
        a
    }

    /// Create a depolarising attenuation with the same transmittance in
    /// every channel. The frames are ignored for plain light.
    ///
    /// * `ctx`   - The transport context.
    /// * `d`     - Transmittance.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_value_frames_depolarising(
        ctx: &TransportContext,
        d: Float,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        Self::from_spectrum_frames_depolarising(ctx, ctx.isr().spectrum(d), entry, exit)
    }

    /// Create a non-polarising attenuation with the same transmittance in
    /// every channel. The frames are ignored for plain light.
    ///
    /// * `ctx`   - The transport context.
    /// * `d`     - Transmittance.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_value_frames_nonpolarising(
        ctx: &TransportContext,
        d: Float,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        Self::from_spectrum_frames_nonpolarising(ctx, ctx.isr().spectrum(d), entry, exit)
    }

    /// Create a depolarising attenuation from a transmittance spectrum.
    ///
    /// * `ctx`   - The transport context.
    /// * `s`     - Transmittance.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_spectrum_frames_depolarising(
        ctx: &TransportContext,
        s: Spectrum,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        Self::new(Self::framed(ctx, s, entry, exit, true), None)
    }

    /// Create a non-polarising attenuation from a transmittance spectrum.
    ///
    /// * `ctx`   - The transport context.
    /// * `s`     - Transmittance.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_spectrum_frames_nonpolarising(
        ctx: &TransportContext,
        s: Spectrum,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        Self::new(Self::framed(ctx, s, entry, exit, false), None)
    }

    /// Create a depolarising fluorescent attenuation.
    ///
    /// * `ctx`   - The transport context.
    /// * `s`     - Transmittance.
    /// * `x`     - Crosstalk.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_spectrum_crosstalk_frames_depolarising(
        ctx: &TransportContext,
        s: Spectrum,
        x: Crosstalk,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        assert_valid!(x);
        Self::new(Self::framed(ctx, s, entry, exit, true), Some(x))
    }

    /// Create a non-polarising fluorescent attenuation.
    ///
    /// * `ctx`   - The transport context.
    /// * `s`     - Transmittance.
    /// * `x`     - Crosstalk.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_spectrum_crosstalk_frames_nonpolarising(
        ctx: &TransportContext,
        s: Spectrum,
        x: Crosstalk,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        assert_valid!(x);
        Self::new(Self::framed(ctx, s, entry, exit, false), Some(x))
    }

    /// Create a depolarising attenuation with the transmittance and
    /// crosstalk of another one. An uninitialised source gives an
    /// uninitialised result.
    ///
    /// * `ctx`   - The transport context.
    /// * `a`     - The source attenuation.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_attenuation_frames_depolarising(
        ctx: &TransportContext,
        a: &Self,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        if !a.initialised {
            return a.clone();
        }
        let direct = Self::framed(ctx, a.diagonal().clone(), entry, exit, true);
        Self::new(direct, a.crosstalk.clone())
    }

    /// Create a non-polarising attenuation with the transmittance and
    /// crosstalk of another one. An uninitialised source gives an
    /// uninitialised result.
    ///
    /// * `ctx`   - The transport context.
    /// * `a`     - The source attenuation.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn from_attenuation_frames_nonpolarising(
        ctx: &TransportContext,
        a: &Self,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        if !a.initialised {
            return a.clone();
        }
        let direct = Self::framed(ctx, a.diagonal().clone(), entry, exit, false);
        Self::new(direct, a.crosstalk.clone())
    }

    /// Create a copy of another attenuation, uninitialised included.
    ///
    /// * `a` - The source attenuation.
    pub fn from_attenuation(a: &Self) -> Self {
        a.clone()
    }

    /// Create a polarising attenuation from a Mueller matrix. Only
    /// available for polarisable light.
    ///
    /// * `ctx`    - The transport context.
    /// * `matrix` - The Mueller matrix.
    /// * `entry`  - Frame of the incoming light.
    /// * `exit`   - Frame of the outgoing light.
    pub fn from_mueller(
        ctx: &TransportContext,
        matrix: MuellerMatrix,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        if !ctx.is_polarisable() {
            polarisation_unavailable()
        }
        assert_valid!(matrix);
        assert_valid!(entry);
        assert_valid!(exit);
        Self::new(MuellerDirectAttenuation::polarising(matrix, *entry, *exit).into(), None)
    }

    /// Create a linear polariser. Only available for polarisable light.
    ///
    /// * `ctx`      - The transport context.
    /// * `angle`    - Transmission axis angle relative to the entry frame.
    /// * `strength` - Polarisation strength in [0, 1].
    /// * `entry`    - Frame of the incoming light.
    /// * `exit`     - Frame of the outgoing light.
    pub fn linear_polariser(
        ctx: &TransportContext,
        angle: Float,
        strength: Float,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
    ) -> Self {
        if !ctx.is_polarisable() {
            polarisation_unavailable()
        }
        Self::new(
            MuellerDirectAttenuation::linear_polariser(ctx.channels(), angle, strength, *entry, *exit)
                .into(),
            None,
        )
    }

    /// Builds the direct term for a framed constructor.
    fn framed(
        ctx: &TransportContext,
        s: Spectrum,
        entry: &ReferenceFrame,
        exit: &ReferenceFrame,
        depolarising: bool,
    ) -> DirectAttenuation {
        assert_valid!(s);
        if !ctx.is_polarisable() {
            return PlainDirectAttenuation::new(s).into();
        }

        assert_valid!(entry);
        assert_valid!(exit);
        if depolarising {
            MuellerDirectAttenuation::depolarising(s, *entry, *exit).into()
        } else {
            MuellerDirectAttenuation::nonpolarising(s, *entry, *exit).into()
        }
    }

    /// Marks the attenuation as uninitialised.
    pub fn deactivate(&mut self) {
        self.initialised = false;
    }

    /// Returns true unless the attenuation has been deactivated.
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Returns true if the attenuation carries crosstalk.
    pub fn is_fluorescent(&self) -> bool {
        self.crosstalk.is_some()
    }

    /// Returns true if the attenuation changes the polarisation state of
    /// light.
    pub fn is_polarising(&self) -> bool {
        self.direct.is_polarising()
    }

    /// Returns the direct term.
    pub fn direct(&self) -> &DirectAttenuation {
        &self.direct
    }

    /// Returns the crosstalk, if any.
    pub fn crosstalk(&self) -> Option<&Crosstalk> {
        self.crosstalk.as_ref()
    }

    /// Returns the per channel intensity transmittance.
    pub fn diagonal(&self) -> &Spectrum {
        self.direct.diagonal()
    }

    /// Returns the entry reference frame. Fatal for plain light.
    pub fn entry_frame(&self) -> &ReferenceFrame {
        self.direct.entry_frame()
    }

    /// Returns the exit reference frame. Fatal for plain light.
    pub fn exit_frame(&self) -> &ReferenceFrame {
        self.direct.exit_frame()
    }

    /// Returns a copy re-expressed for a coaxial exit frame. The crosstalk
    /// does not depend on frames and is copied unchanged.
    ///
    /// * `target` - The new exit frame.
    pub fn realigned_to_coaxial_exit_frame(&self, target: &ReferenceFrame) -> Self {
        assert_valid!(self);
        assert_valid!(target);
        Self {
            direct: self
                .direct
                .realigned_to_coaxial_exit_frame(target, DEFAULT_COAXIALITY_TOLERANCE),
            crosstalk: self.crosstalk.clone(),
            initialised: self.initialised,
        }
    }

    /// Returns the L1 norm of the direct term.
    pub fn norm(&self) -> Float {
        assert_valid!(self);
        self.direct.norm()
    }

    /// Returns the average of the direct term, or the larger of the direct
    /// and crosstalk averages when fluorescent.
    pub fn avg(&self) -> Float {
        assert_valid!(self);
        match &self.crosstalk {
            Some(x) => max(self.direct.avg(), x.avg()),
            None => self.direct.avg(),
        }
    }

    /// Returns the largest entry of the direct term and the crosstalk.
    pub fn max(&self) -> Float {
        assert_valid!(self);
        match &self.crosstalk {
            Some(x) => max(self.direct.max(), x.max()),
            None => self.direct.max(),
        }
    }

    /// Returns the smallest entry of the direct term and the crosstalk.
    pub fn min(&self) -> Float {
        assert_valid!(self);
        match &self.crosstalk {
            Some(x) => min(self.direct.min(), x.min()),
            None => self.direct.min(),
        }
    }

    /// Returns the elementwise maximum of two attenuations.
    pub fn max_with(&self, _other: &Self) -> Self {
        work_in_progress!()
    }

    /// Returns the elementwise minimum of two attenuations.
    pub fn min_with(&self, _other: &Self) -> Self {
        work_in_progress!()
    }

    /// Returns the largest elementwise difference of two attenuations.
    pub fn max_diff(&self, _other: &Self) -> Float {
        work_in_progress!()
    }

    /// Returns the elementwise reciprocal. Zero crosstalk entries map to a
    /// huge value.
    pub fn inv(&self) -> Self {
        self.map(|d| d.inv(), |x| x.inv())
    }

    /// Returns the sum of two attenuations acting in parallel.
    ///
    /// * `other` - The other attenuation.
    pub fn add(&self, other: &Self) -> Self {
        if let Some(a) = transparent_operand(self, other) {
            return a;
        }
        self.assert_same_frames(other);

        let crosstalk = match (&self.crosstalk, &other.crosstalk) {
            (Some(x0), Some(x1)) => Some(x0 + x1),
            (Some(x), None) | (None, Some(x)) => Some(x.clone()),
            (None, None) => None,
        };
        self.combined(self.direct.add(&other.direct), crosstalk)
    }

    /// Returns the difference of two attenuations.
    ///
    /// * `other` - The attenuation to subtract.
    pub fn sub(&self, other: &Self) -> Self {
        if let Some(a) = transparent_operand(self, other) {
            return a;
        }
        self.assert_same_frames(other);

        let crosstalk = match (&self.crosstalk, &other.crosstalk) {
            (Some(x0), Some(x1)) => Some(x0 - x1),
            (Some(x0), None) => Some(x0.clone()),
            (None, Some(x1)) => Some(x1.negated()),
            (None, None) => None,
        };
        self.combined(self.direct.sub(&other.direct), crosstalk)
    }

    /// Scales the attenuation in place. Uninitialised attenuation is left
    /// as it is.
    ///
    /// * `d` - Non-negative factor.
    pub fn scale(&mut self, d: Float) {
        if !self.initialised {
            return;
        }
        foundation_assert!(d >= 0.0 && d.is_finite(), "invalid scale factor {}", d);
        if let Some(x) = &mut self.crosstalk {
            x.scale(d);
        }
        self.direct.scale(d);
    }

    /// Multiplies the attenuation channelwise with a filter spectrum in
    /// place, as if the filter acted after it. Uninitialised attenuation is
    /// left as it is.
    ///
    /// * `s` - Non-negative filter spectrum.
    pub fn mul_spectrum(&mut self, s: &Spectrum) {
        if !self.initialised {
            return;
        }
        foundation_assert!(
            s.is_valid() && s.is_nonnegative(0.0),
            "invalid filter spectrum {}",
            s
        );
        if let Some(x) = &mut self.crosstalk {
            x.mul_spectrum(s);
        }
        self.direct.mul_spectrum(s);
    }

    /// Returns the attenuation scaled by `d`.
    ///
    /// * `d` - Non-negative factor.
    pub fn mul_scalar(&self, d: Float) -> Self {
        let mut ret = self.clone();
        ret.scale(d);
        ret
    }

    /// Returns the attenuation divided by `d`. Factors that are not
    /// positive leave the attenuation unchanged.
    ///
    /// * `d` - Divisor.
    pub fn div_scalar(&self, d: Float) -> Self {
        let mut ret = self.clone();
        if d > 0.0 {
            ret.scale(1.0 / d);
        }
        ret
    }

    /// Returns the elementwise power `v^p`.
    ///
    /// * `p` - Exponent.
    pub fn pow(&self, p: Float) -> Self {
        self.map(|d| d.pow(p), |x| x.pow(p))
    }

    /// Returns the elementwise power `v^-p`.
    ///
    /// * `p` - Exponent.
    pub fn negpow(&self, p: Float) -> Self {
        self.map(|d| d.negpow(p), |x| x.negpow(p))
    }

    /// Returns `d * self + other`.
    ///
    /// * `d`     - Non-negative factor.
    /// * `other` - The attenuation to add.
    pub fn mul_add(&self, d: Float, other: &Self) -> Self {
        if let Some(a) = transparent_operand(self, other) {
            return a;
        }
        self.assert_same_frames(other);

        let crosstalk = match (&self.crosstalk, &other.crosstalk) {
            (Some(x0), Some(x1)) => Some(x0.mul_add(d, x1)),
            (Some(x0), None) => Some(x0 * d),
            (None, Some(x1)) => Some(x1.clone()),
            (None, None) => None,
        };
        self.combined(self.direct.mul_add(d, &other.direct), crosstalk)
    }

    /// Returns the linear interpolation `(1 - t) * self + t * other`.
    /// Missing crosstalk counts as zero.
    ///
    /// * `t`     - Interpolation parameter.
    /// * `other` - The other attenuation.
    pub fn interpolate(&self, t: Float, other: &Self) -> Self {
        if let Some(a) = transparent_operand(self, other) {
            return a;
        }
        self.assert_same_frames(other);

        let n = self.direct.channels();
        let crosstalk = match (&self.crosstalk, &other.crosstalk) {
            (Some(x0), Some(x1)) => Some(x0.interpolate(t, x1)),
            (Some(x0), None) => Some(x0.interpolate(t, &Crosstalk::new(n))),
            (None, Some(x1)) => Some(Crosstalk::new(n).interpolate(t, x1)),
            (None, None) => None,
        };
        self.combined(self.direct.interpolate(t, &other.direct), crosstalk)
    }

    /// Returns `1 - v` for every entry.
    pub fn complement_from_one(&self) -> Self {
        self.map(|d| d.complement_from_one(), |x| x.complement_from_one())
    }

    /// Returns an attenuation that is zero except for channel `i0`, which
    /// holds `1 - v`.
    ///
    /// * `i0` - The channel.
    pub fn singleband_complement_from_one(&self, i0: usize) -> Self {
        self.map(
            |d| d.singleband_complement_from_one(i0),
            |x| x.singleband_complement_from_one(i0),
        )
    }

    /// Overwrites channel `i0` with the scaled channel of another
    /// attenuation. An uninitialised source deactivates `self`.
    ///
    /// * `d`      - Factor.
    /// * `i0`     - The channel.
    /// * `source` - The attenuation the channel is copied from.
    pub fn singleband_mul_copy(&mut self, d: Float, i0: usize, source: &Self) {
        if !source.initialised {
            self.initialised = false;
            return;
        }

        self.direct.singleband_mul_copy(d, i0, &source.direct);
        self.crosstalk = match &source.crosstalk {
            Some(x) => {
                let mut ret = self
                    .crosstalk
                    .take()
                    .unwrap_or_else(|| Crosstalk::new(x.channels()));
                ret.singleband_mul_copy(d, i0, x);
                Some(ret)
            }
            None => None,
        };
        self.initialised = true;
    }

    /// Returns the concatenation of two attenuations where light passes
    /// `a0` first and `a1` second.
    ///
    /// The exit frame of `a0` must be coaxial with the entry frame of `a1`.
    /// With crosstalk on either side the transfers are multiplied as dense
    /// matrices, otherwise channel by channel.
    ///
    /// * `ctx` - The transport context.
    /// * `a0`  - The attenuation acting first.
    /// * `a1`  - The attenuation acting second.
    pub fn concatenate(ctx: &TransportContext, a0: &Self, a1: &Self) -> Self {
        if let Some(a) = transparent_operand(a0, a1) {
            return a;
        }

        assert_valid!(a0);
        assert_valid!(a1);
        assert_compatible_frames!(ctx, a0, a1, DEFAULT_COAXIALITY_TOLERANCE);

        let mut direct = a0.direct.concatenate(&a1.direct);
        let crosstalk = if a0.is_fluorescent() || a1.is_fluorescent() {
            let (diagonal, x) = concatenate_fluorescent(
                a0.diagonal(),
                a0.crosstalk.as_ref(),
                a1.diagonal(),
                a1.crosstalk.as_ref(),
            );
            direct.set_diagonal(diagonal);
            Some(x)
        } else {
            None
        };

        let ret = Self::new(direct, crosstalk);
        assert_valid!(ret);
        ret
    }

    /// Prepends `a0` to `ar` so that light passes `a0` first. An
    /// uninitialised `a0` leaves `ar` unchanged.
    ///
    /// * `ctx` - The transport context.
    /// * `a0`  - The attenuation acting first.
    /// * `ar`  - The attenuation acting second, replaced by the result.
    pub fn concatenate_into(ctx: &TransportContext, a0: &Self, ar: &mut Self) {
        if a0.initialised {
            *ar = Self::concatenate(ctx, a0, ar);
        }
    }

    /// Attenuates light in place. Uninitialised attenuation leaves the light
    /// unchanged.
    ///
    /// * `ctx` - The transport context.
    /// * `l`   - The light.
    pub fn apply_to_light(&self, ctx: &TransportContext, l: &mut Light) {
        if !self.initialised {
            return;
        }

        assert_valid!(self);
        if ctx.is_polarisable() {
            if let Some(frame) = l.frame() {
                assert_coaxial_frames!(frame, self.entry_frame(), DEFAULT_COAXIALITY_TOLERANCE);
            }
        }

        self.direct.apply(self.crosstalk.as_ref(), l);
        assert_valid!(l);
    }

    /// Returns attenuated light.
    ///
    /// * `ctx` - The transport context.
    /// * `l`   - The light.
    pub fn applied_to_light(&self, ctx: &TransportContext, l: &Light) -> Light {
        let mut ret = l.clone();
        self.apply_to_light(ctx, &mut ret);
        ret
    }

    /// Returns an attenuated spectral intensity. Polarisation is ignored.
    ///
    /// * `s` - The intensity.
    pub fn apply_to_intensity(&self, s: &Spectrum) -> Spectrum {
        if !self.initialised {
            return s.clone();
        }
        match &self.crosstalk {
            Some(x) => x.apply(self.diagonal(), s),
            None => self.diagonal() * s,
        }
    }

    /// Returns true if the crosstalk and the direct term hold valid data.
    pub fn is_valid(&self) -> bool {
        if let Some(x) = &self.crosstalk {
            if !x.is_valid() {
                warn!("invalid crosstalk");
                return false;
            }
        }
        if !self.direct.is_valid() {
            warn!("invalid direct attenuation");
            return false;
        }
        true
    }

    /// Applies unary operations to the direct term and crosstalk.
    fn map<D, X>(&self, fd: D, fx: X) -> Self
    where
        D: Fn(&DirectAttenuation) -> DirectAttenuation,
        X: Fn(&Crosstalk) -> Crosstalk,
    {
        if !self.initialised {
            return self.clone();
        }
        Self::new(fd(&self.direct), self.crosstalk.as_ref().map(fx))
    }

    /// Wraps the result of a binary operation.
    fn combined(&self, direct: DirectAttenuation, crosstalk: Option<Crosstalk>) -> Self {
        let ret = Self::new(direct, crosstalk);
        assert_valid!(ret);
        ret
    }

    /// Checks that two polarising attenuations have identical frames.
    fn assert_same_frames(&self, other: &Self) {
        if let (DirectAttenuation::Mueller(a), DirectAttenuation::Mueller(b)) = (&self.direct, &other.direct) {
            assert_identical_frames!(a.entry, b.entry);
            assert_identical_frames!(a.exit, b.exit);
        }
    }
}

impl Clamp<Float> for Attenuation {
    /// Clamps every entry to [low, high].
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    fn clamp(&self, low: Float, high: Float) -> Self {
        self.map(|d| d.clamp(low, high), |x| Clamp::clamp(x, low, high))
    }
}

impl fmt::Display for Attenuation {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.initialised {
            return write!(f, "Attenuation (uninitialised)");
        }
        match &self.crosstalk {
            Some(x) => write!(f, "Attenuation {}\n{}", self.direct, x),
            None => write!(f, "Attenuation {}", self.direct),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::StokesLight;
    use crate::polarisation::StokesVector;
    use float_cmp::approx_eq;
    use foundation::geometry::*;
    use foundation::spectrum::Isr;
    use proptest::prelude::*;

    fn plain_ctx() -> TransportContext {
        TransportContext::plain(Isr::new(4, 400.0, 75.0).unwrap()).unwrap()
    }

    fn polarisable_ctx() -> TransportContext {
        TransportContext::polarisable(Isr::new(4, 400.0, 75.0).unwrap()).unwrap()
    }

    fn spectrum(v: &[Float]) -> Spectrum {
        Spectrum::from(v)
    }

    fn fluorescent(ctx: &TransportContext, d: &[Float], x: Float) -> Attenuation {
        Attenuation::from_spectrum_crosstalk(ctx, spectrum(d), Crosstalk::from_value(ctx.channels(), x))
    }

    fn close(a: &Spectrum, b: &Spectrum) -> bool {
        a.samples()
            .iter()
            .zip(b.samples())
            .all(|(x, y)| approx_eq!(Float, *x, *y, epsilon = 1e-5))
    }

    fn polarised_light(ctx: &TransportContext, frame: ReferenceFrame) -> Light {
        let sv = StokesVector::new([
            spectrum(&[1.0, 2.0, 3.0, 4.0]),
            Spectrum::new(4, 0.5),
            Spectrum::new(4, 0.25),
            Spectrum::new(4, 0.125),
        ]);
        Light::from_stokes(ctx, sv, frame)
    }

    #[test]
    fn self_concatenation_squares_transmittance() {
        let ctx = plain_ctx();
        let a = Attenuation::from_value(&ctx, 0.5);
        let aa = Attenuation::concatenate(&ctx, &a, &a);

        let l = aa.applied_to_light(&ctx, &Light::unit(&ctx));
        assert_eq!(l.intensity(), &Spectrum::new(4, 0.25));
        assert!(!aa.is_fluorescent());
    }

    #[test]
    fn self_concatenation_squares_transmittance_for_stokes_light() {
        let ctx = polarisable_ctx();
        let f = ReferenceFrame::default();
        let a = Attenuation::from_value_frames_nonpolarising(&ctx, 0.5, &f, &f);
        let aa = Attenuation::concatenate(&ctx, &a, &a);

        let l = aa.applied_to_light(&ctx, &Light::unit(&ctx));
        assert_eq!(l.intensity(), &Spectrum::new(4, 0.25));
    }

    #[test]
    fn uninitialised_operand_is_transparent() {
        let ctx = plain_ctx();
        let a = Attenuation::from_value(&ctx, 0.5);
        let u = Attenuation::uninitialised(&ctx);
        assert!(!u.is_initialised());

        assert_eq!(a.add(&u), a);
        assert_eq!(u.add(&a), a);
        assert_eq!(a.sub(&u), a);
        assert_eq!(a.mul_add(2.0, &u), a);
        assert_eq!(a.interpolate(0.3, &u), a);
        assert_eq!(Attenuation::concatenate(&ctx, &u, &a), a);
        assert_eq!(Attenuation::concatenate(&ctx, &a, &u), a);
        assert!(!Attenuation::concatenate(&ctx, &u, &u).is_initialised());
        assert!(!u.pow(2.0).is_initialised());

        let mut l = Light::unit(&ctx);
        u.apply_to_light(&ctx, &mut l);
        assert_eq!(l, Light::unit(&ctx));

        let mut ar = a.clone();
        Attenuation::concatenate_into(&ctx, &u, &mut ar);
        assert_eq!(ar, a);
    }

    #[test]
    fn deactivate_and_copy() {
        let ctx = plain_ctx();
        let mut a = Attenuation::from_value(&ctx, 0.5);
        a.deactivate();
        assert!(!Attenuation::from_attenuation(&a).is_initialised());

        let f = ReferenceFrame::default();
        assert!(!Attenuation::from_attenuation_frames_depolarising(&ctx, &a, &f, &f).is_initialised());
    }

    #[test]
    fn fluorescent_concatenation_matches_sequential_application() {
        let ctx = plain_ctx();
        let a0 = fluorescent(&ctx, &[0.5, 0.4, 0.3, 0.2], 0.1);
        let a1 = fluorescent(&ctx, &[0.9, 0.8, 0.7, 0.6], 0.05);
        let l0 = Light::from_intensity(&ctx, spectrum(&[1.0, 2.0, 3.0, 4.0]));

        let sequential = a1.applied_to_light(&ctx, &a0.applied_to_light(&ctx, &l0));
        let a = Attenuation::concatenate(&ctx, &a0, &a1);
        assert!(a.is_fluorescent());
        let combined = a.applied_to_light(&ctx, &l0);

        for (x, y) in sequential.intensity().samples().iter().zip(combined.intensity().samples()) {
            assert!(approx_eq!(Float, *x, *y, epsilon = 1e-5), "{} != {}", x, y);
        }
    }

    #[test]
    fn one_sided_fluorescence_in_concatenation() {
        let ctx = plain_ctx();
        let a0 = Attenuation::from_value(&ctx, 0.5);
        let a1 = fluorescent(&ctx, &[1.0, 1.0, 1.0, 1.0], 0.25);
        let a = Attenuation::concatenate(&ctx, &a0, &a1);

        assert_eq!(a.diagonal(), &Spectrum::new(4, 0.5));
        let x = a.crosstalk().unwrap();
        assert_eq!(x.xy(0, 1), 0.125);
        assert_eq!(x.xy(2, 3), 0.125);
    }

    #[test]
    fn fluorescent_reductions() {
        let ctx = plain_ctx();
        let a = fluorescent(&ctx, &[0.5, 0.5, 0.5, 0.5], 0.75);
        assert_eq!(a.avg(), 0.75);
        assert_eq!(a.max(), 0.75);
        assert_eq!(a.min(), 0.5);
        assert_eq!(a.norm(), 2.0);
        assert_eq!(a.apply_to_intensity(&Spectrum::new(4, 1.0)), spectrum(&[0.5, 1.25, 2.0, 2.75]));
    }

    #[test]
    fn scalar_operations() {
        let ctx = plain_ctx();
        let a = fluorescent(&ctx, &[0.5, 0.5, 0.5, 0.5], 0.25);
        let b = a.div_scalar(2.0);
        assert_eq!(b.diagonal(), &Spectrum::new(4, 0.25));
        assert_eq!(b.crosstalk().unwrap().xy(0, 1), 0.125);
        assert_eq!(a.div_scalar(0.0), a);
        assert_eq!(a.mul_scalar(2.0).diagonal(), &Spectrum::new(4, 1.0));
        assert_eq!(a.clamp(0.3, 1.0).crosstalk().unwrap().xy(0, 3), 0.3);
        assert_eq!(a.complement_from_one().diagonal(), &Spectrum::new(4, 0.5));
    }

    #[test]
    fn filter_spectrum_scales_direct_and_emitted_light() {
        let ctx = plain_ctx();
        let filter = spectrum(&[0.5, 1.0, 0.0, 2.0]);
        let a = fluorescent(&ctx, &[0.5, 0.4, 0.3, 0.2], 0.1);
        let mut filtered = a.clone();
        filtered.mul_spectrum(&filter);

        assert_eq!(filtered.diagonal(), &spectrum(&[0.25, 0.4, 0.0, 0.4]));
        let x = filtered.crosstalk().unwrap();
        assert_eq!(x.xy(0, 1), 0.1);
        assert_eq!(x.xy(1, 2), 0.0);
        assert_eq!(x.xy(0, 3), 0.2);

        let l0 = Light::from_intensity(&ctx, spectrum(&[1.0, 2.0, 3.0, 4.0]));
        let expected = a.applied_to_light(&ctx, &l0).intensity() * &filter;
        assert!(close(filtered.applied_to_light(&ctx, &l0).intensity(), &expected));

        let mut u = Attenuation::uninitialised(&ctx);
        u.mul_spectrum(&filter);
        assert!(!u.is_initialised());
    }

    #[test]
    fn filter_spectrum_scales_every_mueller_element() {
        let ctx = polarisable_ctx();
        let f = ReferenceFrame::default();
        let filter = spectrum(&[0.5, 1.0, 0.25, 2.0]);
        let a = Attenuation::linear_polariser(&ctx, 0.3, 0.8, &f, &f);
        let mut filtered = a.clone();
        filtered.mul_spectrum(&filter);
        assert_eq!(filtered.entry_frame(), a.entry_frame());
        assert_eq!(filtered.exit_frame(), a.exit_frame());

        let l0 = polarised_light(&ctx, f);
        let expected = a.applied_to_light(&ctx, &l0).to_stokes();
        let actual = filtered.applied_to_light(&ctx, &l0).to_stokes();
        for i in 0..4 {
            assert!(close(&actual[i], &(&expected[i] * &filter)));
        }
    }

    #[test]
    #[cfg(feature = "foundation-assertions")]
    #[should_panic(expected = "invalid value")]
    fn subtracting_fluorescence_from_plain_attenuation_is_invalid() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = plain_ctx();
        let a0 = Attenuation::from_value(&ctx, 1.0);
        let a1 = fluorescent(&ctx, &[0.5, 0.5, 0.5, 0.5], 0.25);
        a0.sub(&a1);
    }

    #[test]
    #[cfg(not(feature = "foundation-assertions"))]
    fn subtracting_fluorescence_from_plain_attenuation_negates_crosstalk() {
        let ctx = plain_ctx();
        let a0 = Attenuation::from_value(&ctx, 1.0);
        let a1 = fluorescent(&ctx, &[0.5, 0.5, 0.5, 0.5], 0.25);
        let a = a0.sub(&a1);
        assert_eq!(a.diagonal(), &Spectrum::new(4, 0.5));
        assert_eq!(a.crosstalk().unwrap().xy(0, 1), -0.25);
        assert!(!a.is_valid());
    }

    #[test]
    fn interpolation_treats_missing_crosstalk_as_zero() {
        let ctx = plain_ctx();
        let a0 = Attenuation::from_value(&ctx, 0.0);
        let a1 = fluorescent(&ctx, &[1.0, 1.0, 1.0, 1.0], 0.5);
        let a = a0.interpolate(0.5, &a1);
        assert_eq!(a.diagonal(), &Spectrum::new(4, 0.5));
        assert_eq!(a.crosstalk().unwrap().xy(1, 2), 0.25);
    }

    #[test]
    fn singleband_copy_takes_source_crosstalk() {
        let ctx = plain_ctx();
        let source = fluorescent(&ctx, &[0.5, 0.5, 0.5, 0.5], 0.25);
        let mut a = Attenuation::from_value(&ctx, 1.0);
        a.singleband_mul_copy(2.0, 1, &source);
        assert_eq!(a.diagonal(), &spectrum(&[1.0, 1.0, 1.0, 1.0]));
        assert!(a.is_fluorescent());

        let mut u = Attenuation::uninitialised(&ctx);
        u.singleband_mul_copy(1.0, 0, &source);
        assert!(u.is_initialised());
    }

    #[test]
    fn polariser_in_polarisable_context() {
        let ctx = polarisable_ctx();
        let f = ReferenceFrame::default();
        let p = Attenuation::linear_polariser(&ctx, 0.0, 1.0, &f, &f);
        assert!(p.is_polarising());

        let l = p.applied_to_light(&ctx, &Light::unit(&ctx));
        assert!(l.is_polarised());
        assert_eq!(l.frame(), Some(&f));
        assert_eq!(l.intensity(), &Spectrum::new(4, 0.5));

        let crossed = Attenuation::linear_polariser(&ctx, PI / 2.0, 1.0, &f, &f);
        let blocked = crossed.applied_to_light(&ctx, &l);
        assert!(blocked.intensity().samples().iter().all(|v| abs(*v) < 1e-5));
    }

    #[test]
    fn realignment_keeps_crosstalk() {
        let ctx = polarisable_ctx();
        let f = ReferenceFrame::default();
        let x = Crosstalk::from_value(4, 0.1);
        let a = Attenuation::from_spectrum_crosstalk_frames_nonpolarising(&ctx, Spectrum::new(4, 0.5), x.clone(), &f, &f);
        let target = f.rotated(0.4);
        let r = a.realigned_to_coaxial_exit_frame(&target);
        assert_eq!(r.exit_frame(), &target);
        assert_eq!(r.crosstalk(), Some(&x));
    }

    #[test]
    fn fluorescent_stokes_light() {
        let ctx = polarisable_ctx();
        let f = ReferenceFrame::default();
        let a = Attenuation::from_spectrum_crosstalk_frames_depolarising(
            &ctx,
            Spectrum::new(4, 0.5),
            Crosstalk::from_value(4, 0.25),
            &f,
            &f,
        );
        let sv = StokesVector::new([
            Spectrum::new(4, 1.0),
            Spectrum::new(4, 0.5),
            Spectrum::zero(4),
            Spectrum::zero(4),
        ]);
        let l = a.applied_to_light(&ctx, &StokesLight::from_stokes(sv, f).into());
        assert!(!l.is_polarised());
        assert_eq!(l.intensity(), &spectrum(&[0.5, 0.75, 1.0, 1.25]));
    }

    #[test]
    #[should_panic(expected = "polarisation related functionality")]
    fn plain_attenuation_has_no_frames() {
        let ctx = plain_ctx();
        Attenuation::from_value(&ctx, 0.5).entry_frame();
    }

    #[test]
    #[should_panic(expected = "non-polarisation aware attenuation functionality")]
    fn plain_constructor_in_polarisable_context() {
        Attenuation::from_value(&polarisable_ctx(), 0.5);
    }

    #[test]
    #[should_panic(expected = "code is work in progress")]
    fn max_with_is_work_in_progress() {
        let ctx = plain_ctx();
        let a = Attenuation::from_value(&ctx, 0.5);
        a.max_with(&a);
    }

    #[test]
    #[cfg(feature = "foundation-assertions")]
    #[should_panic(expected = "not coaxial")]
    fn concatenation_of_perpendicular_frames_fails() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = polarisable_ctx();
        let f0 = ReferenceFrame::default();
        let f1 = ReferenceFrame::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(1.0, 0.0, 0.0));
        let a0 = Attenuation::from_value_frames_depolarising(&ctx, 0.5, &f0, &f0);
        let a1 = Attenuation::from_value_frames_depolarising(&ctx, 0.5, &f1, &f1);
        Attenuation::concatenate(&ctx, &a0, &a1);
    }

    #[test]
    #[cfg(feature = "foundation-assertions")]
    #[should_panic(expected = "not identical")]
    fn addition_needs_identical_frames() {
        let ctx = polarisable_ctx();
        let f0 = ReferenceFrame::default();
        let f1 = f0.rotated(0.5);
        let a0 = Attenuation::from_value_frames_nonpolarising(&ctx, 0.5, &f0, &f0);
        let a1 = Attenuation::from_value_frames_nonpolarising(&ctx, 0.5, &f1, &f1);
        a0.add(&a1);
    }

    proptest! {
        #[test]
        fn concatenation_is_associative(
            d in prop::array::uniform3(0.0..1.0f32),
            x in prop::array::uniform3(0.0..0.2f32),
        ) {
            let ctx = plain_ctx();
            let a: Vec<Attenuation> = (0..3)
                .map(|i| fluorescent(&ctx, &[d[i], d[i], d[i], d[i]], x[i]))
                .collect();

            let left = Attenuation::concatenate(&ctx, &Attenuation::concatenate(&ctx, &a[0], &a[1]), &a[2]);
            let right = Attenuation::concatenate(&ctx, &a[0], &Attenuation::concatenate(&ctx, &a[1], &a[2]));

            for (l, r) in left.diagonal().samples().iter().zip(right.diagonal().samples()) {
                prop_assert!(approx_eq!(Float, *l, *r, epsilon = 1e-5));
            }
            let (xl, xr) = (left.crosstalk().unwrap(), right.crosstalk().unwrap());
            for (l, r) in xl.entries().iter().zip(xr.entries()) {
                prop_assert!(approx_eq!(Float, *l, *r, epsilon = 1e-5));
            }
        }

        #[test]
        fn diagonal_concatenation_is_associative(
            d in prop::array::uniform3(prop::array::uniform4(0.0..1.0f32)),
        ) {
            let ctx = plain_ctx();
            let a: Vec<Attenuation> = d
                .iter()
                .map(|v| Attenuation::from_spectrum(&ctx, spectrum(v)))
                .collect();

            let left = Attenuation::concatenate(&ctx, &Attenuation::concatenate(&ctx, &a[0], &a[1]), &a[2]);
            let right = Attenuation::concatenate(&ctx, &a[0], &Attenuation::concatenate(&ctx, &a[1], &a[2]));
            prop_assert!(close(left.diagonal(), right.diagonal()));
            prop_assert!(!left.is_fluorescent() && !right.is_fluorescent());

            let l0 = Light::from_intensity(&ctx, spectrum(&[1.0, 2.0, 3.0, 4.0]));
            let sequential = a.iter().fold(l0.clone(), |l, ai| ai.applied_to_light(&ctx, &l));
            prop_assert!(close(left.applied_to_light(&ctx, &l0).intensity(), sequential.intensity()));
        }

        #[test]
        fn mueller_concatenation_with_shared_frames_is_associative(
            d in prop::array::uniform3(0.0..1.0f32),
            depolarising in prop::array::uniform3(any::<bool>()),
        ) {
            let ctx = polarisable_ctx();
            let f = ReferenceFrame::default();
            let a: Vec<Attenuation> = (0..3)
                .map(|i| {
                    if depolarising[i] {
                        Attenuation::from_value_frames_depolarising(&ctx, d[i], &f, &f)
                    } else {
                        Attenuation::from_value_frames_nonpolarising(&ctx, d[i], &f, &f)
                    }
                })
                .collect();

            let left = Attenuation::concatenate(&ctx, &Attenuation::concatenate(&ctx, &a[0], &a[1]), &a[2]);
            let right = Attenuation::concatenate(&ctx, &a[0], &Attenuation::concatenate(&ctx, &a[1], &a[2]));
            prop_assert!(close(left.diagonal(), right.diagonal()));

            let l0 = polarised_light(&ctx, f);
            let sequential = a.iter().fold(l0.clone(), |l, ai| ai.applied_to_light(&ctx, &l)).to_stokes();
            let (sl, sr) = (
                left.applied_to_light(&ctx, &l0).to_stokes(),
                right.applied_to_light(&ctx, &l0).to_stokes(),
            );
            for i in 0..4 {
                prop_assert!(close(&sl[i], &sr[i]));
                prop_assert!(close(&sl[i], &sequential[i]));
            }
        }

        #[test]
        fn free_transmission_is_neutral(v in 0.0..10.0f32) {
            let ctx = plain_ctx();
            let l = Light::from_value(&ctx, v);
            prop_assert_eq!(ctx.free_transmission().applied_to_light(&ctx, &l), l);
        }
    }
}
