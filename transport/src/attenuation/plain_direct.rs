//! Plain Direct Attenuation

use crate::light::PlainLight;
use crate::reference_frame::ReferenceFrame;
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;

/// Smallest channel value a plain attenuation may hold.
const NEGATIVE_CHANNEL_TOLERANCE: Float = -1e-8;

/// Per channel transmittance of plain light.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlainDirectAttenuation {
    /// Transmittance per channel.
    pub spectrum: Spectrum,
}

/// Aborts on access to polarisation state that plain attenuation does not
/// carry.
pub(super) fn polarisation_unavailable() -> ! {
    fatal_error!("polarisation related functionality accessed for plain attenuation data")
}

impl PlainDirectAttenuation {
    /// Create a new `PlainDirectAttenuation`.
    ///
    /// * `spectrum` - Transmittance per channel.
    pub fn new(spectrum: Spectrum) -> Self {
        Self { spectrum }
    }

    /// Returns the reference frame light enters through. Always fatal.
    pub fn entry_frame(&self) -> &ReferenceFrame {
        polarisation_unavailable()
    }

    /// Returns the reference frame light leaves through. Always fatal.
    pub fn exit_frame(&self) -> &ReferenceFrame {
        polarisation_unavailable()
    }

    /// Returns the transmittance of each channel.
    pub fn diagonal(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Returns `1 - v` for every channel.
    pub fn complement_from_one(&self) -> Self {
        Self::new(self.spectrum.complement_from_one())
    }

    /// Returns an attenuation that is zero everywhere except for channel
    /// `i0`, which holds `1 - v`.
    ///
    /// * `i0` - The channel.
    pub fn singleband_complement_from_one(&self, i0: usize) -> Self {
        let mut s = Spectrum::zero(self.spectrum.channels());
        s[i0] = 1.0 - self.spectrum[i0];
        Self::new(s)
    }

    /// Overwrites channel `i0` with the scaled channel of another
    /// attenuation.
    ///
    /// * `d`      - Factor.
    /// * `i0`     - The channel.
    /// * `source` - The attenuation the channel is copied from.
    pub fn singleband_mul_copy(&mut self, d: Float, i0: usize, source: &Self) {
        self.spectrum[i0] = d * source.spectrum[i0];
    }

    /// Attenuates plain light in place.
    ///
    /// * `l` - The light.
    pub fn apply(&self, l: &mut PlainLight) {
        l.spectrum = &self.spectrum * &l.spectrum;
    }

    /// Returns true if the transmittance is a valid spectrum with no
    /// channel below a small negative tolerance.
    pub fn is_valid(&self) -> bool {
        if !self.spectrum.is_valid() {
            warn!("invalid colour");
            return false;
        }

        let n = self.spectrum.channels();
        let mut valid = true;
        for (i, v) in self.spectrum.samples().iter().enumerate() {
            if *v < NEGATIVE_CHANNEL_TOLERANCE {
                warn!("channel {} of {}: {:.8} < 0.0", i, n, v);
                valid = false;
            }
        }
        valid
    }
}

impl fmt::Display for PlainDirectAttenuation {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlainDirectAttenuation {}", self.spectrum)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn attenuation(v: &[Float]) -> PlainDirectAttenuation {
        PlainDirectAttenuation::new(Spectrum::from(v))
    }

    #[test]
    fn singleband_operations() {
        let a = attenuation(&[0.25, 0.5, 0.75]);
        assert_eq!(a.singleband_complement_from_one(1), attenuation(&[0.0, 0.5, 0.0]));
        assert_eq!(a.complement_from_one(), attenuation(&[0.75, 0.5, 0.25]));

        let mut b = attenuation(&[1.0, 1.0, 1.0]);
        b.singleband_mul_copy(2.0, 2, &a);
        assert_eq!(b, attenuation(&[1.0, 1.0, 1.5]));
    }

    #[test]
    fn applies_to_plain_light() {
        let a = attenuation(&[0.5, 0.25]);
        let mut l = PlainLight::new(Spectrum::from(&[2.0, 2.0][..]));
        a.apply(&mut l);
        assert_eq!(l.spectrum, Spectrum::from(&[1.0, 0.5][..]));
    }

    #[test]
    fn validity_tolerates_rounding() {
        assert!(attenuation(&[0.0, -1e-9]).is_valid());
        assert!(!attenuation(&[0.0, -1e-3]).is_valid());
        assert!(!attenuation(&[Float::INFINITY]).is_valid());
    }

    #[test]
    #[should_panic(expected = "polarisation related functionality")]
    fn frames_are_unavailable() {
        attenuation(&[1.0]).entry_frame();
    }
}
