//! Hero Wavelengths
//!
//! Every light path carries 4 wavelengths that are sampled jointly. The first
//! one (the hero) is drawn uniformly from the spectral range of the ISR and
//! the other 3 are spaced a quarter of the range apart, wrapping around at
//! the end of the range.

use crate::math::*;
use crate::rng::Pcg32;
use crate::spectrum::Isr;
use std::fmt;
use std::ops::Index;

/// Number of wavelengths sampled per path.
pub const HERO_SAMPLES: usize = 4;

/// Two hero wavelengths closer than this (in nm) are considered a match by
/// `Wavelength::ranged_match`.
pub const RANGED_MATCH_TOLERANCE_NM: Float = 5.0;

/// Precomputed range data used to sample hero wavelengths.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WavelengthSamplingData {
    /// Start of the spectral range in nm.
    pub start: Float,

    /// End of the spectral range in nm.
    pub end: Float,

    /// Width of the spectral range in nm.
    pub range: Float,

    /// Spacing between consecutive hero wavelengths in nm.
    pub range_div_4: Float,
}

impl WavelengthSamplingData {
    /// Derive sampling data from an ISR.
    ///
    /// * `isr` - The internal spectral representation.
    pub fn from_isr(isr: &Isr) -> Result<Self, String> {
        let start = isr.spectral_range_start();
        let end = isr.spectral_range_end();
        let range = end - start;
        if !(range.is_finite() && range > 0.0) {
            return Err(format!(
                "spectral range [{}, {}] cannot be sampled",
                start, end
            ));
        }
        Ok(Self {
            start,
            end,
            range,
            range_div_4: range / HERO_SAMPLES as Float,
        })
    }
}

/// 4 jointly sampled wavelengths in nm.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Wavelength {
    c: [Float; HERO_SAMPLES],
}

impl Wavelength {
    /// Create a new `Wavelength` with all 4 components equal.
    ///
    /// * `d` - Wavelength in nm.
    pub fn from_value(d: Float) -> Self {
        Self {
            c: [d; HERO_SAMPLES],
        }
    }

    /// Create a new `Wavelength` from 4 components.
    ///
    /// * `c` - Wavelengths in nm.
    pub fn from_array(c: [Float; HERO_SAMPLES]) -> Self {
        Self { c }
    }

    /// Samples 4 hero wavelengths from a random value.
    ///
    /// * `sd` - Sampling data of the active ISR.
    /// * `u`  - Random value in [0, 1).
    pub fn sample(sd: &WavelengthSamplingData, u: Float) -> Self {
        foundation_assert!(is_unit_range(u), "u = {}", u);

        let hero = sd.start + u * sd.range;
        let mut c = [hero; HERO_SAMPLES];
        for (i, w) in c.iter_mut().enumerate().skip(1) {
            *w = hero + i as Float * sd.range_div_4;
            if *w > sd.end {
                *w -= sd.range;
            }
        }

        let ret = Self { c };
        foundation_assert!(ret.is_within(sd), "wavelength {} outside range", ret);
        ret
    }

    /// Samples 4 hero wavelengths with a value drawn from a random number
    /// generator.
    ///
    /// * `sd`  - Sampling data of the active ISR.
    /// * `rng` - The random number generator.
    pub fn sample_rng(sd: &WavelengthSamplingData, rng: &mut Pcg32) -> Self {
        Self::sample(sd, rng.uniform_float())
    }

    /// Places all 4 wavelengths at the centre of one ISR channel.
    ///
    /// * `isr`     - The internal spectral representation.
    /// * `channel` - Channel index.
    pub fn deterministic(isr: &Isr, channel: usize) -> Self {
        foundation_assert!(
            channel < isr.channels(),
            "channel {} of {}",
            channel,
            isr.channels()
        );
        Self::from_value(isr.channel_center(channel))
    }

    /// Returns the wavelengths.
    pub fn samples(&self) -> &[Float; HERO_SAMPLES] {
        &self.c
    }

    /// Returns the hero wavelength.
    pub fn hero(&self) -> Float {
        self.c[0]
    }

    /// Returns true if every wavelength is finite and inside the spectral
    /// range of the ISR.
    ///
    /// * `isr` - The internal spectral representation.
    pub fn is_valid(&self, isr: &Isr) -> bool {
        let start = isr.spectral_range_start();
        let end = isr.spectral_range_end();
        let valid = self
            .c
            .iter()
            .all(|w| w.is_finite() && *w >= start && *w <= end);
        if !valid {
            warn!("wavelength {} outside [{}, {}]", self, start, end);
        }
        valid
    }

    fn is_within(&self, sd: &WavelengthSamplingData) -> bool {
        self.c
            .iter()
            .all(|w| w.is_finite() && *w >= sd.start && *w <= sd.end)
    }

    /// Compares the hero wavelengths only. The other 3 components are
    /// ignored, so two sets that share a hero but differ elsewhere compare
    /// equal.
    ///
    /// * `other` - The other wavelength set.
    pub fn hero_equal(&self, other: &Self) -> bool {
        self.c[0] == other.c[0]
    }

    /// Returns the index of the first component of `other` within
    /// `RANGED_MATCH_TOLERANCE_NM` of this hero wavelength.
    ///
    /// * `other` - The other wavelength set.
    pub fn ranged_match(&self, other: &Self) -> Option<usize> {
        other
            .c
            .iter()
            .position(|w| abs(self.c[0] - *w) <= RANGED_MATCH_TOLERANCE_NM)
    }
}

impl Index<usize> for Wavelength {
    type Output = Float;

    /// Index the wavelength set.
    ///
    /// * `i` - Component index 0..3.
    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl fmt::Display for Wavelength {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}nm, {}nm, {}nm, {}nm)",
            self.c[0], self.c[1], self.c[2], self.c[3]
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn isr_400_700() -> Isr {
        Isr::new(4, 400.0, 75.0).unwrap()
    }

    #[test]
    fn sampling_data_from_isr() {
        let sd = WavelengthSamplingData::from_isr(&isr_400_700()).unwrap();
        assert_eq!(sd.start, 400.0);
        assert_eq!(sd.end, 700.0);
        assert_eq!(sd.range, 300.0);
        assert_eq!(sd.range_div_4, 75.0);
    }

    #[test]
    fn sample_at_zero() {
        let sd = WavelengthSamplingData::from_isr(&isr_400_700()).unwrap();
        let w = Wavelength::sample(&sd, 0.0);
        assert_eq!(w.samples(), &[400.0, 475.0, 550.0, 625.0]);
    }

    #[test]
    fn sample_wraps_around() {
        let sd = WavelengthSamplingData::from_isr(&isr_400_700()).unwrap();
        let w = Wavelength::sample(&sd, 0.6);
        assert!(approx_eq!(Float, w[0], 580.0, epsilon = 1e-3));
        assert!(approx_eq!(Float, w[1], 655.0, epsilon = 1e-3));
        assert!(approx_eq!(Float, w[2], 430.0, epsilon = 1e-3));
        assert!(approx_eq!(Float, w[3], 505.0, epsilon = 1e-3));
        assert!(w.is_valid(&isr_400_700()));
    }

    #[test]
    fn deterministic_uses_channel_center() {
        let w = Wavelength::deterministic(&isr_400_700(), 2);
        assert_eq!(w, Wavelength::from_value(587.5));
    }

    #[test]
    fn validity() {
        let isr = isr_400_700();
        assert!(Wavelength::from_array([400.0, 500.0, 600.0, 700.0]).is_valid(&isr));
        assert!(!Wavelength::from_array([400.0, 500.0, 600.0, 701.0]).is_valid(&isr));
        assert!(!Wavelength::from_array([Float::NAN, 500.0, 600.0, 700.0]).is_valid(&isr));
    }

    #[test]
    fn hero_equality_ignores_other_components() {
        let a = Wavelength::from_array([450.0, 500.0, 550.0, 600.0]);
        let b = Wavelength::from_array([450.0, 410.0, 420.0, 430.0]);
        assert!(a.hero_equal(&b));
        assert!(!a.hero_equal(&Wavelength::from_value(451.0)));
    }

    #[test]
    fn ranged_match_finds_first_close_component() {
        let a = Wavelength::from_value(500.0);
        let b = Wavelength::from_array([420.0, 503.0, 498.0, 600.0]);
        assert_eq!(a.ranged_match(&b), Some(1));
        assert_eq!(a.ranged_match(&Wavelength::from_value(520.0)), None);
    }

    #[test]
    fn rng_sampling_is_valid() {
        let isr = isr_400_700();
        let sd = WavelengthSamplingData::from_isr(&isr).unwrap();
        let mut rng = Pcg32::new(11);
        for _ in 0..100 {
            assert!(Wavelength::sample_rng(&sd, &mut rng).is_valid(&isr));
        }
    }

    proptest! {
        #[test]
        fn samples_stay_in_range(u in 0.0..1.0f32, channels in 1..64usize) {
            let isr = Isr::new(channels, 380.0, 5.0).unwrap();
            let sd = WavelengthSamplingData::from_isr(&isr).unwrap();
            let w = Wavelength::sample(&sd, u);
            prop_assert!(w.is_valid(&isr));
        }
    }
}
