//! Hero Sample Splatting

use super::*;
use crate::math::*;
use crate::wavelength::{Wavelength, HERO_SAMPLES};

/// A channel that receives part of a splatted value and its weight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplatTarget {
    /// ISR channel index.
    pub channel: usize,

    /// Fraction of the value added to the channel.
    pub factor: Float,
}

/// Lookup table that distributes values sampled at a wavelength onto the two
/// nearest ISR channels. Built once per ISR on the 1nm grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SplattingData {
    targets: Vec<[Option<SplatTarget>; 2]>,
}

impl SplattingData {
    /// Builds the splatting table for an ISR. Every 1nm cell whose centre
    /// lies inside a channel splats onto that channel and, weighted linearly
    /// by the distance to its centre, onto the neighbouring channel on the
    /// same side.
    ///
    /// * `isr` - The internal spectral representation.
    pub fn from_isr(isr: &Isr) -> Self {
        let n = isr.channels();
        let mut current = 0;
        let mut targets = Vec::with_capacity(S500_CHANNELS);

        for i in 0..S500_CHANNELS {
            let wl = s500_channel_lower_bound(i) + 0.5 * S500_STEP_NM;

            if current < n && wl > isr.channel_lower_bound(current) + isr.channel_width(current) {
                current += 1;
            }
            if current == n || wl < isr.channel_lower_bound(current) {
                targets.push([None, None]);
                continue;
            }

            let center = isr.channel_center(current);
            let neighbour = if wl > center {
                Some(current + 1).filter(|c| *c < n)
            } else {
                current.checked_sub(1)
            };

            let entry = match neighbour {
                Some(c) => {
                    let width = isr.channel_width(current);
                    let f0 = (width - abs(wl - center)) / width;
                    [
                        Some(SplatTarget {
                            channel: current,
                            factor: f0,
                        }),
                        Some(SplatTarget {
                            channel: c,
                            factor: 1.0 - f0,
                        }),
                    ]
                }
                None => [
                    Some(SplatTarget {
                        channel: current,
                        factor: 1.0,
                    }),
                    None,
                ],
            };
            targets.push(entry);
        }

        Self { targets }
    }

    /// Returns the channels a wavelength splats onto.
    ///
    /// * `lambda` - Wavelength in nm.
    pub fn targets(&self, lambda: Float) -> [Option<SplatTarget>; 2] {
        let i = (lambda - S500_START_NM) / S500_STEP_NM;
        if i.is_finite() && i >= 0.0 && (i as usize) < self.targets.len() {
            self.targets[i as usize]
        } else {
            [None, None]
        }
    }

    /// Adds values sampled at the hero wavelengths to a spectrum.
    ///
    /// * `target` - The spectrum receiving the values.
    /// * `w`      - The hero wavelengths.
    /// * `values` - One value per hero wavelength.
    pub fn splat(&self, target: &mut Spectrum, w: &Wavelength, values: &[Float; HERO_SAMPLES]) {
        for (lambda, v) in w.samples().iter().zip(values.iter()) {
            foundation_assert!(
                *lambda >= S500_START_NM && *lambda < s500_channel_lower_bound(S500_CHANNELS),
                "wavelength {}nm cannot be splatted",
                lambda
            );
            for t in self.targets(*lambda).iter().flatten() {
                target[t.channel] += v * t.factor;
            }
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

    #[test]
    fn cells_outside_isr_are_dropped() {
        let isr = Isr::new(3, 400.0, 100.0).unwrap();
        let sd = SplattingData::from_isr(&isr);
        assert_eq!(sd.targets(350.0), [None, None]);
        assert_eq!(sd.targets(750.0), [None, None]);
        assert_eq!(sd.targets(1000.0), [None, None]);
    }

    #[test]
    fn linear_split_between_neighbours() {
        let isr = Isr::new(3, 400.0, 100.0).unwrap();
        let sd = SplattingData::from_isr(&isr);

        // Cell centre 475.5nm lies 25.5nm right of the centre of channel 0.
        let [t0, t1] = sd.targets(475.0);
        let t0 = t0.unwrap();
        let t1 = t1.unwrap();
        assert_eq!(t0.channel, 0);
        assert_eq!(t1.channel, 1);
        assert!(approx_eq!(Float, t0.factor, 0.745, epsilon = 1e-5));
        assert!(approx_eq!(Float, t1.factor, 0.255, epsilon = 1e-5));

        // Left of the centre of channel 2 the neighbour is channel 1.
        let [t0, t1] = sd.targets(640.0);
        assert_eq!(t0.unwrap().channel, 2);
        assert_eq!(t1.unwrap().channel, 1);

        // Edge channels have no outer neighbour.
        let [t0, t1] = sd.targets(410.0);
        assert_eq!(t0.unwrap().channel, 0);
        assert_eq!(t0.unwrap().factor, 1.0);
        assert_eq!(t1, None);
    }

    #[test]
    fn splatting_preserves_energy_inside_range() {
        let isr = Isr::new(4, 400.0, 75.0).unwrap();
        let sd = SplattingData::from_isr(&isr);
        let mut s = isr.zero_spectrum();
        let w = Wavelength::from_array([420.0, 510.0, 600.0, 690.0]);
        sd.splat(&mut s, &w, &[1.0, 2.0, 3.0, 4.0]);
        assert!(approx_eq!(Float, s.samples().iter().sum::<Float>(), 10.0, epsilon = 1e-4));
    }
}
