//! Mueller Matrix

use super::STOKES_COMPONENTS;
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;
use std::ops::{Add, Mul};

/// A spectral 4x4 Mueller matrix stored row major.
#[derive(Clone, Debug, PartialEq)]
pub struct MuellerMatrix {
    m: [Spectrum; STOKES_COMPONENTS * STOKES_COMPONENTS],
}

impl MuellerMatrix {
    /// Create a zero `MuellerMatrix`.
    ///
    /// * `channels` - Number of spectral channels.
    pub fn zero(channels: usize) -> Self {
        Self {
            m: std::array::from_fn(|_| Spectrum::zero(channels)),
        }
    }

    /// Create a matrix that attenuates intensity and removes all
    /// polarisation.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `d`        - Intensity transmittance.
    pub fn depolarising(channels: usize, d: Float) -> Self {
        Self::depolarising_spectrum(Spectrum::new(channels, d))
    }

    /// Create a matrix that attenuates intensity and removes all
    /// polarisation.
    ///
    /// * `s` - Intensity transmittance.
    pub fn depolarising_spectrum(s: Spectrum) -> Self {
        let mut ret = Self::zero(s.channels());
        ret.m[0] = s;
        ret
    }

    /// Create a partially depolarising matrix with separate transmittances
    /// for intensity and the polarised components.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `d0`       - Intensity transmittance.
    /// * `d1`       - Transmittance of the polarised components, not larger
    ///                in magnitude than `d0`.
    pub fn depolarising_dd(channels: usize, d0: Float, d1: Float) -> Self {
        Self::depolarising_spectra(Spectrum::new(channels, d0), Spectrum::new(channels, d1))
    }

    /// Create a partially depolarising matrix with separate transmittances
    /// for intensity and the polarised components.
    ///
    /// * `s0` - Intensity transmittance.
    /// * `s1` - Transmittance of the polarised components.
    pub fn depolarising_spectra(s0: Spectrum, s1: Spectrum) -> Self {
        if let Some(i) = (0..s0.channels()).find(|&i| abs(s1[i]) > abs(s0[i])) {
            fatal_error!(
                "depolarising matrix would create polarisation in channel {}: {} > {}",
                i,
                s1[i],
                s0[i]
            );
        }
        let mut ret = Self::zero(s0.channels());
        ret.m[5] = s1.clone();
        ret.m[10] = s1.clone();
        ret.m[15] = s1;
        ret.m[0] = s0;
        ret
    }

    /// Create a diagonal matrix that attenuates all components equally.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `d`        - Transmittance.
    pub fn nonpolarising(channels: usize, d: Float) -> Self {
        Self::nonpolarising_spectrum(Spectrum::new(channels, d))
    }

    /// Create a diagonal matrix that attenuates all components equally.
    ///
    /// * `s` - Transmittance.
    pub fn nonpolarising_spectrum(s: Spectrum) -> Self {
        let mut ret = Self::zero(s.channels());
        for i in 0..STOKES_COMPONENTS {
            ret.m[i * STOKES_COMPONENTS + i] = s.clone();
        }
        ret
    }

    /// Create a linear polariser.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `angle`    - Angle of the transmission axis in radians.
    /// * `strength` - 1 for an ideal polariser, 0 for no effect.
    pub fn linear_polariser(channels: usize, angle: Float, strength: Float) -> Self {
        if !(0.0001..=1.0001).contains(&strength) {
            fatal_error!("linear polariser strength {} outside [0, 1]", strength);
        }

        let k1 = strength / 2.0 + 0.5;
        let k2 = 1.0 - k1;
        let alpha = sqr(k1) + sqr(k2);
        let beta = (sqr(k1) - sqr(k2)) / alpha;
        let gamma = 2.0 * k1 * k2 / alpha;

        let (sa, ca) = (2.0 * angle).sin_cos();
        let f = alpha / 2.0;

        let values = [
            f,
            f * ca * beta,
            f * sa * beta,
            0.0,
            f * ca * beta,
            f * (sqr(ca) + sqr(sa) * gamma),
            f * sa * ca * (1.0 - gamma),
            0.0,
            f * sa * beta,
            f * ca * sa * (1.0 - gamma),
            f * (sqr(sa) + sqr(ca) * gamma),
            0.0,
            0.0,
            0.0,
            0.0,
            f * gamma,
        ];
        Self::from_values(channels, &values)
    }

    /// Create a phase shifter (retarder) between the U and V components.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `angle`    - Phase shift in radians.
    pub fn phase_shifter(channels: usize, angle: Float) -> Self {
        let (s, c) = angle.sin_cos();
        #[rustfmt::skip]
        let values = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0,   c,   s,
            0.0, 0.0,  -s,   c,
        ];
        Self::from_values(channels, &values)
    }

    /// Create a rotator of the linear polarisation components.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `angle`    - Rotation angle in radians.
    pub fn rotator(channels: usize, angle: Float) -> Self {
        let (s, c) = angle.sin_cos();
        #[rustfmt::skip]
        let values = [
            1.0, 0.0, 0.0, 0.0,
            0.0,   c,   s, 0.0,
            0.0,  -s,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self::from_values(channels, &values)
    }

    fn from_values(channels: usize, values: &[Float; 16]) -> Self {
        Self {
            m: std::array::from_fn(|i| Spectrum::new(channels, values[i])),
        }
    }

    /// Returns the number of spectral channels.
    pub fn channels(&self) -> usize {
        self.m[0].channels()
    }

    /// Returns an element.
    ///
    /// * `i` - Row.
    /// * `j` - Column.
    pub fn get(&self, i: usize, j: usize) -> &Spectrum {
        &self.m[i * STOKES_COMPONENTS + j]
    }

    /// Returns an element mutably.
    ///
    /// * `i` - Row.
    /// * `j` - Column.
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut Spectrum {
        &mut self.m[i * STOKES_COMPONENTS + j]
    }

    /// Returns the intensity transmittance `m00`.
    pub fn m00(&self) -> &Spectrum {
        &self.m[0]
    }

    /// Scales every element.
    ///
    /// * `d` - Factor.
    pub fn scale(&mut self, d: Float) {
        self.m.iter_mut().for_each(|s| s.scale(d));
    }

    /// Multiplies every element channelwise with a spectrum.
    ///
    /// * `s` - The spectrum.
    pub fn mul_spectrum(&mut self, s: &Spectrum) {
        self.m.iter_mut().for_each(|e| *e *= s);
    }

    /// Returns the matrix that produces its output in a frame rotated by
    /// `phi` relative to the current output frame.
    ///
    /// * `cos2` - `cos 2phi`.
    /// * `sin2` - `sin 2phi`.
    pub fn rotate_output(&self, cos2: Float, sin2: Float) -> Self {
        let mut ret = self.clone();
        for j in 0..STOKES_COMPONENTS {
            let r1 = self.get(1, j);
            let r2 = self.get(2, j);
            *ret.get_mut(1, j) = r1.zip_map(r2, |a, b| cos2 * a + sin2 * b);
            *ret.get_mut(2, j) = r1.zip_map(r2, |a, b| -sin2 * a + cos2 * b);
        }
        ret
    }

    /// Returns the matrix that accepts its input in a frame rotated by `phi`
    /// relative to the current input frame.
    ///
    /// * `cos2` - `cos 2phi`.
    /// * `sin2` - `sin 2phi`.
    pub fn rotate_input(&self, cos2: Float, sin2: Float) -> Self {
        let mut ret = self.clone();
        for i in 0..STOKES_COMPONENTS {
            let c1 = self.get(i, 1);
            let c2 = self.get(i, 2);
            *ret.get_mut(i, 1) = c1.zip_map(c2, |a, b| cos2 * a + sin2 * b);
            *ret.get_mut(i, 2) = c1.zip_map(c2, |a, b| -sin2 * a + cos2 * b);
        }
        ret
    }

    /// Returns true if every element is a valid spectrum.
    pub fn is_valid(&self) -> bool {
        self.m.iter().all(|s| s.is_valid())
    }

    /// Returns true if all elements are within a relative error of another
    /// matrix.
    ///
    /// * `other`              - The other matrix.
    /// * `max_relative_error` - Allowed relative error.
    pub fn approx_equal(&self, other: &Self, max_relative_error: Float) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| a.approx_equal(b, max_relative_error))
    }
}

impl Add<&MuellerMatrix> for &MuellerMatrix {
    type Output = MuellerMatrix;

    /// Adds two matrices elementwise.
    ///
    /// * `other` - The other matrix.
    fn add(self, other: &MuellerMatrix) -> Self::Output {
        MuellerMatrix {
            m: std::array::from_fn(|i| &self.m[i] + &other.m[i]),
        }
    }
}

impl Mul<&MuellerMatrix> for &MuellerMatrix {
    type Output = MuellerMatrix;

    /// Returns the matrix product `self * other`, i.e. `other` acts first.
    ///
    /// * `other` - The other matrix.
    fn mul(self, other: &MuellerMatrix) -> Self::Output {
        MuellerMatrix {
            m: std::array::from_fn(|ij| {
                let (i, j) = (ij / STOKES_COMPONENTS, ij % STOKES_COMPONENTS);
                (1..STOKES_COMPONENTS).fold(self.get(i, 0) * other.get(0, j), |mut acc, k| {
                    acc += &(self.get(i, k) * other.get(k, j));
                    acc
                })
            }),
        }
    }
}

impl fmt::Display for MuellerMatrix {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MM[")?;
        for i in 0..STOKES_COMPONENTS {
            writeln!(
                f,
                "  {}, {}, {}, {}",
                self.get(i, 0),
                self.get(i, 1),
                self.get(i, 2),
                self.get(i, 3)
            )?;
        }
        write!(f, "]")
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
