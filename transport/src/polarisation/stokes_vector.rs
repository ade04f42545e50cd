//! Stokes Vector

use super::{MuellerMatrix, STOKES_COMPONENTS};
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Spectral Stokes vector `(I, Q, U, V)`. Component 0 is the total
/// intensity, 1 and 2 the linear polarisation and 3 the circular
/// polarisation. Q and U are only meaningful relative to a reference frame.
#[derive(Clone, Debug, PartialEq)]
pub struct StokesVector {
    /// The components.
    pub c: [Spectrum; STOKES_COMPONENTS],
}

impl StokesVector {
    /// Create a new `StokesVector`.
    ///
    /// * `c` - The components.
    pub fn new(c: [Spectrum; STOKES_COMPONENTS]) -> Self {
        Self { c }
    }

    /// Create a zero `StokesVector`.
    ///
    /// * `channels` - Number of spectral channels.
    pub fn zero(channels: usize) -> Self {
        Self::unpolarised(Spectrum::zero(channels))
    }

    /// Create a `StokesVector` for unpolarised light.
    ///
    /// * `intensity` - Total intensity.
    pub fn unpolarised(intensity: Spectrum) -> Self {
        let zero = Spectrum::zero(intensity.channels());
        Self::new([intensity, zero.clone(), zero.clone(), zero])
    }

    /// Returns the number of spectral channels.
    pub fn channels(&self) -> usize {
        self.c[0].channels()
    }

    /// Returns the total intensity.
    pub fn intensity(&self) -> &Spectrum {
        &self.c[0]
    }

    /// Returns the components re-expressed in a frame rotated by `phi` about
    /// the propagation direction. The intensity and circular components are
    /// unchanged.
    ///
    /// * `cos2` - `cos 2phi`.
    /// * `sin2` - `sin 2phi`.
    pub fn rotated(&self, cos2: Float, sin2: Float) -> Self {
        let q = &self.c[1];
        let u = &self.c[2];
        Self::new([
            self.c[0].clone(),
            q.zip_map(u, |q, u| cos2 * q + sin2 * u),
            q.zip_map(u, |q, u| -sin2 * q + cos2 * u),
            self.c[3].clone(),
        ])
    }

    /// Returns `m * self`.
    ///
    /// * `m` - The Mueller matrix.
    pub fn mul_mueller(&self, m: &MuellerMatrix) -> Self {
        let row = |i: usize| {
            (1..STOKES_COMPONENTS).fold(m.get(i, 0) * &self.c[0], |mut acc, j| {
                acc += &(m.get(i, j) * &self.c[j]);
                acc
            })
        };
        Self::new([row(0), row(1), row(2), row(3)])
    }

    /// Returns the first channel in which the polarised part exceeds the
    /// total intensity by more than `epsilon`.
    ///
    /// * `epsilon` - Allowed excess.
    pub fn overpolarised_channel(&self, epsilon: Float) -> Option<usize> {
        (0..self.channels()).find(|&i| {
            let p = (sqr(self.c[1][i]) + sqr(self.c[2][i]) + sqr(self.c[3][i])).sqrt();
            p > self.c[0][i] + epsilon
        })
    }

    /// Returns true if all components are valid spectra.
    pub fn is_valid(&self) -> bool {
        self.c.iter().all(|s| s.is_valid())
    }

    /// Returns true if all components are within a relative error of another
    /// Stokes vector.
    ///
    /// * `other`              - The other Stokes vector.
    /// * `max_relative_error` - Allowed relative error.
    pub fn approx_equal(&self, other: &Self, max_relative_error: Float) -> bool {
        self.c
            .iter()
            .zip(other.c.iter())
            .all(|(a, b)| a.approx_equal(b, max_relative_error))
    }
}

impl Index<usize> for StokesVector {
    type Output = Spectrum;

    /// Index the components.
    ///
    /// * `i` - Component index 0..3.
    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for StokesVector {
    /// Index the components mutably.
    ///
    /// * `i` - Component index 0..3.
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

impl fmt::Display for StokesVector {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SV[{}, {}, {}, {}]",
            self.c[0], self.c[1], self.c[2], self.c[3]
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
