//! Regularly Sampled 2D Spectrum

use crate::math::*;

/// A measured excitation/emission table sampled on a regular grid.
///
/// Values are stored row by row; each row holds all excitation samples for
/// one emission wavelength. Wavelengths are in nm.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularSpectrum2D {
    /// Excitation wavelength of column 0.
    pub excitation_start: Float,

    /// Excitation wavelength increment between columns.
    pub excitation_step: Float,

    /// Emission wavelength of row 0.
    pub emission_start: Float,

    /// Emission wavelength increment between rows.
    pub emission_step: Float,

    /// Global scale factor of the measurement.
    pub scale: Float,

    /// Number of excitation samples per row.
    stride: usize,

    /// The samples.
    values: Vec<Float>,
}

impl RegularSpectrum2D {
    /// Create a new `RegularSpectrum2D`.
    ///
    /// * `excitation_start` - Excitation wavelength of column 0.
    /// * `excitation_step`  - Excitation wavelength increment.
    /// * `emission_start`   - Emission wavelength of row 0.
    /// * `emission_step`    - Emission wavelength increment.
    /// * `stride`           - Number of excitation samples per row.
    /// * `values`           - The samples, row by row.
    pub fn new(
        excitation_start: Float,
        excitation_step: Float,
        emission_start: Float,
        emission_step: Float,
        stride: usize,
        values: Vec<Float>,
    ) -> Result<Self, String> {
        if stride == 0 || values.is_empty() || values.len() % stride != 0 {
            return Err(format!(
                "{} samples cannot be split into rows of {}",
                values.len(),
                stride
            ));
        }
        if !(excitation_step > 0.0 && emission_step > 0.0) {
            return Err(format!(
                "invalid sample steps {} / {}",
                excitation_step, emission_step
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(String::from("non-finite sample in 2D spectrum"));
        }
        Ok(Self {
            excitation_start,
            excitation_step,
            emission_start,
            emission_step,
            scale: 1.0,
            stride,
            values,
        })
    }

    /// Returns the number of excitation samples.
    pub fn excitation_size(&self) -> usize {
        self.stride
    }

    /// Returns the number of emission samples.
    pub fn emission_size(&self) -> usize {
        self.values.len() / self.stride
    }

    /// Returns a sample. Negative samples are reported as 0 and indices
    /// outside the table return 0.
    ///
    /// * `x` - Excitation index.
    /// * `y` - Emission index.
    pub fn sample(&self, x: usize, y: usize) -> Float {
        if x >= self.excitation_size() || y >= self.emission_size() {
            0.0
        } else {
            max(self.values[y * self.stride + x], 0.0)
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
