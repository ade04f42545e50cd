//! Mueller Direct Attenuation

use crate::crosstalk::Crosstalk;
use crate::light::StokesLight;
use crate::polarisation::{MuellerMatrix, StokesVector};
use crate::reference_frame::{ReferenceFrame, DEFAULT_COAXIALITY_TOLERANCE};
use bitflags::bitflags;
use foundation::math::*;
use foundation::spectrum::Spectrum;
use std::fmt;

bitflags! {
    /// Structural properties of a Mueller matrix. No flags means a general
    /// polarising matrix.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct MuellerProperties: u8 {
        /// The matrix commutes with rotations about the propagation axis.
        const ROTATIONALLY_INVARIANT = 0x01;

        /// Only `m00` is non-zero.
        const DEPOLARISER = 0x02;
    }
}

impl MuellerProperties {
    /// Properties of a depolarising matrix. Depolarisers are rotationally
    /// invariant as well.
    pub fn depolariser() -> Self {
        Self::DEPOLARISER | Self::ROTATIONALLY_INVARIANT
    }

    /// Properties of the combination of two matrices, by sum or product.
    ///
    /// * `other` - Properties of the other matrix.
    pub fn combined(self, other: Self) -> Self {
        if self.contains(Self::DEPOLARISER) && other.contains(Self::DEPOLARISER) {
            Self::depolariser()
        } else if self.contains(Self::ROTATIONALLY_INVARIANT)
            && other.contains(Self::ROTATIONALLY_INVARIANT)
        {
            Self::ROTATIONALLY_INVARIANT
        } else {
            Self::empty()
        }
    }
}

/// Polarising attenuation described by a spectral Mueller matrix that maps
/// Stokes vectors measured in the entry frame to Stokes vectors measured in
/// the exit frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MuellerDirectAttenuation {
    /// The Mueller matrix.
    pub matrix: MuellerMatrix,

    /// Frame of the incoming light.
    pub entry: ReferenceFrame,

    /// Frame of the outgoing light.
    pub exit: ReferenceFrame,

    /// Structural properties of the matrix.
    pub properties: MuellerProperties,
}

impl MuellerDirectAttenuation {
    /// Create a new `MuellerDirectAttenuation`.
    ///
    /// * `matrix`     - The Mueller matrix.
    /// * `entry`      - Frame of the incoming light.
    /// * `exit`       - Frame of the outgoing light.
    /// * `properties` - Structural properties of the matrix.
    pub fn new(
        matrix: MuellerMatrix,
        entry: ReferenceFrame,
        exit: ReferenceFrame,
        properties: MuellerProperties,
    ) -> Self {
        Self {
            matrix,
            entry,
            exit,
            properties,
        }
    }

    /// Create a depolarising attenuation.
    ///
    /// * `s`     - Intensity transmittance.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn depolarising(s: Spectrum, entry: ReferenceFrame, exit: ReferenceFrame) -> Self {
        Self::new(
            MuellerMatrix::depolarising_spectrum(s),
            entry,
            exit,
            MuellerProperties::depolariser(),
        )
    }

    /// Create an attenuation that neither polarises nor depolarises.
    ///
    /// * `s`     - Transmittance of every Stokes component.
    /// * `entry` - Frame of the incoming light.
    /// * `exit`  - Frame of the outgoing light.
    pub fn nonpolarising(s: Spectrum, entry: ReferenceFrame, exit: ReferenceFrame) -> Self {
        Self::new(
            MuellerMatrix::nonpolarising_spectrum(s),
            entry,
            exit,
            MuellerProperties::ROTATIONALLY_INVARIANT,
        )
    }

    /// Create an attenuation from a general Mueller matrix.
    ///
    /// * `matrix` - The Mueller matrix.
    /// * `entry`  - Frame of the incoming light.
    /// * `exit`   - Frame of the outgoing light.
    pub fn polarising(matrix: MuellerMatrix, entry: ReferenceFrame, exit: ReferenceFrame) -> Self {
        Self::new(matrix, entry, exit, MuellerProperties::empty())
    }

    /// Create a linear polariser.
    ///
    /// * `channels` - Number of spectral channels.
    /// * `angle`    - Transmission axis angle relative to the entry frame.
    /// * `strength` - Polarisation strength in [0, 1].
    /// * `entry`    - Frame of the incoming light.
    /// * `exit`     - Frame of the outgoing light.
    pub fn linear_polariser(
        channels: usize,
        angle: Float,
        strength: Float,
        entry: ReferenceFrame,
        exit: ReferenceFrame,
    ) -> Self {
        Self::polarising(
            MuellerMatrix::linear_polariser(channels, angle, strength),
            entry,
            exit,
        )
    }

    /// Returns true if the matrix is a general polarising matrix.
    pub fn is_general(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns true if the matrix commutes with frame rotations.
    pub fn is_rotationally_invariant(&self) -> bool {
        self.properties.contains(MuellerProperties::ROTATIONALLY_INVARIANT)
    }

    /// Returns true if the matrix removes all polarisation.
    pub fn is_depolariser(&self) -> bool {
        self.properties.contains(MuellerProperties::DEPOLARISER)
    }

    /// Returns the intensity transmittance `m00`.
    pub fn diagonal(&self) -> &Spectrum {
        self.matrix.m00()
    }

    /// Replaces the intensity transmittance `m00`.
    ///
    /// * `s` - The new transmittance.
    pub fn set_diagonal(&mut self, s: Spectrum) {
        *self.matrix.get_mut(0, 0) = s;
    }

    /// Returns the matrix re-expressed for a coaxial exit frame. Only
    /// general matrices are rotated.
    ///
    /// * `target`    - The new exit frame.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realigned_to_coaxial_exit_frame(&self, target: &ReferenceFrame, tolerance: Float) -> Self {
        assert_coaxial_frames!(self.exit, target, tolerance);

        let matrix = if self.is_general() && !self.exit.equal(target) {
            let (cos2, sin2) = self.exit.stokes_rotation_to(target);
            self.matrix.rotate_output(cos2, sin2)
        } else {
            self.matrix.clone()
        };
        Self::new(matrix, self.entry, *target, self.properties)
    }

    /// Returns the matrix re-expressed for a coaxial entry frame. Only
    /// general matrices are rotated.
    ///
    /// * `target`    - The new entry frame.
    /// * `tolerance` - Coaxiality tolerance in radians.
    pub fn realigned_to_coaxial_entry_frame(&self, target: &ReferenceFrame, tolerance: Float) -> Self {
        assert_coaxial_frames!(self.entry, target, tolerance);

        let matrix = if self.is_general() && !self.entry.equal(target) {
            let (cos2, sin2) = self.entry.stokes_rotation_to(target);
            self.matrix.rotate_input(cos2, sin2)
        } else {
            self.matrix.clone()
        };
        Self::new(matrix, *target, self.exit, self.properties)
    }

    /// Returns the sum of two attenuations acting in parallel. When both
    /// are general the first is realigned into the frames of the second;
    /// otherwise the frames of the general one are kept.
    ///
    /// * `other` - The other attenuation.
    pub fn add(&self, other: &Self) -> Self {
        let (a0, entry, exit) = if self.is_general() && other.is_general() {
            let a0 = self
                .realigned_to_coaxial_entry_frame(&other.entry, DEFAULT_COAXIALITY_TOLERANCE)
                .realigned_to_coaxial_exit_frame(&other.exit, DEFAULT_COAXIALITY_TOLERANCE);
            (a0.matrix, other.entry, other.exit)
        } else if self.is_general() {
            (self.matrix.clone(), self.entry, self.exit)
        } else {
            (self.matrix.clone(), other.entry, other.exit)
        };

        Self::new(
            &a0 + &other.matrix,
            entry,
            exit,
            self.properties.combined(other.properties),
        )
    }

    /// Returns the concatenation of two attenuations where light passes
    /// `self` first. A general `self` is realigned so that its exit frame
    /// matches the entry frame of `next`.
    ///
    /// * `next` - The attenuation acting second.
    pub fn concatenate(&self, next: &Self) -> Self {
        assert_coaxial_frames!(self.exit, next.entry, DEFAULT_COAXIALITY_TOLERANCE);

        let first = if self.is_rotationally_invariant() {
            self.matrix.clone()
        } else {
            self.realigned_to_coaxial_exit_frame(&next.entry, DEFAULT_COAXIALITY_TOLERANCE)
                .matrix
        };

        Self::new(
            &next.matrix * &first,
            self.entry,
            next.exit,
            self.properties.combined(next.properties),
        )
    }

    /// Scales every element.
    ///
    /// * `d` - Non-negative factor.
    pub fn scale(&mut self, d: Float) {
        self.matrix.scale(d);
    }

    /// Multiplies every element channelwise with a filter spectrum. Frames
    /// and structural properties are unchanged.
    ///
    /// * `s` - The filter spectrum.
    pub fn mul_spectrum(&mut self, s: &Spectrum) {
        self.matrix.mul_spectrum(s);
    }

    /// Attenuates Stokes light in place.
    ///
    /// * `l` - The light.
    pub fn apply(&self, l: &mut StokesLight) {
        if self.is_general() {
            let sv = l.realigned_stokes(&self.entry, DEFAULT_COAXIALITY_TOLERANCE);
            *l = StokesLight::from_stokes(sv.mul_mueller(&self.matrix), self.exit);
        } else if self.is_rotationally_invariant() && !self.is_depolariser() && l.is_polarised() {
            // A non-depolarising rotationally invariant matrix is diagonal
            // and keeps the direction of the light.
            if let Some(frame) = l.frame().copied() {
                let sv = l.stokes();
                let diagonal = StokesVector::new(std::array::from_fn(|i| {
                    self.matrix.get(i, i) * &sv[i]
                }));
                *l = StokesLight::from_stokes(diagonal, frame);
            }
        } else {
            *l = StokesLight::from_intensity(self.diagonal() * l.intensity());
        }
    }

    /// Attenuates Stokes light in place and adds the energy re-emitted by
    /// fluorescence. Crosstalk only acts on the intensity.
    ///
    /// * `x` - The crosstalk.
    /// * `l` - The light.
    pub fn apply_fluorescent(&self, x: &Crosstalk, l: &mut StokesLight) {
        let emitted = x.redistribute(l.intensity());

        if self.is_depolariser() {
            *l = StokesLight::from_intensity(self.diagonal() * l.intensity());
        } else {
            let sv = l.realigned_stokes(&self.entry, DEFAULT_COAXIALITY_TOLERANCE);
            *l = StokesLight::from_stokes(sv.mul_mueller(&self.matrix), self.exit);
        }
        l.add_intensity(&emitted);
    }

    /// Returns true if the matrix and both frames are valid.
    pub fn is_valid(&self) -> bool {
        if !self.matrix.is_valid() {
            warn!("invalid Mueller matrix {}", self.matrix);
            return false;
        }
        self.entry.is_valid() && self.exit.is_valid()
    }
}

impl fmt::Display for MuellerDirectAttenuation {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MuellerDirectAttenuation {:?} entry {} exit {}\n{}",
            self.properties, self.entry, self.exit, self.matrix
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
