//! Spectrum

mod isr;
mod regular_spectrum_2d;
mod sampled_spectrum;
mod splatting;

// Re-export
pub use isr::*;
pub use regular_spectrum_2d::*;
pub use sampled_spectrum::*;
pub use splatting::*;

use crate::math::Float;

/// Number of channels of the high resolution 1nm representation.
pub const S500_CHANNELS: usize = 500;

/// Lower bound of channel 0 of the high resolution representation in nm.
pub const S500_START_NM: Float = 300.0;

/// Channel width of the high resolution representation in nm.
pub const S500_STEP_NM: Float = 1.0;

/// Returns the lower bound of a 1nm channel.
///
/// * `i` - Channel index.
#[inline(always)]
pub fn s500_channel_lower_bound(i: usize) -> Float {
    S500_START_NM + i as Float * S500_STEP_NM
}

/// Returns the index of the 1nm channel closest to a wavelength, or `None`
/// if it lies outside the representation.
///
/// * `lambda` - Wavelength in nm.
pub fn s500_channel_index(lambda: Float) -> Option<usize> {
    let i = ((lambda - S500_START_NM) / S500_STEP_NM).round();
    if i.is_finite() && i >= 0.0 && (i as usize) < S500_CHANNELS {
        Some(i as usize)
    } else {
        None
    }
}

/// Returns a zero spectrum with one channel per nm.
pub fn s500_zero() -> Spectrum {
    Spectrum::zero(S500_CHANNELS)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
