//! Crosstalk
//!
//! Fluorescent re-emission is stored as the strictly lower triangle of an
//! `N x N` transfer matrix. The entry `(x, y)` with `y > x` is the fraction
//! of energy absorbed in channel `x` that is re-emitted in channel `y`.

mod crosstalk500;
mod spectral_crosstalk;

// Re-export
pub use crosstalk500::*;
pub use spectral_crosstalk::*;

/// Returns the number of entries of the lower triangle of an `N x N` matrix.
///
/// * `channels` - Number of spectral channels `N`.
#[inline(always)]
pub fn crosstalk_entries(channels: usize) -> usize {
    channels * channels.saturating_sub(1) / 2
}

/// Returns the storage index of entry `(x, y)` with `y > x`.
///
/// * `x` - Excitation channel.
/// * `y` - Emission channel.
#[inline(always)]
pub(crate) fn crosstalk_index(x: usize, y: usize) -> usize {
    y * (y - 1) / 2 + x
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
