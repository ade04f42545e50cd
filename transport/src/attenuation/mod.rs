//! Attenuation

mod attenuation_sample;
mod direct;
mod mueller_direct;
mod plain_direct;

// Re-export.
pub use attenuation_sample::*;
pub use direct::*;
pub use mueller_direct::*;
pub use plain_direct::*;

use foundation::math::Float;

/// Checks that `a1` can follow `a0` in a concatenation, i.e. that the exit
/// frame of `a0` is coaxial with the entry frame of `a1`. On failure the
/// reversed order is tested so the diagnostic can tell swapped arguments
/// apart from incompatible ones. Both outcomes are fatal.
///
/// * `a0`        - The attenuation acting first.
/// * `a1`        - The attenuation acting second.
/// * `tolerance` - Coaxiality tolerance in radians.
pub fn check_concatenation_frames(a0: &Attenuation, a1: &Attenuation, tolerance: Float) {
    if a0.exit_frame().is_coaxial(a1.entry_frame(), tolerance) {
        return;
    }

    warn!(
        "original test for refframe coaxiality failed. We try the reversed order of attenuators, \
         as commutativity errors are a common problem..."
    );

    if a1.exit_frame().is_coaxial(a0.entry_frame(), tolerance) {
        fatal_error!(
            "exit reference frame {} and entry reference frame {} are not coaxial, \
             but the reversed order is: the attenuations were concatenated in the wrong order",
            a0.exit_frame(),
            a1.entry_frame()
        );
    }

    fatal_error!(
        "exit reference frame {} and entry reference frame {} are not coaxial in either order",
        a0.exit_frame(),
        a1.entry_frame()
    );
}
