//! Random Number Generator.

use crate::math::*;

/// 32-bit precision value for 1 - epsilon.
pub const ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1"); // 0.99999994

/// 2^-32, maps a `u32` into [0, 1).
const U32_TO_UNIT: Float = hexf32!("0x1.0p-32");

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 pseudo-random number generator used for stochastic wavelength
/// selection and for scrambling arrays.
#[derive(Clone, Debug)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

impl Default for Pcg32 {
    /// Return a new instance of `Pcg32` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl Pcg32 {
    /// Create a new `Pcg32` seeded with a stream index. Worker threads use
    /// distinct stream indices to get independent sequences.
    ///
    /// * `stream` - The stream to select.
    pub fn new(stream: u64) -> Self {
        let mut ret = Self {
            state: 0,
            inc: stream.wrapping_shl(1) | 1,
        };
        ret.next_u32();
        ret.state = ret.state.wrapping_add(PCG32_DEFAULT_STATE);
        ret.next_u32();
        ret
    }

    /// Returns a uniformly distributed `u32`.
    #[inline(always)]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value in [0, `bound`) without modulo
    /// bias.
    ///
    /// * `bound` - Exclusive upper bound. Must be non-zero.
    pub fn bounded_u32(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u32();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    /// Returns a uniformly distributed value over the half open interval
    /// [0.0, 1.0).
    pub fn uniform_float(&mut self) -> Float {
        min(self.next_u32() as Float * U32_TO_UNIT, ONE_MINUS_EPSILON)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
