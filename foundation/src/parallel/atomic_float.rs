//! AtomicFloat

use crate::math::{bits_to_float, float_to_bits, Float};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Floating point value that supports lock-free accumulation from several
/// threads. Stored as the bit pattern of the value in an `AtomicU32`.
pub struct AtomicFloat {
    bits: AtomicU32,
}

impl AtomicFloat {
    /// Create a new `AtomicFloat`.
    ///
    /// * `v` - The value.
    pub fn new(v: Float) -> Self {
        Self {
            bits: AtomicU32::new(float_to_bits(v)),
        }
    }

    /// Adds a value with a compare-and-swap loop and returns the previous
    /// value.
    ///
    /// * `v` - The value to add.
    pub fn add(&self, v: Float) -> Float {
        let mut old_bits = self.bits.load(Ordering::Relaxed);
        loop {
            let new_bits = float_to_bits(bits_to_float(old_bits) + v);
            match self.bits.compare_exchange_weak(
                old_bits,
                new_bits,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return bits_to_float(old_bits),
                Err(x) => old_bits = x,
            }
        }
    }

    /// Loads the value.
    ///
    /// * `order` - Memory ordering of this operation.
    pub fn load(&self, order: Ordering) -> Float {
        bits_to_float(self.bits.load(order))
    }

    /// Stores a value.
    ///
    /// * `v`     - The value.
    /// * `order` - Memory ordering of this operation.
    pub fn store(&self, v: Float, order: Ordering) {
        self.bits.store(float_to_bits(v), order);
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clone for AtomicFloat {
    fn clone(&self) -> Self {
        Self::new(self.load(Ordering::SeqCst))
    }
}

impl fmt::Debug for AtomicFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomicFloat({})", self.load(Ordering::Relaxed))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
