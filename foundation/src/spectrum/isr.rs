//! Internal Spectral Representation

use super::Spectrum;
use crate::math::*;
use std::fmt;

/// The internal spectral representation (ISR) describes how many spectral
/// channels are used during rendering and which wavelength band each of
/// them covers.
///
/// Channels are contiguous and of equal width. Wavelengths are in nm.
#[derive(Clone, Debug, PartialEq)]
pub struct Isr {
    /// Number of channels.
    channels: usize,

    /// Lower bound of channel 0 in nm.
    start: Float,

    /// Width of every channel in nm.
    width: Float,
}

impl Isr {
    /// Create a new `Isr`.
    ///
    /// * `channels` - Number of channels.
    /// * `start`    - Lower bound of the first channel in nm.
    /// * `width`    - Width of each channel in nm.
    pub fn new(channels: usize, start: Float, width: Float) -> Result<Self, String> {
        if channels == 0 {
            return Err(String::from("ISR needs at least one channel"));
        }
        if !start.is_finite() || start < 0.0 {
            return Err(format!("invalid ISR start wavelength {}", start));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(format!("invalid ISR channel width {}", width));
        }
        Ok(Self {
            channels,
            start,
            width,
        })
    }

    /// Create a new `Isr` that splits a wavelength range into channels of
    /// equal width.
    ///
    /// * `channels` - Number of channels.
    /// * `start`    - Start of the range in nm.
    /// * `end`      - End of the range in nm.
    pub fn from_range(channels: usize, start: Float, end: Float) -> Result<Self, String> {
        if channels == 0 {
            return Err(String::from("ISR needs at least one channel"));
        }
        if end <= start {
            return Err(format!("invalid ISR range [{}, {}]", start, end));
        }
        Self::new(channels, start, (end - start) / channels as Float)
    }

    /// Returns the number of channels.
    #[inline(always)]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the lower bound of a channel in nm. Passing `channels()`
    /// returns the upper bound of the last channel.
    ///
    /// * `i` - Channel index.
    pub fn channel_lower_bound(&self, i: usize) -> Float {
        self.start + i as Float * self.width
    }

    /// Returns the width of a channel in nm.
    ///
    /// * `i` - Channel index.
    pub fn channel_width(&self, i: usize) -> Float {
        debug_assert!(i < self.channels);
        self.width
    }

    /// Returns the centre of a channel in nm.
    ///
    /// * `i` - Channel index.
    pub fn channel_center(&self, i: usize) -> Float {
        self.channel_lower_bound(i) + 0.5 * self.channel_width(i)
    }

    /// Returns the start of the spectral range in nm.
    pub fn spectral_range_start(&self) -> Float {
        self.channel_lower_bound(0)
    }

    /// Returns the end of the spectral range in nm.
    pub fn spectral_range_end(&self) -> Float {
        let last = self.channels - 1;
        self.channel_lower_bound(last) + self.channel_width(last)
    }

    /// Returns the index of the channel that contains a wavelength.
    ///
    /// * `lambda` - Wavelength in nm.
    pub fn channel_index(&self, lambda: Float) -> Option<usize> {
        if !lambda.is_finite()
            || lambda < self.spectral_range_start()
            || lambda > self.spectral_range_end()
        {
            return None;
        }
        let i = ((lambda - self.start) / self.width) as usize;
        Some(min(i, self.channels - 1))
    }

    /// Returns a zero spectrum for this ISR.
    pub fn zero_spectrum(&self) -> Spectrum {
        Spectrum::zero(self.channels)
    }

    /// Returns a constant spectrum for this ISR.
    ///
    /// * `v` - The value.
    pub fn spectrum(&self, v: Float) -> Spectrum {
        Spectrum::new(self.channels, v)
    }
}

impl fmt::Display for Isr {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} channels, {}nm - {}nm",
            self.channels,
            self.spectral_range_start(),
            self.spectral_range_end()
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
