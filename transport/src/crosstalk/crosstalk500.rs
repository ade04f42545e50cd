//! High resolution crosstalk
//!
//! Measured fluorescence data is first rasterised onto a fixed grid of 500
//! channels of 1nm each starting at 300nm, and then integrated down onto
//! the channels of the active ISR.

use super::Crosstalk;
use foundation::math::*;
use foundation::spectrum::*;
use foundation::wavelength::{Wavelength, HERO_SAMPLES};
use std::ops::{Add, Mul};

/// Fluorescence transfer matrix on the 1nm grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Crosstalk500 {
    x: Crosstalk,
}

impl Default for Crosstalk500 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crosstalk500 {
    /// Create a new zero `Crosstalk500`.
    pub fn new() -> Self {
        Self::from_value(0.0)
    }

    /// Create a new `Crosstalk500` with all entries set to a constant.
    ///
    /// * `d` - Non-negative entry value.
    pub fn from_value(d: Float) -> Self {
        Self {
            x: Crosstalk::from_value(S500_CHANNELS, d),
        }
    }

    /// Create a tent shaped crosstalk, mainly useful for tests and synthetic
    /// materials. The value falls off linearly from `peak` at the centre to 0
    /// at the given half widths and is the smaller of the two falloffs.
    ///
    /// * `peak`   - Value at the centre.
    /// * `centre` - (excitation, emission) wavelengths of the centre in nm.
    /// * `width`  - (excitation, emission) half widths in nm.
    pub fn tent(peak: Float, centre: (Float, Float), width: (Float, Float)) -> Self {
        let (ex, em) = centre;
        let (wx, wy) = width;

        let mut ret = Self::new();
        for y in 1..S500_CHANNELS {
            let dy = abs(em - s500_channel_lower_bound(y));
            for x in 0..y {
                let dx = abs(ex - s500_channel_lower_bound(x));
                if dx <= wx && dy <= wy {
                    let fx = (wx - dx) / wx;
                    let fy = (wy - dy) / wy;
                    ret.x.set_xy(x, y, min(fx * peak, fy * peak));
                }
            }
        }
        ret
    }

    /// Rasterises a measured excitation/emission table onto the 1nm grid.
    /// Each sample covers a box one sample step wide centred on its
    /// wavelengths and is normalised by the excitation step. Cells beyond
    /// the grid are dropped.
    ///
    /// * `rss` - The measured table.
    pub fn from_regular_spectrum_2d(rss: &RegularSpectrum2D) -> Result<Self, String> {
        let mut ret = Self::new();

        let sample_size = rss.excitation_step;
        let ex_half = rss.excitation_step / 2.0;
        let em_half = rss.emission_step / 2.0;

        for x in 0..rss.excitation_size() {
            let ex = rss.excitation_start + rss.excitation_step * x as Float;
            let x0 = grid_index(ex - ex_half)?;
            let x1 = grid_index(ex + ex_half)?;

            for y in 0..rss.emission_size() {
                let em = rss.emission_start + rss.emission_step * y as Float;
                let y0 = grid_index(em - em_half)?;
                let y1 = grid_index(em + em_half)?;

                let v = rss.sample(x, y) / sample_size;
                for yy in y0.max(1)..y1.min(S500_CHANNELS) {
                    for xx in x0..x1.min(yy) {
                        ret.x.set_xy(xx, yy, v);
                    }
                }
            }
        }

        debug!(
            "rasterised {}x{} excitation/emission samples",
            rss.excitation_size(),
            rss.emission_size()
        );
        Ok(ret)
    }

    /// Returns the underlying crosstalk.
    pub fn as_crosstalk(&self) -> &Crosstalk {
        &self.x
    }

    /// Returns the value moving energy from grid channel `x` to `y`.
    ///
    /// * `x` - Excitation channel.
    /// * `y` - Emission channel.
    pub fn xy(&self, x: usize, y: usize) -> Float {
        self.x.xy(x, y)
    }

    /// Sets the value moving energy from grid channel `x` to `y`. Values on
    /// or above the diagonal are ignored.
    ///
    /// * `x` - Excitation channel.
    /// * `y` - Emission channel.
    /// * `v` - The value.
    pub fn set_xy(&mut self, x: usize, y: usize, v: Float) {
        if y > x && y < S500_CHANNELS {
            self.x.set_xy(x, y, v);
        }
    }

    /// Looks up the value for an excitation and emission wavelength. Returns
    /// 0 outside the grid.
    ///
    /// * `wi` - Excitation wavelength in nm.
    /// * `wo` - Emission wavelength in nm.
    pub fn value_at(&self, wi: Float, wo: Float) -> Float {
        match (s500_channel_index(wi), s500_channel_index(wo)) {
            (Some(x), Some(y)) => self.xy(x, y),
            _ => 0.0,
        }
    }

    /// Looks up the values for each pair of hero wavelengths.
    ///
    /// * `wi` - Excitation wavelengths.
    /// * `wo` - Emission wavelengths.
    pub fn hero_values(&self, wi: &Wavelength, wo: &Wavelength) -> [Float; HERO_SAMPLES] {
        let mut ret = [0.0; HERO_SAMPLES];
        for (i, v) in ret.iter_mut().enumerate() {
            *v = self.value_at(wi[i], wo[i]);
        }
        ret
    }

    /// Replaces every column with its cumulative sum, from short to long
    /// excitation wavelengths.
    pub fn accumulate_horizontal(&mut self) {
        for y in 1..S500_CHANNELS {
            let mut sum = 0.0;
            for x in 0..y {
                sum += self.xy(x, y);
                self.x.set_xy(x, y, sum);
            }
        }
    }

    /// Returns the matrix with every column replaced by its cumulative sum.
    pub fn horizontal(&self) -> Self {
        let mut ret = self.clone();
        ret.accumulate_horizontal();
        ret
    }

    /// Replaces every row with its cumulative sum, from long to short
    /// emission wavelengths.
    pub fn accumulate_vertical(&mut self) {
        for x in 0..S500_CHANNELS {
            let mut sum = 0.0;
            for y in (x + 1..S500_CHANNELS).rev() {
                sum += self.xy(x, y);
                self.x.set_xy(x, y, sum);
            }
        }
    }

    /// Returns the matrix with every row replaced by its cumulative sum.
    pub fn vertical(&self) -> Self {
        let mut ret = self.clone();
        ret.accumulate_vertical();
        ret
    }

    /// Returns the total energy arriving in each emission channel from all
    /// excitation channels.
    pub fn horizontal_spectrum(&self) -> Spectrum {
        let mut ret = s500_zero();
        for y in 0..S500_CHANNELS {
            ret[y] = (0..S500_CHANNELS).map(|x| self.xy(x, y)).sum();
        }
        ret
    }

    /// Returns the total energy leaving each excitation channel into all
    /// emission channels.
    pub fn vertical_spectrum(&self) -> Spectrum {
        let mut ret = s500_zero();
        for x in 0..S500_CHANNELS {
            ret[x] = (x + 1..S500_CHANNELS).rev().map(|y| self.xy(x, y)).sum();
        }
        ret
    }

    /// Integrates the grid onto the channels of an ISR. Each ISR entry is the
    /// sum over the grid cells inside its excitation and emission bounds,
    /// divided by the excitation width in grid cells.
    ///
    /// * `isr` - The internal spectral representation.
    pub fn to_crosstalk(&self, isr: &Isr) -> Crosstalk {
        let bounds = |i: usize| {
            let lo = clamped_grid_index(isr.channel_lower_bound(i));
            let hi = clamped_grid_index(isr.channel_lower_bound(i + 1));
            (lo, hi)
        };

        let mut ret = Crosstalk::new(isr.channels());
        for y_ci in 1..isr.channels() {
            let (y0, y1) = bounds(y_ci);
            for x_ci in 0..y_ci {
                let (x0, x1) = bounds(x_ci);
                if x1 <= x0 {
                    continue;
                }

                let mut sum = 0.0;
                for x in x0..x1 {
                    sum += (y0..y1).map(|y| self.xy(x, y)).sum::<Float>();
                }
                let v = sum / (x1 - x0) as Float;
                foundation_assert!(v >= 0.0 && v.is_finite(), "v = {}", v);
                ret.set_xy(x_ci, y_ci, v);
            }
        }
        ret
    }

    /// Returns true if every entry is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.x.is_valid()
    }
}

/// Returns the grid cell of a wavelength, truncating towards 300nm.
fn grid_index(lambda: Float) -> Result<usize, String> {
    let i = (lambda - S500_START_NM) / S500_STEP_NM;
    if i.is_finite() && i >= 0.0 {
        Ok(i as usize)
    } else {
        Err(format!(
            "wavelength {}nm outside the 1nm crosstalk grid",
            lambda
        ))
    }
}

fn clamped_grid_index(lambda: Float) -> usize {
    let i = ((lambda - S500_START_NM) / S500_STEP_NM).floor();
    clamp(i, 0.0, S500_CHANNELS as Float) as usize
}

impl Add<&Crosstalk500> for &Crosstalk500 {
    type Output = Crosstalk500;

    /// Adds the entries of two matrices.
    ///
    /// * `other` - The other matrix.
    fn add(self, other: &Crosstalk500) -> Self::Output {
        Crosstalk500 {
            x: &self.x + &other.x,
        }
    }
}

impl Mul<Float> for &Crosstalk500 {
    type Output = Crosstalk500;

    /// Scales the entries.
    ///
    /// * `d` - Non-negative factor.
    fn mul(self, d: Float) -> Self::Output {
        Crosstalk500 { x: &self.x * d }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn set_ignores_upper_triangle() {
        let mut x = Crosstalk500::new();
        x.set_xy(10, 5, 1.0);
        x.set_xy(5, 5, 1.0);
        x.set_xy(5, 10, 1.0);
        x.set_xy(5, 600, 1.0);
        assert_eq!(x.xy(10, 5), 0.0);
        assert_eq!(x.xy(5, 5), 0.0);
        assert_eq!(x.xy(5, 10), 1.0);
        assert!(approx_eq!(Float, x.as_crosstalk().max(), 1.0));
    }

    #[test]
    fn wavelength_lookup() {
        let mut x = Crosstalk500::new();
        x.set_xy(100, 200, 0.5);
        assert_eq!(x.value_at(400.0, 500.0), 0.5);
        assert_eq!(x.value_at(400.2, 499.8), 0.5);
        assert_eq!(x.value_at(500.0, 400.0), 0.0);
        assert_eq!(x.value_at(250.0, 500.0), 0.0);
        assert_eq!(x.value_at(400.0, 900.0), 0.0);

        let wi = Wavelength::from_array([400.0, 410.0, 400.0, 420.0]);
        let wo = Wavelength::from_array([500.0, 500.0, 300.0, 700.0]);
        assert_eq!(x.hero_values(&wi, &wo), [0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn cumulative_sums() {
        let mut x = Crosstalk500::new();
        x.set_xy(0, 3, 1.0);
        x.set_xy(1, 3, 2.0);
        x.set_xy(2, 3, 3.0);
        x.set_xy(0, 1, 4.0);

        let h = x.horizontal();
        assert_eq!(h.xy(0, 3), 1.0);
        assert_eq!(h.xy(1, 3), 3.0);
        assert_eq!(h.xy(2, 3), 6.0);
        assert_eq!(h.xy(0, 1), 4.0);

        let v = x.vertical();
        assert_eq!(v.xy(0, 499), 0.0);
        assert_eq!(v.xy(0, 3), 1.0);
        assert_eq!(v.xy(0, 2), 1.0);
        assert_eq!(v.xy(0, 1), 5.0);

        let hs = x.horizontal_spectrum();
        assert_eq!(hs.channels(), S500_CHANNELS);
        assert_eq!(hs[3], 6.0);
        assert_eq!(hs[1], 4.0);
        assert_eq!(hs[0], 0.0);

        let vs = x.vertical_spectrum();
        assert_eq!(vs[0], 5.0);
        assert_eq!(vs[1], 2.0);
        assert_eq!(vs[3], 0.0);
    }

    #[test]
    fn tent_peaks_at_centre() {
        let x = Crosstalk500::tent(2.0, (400.0, 500.0), (10.0, 20.0));
        assert!(x.is_valid());
        assert_eq!(x.value_at(400.0, 500.0), 2.0);
        assert!(approx_eq!(Float, x.value_at(405.0, 500.0), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, x.value_at(400.0, 510.0), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, x.value_at(405.0, 510.0), 1.0, epsilon = 1e-5));
        assert_eq!(x.value_at(411.0, 500.0), 0.0);
        assert_eq!(x.value_at(400.0, 521.0), 0.0);
    }

    #[test]
    fn rasterise_measured_table() {
        // One excitation column at 400nm, two emission rows at 500nm and 510nm.
        let rss = RegularSpectrum2D::new(400.0, 4.0, 500.0, 10.0, 1, vec![8.0, 4.0]).unwrap();
        let x = Crosstalk500::from_regular_spectrum_2d(&rss).unwrap();
        assert_eq!(x.value_at(398.0, 495.0), 2.0);
        assert_eq!(x.value_at(401.0, 504.0), 2.0);
        assert_eq!(x.value_at(401.0, 505.0), 1.0);
        assert_eq!(x.value_at(402.0, 500.0), 0.0);
        assert_eq!(x.value_at(400.0, 516.0), 0.0);
    }

    #[test]
    fn rasterise_rejects_data_below_grid() {
        let rss = RegularSpectrum2D::new(290.0, 4.0, 500.0, 10.0, 1, vec![1.0]).unwrap();
        assert!(Crosstalk500::from_regular_spectrum_2d(&rss).is_err());
    }

    #[test]
    fn integrate_onto_isr_channels() {
        let mut x = Crosstalk500::new();
        // Excitation in [400, 410), emission in [450, 460).
        for xx in 100..110 {
            for yy in 150..160 {
                x.set_xy(xx, yy, 0.5);
            }
        }
        let isr = Isr::new(4, 400.0, 50.0).unwrap();
        let c = x.to_crosstalk(&isr);
        assert_eq!(c.channels(), 4);
        // 10 x 10 cells of 0.5 over an excitation width of 50 cells.
        assert!(approx_eq!(Float, c.xy(0, 1), 1.0, epsilon = 1e-5));
        assert_eq!(c.xy(0, 2), 0.0);
        assert_eq!(c.xy(1, 2), 0.0);
        assert!(c.is_valid());
    }

    #[test]
    fn algebra() {
        let a = Crosstalk500::from_value(0.25);
        let b = &(&a + &a) * 2.0;
        assert_eq!(b.xy(0, 1), 1.0);
        assert_eq!(b.xy(498, 499), 1.0);
        assert!(b.is_valid());
        assert_eq!(Crosstalk500::default(), Crosstalk500::new());
    }
}
