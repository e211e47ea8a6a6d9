//! Per-tile remapping tables (LUTs) built from local histograms.
//!
//! For each statistics tile and channel:
//!   1. Histogram the tile (see [`HistogramStrategy`]).
//!   2. Derive an integer `step` from the histogram ([`StepRule`]).
//!   3. `step == 0`: the tile carries no contrast information and gets an
//!      all-zero table.
//!   4. Otherwise `raw[i] = floor((cum[i] + floor(step / 2)) / step)`, clamped
//!      to 0-255, shifted right by one entry so that `lut[0] == 0`.

use ndarray::{s, Array5, ArrayView2, ArrayView6};
use rayon::prelude::*;

use super::histogram::{ExactHistogram, HistogramStrategy, BINS};
use crate::error::ClaheResult;

/// A 256-entry intensity remapping table.
pub type Lut = [u8; BINS];

/// How the equalization step size is derived from a tile histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepRule {
    /// `floor((mass of populated bins - mass of the last populated bin) / 255)`.
    ///
    /// A bin is populated when it holds more than 0.999 of a pixel. Tiles
    /// with a single intensity level get `step == 0`.
    #[default]
    TrailingExcess,
    /// `floor((pixel count - 1) / 255)`, independent of the histogram shape.
    PixelCount,
}

impl StepRule {
    /// Step size for a histogram of a tile with `pixels` pixels.
    pub fn step(&self, hist: &[f64; BINS], pixels: usize) -> f64 {
        match self {
            StepRule::TrailingExcess => {
                let mut mass = 0.0;
                let mut last = 0.0;
                for &h in hist.iter().filter(|&&h| h > 0.999) {
                    mass += h;
                    last = h;
                }
                ((mass - last) / 255.0).floor()
            }
            StepRule::PixelCount => (pixels.saturating_sub(1) / 255) as f64,
        }
    }
}

/// Build the shifted equalization table for one histogram.
///
/// Returns all zeros when `step` is zero.
pub fn build_lut(hist: &[f64; BINS], step: f64) -> Lut {
    let mut lut = [0u8; BINS];
    if step <= 0.0 {
        return lut;
    }

    let half = (step / 2.0).floor();
    let mut cum = 0.0;
    for i in 0..BINS - 1 {
        cum += hist[i];
        lut[i + 1] = ((cum + half) / step).floor().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Builds LUTs for statistics tiles with a given histogram strategy.
pub struct LutBuilder<'a, H: HistogramStrategy + ?Sized> {
    strategy: &'a H,
    step_rule: StepRule,
}

impl<'a, H: HistogramStrategy + ?Sized> LutBuilder<'a, H> {
    pub fn new(strategy: &'a H, step_rule: StepRule) -> Self {
        Self { strategy, step_rule }
    }

    /// LUT for a single tile channel.
    pub fn tile_lut(&self, tile: ArrayView2<f32>) -> Lut {
        let hist = self.strategy.histogram(tile);
        let step = self.step_rule.step(&hist, tile.len());
        if step <= 0.0 {
            log::trace!("flat tile ({} pixels), using zero LUT", tile.len());
        }
        build_lut(&hist, step)
    }

    /// LUTs for every tile of a `[B, GH, GW, C, TH, TW]` tile set.
    ///
    /// # Returns
    /// `[B, GH, GW, C, 256]` table, one LUT per image, tile and channel
    pub fn build(&self, tiles: ArrayView6<f32>) -> ClaheResult<Array5<u8>> {
        let (batch, rows, cols, channels, _, _) = tiles.dim();

        let mut flat = vec![0u8; batch * rows * cols * channels * BINS];
        flat.par_chunks_mut(BINS).enumerate().for_each(|(n, out)| {
            let c = n % channels;
            let gx = (n / channels) % cols;
            let gy = (n / (channels * cols)) % rows;
            let b = n / (channels * cols * rows);
            let tile = tiles.slice(s![b, gy, gx, c, .., ..]);
            out.copy_from_slice(&self.tile_lut(tile));
        });

        Ok(Array5::from_shape_vec((batch, rows, cols, channels, BINS), flat)?)
    }
}

/// LUTs with exact histograms and the default step rule.
pub fn compute_luts(tiles: ArrayView6<f32>) -> ClaheResult<Array5<u8>> {
    LutBuilder::new(&ExactHistogram, StepRule::default()).build(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clahe::histogram::SmoothedHistogram;
    use ndarray::{Array2, Array6};

    fn levels_tile() -> Array2<f32> {
        // 256 distinct levels, one pixel each
        Array2::from_shape_fn((16, 16), |(y, x)| (y * 16 + x) as f32 / 255.0)
    }

    fn bimodal_tile() -> Array2<f32> {
        // 1024 pixels, half black and half white
        Array2::from_shape_fn((32, 32), |(y, _)| if y < 16 { 0.0 } else { 1.0 })
    }

    #[test]
    fn test_uniform_tile_gives_zero_lut() {
        let tile = Array2::from_elem((16, 16), 0.4f32);
        let builder = LutBuilder::new(&ExactHistogram, StepRule::TrailingExcess);
        assert_eq!(builder.tile_lut(tile.view()), [0u8; BINS]);
    }

    #[test]
    fn test_small_tile_pixel_count_rule_is_degenerate() {
        // (16 - 1) / 255 == 0
        let tile = Array2::from_shape_fn((4, 4), |(y, x)| (y * 4 + x) as f32 / 15.0);
        let builder = LutBuilder::new(&ExactHistogram, StepRule::PixelCount);
        assert_eq!(builder.tile_lut(tile.view()), [0u8; BINS]);
    }

    #[test]
    fn test_spread_tile_lut_is_identity() {
        let tile = levels_tile();
        for rule in [StepRule::TrailingExcess, StepRule::PixelCount] {
            let lut = LutBuilder::new(&ExactHistogram, rule).tile_lut(tile.view());
            assert_eq!(lut[0], 0);
            assert!(lut.windows(2).all(|w| w[0] <= w[1]), "{rule:?} not monotonic");
            for (i, &v) in lut.iter().enumerate() {
                assert_eq!(v as usize, i, "{rule:?} at {i}");
            }
        }
    }

    #[test]
    fn test_bimodal_tile_step_rules() {
        let tile = bimodal_tile();
        let hist = ExactHistogram.histogram(tile.view());

        // (1024 - 512) / 255 -> 2, (512 + 1) / 2 -> 256 -> clamped
        assert_eq!(StepRule::TrailingExcess.step(&hist, 1024), 2.0);
        let lut = LutBuilder::new(&ExactHistogram, StepRule::TrailingExcess).tile_lut(tile.view());
        assert_eq!(lut[0], 0);
        assert!(lut[1..].iter().all(|&v| v == 255));

        // 1023 / 255 -> 4, (512 + 2) / 4 -> 128
        assert_eq!(StepRule::PixelCount.step(&hist, 1024), 4.0);
        let lut = LutBuilder::new(&ExactHistogram, StepRule::PixelCount).tile_lut(tile.view());
        assert_eq!(lut[0], 0);
        assert!(lut[1..].iter().all(|&v| v == 128));
    }

    #[test]
    fn test_lut_is_non_decreasing_for_skewed_tile() {
        let tile = Array2::from_shape_fn((32, 32), |(y, x)| ((y * 32 + x) as f32 / 1023.0).powi(3));
        let lut = LutBuilder::new(&ExactHistogram, StepRule::default()).tile_lut(tile.view());
        assert_eq!(lut[0], 0);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
        assert!(lut[255] > 200);
    }

    #[test]
    fn test_smoothed_strategy_matches_exact_on_bin_centres() {
        let tile = levels_tile();
        let exact = LutBuilder::new(&ExactHistogram, StepRule::default()).tile_lut(tile.view());
        let smooth = LutBuilder::new(&SmoothedHistogram::default(), StepRule::default()).tile_lut(tile.view());
        for i in 0..BINS {
            let diff = (exact[i] as i32 - smooth[i] as i32).abs();
            assert!(diff <= 1, "bin {i}: exact {} smoothed {}", exact[i], smooth[i]);
        }
    }

    #[test]
    fn test_build_shape_and_channels() {
        // Channel 0 flat, channel 1 spread over all levels
        let tiles = Array6::from_shape_fn((1, 2, 1, 2, 16, 16), |(_, _, _, c, y, x)| {
            if c == 0 {
                0.5
            } else {
                (y * 16 + x) as f32 / 255.0
            }
        });
        let luts = compute_luts(tiles.view()).unwrap();
        assert_eq!(luts.dim(), (1, 2, 1, 2, BINS));
        for gy in 0..2 {
            assert!(luts.slice(s![0, gy, 0, 0, ..]).iter().all(|&v| v == 0));
            assert_eq!(luts[[0, gy, 0, 1, 255]], 255);
            assert_eq!(luts[[0, gy, 0, 1, 100]], 100);
        }
    }
}
