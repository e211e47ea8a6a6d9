//! Adaptive histogram equalization over a tile grid.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Plan grid | [`grid`] | `GridGeometry` + `BlendWeights` |
//! | Pad | [`pad`] | `[B, C, TH*GH, TW*GW]` |
//! | Extract tiles | [`tiles`] | `[B, GH, GW, C, TH, TW]` and `[B, 2GH, 2GW, C, TH/2, TW/2]` |
//! | Build LUTs | [`lut`] | `[B, GH, GW, C, 256]` |
//! | Interpolate | [`interpolate`] | `[B, 2GH, 2GW, C, TH/2, TW/2]` (u8) |
//! | Composite | [`tiles::compose`] | `[B, C, H, W]` (u8) |
//!
//! Input intensities are 0.0-1.0, output levels are 0-255. Every stage is a
//! pure function of its inputs; LUT construction and interpolation run in
//! parallel with Rayon.

pub mod grid;
pub mod histogram;
pub mod interpolate;
pub mod lut;
pub mod pad;
pub mod tiles;

use ndarray::{Array3, Array4, ArrayView3, ArrayView4, Axis};

use crate::error::ClaheResult;
use histogram::{ExactHistogram, HistogramStrategy};
use lut::{LutBuilder, StepRule};

pub use grid::{plan_grid, BlendWeights, GridGeometry};
pub use histogram::SmoothedHistogram;
pub use interpolate::Region;

/// Parameters for adaptive equalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaheConfig {
    /// Number of statistics tiles vertically
    pub grid_rows: usize,
    /// Number of statistics tiles horizontally
    pub grid_cols: usize,
    /// Round tile sizes up to even numbers (required for the query tiles)
    pub even_tile_size: bool,
    /// Step size rule for LUT construction
    pub step_rule: StepRule,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            grid_rows: 8,
            grid_cols: 8,
            even_tile_size: true,
            step_rule: StepRule::TrailingExcess,
        }
    }
}

impl ClaheConfig {
    /// Config for a `rows × cols` grid with default settings otherwise.
    pub fn grid(rows: usize, cols: usize) -> Self {
        Self::default().with_grid(rows, cols)
    }

    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid_rows = rows;
        self.grid_cols = cols;
        self
    }

    pub fn with_even_tile_size(mut self, even_tile_size: bool) -> Self {
        self.even_tile_size = even_tile_size;
        self
    }

    pub fn with_step_rule(mut self, step_rule: StepRule) -> Self {
        self.step_rule = step_rule;
        self
    }
}

/// Equalize a batch of images with exact histograms.
///
/// # Arguments
/// * `image` - `[batch, channel, height, width]`, values 0.0-1.0
/// * `grid_rows`, `grid_cols` - Number of statistics tiles in each direction
/// * `even_tile_size` - Round tile sizes up to even numbers
///
/// # Returns
/// Equalized image of the same shape, values 0-255
pub fn equalize(
    image: ArrayView4<f32>,
    grid_rows: usize,
    grid_cols: usize,
    even_tile_size: bool,
) -> ClaheResult<Array4<u8>> {
    let config = ClaheConfig::grid(grid_rows, grid_cols).with_even_tile_size(even_tile_size);
    equalize_with(image, &config, &ExactHistogram)
}

/// Equalize a batch of images with an explicit config and histogram strategy.
pub fn equalize_with<H: HistogramStrategy + ?Sized>(
    image: ArrayView4<f32>,
    config: &ClaheConfig,
    strategy: &H,
) -> ClaheResult<Array4<u8>> {
    let (batch, channels, height, width) = image.dim();
    let geometry = plan_grid(
        height,
        width,
        config.grid_rows,
        config.grid_cols,
        config.even_tile_size,
    )?;
    let weights = geometry.blend_weights();

    let padded = pad::pad_reflect(image, &geometry);
    let stat_tiles = tiles::extract_stat_tiles(padded.view(), &geometry)?;
    let query_tiles = tiles::extract_query_tiles(padded.view(), &geometry)?;
    log::debug!(
        "equalizing {} image(s) of {}x{}x{}: stat tiles {:?}, query tiles {:?}",
        batch,
        channels,
        height,
        width,
        stat_tiles.dim(),
        query_tiles.dim()
    );

    let luts = LutBuilder::new(strategy, config.step_rule).build(stat_tiles.view())?;
    let equalized = interpolate::interpolate_tiles(query_tiles.view(), luts.view(), &weights)?;

    tiles::compose(equalized.view(), height, width)
}

/// Equalize a single `[channel, height, width]` image.
pub fn equalize_chw(
    image: ArrayView3<f32>,
    grid_rows: usize,
    grid_cols: usize,
    even_tile_size: bool,
) -> ClaheResult<Array3<u8>> {
    let batched = equalize(image.insert_axis(Axis(0)), grid_rows, grid_cols, even_tile_size)?;
    Ok(batched.index_axis_move(Axis(0), 0))
}

/// Global histogram equalization: a single tile covering each image.
pub fn equalize_global(image: ArrayView4<f32>) -> ClaheResult<Array4<u8>> {
    equalize(image, 1, 1, true)
}

/// Rescale 0-255 levels back to 0.0-1.0.
pub fn to_unit_range(levels: &Array4<u8>) -> Array4<f32> {
    levels.mapv(|v| v as f32 / 255.0)
}
