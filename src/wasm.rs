//! WebAssembly exports for adaptive equalization.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat buffers in `(batch, channels, height, width)` order.

use ndarray::ArrayView4;
use wasm_bindgen::prelude::*;

use crate::clahe::equalize;

/// Equalize a flat f32 image buffer.
///
/// # Arguments
/// * `data` - Intensities 0.0-1.0 (length = batch * channels * height * width)
/// * `batch`, `channels`, `height`, `width` - Buffer dimensions
/// * `grid_rows`, `grid_cols` - Number of tiles in each direction
///
/// # Returns
/// Flat array of levels 0-255 in the same order
#[wasm_bindgen]
pub fn equalize_clahe_wasm(
    data: &[f32],
    batch: usize,
    channels: usize,
    height: usize,
    width: usize,
    grid_rows: usize,
    grid_cols: usize,
) -> Result<Vec<u8>, JsError> {
    let input = ArrayView4::from_shape((batch, channels, height, width), data)?;
    let result = equalize(input, grid_rows, grid_cols, true)?;
    Ok(result.into_raw_vec_and_offset().0)
}
