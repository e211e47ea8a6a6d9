//! Tile extraction and reassembly.
//!
//! Statistics tiles partition the padded image into `GH × GW` blocks of
//! `TH × TW`. Query tiles quarter each statistics tile, giving a
//! `2GH × 2GW` grid of `TH/2 × TW/2` blocks. Both are laid out as
//! `[batch, grid_row, grid_col, channel, tile_row, tile_col]`.

use ndarray::{s, Array4, Array6, ArrayView4, ArrayView6};

use super::grid::GridGeometry;
use crate::error::{ClaheError, ClaheResult};

/// Split a padded image into the statistics tiles of `geometry`.
pub fn extract_stat_tiles(padded: ArrayView4<f32>, geometry: &GridGeometry) -> ClaheResult<Array6<f32>> {
    partition(padded, geometry.tile_height, geometry.tile_width)
}

/// Split a padded image into query tiles, a quarter of a statistics tile each.
///
/// Fails with `UnevenPartition` when the tile size is odd.
pub fn extract_query_tiles(padded: ArrayView4<f32>, geometry: &GridGeometry) -> ClaheResult<Array6<f32>> {
    if geometry.tile_height % 2 != 0 {
        return Err(ClaheError::UnevenPartition {
            axis: "height",
            size: geometry.tile_height,
            block: 2,
        });
    }
    if geometry.tile_width % 2 != 0 {
        return Err(ClaheError::UnevenPartition {
            axis: "width",
            size: geometry.tile_width,
            block: 2,
        });
    }
    partition(padded, geometry.tile_height / 2, geometry.tile_width / 2)
}

fn partition(padded: ArrayView4<f32>, block_height: usize, block_width: usize) -> ClaheResult<Array6<f32>> {
    let (batch, channels, height, width) = padded.dim();

    if block_height == 0 || height % block_height != 0 {
        return Err(ClaheError::UnevenPartition {
            axis: "height",
            size: height,
            block: block_height,
        });
    }
    if block_width == 0 || width % block_width != 0 {
        return Err(ClaheError::UnevenPartition {
            axis: "width",
            size: width,
            block: block_width,
        });
    }

    let rows = height / block_height;
    let cols = width / block_width;

    // [B, C, GH, TH, GW, TW] -> [B, GH, GW, C, TH, TW]
    let tiles = padded
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((batch, channels, rows, block_height, cols, block_width))?
        .permuted_axes([0, 2, 4, 1, 3, 5]);

    Ok(tiles.as_standard_layout().into_owned())
}

/// Reassemble tiles into `[batch, channel, height, width]` and crop the padding.
///
/// Tiles are joined along the width within each grid row, then the rows are
/// stacked. `height` and `width` are the unpadded image size.
pub fn compose<T: Clone>(tiles: ArrayView6<T>, height: usize, width: usize) -> ClaheResult<Array4<T>> {
    let (batch, rows, cols, channels, block_height, block_width) = tiles.dim();
    let full_height = rows * block_height;
    let full_width = cols * block_width;

    let image = tiles
        .permuted_axes([0, 3, 1, 4, 2, 5])
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((batch, channels, full_height, full_width))?;

    Ok(image
        .slice(s![.., .., ..height.min(full_height), ..width.min(full_width)])
        .to_owned())
}
