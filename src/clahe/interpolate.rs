//! Bilinear blending of tile LUTs over the query-tile grid.
//!
//! Every statistics tile is split into four query tiles. A query tile lies
//! between the centres of up to four statistics tiles; its output blends the
//! LUTs of those tiles with weights taken from the query tile's position.
//!
//! ```text
//!   fine grid (2GH x 2GW)          region
//!   +---+---+---+---+
//!   | C | V | V | C |              C = Corner          (1 LUT)
//!   +---+---+---+---+              H = HorizontalBorder (2 LUTs, blended vertically)
//!   | H | I | I | H |              V = VerticalBorder   (2 LUTs, blended horizontally)
//!   +---+---+---+---+              I = Interior         (4 LUTs, bilinear)
//!   | H | I | I | H |
//!   +---+---+---+---+
//!   | C | V | V | C |
//!   +---+---+---+---+
//! ```

use ndarray::{Array6, ArrayView5, ArrayView6, ErrorKind, ShapeError};
use rayon::prelude::*;

use super::grid::BlendWeights;
use super::histogram::BINS;
use crate::error::ClaheResult;

/// `(row, col)` of a statistics tile in the coarse grid.
pub type TileIndex = (usize, usize);

/// How a query tile combines the LUTs of its neighbouring statistics tiles.
///
/// Ramp fields select the half of the [`BlendWeights`] ramp to use; a weight
/// of 1 gives the first-named tile (top/left), 0 the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Grid corner: the parent LUT applies unchanged.
    Corner { tile: TileIndex },
    /// Left/right grid edge: blend the tiles above and below.
    HorizontalBorder {
        top: TileIndex,
        bottom: TileIndex,
        ramp: usize,
    },
    /// Top/bottom grid edge: blend the tiles to the left and right.
    VerticalBorder {
        left: TileIndex,
        right: TileIndex,
        ramp: usize,
    },
    /// Everything else: blend horizontally, then vertically.
    Interior {
        top_left: TileIndex,
        top_right: TileIndex,
        bottom_left: TileIndex,
        bottom_right: TileIndex,
        row_ramp: usize,
        col_ramp: usize,
    },
}

impl Region {
    /// Classify the query tile at `(j, i)` of a `fine_rows × fine_cols` grid.
    pub fn classify(j: usize, i: usize, fine_rows: usize, fine_cols: usize) -> Self {
        let edge_row = j == 0 || j + 1 == fine_rows;
        let edge_col = i == 0 || i + 1 == fine_cols;

        let (parent_row, parent_col) = (j / 2, i / 2);
        // Bottom/right halves look at the next tile, top/left halves at the previous
        let upper = (parent_row + j % 2).saturating_sub(1);
        let lower = parent_row + j % 2;
        let left = (parent_col + i % 2).saturating_sub(1);
        let right = parent_col + i % 2;
        let row_ramp = (j + 1) % 2;
        let col_ramp = (i + 1) % 2;

        match (edge_row, edge_col) {
            (true, true) => Region::Corner {
                tile: (parent_row, parent_col),
            },
            (_, true) => Region::HorizontalBorder {
                top: (upper, parent_col),
                bottom: (lower, parent_col),
                ramp: row_ramp,
            },
            (true, false) => Region::VerticalBorder {
                left: (parent_row, left),
                right: (parent_row, right),
                ramp: col_ramp,
            },
            (false, false) => Region::Interior {
                top_left: (upper, left),
                top_right: (upper, right),
                bottom_left: (lower, left),
                bottom_right: (lower, right),
                row_ramp,
                col_ramp,
            },
        }
    }
}

/// Quantize a 0.0-1.0 intensity to a LUT index.
#[inline]
pub fn lut_index(v: f32) -> usize {
    ((v.clamp(0.0, 1.0) * 255.0) as usize).min(BINS - 1)
}

#[inline]
fn blend(weight: f32, first: f32, second: f32) -> f32 {
    weight * (first - second) + second
}

/// Equalize every query tile by blending neighbouring LUTs.
///
/// # Arguments
/// * `query` - Query tiles `[B, 2GH, 2GW, C, TH/2, TW/2]`, values 0.0-1.0
/// * `luts` - Tile LUTs `[B, GH, GW, C, 256]`
/// * `weights` - Ramps for `TH/2 × TW/2` query tiles
///
/// # Returns
/// Equalized query tiles with the shape of `query`, values 0-255
pub fn interpolate_tiles(
    query: ArrayView6<f32>,
    luts: ArrayView5<u8>,
    weights: &BlendWeights,
) -> ClaheResult<Array6<u8>> {
    let (batch, fine_rows, fine_cols, channels, th, tw) = query.dim();
    let (lut_batch, rows, cols, lut_channels, bins) = luts.dim();

    let consistent = lut_batch == batch
        && 2 * rows == fine_rows
        && 2 * cols == fine_cols
        && lut_channels == channels
        && bins == BINS
        && weights.rows.iter().all(|r| r.len() == th)
        && weights.cols.iter().all(|c| c.len() == tw);
    if !consistent {
        return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
    }

    let tile_len = channels * th * tw;
    let mut flat = vec![0u8; batch * fine_rows * fine_cols * tile_len];

    flat.par_chunks_mut(tile_len.max(1)).enumerate().for_each(|(n, out)| {
        let i = n % fine_cols;
        let j = (n / fine_cols) % fine_rows;
        let b = n / (fine_cols * fine_rows);
        let region = Region::classify(j, i, fine_rows, fine_cols);

        for c in 0..channels {
            let mapped = |tile: TileIndex, v: usize| luts[[b, tile.0, tile.1, c, v]];
            let mapped_f = |tile: TileIndex, v: usize| f32::from(mapped(tile, v));

            for y in 0..th {
                for x in 0..tw {
                    let v = lut_index(query[[b, j, i, c, y, x]]);

                    let value = match region {
                        Region::Corner { tile } => mapped(tile, v),
                        Region::HorizontalBorder { top, bottom, ramp } => {
                            let w = weights.rows[ramp][y];
                            to_level(blend(w, mapped_f(top, v), mapped_f(bottom, v)))
                        }
                        Region::VerticalBorder { left, right, ramp } => {
                            let w = weights.cols[ramp][x];
                            to_level(blend(w, mapped_f(left, v), mapped_f(right, v)))
                        }
                        Region::Interior {
                            top_left,
                            top_right,
                            bottom_left,
                            bottom_right,
                            row_ramp,
                            col_ramp,
                        } => {
                            let wx = weights.cols[col_ramp][x];
                            let wy = weights.rows[row_ramp][y];
                            let top = blend(wx, mapped_f(top_left, v), mapped_f(top_right, v));
                            let bottom = blend(wx, mapped_f(bottom_left, v), mapped_f(bottom_right, v));
                            to_level(blend(wy, top, bottom))
                        }
                    };

                    out[(c * th + y) * tw + x] = value;
                }
            }
        }
    });

    Ok(Array6::from_shape_vec(
        (batch, fine_rows, fine_cols, channels, th, tw),
        flat,
    )?)
}

#[inline]
fn to_level(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}
