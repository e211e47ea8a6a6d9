//! Grid planning: tile sizes, padding and blend weight ramps.
//!
//! The grid covers the image with `rows × cols` statistics tiles of equal
//! size. When the image does not divide evenly, tiles are rounded up and the
//! image is later padded on the bottom and right edges to fill the grid.

use crate::error::{ClaheError, ClaheResult};

/// Tile layout for one image size and grid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    /// Source image height
    pub height: usize,
    /// Source image width
    pub width: usize,
    /// Number of statistics tiles vertically (GH)
    pub rows: usize,
    /// Number of statistics tiles horizontally (GW)
    pub cols: usize,
    /// Statistics tile height (TH)
    pub tile_height: usize,
    /// Statistics tile width (TW)
    pub tile_width: usize,
    /// Rows added below the image
    pub pad_bottom: usize,
    /// Columns added right of the image
    pub pad_right: usize,
}

impl GridGeometry {
    /// Height of the padded image (`TH * GH`).
    pub fn padded_height(&self) -> usize {
        self.tile_height * self.rows
    }

    /// Width of the padded image (`TW * GW`).
    pub fn padded_width(&self) -> usize {
        self.tile_width * self.cols
    }

    /// True if both tile dimensions can be split into two query tiles.
    pub fn is_even(&self) -> bool {
        self.tile_height % 2 == 0 && self.tile_width % 2 == 0
    }

    /// Weight ramps used by the interpolator for this geometry.
    pub fn blend_weights(&self) -> BlendWeights {
        BlendWeights::new(self.tile_height / 2, self.tile_width / 2)
    }
}

/// Compute tile dimensions and padding for a `grid_rows × grid_cols` grid.
///
/// # Arguments
/// * `height`, `width` - Source image size
/// * `grid_rows`, `grid_cols` - Number of statistics tiles in each direction
/// * `even_tile_size` - Round odd tile sizes up to the next even number
///
/// # Returns
/// The geometry, or `InvalidGrid` / `EmptyImage` for unusable input
pub fn plan_grid(
    height: usize,
    width: usize,
    grid_rows: usize,
    grid_cols: usize,
    even_tile_size: bool,
) -> ClaheResult<GridGeometry> {
    if grid_rows == 0 || grid_cols == 0 {
        return Err(ClaheError::InvalidGrid {
            rows: grid_rows,
            cols: grid_cols,
        });
    }
    if height == 0 || width == 0 {
        return Err(ClaheError::EmptyImage { height, width });
    }

    let mut tile_height = height.div_ceil(grid_rows);
    let mut tile_width = width.div_ceil(grid_cols);

    if even_tile_size {
        tile_height += tile_height % 2;
        tile_width += tile_width % 2;
    }

    let geometry = GridGeometry {
        height,
        width,
        rows: grid_rows,
        cols: grid_cols,
        tile_height,
        tile_width,
        pad_bottom: tile_height * grid_rows - height,
        pad_right: tile_width * grid_cols - width,
    };
    log::debug!("planned grid {:?}", geometry);
    Ok(geometry)
}

/// Linear blend weights for query tiles, split into two halves.
///
/// A ramp of length `2n` falls from 1 to 0. Half 0 covers the first `n`
/// entries (upper/left query tile of a pair), half 1 the remaining `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendWeights {
    /// Vertical ramp halves, indexed by row within a query tile
    pub rows: [Vec<f32>; 2],
    /// Horizontal ramp halves, indexed by column within a query tile
    pub cols: [Vec<f32>; 2],
}

impl BlendWeights {
    /// Build ramps for query tiles of `half_height × half_width`.
    pub fn new(half_height: usize, half_width: usize) -> Self {
        Self {
            rows: ramp_halves(half_height),
            cols: ramp_halves(half_width),
        }
    }
}

fn ramp_halves(half: usize) -> [Vec<f32>; 2] {
    if half == 0 {
        return [Vec::new(), Vec::new()];
    }
    let span = (2 * half - 1) as f32;
    let ramp: Vec<f32> = (0..2 * half)
        .map(|r| (2 * half - 1 - r) as f32 / span)
        .collect();
    [ramp[..half].to_vec(), ramp[half..].to_vec()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_grid_exact_fit() {
        let g = plan_grid(8, 8, 2, 2, true).unwrap();
        assert_eq!((g.tile_height, g.tile_width), (4, 4));
        assert_eq!((g.pad_bottom, g.pad_right), (0, 0));
        assert_eq!((g.padded_height(), g.padded_width()), (8, 8));
    }

    #[test]
    fn test_plan_grid_rounds_up() {
        // ceil(10 / 3) = 4, ceil(7 / 2) = 4
        let g = plan_grid(10, 7, 3, 2, false).unwrap();
        assert_eq!((g.tile_height, g.tile_width), (4, 4));
        assert_eq!((g.pad_bottom, g.pad_right), (2, 1));
    }

    #[test]
    fn test_plan_grid_even_tile_size() {
        // ceil(9 / 3) = 3 -> 4, ceil(10 / 2) = 5 -> 6
        let g = plan_grid(9, 10, 3, 2, true).unwrap();
        assert_eq!((g.tile_height, g.tile_width), (4, 6));
        assert_eq!((g.pad_bottom, g.pad_right), (3, 2));
        assert!(g.is_even());

        let odd = plan_grid(9, 10, 3, 2, false).unwrap();
        assert_eq!((odd.tile_height, odd.tile_width), (3, 5));
        assert!(!odd.is_even());
    }

    #[test]
    fn test_plan_grid_covers_image_minimally() {
        for height in 1..40 {
            for width in [1, 5, 16, 33] {
                for rows in 1..6 {
                    for cols in 1..4 {
                        let g = plan_grid(height, width, rows, cols, false).unwrap();
                        assert!(g.padded_height() >= height);
                        assert!(g.padded_width() >= width);
                        // One row of tiles less would not cover the image
                        assert!((g.tile_height - 1) * rows < height);
                        assert!((g.tile_width - 1) * cols < width);
                        assert_eq!(g.pad_bottom, g.padded_height() - height);
                        assert_eq!(g.pad_right, g.padded_width() - width);
                    }
                }
            }
        }
    }

    #[test]
    fn test_plan_grid_invalid() {
        assert!(matches!(
            plan_grid(8, 8, 0, 2, true),
            Err(ClaheError::InvalidGrid { rows: 0, cols: 2 })
        ));
        assert!(matches!(
            plan_grid(8, 8, 2, 0, true),
            Err(ClaheError::InvalidGrid { .. })
        ));
        assert!(matches!(
            plan_grid(0, 8, 2, 2, true),
            Err(ClaheError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_blend_weights_ramp() {
        let w = BlendWeights::new(2, 3);
        // 2 * 2 - 1 = 3 -> 3/3, 2/3 | 1/3, 0/3
        assert_eq!(w.rows[0], vec![1.0, 2.0 / 3.0]);
        assert_eq!(w.rows[1], vec![1.0 / 3.0, 0.0]);
        assert_eq!(w.cols[0].len(), 3);
        assert_eq!(w.cols[0][0], 1.0);
        assert_eq!(w.cols[1][2], 0.0);
    }

    #[test]
    fn test_blend_weights_single_pixel_tiles() {
        let w = BlendWeights::new(1, 1);
        assert_eq!(w.rows, [vec![1.0], vec![0.0]]);
        assert_eq!(w.cols, [vec![1.0], vec![0.0]]);
    }
}
