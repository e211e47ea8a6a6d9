//! Bottom/right edge-reflection padding.

use ndarray::{Array4, ArrayView4};

use super::grid::GridGeometry;

/// Pad a `[batch, channel, height, width]` image to fill the grid.
///
/// Rows and columns are mirrored about the last pixel, which itself is not
/// repeated: `a b c d | c b a`. Padding wider than the image keeps bouncing
/// between both edges; a single-pixel axis is replicated.
pub fn pad_reflect(image: ArrayView4<f32>, geometry: &GridGeometry) -> Array4<f32> {
    let (batch, channels, height, width) = image.dim();

    if geometry.pad_bottom == 0 && geometry.pad_right == 0 {
        return image.to_owned();
    }

    let padded_height = height + geometry.pad_bottom;
    let padded_width = width + geometry.pad_right;

    Array4::from_shape_fn((batch, channels, padded_height, padded_width), |(b, c, y, x)| {
        image[[b, c, reflect_index(y, height), reflect_index(x, width)]]
    })
}

/// Map a coordinate past the end of an axis of length `len` back inside it.
#[inline]
fn reflect_index(i: usize, len: usize) -> usize {
    if i < len {
        return i;
    }
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = i % period;
    if m < len {
        m
    } else {
        period - m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clahe::grid::plan_grid;

    #[test]
    fn test_reflect_index() {
        // len 4: 0 1 2 3 | 2 1 0 1 2 3 2
        let mapped: Vec<usize> = (0..11).map(|i| reflect_index(i, 4)).collect();
        assert_eq!(mapped, vec![0, 1, 2, 3, 2, 1, 0, 1, 2, 3, 2]);
        assert_eq!(reflect_index(5, 1), 0);
    }

    #[test]
    fn test_pad_noop() {
        let img = Array4::from_shape_fn((1, 1, 4, 4), |(_, _, y, x)| (y * 4 + x) as f32 / 15.0);
        let g = plan_grid(4, 4, 2, 2, true).unwrap();
        let padded = pad_reflect(img.view(), &g);
        assert_eq!(padded, img);
    }

    #[test]
    fn test_pad_reflects_bottom_right() {
        // 3x3 with 2x2 grid and even tiles -> tile 2x2, padded to 4x4
        let img = Array4::from_shape_fn((1, 1, 3, 3), |(_, _, y, x)| (y * 3 + x) as f32);
        let g = plan_grid(3, 3, 2, 2, true).unwrap();
        assert_eq!((g.pad_bottom, g.pad_right), (1, 1));

        let padded = pad_reflect(img.view(), &g);
        assert_eq!(padded.dim(), (1, 1, 4, 4));

        // Original region untouched
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(padded[[0, 0, y, x]], img[[0, 0, y, x]]);
            }
        }
        // Row 3 mirrors row 1, column 3 mirrors column 1
        for x in 0..3 {
            assert_eq!(padded[[0, 0, 3, x]], img[[0, 0, 1, x]]);
        }
        for y in 0..3 {
            assert_eq!(padded[[0, 0, y, 3]], img[[0, 0, y, 1]]);
        }
        assert_eq!(padded[[0, 0, 3, 3]], img[[0, 0, 1, 1]]);
    }

    #[test]
    fn test_pad_keeps_channels_apart() {
        let img = Array4::from_shape_fn((2, 3, 5, 2), |(b, c, y, x)| {
            (b * 100 + c * 10 + y + x) as f32
        });
        let g = plan_grid(5, 2, 3, 1, true).unwrap();
        let padded = pad_reflect(img.view(), &g);
        assert_eq!(padded.dim(), (2, 3, 6, 2));
        for b in 0..2 {
            for c in 0..3 {
                assert_eq!(padded[[b, c, 5, 0]], img[[b, c, 3, 0]]);
            }
        }
    }
}
