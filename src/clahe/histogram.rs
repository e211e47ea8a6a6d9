//! 256-bin intensity histograms for statistics tiles.
//!
//! Two strategies share one interface so LUT construction and blending can be
//! exercised with either:
//! - **Exact**: integer counts, each pixel lands in exactly one bin.
//! - **Smoothed**: Gaussian kernel density estimate at the bin centres,
//!   scaled to the tile's pixel count. Differentiable in the pixel values.

use ndarray::ArrayView2;

/// Number of histogram bins and LUT entries.
pub const BINS: usize = 256;

/// Builds a 256-bin histogram from one tile channel with values in 0.0-1.0.
pub trait HistogramStrategy: Sync {
    /// Histogram of `tile`. The bins sum (approximately) to the pixel count.
    fn histogram(&self, tile: ArrayView2<f32>) -> [f64; BINS];
}

/// Exact bin counting over `[0, 1]`.
///
/// Bin `k` covers `[k/256, (k+1)/256)`; a value of exactly 1.0 falls in the
/// last bin. Out-of-range values are clamped first.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExactHistogram;

impl HistogramStrategy for ExactHistogram {
    fn histogram(&self, tile: ArrayView2<f32>) -> [f64; BINS] {
        let mut hist = [0u32; BINS];
        for &v in tile.iter() {
            hist[histogram_bin(v)] += 1;
        }
        hist.map(f64::from)
    }
}

#[inline]
fn histogram_bin(v: f32) -> usize {
    ((v.clamp(0.0, 1.0) * BINS as f32) as usize).min(BINS - 1)
}

/// Gaussian kernel density histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedHistogram {
    /// Kernel standard deviation in intensity units (0.0-1.0)
    pub bandwidth: f32,
}

impl Default for SmoothedHistogram {
    fn default() -> Self {
        Self { bandwidth: 0.001 }
    }
}

impl SmoothedHistogram {
    pub fn new(bandwidth: f32) -> Self {
        Self { bandwidth }
    }
}

impl HistogramStrategy for SmoothedHistogram {
    fn histogram(&self, tile: ArrayView2<f32>) -> [f64; BINS] {
        const EPSILON: f64 = 1e-10;

        let pixels = tile.len();
        let mut pdf = [0f64; BINS];
        if pixels == 0 {
            return pdf;
        }

        let sigma = f64::from(self.bandwidth.max(f32::EPSILON));
        for &v in tile.iter() {
            let v = f64::from(v);
            for (k, bin) in pdf.iter_mut().enumerate() {
                let residual = (v - k as f64 / (BINS - 1) as f64) / sigma;
                *bin += (-0.5 * residual * residual).exp();
            }
        }

        // Mean kernel response per bin, normalised to unit mass
        for bin in pdf.iter_mut() {
            *bin /= pixels as f64;
        }
        let norm = pdf.iter().sum::<f64>() + EPSILON;
        pdf.map(|p| p / norm * pixels as f64)
    }
}
