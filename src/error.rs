//! Error types for the equalization engine.

use thiserror::Error;

/// Errors that can occur while equalizing an image.
#[derive(Debug, Error)]
pub enum ClaheError {
    /// Grid row or column count is zero
    #[error("invalid grid: {rows}x{cols}, both counts must be positive")]
    InvalidGrid {
        /// Requested grid rows
        rows: usize,
        /// Requested grid columns
        cols: usize,
    },

    /// Padded size is not a multiple of the block size
    #[error("uneven partition along {axis}: size {size} is not a multiple of block {block}")]
    UnevenPartition {
        /// Axis name ("height" or "width")
        axis: &'static str,
        /// Padded size along the axis
        size: usize,
        /// Requested block size along the axis
        block: usize,
    },

    /// Image has no pixels
    #[error("empty image: {height}x{width}")]
    EmptyImage {
        /// Image height
        height: usize,
        /// Image width
        width: usize,
    },

    /// Array reshape failed
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type for equalization operations
pub type ClaheResult<T> = Result<T, ClaheError>;
