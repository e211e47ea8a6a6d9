//! Adaptive Histogram Equalization
//!
//! Tile-based local contrast equalization (CLAHE-style) for batches of
//! intensity images, with Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Image Format
//! Images are 4-D arrays `(batch, channels, height, width)` of `f32`
//! intensities in 0.0-1.0. Channels are equalized independently, so a
//! single lightness channel and raw RGB planes are handled the same way.
//! Output has the same shape with `u8` levels 0-255; use
//! [`clahe::to_unit_range`] to map back to 0.0-1.0.
//!
//! ## Example
//! ```
//! use ndarray::Array4;
//!
//! let image = Array4::from_shape_fn((1, 1, 8, 8), |(_, _, y, x)| (y * 8 + x) as f32 / 63.0);
//! let equalized = adapteq::clahe::equalize(image.view(), 2, 2, true).unwrap();
//! assert_eq!(equalized.dim(), (1, 1, 8, 8));
//! ```

pub mod clahe;
pub mod error;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use clahe::{equalize, equalize_with, plan_grid, ClaheConfig, GridGeometry};
pub use error::{ClaheError, ClaheResult};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray4, PyReadonlyArray4};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::clahe::{self, histogram::ExactHistogram, ClaheConfig, SmoothedHistogram};
    use crate::error::ClaheError;

    impl From<ClaheError> for PyErr {
        fn from(err: ClaheError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    // Negative counts from Python are reported as an invalid (zero) grid
    fn grid_count(n: i64) -> usize {
        usize::try_from(n).unwrap_or(0)
    }

    /// Equalize a float32 (batch, channels, height, width) image.
    ///
    /// # Arguments
    /// * `image` - Intensities 0.0-1.0
    /// * `grid_rows`, `grid_cols` - Number of tiles in each direction
    /// * `even_tile_size` - Round tile sizes up to even numbers
    /// * `bandwidth` - Use a smoothed (kernel density) histogram with this bandwidth
    ///
    /// # Returns
    /// uint8 array of the same shape, levels 0-255
    #[pyfunction]
    #[pyo3(signature = (image, grid_rows=8, grid_cols=8, even_tile_size=true, bandwidth=None))]
    pub fn equalize_clahe<'py>(
        py: Python<'py>,
        image: PyReadonlyArray4<'py, f32>,
        grid_rows: i64,
        grid_cols: i64,
        even_tile_size: bool,
        bandwidth: Option<f32>,
    ) -> PyResult<Bound<'py, PyArray4<u8>>> {
        let config = ClaheConfig::grid(grid_count(grid_rows), grid_count(grid_cols))
            .with_even_tile_size(even_tile_size);
        let input = image.as_array();
        let result = match bandwidth {
            Some(bw) => clahe::equalize_with(input, &config, &SmoothedHistogram::new(bw))?,
            None => clahe::equalize_with(input, &config, &ExactHistogram)?,
        };
        Ok(result.into_pyarray(py))
    }

    /// Tile layout for an image size as a dict.
    #[pyfunction]
    #[pyo3(signature = (height, width, grid_rows, grid_cols, even_tile_size=true))]
    pub fn plan_grid<'py>(
        py: Python<'py>,
        height: usize,
        width: usize,
        grid_rows: i64,
        grid_cols: i64,
        even_tile_size: bool,
    ) -> PyResult<Bound<'py, PyDict>> {
        let geometry = clahe::plan_grid(
            height,
            width,
            grid_count(grid_rows),
            grid_count(grid_cols),
            even_tile_size,
        )?;
        let dict = PyDict::new(py);
        dict.set_item("rows", geometry.rows)?;
        dict.set_item("cols", geometry.cols)?;
        dict.set_item("tile_height", geometry.tile_height)?;
        dict.set_item("tile_width", geometry.tile_width)?;
        dict.set_item("pad_bottom", geometry.pad_bottom)?;
        dict.set_item("pad_right", geometry.pad_right)?;
        Ok(dict)
    }

    /// Adaptive histogram equalization extension module
    #[pymodule]
    pub fn adapteq(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(equalize_clahe, m)?)?;
        m.add_function(wrap_pyfunction!(plan_grid, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::adapteq;
