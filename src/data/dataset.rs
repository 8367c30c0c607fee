use ndarray::ArrayView2;

use crate::{MlErr, Result};

/// An in-memory supervised dataset stored as two flat row-major buffers.
///
/// Every sample is a feature row of `x_size` values paired with a target
/// row of `y_size` values (one-hot encoded for classification).
#[derive(Debug, Clone)]
pub struct Dataset {
    xs: Vec<f32>,
    ys: Vec<f32>,
    x_size: usize,
    y_size: usize,
    len: usize,
}

impl Dataset {
    /// Creates a new `Dataset` from owned buffers.
    ///
    /// # Arguments
    /// * `xs` - Feature buffer of `len * x_size` values.
    /// * `ys` - Target buffer of `len * y_size` values.
    /// * `x_size` - Number of features per sample.
    /// * `y_size` - Number of targets per sample.
    ///
    /// # Errors
    /// Returns `MlErr::SizeMismatch` if either buffer is not a whole
    /// number of rows or the two buffers disagree on the row count.
    pub fn new(xs: Vec<f32>, ys: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self> {
        if x_size == 0 || y_size == 0 {
            return Err(MlErr::InvalidConfig("sample widths must be non-zero"));
        }

        if xs.len() % x_size != 0 {
            return Err(MlErr::SizeMismatch {
                what: "feature buffer",
                got: xs.len(),
                expected: (xs.len() / x_size) * x_size,
            });
        }

        let len = xs.len() / x_size;
        if ys.len() != len * y_size {
            return Err(MlErr::SizeMismatch {
                what: "target buffer",
                got: ys.len(),
                expected: len * y_size,
            });
        }

        Ok(Self {
            xs,
            ys,
            x_size,
            y_size,
            len,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    #[inline]
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Returns the whole feature buffer as a `(len, x_size)` view.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        ArrayView2::from_shape((self.len, self.x_size), &self.xs)
            .expect("buffer length is validated on construction")
    }

    /// Returns the whole target buffer as a `(len, y_size)` view.
    pub fn targets(&self) -> ArrayView2<'_, f32> {
        ArrayView2::from_shape((self.len, self.y_size), &self.ys)
            .expect("buffer length is validated on construction")
    }

    /// Returns the feature row of sample `idx` (panics if out of bounds).
    #[inline]
    pub fn x_row(&self, idx: usize) -> &[f32] {
        &self.xs[idx * self.x_size..(idx + 1) * self.x_size]
    }

    /// Returns the target row of sample `idx` (panics if out of bounds).
    #[inline]
    pub fn y_row(&self, idx: usize) -> &[f32] {
        &self.ys[idx * self.y_size..(idx + 1) * self.y_size]
    }
}
