//! Contiguous row-major sample buffers moved between tasks, models and
//! losses.
//!
//! A [`Tensor4`](struct.Tensor4.html) stores a batch of samples as
//! `count × maps × rows × cols` scalars; per-sample accessors hand out
//! slices aliasing the parent storage, so minibatch assembly never copies
//! sample data a second time.

use std::fmt;

/// Sample dimensions as `(maps, rows, cols)`.
pub type Dims3 = (usize, usize, usize);

/// Number of scalars in a sample of the given dimensions.
pub fn volume(dims: Dims3) -> usize {
    dims.0 * dims.1 * dims.2
}

/// A batch of samples stored contiguously in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor4 {
    count: usize,
    dims: Dims3,
    data: Vec<f64>,
}

impl Tensor4 {
    /// Allocate a zero-filled batch of `count` samples.
    pub fn new(count: usize, dims: Dims3) -> Tensor4 {
        Tensor4 {
            count,
            dims,
            data: vec![0.0; count * volume(dims)],
        }
    }

    /// Number of samples in the batch.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-sample dimensions.
    pub fn dims(&self) -> Dims3 {
        self.dims
    }

    /// Number of scalars in one sample.
    pub fn sample_size(&self) -> usize {
        volume(self.dims)
    }

    /// Total number of scalars in the batch.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// View of the `index`-th sample, aliasing the batch storage.
    pub fn sample(&self, index: usize) -> &[f64] {
        let size = self.sample_size();
        &self.data[index * size..(index + 1) * size]
    }

    /// Mutable view of the `index`-th sample.
    pub fn sample_mut(&mut self, index: usize) -> &mut [f64] {
        let size = self.sample_size();
        &mut self.data[index * size..(index + 1) * size]
    }

    /// The whole batch as a flat slice.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The whole batch as a flat mutable slice.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl fmt::Display for Tensor4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}x{}",
            self.count, self.dims.0, self.dims.1, self.dims.2
        )
    }
}
