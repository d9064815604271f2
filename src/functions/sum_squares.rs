//! The axis-weighted sum-of-squares function.

use crate::function::Function;
use crate::math;

/// `f(x) = Σ (i+1)·x_i²`, convex, minimum at the origin.
#[derive(Debug, Clone)]
pub struct SumSquares {
    dims: usize,
}

impl SumSquares {
    /// Create a sum-of-squares function of the given dimension.
    pub fn new(dims: usize) -> SumSquares {
        SumSquares { dims }
    }
}

impl Function for SumSquares {
    fn name(&self) -> String {
        format!("sum-squares[{}D]", self.dims)
    }

    fn size(&self) -> usize {
        self.dims
    }

    fn is_convex(&self) -> bool {
        true
    }

    fn is_valid(&self, x: &[f64]) -> bool {
        math::norm_inf(x) <= 5.12
    }

    fn eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
        if let Some(gx) = gx {
            for (i, (gi, xi)) in gx.iter_mut().zip(x.iter()).enumerate() {
                *gi = 2.0 * (i + 1) as f64 * xi;
            }
        }
        x.iter()
            .enumerate()
            .map(|(i, xi)| (i + 1) as f64 * xi * xi)
            .sum()
    }
}
