//! The sphere function.

use crate::function::Function;
use crate::math;

/// `f(x) = ‖x‖²`, convex, minimum at the origin.
#[derive(Debug, Clone)]
pub struct Sphere {
    dims: usize,
}

impl Sphere {
    /// Create a sphere function of the given dimension.
    pub fn new(dims: usize) -> Sphere {
        Sphere { dims }
    }
}

impl Function for Sphere {
    fn name(&self) -> String {
        format!("sphere[{}D]", self.dims)
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
            for (gi, xi) in gx.iter_mut().zip(x.iter()) {
                *gi = 2.0 * xi;
            }
        }
        math::squared_norm(x)
    }
}
