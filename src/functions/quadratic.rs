//! Diagonal quadratic functions.

use crate::function::Function;
use crate::math;

/// `f(x) = ½·xᵀAx` with diagonal positive `A`, convex, minimum at the
/// origin.
#[derive(Debug, Clone)]
pub struct Quadratic {
    weights: Vec<f64>,
}

impl Quadratic {
    /// Create a quadratic with the given diagonal.
    pub fn new(weights: Vec<f64>) -> Quadratic {
        assert!(!weights.is_empty());
        Quadratic { weights }
    }

    /// A badly conditioned instance with diagonal `1, 10, 100, …`.
    pub fn ellipse(dims: usize) -> Quadratic {
        Quadratic::new((0..dims).map(|i| 10f64.powi(i as i32)).collect())
    }
}

impl Function for Quadratic {
    fn name(&self) -> String {
        format!("quadratic[{}D]", self.weights.len())
    }

    fn size(&self) -> usize {
        self.weights.len()
    }

    fn is_convex(&self) -> bool {
        true
    }

    fn is_valid(&self, x: &[f64]) -> bool {
        math::norm_inf(x) <= 5.12
    }

    fn eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
        if let Some(gx) = gx {
            for (gi, (ai, xi)) in gx.iter_mut().zip(self.weights.iter().zip(x.iter())) {
                *gi = ai * xi;
            }
        }
        0.5 * x
            .iter()
            .zip(self.weights.iter())
            .map(|(xi, ai)| ai * xi * xi)
            .sum::<f64>()
    }
}
