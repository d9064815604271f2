//! The differentiable objective abstraction consumed by every solver.

use crate::math;

/// A differentiable, possibly stochastic objective.
///
/// `eval` must return a finite value for any in-domain `x`; returning
/// infinity or NaN outside the domain is allowed and is treated as
/// divergence by the solvers. When a gradient slice is supplied it has the
/// same length as `x` and receives `∇f(x)`.
///
/// The stochastic operations default to the deterministic ones so that any
/// objective can be handed to a stochastic solver; finite-sum objectives
/// override them to evaluate the current minibatch and advance it.
pub trait Function {
    /// Human-readable name for reporting.
    fn name(&self) -> String {
        "function".to_owned()
    }

    /// Parameter dimension.
    fn size(&self) -> usize;

    /// Whether the objective is convex.
    fn is_convex(&self) -> bool {
        false
    }

    /// Smallest supported dimension.
    fn min_size(&self) -> usize {
        1
    }

    /// Largest supported dimension.
    fn max_size(&self) -> usize {
        usize::MAX
    }

    /// Whether `x` lies inside the domain of interest.
    fn is_valid(&self, x: &[f64]) -> bool {
        let _ = x;
        true
    }

    /// Evaluate the objective at `x`, optionally writing the gradient.
    fn eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64;

    /// Evaluate the current minibatch at `x`.
    fn stoch_eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
        self.eval(x, gx)
    }

    /// Advance to the next minibatch.
    fn stoch_next(&mut self) {}

    /// Number of summands (minibatches per epoch-like pass).
    fn summands(&self) -> usize {
        1
    }
}

/// Wraps an objective with numerical verification helpers.
pub struct Problem<'a> {
    function: &'a mut dyn Function,
}

impl<'a> Problem<'a> {
    /// Wrap `function`.
    pub fn new(function: &'a mut dyn Function) -> Problem<'a> {
        Problem { function }
    }

    /// Largest absolute deviation between the analytic gradient and a
    /// central finite difference, over all coordinates.
    ///
    /// A correctly implemented gradient stays below a small multiple of
    /// [`epsilon2`](../math/fn.epsilon2.html) for well-scaled functions.
    pub fn grad_accuracy(&mut self, x: &[f64]) -> f64 {
        let n = x.len();
        let mut gx = vec![0.0; n];
        self.function.eval(x, Some(&mut gx));

        let mut xp = x.to_vec();
        let mut worst = 0.0f64;
        for i in 0..n {
            let dx = math::epsilon2() * (1.0 + x[i].abs());

            xp[i] = x[i] + dx;
            let fp = self.function.eval(&xp, None);
            xp[i] = x[i] - dx;
            let fm = self.function.eval(&xp, None);
            xp[i] = x[i];

            let finite_diff = (fp - fm) / (2.0 * dx);
            worst = worst.max((finite_diff - gx[i]).abs());
        }
        worst
    }
}
