//! Limited-memory BFGS with line search, see "Numerical optimization",
//! Nocedal & Wright, 2nd edition, p.178.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::lsearch::{LineSearch, LsInitializer, LsStrategy};
use crate::math;
use crate::solver::{BatchParams, BatchSolver, Logger, SolverState};
use crate::solvers::batch_loop;
use crate::tuner::Tuner;

/// L-BFGS: the two-loop recursion approximates `H·g` from a bounded
/// history of `(s, y)` pairs without forming the inverse Hessian.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Lbfgs {
    /// Armijo parameter.
    pub c1: f64,
    /// Curvature parameter.
    pub c2: f64,
    /// Step-length initialization.
    pub init: LsInitializer,
    /// Line-search strategy.
    pub strat: LsStrategy,
    /// Number of `(s, y)` pairs kept.
    pub history: usize,
}

impl Default for Lbfgs {
    fn default() -> Lbfgs {
        Lbfgs {
            c1: 1e-4,
            c2: 0.9,
            init: LsInitializer::Quadratic,
            strat: LsStrategy::Interpolation,
            history: 20,
        }
    }
}

impl BatchSolver for Lbfgs {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_base10("c1", -5.0, -1.0);
        tuner.add_finite("c2", vec![0.5, 0.9, 0.99]);
        tuner.add_finite("history", vec![5.0, 10.0, 20.0, 50.0]);
        tuner
    }

    fn minimize(
        &self,
        params: &BatchParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut lsearch = LineSearch::new(self.init, self.strat, self.c1, self.c2);
        let history = self.history.max(1);

        let mut ss: VecDeque<Vec<f64>> = VecDeque::with_capacity(history);
        let mut ys: VecDeque<Vec<f64>> = VecDeque::with_capacity(history);
        let mut alphas: Vec<f64> = Vec::with_capacity(history);

        batch_loop(
            params,
            function,
            x0,
            &mut lsearch,
            logger,
            move |pstate: &SolverState, state: &mut SolverState, i| {
                if i > 0 {
                    let s: Vec<f64> =
                        state.x.iter().zip(pstate.x.iter()).map(|(c, p)| c - p).collect();
                    let y: Vec<f64> =
                        state.g.iter().zip(pstate.g.iter()).map(|(c, p)| c - p).collect();
                    // skip the update when the curvature condition fails
                    if math::dot(&s, &y) > 0.0 {
                        ss.push_back(s);
                        ys.push_back(y);
                        if ss.len() > history {
                            ss.pop_front();
                            ys.pop_front();
                        }
                    }
                }

                // two-loop recursion for r ≈ H·g
                let hsize = ss.len();
                let mut q = state.g.clone();

                alphas.clear();
                for j in 0..hsize {
                    let s = &ss[hsize - 1 - j];
                    let y = &ys[hsize - 1 - j];
                    let alpha = math::dot(s, &q) / math::dot(s, y);
                    math::axpy(-alpha, y, &mut q);
                    alphas.push(alpha);
                }

                let mut r = q;
                if hsize > 0 {
                    let s = &ss[hsize - 1];
                    let y = &ys[hsize - 1];
                    math::scal(math::dot(s, y) / math::dot(y, y), &mut r);
                }

                for j in 0..hsize {
                    let s = &ss[j];
                    let y = &ys[j];
                    let alpha = alphas[hsize - 1 - j];
                    let beta = math::dot(y, &r) / math::dot(s, y);
                    math::axpy(alpha - beta, s, &mut r);
                }

                for (di, ri) in state.d.iter_mut().zip(r.iter()) {
                    *di = -ri;
                }
            },
        )
    }
}
