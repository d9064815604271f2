//! Gradient descent with line search.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::lsearch::{LineSearch, LsInitializer, LsStrategy};
use crate::solver::{BatchParams, BatchSolver, Logger, SolverState};
use crate::solvers::{batch_loop, steepest};
use crate::tuner::Tuner;

/// Steepest descent: `d = −g`, step length from the line search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Gd {
    /// Armijo parameter.
    pub c1: f64,
    /// Curvature parameter.
    pub c2: f64,
    /// Step-length initialization.
    pub init: LsInitializer,
    /// Line-search strategy.
    pub strat: LsStrategy,
}

impl Default for Gd {
    fn default() -> Gd {
        Gd {
            c1: 1e-4,
            c2: 0.9,
            init: LsInitializer::Quadratic,
            strat: LsStrategy::Interpolation,
        }
    }
}

impl BatchSolver for Gd {
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
        tuner.add_finite("c2", vec![0.1, 0.5, 0.9]);
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
        batch_loop(
            params,
            function,
            x0,
            &mut lsearch,
            logger,
            |_pstate, state: &mut SolverState, _i| steepest(state),
        )
    }
}
