//! Stochastic gradient (descent),
//! see "Minimizing Finite Sums with the Stochastic Average Gradient",
//! by M. Schmidt, N. Le Roux, F. Bach.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::steepest;
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// Plain stochastic gradient descent with a decaying learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochSg {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
}

impl Default for StochSg {
    fn default() -> StochSg {
        StochSg {
            alpha0: 1e-2,
            decay: 0.5,
        }
    }
}

struct SgUpdate {
    lrate: Lrate,
}

impl StochUpdate for SgUpdate {
    fn start(&mut self, _function: &mut dyn Function, _cstate: &SolverState) {}

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        let alpha = self.lrate.get(k);
        steepest(cstate);
        function.stoch_next();
        cstate.stoch_update(function, alpha);
    }
}

impl StochSolver for StochSg {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_base10("alpha0", -4.0, 0.0);
        tuner.add_finite("decay", vec![0.1, 0.5, 1.0]);
        tuner
    }

    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut update = SgUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
