//! Averaged stochastic gradient methods, see "Minimizing Finite Sums with
//! the Stochastic Average Gradient", by M. Schmidt, N. Le Roux, F. Bach.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::momentum::AverageVector;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::steepest;
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// Stochastic iterative average: plain SG steps, snapshots taken at the
/// running average of the iterates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochSia {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
}

impl Default for StochSia {
    fn default() -> StochSia {
        StochSia {
            alpha0: 1e-2,
            decay: 0.5,
        }
    }
}

struct SiaUpdate {
    lrate: Lrate,
    xavg: AverageVector,
}

impl StochUpdate for SiaUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.xavg = AverageVector::new(cstate.x.len());
    }

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
        self.xavg.update(&cstate.x);
    }

    fn snapshot(
        &mut self,
        function: &mut dyn Function,
        _cstate: &SolverState,
        sstate: &mut SolverState,
    ) {
        let xavg = self.xavg.value().to_vec();
        sstate.update_at(function, &xavg);
    }
}

impl StochSolver for StochSia {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![1e-4, 1e-3, 1e-2, 1e-1, 1.0]);
        tuner.add_finite("decay", vec![0.5, 0.75, 1.0]);
        tuner
    }

    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut update = SiaUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            xavg: AverageVector::new(0),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}

/// Stochastic gradient averaging: steps along the running average of the
/// minibatch gradients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochSga {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
}

impl Default for StochSga {
    fn default() -> StochSga {
        StochSga {
            alpha0: 1e-2,
            decay: 0.5,
        }
    }
}

struct SgaUpdate {
    lrate: Lrate,
    gavg: AverageVector,
}

impl StochUpdate for SgaUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.gavg = AverageVector::new(cstate.x.len());
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        let alpha = self.lrate.get(k);

        self.gavg.update(&cstate.g);
        let gavg = self.gavg.value();
        for i in 0..cstate.d.len() {
            cstate.d[i] = -gavg[i];
        }

        function.stoch_next();
        cstate.stoch_update(function, alpha);
    }
}

impl StochSolver for StochSga {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![1e-4, 1e-3, 1e-2, 1e-1, 1.0]);
        tuner.add_finite("decay", vec![0.5, 0.75, 1.0]);
        tuner
    }

    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut update = SgaUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            gavg: AverageVector::new(0),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
