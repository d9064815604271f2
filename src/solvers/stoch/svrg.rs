//! Stochastic variance-reduced gradient, see "Accelerating stochastic
//! gradient descent using predictive variance reduction",
//! by R. Johnson and T. Zhang.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// SVRG: minibatch gradients corrected by a periodically refreshed
/// full-gradient snapshot pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochSvrg {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
    /// Snapshot refresh period in inner iterations; `None` refreshes at
    /// the per-epoch snapshot.
    pub cadence: Option<usize>,
}

impl Default for StochSvrg {
    fn default() -> StochSvrg {
        StochSvrg {
            alpha0: 1e-2,
            decay: 0.5,
            cadence: None,
        }
    }
}

struct SvrgUpdate {
    lrate: Lrate,
    cadence: Option<usize>,
    /// Snapshot iterate x̃.
    xs: Vec<f64>,
    /// Full gradient g̃ at x̃.
    gs: Vec<f64>,
    /// Minibatch gradient scratch at x̃.
    gx: Vec<f64>,
}

impl SvrgUpdate {
    /// Re-anchor the variance-reduction pair at `x` with a full-batch
    /// gradient.
    fn refresh(&mut self, function: &mut dyn Function, x: &[f64], cstate: &mut SolverState) {
        self.xs.clear();
        self.xs.extend_from_slice(x);
        function.eval(&self.xs, Some(&mut self.gs));
        cstate.fcalls += 1;
        cstate.gcalls += 1;
    }
}

impl StochUpdate for SvrgUpdate {
    fn start(&mut self, function: &mut dyn Function, cstate: &SolverState) {
        self.xs = cstate.x.clone();
        self.gs = vec![0.0; cstate.x.len()];
        self.gx = vec![0.0; cstate.x.len()];
        function.eval(&self.xs, Some(&mut self.gs));
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        if let Some(cadence) = self.cadence {
            if k % cadence.max(1) == 0 {
                let x = cstate.x.clone();
                self.refresh(function, &x, cstate);
            }
        }

        let alpha = self.lrate.get(k);

        // gradient estimator g − g̃_batch + g̃ at the current minibatch
        function.stoch_eval(&self.xs, Some(&mut self.gx));
        cstate.fcalls += 1;
        cstate.gcalls += 1;
        for i in 0..cstate.d.len() {
            cstate.d[i] = -(cstate.g[i] - self.gx[i] + self.gs[i]);
        }

        function.stoch_next();
        cstate.stoch_update(function, alpha);
    }

    fn snapshot(
        &mut self,
        function: &mut dyn Function,
        cstate: &SolverState,
        sstate: &mut SolverState,
    ) {
        sstate.update_at(function, &cstate.x);
        if self.cadence.is_none() {
            // the per-epoch snapshot already computed the full gradient
            self.xs.copy_from_slice(&sstate.x);
            self.gs.copy_from_slice(&sstate.g);
        }
    }
}

impl StochSolver for StochSvrg {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![1e-3, 3e-3, 1e-2, 3e-2, 1e-1, 3e-1, 1.0]);
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
        let mut update = SvrgUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            cadence: self.cadence,
            xs: Vec::new(),
            gs: Vec::new(),
            gx: Vec::new(),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
