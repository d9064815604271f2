//! Stochastic gradient descent with classical momentum.
//!
//! The velocity accumulates raw gradients (`m ← β·m + g`) so that steps in
//! a persistent direction build up speed; see "On the importance of
//! initialization and momentum in deep learning", Sutskever et al.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::math;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// Stochastic gradient descent with an accumulated velocity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochSgm {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
    /// Velocity retention coefficient.
    pub momentum: f64,
}

impl Default for StochSgm {
    fn default() -> StochSgm {
        StochSgm {
            alpha0: 1e-2,
            decay: 0.5,
            momentum: 0.9,
        }
    }
}

struct SgmUpdate {
    lrate: Lrate,
    momentum: f64,
    velocity: Vec<f64>,
}

impl StochUpdate for SgmUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.velocity = vec![0.0; cstate.x.len()];
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        let alpha = self.lrate.get(k);

        math::axpby(1.0, &cstate.g, self.momentum, &mut self.velocity);
        for (di, mi) in cstate.d.iter_mut().zip(self.velocity.iter()) {
            *di = -mi;
        }

        function.stoch_next();
        cstate.stoch_update(function, alpha);
    }
}

impl StochSolver for StochSgm {
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
        tuner.add_finite("momentum", vec![0.5, 0.9, 0.95]);
        tuner
    }

    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut update = SgmUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            momentum: self.momentum,
            velocity: Vec::new(),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
