//! AdaGrad, see "Adaptive subgradient methods for online learning and
//! stochastic optimization", by J. Duchi, E. Hazan, Y. Singer.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// AdaGrad: per-coordinate steps scaled by accumulated squared gradients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochAdaGrad {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
    /// Division guard.
    pub epsilon: f64,
}

impl Default for StochAdaGrad {
    fn default() -> StochAdaGrad {
        StochAdaGrad {
            alpha0: 1e-2,
            decay: 0.5,
            epsilon: 1e-6,
        }
    }
}

struct AdaGradUpdate {
    lrate: Lrate,
    epsilon: f64,
    gsum2: Vec<f64>,
}

impl StochUpdate for AdaGradUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.gsum2 = vec![0.0; cstate.x.len()];
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        for (acc, gi) in self.gsum2.iter_mut().zip(cstate.g.iter()) {
            *acc += gi * gi;
        }
        for (di, (gi, acc)) in cstate
            .d
            .iter_mut()
            .zip(cstate.g.iter().zip(self.gsum2.iter()))
        {
            *di = -gi / (self.epsilon + acc.sqrt());
        }

        function.stoch_next();
        cstate.stoch_update(function, self.lrate.get(k));
    }
}

impl StochSolver for StochAdaGrad {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_base10("alpha0", -1.0, 0.0);
        tuner.add_finite("decay", vec![0.0, 0.5, 1.0]);
        tuner.add_base10("epsilon", -7.0, -2.0);
        tuner
    }

    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut update = AdaGradUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            epsilon: self.epsilon,
            gsum2: Vec::new(),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
