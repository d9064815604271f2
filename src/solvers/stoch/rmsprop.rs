//! RMSProp (AdaGrad with an exponentially weighted running average of the
//! squared gradients), see Lecture 6.5 - rmsprop, COURSERA: Neural
//! Networks for Machine Learning, by T. Tieleman and G. Hinton (2012).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::momentum::MomentumVector;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// RMSProp: per-coordinate steps scaled by a running squared-gradient
/// average.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochRmsProp {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
    /// Retention coefficient of the squared-gradient average.
    pub momentum: f64,
    /// Division guard.
    pub epsilon: f64,
}

impl Default for StochRmsProp {
    fn default() -> StochRmsProp {
        StochRmsProp {
            alpha0: 1e-2,
            decay: 0.5,
            momentum: 0.9,
            epsilon: 1e-6,
        }
    }
}

struct RmsPropUpdate {
    lrate: Lrate,
    epsilon: f64,
    momentum: f64,
    gavg2: MomentumVector,
}

impl StochUpdate for RmsPropUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.gavg2 = MomentumVector::new(self.momentum, cstate.x.len());
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        let alpha = self.lrate.get(k);

        self.gavg2.update_squared(&cstate.g);
        let gavg2 = self.gavg2.value();
        for i in 0..cstate.d.len() {
            cstate.d[i] = -cstate.g[i] / (self.epsilon + gavg2[i].sqrt());
        }

        function.stoch_next();
        cstate.stoch_update(function, alpha);
    }
}

impl StochSolver for StochRmsProp {
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
        let mut update = RmsPropUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            epsilon: self.epsilon,
            momentum: self.momentum,
            gavg2: MomentumVector::new(self.momentum, 0),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
