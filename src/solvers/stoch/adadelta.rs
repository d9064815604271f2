//! AdaDelta, see "ADADELTA: an adaptive learning rate method",
//! by M. D. Zeiler.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::momentum::MomentumVector;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, StochUpdate};
use crate::tuner::Tuner;

/// AdaDelta: steps scaled by the ratio of running step and gradient
/// magnitudes; no explicit learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochAdaDelta {
    /// Retention coefficient of both running averages.
    pub momentum: f64,
    /// Division guard.
    pub epsilon: f64,
}

impl Default for StochAdaDelta {
    fn default() -> StochAdaDelta {
        StochAdaDelta {
            momentum: 0.9,
            epsilon: 1e-6,
        }
    }
}

struct AdaDeltaUpdate {
    epsilon: f64,
    momentum: f64,
    gavg2: MomentumVector,
    davg2: MomentumVector,
}

impl StochUpdate for AdaDeltaUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.gavg2 = MomentumVector::new(self.momentum, cstate.x.len());
        self.davg2 = MomentumVector::new(self.momentum, cstate.x.len());
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        _k: usize,
    ) {
        self.gavg2.update_squared(&cstate.g);

        let gavg2 = self.gavg2.value();
        let davg2 = self.davg2.value();
        for i in 0..cstate.d.len() {
            cstate.d[i] = -cstate.g[i] * (self.epsilon + davg2[i].sqrt())
                / (self.epsilon + gavg2[i].sqrt());
        }

        self.davg2.update_squared(&cstate.d);

        function.stoch_next();
        cstate.stoch_update(function, 1.0);
    }
}

impl StochSolver for StochAdaDelta {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_finite("momentum", vec![0.1, 0.5, 0.9]);
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
        let mut update = AdaDeltaUpdate {
            epsilon: self.epsilon,
            momentum: self.momentum,
            gavg2: MomentumVector::new(self.momentum, 0),
            davg2: MomentumVector::new(self.momentum, 0),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
