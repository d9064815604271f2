//! Adam, see "Adam: A method for stochastic optimization",
//! by D. P. Kingma and J. Lei Ba.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::momentum::MomentumVector;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// Adam: bias-corrected first and second gradient moments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochAdam {
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
    /// Retention coefficient of the first moment.
    pub beta1: f64,
    /// Retention coefficient of the second moment.
    pub beta2: f64,
    /// Division guard.
    pub epsilon: f64,
}

impl Default for StochAdam {
    fn default() -> StochAdam {
        StochAdam {
            alpha0: 1e-2,
            decay: 0.5,
            beta1: 0.900,
            beta2: 0.999,
            epsilon: 1e-6,
        }
    }
}

struct AdamUpdate {
    lrate: Lrate,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: MomentumVector,
    v: MomentumVector,
}

impl StochUpdate for AdamUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.m = MomentumVector::new(self.beta1, cstate.x.len());
        self.v = MomentumVector::new(self.beta2, cstate.x.len());
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        let alpha = self.lrate.get(k);

        self.m.update(&cstate.g);
        self.v.update_squared(&cstate.g);

        // zero-bias correction of both moments
        let c1 = 1.0 - self.beta1.powi(k as i32);
        let c2 = 1.0 - self.beta2.powi(k as i32);

        let m = self.m.value();
        let v = self.v.value();
        for i in 0..cstate.d.len() {
            cstate.d[i] = -(m[i] / c1) / (self.epsilon + (v[i] / c2).sqrt());
        }

        function.stoch_next();
        cstate.stoch_update(function, alpha);
    }
}

impl StochSolver for StochAdam {
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
        tuner.add_finite("beta1", vec![0.5, 0.9, 0.95]);
        tuner.add_finite("beta2", vec![0.99, 0.999, 0.9999]);
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
        let mut update = AdamUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
            m: MomentumVector::new(self.beta1, 0),
            v: MomentumVector::new(self.beta2, 0),
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
