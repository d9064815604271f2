//! Stochastic gradient with a learning rate steered towards a target
//! per-epoch value-decrease ratio.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::math;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::steepest;
use crate::solvers::stoch::{stoch_loop, StochUpdate};
use crate::tuner::Tuner;

/// SG with a self-adjusting learning rate: after each snapshot the rate is
/// scaled to push the observed relative decrease towards `ratio0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochAdaRatio {
    /// Initial learning rate.
    pub alpha0: f64,
    /// Target relative decrease per epoch.
    pub ratio0: f64,
    /// Exponent of the rate adjustment.
    pub poly: f64,
}

impl Default for StochAdaRatio {
    fn default() -> StochAdaRatio {
        StochAdaRatio {
            alpha0: 1e-2,
            ratio0: 0.05,
            poly: 2.0,
        }
    }
}

struct AdaRatioUpdate {
    alpha: f64,
    ratio0: f64,
    poly: f64,
}

impl StochUpdate for AdaRatioUpdate {
    fn start(&mut self, _function: &mut dyn Function, _cstate: &SolverState) {}

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        _k: usize,
    ) {
        steepest(cstate);
        function.stoch_next();
        cstate.stoch_update(function, self.alpha);
    }

    fn snapshot(
        &mut self,
        function: &mut dyn Function,
        cstate: &SolverState,
        sstate: &mut SolverState,
    ) {
        let prevf = sstate.f;
        sstate.update_at(function, &cstate.x);
        let nextf = sstate.f;

        // steer the rate towards the target decrease ratio
        let min_ratio = 0.5 * self.ratio0;
        let max_ratio = 2.0 * self.ratio0;
        let ratio = ((prevf - nextf) / (math::epsilon0() + prevf.abs()))
            .clamp(min_ratio, max_ratio);

        self.alpha *= (1.0 + self.ratio0 - ratio).powf(self.poly);
    }
}

impl StochSolver for StochAdaRatio {
    fn from_json(&mut self, json: &str) -> Result<()> {
        *self = serde_json::from_str(json)?;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_finite("alpha0", vec![1e-3, 1e-2, 1e-1, 1.0]);
        tuner.add_finite("ratio0", vec![0.01, 0.02, 0.05, 0.1]);
        tuner.add_finite("poly", vec![1.0, 2.0, 3.0]);
        tuner
    }

    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut update = AdaRatioUpdate {
            alpha: self.alpha0,
            ratio0: self.ratio0,
            poly: self.poly,
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
