//! Nesterov's accelerated gradient (descent) with optional adaptive
//! restarts.
//!
//! See Yu. Nesterov, "Introductory Lectures on Convex Optimization", and
//! "Adaptive restart for accelerated gradient schemes" by B. O'Donoghue
//! and E. Candès for the restart heuristics.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::math;
use crate::solver::{Logger, SolverState, StochParams, StochSolver};
use crate::solvers::stoch::{stoch_loop, Lrate, StochUpdate};
use crate::tuner::Tuner;

/// When the momentum sequence of the accelerated method restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NesterovRestart {
    /// No restarts.
    #[default]
    None,
    /// Restart when the objective increases between iterations.
    Function,
    /// Restart when the update points against the gradient.
    Gradient,
}

/// Nesterov's accelerated gradient with an auxiliary extrapolated iterate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochAg {
    #[serde(skip)]
    restart: NesterovRestart,
    /// Base learning rate.
    pub alpha0: f64,
    /// Learning-rate decay.
    pub decay: f64,
}

impl Default for StochAg {
    fn default() -> StochAg {
        StochAg {
            restart: NesterovRestart::default(),
            alpha0: 1e-2,
            decay: 0.5,
        }
    }
}

impl StochAg {
    /// Create an accelerated-gradient solver with the given restart rule.
    pub fn new(restart: NesterovRestart) -> StochAg {
        StochAg {
            restart,
            ..StochAg::default()
        }
    }

    /// The restart rule this solver was constructed with.
    pub fn restart(&self) -> NesterovRestart {
        self.restart
    }
}

struct AgUpdate {
    lrate: Lrate,
    restart: NesterovRestart,
    /// Extrapolated iterate the gradient is taken at.
    y: Vec<f64>,
    /// Gradient scratch at `y`.
    gy: Vec<f64>,
    /// Iterations since the last restart.
    sequence: usize,
    /// Minibatch value at the previous iterate.
    prevf: f64,
}

impl StochUpdate for AgUpdate {
    fn start(&mut self, _function: &mut dyn Function, cstate: &SolverState) {
        self.y = cstate.x.clone();
        self.gy = vec![0.0; cstate.x.len()];
        self.sequence = 0;
        self.prevf = cstate.f;
    }

    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        _sstate: &SolverState,
        k: usize,
    ) {
        let alpha = self.lrate.get(k);

        // gradient at the extrapolated iterate
        function.stoch_eval(&self.y, Some(&mut self.gy));
        cstate.fcalls += 1;
        cstate.gcalls += 1;

        // x_new = y − α·g(y), then extrapolate y_new past x_new
        let m = self.sequence as f64 / (self.sequence as f64 + 3.0);
        for (di, (yi, (xi, gi))) in cstate
            .d
            .iter_mut()
            .zip(self.y.iter().zip(cstate.x.iter().zip(self.gy.iter())))
        {
            *di = yi - alpha * gi - xi;
        }

        let restart = match self.restart {
            NesterovRestart::None => false,
            NesterovRestart::Function => cstate.f > self.prevf,
            NesterovRestart::Gradient => math::dot(&self.gy, &cstate.d) > 0.0,
        };
        self.prevf = cstate.f;

        function.stoch_next();
        cstate.stoch_update(function, 1.0);

        if restart {
            self.sequence = 0;
            self.y.copy_from_slice(&cstate.x);
        } else {
            self.sequence += 1;
            // y_new = x_new + m·(x_new − x_prev) = x_new + m·d
            self.y.copy_from_slice(&cstate.x);
            math::axpy(m, &cstate.d, &mut self.y);
        }
    }
}

impl StochSolver for StochAg {
    fn from_json(&mut self, json: &str) -> Result<()> {
        let restart = self.restart;
        *self = serde_json::from_str(json)?;
        self.restart = restart;
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
        let mut update = AgUpdate {
            lrate: Lrate::new(self.alpha0, self.decay, params.epoch_size),
            restart: self.restart,
            y: Vec::new(),
            gy: Vec::new(),
            sequence: 0,
            prevf: 0.0,
        };
        stoch_loop(params, function, x0, &mut update, logger)
    }
}
