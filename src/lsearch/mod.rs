//! Line-search initialization and termination strategies for the batch
//! solvers.
//!
//! An initializer proposes the first trial step length `t0` at each outer
//! iteration; a strategy advances the state along the current descent
//! direction to a point satisfying its sufficient-decrease / curvature
//! conditions, or fails. On failure the state is restored to the iterate
//! the search started from and the solver decides how to recover.

mod backtrack;
mod cgdescent;
mod init;
mod interpolate;

pub use self::init::LsInit;

use serde::{Deserialize, Serialize};

use crate::function::Function;
use crate::solver::SolverState;

/// Upper bound on probes per search.
const MAX_PROBES: usize = 100;

/// Largest step length a strategy will probe.
const STEP_MAX: f64 = 1e+6;

/// Heuristic used to propose the initial step length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LsInitializer {
    /// Always start from 1.
    Unit,
    /// Rescale the previous step by the ratio of directional derivatives.
    Linear,
    /// Minimiser of a one-dimensional quadratic interpolant.
    Quadratic,
    /// The CG-DESCENT heuristic of Hager & Zhang.
    CgDescent,
}

/// Condition family a search terminates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LsStrategy {
    /// Backtrack until the Armijo condition holds.
    Backtrack,
    /// Backtrack until Armijo and the Wolfe curvature condition hold.
    Wolfe,
    /// Backtrack until Armijo and the strong Wolfe condition hold.
    StrongWolfe,
    /// Cubic interpolation with bracketing, after Nocedal & Wright.
    Interpolation,
    /// The CG-DESCENT search of Hager & Zhang.
    CgDescent,
}

/// One probed point of the scalar function `φ(t) = f(x0 + t·d)`.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Step length.
    pub t: f64,
    /// `φ(t)`.
    pub f: f64,
    /// `φ′(t) = g(x0 + t·d) · d`.
    pub dg: f64,
}

impl Step {
    /// The point a search starts from (`t = 0`).
    pub fn start(state: &SolverState) -> Step {
        Step {
            t: 0.0,
            f: state.f,
            dg: state.dg(),
        }
    }

    /// The probe currently held by `state`.
    pub fn at(state: &SolverState) -> Step {
        Step {
            t: state.t,
            f: state.f,
            dg: state.dg(),
        }
    }

    /// Minimiser of the quadratic through `(a.t, a.f, a.dg)` and
    /// `(b.t, b.f)`, or `None` when the interpolant is not strictly convex.
    pub fn quadratic(a: &Step, b: &Step) -> Option<f64> {
        let h = b.t - a.t;
        let curvature = 2.0 * (b.f - a.f - a.dg * h) / (h * h);
        if !curvature.is_finite() || curvature <= 0.0 {
            return None;
        }
        Some(a.t - a.dg / curvature)
    }

    /// Minimiser of the cubic through both endpoints (values and slopes),
    /// after Nocedal & Wright, or `None` when it is not defined.
    pub fn cubic(a: &Step, b: &Step) -> Option<f64> {
        let d1 = a.dg + b.dg - 3.0 * (a.f - b.f) / (a.t - b.t);
        let square = d1 * d1 - a.dg * b.dg;
        if square < 0.0 {
            return None;
        }
        let d2 = (b.t - a.t).signum() * square.sqrt();
        let t = b.t - (b.t - a.t) * (b.dg + d2 - d1) / (b.dg - a.dg + 2.0 * d2);
        if t.is_finite() {
            Some(t)
        } else {
            None
        }
    }

    /// Secant step through both slopes.
    pub fn secant(a: &Step, b: &Step) -> f64 {
        (a.t * b.dg - b.t * a.dg) / (b.dg - a.dg)
    }
}

/// Line search: an initializer with per-iteration memory plus a strategy.
#[derive(Debug)]
pub struct LineSearch {
    init: LsInit,
    strategy: LsStrategy,
    c1: f64,
    c2: f64,
}

impl LineSearch {
    /// Create a search with the Armijo parameter `c1` and curvature
    /// parameter `c2`.
    pub fn new(init: LsInitializer, strategy: LsStrategy, c1: f64, c2: f64) -> LineSearch {
        LineSearch {
            init: LsInit::new(init),
            strategy,
            c1,
            c2,
        }
    }

    /// Advance `state` along its descent direction to an accepted step.
    ///
    /// Returns `false` when no acceptable step was found; in that case the
    /// state is back at the iterate the search started from (with the
    /// evaluation counters reflecting the probes spent).
    pub fn step(&mut self, function: &mut dyn Function, state: &mut SolverState) -> bool {
        let t0 = self.init.get(function, state);
        let state0 = state.clone();

        let ok = match self.strategy {
            LsStrategy::Backtrack => backtrack::search(
                function,
                &state0,
                t0,
                state,
                self.c1,
                self.c2,
                backtrack::Condition::Armijo,
            ),
            LsStrategy::Wolfe => backtrack::search(
                function,
                &state0,
                t0,
                state,
                self.c1,
                self.c2,
                backtrack::Condition::Wolfe,
            ),
            LsStrategy::StrongWolfe => backtrack::search(
                function,
                &state0,
                t0,
                state,
                self.c1,
                self.c2,
                backtrack::Condition::StrongWolfe,
            ),
            LsStrategy::Interpolation => {
                interpolate::search(function, &state0, t0, state, self.c1, self.c2)
            }
            LsStrategy::CgDescent => {
                cgdescent::search(function, &state0, t0, state, self.c1, self.c2)
            }
        };

        if !ok || !state.is_finite() {
            restore(state, &state0);
            return false;
        }
        ok
    }
}

/// Put `state` back at `state0`, keeping the evaluation counters.
fn restore(state: &mut SolverState, state0: &SolverState) {
    state.x.copy_from_slice(&state0.x);
    state.g.copy_from_slice(&state0.g);
    state.d.copy_from_slice(&state0.d);
    state.f = state0.f;
    state.t = state0.t;
    state.status = state0.status;
}
