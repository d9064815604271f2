//! Provides the specific solvers minimizing a
//! [Function](../function/trait.Function.html).
//!
//! The batch family (gradient descent, nonlinear conjugate gradient,
//! L-BFGS) evaluates the full objective and advances through a line
//! search; the [stochastic family](stoch/index.html) works on minibatches
//! with per-iteration learning rates and a deterministic snapshot at the
//! end of each epoch.
//!
//! Solvers are addressed by string ids so that trainers and benchmarks can
//! pick them from configuration:
//!
//! - batch: `gd`, `cgd`, `cgd-hs`, `cgd-fr`, `cgd-prp`, `cgd-cd`,
//!   `cgd-ls`, `cgd-dy`, `cgd-dyhs`, `cgd-dycd`, `cgd-n`, `lbfgs`
//! - stochastic: `sg`, `sgm`, `ag`, `agfr`, `aggr`, `adagrad`, `adadelta`,
//!   `rmsprop`, `adam`, `svrg`, `sia`, `sga`, `adaratio`

pub mod cgd;
pub mod gd;
pub mod lbfgs;
pub mod stoch;

pub use self::cgd::{Cgd, CgdVariant};
pub use self::gd::Gd;
pub use self::lbfgs::Lbfgs;

use crate::function::Function;
use crate::lsearch::LineSearch;
use crate::solver::{BatchParams, BatchSolver, Logger, SolverState, SolverStatus, StochSolver};

/// Ids of all registered batch solvers.
pub fn batch_solver_ids() -> &'static [&'static str] {
    &[
        "gd", "cgd", "cgd-hs", "cgd-fr", "cgd-prp", "cgd-cd", "cgd-ls", "cgd-dy", "cgd-dyhs",
        "cgd-dycd", "cgd-n", "lbfgs",
    ]
}

/// Create a batch solver with default configuration from its id.
pub fn make_batch_solver(id: &str) -> Option<Box<dyn BatchSolver>> {
    match id {
        "gd" => Some(Box::new(Gd::default())),
        "cgd" | "cgd-prp" => Some(Box::new(Cgd::new(CgdVariant::Prp))),
        "cgd-hs" => Some(Box::new(Cgd::new(CgdVariant::Hs))),
        "cgd-fr" => Some(Box::new(Cgd::new(CgdVariant::Fr))),
        "cgd-cd" => Some(Box::new(Cgd::new(CgdVariant::Cd))),
        "cgd-ls" => Some(Box::new(Cgd::new(CgdVariant::Ls))),
        "cgd-dy" => Some(Box::new(Cgd::new(CgdVariant::Dy))),
        "cgd-dyhs" => Some(Box::new(Cgd::new(CgdVariant::Dyhs))),
        "cgd-dycd" => Some(Box::new(Cgd::new(CgdVariant::Dycd))),
        "cgd-n" => Some(Box::new(Cgd::new(CgdVariant::N))),
        "lbfgs" => Some(Box::new(Lbfgs::default())),
        _ => None,
    }
}

/// Ids of all registered stochastic solvers.
pub fn stoch_solver_ids() -> &'static [&'static str] {
    &[
        "sg", "sgm", "ag", "agfr", "aggr", "adagrad", "adadelta", "rmsprop", "adam", "svrg",
        "sia", "sga", "adaratio",
    ]
}

/// Create a stochastic solver with default configuration from its id.
pub fn make_stoch_solver(id: &str) -> Option<Box<dyn StochSolver>> {
    use self::stoch::*;
    match id {
        "sg" => Some(Box::new(StochSg::default())),
        "sgm" => Some(Box::new(StochSgm::default())),
        "ag" => Some(Box::new(StochAg::new(NesterovRestart::None))),
        "agfr" => Some(Box::new(StochAg::new(NesterovRestart::Function))),
        "aggr" => Some(Box::new(StochAg::new(NesterovRestart::Gradient))),
        "adagrad" => Some(Box::new(StochAdaGrad::default())),
        "adadelta" => Some(Box::new(StochAdaDelta::default())),
        "rmsprop" => Some(Box::new(StochRmsProp::default())),
        "adam" => Some(Box::new(StochAdam::default())),
        "svrg" => Some(Box::new(StochSvrg::default())),
        "sia" => Some(Box::new(StochSia::default())),
        "sga" => Some(Box::new(StochSga::default())),
        "adaratio" => Some(Box::new(StochAdaRatio::default())),
        _ => None,
    }
}

/// Point the descent direction along the negative gradient.
pub(crate) fn steepest(state: &mut SolverState) {
    for (di, gi) in state.d.iter_mut().zip(state.g.iter()) {
        *di = -gi;
    }
}

/// The outer loop shared by the batch solvers.
///
/// `direction` receives the state accepted at the previous iteration and
/// the current state (gradient already refreshed) and must fill in the
/// descent direction. Line-search failures are recovered once by retrying
/// with steepest descent at the same iterate; a second failure surfaces as
/// [`Failed`](../solver/enum.SolverStatus.html).
pub(crate) fn batch_loop<D>(
    params: &BatchParams,
    function: &mut dyn Function,
    x0: &[f64],
    lsearch: &mut LineSearch,
    mut logger: Option<Logger>,
    mut direction: D,
) -> SolverState
where
    D: FnMut(&SolverState, &mut SolverState, usize),
{
    let mut state = SolverState::new(function, x0);
    if !state.is_finite() {
        state.status = SolverStatus::Diverged;
        return state;
    }
    if state.convergence_criteria() < params.epsilon {
        state.status = SolverStatus::Converged;
        return state;
    }

    let mut pstate = state.clone();
    for i in 0..params.max_iterations {
        direction(&pstate, &mut state, i);
        if !state.has_descent() {
            steepest(&mut state);
        }

        pstate.clone_from(&state);
        if !lsearch.step(function, &mut state) {
            // recover once with steepest descent at the same iterate
            steepest(&mut state);
            if !lsearch.step(function, &mut state) {
                state.status = SolverStatus::Failed;
                break;
            }
        }
        state.iterations = i + 1;

        if !state.is_finite() {
            state.status = SolverStatus::Diverged;
            break;
        }
        if state.convergence_criteria() < params.epsilon {
            state.status = SolverStatus::Converged;
        }
        if let Some(ulog) = logger.as_mut() {
            if !ulog(&state) && state.status == SolverStatus::Running {
                state.status = SolverStatus::Stopped;
            }
        }
        if state.status != SolverStatus::Running {
            break;
        }
    }

    if state.status == SolverStatus::Running {
        state.status = SolverStatus::MaxIters;
    }
    state
}
