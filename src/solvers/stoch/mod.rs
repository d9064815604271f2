//! The stochastic solver family.
//!
//! All members share the same outer loop: an inner block of minibatch
//! iterations per epoch, then a deterministic full-batch snapshot that is
//! logged, compared against the best snapshot so far and tested for
//! convergence. The per-algorithm state (running averages, auxiliary
//! iterates, variance-reduction pairs) lives in explicit update structs so
//! solvers stay testable in isolation.

mod adadelta;
mod adagrad;
mod adam;
mod adaratio;
mod ag;
mod averaging;
mod lrate;
mod rmsprop;
mod sg;
mod sgm;
mod svrg;

pub use self::adadelta::StochAdaDelta;
pub use self::adagrad::StochAdaGrad;
pub use self::adam::StochAdam;
pub use self::adaratio::StochAdaRatio;
pub use self::ag::{NesterovRestart, StochAg};
pub use self::averaging::{StochSga, StochSia};
pub use self::lrate::Lrate;
pub use self::rmsprop::StochRmsProp;
pub use self::sg::StochSg;
pub use self::sgm::StochSgm;
pub use self::svrg::StochSvrg;

use crate::function::Function;
use crate::solver::{Logger, SolverState, SolverStatus, StochParams};

/// Per-algorithm state and update rule plugged into
/// [`stoch_loop`](fn.stoch_loop.html).
pub(crate) trait StochUpdate {
    /// Allocate per-run state for the starting iterate.
    fn start(&mut self, function: &mut dyn Function, cstate: &SolverState);

    /// One inner iteration: fill the descent direction, advance the
    /// minibatch and update the iterate. `k` counts inner iterations from 1.
    fn step(
        &mut self,
        function: &mut dyn Function,
        cstate: &mut SolverState,
        sstate: &SolverState,
        k: usize,
    );

    /// Deterministic end-of-epoch snapshot; the default evaluates the
    /// full-batch objective at the current iterate.
    fn snapshot(
        &mut self,
        function: &mut dyn Function,
        cstate: &SolverState,
        sstate: &mut SolverState,
    ) {
        sstate.update_at(function, &cstate.x);
    }
}

/// The epoch loop shared by the stochastic solvers.
///
/// Returns the best snapshot state observed, carrying the terminal status
/// and the merged evaluation counters.
pub(crate) fn stoch_loop(
    params: &StochParams,
    function: &mut dyn Function,
    x0: &[f64],
    update: &mut dyn StochUpdate,
    mut logger: Option<Logger>,
) -> SolverState {
    let mut cstate = SolverState::stoch_new(function, x0);
    let mut sstate = SolverState::new(function, x0);
    if !sstate.is_finite() {
        sstate.status = SolverStatus::Diverged;
        return sstate;
    }

    update.start(function, &cstate);

    let mut bstate = sstate.clone();
    let mut k = 1usize;
    for _epoch in 0..params.epochs {
        for _i in 0..params.epoch_size {
            update.step(function, &mut cstate, &sstate, k);
            k += 1;
            if cstate.status == SolverStatus::Diverged {
                break;
            }
        }

        update.snapshot(function, &cstate, &mut sstate);
        sstate.iterations = k - 1;

        if sstate.is_finite() && sstate.f < bstate.f {
            bstate.x.copy_from_slice(&sstate.x);
            bstate.g.copy_from_slice(&sstate.g);
            bstate.f = sstate.f;
            bstate.iterations = sstate.iterations;
        }

        if let Some(ulog) = logger.as_mut() {
            if !ulog(&sstate) && sstate.status == SolverStatus::Running {
                sstate.status = SolverStatus::Stopped;
            }
        }
        if cstate.status == SolverStatus::Diverged || !sstate.is_finite() {
            sstate.status = SolverStatus::Diverged;
        } else if sstate.convergence_criteria() < params.epsilon {
            sstate.status = SolverStatus::Converged;
        }
        if sstate.status != SolverStatus::Running {
            break;
        }
    }

    bstate.status = match sstate.status {
        SolverStatus::Running => SolverStatus::MaxIters,
        status => status,
    };
    bstate.fcalls = sstate.fcalls + cstate.fcalls;
    bstate.gcalls = sstate.gcalls + cstate.gcalls;
    bstate
}
