//! Backtracking line-search that stops when the required condition is
//! satisfied, see "Numerical optimization", Nocedal & Wright, 2nd edition.

use crate::function::Function;
use crate::lsearch::MAX_PROBES;
use crate::solver::SolverState;

const DECREMENT: f64 = 0.5;

/// Acceptance test on top of the Armijo decrease.
#[derive(Debug, Clone, Copy)]
pub enum Condition {
    /// Sufficient decrease only.
    Armijo,
    /// Sufficient decrease plus the Wolfe curvature condition.
    Wolfe,
    /// Sufficient decrease plus the strong Wolfe condition.
    StrongWolfe,
}

pub fn search(
    function: &mut dyn Function,
    state0: &SolverState,
    t0: f64,
    state: &mut SolverState,
    c1: f64,
    c2: f64,
    condition: Condition,
) -> bool {
    let dg0 = state0.dg();
    if dg0 >= 0.0 {
        return false;
    }

    let mut t = t0;
    for _ in 0..MAX_PROBES {
        state.probe(function, &state0.x, t);

        if state.is_finite() && state.f <= state0.f + c1 * t * dg0 {
            let accepted = match condition {
                Condition::Armijo => true,
                Condition::Wolfe => state.dg() >= c2 * dg0,
                Condition::StrongWolfe => state.dg().abs() <= c2 * dg0.abs(),
            };
            if accepted {
                return true;
            }
        }

        t *= DECREMENT;
        if t < f64::EPSILON {
            break;
        }
    }
    false
}
