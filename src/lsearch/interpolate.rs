//! Bracketing line-search with safeguarded cubic interpolation, after
//! Algorithms 3.5 and 3.6 of "Numerical optimization", Nocedal & Wright,
//! 2nd edition. Terminates at the strong Wolfe conditions.

use crate::function::Function;
use crate::lsearch::{Step, MAX_PROBES, STEP_MAX};
use crate::math;
use crate::solver::SolverState;

pub fn search(
    function: &mut dyn Function,
    state0: &SolverState,
    t0: f64,
    state: &mut SolverState,
    c1: f64,
    c2: f64,
) -> bool {
    let step0 = Step::start(state0);
    if step0.dg >= 0.0 {
        return false;
    }

    // bracketing stage: expand until the minimiser is surrounded
    let mut prev = step0;
    let mut t = t0.min(STEP_MAX);
    for i in 0..MAX_PROBES {
        state.probe(function, &state0.x, t);
        let curr = Step::at(state);

        let out_of_domain = !state.is_finite();
        if out_of_domain || curr.f > step0.f + c1 * t * step0.dg || (i > 0 && curr.f >= prev.f) {
            return zoom(function, state0, &step0, prev, curr, state, c1, c2);
        }
        if curr.dg.abs() <= c2 * step0.dg.abs() {
            return true;
        }
        if curr.dg >= 0.0 {
            return zoom(function, state0, &step0, curr, prev, state, c1, c2);
        }

        prev = curr;
        t *= 3.0;
        if t > STEP_MAX {
            break;
        }
    }
    false
}

/// Shrink the bracket `[lo, hi]` (`φ(lo) ≤ φ(hi)`, `φ′(lo)·(hi−lo) < 0`)
/// around a point satisfying the strong Wolfe conditions.
#[allow(clippy::too_many_arguments)]
fn zoom(
    function: &mut dyn Function,
    state0: &SolverState,
    step0: &Step,
    mut lo: Step,
    mut hi: Step,
    state: &mut SolverState,
    c1: f64,
    c2: f64,
) -> bool {
    for _ in 0..MAX_PROBES {
        let tmin = lo.t.min(hi.t);
        let tmax = lo.t.max(hi.t);
        let width = tmax - tmin;
        if width < math::epsilon0() * (1.0 + tmax) {
            break;
        }

        // cubic minimiser, safeguarded towards bisection
        let interior = (tmin + 0.1 * width, tmax - 0.1 * width);
        let t = match Step::cubic(&lo, &hi) {
            Some(tc) if tc > interior.0 && tc < interior.1 => tc,
            _ => 0.5 * (lo.t + hi.t),
        };

        state.probe(function, &state0.x, t);
        let curr = Step::at(state);

        if !state.is_finite() || curr.f > step0.f + c1 * t * step0.dg || curr.f >= lo.f {
            hi = curr;
        } else {
            if curr.dg.abs() <= c2 * step0.dg.abs() {
                return true;
            }
            if curr.dg * (hi.t - lo.t) >= 0.0 {
                hi = lo;
            }
            lo = curr;
        }
    }
    false
}
