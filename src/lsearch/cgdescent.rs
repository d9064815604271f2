//! The CG-DESCENT line-search of Hager & Zhang, see "A new conjugate
//! gradient method with guaranteed descent and an efficient line search",
//! SIAM J. Optim., 2005.
//!
//! The search is modelled as an explicit phase machine: an expansion phase
//! grows the trial step until a slope change or a value blow-up brackets
//! the minimiser, then a zooming phase shrinks the bracket with secant²
//! steps safeguarded by bisection. Acceptance uses the standard Wolfe
//! conditions or their ε-relaxed approximate form.

use crate::function::Function;
use crate::lsearch::{Step, MAX_PROBES, STEP_MAX};
use crate::math;
use crate::solver::SolverState;

/// Relaxation factor for the approximate Wolfe value test.
const EPSILON: f64 = 1e-6;

/// Expansion factor for the bracketing phase.
const RHO: f64 = 5.0;

/// Bracket-width decrease required before forcing a bisection.
const GAMMA: f64 = 0.66;

/// Bisection weight inside the shrink step.
const THETA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Expanding,
    Zooming,
    Accepted,
    Failed,
}

struct Search<'a> {
    state0: &'a SolverState,
    step0: Step,
    epsk: f64,
    c1: f64,
    c2: f64,
    probes: usize,
}

impl<'a> Search<'a> {
    fn probe(&mut self, function: &mut dyn Function, state: &mut SolverState, t: f64) -> Step {
        state.probe(function, &self.state0.x, t);
        self.probes += 1;
        Step::at(state)
    }

    fn exhausted(&self) -> bool {
        self.probes >= MAX_PROBES
    }

    /// Wolfe or approximate Wolfe acceptance.
    fn accepted(&self, step: &Step) -> bool {
        if !step.f.is_finite() {
            return false;
        }
        let wolfe = step.f <= self.step0.f + self.c1 * step.t * self.step0.dg
            && step.dg >= self.c2 * self.step0.dg;
        let approx_wolfe = (2.0 * self.c1 - 1.0) * self.step0.dg >= step.dg
            && step.dg >= self.c2 * self.step0.dg
            && step.f <= self.step0.f + self.epsk;
        wolfe || approx_wolfe
    }

    /// Whether `step` keeps the low-side bracket invariant.
    fn below_relaxed(&self, step: &Step) -> bool {
        step.f.is_finite() && step.f <= self.step0.f + self.epsk
    }

    /// Interval update: replace one endpoint of `[a, b]` with `c`,
    /// preserving `φ′(a) < 0`, `φ(a) ≤ φ(0) + ε` and `φ′(b) ≥ 0`.
    fn update(
        &mut self,
        function: &mut dyn Function,
        state: &mut SolverState,
        a: Step,
        b: Step,
        c: Step,
    ) -> (Step, Step) {
        if c.t <= a.t || c.t >= b.t {
            return (a, b);
        }
        if c.dg >= 0.0 {
            return (a, c);
        }
        if self.below_relaxed(&c) {
            return (c, b);
        }
        self.shrink(function, state, a, c)
    }

    /// The value at `b` blew past the relaxed bound: bisect inside `[a, b]`
    /// until the opposite-slope invariant is restored.
    fn shrink(
        &mut self,
        function: &mut dyn Function,
        state: &mut SolverState,
        mut a: Step,
        mut b: Step,
    ) -> (Step, Step) {
        while !self.exhausted() {
            if (b.t - a.t).abs() < math::epsilon0() * (1.0 + b.t.abs()) {
                break;
            }
            let t = (1.0 - THETA) * a.t + THETA * b.t;
            let c = self.probe(function, state, t);
            if c.dg >= 0.0 {
                return (a, c);
            }
            if self.below_relaxed(&c) {
                a = c;
            } else {
                b = c;
            }
        }
        (a, b)
    }
}

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

    let mut search = Search {
        state0,
        step0,
        epsk: EPSILON * step0.f.abs(),
        c1,
        c2,
        probes: 0,
    };

    let mut phase = Phase::Expanding;
    let mut a = step0;
    let mut b = step0;

    // expansion: grow the trial step until the minimiser is bracketed
    let mut t = t0.min(STEP_MAX);
    while phase == Phase::Expanding && !search.exhausted() {
        let curr = search.probe(function, state, t);
        if search.accepted(&curr) {
            phase = Phase::Accepted;
        } else if !search.below_relaxed(&curr) {
            let (na, nb) = search.shrink(function, state, a, curr);
            a = na;
            b = nb;
            phase = Phase::Zooming;
        } else if curr.dg >= 0.0 {
            b = curr;
            phase = Phase::Zooming;
        } else {
            a = curr;
            t *= RHO;
            if t > STEP_MAX {
                phase = Phase::Failed;
            }
        }
    }

    // zooming: secant² shrinkage with a bisection safeguard
    while phase == Phase::Zooming && !search.exhausted() {
        let width = b.t - a.t;
        if width.abs() < math::epsilon0() * (1.0 + b.t.abs()) || b.dg <= a.dg {
            phase = Phase::Failed;
            break;
        }

        let mut t = Step::secant(&a, &b);
        if !t.is_finite() || t <= a.t || t >= b.t {
            t = 0.5 * (a.t + b.t);
        }
        let c = search.probe(function, state, t);
        if search.accepted(&c) {
            phase = Phase::Accepted;
            break;
        }
        let (mut na, mut nb) = search.update(function, state, a, b, c);

        // second secant step against the replaced endpoint
        let tbar = if (nb.t - c.t).abs() < f64::EPSILON && c.dg != b.dg {
            Some(Step::secant(&b, &nb))
        } else if (na.t - c.t).abs() < f64::EPSILON && c.dg != a.dg {
            Some(Step::secant(&a, &na))
        } else {
            None
        };
        if let Some(tbar) = tbar {
            if tbar.is_finite() && tbar > na.t && tbar < nb.t {
                let cbar = search.probe(function, state, tbar);
                if search.accepted(&cbar) {
                    phase = Phase::Accepted;
                    break;
                }
                let refined = search.update(function, state, na, nb, cbar);
                na = refined.0;
                nb = refined.1;
            }
        }

        a = na;
        b = nb;

        // not shrinking fast enough: force a bisection
        if b.t - a.t > GAMMA * width && !search.exhausted() {
            let c = search.probe(function, state, 0.5 * (a.t + b.t));
            if search.accepted(&c) {
                phase = Phase::Accepted;
                break;
            }
            let (na, nb) = search.update(function, state, a, b, c);
            a = na;
            b = nb;
        }
    }

    // probes write through the state, so on acceptance it already sits on
    // the accepted point; failures are restored by the caller
    phase == Phase::Accepted
}
