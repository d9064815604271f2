//! Heuristics to initialize the step length, see "Numerical optimization",
//! Nocedal & Wright, 2nd edition, p.59.

use crate::function::Function;
use crate::lsearch::{LsInitializer, Step};
use crate::math;
use crate::solver::SolverState;

const PHI0: f64 = 0.01;
const PHI1: f64 = 0.1;
const PHI2: f64 = 2.0;

/// Initial step-length proposal with memory of the previous iteration.
#[derive(Debug)]
pub struct LsInit {
    kind: LsInitializer,
    first: bool,
    prevf: f64,
    prevdg: f64,
}

impl LsInit {
    /// Create an initializer of the given kind.
    pub fn new(kind: LsInitializer) -> LsInit {
        LsInit {
            kind,
            first: true,
            prevf: 0.0,
            prevdg: 0.0,
        }
    }

    /// Propose the first trial step length for the current iterate.
    ///
    /// The state's `t` still holds the step accepted at the previous
    /// iteration.
    pub fn get(&mut self, function: &mut dyn Function, state: &mut SolverState) -> f64 {
        let t0 = match self.kind {
            LsInitializer::Unit => 1.0,
            LsInitializer::Linear => {
                let dg = state.dg();
                let t0 = if self.first {
                    1.0
                } else {
                    state.t * self.prevdg / dg
                };
                self.prevdg = dg;
                t0
            }
            LsInitializer::Quadratic => {
                let t0 = if self.first {
                    1.0
                } else {
                    1.01 * 2.0 * (state.f - self.prevf) / state.dg()
                };
                self.prevf = state.f;
                t0
            }
            LsInitializer::CgDescent => {
                if self.first {
                    let xnorm = math::norm_inf(&state.x);
                    let fnorm = state.f.abs();
                    if xnorm > 0.0 {
                        PHI0 * xnorm / math::norm_inf(&state.g)
                    } else if fnorm > 0.0 {
                        PHI0 * fnorm / math::squared_norm(&state.g)
                    } else {
                        1.0
                    }
                } else {
                    // probe at a fraction of the previous step and keep the
                    // quadratic interpolant when it is convex and improves
                    let step0 = Step::start(state);
                    let tx = state.t * PHI1;
                    let mut probe = state.x.clone();
                    math::axpy(tx, &state.d, &mut probe);
                    let fx = function.eval(&probe, None);
                    state.fcalls += 1;

                    let stepx = Step {
                        t: tx,
                        f: fx,
                        dg: 0.0,
                    };
                    match Step::quadratic(&step0, &stepx) {
                        Some(tq) if fx < step0.f && tq > 0.0 && tq < tx => tq,
                        _ => state.t * PHI2,
                    }
                }
            }
        };
        self.first = false;

        if t0.is_finite() && t0 > 0.0 {
            t0.min(crate::lsearch::STEP_MAX)
        } else {
            1.0
        }
    }
}
