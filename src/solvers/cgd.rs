//! Nonlinear conjugate gradient descent with line search.
//!
//! The update coefficient β comes from one of nine published rules,
//! following:
//!
//! 1. "A survey of nonlinear conjugate gradient methods",
//!    W. W. Hager and H. Zhang
//! 2. "Nonlinear Conjugate Gradient Methods", Y.-H. Dai

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::function::Function;
use crate::lsearch::{LineSearch, LsInitializer, LsStrategy};
use crate::math;
use crate::solver::{BatchParams, BatchSolver, Logger, SolverState};
use crate::solvers::batch_loop;
use crate::tuner::Tuner;

/// The β update rule distinguishing the members of the CGD family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CgdVariant {
    /// Hestenes and Stiefel, 1952.
    Hs,
    /// Fletcher and Reeves, 1964.
    Fr,
    /// Polak and Ribiere (non-negative), 1969.
    #[default]
    Prp,
    /// Fletcher, conjugate descent, 1987.
    Cd,
    /// Liu and Storey, 1991.
    Ls,
    /// Dai and Yuan, 1999.
    Dy,
    /// Hybrid Dai-Yuan / Hestenes-Stiefel, 2001.
    Dyhs,
    /// Hybrid Dai-Yuan / conjugate descent, 2002.
    Dycd,
    /// Hager and Zhang (CG_DESCENT), 2005, with the guaranteed-descent
    /// truncation.
    N,
}

impl CgdVariant {
    /// The update coefficient for the previous and current iterates.
    pub fn get(&self, prev: &SolverState, curr: &SolverState) -> f64 {
        match *self {
            CgdVariant::Hs => {
                let y: Vec<f64> = curr.g.iter().zip(prev.g.iter()).map(|(c, p)| c - p).collect();
                math::dot(&curr.g, &y) / math::dot(&prev.d, &y)
            }
            CgdVariant::Fr => math::squared_norm(&curr.g) / math::squared_norm(&prev.g),
            CgdVariant::Prp => {
                let y: Vec<f64> = curr.g.iter().zip(prev.g.iter()).map(|(c, p)| c - p).collect();
                (math::dot(&curr.g, &y) / math::squared_norm(&prev.g)).max(0.0)
            }
            CgdVariant::Cd => -math::squared_norm(&curr.g) / math::dot(&prev.d, &prev.g),
            CgdVariant::Ls => {
                let y: Vec<f64> = curr.g.iter().zip(prev.g.iter()).map(|(c, p)| c - p).collect();
                -math::dot(&curr.g, &y) / math::dot(&prev.d, &prev.g)
            }
            CgdVariant::Dy => {
                let y: Vec<f64> = curr.g.iter().zip(prev.g.iter()).map(|(c, p)| c - p).collect();
                math::squared_norm(&curr.g) / math::dot(&prev.d, &y)
            }
            CgdVariant::Dyhs => {
                let dy = CgdVariant::Dy.get(prev, curr);
                let hs = CgdVariant::Hs.get(prev, curr);
                dy.min(hs).max(0.0)
            }
            CgdVariant::Dycd => {
                let y: Vec<f64> = curr.g.iter().zip(prev.g.iter()).map(|(c, p)| c - p).collect();
                math::squared_norm(&curr.g)
                    / math::dot(&prev.d, &y).max(-math::dot(&prev.d, &prev.g))
            }
            CgdVariant::N => {
                let y: Vec<f64> = curr.g.iter().zip(prev.g.iter()).map(|(c, p)| c - p).collect();
                let div = 1.0 / math::dot(&prev.d, &y);
                let pd2 = math::norm2(&prev.d);
                let pg2 = math::norm2(&prev.g);
                let eta = -1.0 / (pd2 * pg2.min(0.01));

                let mut z = y;
                math::axpy(-2.0 * math::squared_norm(&z) * div, &prev.d, &mut z);
                (div * math::dot(&z, &curr.g)).max(eta)
            }
        }
    }
}

/// Conjugate gradient descent: `d = −g + β·d_prev` with a β rule picked at
/// construction and an orthogonality restart applied to every rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Cgd {
    #[serde(skip)]
    variant: CgdVariant,
    /// Armijo parameter.
    pub c1: f64,
    /// Curvature parameter.
    pub c2: f64,
    /// Step-length initialization.
    pub init: LsInitializer,
    /// Line-search strategy.
    pub strat: LsStrategy,
    /// Orthogonality-restart threshold.
    pub orthotest: f64,
}

impl Default for Cgd {
    fn default() -> Cgd {
        Cgd {
            variant: CgdVariant::default(),
            c1: 1e-4,
            c2: 0.1,
            init: LsInitializer::Quadratic,
            strat: LsStrategy::Interpolation,
            orthotest: 0.1,
        }
    }
}

impl Cgd {
    /// Create a CGD solver with the given β rule and default parameters.
    pub fn new(variant: CgdVariant) -> Cgd {
        Cgd {
            variant,
            ..Cgd::default()
        }
    }

    /// The β rule this solver was constructed with.
    pub fn variant(&self) -> CgdVariant {
        self.variant
    }
}

impl BatchSolver for Cgd {
    fn from_json(&mut self, json: &str) -> Result<()> {
        let variant = self.variant;
        *self = serde_json::from_str(json)?;
        self.variant = variant;
        Ok(())
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).expect("configuration serializes")
    }

    fn tuner(&self) -> Tuner {
        let mut tuner = Tuner::new();
        tuner.add_base10("c1", -5.0, -1.0);
        tuner.add_finite("c2", vec![0.01, 0.05, 0.1, 0.5]);
        tuner.add_finite("orthotest", vec![0.05, 0.1, 0.5]);
        tuner
    }

    fn minimize(
        &self,
        params: &BatchParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState {
        let mut lsearch = LineSearch::new(self.init, self.strat, self.c1, self.c2);
        let variant = self.variant;
        let orthotest = self.orthotest;

        batch_loop(
            params,
            function,
            x0,
            &mut lsearch,
            logger,
            move |pstate: &SolverState, state: &mut SolverState, i| {
                let mut beta = if i == 0 {
                    0.0
                } else {
                    variant.get(pstate, state)
                };
                // restart when successive gradients lose orthogonality
                if i > 0
                    && math::dot(&state.g, &pstate.g).abs()
                        >= orthotest * math::squared_norm(&state.g)
                {
                    beta = 0.0;
                }
                if !beta.is_finite() {
                    beta = 0.0;
                }

                state.d.copy_from_slice(&pstate.d);
                math::scal(beta, &mut state.d);
                math::axpy(-1.0, &state.g, &mut state.d);
            },
        )
    }
}
