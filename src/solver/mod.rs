//! Provides the generics and interfaces for the specific solvers.
//!
//! See [Solvers][solvers]
//! [solvers]: ../solvers/index.html

use crate::error::Result;
use crate::function::Function;
use crate::math;
use crate::tuner::Tuner;

/// Outcome attached to the state a solver returns.
///
/// Solvers always return a [`SolverState`](struct.SolverState.html); this
/// status is how numerical trouble is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Optimization still in progress.
    Running,
    /// The convergence criterion dropped below the requested accuracy.
    Converged,
    /// The iteration budget was exhausted; the best iterate is returned.
    MaxIters,
    /// The line search failed twice in a row at the same iterate.
    Failed,
    /// A logger callback requested termination.
    Stopped,
    /// A non-finite value or gradient was produced.
    Diverged,
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match *self {
            SolverStatus::Running => "running",
            SolverStatus::Converged => "converged",
            SolverStatus::MaxIters => "max_iters",
            SolverStatus::Failed => "failed",
            SolverStatus::Stopped => "stopped",
            SolverStatus::Diverged => "diverged",
        };
        write!(f, "{}", name)
    }
}

/// The iterate a solver works on: point, gradient, descent direction, step
/// length and bookkeeping counters.
///
/// After construction `f = f(x)` and `g = ∇f(x)` hold; every update
/// refreshes them and flips the status to
/// [`Diverged`](enum.SolverStatus.html) when either becomes non-finite.
/// The state owns its vectors; the function is passed into every call that
/// needs it.
#[derive(Debug, Clone)]
pub struct SolverState {
    /// Current iterate.
    pub x: Vec<f64>,
    /// Gradient at `x`.
    pub g: Vec<f64>,
    /// Descent direction.
    pub d: Vec<f64>,
    /// Function value at `x`.
    pub f: f64,
    /// Step length accepted by the most recent line search.
    pub t: f64,
    /// Current outcome.
    pub status: SolverStatus,
    /// Outer iterations performed.
    pub iterations: usize,
    /// Function evaluations.
    pub fcalls: usize,
    /// Gradient evaluations.
    pub gcalls: usize,
}

impl SolverState {
    /// Construct a state at `x0`, evaluating the deterministic objective.
    pub fn new(function: &mut dyn Function, x0: &[f64]) -> SolverState {
        let mut state = SolverState::empty(x0);
        let f = function.eval(&state.x, Some(&mut state.g));
        state.accept(f);
        state
    }

    /// Construct a state at `x0`, evaluating the current minibatch.
    pub fn stoch_new(function: &mut dyn Function, x0: &[f64]) -> SolverState {
        let mut state = SolverState::empty(x0);
        let f = function.stoch_eval(&state.x, Some(&mut state.g));
        state.accept(f);
        state
    }

    fn empty(x0: &[f64]) -> SolverState {
        SolverState {
            x: x0.to_vec(),
            g: vec![0.0; x0.len()],
            d: vec![0.0; x0.len()],
            f: 0.0,
            t: 0.0,
            status: SolverStatus::Running,
            iterations: 0,
            fcalls: 0,
            gcalls: 0,
        }
    }

    /// Advance the iterate along `d` by `t` and refresh `f` and `g`.
    pub fn update(&mut self, function: &mut dyn Function, t: f64) {
        self.t = t;
        math::axpy(t, &self.d, &mut self.x);
        let f = function.eval(&self.x, Some(&mut self.g));
        self.accept(f);
    }

    /// Refresh the state at a supplied point.
    pub fn update_at(&mut self, function: &mut dyn Function, x: &[f64]) {
        self.x.copy_from_slice(x);
        let f = function.eval(&self.x, Some(&mut self.g));
        self.accept(f);
    }

    /// Advance along `d` by `t` against the current minibatch.
    pub fn stoch_update(&mut self, function: &mut dyn Function, t: f64) {
        self.t = t;
        math::axpy(t, &self.d, &mut self.x);
        let f = function.stoch_eval(&self.x, Some(&mut self.g));
        self.accept(f);
    }

    /// Move to `x0 + t·d` (with the current direction) and refresh.
    ///
    /// Line-search strategies use this to probe candidate step lengths
    /// relative to the iterate the search started from.
    pub fn probe(&mut self, function: &mut dyn Function, x0: &[f64], t: f64) {
        self.t = t;
        self.x.copy_from_slice(x0);
        math::axpy(t, &self.d, &mut self.x);
        let f = function.eval(&self.x, Some(&mut self.g));
        self.accept(f);
    }

    fn accept(&mut self, f: f64) {
        self.f = f;
        self.fcalls += 1;
        self.gcalls += 1;
        if !f.is_finite() || !math::is_finite(&self.g) {
            self.status = SolverStatus::Diverged;
        } else if self.status == SolverStatus::Diverged {
            self.status = SolverStatus::Running;
        }
    }

    /// Scale-invariant convergence criterion `‖g‖∞ / (1 + |f|)`.
    pub fn convergence_criteria(&self) -> f64 {
        math::norm_inf(&self.g) / (1.0 + self.f.abs())
    }

    /// Directional derivative `d · g` at the current iterate.
    pub fn dg(&self) -> f64 {
        math::dot(&self.d, &self.g)
    }

    /// Whether `d` points downhill.
    pub fn has_descent(&self) -> bool {
        self.dg() < 0.0
    }

    /// Whether value and gradient are finite.
    pub fn is_finite(&self) -> bool {
        self.f.is_finite() && math::is_finite(&self.g)
    }
}

impl std::fmt::Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "f = {:.6e}, g = {:.6e}, t = {:.3e} [{}], i = {}, fcalls = {}, gcalls = {}",
            self.f,
            self.convergence_criteria(),
            self.t,
            self.status,
            self.iterations,
            self.fcalls,
            self.gcalls
        )
    }
}

/// Per-iteration callback; returning `false` stops the solver with status
/// [`Stopped`](enum.SolverStatus.html).
pub type Logger<'a> = &'a mut dyn FnMut(&SolverState) -> bool;

/// Budget and accuracy for the batch solvers.
#[derive(Debug, Clone, Copy)]
pub struct BatchParams {
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Target for the convergence criterion.
    pub epsilon: f64,
}

impl BatchParams {
    /// Create batch parameters.
    pub fn new(max_iterations: usize, epsilon: f64) -> BatchParams {
        BatchParams {
            max_iterations,
            epsilon,
        }
    }
}

/// Budget and accuracy for the stochastic solvers.
#[derive(Debug, Clone, Copy)]
pub struct StochParams {
    /// Number of epochs.
    pub epochs: usize,
    /// Inner iterations per epoch.
    pub epoch_size: usize,
    /// Target for the convergence criterion, tested at snapshots.
    pub epsilon: f64,
}

impl StochParams {
    /// Create stochastic parameters.
    pub fn new(epochs: usize, epoch_size: usize, epsilon: f64) -> StochParams {
        StochParams {
            epochs,
            epoch_size,
            epsilon,
        }
    }
}

/// Implementation of a specific batch solver.
///
/// See [Solvers][1]
/// [1]: ../solvers/index.html
pub trait BatchSolver {
    /// Replace the configuration from a JSON object; unknown keys are
    /// rejected.
    fn from_json(&mut self, json: &str) -> Result<()>;

    /// Serialize the configuration to JSON.
    fn to_json(&self) -> String;

    /// The hyper-parameter axes worth tuning for this solver.
    fn tuner(&self) -> Tuner;

    /// Minimize `function` starting from `x0`.
    fn minimize(
        &self,
        params: &BatchParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState;
}

/// Implementation of a specific stochastic solver.
///
/// See [Solvers][1]
/// [1]: ../solvers/index.html
pub trait StochSolver {
    /// Replace the configuration from a JSON object; unknown keys are
    /// rejected.
    fn from_json(&mut self, json: &str) -> Result<()>;

    /// Serialize the configuration to JSON.
    fn to_json(&self) -> String;

    /// The hyper-parameter axes worth tuning for this solver.
    fn tuner(&self) -> Tuner;

    /// Minimize `function` starting from `x0`, logging once per epoch.
    fn minimize(
        &self,
        params: &StochParams,
        function: &mut dyn Function,
        x0: &[f64],
        logger: Option<Logger>,
    ) -> SolverState;
}
