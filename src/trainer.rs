//! Tracks the per-epoch training history and the best model seen.
//!
//! After every epoch the trainer hands the current solver state and the
//! measured train/valid/test metrics to
//! [`TrainerResult::update`](struct.TrainerResult.html#method.update),
//! which classifies the epoch and snapshots the parameters whenever the
//! validation value improves. Training stops on the terminal
//! classifications (solved, diverge, overfit, failed).

use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::solver::{SolverState, SolverStatus};

/// Classification of one training epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerStatus {
    /// The optimization failed.
    Failed,
    /// Validation performance improved.
    Better,
    /// Validation performance decreased, but not critically.
    Worse,
    /// Overfitting detected; processing should stop.
    Overfit,
    /// Divergence detected (NaN/Inf); processing should stop.
    Diverge,
    /// Solved to the requested accuracy; processing should stop.
    Solved,
}

impl fmt::Display for TrainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            TrainerStatus::Failed => "failed",
            TrainerStatus::Better => "better",
            TrainerStatus::Worse => "worse",
            TrainerStatus::Overfit => "overfit",
            TrainerStatus::Diverge => "diverge",
            TrainerStatus::Solved => "solved",
        };
        write!(f, "{}", name)
    }
}

/// Check if training should stop on this classification.
pub fn is_done(status: TrainerStatus) -> bool {
    matches!(
        status,
        TrainerStatus::Failed
            | TrainerStatus::Overfit
            | TrainerStatus::Diverge
            | TrainerStatus::Solved
    )
}

/// Metrics measured at the end of one epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainerState {
    /// Wall-clock time since training started, in milliseconds.
    pub millis: u64,
    /// Epoch number, counted from 1.
    pub epoch: usize,
    /// Training loss value.
    pub train_value: f64,
    /// Training error metric.
    pub train_error: f64,
    /// Validation loss value.
    pub valid_value: f64,
    /// Validation error metric.
    pub valid_error: f64,
    /// Test loss value.
    pub test_value: f64,
    /// Test error metric.
    pub test_error: f64,
}

/// Append-only training history plus the best-validation snapshot.
#[derive(Debug, Clone)]
pub struct TrainerResult {
    config: String,
    accuracy: Option<f64>,
    history: Vec<(TrainerState, TrainerStatus)>,
    opt_params: Vec<f64>,
    opt_state: TrainerState,
    has_optimum: bool,
}

impl TrainerResult {
    /// Create an empty result tagged with a configuration description.
    pub fn new(config: &str) -> TrainerResult {
        TrainerResult {
            config: config.to_owned(),
            accuracy: None,
            history: Vec::new(),
            opt_params: Vec::new(),
            opt_state: TrainerState::default(),
            has_optimum: false,
        }
    }

    /// Enable the `solved` classification below this training value.
    pub fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = Some(accuracy);
    }

    /// Classify an epoch and track the best-validation snapshot.
    ///
    /// `patience` bounds the consecutive epochs the validation value may
    /// fail to improve before the epoch classifies as overfitting. The
    /// stored best-validation value never increases across calls.
    pub fn update(
        &mut self,
        solver_state: &SolverState,
        state: TrainerState,
        patience: usize,
    ) -> TrainerStatus {
        let status = if !state.train_value.is_finite()
            || solver_state.status == SolverStatus::Diverged
        {
            TrainerStatus::Diverge
        } else if solver_state.status == SolverStatus::Failed {
            TrainerStatus::Failed
        } else if self.accuracy.is_some_and(|accuracy| state.train_value < accuracy) {
            TrainerStatus::Solved
        } else if !self.has_optimum || state.valid_value < self.opt_state.valid_value {
            TrainerStatus::Better
        } else if state.epoch > self.opt_state.epoch + patience {
            TrainerStatus::Overfit
        } else {
            TrainerStatus::Worse
        };

        let improved =
            !self.has_optimum || state.valid_value < self.opt_state.valid_value;
        if status == TrainerStatus::Better || (status == TrainerStatus::Solved && improved) {
            self.opt_params.clear();
            self.opt_params.extend_from_slice(&solver_state.x);
            self.opt_state = state;
            self.has_optimum = true;
        }

        self.history.push((state, status));
        status
    }

    /// Whether the result holds a usable optimum.
    pub fn valid(&self) -> bool {
        self.has_optimum && !self.history.is_empty()
    }

    /// The state of the best epoch.
    pub fn optimum_state(&self) -> &TrainerState {
        &self.opt_state
    }

    /// The parameters of the best epoch.
    pub fn optimum_params(&self) -> &[f64] {
        &self.opt_params
    }

    /// The best epoch number.
    pub fn optimum_epoch(&self) -> usize {
        self.opt_state.epoch
    }

    /// The configuration this result was produced with.
    pub fn config(&self) -> &str {
        &self.config
    }

    /// The per-epoch history with classifications.
    pub fn history(&self) -> &[(TrainerState, TrainerStatus)] {
        &self.history
    }

    /// The fitted per-second geometric factor of the training loss,
    /// below one when the loss decreases.
    pub fn convergence_speed(&self) -> f64 {
        let points: Vec<(f64, f64)> = self
            .history
            .iter()
            .filter(|(state, _)| state.train_value > 0.0)
            .map(|(state, _)| (state.millis as f64 / 1000.0, state.train_value.ln()))
            .collect();
        if points.len() < 2 {
            return 1.0;
        }

        // least-squares slope of log-loss over wall-clock seconds
        let n = points.len() as f64;
        let tsum: f64 = points.iter().map(|(t, _)| t).sum();
        let vsum: f64 = points.iter().map(|(_, v)| v).sum();
        let ttsum: f64 = points.iter().map(|(t, _)| t * t).sum();
        let tvsum: f64 = points.iter().map(|(t, v)| t * v).sum();

        let denom = n * ttsum - tsum * tsum;
        if denom.abs() <= f64::EPSILON {
            return 1.0;
        }
        let slope = (n * tvsum - tsum * vsum) / denom;
        slope.exp()
    }

    /// Save the history as CSV.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "epoch",
            "wall_time_ms",
            "train_value",
            "train_error",
            "valid_value",
            "valid_error",
            "test_value",
            "test_error",
            "status",
            "config",
        ])?;
        for (state, status) in self.history.iter() {
            writer.write_record([
                state.epoch.to_string(),
                state.millis.to_string(),
                state.train_value.to_string(),
                state.train_error.to_string(),
                state.valid_value.to_string(),
                state.valid_error.to_string(),
                state.test_value.to_string(),
                state.test_error.to_string(),
                status.to_string(),
                self.config.clone(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for TrainerResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.optimum_state();
        write!(
            f,
            "train = {:.6}/{:.4}, valid = {:.6}/{:.4}, test = {:.6}/{:.4}, epoch = {}, speed = {:.4}/s",
            state.train_value,
            state.train_error,
            state.valid_value,
            state.valid_error,
            state.test_value,
            state.test_error,
            state.epoch,
            self.convergence_speed()
        )
    }
}
