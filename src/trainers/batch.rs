//! Batch trainer: every gradient update is computed over the whole
//! training fold.

use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::accumulator::{Accumulator, AccumulatorFunction, Mode};
use crate::error::{Error, Result};
use crate::loss::Loss;
use crate::model::Model;
use crate::solver::{BatchParams, BatchSolver, SolverState};
use crate::solvers::make_batch_solver;
use crate::task::{Fold, Task};
use crate::thread_pool::ThreadPool;
use crate::trainer::{is_done, TrainerResult, TrainerState};
use crate::trainers::check_dims;

/// Trains a model with a batch solver; each solver iteration counts as one
/// epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchTrainer {
    /// Batch solver id.
    pub solver: String,
    /// Solver configuration as JSON; `None` keeps the defaults.
    pub config: Option<String>,
    /// Maximum number of epochs.
    pub epochs: usize,
    /// Epochs without validation improvement before stopping.
    pub patience: usize,
    /// Convergence accuracy handed to the solver.
    pub epsilon: f64,
    /// Training value below which the run counts as solved.
    pub accuracy: Option<f64>,
}

impl Default for BatchTrainer {
    fn default() -> BatchTrainer {
        BatchTrainer {
            solver: "lbfgs".to_owned(),
            config: None,
            epochs: 1024,
            patience: 32,
            epsilon: 1e-6,
            accuracy: None,
        }
    }
}

impl BatchTrainer {
    /// Train `model` on the given task fold, starting from the model's
    /// current parameters; the best parameters are restored into the model.
    pub fn train(
        &self,
        pool: &ThreadPool,
        model: &mut dyn Model,
        task: &dyn Task,
        fold: usize,
        loss: &dyn Loss,
    ) -> Result<TrainerResult> {
        check_dims(model, task)?;

        let mut solver = make_batch_solver(&self.solver)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown batch solver '{}'", self.solver)))?;
        if let Some(config) = self.config.as_deref() {
            solver.from_json(config)?;
        }

        let train_fold = Fold::train(fold);
        let valid_fold = Fold::valid(fold);
        let test_fold = Fold::test(fold);

        let mut objective = AccumulatorFunction::new(
            Accumulator::new(pool, &*model, loss),
            task,
            train_fold,
            32,
        );
        let mut eval = Accumulator::new(pool, &*model, loss);

        let mut result = TrainerResult::new(&solver.to_json());
        if let Some(accuracy) = self.accuracy {
            result.set_accuracy(accuracy);
        }

        let timer = Instant::now();
        let mut epoch = 0usize;
        let patience = self.patience;
        let x0 = model.params();

        {
            let mut measure = |x: &[f64], fold: Fold| {
                eval.set_params(x);
                eval.set_mode(Mode::Value);
                eval.update(task, fold);
                (eval.value(), eval.error())
            };
            let mut ulog = |sstate: &SolverState| -> bool {
                epoch += 1;
                let (train_value, train_error) = measure(&sstate.x, train_fold);
                let (valid_value, valid_error) = measure(&sstate.x, valid_fold);
                let (test_value, test_error) = measure(&sstate.x, test_fold);

                let state = TrainerState {
                    millis: timer.elapsed().as_millis() as u64,
                    epoch,
                    train_value,
                    train_error,
                    valid_value,
                    valid_error,
                    test_value,
                    test_error,
                };
                let status = result.update(sstate, state, patience);
                info!(
                    "[train = {:.6}/{:.4}, valid = {:.6}/{:.4} ({}), epoch = {}] {}",
                    train_value, train_error, valid_value, valid_error, status, epoch, sstate
                );
                !is_done(status)
            };

            let params = BatchParams::new(self.epochs, self.epsilon);
            solver.minimize(&params, &mut objective, &x0, Some(&mut ulog));
        }

        if result.valid() {
            model.set_params(result.optimum_params());
        }
        Ok(result)
    }
}
