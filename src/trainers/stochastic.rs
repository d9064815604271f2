//! Stochastic trainer: gradient updates are computed over minibatches,
//! with a deterministic evaluation at the end of each epoch.

use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::accumulator::{Accumulator, AccumulatorFunction, Mode};
use crate::error::{Error, Result};
use crate::function::Function;
use crate::loss::Loss;
use crate::model::Model;
use crate::solver::{SolverState, StochParams, StochSolver};
use crate::solvers::make_stoch_solver;
use crate::task::{Fold, Task};
use crate::thread_pool::ThreadPool;
use crate::trainer::{is_done, TrainerResult, TrainerState};
use crate::trainers::check_dims;

/// Trains a model with a stochastic solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StochasticTrainer {
    /// Stochastic solver id.
    pub solver: String,
    /// Solver configuration as JSON; `None` keeps the defaults.
    pub config: Option<String>,
    /// Maximum number of epochs.
    pub epochs: usize,
    /// Minibatch size.
    pub batch: usize,
    /// Epochs without validation improvement before stopping.
    pub patience: usize,
    /// Convergence accuracy handed to the solver.
    pub epsilon: f64,
    /// Training value below which the run counts as solved.
    pub accuracy: Option<f64>,
}

impl Default for StochasticTrainer {
    fn default() -> StochasticTrainer {
        StochasticTrainer {
            solver: "sg".to_owned(),
            config: None,
            epochs: 128,
            batch: 32,
            patience: 32,
            epsilon: 1e-6,
            accuracy: None,
        }
    }
}

impl StochasticTrainer {
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

        let mut solver = make_stoch_solver(&self.solver)
            .ok_or_else(|| {
                Error::InvalidConfig(format!("unknown stochastic solver '{}'", self.solver))
            })?;
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
            self.batch,
        );
        let mut eval = Accumulator::new(pool, &*model, loss);

        let mut result = TrainerResult::new(&solver.to_json());
        if let Some(accuracy) = self.accuracy {
            result.set_accuracy(accuracy);
        }

        let timer = Instant::now();
        let mut epoch = 0usize;
        let patience = self.patience;
        let epoch_size = objective.summands();
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
                    "[train = {:.6}/{:.4}, valid = {:.6}/{:.4} ({}), epoch = {}/{}] {}",
                    train_value, train_error, valid_value, valid_error, status, epoch,
                    self.epochs, sstate
                );
                !is_done(status)
            };

            let params = StochParams::new(self.epochs, epoch_size, self.epsilon);
            solver.minimize(&params, &mut objective, &x0, Some(&mut ulog));
        }

        if result.valid() {
            model.set_params(result.optimum_params());
        }
        Ok(result)
    }

    /// Search the solver's hyper-parameter space with short training runs,
    /// scoring each configuration by its validation value.
    ///
    /// Returns the best configuration as JSON; pass it back through
    /// [`config`](#structfield.config) for the full run.
    pub fn tune(
        &self,
        pool: &ThreadPool,
        model: &dyn Model,
        task: &dyn Task,
        fold: usize,
        loss: &dyn Loss,
        trials: usize,
    ) -> Result<String> {
        check_dims(model, task)?;

        let mut solver = make_stoch_solver(&self.solver)
            .ok_or_else(|| {
                Error::InvalidConfig(format!("unknown stochastic solver '{}'", self.solver))
            })?;
        let mut tuner = solver.tuner();

        let train_fold = Fold::train(fold);
        let valid_fold = Fold::valid(fold);
        let x0 = model.params();

        let mut objective = AccumulatorFunction::new(
            Accumulator::new(pool, &*model, loss),
            task,
            train_fold,
            self.batch,
        );
        let epoch_size = objective.summands();
        let params = StochParams::new(1, epoch_size, self.epsilon);

        for _ in 0..trials {
            let config = tuner.get();
            solver.from_json(&config)?;

            let state = solver.minimize(&params, &mut objective, &x0, None);
            let mut eval = AccumulatorFunction::new(
                Accumulator::new(pool, &*model, loss),
                task,
                valid_fold,
                self.batch,
            );
            let (valid_value, _) = eval.measure(&state.x);
            tuner.score(valid_value);

            info!("[tuning: valid = {:.6}, config = {}]", valid_value, config);
        }

        Ok(tuner.optimum())
    }
}
