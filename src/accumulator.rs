//! Aggregates per-sample loss values and gradients across a task fold,
//! turning (model, loss, task, λ) into a
//! [Function](../function/trait.Function.html) the solvers can minimize.
//!
//! Samples are distributed over the thread pool; every worker owns a
//! private model clone and scratch accumulators, so no numerical state is
//! shared mutably between workers and the reduced result is independent of
//! the worker count.

use std::sync::Mutex;

use crate::function::Function;
use crate::loss::Loss;
use crate::math;
use crate::model::Model;
use crate::task::{Fold, Task};
use crate::tensor::Tensor4;
use crate::thread_pool::ThreadPool;

/// What the accumulator computes on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Loss values and errors only.
    Value,
    /// Loss values, errors and the parameter gradient.
    VGrad,
}

/// Regularization applied on top of the averaged loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Plain average.
    Average,
    /// Average plus `λ/2·‖θ‖²`.
    AverageL2,
    /// Average plus the loss-variance penalty
    /// `λ·(N·Σl² − (Σl)²)/N²`.
    AverageVariance,
}

/// Per-worker scratch: a private model clone plus running sums.
struct Worker {
    model: Box<dyn Model>,
    count: f64,
    vsum: f64,
    v2sum: f64,
    esum: f64,
    gsum: Vec<f64>,
    /// `Σ l_i·∇l_i`, needed by the variance criterion.
    g2sum: Vec<f64>,
}

impl Worker {
    fn reset(&mut self, psize: usize, params: &[f64]) {
        self.model.set_params(params);
        self.count = 0.0;
        self.vsum = 0.0;
        self.v2sum = 0.0;
        self.esum = 0.0;
        self.gsum.clear();
        self.gsum.resize(psize, 0.0);
        self.g2sum.clear();
        self.g2sum.resize(psize, 0.0);
    }
}

/// Parallel accumulator of loss values, errors and gradients.
pub struct Accumulator<'a> {
    pool: &'a ThreadPool,
    loss: &'a dyn Loss,
    workers: Vec<Mutex<Worker>>,

    psize: usize,
    params: Vec<f64>,
    mode: Mode,
    criterion: Criterion,
    lambda: f64,
    minibatch: usize,

    count: f64,
    vsum: f64,
    v2sum: f64,
    esum: f64,
    gsum: Vec<f64>,
    g2sum: Vec<f64>,
}

impl<'a> Accumulator<'a> {
    /// Create an accumulator; the model is cloned once per pool worker.
    pub fn new(pool: &'a ThreadPool, model: &dyn Model, loss: &'a dyn Loss) -> Accumulator<'a> {
        let psize = model.psize();
        let workers = (0..pool.workers())
            .map(|_| {
                Mutex::new(Worker {
                    model: model.clone_box(),
                    count: 0.0,
                    vsum: 0.0,
                    v2sum: 0.0,
                    esum: 0.0,
                    gsum: vec![0.0; psize],
                    g2sum: vec![0.0; psize],
                })
            })
            .collect();

        Accumulator {
            pool,
            loss,
            workers,
            psize,
            params: model.params(),
            mode: Mode::Value,
            criterion: Criterion::Average,
            lambda: 0.0,
            minibatch: 32,
            count: 0.0,
            vsum: 0.0,
            v2sum: 0.0,
            esum: 0.0,
            gsum: vec![0.0; psize],
            g2sum: vec![0.0; psize],
        }
    }

    /// Number of trainable parameters.
    pub fn psize(&self) -> usize {
        self.psize
    }

    /// The parameters evaluations run at.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Replace the evaluation parameters.
    pub fn set_params(&mut self, params: &[f64]) {
        assert_eq!(params.len(), self.psize);
        self.params.copy_from_slice(params);
    }

    /// Select value-only or value+gradient accumulation.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Select the regularization criterion and its strength.
    pub fn set_criterion(&mut self, criterion: Criterion, lambda: f64) {
        self.criterion = criterion;
        self.lambda = lambda;
    }

    /// Whether the active criterion reacts to λ.
    pub fn can_regularize(&self) -> bool {
        self.criterion != Criterion::Average
    }

    /// Maximum samples handed to a worker per tile.
    pub fn set_minibatch(&mut self, minibatch: usize) {
        self.minibatch = minibatch.max(1);
    }

    /// Accumulate over a whole fold.
    pub fn update(&mut self, task: &dyn Task, fold: Fold) {
        let size = task.size(fold);
        self.update_range(task, fold, 0, size);
    }

    /// Accumulate over the samples `[begin, end)` of a fold.
    pub fn update_range(&mut self, task: &dyn Task, fold: Fold, begin: usize, end: usize) {
        for worker in self.workers.iter() {
            worker.lock().unwrap().reset(self.psize, &self.params);
        }

        let grad = self.mode == Mode::VGrad;
        let variance = self.criterion == Criterion::AverageVariance;
        let loss = self.loss;
        let workers = &self.workers;
        let odims = task.odims();

        self.pool
            .loopit(end - begin, self.minibatch, |b, e, worker_idx| {
                let mut slot = workers[worker_idx].lock().unwrap();
                let slot = &mut *slot;
                let mut gout = Tensor4::new(1, odims);

                for i in (begin + b)..(begin + e) {
                    let batch = task.get(fold, i, i + 1);
                    let output = slot.model.output(&batch.input);
                    let target = batch.target.sample(0);
                    let value = loss.value(target, output.sample(0));
                    let error = loss.error(target, output.sample(0));
                    if grad {
                        loss.vgrad(target, output.sample(0), gout.sample_mut(0));
                    }

                    slot.count += 1.0;
                    slot.vsum += value;
                    slot.v2sum += value * value;
                    slot.esum += error;
                    if grad {
                        let pgrad = slot.model.gparam(&gout);
                        math::axpy(1.0, pgrad, &mut slot.gsum);
                        if variance {
                            math::axpy(value, pgrad, &mut slot.g2sum);
                        }
                    }
                }
            });

        // reduce the per-worker sums
        self.count = 0.0;
        self.vsum = 0.0;
        self.v2sum = 0.0;
        self.esum = 0.0;
        self.gsum.iter_mut().for_each(|g| *g = 0.0);
        self.g2sum.iter_mut().for_each(|g| *g = 0.0);
        for worker in self.workers.iter() {
            let slot = worker.lock().unwrap();
            self.count += slot.count;
            self.vsum += slot.vsum;
            self.v2sum += slot.v2sum;
            self.esum += slot.esum;
            math::axpy(1.0, &slot.gsum, &mut self.gsum);
            math::axpy(1.0, &slot.g2sum, &mut self.g2sum);
        }
    }

    /// Number of samples accumulated by the last update.
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// The averaged loss value including the regularization term.
    pub fn value(&self) -> f64 {
        let avg = self.vsum / self.count;
        match self.criterion {
            Criterion::Average => avg,
            Criterion::AverageL2 => avg + 0.5 * self.lambda * math::squared_norm(&self.params),
            Criterion::AverageVariance => {
                avg + self.lambda * (self.count * self.v2sum - self.vsum * self.vsum)
                    / (self.count * self.count)
            }
        }
    }

    /// The averaged error metric.
    pub fn error(&self) -> f64 {
        self.esum / self.count
    }

    /// The averaged gradient including the regularization term.
    pub fn vgrad(&self) -> Vec<f64> {
        let mut grad = self.gsum.clone();
        math::scal(1.0 / self.count, &mut grad);
        match self.criterion {
            Criterion::Average => {}
            Criterion::AverageL2 => math::axpy(self.lambda, &self.params, &mut grad),
            Criterion::AverageVariance => {
                // ∇ of the variance penalty: 2λ·(N·Σl·∇l − Σl·Σ∇l)/N²
                let scale = 2.0 * self.lambda / (self.count * self.count);
                math::axpy(scale * self.count, &self.g2sum, &mut grad);
                math::axpy(-scale * self.vsum, &self.gsum, &mut grad);
            }
        }
        grad
    }
}

impl std::fmt::Debug for Accumulator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Accumulator(psize = {}, workers = {}, mode = {:?}, criterion = {:?})",
            self.psize,
            self.workers.len(),
            self.mode,
            self.criterion
        )
    }
}

/// A task fold seen through an accumulator as a differentiable objective.
///
/// The deterministic `eval` covers the whole fold; the stochastic protocol
/// walks minibatches in the fold's current order and reshuffles when the
/// cursor wraps.
pub struct AccumulatorFunction<'a> {
    accumulator: Accumulator<'a>,
    task: &'a dyn Task,
    fold: Fold,
    batch: usize,
    cursor: usize,
}

impl<'a> AccumulatorFunction<'a> {
    /// Wrap a fold of `task` with minibatch size `batch`.
    pub fn new(
        accumulator: Accumulator<'a>,
        task: &'a dyn Task,
        fold: Fold,
        batch: usize,
    ) -> AccumulatorFunction<'a> {
        AccumulatorFunction {
            accumulator,
            task,
            fold,
            batch: batch.max(1),
            cursor: 0,
        }
    }

    /// The wrapped accumulator.
    pub fn accumulator(&self) -> &Accumulator<'a> {
        &self.accumulator
    }

    /// Evaluate value and error metric at `x` over the whole fold.
    pub fn measure(&mut self, x: &[f64]) -> (f64, f64) {
        self.accumulator.set_params(x);
        self.accumulator.set_mode(Mode::Value);
        self.accumulator.update(self.task, self.fold);
        (self.accumulator.value(), self.accumulator.error())
    }
}

impl Function for AccumulatorFunction<'_> {
    fn size(&self) -> usize {
        self.accumulator.psize()
    }

    fn eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
        self.accumulator.set_params(x);
        self.accumulator
            .set_mode(if gx.is_some() { Mode::VGrad } else { Mode::Value });
        self.accumulator.update(self.task, self.fold);
        if let Some(gx) = gx {
            gx.copy_from_slice(&self.accumulator.vgrad());
        }
        self.accumulator.value()
    }

    fn stoch_eval(&mut self, x: &[f64], gx: Option<&mut [f64]>) -> f64 {
        let size = self.task.size(self.fold);
        let end = (self.cursor + self.batch).min(size);

        self.accumulator.set_params(x);
        self.accumulator
            .set_mode(if gx.is_some() { Mode::VGrad } else { Mode::Value });
        self.accumulator
            .update_range(self.task, self.fold, self.cursor, end);
        if let Some(gx) = gx {
            gx.copy_from_slice(&self.accumulator.vgrad());
        }
        self.accumulator.value()
    }

    fn stoch_next(&mut self) {
        self.cursor += self.batch;
        if self.cursor >= self.task.size(self.fold) {
            self.cursor = 0;
            self.task.shuffle(self.fold);
        }
    }

    fn summands(&self) -> usize {
        self.task.size(self.fold).div_ceil(self.batch)
    }
}
