//! Training drivers composing accumulator, solver and result tracking.
//!
//! A trainer owns the control flow of one training run: it wraps a task
//! fold and a model into an [Accumulator](../accumulator/index.html),
//! hands the resulting objective to a solver, measures the validation and
//! test folds at every epoch snapshot and feeds a
//! [TrainerResult](../trainer/struct.TrainerResult.html) that decides when
//! to stop and which parameters to keep.

mod batch;
mod stochastic;

pub use self::batch::BatchTrainer;
pub use self::stochastic::StochasticTrainer;

use crate::error::{Error, Result};
use crate::model::Model;
use crate::task::Task;
use crate::tensor::volume;

/// Check that model and task agree on the sample shapes.
pub(crate) fn check_dims(model: &dyn Model, task: &dyn Task) -> Result<()> {
    if model.idims() != task.idims() {
        return Err(Error::DimensionMismatch {
            expected: volume(task.idims()),
            found: volume(model.idims()),
        });
    }
    if model.odims() != task.odims() {
        return Err(Error::DimensionMismatch {
            expected: volume(task.odims()),
            found: volume(model.odims()),
        });
    }
    Ok(())
}
