//! Error kinds surfaced at the API boundary.
//!
//! Solvers never return errors: numerical trouble (divergence, line-search
//! failure, iteration budgets) is reported as a status on the returned
//! [`SolverState`][1]. The kinds below are programmer errors detected before
//! any iteration runs, plus I/O trouble while persisting results.
//!
//! [1]: ../solver/struct.SolverState.html

use thiserror::Error;

/// Errors reported by configuration parsing, shape validation and
/// persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed JSON configuration or an out-of-range parameter value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model, task and parameter shapes disagree.
    #[error("dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch {
        /// The size required by the consumer.
        expected: usize,
        /// The size actually supplied.
        found: usize,
    },

    /// Filesystem trouble while saving results.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV trouble while saving the training history.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::InvalidConfig(err.to_string())
    }
}

/// Convenience alias for results carrying [`Error`](enum.Error.html).
pub type Result<T> = std::result::Result<T, Error>;
