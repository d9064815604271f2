#![deny(missing_docs,
        trivial_casts, trivial_numeric_casts,
        unused_import_braces, unused_qualifications)]

//! Sprout is a numerical-optimization and machine-learning framework
//! built around two engines: a library of batch and stochastic solvers
//! over differentiable objectives, and a training driver that feeds
//! models, losses and tasks through those solvers.

/// Precision helpers and slice kernels
pub mod math;
/// Contiguous sample buffers
pub mod tensor;
/// The worker pool and its indexed parallel-for
pub mod thread_pool;
/// Error kinds at the API boundary
pub mod error;
/// The differentiable objective abstraction
pub mod function;
/// Benchmark objectives
pub mod functions;
/// Running averages for the stochastic solvers
pub mod momentum;
/// The line-search subsystem
pub mod lsearch;
/// The solver generics and interfaces
pub mod solver;
/// The specific solvers
pub mod solvers;
/// Hyper-parameter search
pub mod tuner;
/// The model contract and the affine reference model
pub mod model;
/// The loss contract and reference losses
pub mod loss;
/// The task contract and the synthetic task
pub mod task;
/// The parallel loss/gradient accumulator
pub mod accumulator;
/// Training history and early stopping
pub mod trainer;
/// The training drivers
pub mod trainers;
