//! The task contract consumed by the training engine, plus a synthetic
//! affine classification task.
//!
//! A task serves labelled sample minibatches out of per-fold subsets
//! (train, validation, test) and can reshuffle the sample order of a fold
//! between epochs.

use std::fmt;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::tensor::{Dims3, Tensor4};

/// The role of a fold subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Samples used for optimization.
    Train,
    /// Samples used for model selection.
    Valid,
    /// Samples used for the final evaluation.
    Test,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Protocol::Train => write!(f, "train"),
            Protocol::Valid => write!(f, "valid"),
            Protocol::Test => write!(f, "test"),
        }
    }
}

/// A labelled subset of a task: fold index plus protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    /// Fold index in `[0, fsize)`.
    pub index: usize,
    /// Subset role.
    pub protocol: Protocol,
}

impl Fold {
    /// The training subset of fold `index`.
    pub fn train(index: usize) -> Fold {
        Fold {
            index,
            protocol: Protocol::Train,
        }
    }

    /// The validation subset of fold `index`.
    pub fn valid(index: usize) -> Fold {
        Fold {
            index,
            protocol: Protocol::Valid,
        }
    }

    /// The test subset of fold `index`.
    pub fn test(index: usize) -> Fold {
        Fold {
            index,
            protocol: Protocol::Test,
        }
    }
}

/// A contiguous block of samples handed to models and losses.
#[derive(Debug, Clone)]
pub struct Minibatch {
    /// Input samples.
    pub input: Tensor4,
    /// Target samples.
    pub target: Tensor4,
}

/// A source of labelled samples split into folds.
pub trait Task: Sync {
    /// Input sample dimensions.
    fn idims(&self) -> Dims3;

    /// Output sample dimensions.
    fn odims(&self) -> Dims3;

    /// Number of folds.
    fn fsize(&self) -> usize;

    /// Number of samples in a fold subset.
    fn size(&self, fold: Fold) -> usize;

    /// Copy samples `[begin, end)` of the fold, in its current order.
    fn get(&self, fold: Fold, begin: usize, end: usize) -> Minibatch;

    /// Reshuffle the sample order of the fold.
    fn shuffle(&self, fold: Fold);
}

/// A synthetic classification task: the class of a sample is the
/// top-scoring output of a hidden affine map, targets use ±1 coding.
#[derive(Debug)]
pub struct SynthAffineTask {
    idims: Dims3,
    odims: Dims3,
    inputs: Tensor4,
    targets: Tensor4,
    splits: [Vec<usize>; 3],
    orders: [Mutex<Vec<usize>>; 3],
    rng: Mutex<StdRng>,
}

impl SynthAffineTask {
    /// Generate `count` samples of dimension `isize` over `osize` classes
    /// from the given seed, split 60/20/20 into train/valid/test.
    pub fn new(isize: usize, osize: usize, count: usize, seed: u64) -> SynthAffineTask {
        let idims = (isize, 1, 1);
        let odims = (osize, 1, 1);
        let mut rng = StdRng::seed_from_u64(seed);

        // hidden ground-truth affine map
        let weights: Vec<f64> = (0..osize * (isize + 1))
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();

        let mut inputs = Tensor4::new(count, idims);
        let mut targets = Tensor4::new(count, odims);
        for s in 0..count {
            for value in inputs.sample_mut(s).iter_mut() {
                *value = rng.gen_range(-1.0..1.0);
            }

            let mut best = 0;
            let mut best_score = f64::NEG_INFINITY;
            for o in 0..osize {
                let row = &weights[o * isize..(o + 1) * isize];
                let score =
                    crate::math::dot(row, inputs.sample(s)) + weights[osize * isize + o];
                if score > best_score {
                    best_score = score;
                    best = o;
                }
            }
            for (o, target) in targets.sample_mut(s).iter_mut().enumerate() {
                *target = if o == best { 1.0 } else { -1.0 };
            }
        }

        // 60/20/20 split in generation order
        let train_end = count * 6 / 10;
        let valid_end = count * 8 / 10;
        let splits = [
            (0..train_end).collect::<Vec<usize>>(),
            (train_end..valid_end).collect::<Vec<usize>>(),
            (valid_end..count).collect::<Vec<usize>>(),
        ];
        let orders = [
            Mutex::new(splits[0].clone()),
            Mutex::new(splits[1].clone()),
            Mutex::new(splits[2].clone()),
        ];

        SynthAffineTask {
            idims,
            odims,
            inputs,
            targets,
            splits,
            orders,
            rng: Mutex::new(rng),
        }
    }

    fn slot(protocol: Protocol) -> usize {
        match protocol {
            Protocol::Train => 0,
            Protocol::Valid => 1,
            Protocol::Test => 2,
        }
    }
}

impl Task for SynthAffineTask {
    fn idims(&self) -> Dims3 {
        self.idims
    }

    fn odims(&self) -> Dims3 {
        self.odims
    }

    fn fsize(&self) -> usize {
        1
    }

    fn size(&self, fold: Fold) -> usize {
        self.splits[Self::slot(fold.protocol)].len()
    }

    fn get(&self, fold: Fold, begin: usize, end: usize) -> Minibatch {
        let order = self.orders[Self::slot(fold.protocol)].lock().unwrap();

        let mut batch = Minibatch {
            input: Tensor4::new(end - begin, self.idims),
            target: Tensor4::new(end - begin, self.odims),
        };
        for (i, &sample) in order[begin..end].iter().enumerate() {
            batch
                .input
                .sample_mut(i)
                .copy_from_slice(self.inputs.sample(sample));
            batch
                .target
                .sample_mut(i)
                .copy_from_slice(self.targets.sample(sample));
        }
        batch
    }

    fn shuffle(&self, fold: Fold) {
        let mut order = self.orders[Self::slot(fold.protocol)].lock().unwrap();
        let mut rng = self.rng.lock().unwrap();
        order.shuffle(&mut *rng);
    }
}
