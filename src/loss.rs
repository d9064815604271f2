//! The loss contract consumed by the training engine, plus reference
//! losses.
//!
//! A loss compares one target sample against one model output sample: it
//! produces the training value, its gradient with respect to the output
//! and the user-facing error metric.

/// A per-sample training objective.
pub trait Loss: Sync {
    /// Loss value for a target/output pair.
    fn value(&self, target: &[f64], output: &[f64]) -> f64;

    /// Gradient of the value with respect to the output, written into
    /// `grad` (same length as `output`).
    fn vgrad(&self, target: &[f64], output: &[f64], grad: &mut [f64]);

    /// User-facing error metric for a target/output pair.
    fn error(&self, target: &[f64], output: &[f64]) -> f64;
}

/// Squared error `½·‖output − target‖²`; the error metric is the
/// Euclidean distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareLoss;

impl Loss for SquareLoss {
    fn value(&self, target: &[f64], output: &[f64]) -> f64 {
        output
            .iter()
            .zip(target.iter())
            .map(|(o, t)| (o - t) * (o - t))
            .sum::<f64>()
            * 0.5
    }

    fn vgrad(&self, target: &[f64], output: &[f64], grad: &mut [f64]) {
        for (g, (o, t)) in grad.iter_mut().zip(output.iter().zip(target.iter())) {
            *g = o - t;
        }
    }

    fn error(&self, target: &[f64], output: &[f64]) -> f64 {
        (2.0 * self.value(target, output)).sqrt()
    }
}

/// One-vs-all logistic loss over ±1 class coding
/// `Σ ln(1 + exp(−target·output))`; the error metric is the
/// misclassification indicator on the top-scoring class.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticLoss;

fn softplus(z: f64) -> f64 {
    // ln(1 + e^z) without overflow
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

impl Loss for LogisticLoss {
    fn value(&self, target: &[f64], output: &[f64]) -> f64 {
        output
            .iter()
            .zip(target.iter())
            .map(|(o, t)| softplus(-t * o))
            .sum()
    }

    fn vgrad(&self, target: &[f64], output: &[f64], grad: &mut [f64]) {
        for (g, (o, t)) in grad.iter_mut().zip(output.iter().zip(target.iter())) {
            *g = -t / (1.0 + (t * o).exp());
        }
    }

    fn error(&self, target: &[f64], output: &[f64]) -> f64 {
        if argmax(output) == argmax(target) {
            0.0
        } else {
            1.0
        }
    }
}
