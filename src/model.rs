//! The model contract consumed by the training engine, plus an affine
//! reference model.
//!
//! A model maps input sample batches to output batches and backpropagates
//! gradients with respect to its parameters and its inputs. Models are
//! cloneable so the accumulator can keep one private copy per worker
//! thread.

use rand::distributions::{Distribution, Uniform};

use crate::tensor::{volume, Dims3, Tensor4};

/// A trainable feed-forward model.
pub trait Model: Send {
    /// Input sample dimensions.
    fn idims(&self) -> Dims3;

    /// Output sample dimensions.
    fn odims(&self) -> Dims3;

    /// Number of trainable parameters.
    fn psize(&self) -> usize;

    /// The current parameters as a flat vector.
    fn params(&self) -> Vec<f64>;

    /// Replace the parameters from a flat vector.
    fn set_params(&mut self, params: &[f64]);

    /// Re-initialize the parameters randomly.
    fn random(&mut self);

    /// Forward a batch of inputs; the result stays valid until the next
    /// call on this model.
    fn output(&mut self, input: &Tensor4) -> &Tensor4;

    /// Gradient of the batch-summed loss with respect to the parameters,
    /// given the gradient with respect to the last forwarded output.
    fn gparam(&mut self, grad_output: &Tensor4) -> &[f64];

    /// Gradient with respect to the last forwarded input.
    fn ginput(&mut self, grad_output: &Tensor4) -> &Tensor4;

    /// Clone this model behind a box.
    fn clone_box(&self) -> Box<dyn Model>;
}

/// Applies an affine transformation to the input data `y = W·x + b`.
///
/// Inputs and outputs of any rank are treated as flat vectors; the weight
/// matrix holds one row per output value, followed by the bias. Also known
/// as a fully-connected layer.
#[derive(Debug, Clone)]
pub struct AffineModel {
    idims: Dims3,
    odims: Dims3,
    params: Vec<f64>,

    input: Tensor4,
    output: Tensor4,
    ginput: Tensor4,
    pgrad: Vec<f64>,
}

impl AffineModel {
    /// Create a zero-initialized affine model.
    pub fn new(idims: Dims3, odims: Dims3) -> AffineModel {
        let psize = volume(odims) * (volume(idims) + 1);
        AffineModel {
            idims,
            odims,
            params: vec![0.0; psize],
            input: Tensor4::new(0, idims),
            output: Tensor4::new(0, odims),
            ginput: Tensor4::new(0, idims),
            pgrad: vec![0.0; psize],
        }
    }

    fn isize(&self) -> usize {
        volume(self.idims)
    }

    fn osize(&self) -> usize {
        volume(self.odims)
    }

    /// Weight row for one output value.
    fn row(&self, o: usize) -> &[f64] {
        let isize = self.isize();
        &self.params[o * isize..(o + 1) * isize]
    }

    fn bias(&self, o: usize) -> f64 {
        self.params[self.osize() * self.isize() + o]
    }
}

impl Model for AffineModel {
    fn idims(&self) -> Dims3 {
        self.idims
    }

    fn odims(&self) -> Dims3 {
        self.odims
    }

    fn psize(&self) -> usize {
        self.params.len()
    }

    fn params(&self) -> Vec<f64> {
        self.params.clone()
    }

    fn set_params(&mut self, params: &[f64]) {
        assert_eq!(params.len(), self.params.len());
        self.params.copy_from_slice(params);
    }

    fn random(&mut self) {
        // Glorot-style uniform initialization
        let bound = (6.0 / (self.isize() + self.osize()) as f64).sqrt();
        let range = Uniform::new_inclusive(-bound, bound);
        let mut rng = rand::thread_rng();
        for p in self.params.iter_mut() {
            *p = range.sample(&mut rng);
        }
    }

    fn output(&mut self, input: &Tensor4) -> &Tensor4 {
        assert_eq!(input.dims(), self.idims);

        self.input = input.clone();
        self.output = Tensor4::new(input.count(), self.odims);
        for s in 0..input.count() {
            let x = input.sample(s);
            for o in 0..self.osize() {
                let value = crate::math::dot(self.row(o), x) + self.bias(o);
                self.output.sample_mut(s)[o] = value;
            }
        }
        &self.output
    }

    fn gparam(&mut self, grad_output: &Tensor4) -> &[f64] {
        let isize = self.isize();
        let osize = self.osize();

        self.pgrad.iter_mut().for_each(|g| *g = 0.0);
        for s in 0..grad_output.count() {
            let go = grad_output.sample(s);
            let x = self.input.sample(s);
            for o in 0..osize {
                let row = &mut self.pgrad[o * isize..(o + 1) * isize];
                crate::math::axpy(go[o], x, row);
                self.pgrad[osize * isize + o] += go[o];
            }
        }
        &self.pgrad
    }

    fn ginput(&mut self, grad_output: &Tensor4) -> &Tensor4 {
        self.ginput = Tensor4::new(grad_output.count(), self.idims);
        for s in 0..grad_output.count() {
            let go = grad_output.sample(s);
            for o in 0..self.osize() {
                let row = self.row(o).to_vec();
                crate::math::axpy(go[o], &row, self.ginput.sample_mut(s));
            }
        }
        &self.ginput
    }

    fn clone_box(&self) -> Box<dyn Model> {
        Box::new(self.clone())
    }
}
