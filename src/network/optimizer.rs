//! Adam (Adaptive Moment Estimation) update rule.

use ndarray::{Array, Array1, Array2, Dimension, Zip};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// First and second moment estimates for one parameter tensor.
#[derive(Debug, Clone)]
struct Moments<D: Dimension> {
    m: Array<f64, D>,
    v: Array<f64, D>,
}

impl<D: Dimension> Moments<D> {
    fn zeros_like(param: &Array<f64, D>) -> Self {
        Self {
            m: Array::zeros(param.raw_dim()),
            v: Array::zeros(param.raw_dim()),
        }
    }

    fn step(&mut self, param: &mut Array<f64, D>, grad: &Array<f64, D>, lr: f64, t: i32) {
        self.m = &self.m * BETA1 + grad * (1.0 - BETA1);
        self.v = &self.v * BETA2 + &grad.mapv(|g| g * g) * (1.0 - BETA2);

        let bias1 = 1.0 - BETA1.powi(t);
        let bias2 = 1.0 - BETA2.powi(t);
        Zip::from(param)
            .and(&self.m)
            .and(&self.v)
            .for_each(|p, &m, &v| {
                *p -= lr * (m / bias1) / ((v / bias2).sqrt() + EPSILON);
            });
    }
}

/// Adam state for a stack of dense layers (one weight matrix and one bias
/// vector per layer).
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    t: i32,
    weights: Vec<Option<Moments<ndarray::Ix2>>>,
    biases: Vec<Option<Moments<ndarray::Ix1>>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            t: 0,
            weights: Vec::new(),
            biases: Vec::new(),
        }
    }

    /// Advance the step counter; call once per mini-batch before updating layers.
    pub fn begin_step(&mut self) {
        self.t += 1;
    }

    /// Apply one update to layer `idx`, allocating its moments on first use.
    pub fn update(
        &mut self,
        idx: usize,
        weights: &mut Array2<f64>,
        weight_grad: &Array2<f64>,
        biases: &mut Array1<f64>,
        bias_grad: &Array1<f64>,
    ) {
        if self.weights.len() <= idx {
            self.weights.resize_with(idx + 1, || None);
            self.biases.resize_with(idx + 1, || None);
        }
        let t = self.t.max(1);
        self.weights[idx]
            .get_or_insert_with(|| Moments::zeros_like(weights))
            .step(weights, weight_grad, self.learning_rate, t);
        self.biases[idx]
            .get_or_insert_with(|| Moments::zeros_like(biases))
            .step(biases, bias_grad, self.learning_rate, t);
    }
}
