//! Feed-forward binary classifier: Dense(32, ReLU) → Dense(16, ReLU) →
//! Dense(1, Sigmoid), trained with Adam on binary cross-entropy.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::optimizer::Adam;
use super::{EpochReport, TrainableModel};
use crate::error::{PipelineError, Result};

/// Hidden layer widths.
const HIDDEN_SIZES: [usize; 2] = [32, 16];
/// Probabilities are clipped away from 0 and 1 before taking logs.
const LOSS_EPSILON: f64 = 1e-7;
const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DenseLayer {
    /// (input_size x output_size)
    weights: Array2<f64>,
    biases: Array1<f64>,
    activation: Activation,
}

impl DenseLayer {
    /// Xavier/Glorot uniform initialization, zero biases.
    fn new(input_size: usize, output_size: usize, activation: Activation, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (input_size + output_size) as f64).sqrt();
        Self {
            weights: Array2::random_using((input_size, output_size), Uniform::new(-limit, limit), rng),
            biases: Array1::zeros(output_size),
            activation,
        }
    }

    fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        let z = input.dot(&self.weights) + &self.biases;
        self.activation.apply(&z)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Mean binary cross-entropy of predictions `p` against targets `y` (both n x 1).
fn binary_cross_entropy(p: &Array2<f64>, y: &Array2<f64>) -> f64 {
    let n = p.len().max(1) as f64;
    let total: f64 = p
        .iter()
        .zip(y.iter())
        .map(|(&p, &y)| {
            let p = p.clamp(LOSS_EPSILON, 1.0 - LOSS_EPSILON);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / n
}

fn count_correct(p: &Array2<f64>, y: &Array2<f64>) -> usize {
    p.iter()
        .zip(y.iter())
        .filter(|&(&p, &y)| (p >= DECISION_THRESHOLD) == (y >= DECISION_THRESHOLD))
        .count()
}

// ---------------------------------------------------------------------------
// DenseClassifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseClassifier {
    input_dim: usize,
    learning_rate: f64,
    layers: Vec<DenseLayer>,
    #[serde(skip)]
    seed: Option<u64>,
    #[serde(skip, default = "default_optimizer")]
    optimizer: Adam,
}

fn default_optimizer() -> Adam {
    Adam::new(0.01)
}

impl DenseClassifier {
    /// Activations of every layer for a batch, input first.
    fn forward_all(&self, input: &Array2<f64>) -> Vec<Array2<f64>> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.clone());
        for layer in &self.layers {
            let next = layer.forward(activations.last().unwrap_or(input));
            activations.push(next);
        }
        activations
    }

    /// One Adam step on a mini-batch. Returns the batch predictions made
    /// before the update.
    fn train_batch(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Array2<f64> {
        let activations = self.forward_all(x);
        let output = activations[activations.len() - 1].clone();
        let batch = x.nrows().max(1) as f64;

        // sigmoid + cross-entropy: dL/dz = (p - y) / n
        let mut delta = (&output - y) / batch;

        self.optimizer.begin_step();
        for idx in (0..self.layers.len()).rev() {
            let input = &activations[idx];
            let weight_grad = input.t().dot(&delta);
            let bias_grad = delta.sum_axis(Axis(0));

            let next_delta = (idx > 0).then(|| {
                let upstream = delta.dot(&self.layers[idx].weights.t());
                // previous layer is ReLU; its derivative is 1 where it fired
                let fired = activations[idx].mapv(|a| if a > 0.0 { 1.0 } else { 0.0 });
                upstream * fired
            });

            let layer = &mut self.layers[idx];
            self.optimizer.update(
                idx,
                &mut layer.weights,
                &weight_grad,
                &mut layer.biases,
                &bias_grad,
            );

            if let Some(next) = next_delta {
                delta = next;
            }
        }

        output
    }

    fn check_layers(&self) -> Result<()> {
        let mut width = self.input_dim;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.weights.nrows() != width || layer.biases.len() != layer.weights.ncols() {
                return Err(PipelineError::Model(format!(
                    "layer {i} has shape {:?} but expected {width} inputs",
                    layer.weights.dim()
                )));
            }
            width = layer.weights.ncols();
        }
        if width != 1 {
            return Err(PipelineError::Model(format!(
                "model output width is {width}, expected 1"
            )));
        }
        Ok(())
    }
}

impl TrainableModel for DenseClassifier {
    fn create(input_dim: usize, learning_rate: f64, seed: Option<u64>) -> Self {
        let mut rng = seeded_rng(seed);
        let mut layers = Vec::with_capacity(HIDDEN_SIZES.len() + 1);
        let mut width = input_dim;
        for &size in &HIDDEN_SIZES {
            layers.push(DenseLayer::new(width, size, Activation::Relu, &mut rng));
            width = size;
        }
        layers.push(DenseLayer::new(width, 1, Activation::Sigmoid, &mut rng));

        Self {
            input_dim,
            learning_rate,
            layers,
            seed,
            optimizer: Adam::new(learning_rate),
        }
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        epochs: usize,
        batch_size: usize,
        on_epoch: &mut dyn FnMut(&EpochReport),
    ) -> Result<Vec<EpochReport>> {
        if x.ncols() != self.input_dim {
            return Err(PipelineError::Model(format!(
                "training data has {} features, model expects {}",
                x.ncols(),
                self.input_dim
            )));
        }
        if x.nrows() != y.len() {
            return Err(PipelineError::Model(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        self.optimizer.learning_rate = self.learning_rate;
        let mut rng = seeded_rng(self.seed.map(|s| s.wrapping_add(1)));
        let mut order: Vec<usize> = (0..x.nrows()).collect();
        let batch_size = batch_size.max(1);
        let n = x.nrows() as f64;
        let mut history = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            order.shuffle(&mut rng);
            let mut loss_sum = 0.0;
            let mut correct = 0usize;

            for chunk in order.chunks(batch_size) {
                let xb = x.select(Axis(0), chunk);
                let yb = y.select(Axis(0), chunk).insert_axis(Axis(1));
                let predictions = self.train_batch(&xb, &yb);
                loss_sum += binary_cross_entropy(&predictions, &yb) * chunk.len() as f64;
                correct += count_correct(&predictions, &yb);
            }

            let report = EpochReport {
                epoch,
                loss: loss_sum / n,
                accuracy: correct as f64 / n,
            };
            on_epoch(&report);
            history.push(report);
        }

        Ok(history)
    }

    fn predict(&self, sample: &[f64]) -> Result<f64> {
        if sample.len() != self.input_dim {
            return Err(PipelineError::InvalidPredictionInput(format!(
                "expected {} values, got {}",
                self.input_dim,
                sample.len()
            )));
        }
        let input = Array2::from_shape_vec((1, self.input_dim), sample.to_vec())
            .map_err(|e| PipelineError::Model(e.to_string()))?;
        let activations = self.forward_all(&input);
        activations
            .last()
            .and_then(|out| out.iter().next().copied())
            .ok_or_else(|| PipelineError::Model("model produced no output".into()))
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| PipelineError::Model(format!("serializing model: {e}")))
    }

    fn deserialize(blob: &[u8]) -> Result<Self> {
        let mut model: DenseClassifier = serde_json::from_slice(blob)
            .map_err(|e| PipelineError::Model(format!("deserializing model: {e}")))?;
        model.check_layers()?;
        model.optimizer = Adam::new(model.learning_rate);
        Ok(model)
    }
}
