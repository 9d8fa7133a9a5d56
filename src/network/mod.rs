//! Trainable-model seam.
//!
//! The session only assembles inputs for a model and consumes its outputs;
//! any backend implementing [`TrainableModel`] can be plugged in. The bundled
//! backend is [`DenseClassifier`], a small feed-forward binary classifier.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod classifier;
pub mod optimizer;

pub use classifier::DenseClassifier;

/// Metrics reported after each completed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// Zero-based epoch index.
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
}

/// A binary classifier that can be trained, queried and persisted.
pub trait TrainableModel: Send + Sized {
    /// Fresh, untrained model for `input_dim` features.
    fn create(input_dim: usize, learning_rate: f64, seed: Option<u64>) -> Self;

    fn input_dim(&self) -> usize;

    /// Train on scaled features `x` and labels `y`.
    ///
    /// `on_epoch` is called exactly once per completed epoch, in ascending
    /// epoch order.
    fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        epochs: usize,
        batch_size: usize,
        on_epoch: &mut dyn FnMut(&EpochReport),
    ) -> Result<Vec<EpochReport>>;

    /// Probability in [0, 1] that `sample` (already scaled) is positive.
    fn predict(&self, sample: &[f64]) -> Result<f64>;

    fn serialize(&self) -> Result<Vec<u8>>;

    fn deserialize(blob: &[u8]) -> Result<Self>;
}
