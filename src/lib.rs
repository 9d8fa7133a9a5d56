//! Pipeline failure risk: CSV ingestion, min-max scaling and a small binary
//! classifier predicting the `failure` column of sensor data.
//!
//! The data layer (`data`) is pure and synchronous. `session` ties it to a
//! [`network::TrainableModel`] and a [`store::BlobStore`].

pub mod config;
pub mod data;
pub mod error;
pub mod network;
pub mod session;
pub mod store;

pub use config::{AppConfig, TrainingConfig};
pub use data::generator::ExampleGenerator;
pub use data::model::{FeatureSummary, NumericDataset, ParsedTable};
pub use data::normalize::NormalizationParams;
pub use error::{PipelineError, Result};
pub use network::{DenseClassifier, EpochReport, TrainableModel};
pub use session::{PreparedData, Session, TrainingEvent};
