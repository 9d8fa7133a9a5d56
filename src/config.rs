use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PIPELINE_RISK_CONFIG";
/// Config file looked up in the working directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "pipeline-risk.json";

// ---------------------------------------------------------------------------
// Training hyperparameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Fixed seed for weight init and shuffling; `None` is non-deterministic.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 32,
            learning_rate: 0.01,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.epochs == 0 {
            return Err(PipelineError::MalformedInput("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::MalformedInput(
                "batch size must be at least 1".into(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(PipelineError::MalformedInput(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the target column.
    pub label_column: String,
    /// Directory backing the model blob store.
    pub store_dir: PathBuf,
    /// Rows produced by "Example CSV".
    pub example_rows: usize,
    pub example_seed: Option<u64>,
    pub training: TrainingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            label_column: "failure".to_string(),
            store_dir: PathBuf::from("model-store"),
            example_rows: 1000,
            example_seed: None,
            training: TrainingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `$PIPELINE_RISK_CONFIG`, falling back to `./pipeline-risk.json`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load(&path)
    }
}
