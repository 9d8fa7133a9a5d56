use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use ndarray::Array2;

use crate::config::TrainingConfig;
use crate::data::generator::ExampleGenerator;
use crate::data::matrix::{build_dataset, coerce_number};
use crate::data::model::{FeatureSummary, NumericDataset, ParsedTable};
use crate::data::normalize::{normalize, NormalizationParams};
use crate::data::parser::parse_csv;
use crate::data::stats::matrix_stats;
use crate::error::{PipelineError, Result};
use crate::network::{DenseClassifier, EpochReport, TrainableModel};
use crate::store::{BlobStore, MODEL_KEY};

// ---------------------------------------------------------------------------
// PreparedData – immutable training snapshot
// ---------------------------------------------------------------------------

/// Everything derived by one prepare action. Replaced wholesale by the next
/// one, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub label: String,
    /// Feature columns in header order (label excluded).
    pub feature_names: Vec<String>,
    /// Unscaled numeric rows that survived coercion.
    pub raw: NumericDataset,
    /// `raw.x` min-max scaled with `params`.
    pub scaled: Array2<f64>,
    pub params: NormalizationParams,
    /// Statistics over `raw.x`, one per feature.
    pub stats: Vec<FeatureSummary>,
}

impl PreparedData {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Turn a parsed table into a training snapshot.
pub fn prepare_table(table: &ParsedTable, label: &str) -> Result<PreparedData> {
    if !table.has_column(label) {
        return Err(PipelineError::MalformedInput(format!(
            "CSV must include \"{label}\" column"
        )));
    }

    let feature_names = table.feature_names(label);
    let raw = build_dataset(&table.rows, &feature_names, label);
    if raw.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let normalized = normalize(&raw.x);
    let stats = matrix_stats(&raw.x);

    Ok(PreparedData {
        label: label.to_string(),
        feature_names,
        raw,
        scaled: normalized.x,
        params: normalized.params,
        stats,
    })
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Train a fresh model on a snapshot.
///
/// Input dimension is the snapshot's feature count. `on_epoch` sees every
/// epoch in ascending order.
pub fn train_snapshot<M: TrainableModel>(
    data: &PreparedData,
    config: &TrainingConfig,
    mut on_epoch: impl FnMut(&EpochReport),
) -> Result<(M, Vec<EpochReport>)> {
    config.validate()?;
    if data.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let mut model = M::create(data.feature_names.len(), config.learning_rate, config.seed);
    log::info!(
        "Training started: {} rows, {} features, {} epochs, batch {}",
        data.len(),
        data.feature_names.len(),
        config.epochs,
        config.batch_size
    );

    let history = model.fit(
        &data.scaled,
        &data.raw.y,
        config.epochs,
        config.batch_size,
        &mut |report: &EpochReport| {
            log::info!(
                "Epoch {} - loss: {:.4} acc: {:.3}",
                report.epoch + 1,
                report.loss,
                report.accuracy
            );
            on_epoch(report);
        },
    )?;

    log::info!("Training complete.");
    Ok((model, history))
}

/// Progress of a background training run.
#[derive(Debug)]
pub enum TrainingEvent<M> {
    Epoch(EpochReport),
    Finished(M),
    Failed(PipelineError),
}

/// Run [`train_snapshot`] on a worker thread.
///
/// The receiver yields one `Epoch` per completed epoch followed by exactly
/// one `Finished` or `Failed`.
pub fn spawn_training<M>(data: Arc<PreparedData>, config: TrainingConfig) -> Receiver<TrainingEvent<M>>
where
    M: TrainableModel + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let epoch_tx = tx.clone();
        let outcome = train_snapshot::<M>(&data, &config, |report| {
            // receiver gone means the UI stopped listening; keep training anyway
            let _ = epoch_tx.send(TrainingEvent::Epoch(*report));
        });
        let last = match outcome {
            Ok((model, _)) => TrainingEvent::Finished(model),
            Err(e) => TrainingEvent::Failed(e),
        };
        let _ = tx.send(last);
    });
    rx
}

/// Read one prediction input per feature as finite numbers.
pub fn parse_prediction_inputs<S: AsRef<str>>(inputs: &[S], feature_names: &[String]) -> Result<Vec<f64>> {
    if inputs.len() != feature_names.len() {
        return Err(PipelineError::InvalidPredictionInput(format!(
            "expected {} values, got {}",
            feature_names.len(),
            inputs.len()
        )));
    }
    inputs
        .iter()
        .zip(feature_names)
        .map(|(raw, name)| {
            coerce_number(raw.as_ref()).ok_or_else(|| {
                PipelineError::InvalidPredictionInput(format!(
                    "'{}' is not a number for feature {name}",
                    raw.as_ref()
                ))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Session – explicit context shared by all user actions
// ---------------------------------------------------------------------------

/// Current table, training snapshot and model.
///
/// Loading replaces the table; preparing replaces the snapshot; training or
/// loading replaces the model. Nothing is merged.
#[derive(Debug)]
pub struct Session<M: TrainableModel = DenseClassifier> {
    label: String,
    table: Option<ParsedTable>,
    prepared: Option<Arc<PreparedData>>,
    model: Option<M>,
}

impl<M: TrainableModel> Default for Session<M> {
    fn default() -> Self {
        Self::new("failure")
    }
}

impl<M: TrainableModel> Session<M> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            table: None,
            prepared: None,
            model: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn table(&self) -> Option<&ParsedTable> {
        self.table.as_ref()
    }

    pub fn prepared(&self) -> Option<&Arc<PreparedData>> {
        self.prepared.as_ref()
    }

    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Replace the current table. Returns its headers.
    pub fn load_table(&mut self, table: ParsedTable) -> &[String] {
        log::info!("CSV loaded - headers: {}", table.headers.join(", "));
        &self.table.insert(table).headers
    }

    pub fn load_text(&mut self, text: &str) -> &[String] {
        self.load_table(parse_csv(text))
    }

    /// Replace the current table with generated example data.
    pub fn load_example(&mut self, generator: &ExampleGenerator) -> anyhow::Result<&[String]> {
        let text = generator.generate()?;
        log::info!("Example CSV generated ({} rows)", generator.rows);
        Ok(self.load_text(&text))
    }

    /// Build, validate and scale the current table into a new snapshot.
    pub fn prepare(&mut self) -> Result<Arc<PreparedData>> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| PipelineError::NotPrepared("no CSV loaded".into()))?;

        let prepared = Arc::new(prepare_table(table, &self.label)?);
        let dropped = table.len() - prepared.len();
        if dropped > 0 {
            log::warn!("{dropped} rows dropped during numeric conversion");
        }
        log::info!("Parsed and prepared train data. Rows: {}", prepared.len());

        self.prepared = Some(Arc::clone(&prepared));
        Ok(prepared)
    }

    /// Train a new model on the current snapshot and install it.
    pub fn train(
        &mut self,
        config: &TrainingConfig,
        on_epoch: impl FnMut(&EpochReport),
    ) -> Result<Vec<EpochReport>> {
        let prepared = self
            .prepared
            .as_ref()
            .ok_or_else(|| PipelineError::NotPrepared("parse CSV first".into()))?;
        let (model, history) = train_snapshot::<M>(prepared, config, on_epoch)?;
        self.model = Some(model);
        Ok(history)
    }

    /// Replace the current model (e.g. after background training).
    pub fn install_model(&mut self, model: M) {
        self.model = Some(model);
    }

    pub fn reset_model(&mut self) {
        self.model = None;
        log::info!("Model reset");
    }

    /// Failure probability for one row of raw (unscaled) feature values.
    ///
    /// Values are scaled with the current snapshot's training ranges.
    pub fn predict<S: AsRef<str>>(&self, inputs: &[S]) -> Result<f64> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| PipelineError::ModelUnavailable("train or load a model first".into()))?;
        let prepared = self
            .prepared
            .as_ref()
            .ok_or_else(|| PipelineError::NotPrepared("parse CSV first".into()))?;

        let values = parse_prediction_inputs(inputs, &prepared.feature_names)?;
        if model.input_dim() != values.len() {
            return Err(PipelineError::InvalidPredictionInput(format!(
                "model expects {} features but the dataset has {}",
                model.input_dim(),
                values.len()
            )));
        }

        let scaled = prepared.params.scale_one(&values)?;
        let probability = model.predict(&scaled)?;
        log::info!("Predicted probability: {probability:.4}");
        Ok(probability)
    }

    /// Persist the current model under [`MODEL_KEY`].
    pub fn save(&self, store: &mut impl BlobStore) -> Result<()> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| PipelineError::ModelUnavailable("no model to save".into()))?;
        let blob = model.serialize()?;
        store.put(MODEL_KEY, &blob)?;
        log::info!("Model saved under '{MODEL_KEY}'");
        Ok(())
    }

    /// Replace the current model with the one stored under [`MODEL_KEY`].
    pub fn load(&mut self, store: &impl BlobStore) -> Result<()> {
        let blob = store.get(MODEL_KEY)?;
        let model = M::deserialize(&blob)?;
        self.model = Some(model);
        log::info!("Model loaded from '{MODEL_KEY}'");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryBlobStore, StoreError};
    use ndarray::{array, Array1};

    /// Echoes the first scaled feature as the probability; trains instantly.
    #[derive(Debug, Clone, PartialEq)]
    struct StubModel {
        dim: usize,
        epochs_run: usize,
    }

    impl TrainableModel for StubModel {
        fn create(input_dim: usize, _lr: f64, _seed: Option<u64>) -> Self {
            Self { dim: input_dim, epochs_run: 0 }
        }

        fn input_dim(&self) -> usize {
            self.dim
        }

        fn fit(
            &mut self,
            _x: &Array2<f64>,
            _y: &Array1<f64>,
            epochs: usize,
            _batch_size: usize,
            on_epoch: &mut dyn FnMut(&EpochReport),
        ) -> Result<Vec<EpochReport>> {
            let history: Vec<_> = (0..epochs)
                .map(|epoch| EpochReport { epoch, loss: 1.0 / (epoch + 1) as f64, accuracy: 0.5 })
                .collect();
            for report in &history {
                on_epoch(report);
            }
            self.epochs_run = epochs;
            Ok(history)
        }

        fn predict(&self, sample: &[f64]) -> Result<f64> {
            Ok(sample.first().copied().unwrap_or(0.0).clamp(0.0, 1.0))
        }

        fn serialize(&self) -> Result<Vec<u8>> {
            Ok(self.dim.to_string().into_bytes())
        }

        fn deserialize(blob: &[u8]) -> Result<Self> {
            let dim = std::str::from_utf8(blob)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| PipelineError::Model("bad stub blob".into()))?;
            Ok(Self { dim, epochs_run: 0 })
        }
    }

    fn prepared_session() -> Session<StubModel> {
        let mut session = Session::default();
        session.load_text("a,b,failure\n1,2,0\n3,4,1\n");
        session.prepare().unwrap();
        session
    }

    #[test]
    fn test_prepare_scenario() {
        let session = prepared_session();
        let data = session.prepared().unwrap();
        assert_eq!(data.feature_names, vec!["a", "b"]);
        assert_eq!(data.raw.x, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(data.raw.y, array![0.0, 1.0]);
        assert_eq!(data.params.mins, vec![1.0, 2.0]);
        assert_eq!(data.params.maxs, vec![3.0, 4.0]);
        assert_eq!(data.scaled, array![[0.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_prepare_without_table() {
        let mut session: Session<StubModel> = Session::default();
        assert!(matches!(session.prepare(), Err(PipelineError::NotPrepared(_))));
    }

    #[test]
    fn test_prepare_requires_label_column() {
        let mut session: Session<StubModel> = Session::default();
        session.load_text("a,b\n1,2\n");
        let err = session.prepare().unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput(_)));
        assert!(session.prepared().is_none());
    }

    #[test]
    fn test_prepare_rejects_empty_dataset() {
        let mut session: Session<StubModel> = Session::default();
        session.load_text("a,failure\nx,0\n");
        assert!(matches!(session.prepare(), Err(PipelineError::EmptyDataset)));
    }

    #[test]
    fn test_failed_prepare_keeps_previous_snapshot() {
        let mut session = prepared_session();
        session.load_text("a,b\n1,2\n");
        assert!(session.prepare().is_err());
        assert_eq!(session.prepared().unwrap().len(), 2);
    }

    #[test]
    fn test_reprepare_replaces_snapshot() {
        let mut session = prepared_session();
        let first = Arc::clone(session.prepared().unwrap());
        session.load_text("a,failure\n5,1\n6,0\n7,1\n");
        session.prepare().unwrap();
        let second = session.prepared().unwrap();
        assert_eq!(second.feature_names, vec!["a"]);
        assert_eq!(second.len(), 3);
        // the old snapshot is untouched
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_train_requires_snapshot() {
        let mut session: Session<StubModel> = Session::default();
        let result = session.train(&TrainingConfig::default(), |_| {});
        assert!(matches!(result, Err(PipelineError::NotPrepared(_))));
    }

    #[test]
    fn test_train_reports_epochs_and_installs_model() {
        let mut session = prepared_session();
        let config = TrainingConfig { epochs: 4, ..Default::default() };
        let mut seen = Vec::new();
        let history = session.train(&config, |r| seen.push(r.epoch)).unwrap();

        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(history.len(), 4);
        let model = session.model().unwrap();
        assert_eq!(model.dim, 2);
        assert_eq!(model.epochs_run, 4);
    }

    #[test]
    fn test_train_rejects_invalid_config() {
        let mut session = prepared_session();
        let config = TrainingConfig { batch_size: 0, ..Default::default() };
        assert!(matches!(
            session.train(&config, |_| {}),
            Err(PipelineError::MalformedInput(_))
        ));
        assert!(!session.has_model());
    }

    #[test]
    fn test_predict_errors() {
        let mut session = prepared_session();
        assert!(matches!(
            session.predict(&["1", "2"]),
            Err(PipelineError::ModelUnavailable(_))
        ));

        session.train(&TrainingConfig::default(), |_| {}).unwrap();
        assert!(matches!(
            session.predict(&["1", ""]),
            Err(PipelineError::InvalidPredictionInput(_))
        ));
        assert!(matches!(
            session.predict(&["1", "abc"]),
            Err(PipelineError::InvalidPredictionInput(_))
        ));
        assert!(matches!(
            session.predict(&["1"]),
            Err(PipelineError::InvalidPredictionInput(_))
        ));
    }

    #[test]
    fn test_predict_scales_with_training_params() {
        let mut session = prepared_session();
        session.train(&TrainingConfig::default(), |_| {}).unwrap();
        // stub echoes the first scaled feature: (2 - 1) / (3 - 1)
        assert_eq!(session.predict(&["2", "100"]).unwrap(), 0.5);
        assert_eq!(session.predict(&[" 3 ", "0"]).unwrap(), 1.0);
    }

    #[test]
    fn test_predict_without_snapshot() {
        let mut session: Session<StubModel> = Session::default();
        session.install_model(StubModel::create(2, 0.01, None));
        assert!(matches!(
            session.predict(&["1", "2"]),
            Err(PipelineError::NotPrepared(_))
        ));
    }

    #[test]
    fn test_predict_rejects_model_dimension_mismatch() {
        let mut session = prepared_session();
        session.install_model(StubModel::create(5, 0.01, None));
        assert!(matches!(
            session.predict(&["1", "2"]),
            Err(PipelineError::InvalidPredictionInput(_))
        ));
    }

    #[test]
    fn test_save_load_reset() {
        let mut store = MemoryBlobStore::default();
        let mut session = prepared_session();

        assert!(matches!(
            session.save(&mut store),
            Err(PipelineError::ModelUnavailable(_))
        ));
        assert!(matches!(
            session.load(&store),
            Err(PipelineError::Persistence(StoreError::NotFound { .. }))
        ));

        session.train(&TrainingConfig::default(), |_| {}).unwrap();
        session.save(&mut store).unwrap();
        session.reset_model();
        assert!(!session.has_model());
        assert!(session.prepared().is_some());

        session.load(&store).unwrap();
        assert_eq!(session.model().unwrap().dim, 2);
    }

    #[test]
    fn test_load_example_replaces_table() {
        let mut session: Session<StubModel> = Session::default();
        session.load_text("x,failure\n1,0\n");
        let headers = session
            .load_example(&ExampleGenerator::new(25).with_seed(1))
            .unwrap()
            .to_vec();
        assert_eq!(headers.len(), 6);
        assert_eq!(session.table().unwrap().len(), 25);
        assert_eq!(session.prepare().unwrap().len(), 25);
    }

    #[test]
    fn test_spawn_training_streams_events() {
        let data = Arc::new(prepare_table(&parse_csv("a,failure\n1,0\n2,1\n"), "failure").unwrap());
        let config = TrainingConfig { epochs: 3, ..Default::default() };
        let events: Vec<TrainingEvent<StubModel>> = spawn_training(data, config).iter().collect();

        assert_eq!(events.len(), 4);
        for (i, event) in events[..3].iter().enumerate() {
            assert!(matches!(event, TrainingEvent::Epoch(r) if r.epoch == i));
        }
        assert!(matches!(&events[3], TrainingEvent::Finished(m) if m.dim == 1));
    }

    #[test]
    fn test_spawn_training_reports_failure() {
        let data = Arc::new(prepare_table(&parse_csv("a,failure\n1,0\n"), "failure").unwrap());
        let config = TrainingConfig { epochs: 0, ..Default::default() };
        let events: Vec<TrainingEvent<StubModel>> = spawn_training(data, config).iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TrainingEvent::Failed(PipelineError::MalformedInput(_))));
    }
}
