use std::fmt::Display;
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError};

use chrono::Local;

use pipeline_risk::data::loader::load_csv_file;
use pipeline_risk::data::model::{FeatureSummary, ParsedTable};
use pipeline_risk::data::parser::parse_csv;
use pipeline_risk::data::stats::feature_stats;
use pipeline_risk::session::spawn_training;
use pipeline_risk::store::FileBlobStore;
use pipeline_risk::{
    AppConfig, DenseClassifier, EpochReport, ExampleGenerator, Session, TrainingConfig,
    TrainingEvent,
};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Lines kept in the in-app log console.
const LOG_CAPACITY: usize = 500;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Table, prepared snapshot and model.
    pub session: Session<DenseClassifier>,

    /// Where Save / Load model read and write.
    pub store: FileBlobStore,

    /// Display statistics over the raw rows of the current table.
    pub table_stats: Vec<(String, FeatureSummary)>,

    /// Hyperparameters as edited in the side panel.
    pub training: TrainingConfig,

    /// Epoch metrics of the current / last training run.
    pub history: Vec<EpochReport>,

    /// Events from the background training thread (Some while running).
    pub training_rx: Option<Receiver<TrainingEvent<DenseClassifier>>>,

    /// One text field per feature of the prepared snapshot.
    pub predict_inputs: Vec<String>,

    /// Last predicted failure probability.
    pub predict_result: Option<f64>,

    /// Whether the sample table is shown.
    pub show_sample: bool,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    /// Timestamped history of status messages, oldest first.
    pub log: Vec<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            session: Session::new(config.label_column.clone()),
            store: FileBlobStore::new(config.store_dir.clone()),
            training: config.training.clone(),
            table_stats: Vec::new(),
            history: Vec::new(),
            training_rx: None,
            predict_inputs: Vec::new(),
            predict_result: None,
            show_sample: true,
            status: None,
            log: Vec::new(),
            config,
        }
    }

    fn push_log(&mut self, line: &str) {
        if self.log.len() >= LOG_CAPACITY {
            self.log.remove(0);
        }
        self.log
            .push(format!("[{}] {line}", Local::now().format("%H:%M:%S")));
    }

    fn info(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.push_log(&msg);
        self.status = Some(Status::Info(msg));
    }

    fn report_error(&mut self, action: &str, err: impl Display) {
        let msg = format!("{action} failed: {err:#}");
        log::error!("{msg}");
        self.push_log(&msg);
        self.status = Some(Status::Error(msg));
    }

    /// Ingest a newly loaded table and refresh display statistics.
    pub fn set_table(&mut self, table: ParsedTable) {
        let features = table.feature_names(self.session.label());
        self.table_stats = feature_stats(&table.rows, &features);
        let n_rows = table.len();
        self.session.load_table(table);
        self.info(format!("CSV loaded: {n_rows} rows. Press Prepare."));
    }

    pub fn open_file(&mut self, path: &Path) {
        match load_csv_file(path) {
            Ok(table) => self.set_table(table),
            Err(e) => self.report_error("Loading CSV", e),
        }
    }

    pub fn load_example(&mut self) {
        let mut generator = ExampleGenerator::new(self.config.example_rows);
        generator.seed = self.config.example_seed;
        match generator.generate() {
            Ok(text) => {
                self.set_table(parse_csv(&text));
                self.info("Example CSV generated. Press Prepare.");
            }
            Err(e) => self.report_error("Generating example", e),
        }
    }

    pub fn has_table(&self) -> bool {
        self.session.table().is_some()
    }

    /// Build the training snapshot and reset the prediction inputs.
    /// Refused while a training run is active.
    pub fn prepare(&mut self) {
        if self.is_training() {
            self.report_error("Prepare", "training in progress");
            return;
        }
        match self.session.prepare() {
            Ok(prepared) => {
                self.predict_inputs = vec![String::new(); prepared.feature_names.len()];
                self.predict_result = None;
                self.info(format!("Prepared {} training rows", prepared.len()));
            }
            Err(e) => self.report_error("Prepare", e),
        }
    }

    pub fn is_training(&self) -> bool {
        self.training_rx.is_some()
    }

    pub fn start_training(&mut self) {
        if self.is_training() {
            return;
        }
        let Some(prepared) = self.session.prepared().cloned() else {
            self.report_error("Training", "no training data, parse CSV first");
            return;
        };
        if let Err(e) = self.training.validate() {
            self.report_error("Training", e);
            return;
        }
        self.history.clear();
        self.training_rx = Some(spawn_training(prepared, self.training.clone()));
        self.info("Training started...");
    }

    /// Drain pending training events. Returns `true` while a run is active.
    pub fn poll_training(&mut self) -> bool {
        let Some(rx) = self.training_rx.take() else {
            return false;
        };

        loop {
            match rx.try_recv() {
                Ok(TrainingEvent::Epoch(report)) => {
                    self.info(format!(
                        "Epoch {} - loss: {:.4} acc: {:.3}",
                        report.epoch + 1,
                        report.loss,
                        report.accuracy
                    ));
                    self.history.push(report);
                }
                Ok(TrainingEvent::Finished(model)) => {
                    self.session.install_model(model);
                    self.info("Training complete.");
                    return false;
                }
                Ok(TrainingEvent::Failed(e)) => {
                    self.report_error("Training", e);
                    return false;
                }
                Err(TryRecvError::Empty) => {
                    self.training_rx = Some(rx);
                    return true;
                }
                Err(TryRecvError::Disconnected) => {
                    self.report_error("Training", "worker stopped unexpectedly");
                    return false;
                }
            }
        }
    }

    pub fn save_model(&mut self) {
        match self.session.save(&mut self.store) {
            Ok(()) => self.info(format!("Model saved to {}", self.store.dir().display())),
            Err(e) => self.report_error("Save", e),
        }
    }

    pub fn load_model(&mut self) {
        match self.session.load(&self.store) {
            Ok(()) => self.info("Model loaded"),
            Err(e) => self.report_error("Load", e),
        }
    }

    pub fn reset_model(&mut self) {
        self.session.reset_model();
        self.predict_result = None;
        self.info("Model reset");
    }

    pub fn predict(&mut self) {
        match self.session.predict(self.predict_inputs.as_slice()) {
            Ok(p) => {
                self.predict_result = Some(p);
                self.info(format!("Predicted probability: {p:.4}"));
            }
            Err(e) => {
                self.predict_result = None;
                self.report_error("Prediction", e);
            }
        }
    }
}
