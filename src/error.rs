use thiserror::Error;

use crate::store::StoreError;

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Failures surfaced to the caller of a session operation.
///
/// None of these are fatal: the UI reports them and keeps running.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input table cannot be turned into a dataset (e.g. missing label column).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Numeric conversion dropped every row.
    #[error("no valid numeric rows found after parsing")]
    EmptyDataset,

    /// A prediction input is missing, non-numeric or has the wrong arity.
    #[error("invalid prediction input: {0}")]
    InvalidPredictionInput(String),

    /// Prediction or save requested without a trained or loaded model.
    #[error("no model available: {0}")]
    ModelUnavailable(String),

    /// Training or prediction requested before any dataset was prepared.
    #[error("no prepared dataset: {0}")]
    NotPrepared(String),

    /// The blob store failed; the store's own message is kept as-is.
    #[error(transparent)]
    Persistence(#[from] StoreError),

    /// The model backend rejected a blob or failed to serialize.
    #[error("model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::MalformedInput("CSV must include \"failure\" column".into());
        assert_eq!(
            err.to_string(),
            "malformed input: CSV must include \"failure\" column"
        );
        assert_eq!(
            PipelineError::EmptyDataset.to_string(),
            "no valid numeric rows found after parsing"
        );
    }

    #[test]
    fn test_persistence_keeps_store_message() {
        let store_err = StoreError::NotFound {
            key: "pipeline-failure-model".into(),
        };
        let expected = store_err.to_string();
        let err: PipelineError = store_err.into();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }
}
