//! Error types for the stemflow pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, StemflowError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum StemflowError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Tracking error: {0}")]
    TrackingError(String),

    #[error("Monitoring error: {0}")]
    MonitoringError(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),
}

impl From<polars::error::PolarsError> for StemflowError {
    fn from(err: polars::error::PolarsError) -> Self {
        StemflowError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for StemflowError {
    fn from(err: serde_json::Error) -> Self {
        StemflowError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for StemflowError {
    fn from(err: ndarray::ShapeError) -> Self {
        StemflowError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StemflowError::UnsupportedModel("lightgbm".to_string());
        assert_eq!(err.to_string(), "Unsupported model: lightgbm");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StemflowError = io_err.into();
        assert!(matches!(err, StemflowError::IoError(_)));
    }
}
