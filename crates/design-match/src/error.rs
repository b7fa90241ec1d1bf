use design_match_comparator::ScoreError;
use design_match_detector::DetectionError;
use design_match_types::InputError;
use thiserror::Error;

use crate::output::ReportError;
use crate::settings::ConfigError;

#[derive(Debug, Error)]
pub enum DesignMatchError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("element detection failed: {0}")]
    Detection(#[from] DetectionError),

    #[error("invalid score configuration: {0}")]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write report: {0}")]
    Report(#[from] ReportError),

    #[cfg(feature = "embedding-onnx")]
    #[error("embedding model failed: {0}")]
    Embedding(#[from] design_match_comparator::EmbeddingError),

    #[error("comparison task failed: {0}")]
    Task(String),
}

impl DesignMatchError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DesignMatchError::Input(_) => 2,
            DesignMatchError::Detection(err) if err.is_model_unavailable() => 3,
            #[cfg(feature = "embedding-onnx")]
            DesignMatchError::Embedding(design_match_comparator::EmbeddingError::ModelNotFound {
                ..
            }) => 3,
            _ => 1,
        }
    }
}
