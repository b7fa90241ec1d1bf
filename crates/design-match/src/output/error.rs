use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode annotated image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
