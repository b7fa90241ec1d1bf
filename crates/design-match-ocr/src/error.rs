use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to encode image for {engine}: {message}")]
    Encode {
        engine: &'static str,
        message: String,
    },
    #[error("{engine} timed out after {timeout:?}")]
    Timeout {
        engine: &'static str,
        timeout: Duration,
    },
    #[error("{engine} is not available: {message}")]
    Unavailable {
        engine: &'static str,
        message: String,
    },
    #[error("backend error: {message}")]
    Backend { message: String },
}

impl OcrError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn unavailable(engine: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            engine,
            message: message.into(),
        }
    }
}
