use crate::error::OcrError;
use crate::request::OcrRequest;
use crate::response::OcrResponse;

/// A text recognizer tried in order by [`crate::OcrChain`].
///
/// `recognize` reads [`OcrRequest::target`] and reports every rectangle in
/// the coordinates of the request image, not of the cropped region.
/// An `Err` lets the chain move on to the next engine.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called once when the chain is built; an error drops the engine.
    fn warm_up(&self) -> Result<(), OcrError> {
        Ok(())
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError>;
}

/// Engine that never finds text. Used when OCR is disabled.
#[derive(Debug, Default)]
pub struct NoopOcrEngine;

impl OcrEngine for NoopOcrEngine {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn recognize(&self, _: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        Ok(OcrResponse::empty())
    }
}
