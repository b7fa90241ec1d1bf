mod backends;
mod bands;
mod chain;
mod engine;
mod error;
mod extractor;
mod request;
mod response;

#[cfg(feature = "engine-cloud")]
pub use backends::google_vision::{GoogleVisionConfig, GoogleVisionOcrEngine};
#[cfg(feature = "engine-tesseract")]
pub use backends::tesseract::{TesseractConfig, TesseractOcrEngine};
pub use bands::{Band, DEFAULT_SLICE_HEIGHT, slice_bands};
pub use chain::{ChainOutcome, OcrChain};
pub use engine::{NoopOcrEngine, OcrEngine};
pub use error::OcrError;
pub use extractor::{Extraction, TextExtractor};
pub use request::OcrRequest;
pub use response::{OcrResponse, OcrText};
