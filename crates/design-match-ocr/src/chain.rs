use std::sync::Arc;

use log::{debug, warn};

use crate::engine::OcrEngine;
use crate::request::OcrRequest;
use crate::response::OcrResponse;

/// Result of running a request through an [`OcrChain`].
#[derive(Debug, Clone, Default)]
pub struct ChainOutcome {
    pub response: OcrResponse,
    /// Engine whose response won, if any produced text.
    pub engine: Option<&'static str>,
    /// Every engine returned an error.
    pub degraded: bool,
}

/// Ordered list of OCR engines; the first non-empty, non-failing answer wins.
#[derive(Clone, Default)]
pub struct OcrChain {
    engines: Vec<Arc<dyn OcrEngine>>,
}

impl OcrChain {
    pub fn new(engines: Vec<Arc<dyn OcrEngine>>) -> Self {
        Self { engines }
    }

    /// Warms every engine up and drops the ones that fail.
    pub fn warmed(engines: Vec<Arc<dyn OcrEngine>>) -> Self {
        let engines = engines
            .into_iter()
            .filter(|engine| match engine.warm_up() {
                Ok(()) => true,
                Err(err) => {
                    warn!("ocr engine '{}' disabled: {err}", engine.name());
                    false
                }
            })
            .collect();
        Self { engines }
    }

    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|engine| engine.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn recognize(&self, request: &OcrRequest<'_>) -> ChainOutcome {
        let mut failures = 0usize;
        for engine in &self.engines {
            match engine.recognize(request) {
                Ok(response) if !response.is_blank() => {
                    return ChainOutcome {
                        response,
                        engine: Some(engine.name()),
                        degraded: false,
                    };
                }
                Ok(_) => {
                    debug!("ocr engine '{}' returned no text, trying next", engine.name());
                }
                Err(err) => {
                    failures += 1;
                    warn!("ocr engine '{}' failed: {err}", engine.name());
                }
            }
        }
        ChainOutcome {
            response: OcrResponse::empty(),
            engine: None,
            degraded: !self.engines.is_empty() && failures == self.engines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OcrError, OcrText};
    use design_match_types::{Image, Rect};
    use image::{Rgb, RgbImage};

    struct Scripted {
        name: &'static str,
        answer: Option<&'static str>,
    }

    impl OcrEngine for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        fn warm_up(&self) -> Result<(), OcrError> {
            if self.name == "cold" {
                Err(OcrError::unavailable("cold", "missing binary"))
            } else {
                Ok(())
            }
        }

        fn recognize(&self, _: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
            match self.answer {
                Some(text) => Ok(OcrResponse::new(vec![OcrText::new(
                    Rect::new(0, 0, 1, 1),
                    text.to_string(),
                )])),
                None => Err(OcrError::backend("boom")),
            }
        }
    }

    fn image() -> Image {
        Image::from_rgb(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))).unwrap()
    }

    fn engine(name: &'static str, answer: Option<&'static str>) -> Arc<dyn OcrEngine> {
        Arc::new(Scripted { name, answer })
    }

    #[test]
    fn blank_primary_falls_back() {
        let chain = OcrChain::new(vec![engine("local", Some("  ")), engine("cloud", Some("Hello"))]);
        let image = image();
        let outcome = chain.recognize(&OcrRequest::new(&image));
        assert_eq!(outcome.engine, Some("cloud"));
        assert_eq!(outcome.response.text(), "Hello");
        assert!(!outcome.degraded);
    }

    #[test]
    fn failing_primary_falls_back() {
        let chain = OcrChain::new(vec![engine("local", None), engine("cloud", Some("Hi"))]);
        let image = image();
        assert_eq!(chain.recognize(&OcrRequest::new(&image)).engine, Some("cloud"));
    }

    #[test]
    fn all_failures_degrade_to_empty() {
        let chain = OcrChain::new(vec![engine("local", None), engine("cloud", None)]);
        let image = image();
        let outcome = chain.recognize(&OcrRequest::new(&image));
        assert!(outcome.degraded);
        assert_eq!(outcome.response.text(), "");
    }

    #[test]
    fn warm_up_failures_are_dropped() {
        let chain = OcrChain::warmed(vec![engine("cold", Some("x")), engine("local", Some("y"))]);
        assert_eq!(chain.engine_names(), vec!["local"]);
    }
}
