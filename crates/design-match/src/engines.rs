use std::sync::Arc;

use design_match_ocr::{NoopOcrEngine, OcrEngine};
use log::{debug, warn};

use crate::cli::OcrEngineChoice;
use crate::settings::OcrSettings;

/// Builds the configured OCR engines in fallback order. Engines that cannot
/// be constructed are skipped with a warning; the caller may end up with an
/// empty list.
pub fn build_ocr_engines(settings: &OcrSettings) -> Vec<Arc<dyn OcrEngine>> {
    let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::with_capacity(settings.engines.len());
    for choice in &settings.engines {
        match build_engine(*choice, settings) {
            Some(engine) => {
                debug!("configured OCR engine '{}'", engine.name());
                engines.push(engine);
            }
            None => warn!("OCR engine '{}' skipped", choice.as_str()),
        }
    }
    engines
}

fn build_engine(choice: OcrEngineChoice, settings: &OcrSettings) -> Option<Arc<dyn OcrEngine>> {
    match choice {
        OcrEngineChoice::Noop => Some(Arc::new(NoopOcrEngine)),
        OcrEngineChoice::Tesseract => tesseract(settings),
        OcrEngineChoice::GoogleVision => google_vision(settings),
    }
}

#[cfg(feature = "ocr-tesseract")]
fn tesseract(settings: &OcrSettings) -> Option<Arc<dyn OcrEngine>> {
    use design_match_ocr::{TesseractConfig, TesseractOcrEngine};

    Some(Arc::new(TesseractOcrEngine::new(TesseractConfig {
        binary: settings.tesseract_path.clone(),
        languages: settings.languages.clone(),
        page_segmentation_mode: settings.psm,
    })))
}

#[cfg(not(feature = "ocr-tesseract"))]
fn tesseract(_: &OcrSettings) -> Option<Arc<dyn OcrEngine>> {
    warn!("tesseract support not compiled in; rebuild with the \"ocr-tesseract\" feature");
    None
}

#[cfg(feature = "ocr-cloud")]
fn google_vision(settings: &OcrSettings) -> Option<Arc<dyn OcrEngine>> {
    use design_match_ocr::{GoogleVisionConfig, GoogleVisionOcrEngine};

    let config = GoogleVisionConfig {
        api_key: settings.google_api_key.clone(),
        timeout: settings.cloud_timeout,
        ..GoogleVisionConfig::default()
    };
    match GoogleVisionOcrEngine::new(config) {
        Ok(engine) => Some(Arc::new(engine)),
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

#[cfg(not(feature = "ocr-cloud"))]
fn google_vision(_: &OcrSettings) -> Option<Arc<dyn OcrEngine>> {
    warn!("cloud OCR support not compiled in; rebuild with the \"ocr-cloud\" feature");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engines_keep_configured_order() {
        let settings = OcrSettings {
            engines: vec![OcrEngineChoice::Noop],
            ..OcrSettings::default()
        };
        let engines = build_ocr_engines(&settings);
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0].name(), "noop");
    }

    #[test]
    fn empty_selection_builds_nothing() {
        let settings = OcrSettings {
            engines: Vec::new(),
            ..OcrSettings::default()
        };
        assert!(build_ocr_engines(&settings).is_empty());
    }

    #[cfg(feature = "ocr-tesseract")]
    #[test]
    fn tesseract_is_built_without_probing_the_binary() {
        let settings = OcrSettings {
            engines: vec![OcrEngineChoice::Tesseract, OcrEngineChoice::Noop],
            ..OcrSettings::default()
        };
        let names: Vec<&str> = build_ocr_engines(&settings)
            .iter()
            .map(|engine| engine.name())
            .collect();
        assert_eq!(names, vec!["tesseract", "noop"]);
    }
}
