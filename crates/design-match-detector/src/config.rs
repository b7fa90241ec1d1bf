use std::path::PathBuf;

use design_match_ocr::TextExtractor;

use crate::element_detection::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD, DEFAULT_MIN_REGION_SIZE, DetectorKind,
    ElementDetectionConfig,
};

/// User-facing detection settings, resolved from CLI and configuration file.
#[derive(Clone, Debug)]
pub struct DetectionOptions {
    pub detector: DetectorKind,
    pub onnx_model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub min_region_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// OCR each contour candidate to tell text from other elements.
    pub classify_with_ocr: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            detector: DetectorKind::Auto,
            onnx_model_path: None,
            labels_path: None,
            min_region_size: DEFAULT_MIN_REGION_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            classify_with_ocr: true,
        }
    }
}

impl DetectionOptions {
    /// Builds the strategy configuration, attaching `text_probe` only when
    /// OCR classification is enabled.
    pub fn to_detection_config(&self, text_probe: Option<TextExtractor>) -> ElementDetectionConfig {
        ElementDetectionConfig {
            model_path: self.onnx_model_path.clone(),
            labels_path: self.labels_path.clone(),
            min_region_size: self.min_region_size,
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            text_probe: text_probe.filter(|_| self.classify_with_ocr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use design_match_ocr::OcrChain;

    #[test]
    fn text_probe_respects_classification_toggle() {
        let probe = TextExtractor::with_default_slicing(OcrChain::new(Vec::new()));
        let mut options = DetectionOptions::default();
        assert!(options.to_detection_config(Some(probe.clone())).text_probe.is_some());
        options.classify_with_ocr = false;
        assert!(options.to_detection_config(Some(probe)).text_probe.is_none());
    }
}
