use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use design_match_types::{ComparisonResult, ComponentScores, DetectedElements, Issue};
use serde::Serialize;

use super::error::ReportError;

/// Transportable form of a [`ComparisonResult`]: scores, issue table and the
/// annotated image as base64 PNG.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub overall_score: f64,
    pub component_scores: ComponentScores,
    pub metric: &'static str,
    pub text_matched: bool,
    pub extraction_degraded: bool,
    pub issues: Vec<Issue>,
    pub elements: DetectedElements,
    pub annotated_image_png: String,
}

impl ReportDocument {
    pub fn from_result(result: &ComparisonResult) -> Result<Self, ReportError> {
        let png = result.annotated_image.to_png_bytes()?;
        Ok(Self {
            overall_score: result.overall_score,
            component_scores: result.component_scores,
            metric: result.metric.as_str(),
            text_matched: result.text_matched,
            extraction_degraded: result.extraction_degraded,
            issues: result.issues.clone(),
            elements: result.elements.clone(),
            annotated_image_png: BASE64.encode(png),
        })
    }

    pub fn image_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.annotated_image_png)
    }
}
