use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::issue::Issue;
use crate::raster::Image;
use crate::region::Region;

/// Structural metric used for the layout score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityMetric {
    Ssim,
    MeanAbs,
}

impl SimilarityMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityMetric::Ssim => "ssim",
            SimilarityMetric::MeanAbs => "mean-abs",
        }
    }
}

#[derive(Debug)]
pub struct SimilarityMetricParseError(pub String);

impl fmt::Display for SimilarityMetricParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown similarity metric '{}'", self.0)
    }
}

impl std::error::Error for SimilarityMetricParseError {}

impl FromStr for SimilarityMetric {
    type Err = SimilarityMetricParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "ssim" => Ok(SimilarityMetric::Ssim),
            "mean-abs" | "mean_abs" => Ok(SimilarityMetric::MeanAbs),
            _ => Err(SimilarityMetricParseError(lower)),
        }
    }
}

/// Sub-scores feeding the overall score, each clamped to its own range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentScores {
    /// Structural similarity in `[0, 1]`.
    pub layout: f64,
    /// Fuzzy text ratio in `[0, 100]`.
    pub text: f64,
    /// Histogram correlation in `[-1, 1]`.
    pub color: f64,
}

impl ComponentScores {
    pub fn new(layout: f64, text: f64, color: f64) -> Self {
        Self {
            layout: clamp_finite(layout, 0.0, 1.0),
            text: clamp_finite(text, 0.0, 100.0),
            color: clamp_finite(color, -1.0, 1.0),
        }
    }
}

fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() { lo } else { value.clamp(lo, hi) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectedElements {
    pub reference: Vec<Region>,
    pub implementation: Vec<Region>,
}

/// Everything one comparison produced, owned by value.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub overall_score: f64,
    pub component_scores: ComponentScores,
    pub metric: SimilarityMetric,
    pub text_matched: bool,
    pub issues: Vec<Issue>,
    pub elements: DetectedElements,
    /// Set when every OCR engine failed for at least one extraction.
    pub extraction_degraded: bool,
    pub annotated_image: Image,
}
