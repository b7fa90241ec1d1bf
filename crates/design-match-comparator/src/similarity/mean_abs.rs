use design_match_types::SimilarityMetric;
use image::GrayImage;

use super::LayoutMetric;

/// `1 - mean(|a - b|) / 255`: a cheap stand-in for SSIM.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanAbsMetric;

impl MeanAbsMetric {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutMetric for MeanAbsMetric {
    fn kind(&self) -> SimilarityMetric {
        SimilarityMetric::MeanAbs
    }

    fn similarity(&self, reference: &GrayImage, implementation: &GrayImage) -> f64 {
        if reference.dimensions() != implementation.dimensions() {
            return 0.0;
        }
        let a = reference.as_raw();
        let b = implementation.as_raw();
        if a.is_empty() {
            return 0.0;
        }
        let total: u64 = a
            .iter()
            .zip(b)
            .map(|(&x, &y)| x.abs_diff(y) as u64)
            .sum();
        let mean = total as f64 / a.len() as f64;
        (1.0 - mean / 255.0).clamp(0.0, 1.0)
    }
}
