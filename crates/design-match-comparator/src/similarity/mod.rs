pub mod color;
pub mod mean_abs;
pub mod structural;

pub use color::{ColorHistogram, HISTOGRAM_BINS, color_correlation};
pub use mean_abs::MeanAbsMetric;
pub use structural::StructuralSsimMetric;

use design_match_types::SimilarityMetric;
use image::GrayImage;

/// Trait implemented by every structural layout metric.
pub trait LayoutMetric: Send + Sync {
    /// Which metric this is, for reporting.
    fn kind(&self) -> SimilarityMetric;

    /// Similarity of two equally sized grayscale images in `[0, 1]`,
    /// where 1.0 means identical.
    fn similarity(&self, reference: &GrayImage, implementation: &GrayImage) -> f64;
}
