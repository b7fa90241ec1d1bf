use image::RgbImage;

use crate::pipeline::ops::pearson_correlation;

/// Bins per channel; the joint histogram has `HISTOGRAM_BINS^3` cells.
pub const HISTOGRAM_BINS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorHistogram {
    counts: Vec<f64>,
}

impl ColorHistogram {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let shift = 8 - HISTOGRAM_BINS.trailing_zeros();
        let mut counts = vec![0f64; HISTOGRAM_BINS * HISTOGRAM_BINS * HISTOGRAM_BINS];
        for pixel in image.pixels() {
            let r = (pixel[0] >> shift) as usize;
            let g = (pixel[1] >> shift) as usize;
            let b = (pixel[2] >> shift) as usize;
            counts[(r * HISTOGRAM_BINS + g) * HISTOGRAM_BINS + b] += 1.0;
        }
        Self { counts }
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Pearson correlation of the two histograms in `[-1, 1]`.
    pub fn correlation(&self, other: &ColorHistogram) -> f64 {
        pearson_correlation(&self.counts, &other.counts)
    }
}

pub fn color_correlation(reference: &RgbImage, implementation: &RgbImage) -> f64 {
    ColorHistogram::from_rgb(reference).correlation(&ColorHistogram::from_rgb(implementation))
}
