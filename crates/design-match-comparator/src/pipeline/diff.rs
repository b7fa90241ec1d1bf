use design_match_detector::external_contours;
use design_match_types::{Image, Rect};
use image::imageops;
use log::debug;

use super::ops::{abs_diff_rgb, threshold_binary};

pub const DEFAULT_DIFF_THRESHOLD: u8 = 50;
pub const DEFAULT_DIFF_MIN_AREA: f64 = 500.0;

/// A connected area where the two images visibly differ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffRegion {
    pub rect: Rect,
    /// Contour area in square pixels.
    pub area: f64,
}

/// Locates differing areas between two images of equal size.
///
/// Returns an empty list when the sizes disagree; callers normalize the
/// pair first.
pub fn diff_regions(
    reference: &Image,
    implementation: &Image,
    threshold: u8,
    min_area: f64,
) -> Vec<DiffRegion> {
    if reference.dimensions() != implementation.dimensions() {
        return Vec::new();
    }
    let diff = abs_diff_rgb(reference.as_rgb(), implementation.as_rgb());
    let gray = imageops::grayscale(&diff);
    let mask = threshold_binary(&gray, threshold);
    let regions: Vec<DiffRegion> = external_contours(&mask)
        .into_iter()
        .filter(|contour| contour.area > min_area)
        .map(|contour| DiffRegion {
            rect: contour.rect,
            area: contour.area,
        })
        .collect();
    debug!("{} diff regions above {min_area} px", regions.len());
    regions
}
