use design_match_ocr::TextExtractor;
use design_match_types::{Image, Rect, Region};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::close;
use log::debug;

use super::classify::classify_region;
use super::contours::external_contours;
use super::suppression::suppress_overlaps;
use super::{DetectionError, ElementDetectionConfig, ElementDetector};

const BLUR_SIGMA: f32 = 1.1;
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;
const ADAPTIVE_OFFSET: i32 = 2;
const CLOSE_RADIUS: u8 = 1;

/// Model-free detector: edges of flat UI shapes become candidate boxes.
pub struct ContourDetector {
    min_region_size: u32,
    text_probe: Option<TextExtractor>,
}

impl ContourDetector {
    pub fn new(config: ElementDetectionConfig) -> Self {
        Self {
            min_region_size: config.min_region_size,
            text_probe: config.text_probe,
        }
    }

    /// Unclassified candidate rectangles after size filtering and overlap
    /// suppression.
    pub fn candidate_boxes(&self, image: &Image) -> Vec<Rect> {
        let gray = image.to_luma();
        let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
        let binary = adaptive_threshold_inverse(&blurred, ADAPTIVE_BLOCK_RADIUS, ADAPTIVE_OFFSET);
        let closed = close(&binary, Norm::LInf, CLOSE_RADIUS);
        let boxes: Vec<Rect> = external_contours(&closed)
            .into_iter()
            .map(|contour| contour.rect)
            .filter(|rect| {
                rect.width >= self.min_region_size && rect.height >= self.min_region_size
            })
            .collect();
        suppress_overlaps(boxes)
    }

    fn probe_text(&self, image: &Image, rect: Rect) -> String {
        match &self.text_probe {
            Some(probe) => probe.extract_region(image, rect).text,
            None => String::new(),
        }
    }
}

impl ElementDetector for ContourDetector {
    fn name(&self) -> &'static str {
        "contour"
    }

    fn detect(&self, image: &Image) -> Result<Vec<Region>, DetectionError> {
        let boxes = self.candidate_boxes(image);
        let regions: Vec<Region> = boxes
            .into_iter()
            .map(|rect| {
                let text = self.probe_text(image, rect);
                Region::new(rect, classify_region(rect.width, rect.height, &text), 1.0)
            })
            .collect();
        debug!(
            "contour detector found {} regions in {}x{} image",
            regions.len(),
            image.width(),
            image.height()
        );
        Ok(regions)
    }
}

/// Marks pixels darker than their local mean minus `offset` as foreground.
/// The mean is taken over a `(2r+1)^2` window clipped at the borders.
pub fn adaptive_threshold_inverse(gray: &GrayImage, radius: u32, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += gray.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let top = y.saturating_sub(radius) as usize;
        let bottom = (y + radius + 1).min(height) as usize;
        for x in 0..width {
            let left = x.saturating_sub(radius) as usize;
            let right = (x + radius + 1).min(width) as usize;
            let sum = integral[bottom * stride + right] + integral[top * stride + left]
                - integral[top * stride + right]
                - integral[bottom * stride + left];
            let count = ((bottom - top) * (right - left)) as u64;
            let mean = (sum as f64 / count as f64).round() as i32;
            let value = gray.get_pixel(x, y)[0] as i32;
            let foreground = value <= mean - offset;
            out.put_pixel(x, y, Luma([if foreground { 255 } else { 0 }]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_detection::DEFAULT_MIN_REGION_SIZE as DEFAULT_MIN;
    use image::{Rgb, RgbImage};

    fn canvas_with_boxes(boxes: &[Rect]) -> Image {
        let mut pixels = RgbImage::from_pixel(320, 240, Rgb([255, 255, 255]));
        for rect in boxes {
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    pixels.put_pixel(x, y, Rgb([30, 30, 30]));
                }
            }
        }
        Image::from_rgb(pixels).unwrap()
    }

    fn detector() -> ContourDetector {
        ContourDetector::new(ElementDetectionConfig::default())
    }

    #[test]
    fn flat_canvas_has_no_regions() {
        let regions = detector().detect(&canvas_with_boxes(&[])).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn dark_boxes_are_found_and_classified() {
        let image = canvas_with_boxes(&[Rect::new(20, 20, 200, 40), Rect::new(40, 120, 80, 80)]);
        let regions = detector().detect(&image).unwrap();
        assert_eq!(regions.len(), 2);
        for region in &regions {
            assert!(region.rect.width >= DEFAULT_MIN);
            assert!(region.rect.height >= DEFAULT_MIN);
        }
        let wide = regions
            .iter()
            .find(|region| region.rect.y < 100)
            .expect("button-shaped region");
        assert_eq!(wide.label.as_str(), "button");
        let square = regions
            .iter()
            .find(|region| region.rect.y >= 100)
            .expect("image-shaped region");
        assert_eq!(square.label.as_str(), "image");
    }

    #[test]
    fn small_specks_are_discarded() {
        let image = canvas_with_boxes(&[Rect::new(100, 100, 3, 3)]);
        assert!(detector().detect(&image).unwrap().is_empty());
    }

    #[test]
    fn accepted_regions_never_overlap() {
        let image = canvas_with_boxes(&[
            Rect::new(10, 10, 120, 60),
            Rect::new(150, 10, 60, 60),
            Rect::new(10, 120, 250, 100),
        ]);
        let regions = detector().detect(&image).unwrap();
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.rect.intersects(&b.rect));
            }
        }
    }

    #[test]
    fn adaptive_threshold_marks_dark_edges() {
        let mut gray = GrayImage::from_pixel(20, 20, Luma([200]));
        for y in 5..15 {
            for x in 5..15 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        let binary = adaptive_threshold_inverse(&gray, 2, 2);
        assert_eq!(binary.get_pixel(5, 5)[0], 255);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        // Uniform interior equals its own mean, so it stays background.
        assert_eq!(binary.get_pixel(10, 10)[0], 0);
    }
}
