use design_match_types::{Image, Rect};
use image::{GrayImage, Luma};

use super::contours::external_contours;

pub const DEFAULT_TEXT_THRESHOLD: u8 = 150;
pub const DEFAULT_MIN_TEXT_HEIGHT: u32 = 10;

/// Finds dark-on-light blobs tall enough to be lines of text.
#[derive(Debug, Clone, Copy)]
pub struct TextAreaDetector {
    threshold: u8,
    min_height: u32,
}

impl Default for TextAreaDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_THRESHOLD, DEFAULT_MIN_TEXT_HEIGHT)
    }
}

impl TextAreaDetector {
    pub fn new(threshold: u8, min_height: u32) -> Self {
        Self {
            threshold,
            min_height,
        }
    }

    pub fn detect(&self, image: &Image) -> Vec<Rect> {
        let mask = self.binarize(&image.to_luma());
        external_contours(&mask)
            .into_iter()
            .map(|contour| contour.rect)
            .filter(|rect| rect.height > self.min_height)
            .collect()
    }

    /// Pixels at or below the threshold become foreground.
    fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let threshold = self.threshold;
        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            if gray.get_pixel(x, y)[0] > threshold {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn keeps_only_tall_dark_blobs() {
        let mut pixels = RgbImage::from_pixel(200, 100, Rgb([250, 250, 250]));
        for y in 10..30 {
            for x in 10..90 {
                pixels.put_pixel(x, y, Rgb([10, 10, 10]));
            }
        }
        // Thin rule: height 4, below the floor.
        for y in 60..64 {
            for x in 10..190 {
                pixels.put_pixel(x, y, Rgb([10, 10, 10]));
            }
        }
        let image = Image::from_rgb(pixels).unwrap();
        let areas = TextAreaDetector::default().detect(&image);
        assert_eq!(areas, vec![Rect::new(10, 10, 80, 20)]);
    }

    #[test]
    fn light_content_is_ignored() {
        let image = Image::from_rgb(RgbImage::from_pixel(50, 50, Rgb([200, 200, 200]))).unwrap();
        assert!(TextAreaDetector::default().detect(&image).is_empty());
    }
}
