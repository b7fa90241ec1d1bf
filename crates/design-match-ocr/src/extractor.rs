use design_match_types::{Image, Rect, TextBlock};
use log::debug;

use crate::bands::{DEFAULT_SLICE_HEIGHT, slice_bands};
use crate::chain::OcrChain;
use crate::request::OcrRequest;

/// Text found in an image or region. Never an error: a failed extraction is
/// an empty string with `degraded` set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub blocks: Vec<TextBlock>,
    pub degraded: bool,
}

/// Runs the OCR chain over an image, band by band for long screenshots.
#[derive(Clone)]
pub struct TextExtractor {
    chain: OcrChain,
    slice_height: u32,
}

impl TextExtractor {
    pub fn new(chain: OcrChain, slice_height: u32) -> Self {
        Self {
            chain,
            slice_height,
        }
    }

    pub fn with_default_slicing(chain: OcrChain) -> Self {
        Self::new(chain, DEFAULT_SLICE_HEIGHT)
    }

    pub fn chain(&self) -> &OcrChain {
        &self.chain
    }

    pub fn slice_height(&self) -> u32 {
        self.slice_height
    }

    pub fn extract(&self, image: &Image) -> Extraction {
        self.extract_within(image, image.bounds())
    }

    pub fn extract_region(&self, image: &Image, region: Rect) -> Extraction {
        match region.clamp_to(image.width(), image.height()) {
            Some(area) => self.extract_within(image, area),
            None => Extraction::default(),
        }
    }

    fn extract_within(&self, image: &Image, area: Rect) -> Extraction {
        let mut extraction = Extraction::default();
        let mut pieces: Vec<String> = Vec::new();
        let bands = slice_bands(area.height, self.slice_height);
        for band in &bands {
            let band_rect = Rect::new(area.x, area.y + band.y, area.width, band.height);
            let outcome = self
                .chain
                .recognize(&OcrRequest::with_region(image, band_rect));
            extraction.degraded |= outcome.degraded;
            let engine = outcome.engine.unwrap_or("none");
            let text = outcome.response.text();
            if !text.is_empty() {
                pieces.push(text);
            }
            extraction.blocks.extend(
                outcome
                    .response
                    .texts
                    .into_iter()
                    .filter_map(|entry| {
                        let rect = entry.rect.clamp_to(image.width(), image.height())?;
                        Some(TextBlock::new(rect, entry.text.trim(), engine))
                    })
                    .filter(|block| !block.text.is_empty()),
            );
        }
        extraction.text = pieces.join(" ");
        debug!(
            "extracted {} chars in {} block(s) over {} band(s)",
            extraction.text.len(),
            extraction.blocks.len(),
            bands.len()
        );
        extraction
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{OcrEngine, OcrError, OcrResponse, OcrText};
    use image::{Rgb, RgbImage};

    /// Reports one line per request, anchored at the top-left of the band.
    #[derive(Default)]
    struct BandEcho {
        seen: Mutex<Vec<Rect>>,
    }

    impl OcrEngine for BandEcho {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
            let (_, x, y) = request.target().ok_or_else(|| OcrError::backend("empty"))?;
            let region = request.region().unwrap_or(request.image().bounds());
            self.seen.lock().unwrap().push(region);
            Ok(OcrResponse::new(vec![OcrText::new(
                Rect::new(x, y, 10, 10),
                format!("band@{y}"),
            )]))
        }
    }

    fn tall_image(height: u32) -> Image {
        Image::from_rgb(RgbImage::from_pixel(40, height, Rgb([250, 250, 250]))).unwrap()
    }

    #[test]
    fn long_images_are_read_band_by_band() {
        let engine = Arc::new(BandEcho::default());
        let extractor = TextExtractor::new(OcrChain::new(vec![engine.clone()]), 1024);
        let extraction = extractor.extract(&tall_image(3000));

        assert_eq!(extraction.text, "band@0 band@1024 band@2048");
        let ys: Vec<u32> = extraction.blocks.iter().map(|block| block.rect.y).collect();
        assert_eq!(ys, vec![0, 1024, 2048]);
        let heights: Vec<u32> = engine.seen.lock().unwrap().iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![1024, 1024, 952]);
    }

    #[test]
    fn short_images_use_a_single_band() {
        let engine = Arc::new(BandEcho::default());
        let extractor = TextExtractor::new(OcrChain::new(vec![engine.clone()]), 1024);
        let extraction = extractor.extract(&tall_image(300));
        assert_eq!(extraction.blocks.len(), 1);
        assert_eq!(engine.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_chain_yields_empty_text_without_degrading() {
        let extractor = TextExtractor::with_default_slicing(OcrChain::default());
        let extraction = extractor.extract(&tall_image(50));
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn regions_outside_the_image_are_empty() {
        let extractor = TextExtractor::with_default_slicing(OcrChain::default());
        let extraction = extractor.extract_region(&tall_image(50), Rect::new(100, 0, 5, 5));
        assert!(extraction.text.is_empty());
    }
}
