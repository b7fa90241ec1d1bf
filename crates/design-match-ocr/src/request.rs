use design_match_types::{Image, Rect};

/// OCR invocation metadata.
#[derive(Debug, Clone, Copy)]
pub struct OcrRequest<'a> {
    image: &'a Image,
    region: Option<Rect>,
}

impl<'a> OcrRequest<'a> {
    pub fn new(image: &'a Image) -> Self {
        Self {
            image,
            region: None,
        }
    }

    pub fn with_region(image: &'a Image, region: Rect) -> Self {
        Self {
            image,
            region: Some(region),
        }
    }

    pub fn image(&self) -> &'a Image {
        self.image
    }

    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Pixels the engine should read together with the offset that maps
    /// engine-local coordinates back onto the request image.
    pub fn target(&self) -> Option<(Image, u32, u32)> {
        match self.region {
            None => Some((self.image.clone(), 0, 0)),
            Some(region) => {
                let clipped = region.clamp_to(self.image.width(), self.image.height())?;
                let crop = self.image.crop(clipped)?;
                Some((crop, clipped.x, clipped.y))
            }
        }
    }
}
