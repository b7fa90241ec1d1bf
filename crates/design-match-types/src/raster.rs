use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageOutputFormat, RgbImage};
use thiserror::Error;

use crate::geometry::Rect;

pub type InputResult<T> = Result<T, InputError>;

/// Errors raised while turning caller-supplied bytes or paths into an [`Image`].
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to read image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image has zero width or height")]
    Empty,
}

/// Immutable RGB raster shared cheaply between pipeline stages.
///
/// Every transformation (grayscale, resize, crop) returns a new buffer; the
/// pixels behind an `Image` are never mutated once it has been built.
#[derive(Clone)]
pub struct Image {
    pixels: Arc<RgbImage>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.pixels.as_raw().len())
            .finish()
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.pixels.as_raw() == other.pixels.as_raw()
    }
}

impl Image {
    pub fn from_rgb(pixels: RgbImage) -> InputResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(InputError::Empty);
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    pub fn decode(bytes: &[u8]) -> InputResult<Self> {
        let decoded = image::load_from_memory(bytes).map_err(InputError::Decode)?;
        Self::from_rgb(decoded.to_rgb8())
    }

    pub fn open(path: impl AsRef<Path>) -> InputResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rgb(decoded.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn to_rgb(&self) -> RgbImage {
        self.pixels.as_ref().clone()
    }

    pub fn to_luma(&self) -> GrayImage {
        imageops::grayscale(self.pixels.as_ref())
    }

    /// Returns a copy scaled to exactly `width` x `height`. Same-size requests
    /// share the existing buffer.
    pub fn resized(&self, width: u32, height: u32) -> Image {
        if self.dimensions() == (width.max(1), height.max(1)) {
            return self.clone();
        }
        let scaled = imageops::resize(
            self.pixels.as_ref(),
            width.max(1),
            height.max(1),
            FilterType::Triangle,
        );
        Image {
            pixels: Arc::new(scaled),
        }
    }

    /// Copies out `rect` clipped to the image bounds.
    pub fn crop(&self, rect: Rect) -> Option<Image> {
        let clipped = rect.clamp_to(self.width(), self.height())?;
        let view = imageops::crop_imm(
            self.pixels.as_ref(),
            clipped.x,
            clipped.y,
            clipped.width,
            clipped.height,
        );
        Some(Image {
            pixels: Arc::new(view.to_image()),
        })
    }

    pub fn to_png_bytes(&self) -> image::ImageResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(self.to_rgb()).write_to(&mut buffer, ImageOutputFormat::Png)?;
        Ok(buffer.into_inner())
    }
}
