use std::collections::HashMap;
use std::sync::Mutex;

use design_match_types::{ComparisonResult, Image};
use log::debug;
use sha2::{Digest, Sha256};

use crate::error::DesignMatchError;
use crate::pipeline::DesignMatcher;

/// Content fingerprint of an image pair: SHA-256 over both images'
/// dimensions and pixels, hex encoded.
pub fn pair_fingerprint(reference: &Image, implementation: &Image) -> String {
    let mut hasher = Sha256::new();
    for image in [reference, implementation] {
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.as_rgb().as_raw());
    }
    hex::encode(hasher.finalize())
}

/// In-memory memo of finished comparisons keyed by [`pair_fingerprint`].
///
/// Library API for embedders that keep one [`DesignMatcher`] alive across
/// many requests. The one-shot [`crate::run`] path does not use it.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, ComparisonResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<ComparisonResult> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Returns the cached result for the pair or runs the comparison and
    /// stores it. Failed comparisons are not cached.
    pub fn compare(
        &self,
        matcher: &DesignMatcher,
        reference: &Image,
        implementation: &Image,
    ) -> Result<ComparisonResult, DesignMatchError> {
        let key = pair_fingerprint(reference, implementation);
        if let Some(hit) = self.get(&key) {
            debug!("comparison cache hit {}", &key[..12]);
            return Ok(hit);
        }
        let result = matcher.compare(reference, implementation)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, result.clone());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, value: u8) -> Image {
        Image::from_rgb(RgbImage::from_pixel(width, height, Rgb([value; 3]))).unwrap()
    }

    #[test]
    fn fingerprint_depends_on_order_pixels_and_shape() {
        let a = solid(4, 4, 10);
        let b = solid(4, 4, 11);
        let tall = solid(2, 8, 10);
        let key = pair_fingerprint(&a, &b);
        assert_eq!(key.len(), 64);
        assert_eq!(key, pair_fingerprint(&a, &b));
        assert_ne!(key, pair_fingerprint(&b, &a));
        assert_ne!(pair_fingerprint(&a, &a), pair_fingerprint(&tall, &tall));
    }
}
