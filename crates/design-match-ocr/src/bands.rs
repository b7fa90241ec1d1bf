/// Default cap on band height for long screenshots.
pub const DEFAULT_SLICE_HEIGHT: u32 = 1024;

/// Horizontal slice of an image, in whole-image rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub y: u32,
    pub height: u32,
}

/// Splits `height` rows into consecutive, non-overlapping bands of at most
/// `cap` rows. A zero cap, or one at least as tall as the image, yields one
/// band covering everything.
pub fn slice_bands(height: u32, cap: u32) -> Vec<Band> {
    if height == 0 {
        return Vec::new();
    }
    let cap = if cap == 0 { height } else { cap.min(height) };
    let mut bands = Vec::with_capacity(height.div_ceil(cap) as usize);
    let mut y = 0;
    while y < height {
        let band_height = cap.min(height - y);
        bands.push(Band {
            y,
            height: band_height,
        });
        y += band_height;
    }
    bands
}
