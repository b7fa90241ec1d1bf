use design_match_types::Image;
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Resizes `reference` onto the implementation canvas. The implementation
/// is never rescaled.
pub fn normalize_onto(reference: &Image, implementation: &Image) -> Image {
    let (width, height) = implementation.dimensions();
    reference.resized(width, height)
}

/// Per-channel absolute difference of two same-sized images.
pub fn abs_diff_rgb(a: &RgbImage, b: &RgbImage) -> RgbImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        Rgb([
            pa[0].abs_diff(pb[0]),
            pa[1].abs_diff(pb[1]),
            pa[2].abs_diff(pb[2]),
        ])
    })
}

/// Pixels strictly above `threshold` become 255, everything else 0.
pub fn threshold_binary(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Mean of every `size` x `size` window that fits entirely inside the image,
/// laid out row-major with `(width - size + 1)` columns.
pub fn box_mean_valid(pixels: &[f64], width: usize, height: usize, size: usize) -> Vec<f64> {
    assert_eq!(pixels.len(), width * height);
    if size == 0 || width < size || height < size {
        return Vec::new();
    }
    let stride = width + 1;
    let mut integral = vec![0f64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0f64;
        for x in 0..width {
            row_sum += pixels[y * width + x];
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
    let out_w = width - size + 1;
    let out_h = height - size + 1;
    let norm = (size * size) as f64;
    let mut output = Vec::with_capacity(out_w * out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let sum = integral[(y + size) * stride + x + size] + integral[y * stride + x]
                - integral[y * stride + x + size]
                - integral[(y + size) * stride + x];
            output.push(sum / norm);
        }
    }
    output
}

pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let mean_a = a[..len].iter().sum::<f64>() / len as f64;
    let mean_b = b[..len].iter().sum::<f64>() / len as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for idx in 0..len {
        let da = a[idx] - mean_a;
        let db = b[idx] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON {
        return if a[..len] == b[..len] { 1.0 } else { 0.0 };
    }
    (cov / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_mean_covers_valid_interior_only() {
        let pixels: Vec<f64> = (0..16).map(f64::from).collect();
        let means = box_mean_valid(&pixels, 4, 4, 3);
        assert_eq!(means.len(), 4);
        assert_eq!(means[0], 5.0);
        assert_eq!(means[3], 10.0);
        assert!(box_mean_valid(&pixels, 4, 4, 5).is_empty());
    }

    #[test]
    fn correlation_bounds() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [4.0, 3.0, 2.0, 1.0];
        assert!((pearson_correlation(&a, &a) - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&a, &b) + 1.0).abs() < 1e-12);
        assert_eq!(pearson_correlation(&[2.0; 4], &[2.0; 4]), 1.0);
        assert_eq!(pearson_correlation(&[2.0; 4], &[3.0; 4]), 0.0);
    }

    #[test]
    fn diff_and_threshold() {
        let a = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        let mut b = a.clone();
        b.put_pixel(1, 0, Rgb([200, 40, 100]));
        let diff = abs_diff_rgb(&a, &b);
        assert_eq!(diff.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(diff.get_pixel(1, 0), &Rgb([100, 60, 0]));
        let gray = GrayImage::from_raw(3, 1, vec![49, 50, 51]).unwrap();
        let mask = threshold_binary(&gray, 50);
        assert_eq!(mask.as_raw(), &vec![0, 0, 255]);
    }
}
