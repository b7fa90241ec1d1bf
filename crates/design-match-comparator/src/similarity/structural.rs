use design_match_types::SimilarityMetric;
use image::GrayImage;
use rayon::prelude::*;

use super::LayoutMetric;
use crate::pipeline::ops::box_mean_valid;

const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Windowed SSIM over uniform 7x7 windows with sample covariance, averaged
/// over every window that fits inside the image.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralSsimMetric;

impl StructuralSsimMetric {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutMetric for StructuralSsimMetric {
    fn kind(&self) -> SimilarityMetric {
        SimilarityMetric::Ssim
    }

    fn similarity(&self, reference: &GrayImage, implementation: &GrayImage) -> f64 {
        if reference.dimensions() != implementation.dimensions() {
            return 0.0;
        }
        if reference.as_raw() == implementation.as_raw() {
            return 1.0;
        }
        let (width, height) = reference.dimensions();
        let (width, height) = (width as usize, height as usize);
        let x: Vec<f64> = reference.as_raw().iter().map(|&v| v as f64).collect();
        let y: Vec<f64> = implementation.as_raw().iter().map(|&v| v as f64).collect();
        let ssim = if width < WINDOW || height < WINDOW {
            global_ssim(&x, &y)
        } else {
            windowed_ssim(&x, &y, width, height)
        };
        ssim.clamp(0.0, 1.0)
    }
}

fn constants() -> (f64, f64) {
    ((K1 * DATA_RANGE).powi(2), (K2 * DATA_RANGE).powi(2))
}

fn windowed_ssim(x: &[f64], y: &[f64], width: usize, height: usize) -> f64 {
    let xx: Vec<f64> = x.iter().map(|v| v * v).collect();
    let yy: Vec<f64> = y.iter().map(|v| v * v).collect();
    let xy: Vec<f64> = x.iter().zip(y).map(|(a, b)| a * b).collect();

    let ((ux, uy), (uxx, (uyy, uxy))) = rayon::join(
        || {
            rayon::join(
                || box_mean_valid(x, width, height, WINDOW),
                || box_mean_valid(y, width, height, WINDOW),
            )
        },
        || {
            rayon::join(
                || box_mean_valid(&xx, width, height, WINDOW),
                || {
                    rayon::join(
                        || box_mean_valid(&yy, width, height, WINDOW),
                        || box_mean_valid(&xy, width, height, WINDOW),
                    )
                },
            )
        },
    );

    let samples = (WINDOW * WINDOW) as f64;
    let cov_norm = samples / (samples - 1.0);
    let (c1, c2) = constants();
    let total: f64 = (0..ux.len())
        .into_par_iter()
        .map(|i| {
            let vx = cov_norm * (uxx[i] - ux[i] * ux[i]);
            let vy = cov_norm * (uyy[i] - uy[i] * uy[i]);
            let vxy = cov_norm * (uxy[i] - ux[i] * uy[i]);
            let numerator = (2.0 * ux[i] * uy[i] + c1) * (2.0 * vxy + c2);
            let denominator = (ux[i] * ux[i] + uy[i] * uy[i] + c1) * (vx + vy + c2);
            numerator / denominator
        })
        .sum();
    total / ux.len() as f64
}

/// Single-window SSIM for images smaller than the window.
fn global_ssim(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov = 0.0;
    for idx in 0..n {
        let dx = x[idx] - mean_x;
        let dy = y[idx] - mean_y;
        var_x += dx * dx;
        var_y += dy * dy;
        cov += dx * dy;
    }
    let denom = n.saturating_sub(1).max(1) as f64;
    var_x /= denom;
    var_y /= denom;
    cov /= denom;
    let (c1, c2) = constants();
    ((2.0 * mean_x * mean_y + c1) * (2.0 * cov + c2))
        / ((mean_x * mean_x + mean_y * mean_y + c1) * (var_x + var_y + c2))
}
