//! Structural similarity between a frame and a reference image.
//!
//! Both sides are reduced to luminance and resized to a fixed portrait
//! resolution before comparison, so sources and references of different
//! sizes or aspect ratios are still comparable.

use crate::core::error::CutterError;
use crate::core::video::frame::Frame;
use image::imageops::{self, FilterType};
use image::GrayImage;

pub const CANONICAL_WIDTH: u32 = 360;
pub const CANONICAL_HEIGHT: u32 = 480;

const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Resize a luminance image to the canonical comparison resolution.
pub fn normalize(gray: &GrayImage) -> Result<GrayImage, CutterError> {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(CutterError::InvalidImage(format!("empty image {}x{}", w, h)));
    }
    if (w, h) == (CANONICAL_WIDTH, CANONICAL_HEIGHT) {
        return Ok(gray.clone());
    }
    Ok(imageops::resize(gray, CANONICAL_WIDTH, CANONICAL_HEIGHT, FilterType::Triangle))
}

/// Score a decoded frame against an already normalized reference.
pub fn frame_similarity(frame: &Frame, reference: &GrayImage) -> Result<f64, CutterError> {
    let gray = normalize(&frame.to_gray()?)?;
    ssim(&gray, reference)
}

/// Mean SSIM over every 7x7 window lying fully inside the images, clamped to `[0, 1]`.
pub fn ssim(a: &GrayImage, b: &GrayImage) -> Result<f64, CutterError> {
    if a.dimensions() != b.dimensions() {
        return Err(CutterError::InvalidImage(format!(
            "dimension mismatch {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let (w, h) = (a.width() as usize, a.height() as usize);
    if w < WINDOW || h < WINDOW {
        return Err(CutterError::InvalidImage(format!(
            "image {}x{} smaller than the {}x{} window",
            w, h, WINDOW, WINDOW
        )));
    }

    let sums = WindowSums::new(a.as_raw(), b.as_raw(), w, h);

    let n = (WINDOW * WINDOW) as f64;
    let cov_norm = n / (n - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let mut total = 0.0;
    let mut count = 0usize;
    for y0 in 0..=(h - WINDOW) {
        for x0 in 0..=(w - WINDOW) {
            let [sx, sy, sxx, syy, sxy] = sums.window(x0, y0);
            let ux = sx / n;
            let uy = sy / n;
            let vx = cov_norm * (sxx / n - ux * ux);
            let vy = cov_norm * (syy / n - uy * uy);
            let vxy = cov_norm * (sxy / n - ux * uy);

            let num = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let den = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            total += num / den;
            count += 1;
        }
    }

    Ok((total / count as f64).clamp(0.0, 1.0))
}

/// Summed-area tables for x, y, x², y² and xy.
struct WindowSums {
    stride: usize,
    tables: [Vec<f64>; 5],
}

impl WindowSums {
    fn new(a: &[u8], b: &[u8], w: usize, h: usize) -> Self {
        let stride = w + 1;
        let size = stride * (h + 1);
        let mut tables: [Vec<f64>; 5] = std::array::from_fn(|_| vec![0.0; size]);

        for y in 0..h {
            let mut row = [0.0f64; 5];
            for x in 0..w {
                let px = a[y * w + x] as f64;
                let py = b[y * w + x] as f64;
                let values = [px, py, px * px, py * py, px * py];
                let idx = (y + 1) * stride + (x + 1);
                for (k, table) in tables.iter_mut().enumerate() {
                    row[k] += values[k];
                    table[idx] = table[idx - stride] + row[k];
                }
            }
        }

        Self { stride, tables }
    }

    fn window(&self, x0: usize, y0: usize) -> [f64; 5] {
        let (x1, y1) = (x0 + WINDOW, y0 + WINDOW);
        let s = self.stride;
        std::array::from_fn(|k| {
            let t = &self.tables[k];
            t[y1 * s + x1] - t[y0 * s + x1] - t[y1 * s + x0] + t[y0 * s + x0]
        })
    }
}
