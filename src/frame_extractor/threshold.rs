//! 自适应阈值 - 每个视频按自身分数分布取四分位中点

use crate::core::error::CutterError;
use log::debug;

/// Linear-interpolated percentile (`p` in `0..=100`) of an ascending slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Quartiles of the score distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub first: f64,
    pub third: f64,
}

impl Quartiles {
    pub fn of(scores: &[f64]) -> Result<Self, CutterError> {
        if scores.len() < 2 {
            return Err(CutterError::InsufficientData(scores.len()));
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);
        Ok(Self {
            first: percentile(&sorted, 25.0),
            third: percentile(&sorted, 75.0),
        })
    }

    /// Midpoint between the quartiles.
    pub fn midpoint(&self) -> f64 {
        self.first + (self.third - self.first) / 2.0
    }
}

pub fn match_threshold(scores: &[f64]) -> Result<f64, CutterError> {
    let quartiles = Quartiles::of(scores)?;
    let threshold = quartiles.midpoint();
    debug!(
        "Q1 = {:.4}, Q3 = {:.4}, threshold = {:.4}",
        quartiles.first, quartiles.third, threshold
    );
    Ok(threshold)
}

/// `score > threshold` per sample; equal scores are not matches.
pub fn match_series(scores: &[f64]) -> Result<Vec<bool>, CutterError> {
    let threshold = match_threshold(scores)?;
    Ok(scores.iter().map(|&score| score > threshold).collect())
}
