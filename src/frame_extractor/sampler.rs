use crate::api::models::SamplePoint;
use crate::core::error::CutterError;
use crate::core::reference::ReferenceSet;
use crate::core::video::source::VideoSource;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_INTERVAL_SECS: u32 = 15;

/// Walks a video at a fixed interval and scores each sampled frame against
/// the reference set.
pub struct FrameSampler<'a> {
    references: &'a ReferenceSet,
    interval_secs: u32,
    start_frame: u64,
    abort: Option<Arc<AtomicBool>>,
}

impl<'a> FrameSampler<'a> {
    pub fn new(references: &'a ReferenceSet) -> Self {
        Self::with_interval(references, DEFAULT_INTERVAL_SECS)
    }

    pub fn with_interval(references: &'a ReferenceSet, interval_secs: u32) -> Self {
        Self {
            references,
            interval_secs,
            start_frame: 0,
            abort: None,
        }
    }

    pub fn start_frame(mut self, frame: u64) -> Self {
        self.start_frame = frame;
        self
    }

    /// Sampling stops at the next frame once `flag` is set.
    pub fn abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Frames skipped between two samples.
    pub fn step(&self, fps: f64) -> u64 {
        ((fps * self.interval_secs as f64).round() as u64).max(1)
    }

    /// Produce the score series for `source`.
    ///
    /// The source is consumed and released when this returns, whether
    /// sampling ran to the end of the stream, was aborted, or failed.
    pub fn sample<S: VideoSource>(&self, mut source: S) -> Result<Vec<SamplePoint>, CutterError> {
        let fps = source.fps();
        if !fps.is_finite() || fps <= 0.0 {
            return Err(CutterError::Decode(format!("invalid frame rate {}", fps)));
        }

        let step = self.step(fps);
        info!(
            "🔍 Sampling every {}s ({} frames at {:.3} fps) from frame {}",
            self.interval_secs, step, fps, self.start_frame
        );

        let mut samples = Vec::new();
        let mut frame_index = self.start_frame;

        loop {
            if self.is_aborted() {
                warn!("⏹️ Sampling aborted after {} samples", samples.len());
                break;
            }

            let frame = match source.read_frame(frame_index)? {
                Some(frame) => frame,
                None => break,
            };

            let score = self.references.best_score(&frame)?;
            let timestamp = (frame_index as f64 / fps).floor() as u64;
            debug!("   frame {} @ {}s -> {:.4}", frame_index, timestamp, score);
            samples.push(SamplePoint { timestamp, score });

            frame_index += step;
        }

        info!("📊 Collected {} samples", samples.len());
        Ok(samples)
    }

    fn is_aborted(&self) -> bool {
        self.abort
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}
