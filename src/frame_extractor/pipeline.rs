use crate::api::models::{Cut, SamplePoint};
use crate::core::config::CutterConfig;
use crate::core::error::CutterError;
use crate::core::reference::ReferenceSet;
use crate::core::video::source::VideoSource;
use crate::frame_extractor::sampler::{FrameSampler, DEFAULT_INTERVAL_SECS};
use crate::frame_extractor::state_machine::{GraceConfig, SegmentExtractor};
use crate::frame_extractor::threshold;
use log::{debug, info};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DetectionConfig {
    pub interval_secs: u32,
    pub start_frame: u64,
    pub grace: GraceConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            start_frame: 0,
            grace: GraceConfig::default(),
        }
    }
}

impl From<&CutterConfig> for DetectionConfig {
    fn from(config: &CutterConfig) -> Self {
        Self {
            interval_secs: config.intervals,
            start_frame: config.start_frame,
            grace: GraceConfig {
                start_grace: config.start_grace,
                end_grace: config.end_grace,
                stop_offset: config.stop_offset,
            },
        }
    }
}

/// Everything detection learned about one video.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub samples: Vec<SamplePoint>,
    pub matches: Vec<bool>,
    pub cuts: Vec<Cut>,
}

/// Sampling → adaptive threshold → grace-windowed segmentation.
pub struct CutDetector<'a> {
    references: &'a ReferenceSet,
    config: DetectionConfig,
    extractor: SegmentExtractor,
    abort: Option<Arc<AtomicBool>>,
}

impl<'a> CutDetector<'a> {
    pub fn new(references: &'a ReferenceSet) -> Self {
        Self::with_config(references, DetectionConfig::default())
    }

    pub fn with_config(references: &'a ReferenceSet, config: DetectionConfig) -> Self {
        Self {
            references,
            extractor: SegmentExtractor::with_config(config.grace.clone()),
            config,
            abort: None,
        }
    }

    pub fn abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    pub fn detect<S: VideoSource>(&self, source: S) -> Result<DetectionResult, CutterError> {
        let mut sampler = FrameSampler::with_interval(self.references, self.config.interval_secs)
            .start_frame(self.config.start_frame);
        if let Some(flag) = &self.abort {
            sampler = sampler.abort_flag(flag.clone());
        }

        let samples = sampler.sample(source)?;
        let scores: Vec<f64> = samples.iter().map(|s| s.score).collect();
        let timestamps: Vec<u64> = samples.iter().map(|s| s.timestamp).collect();

        let matches = threshold::match_series(&scores)?;
        debug!("Match series: {:?}", matches);

        let cuts = self.extractor.extract(&matches, &timestamps);
        info!("🎯 Detected {} cuts: {:?}", cuts.len(), cuts);

        Ok(DetectionResult {
            samples,
            matches,
            cuts,
        })
    }

    pub fn get_cuts<S: VideoSource>(&self, source: S) -> Result<Vec<Cut>, CutterError> {
        Ok(self.detect(source)?.cuts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_extractor::sampler::tests::{active_image, MockSource};
    use std::sync::atomic::Ordering;

    fn references() -> ReferenceSet {
        ReferenceSet::from_images(vec![active_image()]).unwrap()
    }

    fn two_segment_video() -> MockSource {
        // active 120-299s and 480-689s in a 900s recording
        MockSource::new(30.0, 900, |s| (120..300).contains(&s) || (480..690).contains(&s))
    }

    #[test]
    fn test_two_segment_video_yields_two_cuts() {
        let refs = references();
        let detector = CutDetector::new(&refs);

        let result = detector.detect(two_segment_video()).unwrap();
        assert_eq!(result.samples.len(), 60);
        assert_eq!(result.matches.len(), result.samples.len());
        assert_eq!(result.cuts, vec![Cut::new(120, 330), Cut::new(480, 720)]);
    }

    #[test]
    fn test_coarser_interval() {
        let refs = references();
        let config = DetectionConfig {
            interval_secs: 10,
            ..Default::default()
        };
        let detector = CutDetector::with_config(&refs, config);
        let cuts = detector.get_cuts(two_segment_video()).unwrap();
        assert_eq!(cuts.len(), 2);
    }

    #[test]
    fn test_tiny_video_is_insufficient() {
        let refs = references();
        let detector = CutDetector::new(&refs);
        let result = detector.detect(MockSource::new(30.0, 10, |_| true));
        assert!(matches!(result, Err(CutterError::InsufficientData(1))));
    }

    #[test]
    fn test_aborted_detection() {
        let refs = references();
        let flag = Arc::new(AtomicBool::new(false));
        flag.store(true, Ordering::Relaxed);
        let detector = CutDetector::new(&refs).abort_flag(flag);
        let result = detector.detect(two_segment_video());
        assert!(matches!(result, Err(CutterError::InsufficientData(0))));
    }

    #[test]
    fn test_config_conversion() {
        let config = CutterConfig {
            intervals: 30,
            start_grace: 3,
            end_grace: 4,
            stop_offset: 1,
            start_frame: 90,
            ..Default::default()
        };
        let detection = DetectionConfig::from(&config);
        assert_eq!(detection.interval_secs, 30);
        assert_eq!(detection.start_frame, 90);
        assert_eq!(detection.grace.start_grace, 3);
        assert_eq!(detection.grace.end_grace, 4);
        assert_eq!(detection.grace.stop_offset, 1);
    }
}
