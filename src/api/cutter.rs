//! 视频切片器 - 检测 + 导出，批量处理时按视频隔离错误

use crate::core::config::CutterConfig;
use crate::core::error::CutterError;
use crate::core::reference::ReferenceSet;
use crate::core::video::{
    ClipEncoder, ClipReport, ClipWriter, FfmpegEncoder, FfmpegOpener, SourceOpener,
};
use crate::frame_extractor::{CutDetector, DetectionConfig, DetectionResult};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub const VIDEO_EXTENSION: &str = "mp4";

/// Result of cutting one video of a batch.
#[derive(Debug)]
pub struct VideoOutcome {
    pub path: PathBuf,
    pub result: Result<ClipReport, CutterError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub videos: Vec<VideoOutcome>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &VideoOutcome> {
        self.videos.iter().filter(|v| match &v.result {
            Ok(report) => !report.is_complete(),
            Err(_) => true,
        })
    }

    pub fn clips_written(&self) -> usize {
        self.videos
            .iter()
            .filter_map(|v| v.result.as_ref().ok())
            .map(|r| r.written.len())
            .sum()
    }
}

/// 视频切片器
///
/// The reference set is loaded once and reused for every video.
///
/// ```ignore
/// let cutter = VideoCutter::create(CutterConfig::default())?;
/// let report = cutter.process_batch(&collect_inputs(&["recordings".into()])?);
/// ```
pub struct VideoCutter<O: SourceOpener = FfmpegOpener, E: ClipEncoder = FfmpegEncoder> {
    references: ReferenceSet,
    config: CutterConfig,
    opener: O,
    encoder: E,
    abort: Option<Arc<AtomicBool>>,
}

impl VideoCutter {
    /// Validate `config` and load the reference set; fails before any video is touched.
    pub fn create(config: CutterConfig) -> Result<Self, CutterError> {
        config.validate()?;
        let references = ReferenceSet::load(&config.image_dir)?;
        let encoder = FfmpegEncoder::with_codecs(&config.video_codec, &config.audio_codec);
        info!("🎬 VideoCutter: created with {} references", references.len());
        Ok(Self::with_parts(references, config, FfmpegOpener, encoder))
    }
}

impl<O: SourceOpener, E: ClipEncoder> VideoCutter<O, E> {
    pub fn with_parts(
        references: ReferenceSet,
        config: CutterConfig,
        opener: O,
        encoder: E,
    ) -> Self {
        Self {
            references,
            config,
            opener,
            encoder,
            abort: None,
        }
    }

    pub fn abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    pub fn config(&self) -> &CutterConfig {
        &self.config
    }

    fn detector(&self) -> CutDetector<'_> {
        let detector =
            CutDetector::with_config(&self.references, DetectionConfig::from(&self.config));
        match &self.abort {
            Some(flag) => detector.abort_flag(flag.clone()),
            None => detector,
        }
    }

    /// Run detection only. Nothing on disk changes.
    pub fn detect(&self, path: &Path) -> Result<DetectionResult, CutterError> {
        let path = video_path(path);
        info!("📖 Reading {:?}", path);
        let source = self.opener.open(&path)?;
        self.detector().detect(source)
    }

    /// Detect, write one clip per cut, then delete the source.
    pub fn cut_video(&self, path: &Path) -> Result<ClipReport, CutterError> {
        let path = video_path(path);
        let detection = self.detect(&path)?;
        ClipWriter::new(&self.encoder, &self.config.output_dir, &self.config.temp_dir)
            .keep_source(self.config.keep_source)
            .write_clips(&path, &detection.cuts)
    }

    /// Cut every video; a failure is logged and recorded and the batch moves on.
    pub fn process_batch(&self, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for (i, path) in paths.iter().enumerate() {
            info!("📦 Video {}/{}: {:?}", i + 1, paths.len(), path);
            let result = self.cut_video(path);
            match &result {
                Ok(clips) => info!(
                    "✅ {:?}: {} clips written, {} failed",
                    path,
                    clips.written.len(),
                    clips.failed.len()
                ),
                Err(e) => error!("❌ {:?} skipped: {}", path, e),
            }
            report.videos.push(VideoOutcome {
                path: path.clone(),
                result,
            });
        }
        report
    }
}

/// Accept either `<stem>` or `<stem>.mp4`. Dots inside the stem are kept.
pub fn video_path(path: &Path) -> PathBuf {
    if has_video_extension(path) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(VIDEO_EXTENSION);
    PathBuf::from(name)
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(VIDEO_EXTENSION))
        .unwrap_or(false)
}

/// Expand directories into their `.mp4` files (sorted); other paths pass through.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CutterError> {
    let mut videos = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && has_video_extension(p))
                .collect();
            found.sort();
            videos.extend(found);
        } else {
            videos.push(video_path(input));
        }
    }
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Cut;
    use crate::core::video::writer::tests::MockEncoder;
    use crate::frame_extractor::sampler::tests::{active_image, MockSource};

    /// Opens `two_segments.mp4` and `idle.mp4` as synthetic videos; anything else fails to decode.
    struct MockOpener;

    impl SourceOpener for MockOpener {
        type Source = MockSource;

        fn open(&self, path: &Path) -> Result<MockSource, CutterError> {
            if !path.exists() {
                return Err(CutterError::Decode(format!("{:?} does not exist", path)));
            }
            match path.file_name().and_then(|n| n.to_str()) {
                Some("two_segments.mp4") => Ok(MockSource::new(30.0, 900, |s| {
                    (120..300).contains(&s) || (480..690).contains(&s)
                })),
                Some("idle.mp4") => Ok(MockSource::new(30.0, 300, |_| false)),
                Some("short.mp4") => Ok(MockSource::new(30.0, 5, |_| true)),
                _ => Err(CutterError::Decode(format!("cannot decode {:?}", path))),
            }
        }
    }

    fn cutter(dir: &Path, encoder: MockEncoder) -> VideoCutter<MockOpener, MockEncoder> {
        let config = CutterConfig {
            output_dir: dir.join("cuts"),
            temp_dir: dir.join("temp"),
            ..Default::default()
        };
        let references = ReferenceSet::from_images(vec![active_image()]).unwrap();
        VideoCutter::with_parts(references, config, MockOpener, encoder)
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"video").unwrap();
        path
    }

    #[test]
    fn test_cut_video_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch(dir.path(), "two_segments.mp4");
        let cutter = cutter(dir.path(), MockEncoder::new());

        let report = cutter.cut_video(&dir.path().join("two_segments")).unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            report.written[1],
            dir.path().join("cuts").join("two_segments_2.mp4")
        );
        assert!(!source.exists());

        let calls = cutter.encoder.calls.borrow();
        assert_eq!(calls[0].0, Cut::new(120, 330));
        assert_eq!(calls[1].0, Cut::new(480, 720));
    }

    #[test]
    fn test_detect_leaves_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch(dir.path(), "two_segments.mp4");
        let cutter = cutter(dir.path(), MockEncoder::new());

        let result = cutter.detect(&source).unwrap();
        assert_eq!(result.cuts.len(), 2);
        assert!(source.exists());
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let broken = touch(dir.path(), "broken.mp4");
        let short = touch(dir.path(), "short.mp4");
        let good = touch(dir.path(), "two_segments.mp4");
        let idle = touch(dir.path(), "idle.mp4");
        let cutter = cutter(dir.path(), MockEncoder::failing_at(vec![480]));

        let paths = vec![broken.clone(), short.clone(), good.clone(), idle.clone()];
        let report = cutter.process_batch(&paths);

        assert_eq!(report.videos.len(), 4);
        assert!(matches!(report.videos[0].result, Err(CutterError::Decode(_))));
        assert!(matches!(
            report.videos[1].result,
            Err(CutterError::InsufficientData(1))
        ));
        let good_report = report.videos[2].result.as_ref().unwrap();
        assert_eq!(good_report.written.len(), 1);
        assert_eq!(good_report.failed.len(), 1);
        assert!(report.videos[3].result.as_ref().unwrap().written.is_empty());

        // failed videos keep their source; attempted ones are removed
        assert!(broken.exists());
        assert!(short.exists());
        assert!(!good.exists());
        assert!(!idle.exists());

        assert_eq!(report.clips_written(), 1);
        assert_eq!(report.failed().count(), 3);
    }

    #[test]
    fn test_batch_keeps_clips_when_source_removal_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("two_segments.mp4");
        std::fs::create_dir(&source).unwrap();
        let cutter = cutter(dir.path(), MockEncoder::new());

        let report = cutter.process_batch(&[source.clone()]);
        let clips = report.videos[0].result.as_ref().unwrap();
        assert_eq!(clips.written.len(), 2);
        assert!(clips.source_error.is_some());
        assert_eq!(report.clips_written(), 2);
        assert_eq!(report.failed().count(), 1);
        assert!(source.exists());
    }

    #[test]
    fn test_video_path() {
        assert_eq!(video_path(Path::new("rec/a")), PathBuf::from("rec/a.mp4"));
        assert_eq!(video_path(Path::new("rec/a.mp4")), PathBuf::from("rec/a.mp4"));
        assert_eq!(video_path(Path::new("rec/a.MP4")), PathBuf::from("rec/a.MP4"));
        assert_eq!(
            video_path(Path::new("recordings/session.2024-01-05")),
            PathBuf::from("recordings/session.2024-01-05.mp4")
        );
    }

    #[test]
    fn test_collect_inputs_expands_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.mp4");
        touch(dir.path(), "a.MP4");
        touch(dir.path(), "notes.txt");

        let inputs = collect_inputs(&[dir.path().to_path_buf(), PathBuf::from("other/c")]).unwrap();
        assert_eq!(
            inputs,
            vec![
                dir.path().join("a.MP4"),
                dir.path().join("b.mp4"),
                PathBuf::from("other/c.mp4"),
            ]
        );
    }
}
