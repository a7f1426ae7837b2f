//! 视频源 - 按帧号随机读取

use super::frame::Frame;
use crate::core::error::CutterError;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Random access to the frames of one video.
pub trait VideoSource {
    fn fps(&self) -> f64;

    /// Decode the frame at `index`. `Ok(None)` means the stream is exhausted.
    fn read_frame(&mut self, index: u64) -> Result<Option<Frame>, CutterError>;
}

/// Opens a [`VideoSource`] for a file on disk.
pub trait SourceOpener {
    type Source: VideoSource;

    fn open(&self, path: &Path) -> Result<Self::Source, CutterError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoParams {
    pub framerate: f64,
    pub width: u32,
    pub height: u32,
    pub duration: Duration,
}

impl VideoParams {
    /// Parse `key=value` lines as printed by `ffprobe -of default=noprint_wrappers=1`.
    pub fn parse(probe_output: &str) -> Result<Self, CutterError> {
        let mut width = None;
        let mut height = None;
        let mut framerate = None;
        let mut duration = None;

        for line in probe_output.lines() {
            let line = line.trim();
            if let Some(val) = line.strip_prefix("width=") {
                width = val.parse().ok();
            } else if let Some(val) = line.strip_prefix("height=") {
                height = val.parse().ok();
            } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
                let mut parts = val.splitn(2, '/');
                let num: f64 = parts.next().unwrap_or("0").parse().unwrap_or(0.0);
                let den: f64 = parts.next().unwrap_or("1").parse().unwrap_or(0.0);
                framerate = Some(if den != 0.0 { num / den } else { 0.0 });
            } else if let Some(val) = line.strip_prefix("duration=") {
                duration = val.parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0);
            }
        }

        let framerate = framerate
            .filter(|fps| *fps > 0.0)
            .ok_or_else(|| CutterError::Decode("missing or zero frame rate".into()))?;
        let width = width.ok_or_else(|| CutterError::Decode("missing width".into()))?;
        let height = height.ok_or_else(|| CutterError::Decode("missing height".into()))?;
        let duration = duration.ok_or_else(|| CutterError::Decode("missing duration".into()))?;

        Ok(Self {
            framerate,
            width,
            height,
            duration: Duration::from_secs_f64(duration),
        })
    }
}

/// Probe a file with `ffprobe`.
pub fn probe(path: &Path) -> Result<VideoParams, CutterError> {
    if !path.exists() {
        return Err(CutterError::Decode(format!("{:?} does not exist", path)));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height,r_frame_rate",
            "-show_entries", "format=duration",
            "-of", "default=noprint_wrappers=1:nokey=0",
        ])
        .arg(path)
        .output()
        .map_err(|e| CutterError::Decode(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(CutterError::Decode(format!(
            "ffprobe failed on {:?}: {}",
            path,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    VideoParams::parse(&String::from_utf8_lossy(&output.stdout))
}

/// Whether the file carries at least one audio stream.
pub fn has_audio(path: &Path) -> Result<bool, CutterError> {
    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "a",
            "-show_entries", "stream=index",
            "-of", "csv=p=0",
        ])
        .arg(path)
        .output()?;
    Ok(output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Decodes single frames by seeking with the `ffmpeg` CLI.
pub struct FfmpegSource {
    path: PathBuf,
    params: VideoParams,
}

impl FfmpegSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CutterError> {
        let path = path.as_ref().to_path_buf();
        let params = probe(&path)?;
        info!(
            "🎬 Opened {:?}: {}x{} @ {:.3} fps, {:.1}s",
            path,
            params.width,
            params.height,
            params.framerate,
            params.duration.as_secs_f64()
        );
        Ok(Self { path, params })
    }

    fn frame_bytes(&self) -> usize {
        self.params.width as usize * self.params.height as usize * 3
    }
}

impl VideoSource for FfmpegSource {
    fn fps(&self) -> f64 {
        self.params.framerate
    }

    fn read_frame(&mut self, index: u64) -> Result<Option<Frame>, CutterError> {
        let seconds = index as f64 / self.params.framerate;
        if seconds >= self.params.duration.as_secs_f64() {
            return Ok(None);
        }

        let output = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", format!("{:.3}", seconds).as_str(), "-i"])
            .arg(&self.path)
            .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| CutterError::Decode(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(CutterError::Decode(format!(
                "ffmpeg failed reading frame {} of {:?}: {}",
                index,
                self.path,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // Seeking into the tail of the last frame yields no data
        if output.stdout.is_empty() {
            return Ok(None);
        }
        if output.stdout.len() != self.frame_bytes() {
            return Err(CutterError::Decode(format!(
                "frame {} is {} bytes, expected {}",
                index,
                output.stdout.len(),
                self.frame_bytes()
            )));
        }

        debug!("Decoded frame {} at {:.2}s", index, seconds);
        Ok(Some(Frame::new(
            self.params.width,
            self.params.height,
            output.stdout,
            Duration::from_secs_f64(seconds),
            index,
        )))
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        info!("🗑️ FfmpegSource: released {:?}", self.path);
    }
}

/// Opens [`FfmpegSource`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegOpener;

impl SourceOpener for FfmpegOpener {
    type Source = FfmpegSource;

    fn open(&self, path: &Path) -> Result<FfmpegSource, CutterError> {
        FfmpegSource::open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let out = "width=1920\nheight=1080\nr_frame_rate=30000/1001\nduration=125.500000\n";
        let params = VideoParams::parse(out).unwrap();
        assert_eq!(params.width, 1920);
        assert_eq!(params.height, 1080);
        assert!((params.framerate - 29.97).abs() < 0.01);
        assert_eq!(params.duration.as_millis(), 125_500);
    }

    #[test]
    fn test_parse_zero_framerate() {
        let out = "width=640\nheight=480\nr_frame_rate=0/0\nduration=10.0\n";
        assert!(matches!(VideoParams::parse(out), Err(CutterError::Decode(_))));
    }

    #[test]
    fn test_parse_missing_fields() {
        assert!(matches!(VideoParams::parse(""), Err(CutterError::Decode(_))));
        let out = "width=640\nr_frame_rate=30/1\nduration=10.0\n";
        assert!(matches!(VideoParams::parse(out), Err(CutterError::Decode(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FfmpegSource::open(dir.path().join("missing.mp4"));
        assert!(matches!(result, Err(CutterError::Decode(_))));
    }
}
