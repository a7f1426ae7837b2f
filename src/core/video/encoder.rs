//! 片段编码 - 调用 ffmpeg 导出单个片段

use super::source::has_audio;
use crate::api::models::Cut;
use crate::core::error::CutterError;
use log::{debug, info};
use std::path::Path;
use std::process::{Command, Stdio};

/// Materializes one cut of a source video as a standalone file.
pub trait ClipEncoder {
    /// `scratch_audio` is a temp path the encoder may use for the audio
    /// track; the caller removes it afterwards.
    fn encode(
        &self,
        source: &Path,
        cut: &Cut,
        output: &Path,
        scratch_audio: &Path,
    ) -> Result<(), CutterError>;
}

pub struct FfmpegEncoder {
    video_codec: String,
    audio_codec: String,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::with_codecs("libx264", "aac")
    }

    pub fn with_codecs(video_codec: impl Into<String>, audio_codec: impl Into<String>) -> Self {
        Self {
            video_codec: video_codec.into(),
            audio_codec: audio_codec.into(),
        }
    }

    fn run(mut command: Command, what: &str) -> Result<(), CutterError> {
        debug!("Running {:?}", command);
        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|e| CutterError::Encode(format!("failed to run ffmpeg ({}): {}", what, e)))?;
        if !output.status.success() {
            return Err(CutterError::Encode(format!(
                "ffmpeg {} failed: {}",
                what,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    fn trimmed(source: &Path, cut: &Cut) -> Command {
        let mut command = Command::new("ffmpeg");
        command
            .args(["-y", "-v", "error"])
            .args(["-ss", cut.start_time.to_string().as_str()])
            .args(["-to", cut.stop_time.to_string().as_str()])
            .arg("-i")
            .arg(source);
        command
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipEncoder for FfmpegEncoder {
    fn encode(
        &self,
        source: &Path,
        cut: &Cut,
        output: &Path,
        scratch_audio: &Path,
    ) -> Result<(), CutterError> {
        if cut.stop_time <= cut.start_time {
            return Err(CutterError::Encode(format!("empty cut {}", cut)));
        }

        let with_audio = has_audio(source).map_err(|e| {
            CutterError::Encode(format!("audio probe of {:?} failed: {}", source, e))
        })?;
        if with_audio {
            let mut audio = Self::trimmed(source, cut);
            audio.args(["-vn", "-c:a", self.audio_codec.as_str()]).arg(scratch_audio);
            Self::run(audio, "audio extraction")?;
        }

        let mut video = Self::trimmed(source, cut);
        if with_audio {
            // The scratch track is already trimmed, so it is read from zero
            video.arg("-i").arg(scratch_audio);
            video.args(["-map", "0:v:0", "-map", "1:a:0", "-c:a", "copy"]);
        } else {
            video.args(["-map", "0:v:0"]);
        }
        video.args(["-c:v", self.video_codec.as_str()]).arg(output);
        Self::run(video, "clip encode")?;

        info!("💾 Wrote {:?} ({})", output, cut);
        Ok(())
    }
}
