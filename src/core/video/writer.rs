//! 片段写出 - 逐个导出，全部尝试后删除源文件

use super::encoder::ClipEncoder;
use crate::api::models::Cut;
use crate::core::error::CutterError;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Outcome of writing every cut of one source.
#[derive(Debug, Default)]
pub struct ClipReport {
    pub written: Vec<PathBuf>,
    /// 1-based cut number paired with the failure.
    pub failed: Vec<(usize, CutterError)>,
    pub source_removed: bool,
    /// Set when the source could not be deleted after cutting.
    pub source_error: Option<CutterError>,
}

impl ClipReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.source_error.is_none()
    }
}

/// Removes its file when dropped.
struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("⚠️ Could not remove scratch file {:?}: {}", self.0, e),
        }
    }
}

pub struct ClipWriter<'a, E: ClipEncoder> {
    encoder: &'a E,
    output_dir: PathBuf,
    temp_dir: PathBuf,
    keep_source: bool,
}

impl<'a, E: ClipEncoder> ClipWriter<'a, E> {
    pub fn new(
        encoder: &'a E,
        output_dir: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            encoder,
            output_dir: output_dir.into(),
            temp_dir: temp_dir.into(),
            keep_source: false,
        }
    }

    pub fn keep_source(mut self, keep: bool) -> Self {
        self.keep_source = keep;
        self
    }

    /// `<output_dir>/<stem>_<n>.mp4`
    pub fn clip_path(&self, stem: &str, number: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{}.mp4", stem, number))
    }

    fn scratch_path(&self, stem: &str) -> PathBuf {
        self.temp_dir.join(format!("temp-audio-{}.m4a", stem))
    }

    /// Encode every cut, then delete `source`.
    ///
    /// A failing cut is logged and recorded without stopping the others. The
    /// source is only removed once every cut has been attempted; setup
    /// failures (unusable output directories) return early and leave it alone.
    /// A failed removal is recorded in the report next to the written clips.
    pub fn write_clips(&self, source: &Path, cuts: &[Cut]) -> Result<ClipReport, CutterError> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CutterError::Encode(format!("{:?} has no usable file stem", source)))?;

        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(&self.temp_dir)?;

        info!("✂️ Cutting {:?} at {:?}", source, cuts);
        let mut report = ClipReport::default();

        for (i, cut) in cuts.iter().enumerate() {
            let number = i + 1;
            let output = self.clip_path(stem, number);
            let scratch = ScratchFile(self.scratch_path(stem));

            match self.encoder.encode(source, cut, &output, &scratch.0) {
                Ok(()) => report.written.push(output),
                Err(e) => {
                    error!("❌ Cut {} ({}) of {:?} failed: {}", number, cut, source, e);
                    report.failed.push((number, e));
                }
            }
        }

        if self.keep_source {
            info!("📁 Keeping source {:?}", source);
        } else {
            match std::fs::remove_file(source) {
                Ok(()) => {
                    report.source_removed = true;
                    info!("🗑️ Removed source {:?}", source);
                }
                Err(e) => {
                    error!("❌ Could not remove source {:?}: {}", source, e);
                    report.source_error = Some(e.into());
                }
            }
        }

        Ok(report)
    }
}
