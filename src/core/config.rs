//! 切片配置

use crate::core::error::CutterError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunable parameters for detection and clip writing.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "intervals": 30, "end_grace": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterConfig {
    /// 采样间隔（秒）
    pub intervals: u32,
    /// 进入片段所需的连续匹配数
    pub start_grace: usize,
    /// 退出片段所需的连续不匹配数
    pub end_grace: usize,
    /// Samples into the end-grace window used as the stop timestamp.
    pub stop_offset: usize,
    /// First frame index to sample.
    pub start_frame: u64,
    pub image_dir: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    /// Leave the source video in place after its clips are written.
    pub keep_source: bool,
    pub video_codec: String,
    pub audio_codec: String,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            intervals: 15,
            start_grace: 5,
            end_grace: 5,
            stop_offset: 2,
            start_frame: 0,
            image_dir: PathBuf::from("image-data"),
            output_dir: PathBuf::from("cuts"),
            temp_dir: PathBuf::from("temp"),
            keep_source: false,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

impl CutterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CutterError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: CutterConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CutterError> {
        if self.intervals == 0 {
            return Err(CutterError::Config("intervals must be positive".into()));
        }
        if self.start_grace == 0 {
            return Err(CutterError::Config("start_grace must be at least 1".into()));
        }
        if self.end_grace == 0 {
            return Err(CutterError::Config("end_grace must be at least 1".into()));
        }
        if self.video_codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(CutterError::Config("codecs must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = CutterConfig::default();
        assert_eq!(config.intervals, 15);
        assert_eq!(config.start_grace, 5);
        assert_eq!(config.end_grace, 5);
        assert_eq!(config.stop_offset, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "intervals": 30, "end_grace": 3 }}"#).unwrap();

        let config = CutterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.intervals, 30);
        assert_eq!(config.end_grace, 3);
        assert_eq!(config.start_grace, 5);
        assert_eq!(config.output_dir, PathBuf::from("cuts"));
    }

    #[test]
    fn test_zero_grace_rejected() {
        let config = CutterConfig {
            end_grace: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CutterError::Config(_))));

        let config = CutterConfig {
            start_grace: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CutterError::Config(_))));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            CutterConfig::from_file(file.path()),
            Err(CutterError::Json(_))
        ));
    }
}
