//! 参考图集 - 进程内只加载一次，之后只读共享

use crate::core::error::CutterError;
use crate::core::video::frame::Frame;
use crate::frame_extractor::similarity::{self, normalize};
use image::{GrayImage, RgbImage};
use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;

/// OS artifacts that show up in image folders and are never images.
const IGNORED_FILES: [&str; 3] = [".DS_Store", "Thumbs.db", "desktop.ini"];

/// Reference screenshots of the "active" state, stored pre-normalized
/// (luminance, canonical resolution).
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    images: Vec<GrayImage>,
}

impl ReferenceSet {
    /// Load every image in `dir`. Fails if the directory is missing, any
    /// entry is not a decodable image, or nothing usable is left.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CutterError> {
        let dir = dir.as_ref();
        info!("🖼️ Loading reference images from {:?}", dir);

        let entries = std::fs::read_dir(dir)
            .map_err(|e| CutterError::Load(format!("cannot read {:?}: {}", dir, e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CutterError::Load(e.to_string()))?;
            let path = entry.path();
            if path.is_dir() || is_os_artifact(&path) {
                debug!("Skipping {:?}", path);
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in &paths {
            let image = image::open(path)
                .map_err(|e| CutterError::Load(format!("{:?} is not a valid image: {}", path, e)))?;
            images.push(image.to_rgb8());
        }

        let set = Self::from_images(images).map_err(|e| match e {
            CutterError::Load(_) => CutterError::Load(format!("no usable images in {:?}", dir)),
            other => CutterError::Load(other.to_string()),
        })?;
        info!("✅ Loaded {} reference images", set.len());
        Ok(set)
    }

    /// Build a set from in-memory images.
    pub fn from_images(images: Vec<RgbImage>) -> Result<Self, CutterError> {
        if images.is_empty() {
            return Err(CutterError::Load("reference set is empty".into()));
        }
        let normalized = images
            .into_iter()
            .enumerate()
            .map(|(i, img)| {
                let frame = Frame::from_image(img, i as u64);
                normalize(&frame.to_gray()?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { images: normalized })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Best similarity of `frame` against any reference.
    pub fn best_score(&self, frame: &Frame) -> Result<f64, CutterError> {
        let gray = normalize(&frame.to_gray()?)?;
        let scores = self
            .images
            .par_iter()
            .map(|reference| similarity::ssim(&gray, reference))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(scores.into_iter().fold(0.0, f64::max))
    }
}

fn is_os_artifact(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => IGNORED_FILES.contains(&name) || name.starts_with("._"),
        None => true,
    }
}
