use crate::core::error::CutterError;
use image::{GrayImage, RgbImage};
use std::time::Duration;

/// 帧数据结构
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB 格式
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp: Duration,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp,
            frame_number,
        }
    }

    pub fn from_image(image: RgbImage, frame_number: u64) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
            timestamp: Duration::ZERO,
            frame_number,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Rejects empty frames and buffers that do not hold `width * height` RGB pixels.
    pub fn validate(&self) -> Result<(), CutterError> {
        if self.width == 0 || self.height == 0 {
            return Err(CutterError::InvalidImage(format!(
                "frame {} has empty dimensions {}x{}",
                self.frame_number, self.width, self.height
            )));
        }
        if self.data.len() != self.pixel_count() * 3 {
            return Err(CutterError::InvalidImage(format!(
                "frame {} buffer is {} bytes, expected {}",
                self.frame_number,
                self.data.len(),
                self.pixel_count() * 3
            )));
        }
        Ok(())
    }

    /// Luminance plane using BT.601 weights.
    pub fn to_gray(&self) -> Result<GrayImage, CutterError> {
        self.validate()?;
        let gray: Vec<u8> = self
            .data
            .chunks_exact(3)
            .map(|rgb| luma(rgb[0], rgb[1], rgb[2]))
            .collect();
        GrayImage::from_raw(self.width, self.height, gray)
            .ok_or_else(|| CutterError::InvalidImage("gray buffer size mismatch".into()))
    }
}

#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 3];
        let frame = Frame::new(100, 100, data, Duration::from_millis(1000), 30);

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.timestamp.as_millis(), 1000);
        assert_eq!(frame.frame_number, 30);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_to_gray() {
        let frame = Frame::new(2, 1, vec![255, 255, 255, 255, 0, 0], Duration::ZERO, 0);
        let gray = frame.to_gray().unwrap();
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 76);
    }

    #[test]
    fn test_malformed_frame_rejected() {
        let empty = Frame::new(0, 10, vec![], Duration::ZERO, 1);
        assert!(matches!(empty.validate(), Err(CutterError::InvalidImage(_))));

        let short = Frame::new(4, 4, vec![0u8; 10], Duration::ZERO, 2);
        assert!(matches!(short.to_gray(), Err(CutterError::InvalidImage(_))));
    }
}
