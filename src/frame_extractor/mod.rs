//! 有效片段检测 - 从长录像中找出与参考截图相似的时间段
//!
//! 核心流程：
//! 1. 定间隔采样 - 按帧号跳读，每帧与参考图集求最高 SSIM
//! 2. 自适应阈值 - 每个视频取四分位中点
//! 3. 宽限窗口状态机 - 连续匹配才开启、连续不匹配才关闭

pub mod pipeline;
pub mod sampler;
pub mod similarity;
pub mod state_machine;
pub mod threshold;

pub use pipeline::{CutDetector, DetectionConfig, DetectionResult};
pub use sampler::FrameSampler;
pub use state_machine::{GraceConfig, SegmentExtractor, SegmentState};
pub use threshold::{match_series, match_threshold, Quartiles};
