pub mod cutter;
pub mod models;

pub use cutter::{collect_inputs, video_path, BatchReport, VideoCutter, VideoOutcome};
