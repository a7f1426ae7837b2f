pub mod encoder;
pub mod frame;
pub mod source;
pub mod writer;

pub use encoder::{ClipEncoder, FfmpegEncoder};
pub use frame::Frame;
pub use source::{FfmpegOpener, FfmpegSource, SourceOpener, VideoParams, VideoSource};
pub use writer::{ClipReport, ClipWriter};
