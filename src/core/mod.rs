pub mod config;
pub mod error;
pub mod reference;
pub mod video;

pub use config::CutterConfig;
pub use error::CutterError;
pub use reference::ReferenceSet;
