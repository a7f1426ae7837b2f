pub mod api;
pub mod core;
pub mod frame_extractor;

pub use crate::api::models::{Cut, SamplePoint};
pub use crate::core::{CutterConfig, CutterError, ReferenceSet};

/// Install the `env_logger` backend. Defaults to `info`, overridable via `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
