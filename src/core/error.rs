use thiserror::Error;

#[derive(Debug, Error)]
pub enum CutterError {
    #[error("Reference set load failed: {0}")]
    Load(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Insufficient data: {0} samples (need at least 2)")]
    InsufficientData(usize),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
