use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model config: {reason}")]
    InvalidConfig { reason: String },

    #[error("model load failed: {reason}")]
    LoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("empty label set")]
    EmptyLabelSet,

    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
}
