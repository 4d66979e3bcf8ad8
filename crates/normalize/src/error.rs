use thiserror::Error;

/// Errors that can occur while normalizing text or reading an offset map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NormalizeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("index {index} out of range for text of length {len}")]
    OutOfRange { index: usize, len: usize },
}
