use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid block length: expected a non-zero even sample count, got {0}")]
    InvalidBlockLength(usize),

    #[error("block length mismatch: received {received} samples, processed {processed}")]
    BlockLengthMismatch { received: usize, processed: usize },

    #[error("invalid bit count: expected 1..=256 bits, got {0}")]
    InvalidBitCount(usize),

    #[error("invalid QIM delta: must be positive, got {0}")]
    InvalidDelta(f64),

    #[error("secret must not be empty")]
    InvalidSecret,

    #[error("malformed message: {0}")]
    Message(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Message(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
