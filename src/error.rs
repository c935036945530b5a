//! Error types shared by synthesis, rendering and the encoding sinks.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GeoidError>;

/// Fatal conditions surfaced to the caller.
///
/// Per-term numerical faults never reach this type: the Legendre evaluator
/// reports them as `None` and the synthesizer drops the term.
#[derive(Error, Debug)]
pub enum GeoidError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("synthesis produced no finite cell in a {rows}x{cols} grid")]
    EmptySynthesis { rows: usize, cols: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("video encoder error: {0}")]
    Encoder(String),
}

impl GeoidError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GeoidError::InvalidConfiguration(msg.into())
    }
}
