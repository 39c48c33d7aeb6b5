//! Error types for ZDV

use thiserror::Error;

/// Result type alias for ZDV operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ZDV
///
/// Decoding reports exactly one of `FileTruncated`, `WrongFormat`,
/// `Corrupted` or `MissingFrame`. All of them are recoverable: keep feeding
/// frames into the session until a keyframe decodes successfully.
/// The remaining variants surface from the coder adapters and from library
/// initialization; the session maps them to `Corrupted` before they reach a
/// decode caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer shorter than the header, or than the declared payload sizes
    #[error("frame truncated: need {need} bytes, have {have}")]
    FileTruncated { need: usize, have: usize },

    /// First byte is not the depth frame magic
    #[error("wrong format: expected magic 0xCA, found {found:#04x}")]
    WrongFormat { found: u8 },

    /// Impossible header fields or an inner codec rejected its payload
    #[error("corrupted frame: {0}")]
    Corrupted(String),

    /// A P-frame arrived before the first keyframe of the session
    #[error("missing frame: cannot decode a P-frame before the first keyframe")]
    MissingFrame,

    /// Video or entropy coder error
    #[error("codec error: {0}")]
    Codec(String),

    /// Unsupported feature
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Initialization error
    #[error("initialization error: {0}")]
    Init(String),
}

impl Error {
    /// Create a corrupted-frame error
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        Error::Corrupted(msg.into())
    }

    /// Create a codec error
    pub fn codec<S: Into<String>>(msg: S) -> Self {
        Error::Codec(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create an initialization error
    pub fn init<S: Into<String>>(msg: S) -> Self {
        Error::Init(msg.into())
    }
}
