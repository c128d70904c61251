//! Protocol error types.

use humora_core::FrameError;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding or encoding messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload was empty after prefix stripping.
    #[error("empty payload")]
    EmptyPayload,

    /// Payload exceeds the configured maximum size.
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Payload is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Bytes do not form a decodable image.
    #[error("invalid image: {0}")]
    InvalidImage(#[from] image::ImageError),

    /// Image dimensions or decoder allocations exceed the decode limits.
    #[error("image too large: {0}")]
    ImageTooLarge(image::error::LimitError),

    /// Decoded image does not form a usable bitmap.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),

    /// Failed to serialize an outbound message.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Returns true if the error concerns a single bad payload.
    ///
    /// The session skips the frame and keeps going on recoverable errors.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }

    /// Short machine-readable name, logged as the `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "empty_payload",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::InvalidBase64(_) => "invalid_base64",
            Self::InvalidImage(_) => "invalid_image",
            Self::ImageTooLarge(_) => "image_too_large",
            Self::InvalidFrame(_) => "invalid_frame",
            Self::Serialization(_) => "serialization",
        }
    }
}
