//! Classification of inbound messages.

use bytes::Bytes;

use crate::{BASE64_MARKER, MIN_BARE_PAYLOAD_LEN, PING};

/// A single message received from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Text that is not an image payload.
    Control(ControlMessage),
    /// An image to decode and analyze.
    Image(ImagePayload),
}

/// Control text sent by a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// Liveness probe, answered with [`crate::PONG`].
    Ping,
    /// Any other text. Ignored by the server.
    Other(String),
}

/// An image-bearing payload, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Base64 text, possibly with a data-URI prefix.
    Encoded(String),
    /// Raw container bytes from a binary message.
    Raw(Bytes),
}

impl ImagePayload {
    /// Size of the payload as received, in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Encoded(text) => text.len(),
            Self::Raw(bytes) => bytes.len(),
        }
    }

    /// Returns true if the payload carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InboundMessage {
    /// Wraps a binary message. Binary messages are always image payloads.
    pub fn from_binary(bytes: impl Into<Bytes>) -> Self {
        Self::Image(ImagePayload::Raw(bytes.into()))
    }

    /// Returns true for image payloads.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Classifies a text message.
///
/// - `ping` (any case, surrounding whitespace ignored) is a control ping
/// - text containing [`BASE64_MARKER`] is an image payload
/// - text of at least [`MIN_BARE_PAYLOAD_LEN`] base64 characters is an
///   image payload without prefix
/// - anything else is other control text
pub fn classify_text(text: String) -> InboundMessage {
    let trimmed = text.trim();

    if trimmed.eq_ignore_ascii_case(PING) {
        return InboundMessage::Control(ControlMessage::Ping);
    }

    if trimmed.contains(BASE64_MARKER) || looks_like_bare_base64(trimmed) {
        return InboundMessage::Image(ImagePayload::Encoded(text));
    }

    InboundMessage::Control(ControlMessage::Other(text))
}

fn looks_like_bare_base64(text: &str) -> bool {
    let mut significant = 0usize;
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' | b'=' => significant += 1,
            b if b.is_ascii_whitespace() => {}
            _ => return false,
        }
    }
    significant >= MIN_BARE_PAYLOAD_LEN
}
