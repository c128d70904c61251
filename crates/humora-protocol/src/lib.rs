//! Wire format for the humora analysis socket.
//!
//! # Protocol Overview
//!
//! Peers send UTF-8 text messages over a WebSocket:
//! - a short control string such as `ping` (answered with [`PONG`])
//! - an image payload: standard base64 of a JPEG/PNG container, optionally
//!   preceded by a data-URI prefix ending in [`BASE64_MARKER`]
//!
//! ```text
//! data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ...
//! '--- stripped ---------''--- decoded ----...
//! ```
//!
//! Binary WebSocket messages are accepted as raw (not base64) containers.
//!
//! Every successfully analyzed frame is answered with one JSON object:
//!
//! ```json
//! {"emotion": "Neutral", "age": 30, "gender": "Female"}
//! ```
//!
//! Frames that cannot be decoded get no reply unless error replies are
//! enabled on the server, in which case they get `{"error": "..."}`.

mod error;
mod inbound;
mod outbound;
mod payload;

pub use error::{ProtocolError, ProtocolResult};
pub use inbound::{ControlMessage, ImagePayload, InboundMessage, classify_text};
pub use outbound::{ErrorReply, encode_data_uri, encode_error, encode_result};
pub use payload::{
    DecodeLimits, decode_base64, decode_image, decode_payload, encode_jpeg, encode_png,
    strip_scheme_prefix,
};

/// Liveness probe sent by peers (compared case-insensitively).
pub const PING: &str = "ping";

/// Reply to [`PING`].
pub const PONG: &str = "PONG";

/// Separator that ends an optional data-URI prefix.
pub const BASE64_MARKER: &str = "base64,";

/// Default maximum size of one image payload (16 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum width and height of a decoded frame, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 1920;

/// Shortest prefix-less text still treated as a base64 image payload.
pub const MIN_BARE_PAYLOAD_LEN: usize = 16;
