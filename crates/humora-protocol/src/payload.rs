//! Image payload decoding.
//!
//! ```text
//! ImagePayload -> size guard -> strip prefix -> base64 -> image -> DecodedFrame
//! ```
//!
//! Every step rejects malformed input, so a [`DecodedFrame`] is never built
//! from a bad payload. The image step is bounded by [`DecodeLimits`]: a few
//! hundred bytes of PNG can declare a frame of hundreds of megabytes.

use std::borrow::Cow;
use std::io::Cursor;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use humora_core::{DecodedFrame, FrameError, RGB_CHANNELS};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageError, ImageFormat, ImageReader, Limits, RgbImage};

use crate::error::{ProtocolError, ProtocolResult};
use crate::inbound::ImagePayload;
use crate::{BASE64_MARKER, MAX_IMAGE_DIMENSION, MAX_PAYLOAD_SIZE};

/// Standard alphabet, padding optional. Browsers always pad, hand-written
/// clients often do not.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoder scratch space allowed on top of the output buffer.
const ALLOC_HEADROOM: u64 = 4 * 1024 * 1024;

/// Bounds applied while decoding one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest encoded payload, in bytes.
    pub max_payload_size: usize,
    /// Widest frame accepted, in pixels.
    pub max_width: u32,
    /// Tallest frame accepted, in pixels.
    pub max_height: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
            max_width: MAX_IMAGE_DIMENSION,
            max_height: MAX_IMAGE_DIMENSION,
        }
    }
}

impl DecodeLimits {
    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Decoder limits: the dimensions, and room for a 16-bit RGBA buffer
    /// of the largest allowed frame.
    fn image_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_width);
        limits.max_image_height = Some(self.max_height);
        limits.max_alloc = Some(
            u64::from(self.max_width)
                .saturating_mul(u64::from(self.max_height))
                .saturating_mul(8)
                .saturating_add(ALLOC_HEADROOM),
        );
        limits
    }
}

/// Removes an optional data-URI prefix, up to and including [`BASE64_MARKER`].
///
/// Input without the marker is returned unchanged.
pub fn strip_scheme_prefix(payload: &str) -> &str {
    match payload.find(BASE64_MARKER) {
        Some(idx) => &payload[idx + BASE64_MARKER.len()..],
        None => payload,
    }
}

/// Decodes standard base64, ignoring embedded whitespace.
pub fn decode_base64(encoded: &str) -> ProtocolResult<Vec<u8>> {
    let compact: Cow<'_, str> = if encoded.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            encoded
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(encoded)
    };

    if compact.is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }

    Ok(LENIENT_STANDARD.decode(compact.as_bytes())?)
}

/// Decodes a JPEG or PNG container into an RGB8 frame within `limits`.
pub fn decode_image(bytes: &[u8], limits: &DecodeLimits) -> ProtocolResult<DecodedFrame> {
    if bytes.is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?;
    reader.limits(limits.image_limits());

    let rgb = reader
        .decode()
        .map_err(|e| match e {
            ImageError::Limits(limit) => ProtocolError::ImageTooLarge(limit),
            other => ProtocolError::InvalidImage(other),
        })?
        .to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(DecodedFrame::new(width, height, rgb.into_raw())?)
}

/// Runs the full decoding pipeline for one payload.
pub fn decode_payload(payload: &ImagePayload, limits: &DecodeLimits) -> ProtocolResult<DecodedFrame> {
    let size = payload.len();
    if size > limits.max_payload_size {
        return Err(ProtocolError::PayloadTooLarge {
            size,
            max: limits.max_payload_size,
        });
    }

    match payload {
        ImagePayload::Encoded(text) => {
            let bytes = decode_base64(strip_scheme_prefix(text.trim()))?;
            decode_image(&bytes, limits)
        }
        ImagePayload::Raw(bytes) => decode_image(bytes, limits),
    }
}

fn to_rgb_image(frame: &DecodedFrame) -> ProtocolResult<RgbImage> {
    let pixels = frame.pixels().to_vec();
    let actual = pixels.len();
    RgbImage::from_raw(frame.width(), frame.height(), pixels).ok_or_else(|| {
        FrameError::BufferMismatch {
            expected: frame.width() as usize * frame.height() as usize * RGB_CHANNELS,
            actual,
        }
        .into()
    })
}

/// Encodes a frame as a PNG container.
pub fn encode_png(frame: &DecodedFrame) -> ProtocolResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    to_rgb_image(frame)?.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Encodes a frame as a JPEG container, the way browsers export canvas
/// snapshots. `quality` is 1..=100.
pub fn encode_jpeg(frame: &DecodedFrame, quality: u8) -> ProtocolResult<Vec<u8>> {
    let mut buffer = Vec::new();
    to_rgb_image(frame)?.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}
