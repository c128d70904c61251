//! Decoded bitmap handed to analyzers.

use thiserror::Error;

/// Bytes per pixel in a [`DecodedFrame`] buffer (RGB8).
pub const RGB_CHANNELS: usize = 3;

/// Errors produced when constructing a [`DecodedFrame`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Width or height is zero.
    #[error("frame has zero dimension: {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// Pixel buffer does not match the dimensions.
    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// An RGB8 bitmap decoded from one image payload.
///
/// Lives for the duration of a single analysis call. Construction validates
/// the dimensions, so a `DecodedFrame` always describes a non-empty bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedFrame {
    /// Creates a frame from row-major RGB8 pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }

        let expected = width as usize * height as usize * RGB_CHANNELS;
        if pixels.len() != expected {
            return Err(FrameError::BufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGB value at (`x`, `y`), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * RGB_CHANNELS;
        let px = &self.pixels[offset..offset + RGB_CHANNELS];
        Some([px[0], px[1], px[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_valid() {
        let frame = DecodedFrame::new(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 1);
        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn new_frame_rejects_zero_dimension() {
        let result = DecodedFrame::new(0, 10, Vec::new());
        assert!(matches!(result, Err(FrameError::ZeroDimension { .. })));
    }

    #[test]
    fn new_frame_rejects_short_buffer() {
        let result = DecodedFrame::new(2, 2, vec![0; 5]);
        assert_eq!(
            result,
            Err(FrameError::BufferMismatch {
                expected: 12,
                actual: 5
            })
        );
    }
}
