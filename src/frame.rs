use image::{Rgba, RgbaImage};

use crate::error::StreamError;

/// RGBA frame, row-major, 4 bytes per pixel.
pub type Frame = RgbaImage;

/// Wrap raw RGBA bytes pulled from the decoder into a frame.
///
/// The byte length must match `width * height * 4` exactly; anything else
/// is rejected so a truncated read never silently shrinks the picture.
pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Frame, StreamError> {
    let expected = width as usize * height as usize * 4;
    let actual = data.len();
    if actual != expected {
        return Err(StreamError::MalformedFrame {
            width,
            height,
            expected,
            actual,
        });
    }

    RgbaImage::from_raw(width, height, data).ok_or(StreamError::MalformedFrame {
        width,
        height,
        expected,
        actual,
    })
}

/// An opaque black frame.
pub fn black(width: u32, height: u32) -> Frame {
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
}
