use image::Rgba;

use super::Filter;
use crate::frame::Frame;

/// Weighted luma of an RGB triple (BT.601 weights).
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Replaces every pixel with its luma value.
pub struct Grayscale;

impl Filter for Grayscale {
    fn transform(&mut self, frame: &Frame) -> Frame {
        let mut out = frame.clone();
        for px in out.pixels_mut() {
            let Rgba([r, g, b, _]) = *px;
            let gray = luma(r, g, b);
            *px = Rgba([gray, gray, gray, 255]);
        }
        out
    }
}
