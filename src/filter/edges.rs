use image::Rgba;

use super::grayscale::luma;
use super::Filter;
use crate::frame::{self, Frame};

/// Minimum luma change between frames for a pixel to count as moving.
const MOTION_THRESHOLD: i16 = 15;
/// Minimum Sobel magnitude for a moving pixel to register as an edge.
const EDGE_THRESHOLD: f32 = 60.0;

/// Motion-gated Sobel edge detector.
///
/// Keeps a snapshot of the previous frame and only runs the gradient where
/// the luma changed since then, so static background never lights up. The
/// first frame after construction (or after a size change) produces an
/// all-black frame while the snapshot warms up.
pub struct Edges {
    previous: Option<Frame>,
}

impl Edges {
    pub fn new() -> Self {
        Self { previous: None }
    }
}

impl Default for Edges {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for Edges {
    fn transform(&mut self, frame: &Frame) -> Frame {
        let (width, height) = frame.dimensions();
        let mut out = frame::black(width, height);

        let Some(previous) = self.previous.replace(frame.clone()) else {
            return out;
        };
        if previous.dimensions() != (width, height) {
            return out;
        }

        let current = luma_plane(frame);
        let prev = luma_plane(&previous);

        let w = width as usize;
        let h = height as usize;

        let mut moving = vec![false; w * h];
        for (i, flag) in moving.iter_mut().enumerate() {
            *flag = (current[i] as i16 - prev[i] as i16).abs() > MOTION_THRESHOLD;
        }

        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                let i = y * w + x;
                if !moving[i] {
                    continue;
                }

                let tl = current[i - w - 1] as i32;
                let t = current[i - w] as i32;
                let tr = current[i - w + 1] as i32;
                let l = current[i - 1] as i32;
                let r = current[i + 1] as i32;
                let bl = current[i + w - 1] as i32;
                let b = current[i + w] as i32;
                let br = current[i + w + 1] as i32;

                let gx = -tl - 2 * l - bl + tr + 2 * r + br;
                let gy = -tl - 2 * t - tr + bl + 2 * b + br;
                let magnitude = ((gx * gx + gy * gy) as f32).sqrt();

                if magnitude > EDGE_THRESHOLD {
                    out.put_pixel(x as u32, y as u32, Rgba([255, 255, 255, 255]));
                }
            }
        }

        out
    }
}

fn luma_plane(frame: &Frame) -> Vec<u8> {
    frame
        .pixels()
        .map(|&Rgba([r, g, b, _])| luma(r, g, b))
        .collect()
}
