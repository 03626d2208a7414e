use std::ops::Range;

use image::Rgba;
use rand::{random, rngs::StdRng, Rng, SeedableRng};

use super::Filter;
use crate::frame::Frame;

/// Chance per frame that the channel offsets are re-rolled.
const REROLL_CHANCE: f64 = 0.03;
/// Chance per frame that a white scanline band is injected.
const NOISE_CHANCE: f64 = 0.01;
/// Offset components are drawn from this range (floor(random * 8) - 4).
const OFFSET_RANGE: Range<i32> = -4..4;
/// Tallest scanline noise band, in rows.
const MAX_BAND_HEIGHT: u32 = 10;

#[derive(Debug, Clone, Copy)]
struct ChannelOffsets {
    red: (i32, i32),
    green: (i32, i32),
    blue: (i32, i32),
}

impl ChannelOffsets {
    fn roll(rng: &mut StdRng) -> Self {
        let mut v = || {
            (
                rng.random_range(OFFSET_RANGE),
                rng.random_range(OFFSET_RANGE),
            )
        };
        Self {
            red: v(),
            green: v(),
            blue: v(),
        }
    }
}

/// Chromatic misregistration with occasional scanline dropouts.
///
/// Each color channel samples the input through its own spatial offset.
/// The offsets persist across frames and re-roll only occasionally, so the
/// glitch "holds" for a while instead of shimmering every frame.
pub struct Glitch {
    offsets: Option<ChannelOffsets>,
    noise: bool,
    rng: StdRng,
}

impl Glitch {
    pub fn new(noise: bool) -> Self {
        Self::seeded(noise, random())
    }

    /// Fixed-seed constructor so offset evolution is reproducible.
    pub fn seeded(noise: bool, seed: u64) -> Self {
        Self {
            offsets: None,
            noise,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Filter for Glitch {
    fn transform(&mut self, frame: &Frame) -> Frame {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return frame.clone();
        }

        let offsets = match self.offsets {
            Some(current) if !self.rng.random_bool(REROLL_CHANCE) => current,
            _ => *self.offsets.insert(ChannelOffsets::roll(&mut self.rng)),
        };

        let sample = |(dx, dy): (i32, i32), x: u32, y: u32| -> Rgba<u8> {
            let sx = (x as i32 + dx).clamp(0, width as i32 - 1) as u32;
            let sy = (y as i32 + dy).clamp(0, height as i32 - 1) as u32;
            *frame.get_pixel(sx, sy)
        };

        let mut out = Frame::from_fn(width, height, |x, y| {
            let Rgba([r, _, _, _]) = sample(offsets.red, x, y);
            let Rgba([_, g, _, _]) = sample(offsets.green, x, y);
            let Rgba([_, _, b, _]) = sample(offsets.blue, x, y);
            let Rgba([_, _, _, a]) = *frame.get_pixel(x, y);
            Rgba([r, g, b, a])
        });

        if self.noise && self.rng.random_bool(NOISE_CHANCE) {
            let start = self.rng.random_range(0..height);
            let band = self.rng.random_range(1..=MAX_BAND_HEIGHT);
            paint_band(&mut out, start, band);
        }

        out
    }
}

/// Force `band` rows starting at `start` to pure white, leaving alpha alone.
fn paint_band(frame: &mut Frame, start: u32, band: u32) {
    let end = start.saturating_add(band).min(frame.height());
    for y in start..end {
        for x in 0..frame.width() {
            let Rgba([_, _, _, a]) = *frame.get_pixel(x, y);
            frame.put_pixel(x, y, Rgba([255, 255, 255, a]));
        }
    }
}
