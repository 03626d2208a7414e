mod edges;
mod glitch;
mod grayscale;

pub use edges::Edges;
pub use glitch::Glitch;
pub use grayscale::Grayscale;

use crate::frame::Frame;

/// A single stage of the frame pipeline.
///
/// A filter reads the previous stage's output and produces a fresh frame,
/// leaving its input untouched. Stateful filters (the motion detector's
/// snapshot, the glitch offsets) carry state across calls, hence
/// `&mut self`.
pub trait Filter: Send {
    fn transform(&mut self, frame: &Frame) -> Frame;
}
