use crate::filter::Filter;
use crate::frame::Frame;

/// Ordered chain of filters applied to every captured frame.
///
/// The chain is fixed for the lifetime of a run; reconfiguring means
/// building a new pipeline. Filters are total over well-formed frames, so
/// a run cannot fail mid-chain.
pub struct Pipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl Pipeline {
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Run the frame through every filter, left to right.
    pub fn run(&mut self, frame: Frame) -> Frame {
        self.filters
            .iter_mut()
            .fold(frame, |frame, filter| filter.transform(&frame))
    }
}
