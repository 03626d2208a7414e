use thiserror::Error;

/// Failures surfaced by the capture, transform, and display stages.
///
/// Everything except `Unsupported` is recoverable per frame: the render
/// loop drops the frame, keeps whatever the display last showed, and
/// carries on. `Unsupported` is raised during startup only, before the
/// loop exists.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("frame buffer is {actual} bytes, expected {expected} for {width}x{height} rgba")]
    MalformedFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("no frame available from the capture source")]
    CaptureUnavailable,

    #[error("capture source shut down")]
    SourceClosed,

    #[error("cannot initialize {what}: {reason}")]
    Unsupported { what: &'static str, reason: String },

    #[error("display write failed: {0}")]
    Display(#[from] std::io::Error),
}
