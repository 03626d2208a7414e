use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};

use log::info;

use crate::error::StreamError;
use crate::frame::Frame;
use crate::scheduler::FrameSink;

/// Presents frames in an `ffplay` window fed raw RGBA over stdin.
///
/// The window is sized once at startup; a frame of any other size cannot
/// be drawn over a raw pipe and is rejected.
pub struct DisplaySink {
    stdin: ChildStdin,
    child: Child,
    width: u32,
    height: u32,
}

impl DisplaySink {
    pub fn open(width: u32, height: u32) -> Result<Self, StreamError> {
        let size = format!("{width}x{height}");
        let mut child = Command::new("ffplay")
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pixel_format",
                "rgba",
                "-video_size",
                size.as_str(),
                "-window_title",
                "glitchcam",
                "-i",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| StreamError::Unsupported {
                what: "display",
                reason: e.to_string(),
            })?;

        let stdin = child.stdin.take().ok_or(StreamError::Unsupported {
            what: "display",
            reason: "no stdin pipe".into(),
        })?;

        info!("display window opened at {size}");
        Ok(Self {
            stdin,
            child,
            width,
            height,
        })
    }
}

impl FrameSink for DisplaySink {
    fn present(&mut self, frame: &Frame) -> Result<(), StreamError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(StreamError::MalformedFrame {
                width: self.width,
                height: self.height,
                expected: self.width as usize * self.height as usize * 4,
                actual: frame.as_raw().len(),
            });
        }
        self.stdin.write_all(frame.as_raw())?;
        Ok(())
    }
}

impl Drop for DisplaySink {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
