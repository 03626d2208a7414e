use std::thread;
use std::time::Duration;

use ffmpeg_sidecar::{command::FfmpegCommand, event::FfmpegEvent};
use log::{debug, warn};
use tokio::sync::watch;

use crate::error::StreamError;
use crate::frame::{self, Frame};
use crate::scheduler::FrameSource;

/// Where the pixels come from: a camera device or a video file, decoded to
/// raw RGBA by an ffmpeg child process.
pub struct CaptureConfig {
    pub input: String,
    /// Demuxer/device format passed as `-f` (e.g. `v4l2`).
    pub input_format: Option<String>,
    /// Capture size request for device inputs (`WxH`).
    pub video_size: Option<String>,
    /// Pace file playback at its native rate instead of decoding flat out.
    pub realtime: bool,
}

/// Live capture source backed by an ffmpeg decoder thread.
///
/// The decoder publishes into a watch channel, so only the most recent
/// frame is ever held: a render loop that falls behind silently skips
/// whatever it missed.
pub struct CameraSource {
    latest: watch::Receiver<Option<Frame>>,
}

impl CameraSource {
    /// Spawn the decoder and start pulling frames in the background.
    pub fn open(config: CaptureConfig) -> Result<Self, StreamError> {
        let mut command = FfmpegCommand::new();
        command.hide_banner();
        if config.realtime {
            command.args(["-re"]);
        }
        if let Some(format) = &config.input_format {
            command.args(["-f", format.as_str()]);
        }
        if let Some(size) = &config.video_size {
            command.args(["-video_size", size.as_str()]);
        }

        let mut child = command
            .input(&config.input)
            .args("-f rawvideo -pix_fmt rgba -".split(' '))
            .spawn()
            .map_err(|e| StreamError::Unsupported {
                what: "capture",
                reason: e.to_string(),
            })?;

        let (tx, rx) = watch::channel(None);

        thread::spawn(move || {
            let events = match child.iter() {
                Ok(events) => events,
                Err(e) => {
                    warn!("capture event stream unavailable: {e}");
                    return;
                }
            };

            for event in events {
                match event {
                    FfmpegEvent::OutputFrame(raw) => {
                        match frame::from_raw(raw.width, raw.height, raw.data) {
                            Ok(frame) => {
                                if tx.send(Some(frame)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("dropping frame {}: {e}", raw.frame_num),
                        }
                    }
                    FfmpegEvent::Log(_level, line) => debug!("[ffmpeg] {line}"),
                    _ => (),
                }
            }
        });

        Ok(Self { latest: rx })
    }

    /// Wait for the decoder to produce its first frame, so the display can
    /// be sized before the render loop starts.
    pub async fn first_frame(&mut self, timeout: Duration) -> Result<Frame, StreamError> {
        let guard = tokio::time::timeout(timeout, self.latest.wait_for(|f| f.is_some()))
            .await
            .map_err(|_| StreamError::Unsupported {
                what: "capture",
                reason: format!("no frame within {timeout:?}"),
            })?
            .map_err(|_| StreamError::SourceClosed)?;

        match guard.as_ref() {
            Some(frame) => Ok(frame.clone()),
            None => Err(StreamError::SourceClosed),
        }
    }
}

impl FrameSource for CameraSource {
    fn latest(&mut self) -> Result<Frame, StreamError> {
        let closed = self.latest.has_changed().is_err();
        let current = self.latest.borrow_and_update();
        match (current.as_ref(), closed) {
            (_, true) => Err(StreamError::SourceClosed),
            (Some(frame), false) => Ok(frame.clone()),
            (None, false) => Err(StreamError::CaptureUnavailable),
        }
    }
}
