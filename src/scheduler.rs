use std::time::Duration;

use log::{info, warn};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::StreamError;
use crate::frame::Frame;
use crate::pipeline::Pipeline;

/// Supplies the most recently captured frame, if any.
pub trait FrameSource {
    fn latest(&mut self) -> Result<Frame, StreamError>;
}

/// Receives finished frames for presentation.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<(), StreamError>;
}

/// Drives the pipeline once per display tick until told to stop.
///
/// Ticks never queue: a missed tick is skipped outright, so the loop always
/// works on the freshest frame the source has. A failed tick is logged and
/// abandoned; the display keeps showing whatever it showed last.
pub struct FrameScheduler {
    period: Duration,
}

impl FrameScheduler {
    pub fn new(refresh_hz: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64),
        }
    }

    pub async fn run<S, K>(
        &self,
        source: &mut S,
        pipeline: &mut Pipeline,
        sink: &mut K,
        mut stop: watch::Receiver<bool>,
    ) where
        S: FrameSource,
        K: FrameSink,
    {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow_and_update() {
                        info!("render loop stopped");
                        return;
                    }
                }

                _ = ticks.tick() => {
                    match source.latest() {
                        Ok(frame) => {
                            let output = pipeline.run(frame);
                            if let Err(e) = sink.present(&output) {
                                warn!("dropping frame: {e}");
                            }
                        }
                        Err(StreamError::SourceClosed) => {
                            info!("capture source closed, render loop exiting");
                            return;
                        }
                        Err(e) => warn!("skipping tick: {e}"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::frame;

    /// Pops one scripted result per tick, then reports the source closed.
    struct ScriptedSource {
        results: VecDeque<Result<Frame, StreamError>>,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<Frame, StreamError>>) -> Self {
            Self {
                results: results.into(),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn latest(&mut self) -> Result<Frame, StreamError> {
            self.results
                .pop_front()
                .unwrap_or(Err(StreamError::SourceClosed))
        }
    }

    struct CountingSink(Arc<AtomicUsize>);

    impl FrameSink for CountingSink {
        fn present(&mut self, _frame: &Frame) -> Result<(), StreamError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn exits_when_source_closes() {
        let presented = Arc::new(AtomicUsize::new(0));
        let mut source =
            ScriptedSource::new(vec![Ok(frame::black(2, 2)), Ok(frame::black(2, 2))]);
        let mut pipeline = Pipeline::new(vec![]);
        let mut sink = CountingSink(presented.clone());
        let (_stop_tx, stop_rx) = watch::channel(false);

        FrameScheduler::new(1000)
            .run(&mut source, &mut pipeline, &mut sink, stop_rx)
            .await;

        assert_eq!(presented.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capture_errors_do_not_end_the_loop() {
        let presented = Arc::new(AtomicUsize::new(0));
        let mut source = ScriptedSource::new(vec![
            Err(StreamError::CaptureUnavailable),
            Ok(frame::black(2, 2)),
            Err(StreamError::CaptureUnavailable),
            Ok(frame::black(2, 2)),
        ]);
        let mut pipeline = Pipeline::new(vec![]);
        let mut sink = CountingSink(presented.clone());
        let (_stop_tx, stop_rx) = watch::channel(false);

        FrameScheduler::new(1000)
            .run(&mut source, &mut pipeline, &mut sink, stop_rx)
            .await;

        assert_eq!(presented.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sink_errors_do_not_end_the_loop() {
        struct FailingSink(Arc<AtomicUsize>);

        impl FrameSink for FailingSink {
            fn present(&mut self, _frame: &Frame) -> Result<(), StreamError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(StreamError::CaptureUnavailable)
            }
        }

        let attempts = Arc::new(AtomicUsize::new(0));
        let mut source =
            ScriptedSource::new(vec![Ok(frame::black(2, 2)), Ok(frame::black(2, 2))]);
        let mut pipeline = Pipeline::new(vec![]);
        let mut sink = FailingSink(attempts.clone());
        let (_stop_tx, stop_rx) = watch::channel(false);

        FrameScheduler::new(1000)
            .run(&mut source, &mut pipeline, &mut sink, stop_rx)
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pre_fired_stop_presents_nothing() {
        let presented = Arc::new(AtomicUsize::new(0));
        let mut source = ScriptedSource::new(vec![Ok(frame::black(2, 2))]);
        let mut pipeline = Pipeline::new(vec![]);
        let mut sink = CountingSink(presented.clone());

        let (stop_tx, stop_rx) = watch::channel(false);
        stop_tx.send(true).expect("receiver alive");

        FrameScheduler::new(1000)
            .run(&mut source, &mut pipeline, &mut sink, stop_rx)
            .await;

        assert_eq!(presented.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stop_interrupts_a_running_loop() {
        let presented = Arc::new(AtomicUsize::new(0));
        let counter = presented.clone();
        let (stop_tx, stop_rx) = watch::channel(false);

        let loop_task = tokio::spawn(async move {
            // Endless supply of frames; only the stop token can end this.
            struct EndlessSource;
            impl FrameSource for EndlessSource {
                fn latest(&mut self) -> Result<Frame, StreamError> {
                    Ok(frame::black(2, 2))
                }
            }

            let mut source = EndlessSource;
            let mut pipeline = Pipeline::new(vec![]);
            let mut sink = CountingSink(counter);
            FrameScheduler::new(1000)
                .run(&mut source, &mut pipeline, &mut sink, stop_rx)
                .await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        stop_tx.send(true).expect("loop still running");

        tokio::time::timeout(Duration::from_secs(1), loop_task)
            .await
            .expect("loop stopped after the token fired")
            .expect("loop task not panicked");
        assert!(presented.load(Ordering::SeqCst) > 0);
    }
}
