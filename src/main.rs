mod error;
mod filter;
mod frame;
mod pipeline;
mod scheduler;
mod sink;
mod source;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use tokio::sync::watch;

use crate::filter::{Edges, Filter, Glitch, Grayscale};
use crate::pipeline::Pipeline;
use crate::scheduler::FrameScheduler;
use crate::sink::DisplaySink;
use crate::source::{CameraSource, CaptureConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FilterKind {
    /// Luma conversion
    Grayscale,
    /// Motion-gated edge outlines
    Edges,
    /// Per-channel chromatic displacement
    Glitch,
}

#[derive(Parser)]
struct Args {
    /// The camera device or video file to read from
    #[arg(short = 'i', long, value_name = "PATH", default_value = "/dev/video0")]
    input: String,

    /// Input format handed to the decoder (e.g. v4l2 for camera devices)
    #[arg(long, value_name = "FMT")]
    input_format: Option<String>,

    /// Capture size requested from device inputs
    #[arg(long, value_name = "WxH", default_value = "1280x720")]
    video_size: String,

    /// Play file inputs at their native speed instead of as fast as they decode
    #[arg(short = 'r', long)]
    realtime: bool,

    /// Display refresh rate driving the render loop
    #[arg(long, value_name = "HZ", default_value_t = 60)]
    fps: u32,

    /// Filter to apply; repeat the flag to chain in order (default: grayscale)
    #[arg(short = 'f', long = "filter", value_enum, value_name = "NAME")]
    filters: Vec<FilterKind>,

    /// Inject white scanline noise bands in the glitch filter
    #[arg(long)]
    noise: bool,

    /// Fix the glitch random seed for reproducible runs
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Seconds to wait for the first frame before giving up
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    startup_timeout: u64,
}

fn build_pipeline(args: &Args) -> Pipeline {
    let kinds = if args.filters.is_empty() {
        vec![FilterKind::Grayscale]
    } else {
        args.filters.clone()
    };

    let filters = kinds
        .iter()
        .map(|kind| -> Box<dyn Filter> {
            match kind {
                FilterKind::Grayscale => Box::new(Grayscale),
                FilterKind::Edges => Box::new(Edges::new()),
                FilterKind::Glitch => match args.seed {
                    Some(seed) => Box::new(Glitch::seeded(args.noise, seed)),
                    None => Box::new(Glitch::new(args.noise)),
                },
            }
        })
        .collect();

    Pipeline::new(filters)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut source = CameraSource::open(CaptureConfig {
        input: args.input.clone(),
        input_format: args.input_format.clone(),
        // -video_size is a device option; file inputs carry their own size.
        video_size: args.input_format.as_ref().map(|_| args.video_size.clone()),
        realtime: args.realtime,
    })?;

    let first = source
        .first_frame(Duration::from_secs(args.startup_timeout))
        .await?;
    let (width, height) = first.dimensions();
    info!("capturing {width}x{height} from {}", args.input);

    let mut sink = DisplaySink::open(width, height)?;
    let mut pipeline = build_pipeline(&args);

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    FrameScheduler::new(args.fps)
        .run(&mut source, &mut pipeline, &mut sink, stop_rx)
        .await;

    Ok(())
}
