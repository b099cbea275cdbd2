//! svgreel converts animated SVG documents into fixed-duration MP4 clips.
//!
//! The interesting part is the timing analyzer: given a document full of
//! declarative SMIL animation directives, it infers how long a single
//! playback pass (or one seamless loop) lasts, handling delayed starts,
//! repeats, explicit infinite loops, and the degenerate placeholder values
//! authors use to simulate "forever". Everything else is orchestration of
//! well-understood collaborators.
//!
//! # Pipeline overview
//!
//! 1. **Analyze**: document text -> [`AnalysisResult`] (canvas size plus a
//!    duration decision: finite total, seamless loop, or "needs caller
//!    input")
//! 2. **Decide**: [`decide_capture_ms`] turns that record and an optional
//!    manual override into one capture length
//! 3. **Render**: [`Snapshotter`] resolves every active directive at each
//!    frame timestamp into a static SVG, rasterized via resvg
//! 4. **Encode**: frames stream into the system `ffmpeg` for H.264 MP4
//!    output, scaled-and-padded to the target box
//!
//! The analyzer is pure and synchronous: no shared state, no IO beyond the
//! document text it is handed, safe to call concurrently over different
//! documents.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Encoding sinks (ffmpeg MP4 output).
pub mod encode;
/// End-to-end conversion orchestration.
pub mod pipeline;
/// Snapshot rendering and rasterization.
pub mod render;
/// Animation-duration inference.
pub mod timing;

pub use crate::foundation::core::{Fps, FrameIndex, parse_hex_rgb};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, ensure_ffmpeg, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::pipeline::{ConvertOpts, ConvertReport, Stage, convert, decide_capture_ms};
pub use crate::render::raster::SvgRasterizer;
pub use crate::render::snapshot::Snapshotter;
pub use crate::render::{FrameRgba, FrameSink, InMemorySink, SinkConfig};
pub use crate::timing::clock::parse_clock_ms;
pub use crate::timing::{
    AnalysisResult, AnimationDirective, CanvasDimensions, DirectiveKind, TimingWindow, analyze_svg,
    resolve_window,
};
