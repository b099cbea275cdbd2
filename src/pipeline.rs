//! End-to-end conversion: analyze, decide the capture length, render
//! snapshot frames, stream them into the encoder.
//!
//! Stages run sequentially per job. The analyzer is pure; rendering is
//! wall-clock bound by the decided duration; encoding consumes frames as
//! they are pushed. Failure paths remove any partially-written output.

use std::path::PathBuf;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_ffmpeg};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::raster::SvgRasterizer;
use crate::render::snapshot::Snapshotter;
use crate::render::{FrameSink, SinkConfig};
use crate::timing::{AnalysisResult, analyze_svg};

/// Pipeline stages that report incremental progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Snapshot resolution and rasterization.
    Render,
    /// Frames consumed by the encoder.
    Encode,
}

/// Options for a full SVG-to-MP4 conversion.
#[derive(Clone, Debug)]
pub struct ConvertOpts {
    /// Output MP4 path.
    pub out_path: PathBuf,
    /// Capture frame rate.
    pub fps: Fps,
    /// Final video size; defaults to the intrinsic canvas size rounded up
    /// to even components.
    pub target: Option<(u32, u32)>,
    /// Explicit capture duration in ms. Always wins over inferred values.
    pub duration_ms: Option<f64>,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Background color for alpha flattening and letterbox padding.
    pub background: [u8; 3],
    /// Base directory for relative asset/font resolution.
    pub resources_dir: Option<PathBuf>,
}

impl ConvertOpts {
    /// Create options for writing an MP4 to `out_path` at `fps`.
    pub fn new(out_path: impl Into<PathBuf>, fps: Fps) -> Self {
        Self {
            out_path: out_path.into(),
            fps,
            target: None,
            duration_ms: None,
            overwrite: true,
            background: [255, 255, 255],
            resources_dir: None,
        }
    }
}

/// Summary of a finished conversion.
#[derive(Clone, Debug)]
pub struct ConvertReport {
    /// The analyzer's decision record.
    pub analysis: AnalysisResult,
    /// Capture length actually used, in ms.
    pub capture_ms: f64,
    /// Frames rendered and encoded.
    pub frames: u64,
    /// Final video size.
    pub video_size: (u32, u32),
}

/// Turn an [`AnalysisResult`] into a capture length.
///
/// Decision order: an explicit manual duration always wins; a detected
/// seamless loop is recorded exactly once; everything else must have a
/// finite inferred total. The remaining cases are validation errors that
/// tell the caller to supply a duration.
pub fn decide_capture_ms(analysis: &AnalysisResult, manual_ms: Option<f64>) -> ReelResult<f64> {
    if let Some(ms) = manual_ms {
        if !(ms > 0.0 && ms.is_finite()) {
            return Err(ReelError::validation("duration must be a positive number"));
        }
        return Ok(ms);
    }
    if analysis.has_infinite_animations {
        return analysis.loop_duration_ms.ok_or_else(|| {
            ReelError::validation(
                "document animates forever with no inferable loop duration; pass an explicit duration",
            )
        });
    }
    if !analysis.has_animations {
        return Err(ReelError::validation(
            "document has no declarative animations; pass an explicit duration",
        ));
    }
    analysis.total_duration_ms.ok_or_else(|| {
        ReelError::validation(
            "could not infer a positive animation duration; pass an explicit duration",
        )
    })
}

/// Convert an animated SVG into an MP4 clip.
///
/// `progress` receives `(stage, fraction)` callbacks with fractions in
/// `[0, 1]` per stage.
#[tracing::instrument(skip_all, fields(out = %opts.out_path.display()))]
pub fn convert(
    svg_text: &str,
    opts: &ConvertOpts,
    progress: &mut dyn FnMut(Stage, f64),
) -> ReelResult<ConvertReport> {
    let analysis = analyze_svg(svg_text)?;
    let capture_ms = decide_capture_ms(&analysis, opts.duration_ms)?;

    // A missing encoder toolchain must surface before any expensive work.
    ensure_ffmpeg()?;

    let (tw, th) = video_size(&analysis, opts)?;
    let (rw, rh) = analysis.dimensions.fit_within(tw, th);
    let frames = opts.fps.frames_to_cover_ms(capture_ms);
    tracing::debug!(capture_ms, frames, rw, rh, "starting capture");

    let snap = Snapshotter::new(svg_text)?;
    let raster = SvgRasterizer::new(opts.resources_dir.clone());

    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: opts.out_path.clone(),
        overwrite: opts.overwrite,
        bg_rgb: opts.background,
        target: Some((tw, th)),
    });
    sink.begin(SinkConfig {
        width: rw,
        height: rh,
        fps: opts.fps,
        expected_frames: Some(frames),
    })?;

    let frame_ms = opts.fps.frame_duration_ms();
    for i in 0..frames {
        let pushed = (|| {
            let svg = snap.snapshot(i as f64 * frame_ms);
            let frame = raster.rasterize(&svg, rw, rh)?;
            sink.push_frame(FrameIndex(i), &frame)
        })();
        if let Err(e) = pushed {
            sink.discard();
            return Err(e);
        }
        let done = (i + 1) as f64 / frames as f64;
        progress(Stage::Render, done);
        progress(Stage::Encode, done);
    }
    sink.end()?;

    Ok(ConvertReport {
        analysis,
        capture_ms,
        frames,
        video_size: (tw, th),
    })
}

fn video_size(analysis: &AnalysisResult, opts: &ConvertOpts) -> ReelResult<(u32, u32)> {
    match opts.target {
        Some((w, h)) => {
            if w == 0 || h == 0 {
                return Err(ReelError::validation("video width/height must be positive"));
            }
            Ok((w, h))
        }
        None => {
            let w = analysis.dimensions.width.ceil() as u32;
            let h = analysis.dimensions.height.ceil() as u32;
            Ok((w + (w & 1), h + (h & 1)))
        }
    }
}
