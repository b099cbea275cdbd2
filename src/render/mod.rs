//! Frame production: SMIL snapshot resolution and resvg rasterization.

pub mod raster;
pub mod snapshot;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;

/// One rendered frame of premultiplied RGBA8 pixels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, premultiplied RGBA8, row-major.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Convert the premultiplied pixel data to straight-alpha RGBA8, for
    /// formats like PNG that expect unassociated alpha.
    pub fn to_straight_alpha(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 || a == 255 {
                continue;
            }
            for c in px.iter_mut().take(3) {
                *c = ((u16::from(*c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
            }
        }
        out
    }
}

/// Configuration provided to a [`FrameSink`] before frames are pushed.
#[derive(Clone, Copy, Debug)]
pub struct SinkConfig {
    /// Incoming frame width in pixels.
    pub width: u32,
    /// Incoming frame height in pixels.
    pub height: u32,
    /// Frame rate of the incoming stream.
    pub fps: Fps,
    /// Total frames the producer intends to push, when known. Sinks may use
    /// it for progress accounting.
    pub expected_frames: Option<u64>,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing
/// `FrameIndex` order between `begin` and `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ReelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgba)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgba)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        Ok(())
    }
}
