//! MP4 encoding by streaming raw frames into the system `ffmpeg`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::{FrameRgba, FrameSink, SinkConfig};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha and to pad the letterbox.
    pub bg_rgb: [u8; 3],
    /// Final video size. Incoming frames are scaled to fit and padded to
    /// this exact box, preserving aspect ratio. Defaults to the incoming
    /// frame size rounded up to even components.
    pub target: Option<(u32, u32)>,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgb: [255, 255, 255],
            target: None,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its
/// stdin, producing H.264 + yuv420p MP4 output.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Abort a capture: kill the encoder and remove the partial output.
    ///
    /// Safe to call at any point; used by orchestration on failure paths so
    /// no partially-written file survives.
    pub fn discard(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        let _ = std::fs::remove_file(&self.opts.out_path);
        self.cfg = None;
    }

    fn target_box(&self, cfg: &SinkConfig) -> ReelResult<(u32, u32)> {
        let (tw, th) = self
            .opts
            .target
            .unwrap_or((round_up_even(cfg.width), round_up_even(cfg.height)));
        if tw == 0 || th == 0 {
            return Err(ReelError::validation("target width/height must be non-zero"));
        }
        if !tw.is_multiple_of(2) || !th.is_multiple_of(2) {
            return Err(ReelError::validation(
                "target width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok((tw, th))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        let (tw, th) = self.target_box(&cfg)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        ensure_ffmpeg()?;

        let [r, g, b] = self.opts.bg_rgb;
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: raw opaque RGBA8 frames. Premultiplied alpha is flattened
        // over the background before writing (push_frame).
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-vf",
            &format!(
                "scale={tw}:{th}:force_original_aspect_ratio=decrease,\
                 pad={tw}:{th}:(ow-iw)/2:(oh-ih)/2:color=0x{r:02x}{g:02x}{b:02x}"
            ),
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            target_width = tw,
            target_height = th,
            expected_frames = ?cfg.expected_frames,
            "spawning ffmpeg"
        );
        let mut child = cmd
            .spawn()
            .map_err(|e| ReelError::system(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::processing("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::processing("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width * cfg.height * 4) as usize];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::processing("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::processing(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgb)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::processing("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::processing(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::processing("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelError::processing(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::processing("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::processing(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let _ = std::fs::remove_file(&self.opts.out_path);
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::processing(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

fn round_up_even(v: u32) -> u32 {
    v + (v & 1)
}

/// Flatten premultiplied RGBA8 over an opaque background color.
fn flatten_premul_over_bg(dst: &mut [u8], src_premul: &[u8], bg_rgb: [u8; 3]) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten_premul_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgb[0]);
    let bg_g = u16::from(bg_rgb[1]);
    let bg_b = u16::from(bg_rgb[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;
        let r = u16::from(s[0]) + mul_div255_u16(bg_r, inv);
        let g = u16::from(s[1]) + mul_div255_u16(bg_g, inv);
        let b = u16::from(s[2]) + mul_div255_u16(bg_b, inv);

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Fail with a system error when `ffmpeg` is unavailable.
///
/// Orchestration calls this before rendering so a missing toolchain is
/// reported before any expensive work begins.
pub fn ensure_ffmpeg() -> ReelResult<()> {
    if !is_ffmpeg_on_path() {
        return Err(ReelError::system(
            "ffmpeg is required for MP4 encoding, but was not found on PATH",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_premul_alpha_0_returns_bg() {
        let src = vec![0u8, 0, 0, 0];
        let mut dst = vec![0u8; 4];
        flatten_premul_over_bg(&mut dst, &src, [10, 20, 30]).unwrap();
        assert_eq!(dst, vec![10, 20, 30, 255]);
    }

    #[test]
    fn flatten_premul_alpha_255_is_identity() {
        let src = vec![1u8, 2, 3, 255];
        let mut dst = vec![0u8; 4];
        flatten_premul_over_bg(&mut dst, &src, [10, 20, 30]).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let src = vec![0u8; 8];
        let mut dst = vec![0u8; 4];
        assert!(flatten_premul_over_bg(&mut dst, &src, [0, 0, 0]).is_err());
    }

    #[test]
    fn round_up_even_only_touches_odd_values() {
        assert_eq!(round_up_even(100), 100);
        assert_eq!(round_up_even(101), 102);
        assert_eq!(round_up_even(1), 2);
    }
}
