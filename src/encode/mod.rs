//! Encoding sinks. MP4 output goes through the system `ffmpeg`.

pub mod ffmpeg;
