/// Convenience result type used across svgreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy surfaced by library APIs.
///
/// Validation errors are always recoverable by correcting caller input and are
/// never retried automatically. Processing errors carry the underlying tool's
/// message. System errors mean a required external toolchain is missing on
/// this host.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Bad or missing caller input: an unusable document, an unresolvable
    /// duration, or a non-positive numeric option.
    #[error("validation error: {0}")]
    Validation(String),

    /// Renderer or encoder failure mid-pipeline.
    #[error("processing error: {0}")]
    Processing(String),

    /// Required external toolchain missing (e.g. no `ffmpeg` on the host).
    #[error("system error: {0}")]
    System(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Processing`] value.
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Build a [`ReelError::System`] value.
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }
}
