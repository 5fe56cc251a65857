use crate::ConfigError;
use tapemap_detect::DetectError;

/// Errors surfaced by [`crate::TapeMapSession`].
///
/// Every variant is recoverable: the caller drops the frame or retries the
/// request later.
#[derive(thiserror::Error, Debug)]
pub enum TapeMapError {
    /// Empty, undecodable or wrongly sized frame. The map is left untouched.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A scan was requested before any frame was merged.
    #[error("occupancy map not initialized")]
    MapNotInitialized,

    /// The locator has no position for the requested target.
    #[error("target {target:?} is unresolved")]
    TargetUnresolved { target: String },

    /// The map is locked by a concurrent merge or scan.
    #[error("{resource} is busy")]
    ResourceBusy { resource: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TapeMapError {
    pub(crate) fn invalid(reason: impl ToString) -> Self {
        Self::InvalidInput {
            reason: reason.to_string(),
        }
    }
}

impl From<DetectError> for TapeMapError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::EmptyFrame { .. } => Self::invalid(err),
            DetectError::InvalidParams { .. } => Self::Config(err.into()),
        }
    }
}

impl From<image::ImageError> for TapeMapError {
    fn from(err: image::ImageError) -> Self {
        Self::invalid(format!("frame decode failed: {err}"))
    }
}
