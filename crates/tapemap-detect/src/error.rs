/// Errors returned by the detection stages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("empty frame (width={width}, height={height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("invalid detection parameters: {reason}")]
    InvalidParams { reason: String },
}

impl DetectError {
    pub(crate) fn params(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}
