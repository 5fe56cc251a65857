/// Errors returned by map accumulation and scanning.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("frame size {got:?} does not match the occupancy map size {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        got: (u32, u32),
    },
    #[error("cannot allocate an occupancy map of size {width}x{height}")]
    EmptyMap { width: u32, height: u32 },
    #[error("scan origin is unresolved")]
    TargetUnresolved,
    #[error("invalid grid parameters: {reason}")]
    InvalidParams { reason: String },
}

impl GridError {
    pub(crate) fn params(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}
