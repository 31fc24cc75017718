use std::error::Error;

/// Boxed error produced by a render computation.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Malformed input: image collection, zoom configuration, or a
    /// magnification that is not one of the configured levels.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The resample behind a cache fill failed. Nothing was cached.
    #[error("render computation failed: {0}")]
    ComputationFailed(#[source] BoxError),
}

impl ViewerError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ViewerError::InvalidArgument(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ViewerError::InvalidArgument(_))
    }

    pub fn is_computation_failed(&self) -> bool {
        matches!(self, ViewerError::ComputationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
