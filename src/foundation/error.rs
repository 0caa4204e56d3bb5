/// Convenience result type used across then-and-now.
pub type ThenNowResult<T> = Result<T, ThenNowError>;

/// Top-level error taxonomy used by the compositor, stores and slot controller.
#[derive(thiserror::Error, Debug)]
pub enum ThenNowError {
    /// Invalid user-provided input (unsupported format, oversize file, bad settings value).
    #[error("validation error: {0}")]
    Validation(String),

    /// Source bytes could not be decoded or converted into a raster.
    #[error("decode error: {0}")]
    Decode(String),

    /// A persistence backend failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persistence backend refused a write because its quota is exhausted.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Errors while laying out or rasterizing a composite.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing persisted records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThenNowError {
    /// Build a [`ThenNowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ThenNowError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ThenNowError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`ThenNowError::QuotaExceeded`] value.
    pub fn quota_exceeded(msg: impl Into<String>) -> Self {
        Self::QuotaExceeded(msg.into())
    }

    /// Build a [`ThenNowError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ThenNowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
