//! Error types.
use thiserror::Error;

/// Errors reported by this crate.
///
/// Operations on a successfully constructed filter never fail, so errors only surface while a
/// filter is being sized or while the gateway decodes a request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The filter cannot be sized from the given parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A request body could not be decoded.
    #[cfg(feature = "gateway")]
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] serde_json::Error),
}

/// `Result` with [`Error`] as default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
