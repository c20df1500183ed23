use thiserror::Error;

/// Content Lake client error type.
///
/// These are the failures raised before a request reaches the main API
/// endpoint. Response-level failures (4xx, 5xx, bad JSON, network errors
/// surfaced by the transport) are classified into [`crate::ApiResult`]
/// instead, so callers inspect the result rather than catching errors for
/// expected failure modes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid transaction at index {index}: {reason}")]
    InvalidTransaction { index: usize, reason: String },
    #[error("cannot determine mime type for {0}")]
    MimeTypeUnknown(String),
    #[error("asset fetch failed: {0}")]
    AssetFetch(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn invalid_transaction(index: usize, reason: impl Into<String>) -> Self {
        Error::InvalidTransaction {
            index,
            reason: reason.into(),
        }
    }

    pub fn asset_fetch(msg: impl Into<String>) -> Self {
        Error::AssetFetch(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }
}
