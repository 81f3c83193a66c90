use thiserror::Error;

/// Errors raised while talking to the inventory store.
///
/// SECURITY: Error messages must NEVER contain the store token.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Token rejected by the store
    #[error("store authentication failed: {message}")]
    Auth { message: String },

    /// Store answered with a non-success status
    #[error("store API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection failed, timeout, etc.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response or file body could not be decoded
    #[error("decode error: {message}")]
    Decode { message: String },
}
