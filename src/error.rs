use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("source resource not found: {criteria}")]
    NotFound { criteria: String },

    #[error("ambiguous source match: {count} candidates for {criteria}")]
    AmbiguousMatch { count: usize, criteria: String },

    #[error("invalid terraform state: {message}")]
    InvalidState { message: String },

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("task failed: {0}")]
    Task(String),
}
