use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bucket is not versioned: {0}")]
    NotVersioned(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
