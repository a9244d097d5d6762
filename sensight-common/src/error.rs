use thiserror::Error;

/// Common error type for SenSight components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid topic segment: {0}")]
    Topic(String),
}

/// Result type alias using SenSight's Error.
pub type Result<T> = std::result::Result<T, Error>;
