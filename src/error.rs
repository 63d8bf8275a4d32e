//! @ai:module:intent Define error types for promptver operations
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use thiserror::Error;

/// @ai:intent Unified error type for all promptver operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Malformed metric record ({field}): {message}")]
    MalformedRecord { field: &'static str, message: String },

    #[error("Insufficient data for {what}: need at least {needed} observations, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Metric '{0}' has no configured threshold or polarity mapping")]
    UndefinedMetric(String),

    #[error("Invalid semantic version string: {0}")]
    InvalidVersion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
