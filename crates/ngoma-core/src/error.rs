//! Core error types.

use thiserror::Error;

/// Engine-side failures. Request validation failures live in
/// [`crate::resolver::ResolveError`]; everything here is an operational or
/// pipeline fault and maps to a 5xx at the HTTP surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The external generation pipeline failed for any reason.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Checkpoint loading failed at startup.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
