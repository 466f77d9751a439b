// @file: src/error.rs
// @description: Error taxonomy for the fetch, normalize and write stages.
// @author: LAS.

use thiserror::Error as ThisError;

//
// ERROR TYPE
//

#[derive(ThisError, Debug)]
pub enum IngestError {
    #[error("Invalid granularity: {0}s (expected one of 60, 300, 900, 3600, 21600, 86400)")]
    InvalidGranularity(u32),

    #[error("Invalid time bound: {0}")]
    InvalidTimeBound(String),

    #[error("Fetch failed for {symbol}: {reason}")]
    FetchFailure { symbol: String, reason: String },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Metadata slot error: {0}")]
    MetadataSlot(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl IngestError {
    pub fn fetch(symbol: &str, reason: impl Into<String>) -> Self {
        IngestError::FetchFailure {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for IngestError {
    fn from(err: config::ConfigError) -> Self {
        IngestError::Config(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
