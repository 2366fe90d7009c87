use thiserror::Error;
use crate::record::ValidationError;

#[derive(Error, Debug)]
pub enum Error {
    // Caller errors
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate symbol in comparison: {0}")]
    DuplicateSymbol(String),

    #[error("Comparison requires exactly 2 entries, got {0}")]
    UnsupportedComparison(usize),

    // Transport errors
    #[error("Unknown symbol: {0}")]
    NotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    // System errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Short, stable label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::DuplicateSymbol(_) => "duplicate_symbol",
            Error::UnsupportedComparison(_) => "unsupported_comparison",
            Error::NotFound(_) => "not_found",
            Error::Connection(_) => "connection",
            Error::ConfigError(_) => "config",
            Error::IoError(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
