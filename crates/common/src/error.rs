//! Error types for QARelay

use thiserror::Error;

/// Result type alias using QARelay Error
pub type Result<T> = std::result::Result<T, Error>;

/// QARelay error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}
