//! Error types for suite loading and execution

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Suite file not found: {0}")]
    SuiteNotFound(PathBuf),

    #[error("Suite '{0}' defines no test cases")]
    EmptySuite(String),

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Run record not found: {0}")]
    RecordNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
