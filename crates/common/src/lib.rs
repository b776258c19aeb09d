//! QARelay Common Library
//!
//! Shared types, configuration, and utilities for the QARelay harness.

pub mod config;
pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use config::{FrameworkConfig, ReportConfig};
pub use error::{Error, Result};
pub use time::format_duration;
pub use types::*;

/// QARelay version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
