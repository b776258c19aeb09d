//! External service clients for QARelay
//!
//! Each client wraps one third-party HTTP API the harness talks to: TestRail
//! for case management, Slack for chat notifications, Mailtrap for test email
//! inspection, and the LEAD LMS admin API for test-data cleanup.

pub mod error;
pub mod lms;
pub mod mailtrap;
pub mod slack;
pub mod testrail;

pub use error::{IntegrationError, IntegrationResult};
