//! Error types for external service clients

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("TestRail API error (status {status}): {body}")]
    TestRailApi { status: u16, body: String },

    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Mailtrap API error (status {status}): {body}")]
    MailtrapApi { status: u16, body: String },

    #[error("LMS authentication failed: {0}")]
    LmsAuth(String),

    #[error("LMS API error (status {status}): {body}")]
    LmsApi { status: u16, body: String },

    #[error("No email found for {recipient} after {waited_secs} seconds")]
    EmailNotFound { recipient: String, waited_secs: u64 },

    #[error("Could not extract verification link from email {0}")]
    LinkNotFound(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;
