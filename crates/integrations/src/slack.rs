//! Slack Web API client
//!
//! Posts Block Kit messages through `chat.postMessage` with a bot token. The
//! payload model covers the block types the reporter uses: headers, sections,
//! context lines, dividers, and link buttons.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qarelay_common::config::SlackConfig;

use crate::error::{IntegrationError, IntegrationResult};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SlackClient {
    client: Client,
    token: String,
    channel_id: String,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> IntegrationResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            token: config.token.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    /// Post a block message to the configured channel.
    ///
    /// Slack wraps failures in a 200 response with an `ok: false` envelope,
    /// so both the HTTP status and the envelope are checked.
    pub async fn post_message(
        &self,
        blocks: Vec<Block>,
        icon_emoji: Option<&str>,
    ) -> IntegrationResult<()> {
        let payload = MessagePayload {
            channel: self.channel_id.clone(),
            icon_emoji: icon_emoji.map(|e| e.to_string()),
            blocks,
        };

        debug!("Posting Slack message with {} blocks", payload.blocks.len());
        let resp = self
            .client
            .post(POST_MESSAGE_URL)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::SlackApi(format!(
                "status {}: {}",
                status, body
            )));
        }

        let envelope: ApiResponse = resp.json().await?;
        if !envelope.ok {
            return Err(IntegrationError::SlackApi(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct MessagePayload {
    channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_emoji: Option<String>,
    blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Block Kit layout block
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: Text,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<Text>>,
    },
    Context {
        elements: Vec<Text>,
    },
    Actions {
        elements: Vec<Element>,
    },
    Divider,
}

impl Block {
    /// Header block with plain text
    pub fn header(text: &str) -> Self {
        Block::Header {
            text: Text::plain(text),
        }
    }

    /// Section block with a single mrkdwn body
    pub fn section(text: &str) -> Self {
        Block::Section {
            text: Some(Text::mrkdwn(text)),
            fields: None,
        }
    }

    /// Section block carrying mrkdwn fields
    pub fn fields(fields: Vec<Text>) -> Self {
        Block::Section {
            text: None,
            fields: Some(fields),
        }
    }

    /// Context block from mrkdwn lines
    pub fn context(elements: Vec<Text>) -> Self {
        Block::Context { elements }
    }
}

/// Text object inside a block
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn { text: String },
    PlainText { text: String },
}

impl Text {
    pub fn mrkdwn(text: &str) -> Self {
        Text::Mrkdwn {
            text: text.to_string(),
        }
    }

    pub fn plain(text: &str) -> Self {
        Text::PlainText {
            text: text.to_string(),
        }
    }
}

/// Interactive element inside an actions block
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        text: Text,
        url: String,
        action_id: String,
    },
}

impl Element {
    /// Link button opening `url`
    pub fn button(label: &str, url: &str, action_id: &str) -> Self {
        Element::Button {
            text: Text::plain(label),
            url: url.to_string(),
            action_id: action_id.to_string(),
        }
    }
}
