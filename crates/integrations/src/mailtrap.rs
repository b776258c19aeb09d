//! Mailtrap inbox client
//!
//! Reads test emails delivered to a Mailtrap inbox so tests can follow
//! account-verification links. Message bodies are fetched separately from the
//! message list, matching the Mailtrap v2 API layout.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use qarelay_common::config::MailtrapConfig;

use crate::error::{IntegrationError, IntegrationResult};

const BASE_URL: &str = "https://mailtrap.io/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic verification-link patterns, tried when no URL prefix is supplied
static LINK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)https?://[^\s<>"']+(?:verify|confirm|activate|token)[^\s<>"']*"#,
        r#"(?i)href=["']([^"']*(?:verify|confirm|activate|token)[^"']*)["']"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// One message summary from the inbox listing
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub to_email: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub sent_at: Option<String>,
}

/// Message with its fetched bodies
#[derive(Debug, Clone)]
pub struct MessageContent {
    pub message: Message,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
}

pub struct MailtrapClient {
    client: Client,
    api_token: String,
    account_id: u64,
    inbox_id: u64,
}

impl MailtrapClient {
    pub fn new(config: &MailtrapConfig) -> IntegrationResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_token: config.api_token.clone(),
            account_id: config.account_id,
            inbox_id: config.inbox_id,
        })
    }

    /// List all messages in the inbox, newest first
    pub async fn messages(&self) -> IntegrationResult<Vec<Message>> {
        let resp = self
            .client
            .get(self.inbox_url("/messages"))
            .header("Api-Token", &self.api_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::MailtrapApi {
                status: status.as_u16(),
                body,
            });
        }

        let messages: Vec<Message> = resp.json().await?;
        debug!("Retrieved {} messages from inbox", messages.len());
        Ok(messages)
    }

    /// Messages addressed to `recipient`
    pub async fn messages_for_recipient(&self, recipient: &str) -> IntegrationResult<Vec<Message>> {
        let matching: Vec<Message> = self
            .messages()
            .await?
            .into_iter()
            .filter(|m| m.to_email.contains(recipient))
            .collect();
        info!("Found {} emails for {}", matching.len(), recipient);
        Ok(matching)
    }

    /// Fetch one message together with its HTML and text bodies
    pub async fn message_content(&self, message_id: u64) -> IntegrationResult<MessageContent> {
        let resp = self
            .client
            .get(self.inbox_url(&format!("/messages/{}", message_id)))
            .header("Api-Token", &self.api_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::MailtrapApi {
                status: status.as_u16(),
                body,
            });
        }

        let message: Message = resp.json().await?;
        debug!("Retrieved message {}", message_id);

        let html_body = self.fetch_body(message_id, "html").await;
        let text_body = self.fetch_body(message_id, "txt").await;

        Ok(MessageContent {
            message,
            html_body,
            text_body,
        })
    }

    /// Poll the inbox until an email for `recipient` arrives, then extract
    /// the verification link from its body
    pub async fn verification_link(
        &self,
        recipient: &str,
        max_wait: Duration,
        poll_interval: Duration,
        url_prefix: Option<&str>,
    ) -> IntegrationResult<String> {
        info!("Waiting for verification email to: {}", recipient);

        let start = Instant::now();
        let mut message = None;

        while start.elapsed() < max_wait {
            let mut matching: Vec<Message> = self
                .messages()
                .await?
                .into_iter()
                .filter(|m| m.to_email.contains(recipient))
                .collect();

            if !matching.is_empty() {
                // Newest message first in the listing
                let latest = matching.remove(0);
                info!("Found email with subject: {}", latest.subject);
                message = Some(latest);
                break;
            }

            debug!("No email found yet, waiting {:?}", poll_interval);
            tokio::time::sleep(poll_interval).await;
        }

        let message = message.ok_or_else(|| IntegrationError::EmailNotFound {
            recipient: recipient.to_string(),
            waited_secs: max_wait.as_secs(),
        })?;

        let content = self.message_content(message.id).await?;
        match extract_verification_link(&content, url_prefix) {
            Some(link) => {
                info!("Verification link found: {}", link);
                Ok(link)
            }
            None => Err(IntegrationError::LinkNotFound(message.id)),
        }
    }

    async fn fetch_body(&self, message_id: u64, kind: &str) -> Option<String> {
        let url = self.inbox_url(&format!("/messages/{}/body.{}", message_id, kind));
        match self
            .client
            .get(&url)
            .header("Api-Token", &self.api_token)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp.text().await.ok(),
            Ok(resp) => {
                warn!(
                    "Could not retrieve {} body for message {} (status {})",
                    kind,
                    message_id,
                    resp.status()
                );
                None
            }
            Err(e) => {
                warn!("Could not retrieve {} body for message {}: {}", kind, message_id, e);
                None
            }
        }
    }

    fn inbox_url(&self, suffix: &str) -> String {
        format!(
            "{}/accounts/{}/inboxes/{}{}",
            BASE_URL, self.account_id, self.inbox_id, suffix
        )
    }
}

/// Extract a verification link from a message body.
///
/// With a prefix the first URL starting with it wins; otherwise a set of
/// generic verification-style patterns is tried, HTML body before text body.
pub fn extract_verification_link(
    content: &MessageContent,
    url_prefix: Option<&str>,
) -> Option<String> {
    let html_body = content.html_body.as_deref().unwrap_or("");
    let text_body = content.text_body.as_deref().unwrap_or("");

    if let Some(prefix) = url_prefix {
        let pattern = Regex::new(&format!(r#"{}[^\s<>"']*"#, regex::escape(prefix))).ok()?;

        for body in [html_body, text_body] {
            if let Some(found) = pattern.find(body) {
                let link = found
                    .as_str()
                    .trim_end_matches(|c| matches!(c, '"' | ',' | ';' | '\''));
                let link = decode_entities(link);
                info!("Found verification link with prefix: {}", link);
                return Some(link);
            }
        }

        warn!("Could not find link with prefix: {}", prefix);
        return None;
    }

    for pattern in LINK_PATTERNS.iter() {
        for body in [html_body, text_body] {
            if let Some(captures) = pattern.captures(body) {
                let raw = match captures.get(1) {
                    Some(group) => group.as_str(),
                    None => captures.get(0).map_or("", |m| m.as_str()),
                };
                let link = raw.replace("href=", "").replace('"', "").replace('\'', "");
                return Some(decode_entities(&link));
            }
        }
    }

    warn!("Could not find verification link using standard patterns");
    None
}

/// Decode the HTML entities that show up in emailed URLs
fn decode_entities(link: &str) -> String {
    link.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(html: &str, text: &str) -> MessageContent {
        MessageContent {
            message: Message {
                id: 1,
                subject: "Welcome".to_string(),
                to_email: "user@example.org".to_string(),
                from_email: "noreply@example.org".to_string(),
                sent_at: None,
            },
            html_body: (!html.is_empty()).then(|| html.to_string()),
            text_body: (!text.is_empty()).then(|| text.to_string()),
        }
    }

    #[test]
    fn extracts_link_with_prefix() {
        let html = r#"<a href="https://lms.example.org/verify/abc123?x=1&amp;y=2">Verify</a>"#;
        let link = extract_verification_link(
            &content(html, ""),
            Some("https://lms.example.org/verify/"),
        )
        .unwrap();
        assert_eq!(link, "https://lms.example.org/verify/abc123?x=1&y=2");
    }

    #[test]
    fn prefix_falls_back_to_text_body() {
        let text = "Open https://lms.example.org/verify/abc123 to continue";
        let link = extract_verification_link(
            &content("", text),
            Some("https://lms.example.org/verify/"),
        )
        .unwrap();
        assert_eq!(link, "https://lms.example.org/verify/abc123");
    }

    #[test]
    fn generic_pattern_finds_confirm_url() {
        let html = r#"Click <a href="https://app.example.org/confirm?token=zz">here</a>"#;
        let link = extract_verification_link(&content(html, ""), None).unwrap();
        assert_eq!(link, "https://app.example.org/confirm?token=zz");
    }

    #[test]
    fn generic_href_pattern_captures_relative_link() {
        let html = r#"<a href='/account/activate/xyz'>Activate</a>"#;
        let link = extract_verification_link(&content(html, ""), None).unwrap();
        assert_eq!(link, "/account/activate/xyz");
    }

    #[test]
    fn missing_link_returns_none() {
        assert!(extract_verification_link(&content("no links here", "plain text"), None).is_none());
        assert!(extract_verification_link(
            &content("no links here", ""),
            Some("https://x.example/")
        )
        .is_none());
    }

    #[test]
    fn message_list_parses() {
        let json = r#"[{
            "id": 42,
            "subject": "Verify your account",
            "to_email": "user@example.org",
            "from_email": "noreply@example.org",
            "sent_at": "2024-05-01T10:00:00Z",
            "inbox_id": 7
        }]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(messages[0].id, 42);
        assert_eq!(messages[0].to_email, "user@example.org");
    }
}
