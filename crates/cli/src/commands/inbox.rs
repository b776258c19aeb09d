//! Test email inbox inspection

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use qarelay_common::FrameworkConfig;
use qarelay_integrations::mailtrap::{MailtrapClient, Message};

use crate::output::{print_message, print_rows, OutputFormat, Tabular};

#[derive(Subcommand)]
pub enum InboxCommands {
    /// Wait for a verification link addressed to a recipient
    Link(LinkArgs),

    /// List inbox messages
    List(ListArgs),
}

#[derive(Args)]
pub struct LinkArgs {
    /// Recipient address to watch for
    pub recipient: String,

    /// Only accept links starting with this prefix
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 60)]
    pub max_wait_secs: u64,

    /// Seconds between inbox polls
    #[arg(long, default_value_t = 5)]
    pub poll_secs: u64,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only messages addressed to this recipient
    #[arg(long)]
    pub recipient: Option<String>,
}

/// Message fields for display
#[derive(Serialize, Clone)]
struct MessageRow {
    id: u64,
    subject: String,
    to: String,
    from: String,
    sent_at: String,
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            subject: message.subject.clone(),
            to: message.to_email.clone(),
            from: message.from_email.clone(),
            sent_at: message.sent_at.clone().unwrap_or_default(),
        }
    }
}

impl Tabular for MessageRow {
    fn columns() -> Vec<&'static str> {
        vec!["ID", "Subject", "To", "From", "Sent"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.subject.clone(),
            self.to.clone(),
            self.from.clone(),
            self.sent_at.clone(),
        ]
    }
}

pub async fn execute(cmd: InboxCommands, config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = FrameworkConfig::load(config_path)?;
    let mailtrap = config
        .mailtrap
        .as_ref()
        .context("Mailtrap is not configured; add a [mailtrap] section to the configuration file")?;
    let client = MailtrapClient::new(mailtrap)?;

    match cmd {
        InboxCommands::Link(args) => {
            let link = client
                .verification_link(
                    &args.recipient,
                    Duration::from_secs(args.max_wait_secs),
                    Duration::from_secs(args.poll_secs),
                    args.url_prefix.as_deref(),
                )
                .await?;
            print_message(&link, format);
        }
        InboxCommands::List(args) => {
            let messages = match &args.recipient {
                Some(recipient) => client.messages_for_recipient(recipient).await?,
                None => client.messages().await?,
            };
            let rows: Vec<MessageRow> = messages.iter().map(MessageRow::from).collect();
            print_rows(&rows, format);
        }
    }

    Ok(())
}
