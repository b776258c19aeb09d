//! Chat notifications through Slack
//!
//! Builds the Block Kit message for one finished run: a title linking to the
//! case-management run when a handle exists, a metadata context, the totals
//! summary, optional dashboard buttons, and a footer credit.

use async_trait::async_trait;
use tracing::warn;

use qarelay_common::{ExternalRunHandle, FrameworkConfig, Platform, RunIdentity, VERSION};
use qarelay_integrations::error::IntegrationResult;
use qarelay_integrations::slack::{Block, Element, SlackClient, Text};

use crate::aggregate::AggregateReport;
use crate::router::ChatSink;

pub struct SlackSink {
    client: SlackClient,
    icon_emoji: Option<String>,
    platform: Platform,
    release: String,
    environment: String,
    buttons: Vec<Element>,
}

impl SlackSink {
    /// Build the sink from the harness configuration, capturing the
    /// environment display value and any enabled dashboard buttons.
    pub fn from_config(config: &FrameworkConfig) -> IntegrationResult<Self> {
        let client = SlackClient::new(&config.slack)?;

        let mut buttons = Vec::new();
        if config.saucelabs.enabled {
            buttons.push(Element::button(
                "Saucelabs",
                &config.saucelabs.dashboard_url,
                "qarelay-saucelabs",
            ));
        }
        if config.jenkins.enabled {
            match config.jenkins.jobs.get(&config.platform) {
                Some(job_path) => {
                    let build_number = std::env::var("BUILD_NUMBER").unwrap_or_default();
                    let url = jenkins_job_url(&config.jenkins.base_url, job_path, &build_number);
                    buttons.push(Element::button("Jenkins", &url, "qarelay-jenkins"));
                }
                None => warn!(
                    "No Jenkins job configured for platform {}",
                    config.platform
                ),
            }
        }

        Ok(Self {
            client,
            icon_emoji: config.slack.icon_emoji.clone(),
            platform: config.platform,
            release: config.project.release.clone(),
            environment: config.resolved_base_url(),
            buttons,
        })
    }

    fn build_blocks(
        &self,
        report: &AggregateReport,
        elapsed_display: &str,
        handle: Option<&ExternalRunHandle>,
        identity: &RunIdentity,
    ) -> Vec<Block> {
        let mut blocks = Vec::new();

        blocks.push(title_block(handle, identity));

        blocks.push(Block::context(vec![
            Text::mrkdwn(&format!("Platform:\t{}", self.platform.label())),
            Text::mrkdwn(&format!("Release:\t{}", self.release)),
            Text::mrkdwn(&format!("Environment:\t{}", self.environment)),
            Text::mrkdwn(&format!("Run time:\t{}", elapsed_display)),
        ]));
        blocks.push(Block::Divider);
        blocks.push(Block::fields(vec![Text::mrkdwn(&summary_line(report))]));

        if !self.buttons.is_empty() {
            blocks.push(Block::Actions {
                elements: self.buttons.clone(),
            });
        }

        blocks.push(Block::Divider);
        blocks.push(Block::context(vec![Text::mrkdwn(&format!(
            ":rocket: Powered by *QARelay* | v {}",
            VERSION
        ))]));

        blocks
    }
}

#[async_trait]
impl ChatSink for SlackSink {
    async fn notify(
        &self,
        report: &AggregateReport,
        elapsed_display: &str,
        handle: Option<&ExternalRunHandle>,
        identity: &RunIdentity,
    ) -> anyhow::Result<()> {
        let blocks = self.build_blocks(report, elapsed_display, handle, identity);
        self.client
            .post_message(blocks, self.icon_emoji.as_deref())
            .await?;
        Ok(())
    }
}

/// Title for the notification.
///
/// With a run handle only the build/project portion of the identity becomes
/// the link anchor and the remainder stays plain; without one the full
/// identity renders as a plain header.
fn title_block(handle: Option<&ExternalRunHandle>, identity: &RunIdentity) -> Block {
    let label = identity.label();
    match handle {
        Some(handle) => {
            let text = match label.split_once(" running on ") {
                Some((link_part, rest)) => {
                    format!("*<{}|{}>* running on {}", handle.url, link_part, rest)
                }
                None => format!("*<{}|{}>*", handle.url, label),
            };
            Block::section(&text)
        }
        None => Block::header(&label),
    }
}

/// Summary line with total, passed, and (when present) failed counts
fn summary_line(report: &AggregateReport) -> String {
    // Slack dropped tab support in messages
    let spaces = "   ";
    let mut summary = format!(
        ":bar_chart:{}*{}*{}:white_check_mark:{}*{}* ({})",
        spaces, report.total, spaces, spaces, report.passed, report.passed_percentage
    );

    if report.failed > 0 {
        summary.push_str(&format!(
            "{}:x:{}*{}* ({})",
            spaces, spaces, report.failed, report.failed_percentage
        ));
    }

    summary
}

/// Jenkins job URL for the current build
fn jenkins_job_url(base_url: &str, job_path: &str, build_number: &str) -> String {
    format!("{}{}{}", base_url, job_path, build_number)
}
