//! Sink fan-out for finished runs
//!
//! Order is load-bearing: the case-management sink runs first so its run
//! handle can be embedded in the chat notification. Sink failures are
//! logged and isolated, never propagated to the caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};

use qarelay_common::{format_duration, ExternalRunHandle, RawResult, ReportConfig, RunIdentity};

use crate::aggregate::AggregateReport;

/// Case-management destination creating a tracked run
#[async_trait]
pub trait CaseSink {
    async fn create_run_and_report(
        &self,
        results: &[RawResult],
        identity: &RunIdentity,
        elapsed: Duration,
    ) -> anyhow::Result<ExternalRunHandle>;
}

/// Chat destination receiving the run summary
#[async_trait]
pub trait ChatSink {
    async fn notify(
        &self,
        report: &AggregateReport,
        elapsed_display: &str,
        handle: Option<&ExternalRunHandle>,
        identity: &RunIdentity,
    ) -> anyhow::Result<()>;
}

/// Routes one finished run to the enabled sinks
pub struct ReportRouter {
    case_sink: Option<Box<dyn CaseSink + Send + Sync>>,
    chat_sink: Option<Box<dyn ChatSink + Send + Sync>>,
}

impl ReportRouter {
    pub fn new(
        case_sink: Option<Box<dyn CaseSink + Send + Sync>>,
        chat_sink: Option<Box<dyn ChatSink + Send + Sync>>,
    ) -> Self {
        Self {
            case_sink,
            chat_sink,
        }
    }

    /// Deliver the report to every enabled sink.
    ///
    /// Step 1 reports to case management and captures the created run
    /// handle; a failure there degrades to "no handle". Step 2 sends the
    /// chat notification, skipped when the run has failures and
    /// `report_on_fail` is off.
    pub async fn route(
        &self,
        report: &AggregateReport,
        results: &[RawResult],
        identity: &RunIdentity,
        elapsed: Duration,
        config: &ReportConfig,
    ) {
        let mut handle = None;
        if config.case_management {
            if let Some(sink) = &self.case_sink {
                match sink.create_run_and_report(results, identity, elapsed).await {
                    Ok(created) => handle = Some(created),
                    Err(e) => {
                        error!("Case-management reporting failed: {}", e);
                        warn!("Continuing execution despite case-management failure");
                    }
                }
            }
        }

        if config.chat {
            if let Some(sink) = &self.chat_sink {
                if report.failed > 0 {
                    if !config.report_on_fail {
                        warn!("Failed test results detected, skipping chat notification");
                        return;
                    }
                    warn!("Forcing chat notification despite failed results");
                }

                let elapsed_display = format_duration(elapsed.as_secs());
                if let Err(e) = sink
                    .notify(report, &elapsed_display, handle.as_ref(), identity)
                    .await
                {
                    error!("Chat notification failed: {}", e);
                }
            }
        }
    }
}
