//! Re-routing of saved run records to the reporting sinks

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use qarelay_common::FrameworkConfig;
use qarelay_report::{AggregateReport, CaseSink, ChatSink, ReportRouter, SlackSink, TestRailSink};
use qarelay_runner::RunRecord;

#[derive(Args)]
pub struct ReportArgs {
    /// Run record to re-route
    #[arg(default_value = "test-results/latest.json")]
    pub record: PathBuf,
}

pub async fn execute(args: ReportArgs, config_path: &Path) -> Result<()> {
    let config = FrameworkConfig::load(config_path)?;
    let record = RunRecord::load(&args.record)?;

    info!(
        "Re-reporting run {} ({} result(s))",
        record.identity.build_id,
        record.results.len()
    );

    let report = AggregateReport::from_results(&record.results);
    route_record(&config, &record, &report).await
}

/// Send one finished run through the enabled sinks, then surface the
/// device-cloud dashboard pointer.
///
/// Chat sink construction failures are fatal; everything downstream is
/// caught and logged by the router.
pub async fn route_record(
    config: &FrameworkConfig,
    record: &RunRecord,
    report: &AggregateReport,
) -> Result<()> {
    let case_sink: Option<Box<dyn CaseSink + Send + Sync>> = if config.testrail.enabled {
        Some(Box::new(TestRailSink::new(config.testrail.clone())))
    } else {
        None
    };

    let chat_sink: Option<Box<dyn ChatSink + Send + Sync>> = if config.slack.enabled {
        let sink = SlackSink::from_config(config).context("Failed to construct Slack sink")?;
        Some(Box::new(sink))
    } else {
        None
    };

    let router = ReportRouter::new(case_sink, chat_sink);
    let elapsed = Duration::try_from_secs_f64(record.elapsed_secs).unwrap_or_default();
    router
        .route(
            report,
            &record.results,
            &record.identity,
            elapsed,
            &config.report_config(),
        )
        .await;

    if config.saucelabs.enabled {
        info!(
            "Saucelabs results: {}\n Search for test cases with prefix: {}",
            config.saucelabs.dashboard_url, record.identity.build_id
        );
    }

    Ok(())
}
