//! Case-management reporting through TestRail

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use qarelay_common::config::TestRailConfig;
use qarelay_common::{format_duration, ExternalRunHandle, RawResult, RunIdentity};
use qarelay_integrations::testrail::{status_id, CaseResult, TestRailClient};

use crate::router::CaseSink;

/// Reports a finished run to TestRail as a freshly created test run.
///
/// The run is scoped to exactly the case IDs the results reference, so it
/// reflects what was actually exercised rather than the whole suite.
pub struct TestRailSink {
    config: TestRailConfig,
}

impl TestRailSink {
    pub fn new(config: TestRailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CaseSink for TestRailSink {
    async fn create_run_and_report(
        &self,
        results: &[RawResult],
        identity: &RunIdentity,
        elapsed: Duration,
    ) -> anyhow::Result<ExternalRunHandle> {
        info!("Initializing TestRail integration");
        let client = TestRailClient::connect(&self.config).await?;

        // Collect the exercised case IDs before creating the run
        let case_ids = collect_case_ids(results);
        debug!(
            "Found {} test case(s) to report: {:?}",
            case_ids.len(),
            case_ids
        );

        let description = format!(
            "Automated test run\nPlatform: {}\nDuration: {}",
            identity.platform,
            format_duration(elapsed.as_secs())
        );

        let run = client
            .add_run(&identity.label(), Some(&description), Some(&case_ids))
            .await?;

        for result in results {
            if result.case_ids.is_empty() {
                debug!(
                    "Skipping {} - no case IDs associated",
                    result.test_identifier()
                );
                continue;
            }

            for &case_id in &result.case_ids {
                let submission = CaseResult {
                    status_id: status_id(result.status),
                    comment: Some(case_comment(result)),
                    elapsed: result
                        .duration
                        .filter(|d| *d > 0.0)
                        .map(|d| format_duration(d as u64)),
                };

                if let Err(e) = client
                    .add_result_for_case(run.id, case_id, &submission)
                    .await
                {
                    error!("Failed to add result for case {}: {}", case_id, e);
                }
            }
        }

        let url = client.run_url(run.id);
        info!("TestRail reporting completed successfully");
        info!("View results at: {}", url);

        Ok(ExternalRunHandle { id: run.id, url })
    }
}

/// De-duplicate exercised case IDs preserving first-seen order
fn collect_case_ids(results: &[RawResult]) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for result in results {
        for &case_id in &result.case_ids {
            if seen.insert(case_id) {
                ids.push(case_id);
            }
        }
    }
    ids
}

/// Comment for one submission: test identifier plus any failure message
fn case_comment(result: &RawResult) -> String {
    match result.message.as_deref() {
        Some(message) if !message.is_empty() => {
            format!("Test: {}\n\n{}", result.test_identifier(), message)
        }
        _ => format!("Test: {}", result.test_identifier()),
    }
}
