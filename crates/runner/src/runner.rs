//! Suite orchestration and run persistence

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use qarelay_common::{FrameworkConfig, Platform, RawResult, RunIdentity, TestStatus};

use crate::error::{RunnerError, RunnerResult};
use crate::exec::{run_case, ExecEnv};
use crate::suite::{TestCase, TestSuite};

/// Everything one harness invocation produced, in executed order.
///
/// Written to disk after a run so reporting can be replayed without
/// re-executing the suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub identity: RunIdentity,
    pub elapsed_secs: f64,
    pub recorded_at: DateTime<Utc>,
    pub results: Vec<RawResult>,
}

impl RunRecord {
    pub fn save(&self, path: &Path) -> RunnerResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!("Run record written to: {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> RunnerResult<Self> {
        if !path.exists() {
            return Err(RunnerError::RecordNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Executes suites case by case for one platform
pub struct SuiteRunner {
    platform: Platform,
    base_url: String,
    identity: RunIdentity,
}

impl SuiteRunner {
    pub fn new(config: &FrameworkConfig) -> Self {
        Self {
            platform: config.platform,
            base_url: config.resolved_base_url(),
            identity: RunIdentity::generate(&config.project.name, config.platform),
        }
    }

    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Run every case in the suite and return the full record.
    ///
    /// Cases scoped to other platforms are recorded as untested with a skip
    /// reason instead of being executed.
    pub async fn run(&self, suite: &TestSuite) -> RunnerResult<RunRecord> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(suite.case_count());
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        info!(
            "Running suite '{}' with {} case(s) on {}",
            suite.name,
            suite.case_count(),
            self.platform
        );

        let env = ExecEnv {
            base_url: &self.base_url,
            identity: &self.identity,
        };

        for group in &suite.groups {
            for case in &group.cases {
                if !case.runs_on(self.platform) {
                    skipped += 1;
                    results.push(skip_result(&group.name, case));
                    continue;
                }

                let result = run_case(&group.name, case, &env).await?;
                match result.status {
                    TestStatus::Passed => {
                        passed += 1;
                        info!(
                            "✓ {} ({:.1}s)",
                            result.test_identifier(),
                            result.duration.unwrap_or_default()
                        );
                    }
                    _ => {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.test_identifier(),
                            result.message.as_deref().unwrap_or("unknown error")
                        );
                    }
                }
                results.push(result);
            }
        }

        let elapsed_secs = started.elapsed().as_secs_f64();

        info!("");
        info!(
            "Suite finished: {} passed, {} failed, {} skipped ({:.1}s)",
            passed, failed, skipped, elapsed_secs
        );

        Ok(RunRecord {
            identity: self.identity.clone(),
            elapsed_secs,
            recorded_at: Utc::now(),
            results,
        })
    }
}

/// Untested placeholder for a case scoped to another platform
fn skip_result(group: &str, case: &TestCase) -> RawResult {
    let reason = match case.platforms.first() {
        Some(platform) => format!("{} only, skipping", platform.skip_label()),
        None => "skipping".to_string(),
    };
    warn!("{}.{}: {}", group, case.name, reason);

    RawResult {
        group: group.to_string(),
        name: case.name.clone(),
        status: TestStatus::Untested,
        duration: None,
        message: Some(reason),
        case_ids: case.case_ids.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn case_for(platforms: Vec<Platform>) -> TestCase {
        TestCase {
            name: "test_face_id".to_string(),
            command: "true".to_string(),
            args: vec![],
            case_ids: vec![2201],
            platforms,
            timeout_secs: 300,
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn skip_result_names_required_platform() {
        let result = skip_result("BiometricsTests", &case_for(vec![Platform::Ios]));

        assert_eq!(result.status, TestStatus::Untested);
        assert_eq!(result.duration, None);
        assert_eq!(
            result.message.as_deref(),
            Some("iOS test cases only, skipping")
        );
        assert_eq!(result.case_ids, vec![2201]);
        assert_eq!(result.test_identifier(), "BiometricsTests.test_face_id");
    }

    #[test]
    fn skip_labels_cover_web_platforms() {
        let android_web = skip_result("WebTests", &case_for(vec![Platform::AndroidWeb]));
        assert_eq!(
            android_web.message.as_deref(),
            Some("Chrome mobile for Android only, skipping")
        );

        let ios_web = skip_result("WebTests", &case_for(vec![Platform::IosWeb]));
        assert_eq!(
            ios_web.message.as_deref(),
            Some("Safari for iOS only, skipping")
        );
    }

    #[test]
    fn run_record_round_trips_through_disk() {
        let record = RunRecord {
            identity: RunIdentity {
                build_id: "b-417".to_string(),
                project: "LEAD".to_string(),
                platform: Platform::Android,
                started_at: "14:02:55".to_string(),
                user: "ci".to_string(),
            },
            elapsed_secs: 12.5,
            recorded_at: Utc::now(),
            results: vec![RawResult {
                group: "LoginTests".to_string(),
                name: "test_valid_login".to_string(),
                status: TestStatus::Passed,
                duration: Some(3.2),
                message: None,
                case_ids: vec![1101],
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("latest.json");

        record.save(&path).unwrap();
        let loaded = RunRecord::load(&path).unwrap();

        assert_eq!(loaded.identity.build_id, "b-417");
        assert_eq!(loaded.elapsed_secs, 12.5);
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].status, TestStatus::Passed);
    }

    #[test]
    fn missing_record_is_reported_as_such() {
        let dir = tempfile::tempdir().unwrap();
        match RunRecord::load(&dir.path().join("absent.json")) {
            Err(RunnerError::RecordNotFound(path)) => {
                assert!(path.ends_with("absent.json"));
            }
            other => panic!("expected RecordNotFound, got {:?}", other.map(|r| r.elapsed_secs)),
        }
    }
}
