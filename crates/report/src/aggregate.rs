//! Test run totals

use serde::Serialize;
use tracing::warn;

use qarelay_common::{RawResult, TestStatus};

/// Consolidated statistics for one test run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub passed_percentage: String,
    pub failed_percentage: String,
}

impl AggregateReport {
    /// Reduce a result stream to totals and percentage strings.
    ///
    /// Only passed and failed results count toward the total; any other
    /// status is logged and excluded from both the total and the percentage
    /// denominators. An empty stream yields zeros and `"0.0%"` on both
    /// percentages.
    pub fn from_results(results: &[RawResult]) -> Self {
        let mut passed = 0;
        let mut failed = 0;

        for result in results {
            match result.status {
                TestStatus::Passed => passed += 1,
                TestStatus::Failed => failed += 1,
                other => warn!(
                    "Unrecognized result status '{}' for {}",
                    other,
                    result.test_identifier()
                ),
            }
        }

        let total = passed + failed;
        let (passed_percentage, failed_percentage) = if total > 0 {
            (
                format!("{:.1}%", passed as f64 / total as f64 * 100.0),
                format!("{:.1}%", failed as f64 / total as f64 * 100.0),
            )
        } else {
            ("0.0%".to_string(), "0.0%".to_string())
        };

        Self {
            total,
            passed,
            failed,
            passed_percentage,
            failed_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: TestStatus) -> RawResult {
        RawResult {
            group: "TestLogin".to_string(),
            name: "test_valid_login".to_string(),
            status,
            duration: None,
            message: None,
            case_ids: Vec::new(),
        }
    }

    #[test]
    fn empty_stream_yields_zero_percentages() {
        let report = AggregateReport::from_results(&[]);

        assert_eq!(report.total, 0);
        assert_eq!(report.passed, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(report.passed_percentage, "0.0%");
        assert_eq!(report.failed_percentage, "0.0%");
    }

    #[test]
    fn counts_passed_and_failed() {
        let results = vec![
            result(TestStatus::Passed),
            result(TestStatus::Passed),
            result(TestStatus::Passed),
            result(TestStatus::Passed),
            result(TestStatus::Failed),
        ];

        let report = AggregateReport::from_results(&results);
        assert_eq!(report.total, 5);
        assert_eq!(report.passed, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.passed_percentage, "80.0%");
        assert_eq!(report.failed_percentage, "20.0%");
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let results = vec![
            result(TestStatus::Passed),
            result(TestStatus::Failed),
            result(TestStatus::Failed),
        ];

        let report = AggregateReport::from_results(&results);
        assert_eq!(report.passed_percentage, "33.3%");
        assert_eq!(report.failed_percentage, "66.7%");
    }

    #[test]
    fn other_statuses_are_excluded_from_totals() {
        let results = vec![
            result(TestStatus::Passed),
            result(TestStatus::Blocked),
            result(TestStatus::Untested),
            result(TestStatus::Retest),
            result(TestStatus::Failed),
        ];

        let report = AggregateReport::from_results(&results);
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.passed_percentage, "50.0%");
    }

    #[test]
    fn passed_and_failed_always_sum_to_total() {
        let results = vec![
            result(TestStatus::Passed),
            result(TestStatus::Failed),
            result(TestStatus::Blocked),
            result(TestStatus::Passed),
            result(TestStatus::Untested),
        ];

        let report = AggregateReport::from_results(&results);
        assert_eq!(report.passed + report.failed, report.total);
    }
}
