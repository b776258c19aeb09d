//! End-to-end suite execution against real child processes

use qarelay_common::{FrameworkConfig, TestStatus};
use qarelay_runner::{RunRecord, RunnerError, SuiteRunner, TestSuite};

fn runner() -> SuiteRunner {
    SuiteRunner::new(&FrameworkConfig::default())
}

#[tokio::test]
async fn mixed_suite_records_every_outcome() {
    let yaml = r#"
name: shell-smoke
groups:
  - name: ShellTests
    cases:
      - name: test_exits_clean
        command: sh
        args: ["-c", "exit 0"]
        case_ids: [101]
      - name: test_exits_dirty
        command: sh
        args: ["-c", "echo boom >&2; exit 3"]
        case_ids: [102]
      - name: test_hangs
        command: sleep
        args: ["5"]
        timeout_secs: 1
      - name: test_ios_specific
        command: sh
        args: ["-c", "exit 0"]
        platforms: [ios]
"#;
    let suite = TestSuite::from_yaml(yaml).expect("suite parses");

    let record = runner().run(&suite).await.expect("suite runs");
    assert_eq!(record.results.len(), 4);

    let clean = &record.results[0];
    assert_eq!(clean.status, TestStatus::Passed);
    assert_eq!(clean.message, None);
    assert!(clean.duration.is_some());
    assert_eq!(clean.case_ids, vec![101]);

    let dirty = &record.results[1];
    assert_eq!(dirty.status, TestStatus::Failed);
    let message = dirty.message.as_deref().expect("failure message");
    assert!(message.contains("Exited with"), "message: {}", message);
    assert!(message.contains("boom"), "message: {}", message);

    let hung = &record.results[2];
    assert_eq!(hung.status, TestStatus::Failed);
    assert_eq!(hung.message.as_deref(), Some("Timed out after 1s"));
    assert!(hung.duration.unwrap_or_default() >= 1.0);

    // Default platform is android, so the iOS-scoped case never executes
    let skipped = &record.results[3];
    assert_eq!(skipped.status, TestStatus::Untested);
    assert_eq!(
        skipped.message.as_deref(),
        Some("iOS test cases only, skipping")
    );
    assert_eq!(skipped.duration, None);

    assert!(record.elapsed_secs >= 1.0);
}

#[tokio::test]
async fn children_receive_harness_environment() {
    let yaml = r#"
name: env-check
groups:
  - name: EnvTests
    cases:
      - name: test_platform_exported
        command: sh
        args: ["-c", "test \"$QARELAY_PLATFORM\" = android"]
      - name: test_extra_env_exported
        command: sh
        args: ["-c", "test \"$CHECKOUT_MODE\" = guest"]
        env:
          CHECKOUT_MODE: guest
"#;
    let suite = TestSuite::from_yaml(yaml).expect("suite parses");

    let record = runner().run(&suite).await.expect("suite runs");
    for result in &record.results {
        assert_eq!(
            result.status,
            TestStatus::Passed,
            "{} failed: {:?}",
            result.test_identifier(),
            result.message
        );
    }
}

#[tokio::test]
async fn unspawnable_command_surfaces_as_error() {
    let yaml = r#"
name: broken
groups:
  - name: BrokenTests
    cases:
      - name: test_missing_binary
        command: qarelay-no-such-binary
"#;
    let suite = TestSuite::from_yaml(yaml).expect("suite parses");

    match runner().run(&suite).await {
        Err(RunnerError::Spawn { command, .. }) => {
            assert_eq!(command, "qarelay-no-such-binary");
        }
        other => panic!(
            "expected Spawn error, got {:?}",
            other.map(|r| r.results.len())
        ),
    }
}

#[tokio::test]
async fn saved_record_reloads_for_replay() {
    let yaml = r#"
name: persist
groups:
  - name: PersistTests
    cases:
      - name: test_exits_clean
        command: sh
        args: ["-c", "exit 0"]
"#;
    let suite = TestSuite::from_yaml(yaml).expect("suite parses");
    let record = runner().run(&suite).await.expect("suite runs");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("latest.json");
    record.save(&path).expect("record saves");

    let loaded = RunRecord::load(&path).expect("record loads");
    assert_eq!(loaded.identity.build_id, record.identity.build_id);
    assert_eq!(loaded.results.len(), 1);
    assert_eq!(loaded.results[0].status, TestStatus::Passed);
}
