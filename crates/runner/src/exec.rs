//! Child-process execution with per-case timeouts

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use qarelay_common::{RawResult, RunIdentity, TestStatus};

use crate::error::{RunnerError, RunnerResult};
use crate::suite::TestCase;

/// Values exported to every child process
pub struct ExecEnv<'a> {
    pub base_url: &'a str,
    pub identity: &'a RunIdentity,
}

/// Run one case to completion and capture its outcome.
///
/// Non-zero exit and timeout both map to a failed result; only a spawn
/// failure surfaces as an error.
pub async fn run_case(group: &str, case: &TestCase, env: &ExecEnv<'_>) -> RunnerResult<RawResult> {
    let started = Instant::now();

    let mut cmd = Command::new(&case.command);
    cmd.args(&case.args)
        .env("QARELAY_PLATFORM", env.identity.platform.as_str())
        .env("QARELAY_BASE_URL", env.base_url)
        .env("QARELAY_RUN_ID", &env.identity.build_id)
        .envs(&case.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("Executing {} {}", case.command, case.args.join(" "));

    let child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        command: case.command.clone(),
        source,
    })?;

    let limit = Duration::from_secs(case.timeout_secs);
    let (status, message) = match timeout(limit, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            if output.status.success() {
                (TestStatus::Passed, None)
            } else {
                (TestStatus::Failed, Some(failure_message(&output)))
            }
        }
        Err(_) => (
            TestStatus::Failed,
            Some(format!("Timed out after {}s", case.timeout_secs)),
        ),
    };

    Ok(RawResult {
        group: group.to_string(),
        name: case.name.clone(),
        status,
        duration: Some(started.elapsed().as_secs_f64()),
        message,
        case_ids: case.case_ids.clone(),
    })
}

/// Exit status plus the tail of stderr, the part test authors read first
fn failure_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail = stderr_tail(&stderr, 10);

    if tail.is_empty() {
        format!("Exited with {}", output.status)
    } else {
        format!("Exited with {}\n{}", output.status, tail)
    }
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let noisy: String = (1..=25)
            .map(|i| format!("line {}\n", i))
            .collect();

        let tail = stderr_tail(&noisy, 10);
        assert!(tail.starts_with("line 16"));
        assert!(tail.ends_with("line 25"));
        assert_eq!(tail.lines().count(), 10);
    }

    #[test]
    fn stderr_tail_of_empty_output_is_empty() {
        assert_eq!(stderr_tail("", 10), "");
    }
}
