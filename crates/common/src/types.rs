//! Core result and run-identity types shared across the harness

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Outcome of one executed test method.
///
/// The set is closed and mirrors the case-management status vocabulary.
/// Unrecognized inbound strings deserialize to `Untested`, which is also
/// what platform-scoped skips are recorded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum TestStatus {
    Passed,
    Failed,
    Blocked,
    Retest,
    Untested,
}

impl From<String> for TestStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "blocked" => Self::Blocked,
            "retest" => Self::Retest,
            _ => Self::Untested,
        }
    }
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
            Self::Retest => "retest",
            Self::Untested => "untested",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test method's recorded outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    /// Owning test group (class) name
    pub group: String,

    /// Test method name
    pub name: String,

    pub status: TestStatus,

    /// Wall-clock duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Failure message or skip reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Case-management case ids exercised by this test
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub case_ids: Vec<u64>,
}

impl RawResult {
    /// Fully qualified `group.method` identifier
    pub fn test_identifier(&self) -> String {
        format!("{}.{}", self.group, self.name)
    }
}

/// Target platform for a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Android,
    AndroidWeb,
    IosWeb,
    Chrome,
    Firefox,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::AndroidWeb => "android_web",
            Self::IosWeb => "ios_web",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }

    /// Uppercase label used in run identities and notifications
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Human phrase used when a case is skipped for platform scope
    pub fn skip_label(&self) -> &'static str {
        match self {
            Self::Ios => "iOS test cases",
            Self::Android => "Android test cases",
            Self::AndroidWeb => "Chrome mobile for Android",
            Self::IosWeb => "Safari for iOS",
            Self::Chrome => "Chrome desktop",
            Self::Firefox => "Firefox desktop",
        }
    }

    pub fn is_native_mobile(&self) -> bool {
        matches!(self, Self::Ios | Self::Android)
    }

    pub fn is_mobile_web(&self) -> bool {
        matches!(self, Self::AndroidWeb | Self::IosWeb)
    }

    pub fn is_desktop_web(&self) -> bool {
        matches!(self, Self::Chrome | Self::Firefox)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            "android_web" => Ok(Self::AndroidWeb),
            "ios_web" => Ok(Self::IosWeb),
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            other => Err(Error::UnknownPlatform(other.to_string())),
        }
    }
}

/// Human-readable identity of one harness invocation.
///
/// Created once at run start and passed by reference to every sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunIdentity {
    pub build_id: String,
    pub project: String,
    pub platform: Platform,
    /// Start time rendered as HH:MM:SS
    pub started_at: String,
    pub user: String,
}

impl RunIdentity {
    pub fn generate(project: &str, platform: Platform) -> Self {
        Self {
            build_id: build_id(),
            project: project.to_uppercase(),
            platform,
            started_at: chrono::Local::now().format("%H:%M:%S").to_string(),
            user: current_user(),
        }
    }

    /// `"{BUILD_ID} {PROJECT} running on {PLATFORM} | started at [{TIME}] by {USER}"`
    pub fn label(&self) -> String {
        format!(
            "{} {} running on {} | started at [{}] by {}",
            self.build_id,
            self.project,
            self.platform.label(),
            self.started_at,
            self.user
        )
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Opaque handle to a run created in the case-management sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalRunHandle {
    pub id: u64,

    /// Browser URL for viewing the created run
    pub url: String,
}

/// Build id from the environment, or a short generated one for local runs
fn build_id() -> String {
    std::env::var("BUILD_ID").unwrap_or_else(|_| {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("local-{}", &id[..8])
    })
}

fn current_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}
