//! Harness configuration
//!
//! Loaded from a TOML file. Every section has working defaults so a missing
//! file still yields a runnable local configuration, and the whole object is
//! passed explicitly to whoever needs it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::types::Platform;

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkConfig {
    /// Platform the run targets unless overridden on the command line
    #[serde(default = "default_platform")]
    pub platform: Platform,

    #[serde(default)]
    pub project: ProjectConfig,

    /// Named environments and their base URLs
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,

    #[serde(default)]
    pub testrail: TestRailConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub mailtrap: Option<MailtrapConfig>,

    #[serde(default)]
    pub lms: Option<LmsConfig>,

    #[serde(default)]
    pub saucelabs: SaucelabsConfig,

    #[serde(default)]
    pub jenkins: JenkinsConfig,
}

fn default_platform() -> Platform {
    Platform::Android
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            project: ProjectConfig::default(),
            environments: BTreeMap::new(),
            testrail: TestRailConfig::default(),
            slack: SlackConfig::default(),
            mailtrap: None,
            lms: None,
            saucelabs: SaucelabsConfig::default(),
            jenkins: JenkinsConfig::default(),
        }
    }
}

/// Active project under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,

    /// Release tag shown in notifications
    pub release: String,

    /// Name of the active entry in the environments table
    pub environment: Option<String>,

    /// Explicit base URL, overriding the environments table
    pub base_url: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "qarelay".to_string(),
            release: "dev".to_string(),
            environment: None,
            base_url: None,
        }
    }
}

/// One named deployment environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub base_url: String,
}

/// Case-management sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRailConfig {
    pub enabled: bool,
    pub base_url: String,
    pub username: String,
    pub api_key: String,
    pub project_id: u64,
    pub suite_id: u64,
}

impl Default for TestRailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            username: String::new(),
            api_key: String::new(),
            project_id: 1,
            suite_id: 1,
        }
    }
}

/// Chat-notification sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub enabled: bool,
    pub token: String,
    pub channel_id: String,
    pub icon_emoji: Option<String>,

    /// Send the notification even when the run has failures
    pub report_on_fail: bool,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: String::new(),
            channel_id: String::new(),
            icon_emoji: None,
            report_on_fail: false,
        }
    }
}

/// Email-inbox integration credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailtrapConfig {
    pub api_token: String,
    pub account_id: u64,
    pub inbox_id: u64,
}

/// Lead-LMS API credentials for test-data cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmsConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

/// Device-cloud dashboard integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaucelabsConfig {
    pub enabled: bool,
    pub dashboard_url: String,
}

impl Default for SaucelabsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dashboard_url: "https://app.saucelabs.com/dashboard/tests/rdc".to_string(),
        }
    }
}

/// CI job-link integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JenkinsConfig {
    pub enabled: bool,
    pub base_url: String,

    /// Job path per platform, joined with the CI build number
    #[serde(default)]
    pub jobs: BTreeMap<Platform, String>,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            jobs: BTreeMap::new(),
        }
    }
}

/// Routing flags handed to the report router per call
#[derive(Debug, Clone, Copy)]
pub struct ReportConfig {
    pub case_management: bool,
    pub chat: bool,
    pub report_on_fail: bool,
}

impl FrameworkConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Distill the routing flags for one reporting call
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            case_management: self.testrail.enabled,
            chat: self.slack.enabled,
            report_on_fail: self.slack.report_on_fail,
        }
    }

    /// Base URL for the active environment.
    ///
    /// Resolution order: explicit project base URL, then the environments
    /// table keyed by the project's environment name, then the raw
    /// environment name as a last resort.
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.project.base_url {
            return url.clone();
        }

        if let Some(environment) = &self.project.environment {
            if let Some(entry) = self.environments.get(environment) {
                return entry.base_url.clone();
            }
            return environment.clone();
        }

        "Unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_yields_defaults() {
        let config = FrameworkConfig::load(Path::new("/nonexistent/qarelay.toml")).unwrap();
        assert_eq!(config.platform, Platform::Android);
        assert!(!config.testrail.enabled);
        assert!(config.mailtrap.is_none());
    }

    #[test]
    fn default_round_trips_through_toml() {
        let config = FrameworkConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: FrameworkConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.platform, config.platform);
        assert_eq!(parsed.project.name, config.project.name);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("qarelay.toml");

        let mut config = FrameworkConfig::default();
        config.platform = Platform::IosWeb;
        config.testrail.enabled = true;
        config.testrail.base_url = "https://example.testrail.io".to_string();

        config.save(&path).unwrap();
        let loaded = FrameworkConfig::load(&path).unwrap();

        assert_eq!(loaded.platform, Platform::IosWeb);
        assert!(loaded.testrail.enabled);
        assert_eq!(loaded.testrail.base_url, "https://example.testrail.io");
    }

    #[test]
    fn parses_full_sample() {
        let toml = r#"
platform = "ios"

[project]
name = "lead"
release = "2.4.1"
environment = "STAGING"

[environments.STAGING]
base_url = "https://staging.example.org"

[testrail]
enabled = true
base_url = "https://example.testrail.io"
username = "bot@example.org"
api_key = "key"
project_id = 7
suite_id = 12

[slack]
enabled = true
token = "xoxb-test"
channel_id = "C0123"
report_on_fail = true

[mailtrap]
api_token = "token"
account_id = 11
inbox_id = 22
"#;
        let config: FrameworkConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.testrail.project_id, 7);
        assert!(config.slack.report_on_fail);
        assert_eq!(config.mailtrap.as_ref().unwrap().inbox_id, 22);

        let report = config.report_config();
        assert!(report.case_management);
        assert!(report.chat);
        assert!(report.report_on_fail);
    }

    #[test]
    fn base_url_resolution_order() {
        let mut config = FrameworkConfig::default();
        assert_eq!(config.resolved_base_url(), "Unknown");

        config.project.environment = Some("STAGING".to_string());
        assert_eq!(config.resolved_base_url(), "STAGING");

        config.environments.insert(
            "STAGING".to_string(),
            EnvironmentConfig {
                base_url: "https://staging.example.org".to_string(),
            },
        );
        assert_eq!(config.resolved_base_url(), "https://staging.example.org");

        config.project.base_url = Some("https://override.example.org".to_string());
        assert_eq!(config.resolved_base_url(), "https://override.example.org");
    }
}
