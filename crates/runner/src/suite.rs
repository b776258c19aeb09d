//! Declarative YAML test suites

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use qarelay_common::Platform;

use crate::error::{RunnerError, RunnerResult};

/// A complete test suite parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    /// Unique name for this suite
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Groups executed in declaration order
    pub groups: Vec<TestGroup>,
}

/// A named group of cases, mirroring a test class in the consuming project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestGroup {
    pub name: String,
    pub cases: Vec<TestCase>,
}

/// One executable test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,

    /// Program to execute
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Case-management case ids covered by this test
    #[serde(default)]
    pub case_ids: Vec<u64>,

    /// Platforms the case runs on; empty means all platforms
    #[serde(default)]
    pub platforms: Vec<Platform>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra environment passed to the child process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl TestCase {
    /// Whether this case is in scope for the given platform
    pub fn runs_on(&self, platform: Platform) -> bool {
        self.platforms.is_empty() || self.platforms.contains(&platform)
    }
}

impl TestSuite {
    /// Parse a suite from a YAML string
    pub fn from_yaml(yaml: &str) -> RunnerResult<Self> {
        let suite: Self = serde_yaml::from_str(yaml)?;
        if suite.groups.iter().all(|g| g.cases.is_empty()) {
            return Err(RunnerError::EmptySuite(suite.name));
        }
        Ok(suite)
    }

    /// Parse a suite from a YAML file
    pub fn from_file(path: &Path) -> RunnerResult<Self> {
        if !path.exists() {
            return Err(RunnerError::SuiteNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all suites below a directory
    pub fn load_all(dir: &Path) -> RunnerResult<Vec<Self>> {
        let mut suites = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            suites.push(Self::from_file(entry.path())?);
        }

        Ok(suites)
    }

    /// Narrow the suite to a `Group` or `Group.case` selector
    pub fn select(&self, selector: &str) -> RunnerResult<Self> {
        let (group_name, case_name) = match selector.split_once('.') {
            Some((group, case)) => (group, Some(case)),
            None => (selector, None),
        };

        let groups: Vec<TestGroup> = self
            .groups
            .iter()
            .filter(|g| g.name == group_name)
            .map(|g| TestGroup {
                name: g.name.clone(),
                cases: g
                    .cases
                    .iter()
                    .filter(|c| case_name.map_or(true, |name| c.name == name))
                    .cloned()
                    .collect(),
            })
            .filter(|g| !g.cases.is_empty())
            .collect();

        if groups.is_empty() {
            return Err(RunnerError::TestNotFound(selector.to_string()));
        }

        Ok(Self {
            name: self.name.clone(),
            description: self.description.clone(),
            groups,
        })
    }

    /// Total number of cases across all groups
    pub fn case_count(&self) -> usize {
        self.groups.iter().map(|g| g.cases.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_suite() {
        let yaml = r#"
name: smoke
description: Login and checkout smoke tests
groups:
  - name: LoginTests
    cases:
      - name: test_valid_login
        command: pytest
        args: ["-k", "test_valid_login"]
        case_ids: [1101, 1102]
        timeout_secs: 120
      - name: test_ios_face_id
        command: pytest
        args: ["-k", "test_ios_face_id"]
        platforms: [ios]
  - name: CheckoutTests
    cases:
      - name: test_guest_checkout
        command: pytest
        args: ["-k", "test_guest_checkout"]
        env:
          CHECKOUT_MODE: guest
"#;
        let suite = TestSuite::from_yaml(yaml).unwrap();
        assert_eq!(suite.name, "smoke");
        assert_eq!(suite.groups.len(), 2);
        assert_eq!(suite.case_count(), 3);

        let login = &suite.groups[0].cases[0];
        assert_eq!(login.case_ids, vec![1101, 1102]);
        assert_eq!(login.timeout_secs, 120);
        assert!(login.platforms.is_empty());

        let checkout = &suite.groups[1].cases[0];
        assert_eq!(checkout.timeout_secs, 300);
        assert_eq!(checkout.env.get("CHECKOUT_MODE").map(String::as_str), Some("guest"));
    }

    #[test]
    fn platform_scope_defaults_to_all() {
        let all = TestCase {
            name: "test_anything".to_string(),
            command: "true".to_string(),
            args: vec![],
            case_ids: vec![],
            platforms: vec![],
            timeout_secs: 300,
            env: BTreeMap::new(),
        };
        assert!(all.runs_on(Platform::Ios));
        assert!(all.runs_on(Platform::Firefox));

        let ios_only = TestCase {
            platforms: vec![Platform::Ios],
            ..all
        };
        assert!(ios_only.runs_on(Platform::Ios));
        assert!(!ios_only.runs_on(Platform::Android));
    }

    #[test]
    fn selects_whole_group_or_single_case() {
        let yaml = r#"
name: smoke
groups:
  - name: LoginTests
    cases:
      - name: test_valid_login
        command: "true"
      - name: test_invalid_login
        command: "true"
  - name: CheckoutTests
    cases:
      - name: test_guest_checkout
        command: "true"
"#;
        let suite = TestSuite::from_yaml(yaml).unwrap();

        let group = suite.select("LoginTests").unwrap();
        assert_eq!(group.case_count(), 2);
        assert_eq!(group.groups.len(), 1);

        let single = suite.select("LoginTests.test_invalid_login").unwrap();
        assert_eq!(single.case_count(), 1);
        assert_eq!(single.groups[0].cases[0].name, "test_invalid_login");

        match suite.select("LoginTests.test_missing") {
            Err(RunnerError::TestNotFound(name)) => {
                assert_eq!(name, "LoginTests.test_missing");
            }
            other => panic!("expected TestNotFound, got {:?}", other.map(|s| s.name)),
        }
    }

    #[test]
    fn empty_suite_is_rejected() {
        let yaml = r#"
name: hollow
groups:
  - name: NothingHere
    cases: []
"#;
        match TestSuite::from_yaml(yaml) {
            Err(RunnerError::EmptySuite(name)) => assert_eq!(name, "hollow"),
            other => panic!("expected EmptySuite, got {:?}", other.map(|s| s.name)),
        }
    }
}
