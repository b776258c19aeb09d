//! TestRail API client
//!
//! JSON client for the TestRail v2 API. Requests carry a Basic auth header
//! derived from the username and API key, and every method lives under the
//! `index.php?/api/v2/` prefix.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use qarelay_common::config::TestRailConfig;
use qarelay_common::TestStatus;

use crate::error::{IntegrationError, IntegrationResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Map a result status to TestRail's status vocabulary
pub fn status_id(status: TestStatus) -> u8 {
    match status {
        TestStatus::Passed => 1,
        TestStatus::Blocked => 2,
        TestStatus::Untested => 3,
        TestStatus::Retest => 4,
        TestStatus::Failed => 5,
    }
}

/// Authenticated TestRail client bound to one project and suite
pub struct TestRailClient {
    client: Client,
    base_url: String,
    auth_header: String,
    project_id: u64,
    suite_id: u64,
}

impl TestRailClient {
    /// Connect to TestRail and verify the credentials and configured project
    pub async fn connect(config: &TestRailConfig) -> IntegrationResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let testrail = Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: basic_auth(&config.username, &config.api_key),
            project_id: config.project_id,
            suite_id: config.suite_id,
        };

        info!("Testing connection to TestRail API");
        let projects: Vec<Project> = testrail.get("get_projects").await?;
        info!("Connected to TestRail, {} projects visible", projects.len());

        match projects.iter().find(|p| p.id == testrail.project_id) {
            Some(project) => info!("Project found: {} (ID: {})", project.name, project.id),
            None => warn!(
                "Project ID {} not found in available projects",
                testrail.project_id
            ),
        }

        Ok(testrail)
    }

    /// Create a test run, scoped to `case_ids` when given
    pub async fn add_run(
        &self,
        name: &str,
        description: Option<&str>,
        case_ids: Option<&[u64]>,
    ) -> IntegrationResult<Run> {
        match case_ids {
            Some(ids) => debug!("Creating run with {} specific test cases", ids.len()),
            None => debug!("Creating run with all test cases from suite"),
        }

        let request = AddRunRequest {
            name: name.to_string(),
            suite_id: self.suite_id,
            include_all: case_ids.is_none(),
            case_ids: case_ids.map(|ids| ids.to_vec()),
            description: description.map(|d| d.to_string()),
        };

        info!("Creating TestRail test run: {}", name);
        let run: Run = self
            .post(&format!("add_run/{}", self.project_id), &request)
            .await?;
        info!("Test run created successfully with ID: {}", run.id);
        Ok(run)
    }

    /// Submit one case result to a run
    pub async fn add_result_for_case(
        &self,
        run_id: u64,
        case_id: u64,
        result: &CaseResult,
    ) -> IntegrationResult<()> {
        debug!(
            "Adding result for case {} in run {}: status_id={}",
            case_id, run_id, result.status_id
        );
        let _: serde_json::Value = self
            .post(&format!("add_result_for_case/{}/{}", run_id, case_id), result)
            .await?;
        Ok(())
    }

    /// Web URL for viewing a run
    pub fn run_url(&self, run_id: u64) -> String {
        format!("{}/index.php?/runs/view/{}", self.base_url, run_id)
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/index.php?/api/v2/{}", self.base_url, method)
    }

    async fn get<T: DeserializeOwned>(&self, method: &str) -> IntegrationResult<T> {
        let resp = self
            .client
            .get(self.api_url(method))
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> IntegrationResult<T> {
        let resp = self
            .client
            .post(self.api_url(method))
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> IntegrationResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::TestRailApi {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

fn basic_auth(username: &str, api_key: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, api_key))
    )
}

#[derive(Debug, Deserialize)]
struct Project {
    id: u64,
    name: String,
}

/// Run as returned by `add_run`
#[derive(Debug, Deserialize)]
pub struct Run {
    pub id: u64,
}

#[derive(Debug, Serialize)]
struct AddRunRequest {
    name: String,
    suite_id: u64,
    include_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// One result submission for a case
#[derive(Debug, Serialize)]
pub struct CaseResult {
    pub status_id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(TestStatus::Passed, 1)]
    #[test_case(TestStatus::Blocked, 2)]
    #[test_case(TestStatus::Untested, 3)]
    #[test_case(TestStatus::Retest, 4)]
    #[test_case(TestStatus::Failed, 5)]
    fn maps_status_to_testrail_vocabulary(status: TestStatus, expected: u8) {
        assert_eq!(status_id(status), expected);
    }

    #[test]
    fn basic_auth_encodes_credentials() {
        assert_eq!(basic_auth("user", "key"), "Basic dXNlcjprZXk=");
    }

    #[test]
    fn scoped_run_request_shape() {
        let request = AddRunRequest {
            name: "nightly".to_string(),
            suite_id: 12,
            include_all: false,
            case_ids: Some(vec![5, 3, 7]),
            description: Some("Automated test run".to_string()),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["include_all"], json!(false));
        assert_eq!(value["case_ids"], json!([5, 3, 7]));
        assert_eq!(value["suite_id"], json!(12));
    }

    #[test]
    fn unscoped_run_request_includes_all() {
        let request = AddRunRequest {
            name: "full".to_string(),
            suite_id: 12,
            include_all: true,
            case_ids: None,
            description: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["include_all"], json!(true));
        assert!(value.get("case_ids").is_none());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn case_result_omits_empty_fields() {
        let result = CaseResult {
            status_id: 5,
            comment: None,
            elapsed: None,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "status_id": 5 })
        );
    }

    #[test]
    fn run_view_urls() {
        let client = TestRailClient {
            client: Client::new(),
            base_url: "https://example.testrail.io".to_string(),
            auth_header: String::new(),
            project_id: 1,
            suite_id: 1,
        };
        assert_eq!(
            client.run_url(417),
            "https://example.testrail.io/index.php?/runs/view/417"
        );
    }
}
