//! LEAD LMS API client
//!
//! Authenticates against the LMS admin API with a Bearer token and removes
//! users and groups created by automated tests.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use qarelay_common::config::LmsConfig;

use crate::error::{IntegrationError, IntegrationResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User record returned by the lookup endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    user: User,
}

pub struct LmsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl LmsClient {
    /// Authenticate with admin credentials and obtain a Bearer token
    pub async fn connect(config: &LmsConfig) -> IntegrationResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        info!("Authenticating with LEAD LMS API");
        let resp = client
            .post(format!("{}/api/login", base_url))
            .header("Accept", "application/json")
            .form(&[
                ("email", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::LmsAuth(format!(
                "status {}: {}",
                status, body
            )));
        }

        let login: LoginResponse = resp.json().await?;
        info!("LEAD LMS API authentication successful");

        Ok(Self {
            client,
            base_url,
            token: login.access_token,
        })
    }

    /// Look up a user by email, `None` when absent
    pub async fn lookup_user(&self, email: &str) -> IntegrationResult<Option<User>> {
        debug!("Looking up user by email: {}", email);
        let resp = self
            .client
            .get(self.api_url("users/email/lookup"))
            .query(&[("email", email)])
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("User not found: {}", email);
            return Ok(None);
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::LmsApi {
                status: status.as_u16(),
                body,
            });
        }

        let lookup: LookupResponse = resp.json().await?;
        debug!(
            "Found user: id={}, email={}",
            lookup.user.id, lookup.user.email
        );
        Ok(Some(lookup.user))
    }

    /// Soft-delete a user by ID
    pub async fn delete_user(&self, user_id: u64) -> IntegrationResult<()> {
        info!("Deleting user id={}", user_id);
        self.delete(&format!("users/{}", user_id)).await?;
        info!("User id={} deleted successfully", user_id);
        Ok(())
    }

    /// Look up a user by email and delete them; false when not found
    pub async fn delete_user_by_email(&self, email: &str) -> IntegrationResult<bool> {
        match self.lookup_user(email).await? {
            Some(user) => {
                self.delete_user(user.id).await?;
                Ok(true)
            }
            None => {
                warn!("Cannot delete user, not found: {}", email);
                Ok(false)
            }
        }
    }

    /// Soft-delete a group by ID
    pub async fn delete_group(&self, group_id: u64) -> IntegrationResult<()> {
        info!("Deleting group id={}", group_id);
        self.delete(&format!("groups/{}", group_id)).await?;
        info!("Group id={} deleted successfully", group_id);
        Ok(())
    }

    async fn delete(&self, path: &str) -> IntegrationResult<()> {
        let resp = self
            .client
            .delete(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IntegrationError::LmsApi {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_parses() {
        let login: LoginResponse =
            serde_json::from_str(r#"{"access_token": "tok-123", "token_type": "Bearer"}"#).unwrap();
        assert_eq!(login.access_token, "tok-123");
    }

    #[test]
    fn lookup_response_unwraps_user() {
        let lookup: LookupResponse = serde_json::from_str(
            r#"{"user": {"id": 9, "email": "qa+1@example.org", "name": "QA Test"}}"#,
        )
        .unwrap();
        assert_eq!(lookup.user.id, 9);
        assert_eq!(lookup.user.name.as_deref(), Some("QA Test"));
    }
}
