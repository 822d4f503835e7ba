//! Authorization waiter backed by the Arcade auth status endpoint

use std::time::Duration;

use async_trait::async_trait;
use kairos_agent::{AuthorizationWaiter, Error, Result};
use serde::Deserialize;

/// Seconds the server may hold each status request open
const LONG_POLL_SECS: u64 = 59;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, PartialEq)]
enum AuthStatus {
    Completed,
    Pending,
    Failed(String),
}

impl AuthStatus {
    fn parse(status: &str) -> Self {
        match status {
            "completed" => AuthStatus::Completed,
            "pending" => AuthStatus::Pending,
            other => AuthStatus::Failed(other.to_string()),
        }
    }
}

/// Long-polls the authorization service until an authorization settles
pub struct ArcadeAuthWaiter {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl ArcadeAuthWaiter {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            poll_interval: Duration::from_millis(500),
            timeout: None,
        }
    }

    /// Give up after `timeout` in total
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn status_url(&self) -> String {
        format!("{}/v1/auth/status", self.base_url)
    }

    async fn poll(&self, api_key: &str, authorization_id: &str) -> Result<AuthStatus> {
        let response = self
            .client
            .get(self.status_url())
            .bearer_auth(api_key)
            .query(&[
                ("id", authorization_id.to_string()),
                ("wait", LONG_POLL_SECS.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: StatusResponse = response.json().await?;
        Ok(AuthStatus::parse(&body.status))
    }

    async fn wait(&self, api_key: &str, authorization_id: &str) -> Result<()> {
        loop {
            match self.poll(api_key, authorization_id).await? {
                AuthStatus::Completed => return Ok(()),
                AuthStatus::Pending => {
                    tracing::debug!("Authorization {} still pending", authorization_id);
                    tokio::time::sleep(self.poll_interval).await;
                }
                AuthStatus::Failed(status) => {
                    return Err(Error::Authorization(format!(
                        "authorization {} ended with status '{}'",
                        authorization_id, status
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl AuthorizationWaiter for ArcadeAuthWaiter {
    async fn wait_for_completion(&self, authorization_id: &str) -> Result<()> {
        let Some(ref api_key) = self.api_key else {
            return Err(Error::Authorization(
                "ARCADE_API_KEY is not set; cannot check authorization status".to_string(),
            ));
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.wait(api_key, authorization_id))
                .await
                .map_err(|_| {
                    Error::Authorization(format!(
                        "timed out after {}s waiting for authorization {}",
                        limit.as_secs(),
                        authorization_id
                    ))
                })?,
            None => self.wait(api_key, authorization_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(AuthStatus::parse("completed"), AuthStatus::Completed);
        assert_eq!(AuthStatus::parse("pending"), AuthStatus::Pending);
        assert_eq!(
            AuthStatus::parse("failed"),
            AuthStatus::Failed("failed".to_string())
        );
        assert_eq!(
            AuthStatus::parse("expired"),
            AuthStatus::Failed("expired".to_string())
        );
    }

    #[test]
    fn test_status_url_trims_trailing_slash() {
        let waiter = ArcadeAuthWaiter::new("https://api.arcade.dev/", None);
        assert_eq!(waiter.status_url(), "https://api.arcade.dev/v1/auth/status");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let waiter = ArcadeAuthWaiter::new("http://127.0.0.1:9", None);
        let err = waiter.wait_for_completion("auth-1").await.unwrap_err();
        assert!(matches!(err, Error::Authorization(ref m) if m.contains("ARCADE_API_KEY")));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let waiter = ArcadeAuthWaiter::new("http://127.0.0.1:9", Some("key".into()))
            .with_timeout(Some(Duration::from_secs(5)));
        assert!(waiter.wait_for_completion("auth-1").await.is_err());
    }

    #[test]
    fn test_status_response_ignores_extra_fields() {
        let body: StatusResponse = serde_json::from_str(
            r#"{"id":"auth-1","status":"completed","scopes":["calendar"],"context":{"token":"t"}}"#,
        )
        .unwrap();
        assert_eq!(AuthStatus::parse(&body.status), AuthStatus::Completed);
    }
}
