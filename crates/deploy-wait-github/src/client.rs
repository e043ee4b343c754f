//! GitHub REST client for deployments.
//!
//! Implements [`DeploymentDirectory`] over
//! `GET /repos/{owner}/{repo}/deployments` and
//! `GET /repos/{owner}/{repo}/deployments/{id}/statuses`.

use async_trait::async_trait;
use deploy_wait_core::{
    Deployment, DeploymentDirectory, DeploymentQuery, DeploymentStatus, DirectoryError,
    DirectoryResult, RepositoryRef,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::GithubError;

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned in every request.
pub const API_VERSION: &str = "2022-11-28";

/// Page size requested from list endpoints. Only the first page is read.
pub const PER_PAGE: u32 = 100;

/// GitHub client configuration
#[derive(Clone)]
pub struct GithubConfig {
    /// API root, e.g. `https://api.github.com` or a GHES `/api/v3` URL
    pub api_url: String,
    /// Token sent as a bearer credential
    pub token: String,
    /// User-Agent header (GitHub rejects requests without one)
    pub user_agent: String,
}

impl GithubConfig {
    pub fn new(token: &str) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.to_string(),
            user_agent: format!("deploy-wait/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Point the client at a different API root.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Deployment directory backed by the GitHub REST API.
pub struct GithubClient {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        if config.token.is_empty() {
            return Err(GithubError::MissingToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(GithubClient { config, http })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    fn repo_url(&self, repository: &RepositoryRef) -> String {
        format!(
            "{}/repos/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            repository.owner,
            repository.name
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> DirectoryResult<T> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_err)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_err)?;

        if !status.is_success() {
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message: api_message(&body, status),
            });
        }

        serde_json::from_slice(&body).map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DeploymentDirectory for GithubClient {
    async fn list_deployments(&self, query: &DeploymentQuery) -> DirectoryResult<Vec<Deployment>> {
        let url = format!("{}/deployments", self.repo_url(&query.repository));
        let mut params = vec![("sha", query.sha.clone()), ("per_page", PER_PAGE.to_string())];
        if let Some(environment) = &query.environment {
            params.push(("environment", environment.clone()));
        }
        self.get_json(&url, &params).await
    }

    async fn list_deployment_statuses(
        &self,
        repository: &RepositoryRef,
        deployment_id: u64,
    ) -> DirectoryResult<Vec<DeploymentStatus>> {
        let url = format!(
            "{}/deployments/{}/statuses",
            self.repo_url(repository),
            deployment_id
        );
        self.get_json(&url, &[("per_page", PER_PAGE.to_string())])
            .await
    }
}

fn transport_err(err: reqwest::Error) -> DirectoryError {
    DirectoryError::Transport(err.to_string())
}

/// GitHub error bodies carry a `message`; fall back to the status reason.
fn api_message(body: &[u8], status: reqwest::StatusCode) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_public_api() {
        let config = GithubConfig::new("t0ken");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.user_agent.starts_with("deploy-wait/"));
    }

    #[test]
    fn test_config_debug_hides_token() {
        let config = GithubConfig::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_repo_url_trims_trailing_slash() {
        let client =
            GithubClient::new(GithubConfig::new("t").with_api_url("https://ghe.test/api/v3/"))
                .unwrap();
        let url = client.repo_url(&RepositoryRef::new("acme", "site"));
        assert_eq!(url, "https://ghe.test/api/v3/repos/acme/site");
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let err = GithubClient::new(GithubConfig::new("")).err().unwrap();
        assert!(matches!(err, GithubError::MissingToken));
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let err = GithubClient::new(GithubConfig::new("abc\ndef")).err().unwrap();
        assert!(matches!(err, GithubError::InvalidToken));
    }

    #[test]
    fn test_api_message_prefers_body() {
        let status = reqwest::StatusCode::NOT_FOUND;
        assert_eq!(api_message(br#"{"message":"Not Found"}"#, status), "Not Found");
        assert_eq!(api_message(b"<html>", status), "Not Found");
        assert_eq!(
            api_message(b"", reqwest::StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }
}
