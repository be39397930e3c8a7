use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repositories and events are capped at one page of 100 by the endpoints we use.
const PER_PAGE: u32 = 100;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Client for the parts of the GitHub REST API the analytics view reads directly.
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise instances
    pub fn with_base_url(token: Option<String>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("repolens/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url,
        }
    }

    /// Profile of the user the token belongs to
    pub async fn get_authenticated_user(&self) -> Result<GitHubUser> {
        let url = format!("{}/user", self.base_url);
        let response = self.authed(self.client.get(&url)).send().await?;
        let response = Self::check_status(response, "user").await?;
        Ok(response.json().await?)
    }

    /// Up to 100 repositories owned by the authenticated user
    pub async fn list_user_repos(&self) -> Result<Vec<GitHubRepo>> {
        let url = format!("{}/user/repos", self.base_url);
        let response = self
            .authed(self.client.get(&url))
            .query(&[("per_page", PER_PAGE.to_string())])
            .send()
            .await?;
        let response = Self::check_status(response, "user repos").await?;
        Ok(response.json().await?)
    }

    /// Up to 100 of a user's most recent public events
    pub async fn list_public_events(&self, login: &str) -> Result<Vec<GitHubEvent>> {
        let url = format!("{}/users/{}/events/public", self.base_url, login);
        let response = self
            .authed(self.client.get(&url))
            .query(&[("per_page", PER_PAGE.to_string())])
            .send()
            .await?;
        let response = Self::check_status(response, login).await?;
        Ok(response.json().await?)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();

        if status == 401 {
            return Err(GitHubError::AuthRequired);
        }

        // GitHub reports an exhausted rate limit as 403
        if status == 403 || status == 429 {
            return Err(GitHubError::RateLimitExceeded);
        }

        if status == 404 {
            return Err(GitHubError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

/// Repository as the GitHub API returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub private: bool,
    pub owner: GitHubOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
}

/// Public timeline event. Only the fields the analytics aggregation reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_deserialization_with_missing_optionals() {
        let json = r#"{
            "id": 42,
            "name": "repolens",
            "full_name": "arnavdsh/repolens",
            "html_url": "https://github.com/arnavdsh/repolens",
            "description": null,
            "language": null,
            "updated_at": "2025-06-01T12:00:00Z",
            "owner": { "login": "arnavdsh", "avatar_url": "https://example.com/a.png" }
        }"#;

        let repo: GitHubRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.id, 42);
        assert_eq!(repo.stargazers_count, 0);
        assert_eq!(repo.forks_count, 0);
        assert!(!repo.private);
        assert!(repo.language.is_none());
    }

    #[test]
    fn test_push_event_carries_commits() {
        let json = r#"{
            "type": "PushEvent",
            "created_at": "2025-06-01T12:00:00Z",
            "payload": { "commits": [{ "sha": "abc" }, { "sha": "def" }] }
        }"#;

        let event: GitHubEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "PushEvent");
        assert_eq!(event.payload.commits.len(), 2);
    }

    #[test]
    fn test_non_push_event_has_empty_payload() {
        let json = r#"{
            "type": "WatchEvent",
            "created_at": "2025-06-01T12:00:00Z",
            "payload": { "action": "started" }
        }"#;

        let event: GitHubEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "WatchEvent");
        assert!(event.payload.commits.is_empty());
    }
}
