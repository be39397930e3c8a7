use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::github::{GitHubRepo, GitHubUser};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid search query")]
    InvalidQuery,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Client for the thin backend that fronts GitHub search and handles auth.
///
/// The backend is a pass-through: search requests are forwarded to GitHub's
/// repository search with our filters folded into the query string, and the
/// auth routes mint sessions for local accounts or bounce through GitHub OAuth.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("repolens/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Where the browser-based GitHub OAuth flow starts
    pub fn github_login_url(&self) -> String {
        format!("{}/auth/github", self.base_url)
    }

    /// Search repositories through the proxy.
    ///
    /// Optional filters are only sent when set so the backend applies its own
    /// defaults for absent parameters.
    #[allow(clippy::too_many_arguments)]
    pub async fn search(
        &self,
        token: Option<&str>,
        query: &str,
        page: u32,
        per_page: u32,
        language: Option<&str>,
        min_stars: Option<u32>,
        sort: &str,
        order: &str,
    ) -> Result<SearchResponse> {
        let url = format!("{}/api/search", self.base_url);

        let mut params = vec![
            ("q".to_string(), query.to_string()),
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
            ("sort".to_string(), sort.to_string()),
            ("order".to_string(), order.to_string()),
        ];
        if let Some(language) = language {
            params.push(("language".to_string(), language.to_string()));
        }
        if let Some(min_stars) = min_stars {
            params.push(("min_stars".to_string(), min_stars.to_string()));
        }

        debug!("searching: q={} page={}", query, page);

        let mut request = self.client.get(&url).query(&params);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Sign in with a local account
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let url = format!("{}/auth/login", self.base_url);
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Create a local account. Sign in separately afterwards.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/auth/register", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status == 401 {
            return Err(BackendError::AuthRequired);
        }

        if status == 403 || status == 429 {
            return Err(BackendError::RateLimitExceeded);
        }

        if status == 422 {
            return Err(BackendError::InvalidQuery);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

/// Response shape of `GET /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<GitHubRepo>,
}

/// Response shape of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: GitHubUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(
            client.github_login_url(),
            "http://localhost:8000/auth/github"
        );
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "total_count": 1000,
            "incomplete_results": false,
            "items": [{
                "id": 1,
                "name": "react",
                "full_name": "facebook/react",
                "html_url": "https://github.com/facebook/react",
                "description": "A JavaScript library",
                "language": "JavaScript",
                "stargazers_count": 200000,
                "forks_count": 40000,
                "updated_at": "2025-06-01T12:00:00Z",
                "private": false,
                "owner": { "login": "facebook", "avatar_url": "https://example.com/fb.png" }
            }]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_count, 1000);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].full_name, "facebook/react");
    }

    #[test]
    fn test_token_response_accepts_local_account_user() {
        // Local accounts have no avatar; the backend sends the same shape as
        // the GitHub user with optional fields absent.
        let json = r#"{
            "access_token": "tok_123",
            "token_type": "bearer",
            "user": { "id": 7, "login": "arnav", "name": "Arnav" }
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "tok_123");
        assert_eq!(response.user.login, "arnav");
        assert!(response.user.avatar_url.is_empty());
    }
}
