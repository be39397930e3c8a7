use std::sync::atomic::{AtomicU64, Ordering};

use repolens_api::BackendClient;
use tracing::warn;

use crate::{
    models::{SearchFilters, SearchResults, PAGE_SIZE},
    Error, Result,
};

/// Message shown for any failed search, regardless of the underlying cause
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to fetch repositories";

/// Trait for search backends - makes testing easier and keeps things flexible
///
/// The production impl goes through the API proxy; tests mock this out.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<SearchResults>;
}

/// Production backend: the thin proxy in front of GitHub repository search
pub struct ProxySearchBackend {
    client: BackendClient,
    token: Option<String>,
}

impl ProxySearchBackend {
    pub fn new(client: BackendClient, token: Option<String>) -> Self {
        Self { client, token }
    }
}

#[async_trait::async_trait]
impl SearchBackend for ProxySearchBackend {
    async fn search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<SearchResults> {
        let response = self
            .client
            .search(
                self.token.as_deref(),
                query,
                page,
                PAGE_SIZE,
                filters.language.as_deref(),
                filters.min_stars,
                filters.sort.as_str(),
                filters.order.as_str(),
            )
            .await
            .map_err(|e| {
                warn!("search request failed: {}", e);
                Error::ApiError(SEARCH_FAILED_MESSAGE.to_string())
            })?;

        Ok(SearchResults {
            total_count: response.total_count,
            items: response.items.into_iter().map(Into::into).collect(),
        })
    }
}

/// Entry point for issuing searches.
///
/// Input rules live here so every surface (TUI, CLI) gets the same behavior:
/// queries that are empty after trimming are rejected before any request is
/// sent, and page numbers are clamped to 1 or above.
pub struct SearchClient {
    backend: Box<dyn SearchBackend>,
}

impl SearchClient {
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub async fn search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let page = page.max(1);
        self.backend.search(query, page, filters).await
    }
}

/// Issues monotonically increasing tokens for in-flight searches.
///
/// Requests cannot be cancelled once issued, so a superseded search may still
/// complete after a newer one was dispatched. Completions carry their token
/// and only the most recently issued request is allowed to land; everything
/// else is discarded as stale.
#[derive(Debug, Default)]
pub struct Sequencer {
    counter: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next token. The returned value supersedes all earlier ones.
    pub fn issue(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a completion with this token is still the latest request
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.counter.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_empty_query_is_rejected_without_a_request() {
        let mut backend = MockSearchBackend::new();
        backend.expect_search().times(0);

        let client = SearchClient::new(Box::new(backend));
        let result = client.search("   ", 1, &SearchFilters::default()).await;

        assert!(matches!(result, Err(Error::EmptyQuery)));
    }

    #[tokio::test]
    async fn test_query_is_trimmed_and_page_clamped() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_search()
            .with(eq("react"), eq(1u32), eq(SearchFilters::default()))
            .times(1)
            .returning(|_, _, _| {
                Ok(SearchResults {
                    items: Vec::new(),
                    total_count: 0,
                })
            });

        let client = SearchClient::new(Box::new(backend));
        let result = client.search("  react  ", 0, &SearchFilters::default()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_backend_errors_pass_through() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_search()
            .times(1)
            .returning(|_, _, _| Err(Error::ApiError(SEARCH_FAILED_MESSAGE.to_string())));

        let client = SearchClient::new(Box::new(backend));
        let err = client
            .search("react", 1, &SearchFilters::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), SEARCH_FAILED_MESSAGE);
    }

    #[test]
    fn test_sequencer_tokens_increase() {
        let sequencer = Sequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(second > first);
    }

    #[test]
    fn test_stale_completion_is_not_current() {
        let sequencer = Sequencer::new();
        let stale = sequencer.issue();
        let latest = sequencer.issue();

        // The response for the older request resolves last; it must not land.
        assert!(!sequencer.is_current(stale));
        assert!(sequencer.is_current(latest));
    }
}
