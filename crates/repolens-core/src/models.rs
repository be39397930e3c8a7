use chrono::{DateTime, Utc};
use repolens_api::{GitHubRepo, GitHubUser};
use serde::{Deserialize, Serialize};

/// Fixed page size of the search surface
pub const PAGE_SIZE: u32 = 30;

/// The search provider only serves the first 1000 results, i.e. 34 pages of 30.
/// Reproduced as observed; verify against the provider before changing.
pub const RESULT_WINDOW_PAGES: u32 = 34;

/// Repository model - the star of the show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: u64,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub updated_at: DateTime<Utc>,
    pub is_private: bool,
    pub owner: RepoOwner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub avatar_url: String,
}

impl RepositorySummary {
    /// Short name without the owner prefix
    pub fn name(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.full_name)
    }
}

/// Convert the GitHub wire type to our model exactly once, at the API boundary
impl From<GitHubRepo> for RepositorySummary {
    fn from(gh: GitHubRepo) -> Self {
        Self {
            id: gh.id,
            full_name: gh.full_name,
            html_url: gh.html_url,
            description: gh.description,
            language: gh.language,
            stars: gh.stargazers_count,
            forks: gh.forks_count,
            updated_at: gh.updated_at,
            is_private: gh.private,
            owner: RepoOwner {
                login: gh.owner.login,
                avatar_url: gh.owner.avatar_url,
            },
        }
    }
}

/// Field the search provider sorts on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Stars,
    Forks,
    Updated,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Stars => "stars",
            SortField::Forks => "forks",
            SortField::Updated => "updated",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stars" => Ok(SortField::Stars),
            "forks" => Ok(SortField::Forks),
            "updated" => Ok(SortField::Updated),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter selections applied to a search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub language: Option<String>,
    pub min_stars: Option<u32>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl SearchFilters {
    /// Quick-sort control: one action sets both the sort field and direction.
    /// Callers re-issue the current query at page 1 afterwards.
    pub fn quick_sort(&mut self, sort: SortField, order: SortOrder) {
        self.sort = sort;
        self.order = order;
    }
}

/// One page of search results plus the provider's total match count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub items: Vec<RepositorySummary>,
    pub total_count: u64,
}

impl SearchResults {
    /// Pages reachable through the provider's result window
    pub fn total_pages(&self) -> u32 {
        let pages = (self.total_count + PAGE_SIZE as u64 - 1) / PAGE_SIZE as u64;
        (pages as u32).min(RESULT_WINDOW_PAGES)
    }
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub github_connected: bool,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

impl From<GitHubUser> for UserProfile {
    fn from(gh: GitHubUser) -> Self {
        Self {
            id: gh.id,
            login: gh.login,
            name: gh.name,
            avatar_url: gh.avatar_url,
            github_connected: false,
        }
    }
}

/// One locally recorded invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteRecord {
    pub email: String,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(total_count: u64) -> SearchResults {
        SearchResults {
            items: Vec::new(),
            total_count,
        }
    }

    #[test]
    fn test_total_pages_caps_at_result_window() {
        // 1000 matches is 34 pages exactly; anything above is clamped
        assert_eq!(results(1000).total_pages(), 34);
        assert_eq!(results(250_000).total_pages(), 34);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(results(0).total_pages(), 0);
        assert_eq!(results(30).total_pages(), 1);
        assert_eq!(results(31).total_pages(), 2);
        assert_eq!(results(90).total_pages(), 3);
    }

    #[test]
    fn test_default_filters() {
        let filters = SearchFilters::default();
        assert_eq!(filters.sort, SortField::Stars);
        assert_eq!(filters.order, SortOrder::Desc);
        assert!(filters.language.is_none());
        assert!(filters.min_stars.is_none());
    }

    #[test]
    fn test_quick_sort_sets_both_fields() {
        let mut filters = SearchFilters::default();
        filters.quick_sort(SortField::Forks, SortOrder::Desc);
        assert_eq!(filters.sort, SortField::Forks);
        assert_eq!(filters.order, SortOrder::Desc);
    }

    #[test]
    fn test_short_name() {
        let repo = RepositorySummary {
            id: 1,
            full_name: "facebook/react".to_string(),
            html_url: String::new(),
            description: None,
            language: None,
            stars: 0,
            forks: 0,
            updated_at: Utc::now(),
            is_private: false,
            owner: RepoOwner {
                login: "facebook".to_string(),
                avatar_url: String::new(),
            },
        };
        assert_eq!(repo.name(), "react");
    }
}
