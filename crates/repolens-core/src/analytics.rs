use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use repolens_api::{GitHubClient, GitHubEvent};
use tracing::debug;

use crate::{models::RepositorySummary, Error, Result};

/// Events window for the activity count
const ACTIVITY_WINDOW_DAYS: i64 = 30;

/// Top-N cutoff for languages and repositories
const TOP_N: usize = 5;

const PUSH_EVENT: &str = "PushEvent";

/// A user's derived statistics. Recomputed in full on every view entry and
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSnapshot {
    pub total_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub top_languages: Vec<LanguageCount>,
    pub top_repos: Vec<RepositorySummary>,
    pub public_repo_count: usize,
    pub private_repo_count: usize,
    /// Commits across push events only; other event types don't count
    pub total_commits: usize,
    /// Distinct local calendar days with at least one event in the last 30 days
    pub active_day_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageCount {
    pub language: String,
    pub count: usize,
}

impl LanguageCount {
    /// Share of all repositories written in this language
    pub fn percentage(&self, total_repos: usize) -> f64 {
        if total_repos == 0 {
            return 0.0;
        }
        self.count as f64 / total_repos as f64 * 100.0
    }
}

/// Timeline event reduced to what the aggregation reads
#[derive(Debug, Clone, PartialEq)]
pub struct UserEvent {
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub commit_count: usize,
}

impl From<GitHubEvent> for UserEvent {
    fn from(event: GitHubEvent) -> Self {
        Self {
            kind: event.event_type,
            commit_count: event.payload.commits.len(),
            created_at: event.created_at,
        }
    }
}

/// Reduce a user's repositories and recent events into a snapshot.
///
/// Pure so the whole thing is testable with a pinned `now`.
pub fn aggregate(
    repos: &[RepositorySummary],
    events: &[UserEvent],
    now: DateTime<Utc>,
) -> AnalyticsSnapshot {
    let total_stars = repos.iter().map(|r| r.stars as u64).sum();
    let total_forks = repos.iter().map(|r| r.forks as u64).sum();

    // Histogram in first-seen order; the sort below is stable, so languages
    // with equal counts keep the order the API returned them in.
    let mut top_languages: Vec<LanguageCount> = Vec::new();
    for repo in repos {
        let Some(language) = &repo.language else {
            continue;
        };
        match top_languages.iter_mut().find(|l| &l.language == language) {
            Some(entry) => entry.count += 1,
            None => top_languages.push(LanguageCount {
                language: language.clone(),
                count: 1,
            }),
        }
    }
    top_languages.sort_by(|a, b| b.count.cmp(&a.count));
    top_languages.truncate(TOP_N);

    let mut top_repos = repos.to_vec();
    top_repos.sort_by(|a, b| b.stars.cmp(&a.stars));
    top_repos.truncate(TOP_N);

    let public_repo_count = repos.iter().filter(|r| !r.is_private).count();
    let private_repo_count = repos.len() - public_repo_count;

    let total_commits = events
        .iter()
        .filter(|e| e.kind == PUSH_EVENT)
        .map(|e| e.commit_count)
        .sum();

    // Set cardinality, not an event count: ten events on one day is one
    // active day.
    let window_start = now - Duration::days(ACTIVITY_WINDOW_DAYS);
    let active_days: HashSet<NaiveDate> = events
        .iter()
        .filter(|e| e.created_at >= window_start)
        .map(|e| local_day(e.created_at))
        .collect();

    AnalyticsSnapshot {
        total_repos: repos.len(),
        total_stars,
        total_forks,
        top_languages,
        top_repos,
        public_repo_count,
        private_repo_count,
        total_commits,
        active_day_count: active_days.len(),
    }
}

/// Calendar day of an event in the viewer's timezone
fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Fetches a user's repositories and public events and reduces them.
///
/// Both fetches fail loudly: a failed snapshot surfaces as an error state in
/// the view rather than a spinner that never resolves.
pub struct AnalyticsClient {
    github: GitHubClient,
}

impl AnalyticsClient {
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    pub async fn compute_snapshot(&self, login: &str) -> Result<AnalyticsSnapshot> {
        let (repos, events) = futures::try_join!(
            async {
                self.github
                    .list_user_repos()
                    .await
                    .map_err(|e| Error::ApiError(e.to_string()))
            },
            async {
                self.github
                    .list_public_events(login)
                    .await
                    .map_err(|e| Error::ApiError(e.to_string()))
            },
        )?;

        debug!(
            "aggregating {} repos and {} events for {}",
            repos.len(),
            events.len(),
            login
        );

        let repos: Vec<RepositorySummary> = repos.into_iter().map(Into::into).collect();
        let events: Vec<UserEvent> = events.into_iter().map(Into::into).collect();
        Ok(aggregate(&repos, &events, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepoOwner;
    use chrono::TimeZone;

    fn test_repo(id: u64, language: Option<&str>, stars: u32, private: bool) -> RepositorySummary {
        RepositorySummary {
            id,
            full_name: format!("me/repo-{}", id),
            html_url: format!("https://github.com/me/repo-{}", id),
            description: None,
            language: language.map(str::to_string),
            stars,
            forks: stars / 10,
            updated_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            is_private: private,
            owner: RepoOwner {
                login: "me".to_string(),
                avatar_url: String::new(),
            },
        }
    }

    fn event(kind: &str, days_ago: i64, commits: usize, now: DateTime<Utc>) -> UserEvent {
        UserEvent {
            kind: kind.to_string(),
            created_at: now - Duration::days(days_ago),
            commit_count: commits,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_language_histogram_and_percentage() {
        let repos = vec![
            test_repo(1, Some("JavaScript"), 0, false),
            test_repo(2, Some("JavaScript"), 0, false),
            test_repo(3, Some("Python"), 0, false),
        ];

        let snapshot = aggregate(&repos, &[], now());

        assert_eq!(snapshot.top_languages.len(), 2);
        assert_eq!(snapshot.top_languages[0].language, "JavaScript");
        assert_eq!(snapshot.top_languages[0].count, 2);
        assert_eq!(snapshot.top_languages[1].language, "Python");
        assert_eq!(snapshot.top_languages[1].count, 1);

        let js_pct = snapshot.top_languages[0].percentage(snapshot.total_repos);
        assert_eq!(format!("{:.1}", js_pct), "66.7");
    }

    #[test]
    fn test_language_ties_keep_fetch_order() {
        let repos = vec![
            test_repo(1, Some("Rust"), 0, false),
            test_repo(2, Some("Go"), 0, false),
            test_repo(3, Some("Zig"), 0, false),
        ];

        let snapshot = aggregate(&repos, &[], now());

        let order: Vec<&str> = snapshot
            .top_languages
            .iter()
            .map(|l| l.language.as_str())
            .collect();
        assert_eq!(order, vec!["Rust", "Go", "Zig"]);
    }

    #[test]
    fn test_repos_without_language_are_skipped() {
        let repos = vec![
            test_repo(1, None, 0, false),
            test_repo(2, Some("Rust"), 0, false),
        ];

        let snapshot = aggregate(&repos, &[], now());
        assert_eq!(snapshot.top_languages.len(), 1);
        assert_eq!(snapshot.total_repos, 2);
    }

    #[test]
    fn test_top_repos_by_stars_limited_to_five() {
        let repos: Vec<RepositorySummary> = (1..=7)
            .map(|id| test_repo(id, Some("Rust"), id as u32 * 10, false))
            .collect();

        let snapshot = aggregate(&repos, &[], now());

        assert_eq!(snapshot.top_repos.len(), 5);
        let stars: Vec<u32> = snapshot.top_repos.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![70, 60, 50, 40, 30]);
    }

    #[test]
    fn test_totals_and_visibility_partition() {
        let repos = vec![
            test_repo(1, Some("Rust"), 100, false),
            test_repo(2, Some("Rust"), 50, true),
        ];

        let snapshot = aggregate(&repos, &[], now());

        assert_eq!(snapshot.total_stars, 150);
        assert_eq!(snapshot.total_forks, 15);
        assert_eq!(snapshot.public_repo_count, 1);
        assert_eq!(snapshot.private_repo_count, 1);
    }

    #[test]
    fn test_commits_counted_from_push_events_only() {
        let now = now();
        let events = vec![
            event("PushEvent", 1, 3, now),
            event("PushEvent", 2, 2, now),
            // Watch events have no commits and must not contribute either way
            event("WatchEvent", 1, 0, now),
            event("CreateEvent", 3, 0, now),
        ];

        let snapshot = aggregate(&[], &events, now);
        assert_eq!(snapshot.total_commits, 5);
    }

    #[test]
    fn test_active_days_is_a_set_not_a_count() {
        let now = now();
        let events = vec![
            // Three events on the same day count once
            event("PushEvent", 2, 1, now),
            event("WatchEvent", 2, 0, now),
            event("IssuesEvent", 2, 0, now),
            // A second distinct day
            event("PushEvent", 6, 1, now),
            // Outside the 30-day window entirely
            event("PushEvent", 40, 1, now),
        ];

        let snapshot = aggregate(&[], &events, now);
        assert_eq!(snapshot.active_day_count, 2);
    }

    #[test]
    fn test_empty_inputs_yield_zeroed_snapshot() {
        let snapshot = aggregate(&[], &[], now());
        assert_eq!(snapshot, AnalyticsSnapshot::default());
    }
}
