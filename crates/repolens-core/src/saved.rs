use std::path::PathBuf;
use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;

use crate::{models::RepositorySummary, Error, Result};

/// Sort modes for the saved list, mirroring the filter bar options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavedSortKey {
    /// Most recently updated first
    #[default]
    Recent,
    StarsDesc,
    StarsAsc,
    ForksDesc,
    ForksAsc,
    NameAsc,
    NameDesc,
}

impl SavedSortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SavedSortKey::Recent => "Recently Updated",
            SavedSortKey::StarsDesc => "Stars (High to Low)",
            SavedSortKey::StarsAsc => "Stars (Low to High)",
            SavedSortKey::ForksDesc => "Forks (High to Low)",
            SavedSortKey::ForksAsc => "Forks (Low to High)",
            SavedSortKey::NameAsc => "Name (A-Z)",
            SavedSortKey::NameDesc => "Name (Z-A)",
        }
    }

    /// Cycle through the modes in display order
    pub fn next(&self) -> Self {
        match self {
            SavedSortKey::Recent => SavedSortKey::StarsDesc,
            SavedSortKey::StarsDesc => SavedSortKey::StarsAsc,
            SavedSortKey::StarsAsc => SavedSortKey::ForksDesc,
            SavedSortKey::ForksDesc => SavedSortKey::ForksAsc,
            SavedSortKey::ForksAsc => SavedSortKey::NameAsc,
            SavedSortKey::NameAsc => SavedSortKey::NameDesc,
            SavedSortKey::NameDesc => SavedSortKey::Recent,
        }
    }
}

impl std::str::FromStr for SavedSortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SavedSortKey::Recent),
            "stars-desc" => Ok(SavedSortKey::StarsDesc),
            "stars-asc" => Ok(SavedSortKey::StarsAsc),
            "forks-desc" => Ok(SavedSortKey::ForksDesc),
            "forks-asc" => Ok(SavedSortKey::ForksAsc),
            "name-asc" => Ok(SavedSortKey::NameAsc),
            "name-desc" => Ok(SavedSortKey::NameDesc),
            other => Err(format!("unknown sort mode: {}", other)),
        }
    }
}

/// The local bookmark set, unique by repository id.
///
/// The in-memory list is the source of truth and is mirrored to a JSON file
/// on every mutation. All writers go through the same mutex-guarded list, so
/// a double-pressed toggle is an atomic read-modify-write rather than two
/// independent read-then-write passes racing each other.
///
/// Two processes writing the same file still race with last-write-wins; the
/// store makes no attempt to merge.
pub struct SavedRepoStore {
    path: PathBuf,
    repos: Mutex<Vec<RepositorySummary>>,
    count_tx: watch::Sender<usize>,
}

impl SavedRepoStore {
    /// Open the store at the given path, loading any existing bookmarks
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let repos: Vec<RepositorySummary> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Vec::new()
        };

        debug!("loaded {} saved repositories", repos.len());
        let (count_tx, _) = watch::channel(repos.len());

        Ok(Self {
            path,
            repos: Mutex::new(repos),
            count_tx,
        })
    }

    /// Default store location in the platform data dir
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::ConfigError("Could not find data directory".into()))?
            .join("repolens");
        Ok(data_dir.join("saved_repos.json"))
    }

    /// Primary entry point from result cards: save if absent, remove if
    /// present. Returns true when the repository was added.
    pub fn toggle(&self, repo: &RepositorySummary) -> Result<bool> {
        let mut repos = self.lock();

        let added = if let Some(pos) = repos.iter().position(|r| r.id == repo.id) {
            repos.remove(pos);
            false
        } else {
            repos.push(repo.clone());
            true
        };

        self.persist(&repos)?;
        self.count_tx.send_replace(repos.len());
        Ok(added)
    }

    /// Add a repository. No-op when the id is already present.
    pub fn add(&self, repo: &RepositorySummary) -> Result<bool> {
        let mut repos = self.lock();

        if repos.iter().any(|r| r.id == repo.id) {
            return Ok(false);
        }

        repos.push(repo.clone());
        self.persist(&repos)?;
        self.count_tx.send_replace(repos.len());
        Ok(true)
    }

    /// Remove by repository id. Returns true when something was removed.
    pub fn remove(&self, id: u64) -> Result<bool> {
        let mut repos = self.lock();

        let Some(pos) = repos.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        repos.remove(pos);
        self.persist(&repos)?;
        self.count_tx.send_replace(repos.len());
        Ok(true)
    }

    /// Destructive and irreversible. Calling surfaces must get explicit user
    /// confirmation before invoking this.
    pub fn clear(&self) -> Result<()> {
        let mut repos = self.lock();
        repos.clear();
        self.persist(&repos)?;
        self.count_tx.send_replace(0);
        Ok(())
    }

    /// Bookmarks filtered by exact language match and sorted
    pub fn list(&self, language: Option<&str>, sort: SavedSortKey) -> Vec<RepositorySummary> {
        let repos = self.lock();

        let mut filtered: Vec<RepositorySummary> = repos
            .iter()
            .filter(|r| match language {
                Some(lang) => r.language.as_deref() == Some(lang),
                None => true,
            })
            .cloned()
            .collect();

        match sort {
            SavedSortKey::Recent => filtered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            SavedSortKey::StarsDesc => filtered.sort_by(|a, b| b.stars.cmp(&a.stars)),
            SavedSortKey::StarsAsc => filtered.sort_by(|a, b| a.stars.cmp(&b.stars)),
            SavedSortKey::ForksDesc => filtered.sort_by(|a, b| b.forks.cmp(&a.forks)),
            SavedSortKey::ForksAsc => filtered.sort_by(|a, b| a.forks.cmp(&b.forks)),
            SavedSortKey::NameAsc => filtered.sort_by(|a, b| a.name().cmp(b.name())),
            SavedSortKey::NameDesc => filtered.sort_by(|a, b| b.name().cmp(a.name())),
        }

        filtered
    }

    /// Distinct languages across the saved set, sorted, for the filter bar
    pub fn languages(&self) -> Vec<String> {
        let repos = self.lock();

        let mut languages: Vec<String> = repos
            .iter()
            .filter_map(|r| r.language.clone())
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().iter().any(|r| r.id == id)
    }

    /// Ids of every saved repository, for cheap membership checks in views
    pub fn ids(&self) -> Vec<u64> {
        self.lock().iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Watch the bookmark count. Every add/remove/toggle/clear publishes the
    /// new count so other views update without re-reading the file.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count_tx.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RepositorySummary>> {
        self.repos.lock().expect("saved store lock poisoned")
    }

    fn persist(&self, repos: &[RepositorySummary]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(repos)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepoOwner;
    use chrono::{TimeZone, Utc};

    fn test_repo(id: u64, stars: u32) -> RepositorySummary {
        RepositorySummary {
            id,
            full_name: format!("owner/repo-{}", id),
            html_url: format!("https://github.com/owner/repo-{}", id),
            description: Some("A test repository".to_string()),
            language: Some("Rust".to_string()),
            stars,
            forks: stars / 2,
            updated_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            is_private: false,
            owner: RepoOwner {
                login: "owner".to_string(),
                avatar_url: String::new(),
            },
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> SavedRepoStore {
        SavedRepoStore::open(dir.path().join("saved_repos.json")).unwrap()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let repo = test_repo(1, 10);

        assert!(store.toggle(&repo).unwrap());
        assert!(store.contains(1));
        assert_eq!(store.len(), 1);

        assert!(!store.toggle(&repo).unwrap());
        assert!(!store.contains(1));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_no_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let repo = test_repo(1, 10);

        assert!(store.add(&repo).unwrap());
        assert!(!store.add(&repo).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sort_by_stars_desc() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&test_repo(1, 5)).unwrap();
        store.add(&test_repo(2, 100)).unwrap();
        store.add(&test_repo(3, 1)).unwrap();

        let listed = store.list(None, SavedSortKey::StarsDesc);
        let stars: Vec<u32> = listed.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![100, 5, 1]);
    }

    #[test]
    fn test_sort_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let mut a = test_repo(1, 0);
        a.full_name = "owner/zebra".to_string();
        let mut b = test_repo(2, 0);
        b.full_name = "owner/alpha".to_string();
        store.add(&a).unwrap();
        store.add(&b).unwrap();

        let names: Vec<String> = store
            .list(None, SavedSortKey::NameAsc)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zebra"]);

        let names: Vec<String> = store
            .list(None, SavedSortKey::NameDesc)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["zebra", "alpha"]);
    }

    #[test]
    fn test_language_filter_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let mut python = test_repo(1, 1);
        python.language = Some("Python".to_string());
        let mut none = test_repo(3, 3);
        none.language = None;
        store.add(&python).unwrap();
        store.add(&test_repo(2, 2)).unwrap();
        store.add(&none).unwrap();

        let rust_only = store.list(Some("Rust"), SavedSortKey::Recent);
        assert_eq!(rust_only.len(), 1);
        assert_eq!(rust_only[0].id, 2);

        assert_eq!(store.list(None, SavedSortKey::Recent).len(), 3);
        assert_eq!(store.languages(), vec!["Python", "Rust"]);
    }

    #[test]
    fn test_clear_empties_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&test_repo(1, 1)).unwrap();
        store.add(&test_repo(2, 2)).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_bookmarks_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_repos.json");

        {
            let store = SavedRepoStore::open(&path).unwrap();
            store.add(&test_repo(1, 10)).unwrap();
        }

        let reopened = SavedRepoStore::open(&path).unwrap();
        assert!(reopened.contains(1));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_mutations_notify_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), 0);

        store.add(&test_repo(1, 1)).unwrap();
        assert_eq!(*rx.borrow(), 1);

        store.clear().unwrap();
        assert_eq!(*rx.borrow(), 0);
    }
}
