// Core business logic: everything the surfaces (TUI, CLI) build on
pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod saved;
pub mod search;
pub mod session;
pub mod share;

pub use analytics::{AnalyticsClient, AnalyticsSnapshot, LanguageCount};
pub use config::{Config, Theme};
pub use error::Error;
pub use models::{
    InviteRecord, RepositorySummary, SearchFilters, SearchResults, SortField, SortOrder,
    UserProfile,
};
pub use saved::{SavedRepoStore, SavedSortKey};
pub use search::{ProxySearchBackend, SearchBackend, SearchClient, Sequencer};
pub use session::{AuthGateway, Session, SessionStore};
pub use share::InviteLog;

/// Shorthand used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;
