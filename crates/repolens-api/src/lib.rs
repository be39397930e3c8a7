// API client implementations: GitHub REST plus the thin search proxy
pub mod backend;
pub mod github;

// Re-export common types
pub use backend::{BackendClient, BackendError, SearchResponse, TokenResponse};
pub use github::{
    GitHubClient, GitHubError, GitHubEvent, GitHubOwner, GitHubRepo, GitHubUser, PushCommit,
};
