use thiserror::Error;

/// All the ways things can go wrong in RepoLens
///
/// thiserror writes the Display and Error impls so we don't have to.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
