use std::path::PathBuf;

use repolens_api::BackendClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{models::UserProfile, Error, Result};

/// A signed-in user: the access token and the profile it belongs to.
///
/// The two halves only ever exist together. A stored file missing either one
/// is treated as logged out and dropped, never surfaced partially.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: UserProfile,
}

/// On-disk form of a session.
///
/// The token is obfuscated with a machine-specific XOR key so it isn't
/// greppable plaintext. For stronger guarantees use the platform keychain.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: Vec<u8>,
    user: UserProfile,
}

/// Persists the session in the platform data dir
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::ConfigError("Could not find data directory".into()))?
            .join("repolens");
        Ok(data_dir.join("session.json"))
    }

    /// Load the stored session, or None when logged out.
    ///
    /// A file that doesn't parse, or parses to an empty token, is stale state
    /// from an older run; it gets removed rather than reported as an error.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let stored: StoredSession = match serde_json::from_str(&contents) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("dropping unreadable session file: {}", e);
                let _ = std::fs::remove_file(&self.path);
                return Ok(None);
            }
        };

        let access_token = decrypt(&stored.token);
        if access_token.is_empty() {
            warn!("dropping session with empty token");
            let _ = std::fs::remove_file(&self.path);
            return Ok(None);
        }

        Ok(Some(Session {
            access_token,
            user: stored.user,
        }))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let stored = StoredSession {
            token: encrypt(&session.access_token),
            user: session.user.clone(),
        };

        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, contents)?;
        debug!("saved session for {}", session.user.login);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Login, registration, logout, and the OAuth callback.
///
/// OAuth itself happens in the browser against the backend; this side only
/// starts the flow (by handing out the URL) and finishes it (by parsing the
/// callback the flow redirects to).
pub struct AuthGateway {
    backend: BackendClient,
    store: SessionStore,
}

impl AuthGateway {
    pub fn new(backend: BackendClient, store: SessionStore) -> Self {
        Self { backend, store }
    }

    /// URL the user opens in a browser to start the GitHub OAuth flow
    pub fn github_login_url(&self) -> String {
        self.backend.github_login_url()
    }

    pub fn current_session(&self) -> Result<Option<Session>> {
        self.store.load()
    }

    /// Sign in with a local account and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .backend
            .login(email, password)
            .await
            .map_err(|e| Error::AuthError(e.to_string()))?;

        let session = Session {
            access_token: response.access_token,
            user: response.user.into(),
        };
        self.store.save(&session)?;
        Ok(session)
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<()> {
        self.backend
            .register(email, username, password)
            .await
            .map_err(|e| Error::AuthError(e.to_string()))
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()
    }

    /// Finish the OAuth flow from the callback URL the backend redirected to.
    ///
    /// The callback carries `token` and `user` (a JSON-encoded profile) as
    /// query parameters. Anything missing or unparsable is an auth error the
    /// caller maps to the logged-out state; it never leaves a half-session
    /// behind.
    pub fn complete_oauth(&self, callback_url: &str) -> Result<Session> {
        let url = url::Url::parse(callback_url)
            .map_err(|_| Error::AuthError("callback URL is not valid".into()))?;

        let mut token = None;
        let mut user_json = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "token" => token = Some(value.into_owned()),
                "user" => user_json = Some(value.into_owned()),
                _ => {}
            }
        }

        let access_token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::AuthError("callback is missing the access token".into()))?;
        let user_json = user_json
            .ok_or_else(|| Error::AuthError("callback is missing the user profile".into()))?;

        let mut user: UserProfile = serde_json::from_str(&user_json)
            .map_err(|_| Error::AuthError("callback user profile is not valid JSON".into()))?;
        user.github_connected = true;

        let session = Session {
            access_token,
            user,
        };
        self.store.save(&session)?;
        Ok(session)
    }
}

/// Simple XOR obfuscation with a machine-specific key
fn encrypt(data: &str) -> Vec<u8> {
    let key = machine_key();
    data.bytes()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

fn decrypt(data: &[u8]) -> String {
    let key = machine_key();
    let decrypted: Vec<u8> = data
        .iter()
        .enumerate()
        .map(|(i, &b)| b ^ key[i % key.len()])
        .collect();
    String::from_utf8_lossy(&decrypted).to_string()
}

/// Key derived from hostname + username, so a copied session file doesn't
/// decrypt on another machine
fn machine_key() -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let hostname = hostname::get()
        .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
        .to_string_lossy()
        .to_string();

    let username = whoami::username();
    let seed = format!("repolens-{}-{}", hostname, username);

    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let hash = hasher.finish();

    // Stretch the 8-byte hash into a 32-byte key
    let mut key = Vec::with_capacity(32);
    let mut val = hash;
    for _ in 0..4 {
        key.extend_from_slice(&val.to_le_bytes());
        val = val.wrapping_mul(1103515245).wrapping_add(12345);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserProfile {
        UserProfile {
            id: 7,
            login: "arnav".to_string(),
            name: Some("Arnav".to_string()),
            avatar_url: "https://example.com/a.png".to_string(),
            github_connected: true,
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.json"))
    }

    #[test]
    fn test_token_obfuscation_roundtrip() {
        let original = "gho_test_token_12345";
        let encrypted = encrypt(original);
        assert_ne!(encrypted, original.as_bytes());
        assert_eq!(decrypt(&encrypted), original);
    }

    #[test]
    fn test_session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let session = Session {
            access_token: "gho_abc".to_string(),
            user: test_user(),
        };
        store.save(&session).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_missing_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_dropped_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().unwrap().is_none());
        // The stale file is gone so the next load doesn't re-parse it
        assert!(!path.exists());
    }

    #[test]
    fn test_token_without_user_never_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        // A file with a token but no user half fails to parse as a session
        std::fs::write(&path, r#"{ "token": [1, 2, 3] }"#).unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_logout_clears_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&Session {
                access_token: "gho_abc".to_string(),
                user: test_user(),
            })
            .unwrap();

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    fn gateway_in(dir: &tempfile::TempDir) -> AuthGateway {
        AuthGateway::new(BackendClient::new("http://localhost:8000"), store_in(dir))
    }

    #[test]
    fn test_complete_oauth_parses_the_callback() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway_in(&dir);

        let user = r#"{"id":7,"login":"arnav","avatar_url":"https://example.com/a.png"}"#;
        let callback = format!(
            "http://localhost:5173/auth/callback?token=gho_abc&user={}",
            urlencoding::encode(user)
        );

        let session = gateway.complete_oauth(&callback).unwrap();
        assert_eq!(session.access_token, "gho_abc");
        assert_eq!(session.user.login, "arnav");
        assert!(session.user.github_connected);

        // And it was persisted
        let loaded = gateway.current_session().unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_complete_oauth_rejects_missing_token() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway_in(&dir);

        let result =
            gateway.complete_oauth("http://localhost:5173/auth/callback?user=%7B%22id%22%3A7%7D");
        assert!(matches!(result, Err(Error::AuthError(_))));
        assert!(gateway.current_session().unwrap().is_none());
    }

    #[test]
    fn test_complete_oauth_rejects_unparsable_user() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway_in(&dir);

        let result = gateway
            .complete_oauth("http://localhost:5173/auth/callback?token=gho_abc&user=not-json");
        assert!(matches!(result, Err(Error::AuthError(_))));
    }
}
