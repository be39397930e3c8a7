use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;
use urlencoding::encode;

use crate::{models::InviteRecord, Error, Result};

/// Public URL of a user's analytics page
pub fn analytics_share_url(origin: &str, login: &str) -> String {
    format!("{}/analytics/{}", origin.trim_end_matches('/'), login)
}

pub fn share_title(display_name: &str) -> String {
    format!("{}'s GitHub Analytics", display_name)
}

pub fn share_text(display_name: &str) -> String {
    format!(
        "Check out {}'s GitHub Analytics Dashboard! 🚀",
        display_name
    )
}

/// `mailto:` link prefilled with the share blurb
pub fn email_share_url(display_name: &str, share_url: &str) -> String {
    let subject = encode(&share_title(display_name)).into_owned();
    let body = encode(&format!("{}\n\n{}", share_text(display_name), share_url)).into_owned();
    format!("mailto:?subject={}&body={}", subject, body)
}

pub fn twitter_share_url(display_name: &str, share_url: &str) -> String {
    let text = encode(&format!("{}\n{}", share_text(display_name), share_url)).into_owned();
    format!("https://twitter.com/intent/tweet?text={}", text)
}

pub fn linkedin_share_url(share_url: &str) -> String {
    format!(
        "https://www.linkedin.com/sharing/share-offsite/?url={}",
        encode(share_url)
    )
}

pub fn facebook_share_url(share_url: &str) -> String {
    format!(
        "https://www.facebook.com/sharer/sharer.php?u={}",
        encode(share_url)
    )
}

pub fn whatsapp_share_url(display_name: &str, share_url: &str) -> String {
    let text = encode(&format!("{} {}", share_text(display_name), share_url)).into_owned();
    format!("https://wa.me/?text={}", text)
}

/// `mailto:` link for inviting someone, prefilled with the invitation body
pub fn invite_mailto(email: &str, display_name: &str, share_url: &str) -> String {
    let subject = encode("Join me on RepoLens!").into_owned();
    let body = encode(&format!(
        "Hi!\n\nI'd love for you to check out RepoLens - a GitHub repository \
         search and analytics platform!\n\nYou can see my analytics here: {}\n\n\
         Join me and explore amazing GitHub projects!\n\nBest regards,\n{}",
        share_url, display_name
    ))
    .into_owned();
    format!("mailto:{}?subject={}&body={}", email, subject, body)
}

/// Append-only log of sent invitations.
///
/// Fire-and-forget: recording an invite just opens the user's mail composer
/// and remembers the address locally; nothing confirms delivery.
/// Unlike the saved-repository store, bulk clear here does not ask for
/// confirmation - matching the surface it came from.
pub struct InviteLog {
    path: PathBuf,
    entries: Mutex<Vec<InviteRecord>>,
}

impl InviteLog {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries: Vec<InviteRecord> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| Error::ConfigError("Could not find data directory".into()))?
            .join("repolens");
        Ok(data_dir.join("invites.json"))
    }

    /// Append an invitation for this address, stamped now
    pub fn record(&self, email: &str) -> Result<InviteRecord> {
        let record = InviteRecord {
            email: email.to_string(),
            sent_at: Utc::now(),
        };

        let mut entries = self.lock();
        entries.push(record.clone());
        self.persist(&entries)?;
        debug!("recorded invite for {}", email);
        Ok(record)
    }

    /// All invitations, newest first
    pub fn list(&self) -> Vec<InviteRecord> {
        let entries = self.lock();
        entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Wipe the whole log. No confirmation required.
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<InviteRecord>> {
        self.entries.lock().expect("invite log lock poisoned")
    }

    fn persist(&self, entries: &[InviteRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_shape() {
        assert_eq!(
            analytics_share_url("https://repolens.dev", "arnav"),
            "https://repolens.dev/analytics/arnav"
        );
        assert_eq!(
            analytics_share_url("https://repolens.dev/", "arnav"),
            "https://repolens.dev/analytics/arnav"
        );
    }

    #[test]
    fn test_email_share_url_is_prefilled() {
        let url = email_share_url("Arnav", "https://repolens.dev/analytics/arnav");
        assert!(url.starts_with("mailto:?subject="));
        assert!(url.contains(&encode("Arnav's GitHub Analytics").into_owned()));
        assert!(url.contains(&encode("https://repolens.dev/analytics/arnav").into_owned()));
    }

    #[test]
    fn test_invite_mailto_addresses_the_recipient() {
        let url = invite_mailto(
            "friend@example.com",
            "Arnav",
            "https://repolens.dev/analytics/arnav",
        );
        assert!(url.starts_with("mailto:friend@example.com?subject="));
        assert!(url.contains(&encode("Join me on RepoLens!").into_owned()));
    }

    #[test]
    fn test_social_share_urls_encode_the_link() {
        let share_url = "https://repolens.dev/analytics/arnav";
        assert!(linkedin_share_url(share_url).contains("https%3A%2F%2Frepolens.dev"));
        assert!(facebook_share_url(share_url).contains("https%3A%2F%2Frepolens.dev"));
        assert!(twitter_share_url("Arnav", share_url).starts_with("https://twitter.com/intent/tweet?text="));
        assert!(whatsapp_share_url("Arnav", share_url).starts_with("https://wa.me/?text="));
    }

    fn open_log(dir: &tempfile::TempDir) -> InviteLog {
        InviteLog::open(dir.path().join("invites.json")).unwrap()
    }

    #[test]
    fn test_invites_append_and_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let log = open_log(&dir);

        log.record("first@example.com").unwrap();
        log.record("second@example.com").unwrap();

        let listed = log.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].email, "second@example.com");
        assert_eq!(listed[1].email, "first@example.com");
    }

    #[test]
    fn test_invites_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invites.json");

        {
            let log = InviteLog::open(&path).unwrap();
            log.record("friend@example.com").unwrap();
        }

        let reopened = InviteLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_clear_wipes_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = open_log(&dir);
        log.record("friend@example.com").unwrap();

        log.clear().unwrap();
        assert!(log.is_empty());
    }
}
