// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Fallback token lifetime in seconds when the identity provider does not
/// report one.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Token lifetime in seconds, as reported by the identity provider.
    pub expires_in: Option<i64>,
}

impl SessionData {
    fn expiry(&self) -> DateTime<Utc> {
        let lifetime = self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        self.created_at + Duration::seconds(lifetime)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expiry()
    }

    /// Minutes remaining until expiry (for the status bar)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expiry() - Utc::now()).num_minutes().max(0)
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns true if a non-expired session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data (sign out)
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_data(created_at: DateTime<Utc>, expires_in: Option<i64>) -> SessionData {
        SessionData {
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            email: "staff@example.org".to_string(),
            created_at,
            expires_in,
        }
    }

    #[test]
    fn test_fresh_session_not_expired() {
        let data = session_data(Utc::now(), Some(3600));
        assert!(!data.is_expired());
        assert!(data.minutes_until_expiry() > 0);
    }

    #[test]
    fn test_session_expires_after_lifetime() {
        let data = session_data(Utc::now() - Duration::seconds(3700), Some(3600));
        assert!(data.is_expired());
        assert_eq!(data.minutes_until_expiry(), 0);
    }

    #[test]
    fn test_default_lifetime_applies_when_unreported() {
        let data = session_data(Utc::now() - Duration::seconds(3500), None);
        assert!(!data.is_expired());
        let data = session_data(Utc::now() - Duration::seconds(3700), None);
        assert!(data.is_expired());
    }
}
