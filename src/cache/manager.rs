use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::AttendanceRecord;

/// Consider cache stale after 15 minutes.
/// Attendance changes through the day, so refresh more eagerly than for
/// slowly-changing data.
const CACHE_STALE_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Cache ages for the status bar
#[derive(Debug, Clone, Default)]
pub struct CacheAges {
    pub records: Option<String>,
    pub dates: Option<String>,
}

impl CacheAges {
    pub fn last_updated(&self) -> String {
        self.records
            .clone()
            .or_else(|| self.dates.clone())
            .unwrap_or_else(|| "never".to_string())
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        debug!(name = name, "Cache file written");
        Ok(())
    }

    // ===== Today's records =====

    pub fn load_records(&self) -> Result<Option<CachedData<Vec<AttendanceRecord>>>> {
        self.load("records")
    }

    pub fn save_records(&self, records: &[AttendanceRecord]) -> Result<()> {
        self.save("records", &records)
    }

    // ===== Archived dates =====

    pub fn load_archived_dates(&self) -> Result<Option<CachedData<Vec<String>>>> {
        self.load("dates")
    }

    pub fn save_archived_dates(&self, dates: &[String]) -> Result<()> {
        self.save("dates", &dates)
    }

    // ===== Per-day archived records =====

    pub fn load_day(&self, date: &str) -> Result<Option<CachedData<Vec<AttendanceRecord>>>> {
        self.load(&format!("day-{}", date))
    }

    pub fn save_day(&self, date: &str, records: &[AttendanceRecord]) -> Result<()> {
        self.save(&format!("day-{}", date), &records)
    }

    // ===== Status =====

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            records: self
                .load_records()
                .ok()
                .flatten()
                .map(|c| c.age_display()),
            dates: self
                .load_archived_dates()
                .ok()
                .flatten()
                .map(|c| c.age_display()),
        }
    }

    /// True when today's records are missing or older than the staleness
    /// window; archived days never go stale on their own.
    pub fn records_stale(&self) -> bool {
        match self.load_records() {
            Ok(Some(cached)) => cached.is_stale(),
            _ => true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(16);
        assert!(old.is_stale());
    }

    #[test]
    fn test_cached_data_age_display_buckets() {
        let mut cached = CachedData::new(vec![1]);
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(125);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::minutes(3000);
        assert_eq!(cached.age_display(), "2d ago");
    }

    #[test]
    fn test_cache_ages_last_updated() {
        let ages = CacheAges {
            records: Some("5m ago".to_string()),
            dates: None,
        };
        assert_eq!(ages.last_updated(), "5m ago");

        let ages = CacheAges::default();
        assert_eq!(ages.last_updated(), "never");
    }
}
