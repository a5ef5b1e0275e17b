//! File-based cache of fetched pages with TTL support.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;

/// Cache entry with timestamp
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Cache categories with different TTLs
#[derive(Debug, Clone, Copy)]
pub enum CacheCategory {
    RaceList,   // 6 hours
    RaceCard,   // 24 hours
    PastRaces,  // 24 hours
    RaceResult, // 7 days, results never change once posted
}

impl CacheCategory {
    /// Get TTL duration
    pub fn ttl(&self) -> Duration {
        match self {
            CacheCategory::RaceList => Duration::hours(6),
            CacheCategory::RaceCard => Duration::hours(24),
            CacheCategory::PastRaces => Duration::hours(24),
            CacheCategory::RaceResult => Duration::hours(24 * 7),
        }
    }

    /// Get directory name for this category
    pub fn dir_name(&self) -> &str {
        match self {
            CacheCategory::RaceList => "race_list",
            CacheCategory::RaceCard => "race_card",
            CacheCategory::PastRaces => "past_races",
            CacheCategory::RaceResult => "race_result",
        }
    }
}

/// File-based cache
pub struct Cache {
    base_dir: PathBuf,
}

impl Cache {
    /// Create a new cache with the given base directory
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get cache directory for a category
    fn category_dir(&self, category: CacheCategory) -> PathBuf {
        self.base_dir.join(category.dir_name())
    }

    /// Get cache file path for a key
    fn cache_path(&self, category: CacheCategory, key: &str) -> PathBuf {
        self.category_dir(category).join(format!("{}.json", key))
    }

    /// Get cached data if valid
    pub fn get<T: DeserializeOwned>(&self, category: CacheCategory, key: &str) -> Option<T> {
        let path = self.cache_path(category, key);

        if !path.exists() {
            return None;
        }

        let content = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        // Check if expired
        let elapsed = Utc::now() - entry.cached_at;
        if elapsed > category.ttl() {
            // Remove expired cache
            let _ = std::fs::remove_file(&path);
            return None;
        }

        Some(entry.data)
    }

    /// Set cache data
    pub fn set<T: Serialize>(&self, category: CacheCategory, key: &str, data: &T) -> Result<()> {
        let dir = self.category_dir(category);
        std::fs::create_dir_all(&dir)?;

        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };

        let path = self.cache_path(category, key);
        let content = serde_json::to_string_pretty(&entry)?;
        std::fs::write(&path, content)?;

        Ok(())
    }
}
