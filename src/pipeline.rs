//! The file contract between pipeline stages.
//!
//! Every stage reads and writes dated JSON artifacts in one data
//! directory. All writes go through `save_json`, which backs up the
//! previous version before overwriting.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// JST offset; NAR racing runs on Japan time
fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("JST offset is valid")
}

/// Today's date in JST
pub fn today_jst() -> NaiveDate {
    let now: DateTime<FixedOffset> = Utc::now().with_timezone(&jst());
    now.date_naive()
}

/// Current timestamp in JST, formatted for file artifacts
pub fn now_stamp() -> String {
    Utc::now()
        .with_timezone(&jst())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Validate a YYYYMMDD argument.
pub fn parse_ymd(ymd: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(ymd, "%Y%m%d")
        .with_context(|| format!("invalid date '{}', expected YYYYMMDD", ymd))
}

/// Resolver for the dated artifact paths.
#[derive(Debug, Clone)]
pub struct Paths {
    data_dir: PathBuf,
}

impl Paths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn today_jobs(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("today_jobs_{}.json", ymd))
    }

    pub fn today_jobs_latest(&self) -> PathBuf {
        self.data_dir.join("today_jobs.latest.json")
    }

    pub fn race_data(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("race_data_{}.json", ymd))
    }

    pub fn final_predictions(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("final_predictions_{}.json", ymd))
    }

    pub fn latest_predictions(&self) -> PathBuf {
        self.data_dir.join("latest_predictions.json")
    }

    pub fn predictions_md(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("predictions_{}.md", ymd))
    }

    pub fn race_results(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("race_results_{}.json", ymd))
    }

    pub fn results_summary(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("results_summary_{}.json", ymd))
    }

    pub fn results_summary_md(&self, ymd: &str) -> PathBuf {
        self.data_dir.join(format!("results_summary_{}.md", ymd))
    }

    pub fn statistics(&self) -> PathBuf {
        self.data_dir.join("statistics.json")
    }

    pub fn weekly_tracker(&self) -> PathBuf {
        self.data_dir.join("weekly_tracker.json")
    }

    /// Every recorded results file, sorted by date.
    pub fn all_race_results(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        if !self.data_dir.exists() {
            return Ok(found);
        }
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with("race_results_") && name.ends_with(".json") {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }
}

/// Load a JSON artifact. A missing file is an error with the path named,
/// since a missing prerequisite means the earlier stage never ran.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("missing or unreadable file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("malformed JSON in {}", path.display()))
}

/// Save a JSON artifact, keeping the previous version as `.bak`.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        let backup = path.with_extension("json.bak");
        std::fs::copy(path, &backup)
            .with_context(|| format!("failed to back up {}", path.display()))?;
        debug!(path = %path.display(), "backed up previous version");
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Save a text artifact (no backup; reports are regenerated wholesale).
pub fn save_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
