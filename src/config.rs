//! Configuration for the prediction pipeline.

use serde::{Deserialize, Serialize};

/// Pipeline file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_cache_dir() -> String {
    "data/cache/scraper".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_requests_per_minute() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

/// Scoring policy: sub-score caps and confidence thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_past_cap")]
    pub past_performance_cap: f64,
    #[serde(default = "default_aptitude_cap")]
    pub aptitude_cap: f64,
    #[serde(default = "default_jockey_trainer_cap")]
    pub jockey_trainer_cap: f64,
    #[serde(default = "default_pace_fit_cap")]
    pub pace_fit_cap: f64,
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,
    #[serde(default = "default_medium_confidence")]
    pub medium_confidence: f64,
    #[serde(default = "default_low_confidence")]
    pub low_confidence: f64,
}

fn default_past_cap() -> f64 {
    40.0
}

fn default_aptitude_cap() -> f64 {
    30.0
}

fn default_jockey_trainer_cap() -> f64 {
    20.0
}

fn default_pace_fit_cap() -> f64 {
    10.0
}

fn default_high_confidence() -> f64 {
    75.0
}

fn default_medium_confidence() -> f64 {
    65.0
}

fn default_low_confidence() -> f64 {
    50.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            past_performance_cap: default_past_cap(),
            aptitude_cap: default_aptitude_cap(),
            jockey_trainer_cap: default_jockey_trainer_cap(),
            pace_fit_cap: default_pace_fit_cap(),
            high_confidence: default_high_confidence(),
            medium_confidence: default_medium_confidence(),
            low_confidence: default_low_confidence(),
        }
    }
}

/// Betting and budget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BettingConfig {
    #[serde(default = "default_bet_unit")]
    pub bet_unit: u32,
    #[serde(default = "default_weekly_budget")]
    pub weekly_budget: u32,
    #[serde(default = "default_min_weekly_budget")]
    pub min_weekly_budget: u32,
    #[serde(default = "default_min_races")]
    pub min_races: usize,
    #[serde(default = "default_max_races")]
    pub max_races: usize,
}

fn default_bet_unit() -> u32 {
    100
}

fn default_weekly_budget() -> u32 {
    30000
}

fn default_min_weekly_budget() -> u32 {
    10000
}

fn default_min_races() -> usize {
    3
}

fn default_max_races() -> usize {
    5
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            bet_unit: default_bet_unit(),
            weekly_budget: default_weekly_budget(),
            min_weekly_budget: default_min_weekly_budget(),
            min_races: default_min_races(),
            max_races: default_max_races(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub betting: BettingConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables. The key separator is a
            // double underscore so field names keep their own underscores:
            // KEIBA_BETTING__WEEKLY_BUDGET, KEIBA_SCRAPER__MAX_RETRIES, etc.
            .add_source(
                config::Environment::with_prefix("KEIBA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
