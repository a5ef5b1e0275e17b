//! Core data model shared across pipeline stages.

use serde::{Deserialize, Serialize};

use crate::pace::Pace;
use crate::running_style::RunningStyle;
use crate::scoring::DesScore;

/// Track surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Turf,
    Dirt,
}

impl Surface {
    /// Parse from the single-character marker used on netkeiba pages
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "芝" => Some(Surface::Turf),
            "ダ" => Some(Surface::Dirt),
            _ => None,
        }
    }
}

/// Race header information from the race card page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceInfo {
    pub race_id: String,
    pub name: String,
    pub venue: String,
    pub race_number: u8,
    pub distance: u32,
    pub surface: Surface,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_rule: Option<String>,
}

/// A single past start from the past-performance page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastRace {
    /// YYYY-MM-DD
    pub date: String,
    pub venue: String,
    pub distance: u32,
    pub surface: Surface,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_position: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_size: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_position: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jockey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_carried: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_3f: Option<f64>,
    /// Corner passage positions, e.g. "4-4-5-4"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_positions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horse_weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_change: Option<i32>,
}

impl PastRace {
    /// Position at the first corner, when the passage string parses
    pub fn first_corner(&self) -> Option<u8> {
        self.corner_positions
            .as_deref()?
            .split('-')
            .next()?
            .trim()
            .parse()
            .ok()
    }

    /// Finish position, falling back to the last corner passage
    pub fn finish(&self) -> Option<u8> {
        if self.finish_position.is_some() {
            return self.finish_position;
        }
        self.corner_positions
            .as_deref()?
            .split('-')
            .next_back()?
            .trim()
            .parse()
            .ok()
    }
}

/// One entry on the race card, enriched stage by stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorseEntry {
    pub horse_id: String,
    pub horse_number: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<u8>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jockey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_carried: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_odds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u8>,
    #[serde(default)]
    pub past_races: Vec<PastRace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_style: Option<RunningStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub des_score: Option<DesScore>,
}

/// A race with its full field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub info: RaceInfo,
    pub horses: Vec<HorseEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<Pace>,
}

/// Day-level artifact of the ingestion stage (`race_data_{ymd}.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceData {
    pub ymd: String,
    pub fetched_at: String,
    pub races: Vec<Race>,
}

/// Races discovered for one venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueJobs {
    pub venue_code: String,
    pub venue: String,
    pub race_ids: Vec<String>,
}

/// Day-level artifact of the discovery stage (`today_jobs_{ymd}.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayJobs {
    pub ymd: String,
    pub generated_at: String,
    pub total_races: usize,
    pub venues: Vec<VenueJobs>,
}

#[cfg(test)]
pub(crate) fn sample_past_race(date: &str, distance: u32, surface: Surface) -> PastRace {
    PastRace {
        date: date.to_string(),
        venue: "高知".into(),
        distance,
        surface,
        track_condition: None,
        finish_position: None,
        field_size: Some(10),
        post_position: Some(4),
        popularity: Some(3),
        jockey: None,
        weight_carried: Some(55.0),
        finish_time: None,
        last_3f: None,
        corner_positions: None,
        horse_weight: None,
        weight_change: None,
    }
}
