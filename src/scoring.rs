//! Four-axis composite score for a race entry.
//!
//! Each horse receives four capped sub-scores: past performance, course
//! aptitude, jockey/trainer form, and pace fit. The caps and confidence
//! thresholds come from `ScoringConfig` so the policy can be retuned
//! without touching the scorer.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::pace::Pace;
use crate::running_style::RunningStyle;
use crate::types::{HorseEntry, PastRace, RaceInfo, Surface};

/// Distance window treated as "same trip" for past performance
const SIMILAR_DISTANCE_M: u32 = 200;
/// Distance window for the aptitude band
const APTITUDE_BAND_M: u32 = 300;

/// Confidence tier derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    VeryLow,
}

/// Composite score with its sub-scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesScore {
    pub past_performance: f64,
    pub aptitude: f64,
    pub jockey_trainer: f64,
    pub pace_fit: f64,
    pub total: f64,
    pub confidence: Confidence,
}

/// Score one entry against the race it runs in.
pub fn score_horse(
    entry: &HorseEntry,
    info: &RaceInfo,
    pace: Pace,
    field_size: usize,
    config: &ScoringConfig,
) -> DesScore {
    let mut recent: Vec<&PastRace> = entry.past_races.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let past_performance =
        past_performance_score(&recent, info).min(config.past_performance_cap);
    let aptitude = aptitude_score(&recent, info).clamp(0.0, config.aptitude_cap);
    let jockey_trainer =
        jockey_trainer_score(&recent, entry.jockey.as_deref()).min(config.jockey_trainer_cap);
    let pace_fit = pace_fit_score(entry.running_style, pace, entry.draw, field_size)
        .clamp(0.0, config.pace_fit_cap);

    let total = past_performance + aptitude + jockey_trainer + pace_fit;
    let confidence = confidence_for(total, config);

    DesScore {
        past_performance,
        aptitude,
        jockey_trainer,
        pace_fit,
        total,
        confidence,
    }
}

fn confidence_for(total: f64, config: &ScoringConfig) -> Confidence {
    if total >= config.high_confidence {
        Confidence::High
    } else if total >= config.medium_confidence {
        Confidence::Medium
    } else if total >= config.low_confidence {
        Confidence::Low
    } else {
        Confidence::VeryLow
    }
}

/// A: finishes at a similar trip, recent trend, and strike rates.
fn past_performance_score(recent: &[&PastRace], info: &RaceInfo) -> f64 {
    let mut score = 0.0;

    // Finishes at a similar distance on the same surface, capped at 20.
    let mut similar_points: f64 = 0.0;
    for past in recent.iter().filter(|p| is_similar_trip(p, info)) {
        similar_points += match past.finish() {
            Some(1) => 10.0,
            Some(2) => 7.0,
            Some(3) => 3.0,
            _ => 0.0,
        };
    }
    score += similar_points.min(20.0);

    // Trend over the last three starts.
    let last3: Vec<u8> = recent.iter().take(3).filter_map(|p| p.finish()).collect();
    if last3.len() == 3 {
        if last3[0] < last3[1] && last3[1] < last3[2] {
            score += 10.0;
        } else if last3.iter().all(|&p| p <= 3) {
            score += 7.0;
        }
    }

    // Strike rates over the last five starts.
    let last5: Vec<u8> = recent.iter().take(5).filter_map(|p| p.finish()).collect();
    if !last5.is_empty() {
        let n = last5.len() as f64;
        let win_rate = last5.iter().filter(|&&p| p == 1).count() as f64 / n;
        let top2_rate = last5.iter().filter(|&&p| p <= 2).count() as f64 / n;
        if win_rate >= 0.10 {
            score += 5.0;
        }
        if top2_rate >= 0.30 {
            score += 5.0;
        }
    }

    score
}

fn is_similar_trip(past: &PastRace, info: &RaceInfo) -> bool {
    past.surface == info.surface && past.distance.abs_diff(info.distance) <= SIMILAR_DISTANCE_M
}

/// B: distance-band and surface aptitude plus body-weight stability.
fn aptitude_score(recent: &[&PastRace], info: &RaceInfo) -> f64 {
    let mut score = 0.0;

    let band: Vec<&&PastRace> = recent
        .iter()
        .filter(|p| p.distance.abs_diff(info.distance) <= APTITUDE_BAND_M)
        .collect();
    if let Some(rate) = top3_rate(&band) {
        if rate >= 0.5 {
            score += 15.0;
        } else if rate >= 0.3 {
            score += 8.0;
        }
    }

    let same_surface: Vec<&&PastRace> =
        recent.iter().filter(|p| p.surface == info.surface).collect();
    if let Some(rate) = top3_rate(&same_surface) {
        if rate >= 0.4 {
            score += 10.0;
        } else if rate >= 0.2 {
            score += 5.0;
        }
    }

    // Body-weight swing at the most recent start.
    if let Some(delta) = recent.first().and_then(|p| p.weight_change) {
        if delta.abs() <= 3 {
            score += 5.0;
        } else if delta.abs() >= 10 {
            score -= 3.0;
        }
    }

    score
}

fn top3_rate(races: &[&&PastRace]) -> Option<f64> {
    let finishes: Vec<u8> = races.iter().filter_map(|p| p.finish()).collect();
    if finishes.is_empty() {
        return None;
    }
    let top3 = finishes.iter().filter(|&&p| p <= 3).count();
    Some(top3 as f64 / finishes.len() as f64)
}

/// C: strike rate with today's jockey plus recent stable form.
fn jockey_trainer_score(recent: &[&PastRace], jockey: Option<&str>) -> f64 {
    let mut score = 0.0;

    if let Some(jockey) = jockey {
        let ridden: Vec<u8> = recent
            .iter()
            .filter(|p| p.jockey.as_deref() == Some(jockey))
            .filter_map(|p| p.finish())
            .collect();
        if !ridden.is_empty() {
            let win_rate =
                ridden.iter().filter(|&&p| p == 1).count() as f64 / ridden.len() as f64;
            if win_rate >= 0.15 {
                score += 10.0;
            } else if win_rate >= 0.05 {
                score += 5.0;
            }
        }
    }

    // Stable form proxied by the last five starts.
    let last5: Vec<u8> = recent.iter().take(5).filter_map(|p| p.finish()).collect();
    if !last5.is_empty() {
        let top2_rate = last5.iter().filter(|&&p| p <= 2).count() as f64 / last5.len() as f64;
        if top2_rate >= 0.30 {
            score += 10.0;
        } else if top2_rate >= 0.10 {
            score += 5.0;
        }
    }

    score
}

/// D: how well the style suits the expected pace, draw and field size.
fn pace_fit_score(
    style: Option<RunningStyle>,
    pace: Pace,
    draw: Option<u8>,
    field_size: usize,
) -> f64 {
    let Some(style) = style else {
        return 0.0;
    };

    use RunningStyle::*;
    let base = match (pace, style) {
        (Pace::Fast, FrontRunner) => 2.0,
        (Pace::Fast, Presser) => 4.0,
        (Pace::Fast, Midpack) => 6.0,
        (Pace::Fast, Closer) => 7.0,
        (Pace::Medium, FrontRunner) => 5.0,
        (Pace::Medium, Presser) => 6.0,
        (Pace::Medium, Midpack) => 5.0,
        (Pace::Medium, Closer) => 3.0,
        (Pace::Slow, FrontRunner) => 7.0,
        (Pace::Slow, Presser) => 6.0,
        (Pace::Slow, Midpack) => 3.0,
        (Pace::Slow, Closer) => 1.0,
    };

    let draw_bonus = match draw {
        Some(d) if d <= 3 => match style {
            FrontRunner | Presser => 3.0,
            Midpack => 1.0,
            Closer => 0.0,
        },
        Some(d) if d <= 5 => 1.0,
        Some(_) => match style {
            FrontRunner => 0.0,
            Presser => 1.0,
            Midpack | Closer => 2.0,
        },
        None => 0.0,
    };

    // Large fields make the early speed battle harder to survive.
    let field_adjust = if field_size >= 14 {
        match style {
            FrontRunner => -1.0,
            Closer => 1.0,
            _ => 0.0,
        }
    } else {
        0.0
    };

    base + draw_bonus + field_adjust
}
