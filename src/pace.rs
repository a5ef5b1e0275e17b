//! Race pace inference from the field's running styles.

use serde::{Deserialize, Serialize};

use crate::running_style::RunningStyle;
use crate::types::HorseEntry;

/// Expected early pace of a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Fast,
    Medium,
    Slow,
}

/// Infer the expected pace from the classified styles in the field.
///
/// Three or more front runners, or a front/presser share of at least half
/// the known styles, means a contested fast pace. At most one front runner
/// means a slow pace. Horses without a known style do not count.
pub fn infer(horses: &[HorseEntry]) -> Pace {
    let styles: Vec<RunningStyle> = horses.iter().filter_map(|h| h.running_style).collect();
    classify(&styles)
}

pub fn classify(styles: &[RunningStyle]) -> Pace {
    if styles.is_empty() {
        return Pace::Medium;
    }

    let front = styles
        .iter()
        .filter(|s| **s == RunningStyle::FrontRunner)
        .count();
    let pressers = styles
        .iter()
        .filter(|s| **s == RunningStyle::Presser)
        .count();
    let forward_share = (front + pressers) as f64 / styles.len() as f64;

    if front >= 3 || forward_share >= 0.5 {
        Pace::Fast
    } else if front <= 1 {
        Pace::Slow
    } else {
        Pace::Medium
    }
}
