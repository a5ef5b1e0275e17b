//! Running style classification from first-corner passage positions.

use serde::{Deserialize, Serialize};

use crate::types::PastRace;

/// How a horse positions itself in the early stages of a race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningStyle {
    FrontRunner,
    Presser,
    Midpack,
    Closer,
}

/// Number of recent starts considered for classification
const RECENT_RACES: usize = 5;

fn bucket(first_corner: u8) -> RunningStyle {
    match first_corner {
        0..=3 => RunningStyle::FrontRunner,
        4..=6 => RunningStyle::Presser,
        7..=10 => RunningStyle::Midpack,
        _ => RunningStyle::Closer,
    }
}

/// Classify a horse's running style from its past races.
///
/// Looks at the first-corner position over the five most recent starts.
/// A start where the finish held or improved on the first-corner position
/// counts double. Ties resolve toward the more forward style. Returns
/// `None` when no start has a parsable corner passage.
pub fn classify(past_races: &[PastRace]) -> Option<RunningStyle> {
    let mut recent: Vec<&PastRace> = past_races.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_RACES);

    // front, presser, midpack, closer
    let mut votes = [0u32; 4];
    for past in recent {
        let Some(corner) = past.first_corner() else {
            continue;
        };
        let style = bucket(corner);
        let weight = match past.finish() {
            Some(finish) if finish <= corner => 2,
            _ => 1,
        };
        let idx = match style {
            RunningStyle::FrontRunner => 0,
            RunningStyle::Presser => 1,
            RunningStyle::Midpack => 2,
            RunningStyle::Closer => 3,
        };
        votes[idx] += weight;
    }

    if votes.iter().all(|&v| v == 0) {
        return None;
    }

    let best = *votes.iter().max().unwrap_or(&0);
    // Fixed priority on ties: front > presser > midpack > closer
    let order = [
        RunningStyle::FrontRunner,
        RunningStyle::Presser,
        RunningStyle::Midpack,
        RunningStyle::Closer,
    ];
    order
        .iter()
        .zip(votes.iter())
        .find(|(_, &v)| v == best)
        .map(|(s, _)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sample_past_race, Surface};

    fn start(date: &str, corners: &str, finish: Option<u8>) -> PastRace {
        let mut past = sample_past_race(date, 1400, Surface::Dirt);
        past.corner_positions = Some(corners.to_string());
        past.finish_position = finish;
        past
    }

    #[test]
    fn test_no_data_is_unknown() {
        assert_eq!(classify(&[]), None);
        let past = sample_past_race("2026-01-01", 1400, Surface::Dirt);
        assert_eq!(classify(&[past]), None);
    }

    #[test]
    fn test_consistent_front_runner() {
        let races = vec![
            start("2026-02-01", "1-1-1-1", Some(1)),
            start("2026-01-15", "2-2-2-2", Some(3)),
            start("2026-01-01", "1-1-2-2", Some(2)),
        ];
        assert_eq!(classify(&races), Some(RunningStyle::FrontRunner));
    }

    #[test]
    fn test_closer_with_improving_finish_outvotes() {
        // Two closer starts that paid off (weight 2 each) against three
        // presser starts that faded (weight 1 each).
        let races = vec![
            start("2026-02-10", "12-12-10-8", Some(2)),
            start("2026-02-01", "11-11-9-7", Some(1)),
            start("2026-01-20", "5-5-6-7", Some(7)),
            start("2026-01-10", "4-4-6-8", Some(8)),
            start("2026-01-01", "5-6-7-9", Some(9)),
        ];
        assert_eq!(classify(&races), Some(RunningStyle::Closer));
    }

    #[test]
    fn test_tie_prefers_forward_style() {
        // Both starts faded past their first-corner position, so each
        // votes once: one for front, one for midpack.
        let races = vec![
            start("2026-02-01", "2-2-3-4", Some(5)),
            start("2026-01-15", "9-9-8-8", Some(10)),
        ];
        assert_eq!(classify(&races), Some(RunningStyle::FrontRunner));
    }

    #[test]
    fn test_only_recent_five_count() {
        let mut races = vec![
            start("2026-02-05", "1-1", Some(1)),
            start("2026-02-04", "2-2", Some(1)),
            start("2026-02-03", "1-2", Some(2)),
            start("2026-02-02", "3-3", Some(1)),
            start("2026-02-01", "2-1", Some(1)),
        ];
        // Older closer starts must not influence the vote.
        races.push(start("2025-12-01", "14-14-13-12", Some(1)));
        races.push(start("2025-11-01", "13-13-12-11", Some(2)));
        assert_eq!(classify(&races), Some(RunningStyle::FrontRunner));
    }

    #[test]
    fn test_stable_under_reordering() {
        let races = vec![
            start("2026-02-10", "12-12-10-8", Some(2)),
            start("2026-02-01", "11-11-9-7", Some(1)),
            start("2026-01-20", "5-5-6-7", Some(7)),
            start("2026-01-10", "4-4-6-8", Some(8)),
            start("2026-01-01", "5-6-7-9", Some(9)),
        ];
        let mut shuffled = races.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);
        assert_eq!(classify(&races), classify(&shuffled));
    }
}
