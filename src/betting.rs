//! Trio formation betting plans.

use serde::{Deserialize, Serialize};

use crate::scoring::Confidence;

/// A horse with its composite score, used for rank-order plan building
#[derive(Debug, Clone)]
pub struct RankedHorse {
    pub horse_number: u8,
    pub name: String,
    pub total: f64,
    pub confidence: Confidence,
}

/// A trio (三連複) formation: three axis horses plus opponents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BettingPlan {
    pub bet_type: String,
    /// Horse numbers of the three axis horses, best first
    pub axis: Vec<u8>,
    /// Horse numbers of the opponent block
    pub opponents: Vec<u8>,
    pub combinations: u32,
    pub unit_price: u32,
    pub stake: u32,
}

/// Opponents beyond the axis, scaled to field size
pub fn opponent_count(field_size: usize) -> usize {
    (field_size / 2 + 1).saturating_sub(3)
}

/// Build a trio formation from horses ranked by score.
///
/// The top three ranked horses form the axis; the next
/// `opponent_count(field_size)` fill the opponent block. Returns `None`
/// when fewer than three horses carry a score.
pub fn build_plan(
    ranked: &[RankedHorse],
    field_size: usize,
    unit_price: u32,
) -> Option<BettingPlan> {
    if ranked.len() < 3 {
        return None;
    }

    let axis: Vec<u8> = ranked.iter().take(3).map(|h| h.horse_number).collect();
    let wanted = opponent_count(field_size);
    let opponents: Vec<u8> = ranked
        .iter()
        .skip(3)
        .take(wanted)
        .map(|h| h.horse_number)
        .collect();

    let combinations = 10 + 3 * opponents.len() as u32;
    Some(BettingPlan {
        bet_type: "trio_formation".to_string(),
        axis,
        opponents,
        combinations,
        unit_price,
        stake: combinations * unit_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(count: usize) -> Vec<RankedHorse> {
        (1..=count)
            .map(|i| RankedHorse {
                horse_number: i as u8,
                name: format!("ホース{}", i),
                total: 90.0 - i as f64 * 5.0,
                confidence: Confidence::Medium,
            })
            .collect()
    }

    #[test]
    fn test_opponent_count_scales_with_field() {
        assert_eq!(opponent_count(14), 5);
        assert_eq!(opponent_count(12), 4);
        assert_eq!(opponent_count(8), 2);
        assert_eq!(opponent_count(6), 1);
    }

    #[test]
    fn test_opponent_count_clamps_at_zero() {
        assert_eq!(opponent_count(4), 0);
        assert_eq!(opponent_count(3), 0);
        assert_eq!(opponent_count(0), 0);
    }

    #[test]
    fn test_plan_shape_for_full_field() {
        let plan = build_plan(&ranked(14), 14, 100).unwrap();
        assert_eq!(plan.axis, vec![1, 2, 3]);
        assert_eq!(plan.opponents, vec![4, 5, 6, 7, 8]);
        assert_eq!(plan.combinations, 25);
        assert_eq!(plan.stake, 2500);
    }

    #[test]
    fn test_plan_without_opponents() {
        let plan = build_plan(&ranked(4), 4, 100).unwrap();
        assert!(plan.opponents.is_empty());
        assert_eq!(plan.combinations, 10);
        assert_eq!(plan.stake, 1000);
    }

    #[test]
    fn test_too_few_scored_horses() {
        assert!(build_plan(&ranked(2), 12, 100).is_none());
    }

    #[test]
    fn test_opponents_limited_by_scored_horses() {
        // Field of 14 wants 5 opponents but only 4 horses are scored.
        let plan = build_plan(&ranked(7), 14, 100).unwrap();
        assert_eq!(plan.opponents.len(), 4);
        assert_eq!(plan.combinations, 22);
    }
}
