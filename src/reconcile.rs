//! Reconciling predictions against official results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::selection::{Prediction, Volatility};

/// Parsed official result for one race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub race_id: String,
    /// Horse numbers of the top three, in finishing order
    pub finishing_order: Vec<u8>,
    /// Trio (三連複) payout per ¥100
    pub trio_payout: u32,
}

/// Settlement status of one predicted race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    Hit,
    Miss,
    Unavailable,
}

/// One race after reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledRace {
    pub race_id: String,
    pub venue: String,
    pub race_name: String,
    pub race_number: u8,
    pub status: RaceStatus,
    pub volatility: Volatility,
    pub predicted: Vec<u8>,
    #[serde(default)]
    pub actual: Vec<u8>,
    pub stake: u32,
    pub payout: u32,
    pub profit: i64,
}

/// Day totals across all reconciled races
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub total_races: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub unavailable_count: usize,
    pub total_investment: u32,
    pub total_return: u32,
    pub total_profit: i64,
    pub hit_rate: f64,
    pub recovery_rate: f64,
}

/// Day-level artifact of the results stage (`race_results_{ymd}.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayResults {
    pub ymd: String,
    pub generated_at: String,
    pub summary: DaySummary,
    pub results: Vec<ReconciledRace>,
}

/// Settle one prediction against its outcome.
///
/// A hit is set equality of the three axis horses and the actual top
/// three. The stake was paid per ¥100, so a winning trio pays
/// `payout × unit_price / 100`. A missing outcome means the race is
/// carried as unavailable with no money moved.
pub fn reconcile(prediction: &Prediction, outcome: Option<&RaceOutcome>) -> ReconciledRace {
    let predicted = prediction.plan.axis.clone();

    let Some(outcome) = outcome else {
        return ReconciledRace {
            race_id: prediction.race_id.clone(),
            venue: prediction.venue.clone(),
            race_name: prediction.race_name.clone(),
            race_number: prediction.race_number,
            status: RaceStatus::Unavailable,
            volatility: prediction.volatility,
            predicted,
            actual: Vec::new(),
            stake: 0,
            payout: 0,
            profit: 0,
        };
    };

    let actual: Vec<u8> = outcome.finishing_order.iter().take(3).copied().collect();
    let hit = actual.len() == 3
        && predicted.iter().collect::<BTreeSet<_>>() == actual.iter().collect::<BTreeSet<_>>();

    let stake = prediction.plan.stake;
    let payout = if hit {
        outcome.trio_payout * prediction.plan.unit_price / 100
    } else {
        0
    };

    ReconciledRace {
        race_id: prediction.race_id.clone(),
        venue: prediction.venue.clone(),
        race_name: prediction.race_name.clone(),
        race_number: prediction.race_number,
        status: if hit { RaceStatus::Hit } else { RaceStatus::Miss },
        volatility: prediction.volatility,
        predicted,
        actual,
        stake,
        payout,
        profit: payout as i64 - stake as i64,
    }
}

/// Total up a day's reconciled races.
pub fn summarize(results: &[ReconciledRace]) -> DaySummary {
    let hit_count = results.iter().filter(|r| r.status == RaceStatus::Hit).count();
    let miss_count = results.iter().filter(|r| r.status == RaceStatus::Miss).count();
    let unavailable_count = results
        .iter()
        .filter(|r| r.status == RaceStatus::Unavailable)
        .count();
    let total_investment: u32 = results.iter().map(|r| r.stake).sum();
    let total_return: u32 = results.iter().map(|r| r.payout).sum();

    let settled = hit_count + miss_count;
    let hit_rate = if settled > 0 {
        hit_count as f64 / settled as f64 * 100.0
    } else {
        0.0
    };
    let recovery_rate = if total_investment > 0 {
        total_return as f64 / total_investment as f64 * 100.0
    } else {
        0.0
    };

    DaySummary {
        total_races: results.len(),
        hit_count,
        miss_count,
        unavailable_count,
        total_investment,
        total_return,
        total_profit: total_return as i64 - total_investment as i64,
        hit_rate,
        recovery_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::BettingPlan;

    fn prediction(axis: Vec<u8>, stake: u32) -> Prediction {
        Prediction {
            race_id: "202630081101".into(),
            race_name: "テスト".into(),
            venue: "門別".into(),
            race_number: 11,
            distance: 1200,
            volatility: Volatility::Low,
            volatility_reason: String::new(),
            horses: vec![],
            plan: BettingPlan {
                bet_type: "trio_formation".into(),
                axis,
                opponents: vec![],
                combinations: stake / 100,
                unit_price: 100,
                stake,
            },
            market_warnings: vec![],
        }
    }

    fn outcome(order: Vec<u8>, payout: u32) -> RaceOutcome {
        RaceOutcome {
            race_id: "202630081101".into(),
            finishing_order: order,
            trio_payout: payout,
        }
    }

    #[test]
    fn test_hit_on_exact_order() {
        let result = reconcile(&prediction(vec![2, 8, 9], 1000), Some(&outcome(vec![2, 8, 9], 2200)));
        assert_eq!(result.status, RaceStatus::Hit);
        assert_eq!(result.payout, 2200);
        assert_eq!(result.profit, 1200);
    }

    #[test]
    fn test_hit_on_any_permutation() {
        let result = reconcile(&prediction(vec![2, 8, 9], 1000), Some(&outcome(vec![9, 2, 8], 2200)));
        assert_eq!(result.status, RaceStatus::Hit);
    }

    #[test]
    fn test_miss_loses_the_stake() {
        let result = reconcile(&prediction(vec![2, 8, 9], 1000), Some(&outcome(vec![2, 8, 10], 2200)));
        assert_eq!(result.status, RaceStatus::Miss);
        assert_eq!(result.payout, 0);
        assert_eq!(result.profit, -1000);
    }

    #[test]
    fn test_payout_scales_with_unit_price() {
        let mut pred = prediction(vec![2, 8, 9], 5000);
        pred.plan.unit_price = 500;
        let result = reconcile(&pred, Some(&outcome(vec![2, 8, 9], 2200)));
        assert_eq!(result.payout, 11000);
        assert_eq!(result.profit, 6000);
    }

    #[test]
    fn test_unavailable_moves_no_money() {
        let result = reconcile(&prediction(vec![2, 8, 9], 1000), None);
        assert_eq!(result.status, RaceStatus::Unavailable);
        assert_eq!(result.stake, 0);
        assert_eq!(result.profit, 0);
    }

    #[test]
    fn test_day_summary() {
        let results = vec![
            reconcile(&prediction(vec![2, 8, 9], 1000), Some(&outcome(vec![8, 9, 2], 2200))),
            reconcile(&prediction(vec![1, 4, 7], 1300), Some(&outcome(vec![1, 4, 9], 900))),
            reconcile(&prediction(vec![3, 5, 6], 1000), None),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.total_races, 3);
        assert_eq!(summary.hit_count, 1);
        assert_eq!(summary.miss_count, 1);
        assert_eq!(summary.unavailable_count, 1);
        assert_eq!(summary.total_investment, 2300);
        assert_eq!(summary.total_return, 2200);
        assert_eq!(summary.total_profit, -100);
        assert_eq!(summary.hit_rate, 50.0);
        assert!((summary.recovery_rate - 95.65).abs() < 0.01);
    }
}
