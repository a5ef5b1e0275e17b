//! Budget allocation across the selected card.
//!
//! The weekly budget is spread over the remaining days of the week, then
//! split across races by volatility weight. High-volatility races get no
//! stake: they are carried as watch-only picks.

use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate};

use crate::config::BettingConfig;
use crate::selection::{Prediction, Volatility};

/// Allocation weight by volatility
pub fn volatility_weight(volatility: Volatility) -> f64 {
    match volatility {
        Volatility::Low => 0.60,
        Volatility::Medium => 0.40,
        Volatility::High => 0.00,
    }
}

/// Days left in the week including `date` (Monday = 7, Sunday = 1)
pub fn remaining_days(date: NaiveDate) -> u32 {
    7 - date.weekday().num_days_from_monday()
}

/// Budget for one day, spreading the weekly budget over the days left.
pub fn daily_budget(config: &BettingConfig, date: NaiveDate) -> Result<f64> {
    if config.weekly_budget < config.min_weekly_budget {
        bail!(
            "weekly budget ¥{} is below the ¥{} minimum",
            config.weekly_budget,
            config.min_weekly_budget
        );
    }
    Ok(config.weekly_budget as f64 / remaining_days(date) as f64)
}

/// Re-stake the selected predictions against the day's budget.
///
/// `ratio` comes from the weekly ledger alert level and scales the whole
/// day (1.0 normal, 0.5 on warning, 0.0 on critical). Every stake stays a
/// multiple of the bet unit, with the unit itself as the floor for races
/// that receive any allocation at all.
pub fn allocate_stakes(
    predictions: &mut [Prediction],
    budget: f64,
    ratio: f64,
    config: &BettingConfig,
) -> u32 {
    let budget = budget * ratio;
    let unit = config.bet_unit as f64;

    let mut counts = [0usize; 3];
    for p in predictions.iter() {
        counts[p.volatility as usize] += 1;
    }

    let mut total = 0u32;
    for p in predictions.iter_mut() {
        let weight = volatility_weight(p.volatility);
        let peers = counts[p.volatility as usize];
        if weight == 0.0 || peers == 0 || budget <= 0.0 {
            p.plan.unit_price = 0;
            p.plan.stake = 0;
            continue;
        }

        let race_budget = budget * weight / peers as f64;
        let per_bet = (race_budget / p.plan.combinations as f64 / unit).floor() * unit;
        let per_bet = per_bet.max(unit) as u32;

        p.plan.unit_price = per_bet;
        p.plan.stake = per_bet * p.plan.combinations;
        total += p.plan.stake;
    }
    total
}
