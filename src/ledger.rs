//! Weekly budget ledger (`weekly_tracker.json`).
//!
//! Tracks investment and returns across the betting week and raises an
//! alert level that scales the next day's staking.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Alert level derived from the remaining balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Ok,
    Warning,
    Critical,
}

impl AlertLevel {
    /// Fraction of the daily budget that may still be staked
    pub fn investment_ratio(self) -> f64 {
        match self {
            AlertLevel::Ok => 1.0,
            AlertLevel::Warning => 0.5,
            AlertLevel::Critical => 0.0,
        }
    }
}

/// One settled day inside the week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    pub races: usize,
    pub invested: u32,
    pub returns: u32,
    pub profit: i64,
}

/// The week's running ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyLedger {
    /// Monday of the tracked week, YYYY-MM-DD
    pub week_start: String,
    pub week_end: String,
    pub initial_budget: u32,
    pub invested: u32,
    pub returns: u32,
    pub balance: i64,
    pub daily: Vec<DailyRecord>,
}

impl WeeklyLedger {
    /// Start a fresh ledger for the week containing `date`.
    pub fn start_week(initial_budget: u32, date: NaiveDate) -> Self {
        let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        let sunday = monday + Duration::days(6);
        Self {
            week_start: monday.format("%Y-%m-%d").to_string(),
            week_end: sunday.format("%Y-%m-%d").to_string(),
            initial_budget,
            invested: 0,
            returns: 0,
            balance: initial_budget as i64,
            daily: Vec::new(),
        }
    }

    /// Whether `date` falls inside the tracked week.
    pub fn covers(&self, date: NaiveDate) -> bool {
        let formatted = date.format("%Y-%m-%d").to_string();
        self.week_start.as_str() <= formatted.as_str()
            && formatted.as_str() <= self.week_end.as_str()
    }

    /// Append one settled day. A date already recorded is replaced, so a
    /// rerun of the results stage does not double-count.
    pub fn record_day(&mut self, date: &str, races: usize, invested: u32, returns: u32) {
        self.daily.retain(|d| d.date != date);
        self.daily.push(DailyRecord {
            date: date.to_string(),
            races,
            invested,
            returns,
            profit: returns as i64 - invested as i64,
        });
        self.daily.sort_by(|a, b| a.date.cmp(&b.date));

        self.invested = self.daily.iter().map(|d| d.invested).sum();
        self.returns = self.daily.iter().map(|d| d.returns).sum();
        self.balance = self.initial_budget as i64 - self.invested as i64 + self.returns as i64;
    }

    /// Alert level and its human-readable reason.
    pub fn alert(&self) -> (AlertLevel, String) {
        if self.balance < 0 {
            return (
                AlertLevel::Critical,
                format!("balance ¥{} is below zero, staking halted", self.balance),
            );
        }
        let threshold = (self.initial_budget as f64 * 0.30) as i64;
        if self.balance < threshold {
            (
                AlertLevel::Warning,
                format!(
                    "balance ¥{} is under 30% of the ¥{} budget, staking halved",
                    self.balance, self.initial_budget
                ),
            )
        } else {
            (AlertLevel::Ok, format!("balance ¥{}", self.balance))
        }
    }

    /// Recovery rate over the week so far, as a percentage.
    pub fn recovery_rate(&self) -> f64 {
        if self.invested == 0 {
            return 0.0;
        }
        self.returns as f64 / self.invested as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_bounds_from_midweek_start() {
        let ledger = WeeklyLedger::start_week(30000, ymd(2026, 2, 5)); // Thursday
        assert_eq!(ledger.week_start, "2026-02-02");
        assert_eq!(ledger.week_end, "2026-02-08");
        assert!(ledger.covers(ymd(2026, 2, 2)));
        assert!(ledger.covers(ymd(2026, 2, 8)));
        assert!(!ledger.covers(ymd(2026, 2, 9)));
    }

    #[test]
    fn test_fresh_ledger_is_ok() {
        let ledger = WeeklyLedger::start_week(30000, ymd(2026, 2, 2));
        let (level, _) = ledger.alert();
        assert_eq!(level, AlertLevel::Ok);
        assert_eq!(level.investment_ratio(), 1.0);
    }

    #[test]
    fn test_overspent_week_goes_critical() {
        let mut ledger = WeeklyLedger::start_week(30000, ymd(2026, 2, 2));
        for day in 2..6 {
            ledger.record_day(&format!("2026-02-{:02}", day), 4, 9600, 0);
        }
        assert_eq!(ledger.invested, 38400);
        assert_eq!(ledger.balance, -8400);
        let (level, reason) = ledger.alert();
        assert_eq!(level, AlertLevel::Critical);
        assert_eq!(level.investment_ratio(), 0.0);
        assert!(reason.contains("-8400"));
    }

    #[test]
    fn test_low_balance_warns() {
        let mut ledger = WeeklyLedger::start_week(30000, ymd(2026, 2, 2));
        ledger.record_day("2026-02-02", 5, 22000, 0);
        assert_eq!(ledger.balance, 8000); // under the ¥9000 threshold
        let (level, _) = ledger.alert();
        assert_eq!(level, AlertLevel::Warning);
        assert_eq!(level.investment_ratio(), 0.5);
    }

    #[test]
    fn test_returns_restore_the_balance() {
        let mut ledger = WeeklyLedger::start_week(30000, ymd(2026, 2, 2));
        ledger.record_day("2026-02-02", 5, 22000, 18000);
        assert_eq!(ledger.balance, 26000);
        let (level, _) = ledger.alert();
        assert_eq!(level, AlertLevel::Ok);
        assert!((ledger.recovery_rate() - 81.8).abs() < 0.1);
    }

    #[test]
    fn test_rerun_replaces_the_day() {
        let mut ledger = WeeklyLedger::start_week(30000, ymd(2026, 2, 2));
        ledger.record_day("2026-02-02", 5, 9600, 0);
        ledger.record_day("2026-02-02", 5, 9600, 4200);
        assert_eq!(ledger.daily.len(), 1);
        assert_eq!(ledger.invested, 9600);
        assert_eq!(ledger.returns, 4200);
    }
}
