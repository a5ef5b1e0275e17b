//! Long-run statistics across every recorded results file.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::reconcile::{DayResults, RaceStatus};
use crate::selection::Volatility;

/// Hit and money totals for one grouping bucket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bucket {
    pub races: usize,
    pub hits: usize,
    pub investment: u32,
    pub returns: u32,
    pub profit: i64,
    pub hit_rate: f64,
    pub recovery_rate: f64,
}

impl Bucket {
    fn add(&mut self, hit: bool, stake: u32, payout: u32) {
        self.races += 1;
        if hit {
            self.hits += 1;
        }
        self.investment += stake;
        self.returns += payout;
    }

    fn finish(&mut self) {
        self.profit = self.returns as i64 - self.investment as i64;
        self.hit_rate = if self.races > 0 {
            (self.hits as f64 / self.races as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        self.recovery_rate = if self.investment > 0 {
            (self.returns as f64 / self.investment as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
    }
}

/// One day's line in the statistics file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLine {
    pub ymd: String,
    #[serde(flatten)]
    pub bucket: Bucket,
}

/// Cross-day statistics (`statistics.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub generated_at: String,
    pub days: usize,
    pub overall: Bucket,
    pub daily: Vec<DailyLine>,
    /// Keyed by ISO week, e.g. "2026-W06"
    pub weekly: BTreeMap<String, Bucket>,
    /// Keyed by month, e.g. "2026-02"
    pub monthly: BTreeMap<String, Bucket>,
    pub by_venue: BTreeMap<String, Bucket>,
    pub by_volatility: BTreeMap<String, Bucket>,
}

fn volatility_key(volatility: Volatility) -> &'static str {
    match volatility {
        Volatility::Low => "low",
        Volatility::Medium => "medium",
        Volatility::High => "high",
    }
}

/// Aggregate every day's results into one statistics artifact.
///
/// Unavailable races are excluded from the per-bucket totals; they carry
/// no stake and would only dilute the hit rates.
pub fn aggregate(all_days: &[DayResults], generated_at: String) -> Statistics {
    let mut days: Vec<&DayResults> = all_days.iter().collect();
    days.sort_by(|a, b| a.ymd.cmp(&b.ymd));

    let mut overall = Bucket::default();
    let mut daily = Vec::new();
    let mut weekly: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut monthly: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut by_venue: BTreeMap<String, Bucket> = BTreeMap::new();
    let mut by_volatility: BTreeMap<String, Bucket> = BTreeMap::new();

    for day in days {
        let mut line = Bucket::default();
        let date = NaiveDate::parse_from_str(&day.ymd, "%Y%m%d").ok();
        let week_key = date.map(|d| {
            let iso = d.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        });
        let month_key = date.map(|d| format!("{}-{:02}", d.year(), d.month()));

        for race in &day.results {
            if race.status == RaceStatus::Unavailable {
                continue;
            }
            let hit = race.status == RaceStatus::Hit;
            line.add(hit, race.stake, race.payout);
            overall.add(hit, race.stake, race.payout);
            if let Some(key) = &week_key {
                weekly.entry(key.clone()).or_default().add(hit, race.stake, race.payout);
            }
            if let Some(key) = &month_key {
                monthly
                    .entry(key.clone())
                    .or_default()
                    .add(hit, race.stake, race.payout);
            }
            by_venue
                .entry(race.venue.clone())
                .or_default()
                .add(hit, race.stake, race.payout);
            by_volatility
                .entry(volatility_key(race.volatility).to_string())
                .or_default()
                .add(hit, race.stake, race.payout);
        }

        line.finish();
        daily.push(DailyLine {
            ymd: day.ymd.clone(),
            bucket: line,
        });
    }

    overall.finish();
    for bucket in weekly
        .values_mut()
        .chain(monthly.values_mut())
        .chain(by_venue.values_mut())
        .chain(by_volatility.values_mut())
    {
        bucket.finish();
    }

    Statistics {
        generated_at,
        days: daily.len(),
        overall,
        daily,
        weekly,
        monthly,
        by_venue,
        by_volatility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{summarize, ReconciledRace};

    fn race(venue: &str, volatility: Volatility, hit: bool, stake: u32, payout: u32) -> ReconciledRace {
        ReconciledRace {
            race_id: "202630081101".into(),
            venue: venue.into(),
            race_name: "テスト".into(),
            race_number: 1,
            status: if hit { RaceStatus::Hit } else { RaceStatus::Miss },
            volatility,
            predicted: vec![1, 2, 3],
            actual: vec![1, 2, 4],
            stake,
            payout,
            profit: payout as i64 - stake as i64,
        }
    }

    fn day(ymd: &str, results: Vec<ReconciledRace>) -> DayResults {
        DayResults {
            ymd: ymd.into(),
            generated_at: "2026-02-08 21:00:00".into(),
            summary: summarize(&results),
            results,
        }
    }

    #[test]
    fn test_overall_totals() {
        let days = vec![
            day(
                "20260207",
                vec![
                    race("門別", Volatility::Low, true, 1000, 2200),
                    race("高知", Volatility::Medium, false, 1300, 0),
                ],
            ),
            day("20260208", vec![race("門別", Volatility::Low, false, 1000, 0)]),
        ];
        let stats = aggregate(&days, "now".into());
        assert_eq!(stats.days, 2);
        assert_eq!(stats.overall.races, 3);
        assert_eq!(stats.overall.hits, 1);
        assert_eq!(stats.overall.investment, 3300);
        assert_eq!(stats.overall.returns, 2200);
        assert_eq!(stats.overall.profit, -1100);
        assert_eq!(stats.overall.hit_rate, 33.3);
        assert_eq!(stats.overall.recovery_rate, 66.7);
    }

    #[test]
    fn test_groupings() {
        let days = vec![
            day(
                "20260207",
                vec![
                    race("門別", Volatility::Low, true, 1000, 2200),
                    race("高知", Volatility::Medium, false, 1300, 0),
                ],
            ),
            day("20260301", vec![race("門別", Volatility::Low, true, 1000, 1500)]),
        ];
        let stats = aggregate(&days, "now".into());

        assert_eq!(stats.by_venue["門別"].races, 2);
        assert_eq!(stats.by_venue["門別"].hits, 2);
        assert_eq!(stats.by_venue["高知"].races, 1);

        assert_eq!(stats.by_volatility["low"].hits, 2);
        assert_eq!(stats.by_volatility["medium"].hits, 0);

        assert_eq!(stats.monthly["2026-02"].races, 2);
        assert_eq!(stats.monthly["2026-03"].races, 1);
        assert_eq!(stats.weekly["2026-W06"].races, 2);
    }

    #[test]
    fn test_unavailable_races_excluded() {
        let mut unavailable = race("門別", Volatility::Low, false, 0, 0);
        unavailable.status = RaceStatus::Unavailable;
        let days = vec![day("20260207", vec![unavailable])];
        let stats = aggregate(&days, "now".into());
        assert_eq!(stats.overall.races, 0);
        assert!(stats.by_venue.is_empty());
    }
}
