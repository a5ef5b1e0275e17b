//! Command-line interface and stage runners.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::investment::{allocate_stakes, daily_budget};
use crate::ledger::WeeklyLedger;
use crate::pipeline::{load_json, now_stamp, parse_ymd, save_json, save_text, today_jst, Paths};
use crate::reconcile::{reconcile, summarize, DayResults, RaceOutcome, RaceStatus};
use crate::scraper::cache::CacheCategory;
use crate::scraper::client::Fetched;
use crate::scraper::parsers::{
    PastRacesParser, RaceCardParser, RaceListParser, RaceResultParser,
};
use crate::scraper::{
    past_races_url, race_card_url, race_list_url, race_result_url, FetchClient,
};
use crate::selection::{select_races, FinalPredictions};
use crate::stats::aggregate;
use crate::types::{DayJobs, Race, RaceData};
use crate::{pace, report, running_style, scoring};

#[derive(Parser)]
#[command(name = "keiba-des")]
#[command(about = "NAR horse racing prediction and betting pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover the day's races and write the job list
    Discover {
        /// Target date (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Fetch race cards and past performances for the discovered races
    Fetch {
        /// Target date (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Classify styles, infer pace and score every entry
    Score {
        /// Target date (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Select races, build betting plans and allocate stakes
    Select {
        /// Target date (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Run discover, fetch, score and select in sequence
    Run {
        /// Target date (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Fetch official results, settle the day and update the ledger
    Results {
        /// Target date (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Aggregate statistics across every recorded day
    Stats,
    /// Manage the weekly budget ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand)]
pub enum LedgerAction {
    /// Start a fresh ledger for the week containing the given date
    Init {
        /// Weekly budget in yen, defaults to the configured budget
        #[arg(long)]
        budget: Option<u32>,
        /// Date inside the week (YYYYMMDD), defaults to today in JST
        date: Option<String>,
    },
    /// Manually record one settled day
    Record {
        /// Settled date (YYYYMMDD)
        date: String,
        #[arg(long)]
        races: usize,
        #[arg(long)]
        invested: u32,
        #[arg(long)]
        returns: u32,
    },
    /// Show the week's balance and alert level
    Summary,
}

/// Resolve an optional YYYYMMDD argument, defaulting to today in JST.
fn resolve_ymd(date: Option<String>) -> Result<(String, NaiveDate)> {
    match date {
        Some(ymd) => {
            let parsed = parse_ymd(&ymd)?;
            Ok((ymd, parsed))
        }
        None => {
            let today = today_jst();
            Ok((today.format("%Y%m%d").to_string(), today))
        }
    }
}

fn paths(config: &AppConfig) -> Paths {
    Paths::new(&config.pipeline.data_dir)
}

fn fetch_client(config: &AppConfig) -> Result<FetchClient> {
    Ok(FetchClient::new(
        &config.scraper,
        PathBuf::from(&config.pipeline.cache_dir),
    )?)
}

pub async fn run_discover(config: &AppConfig, date: Option<String>) -> Result<()> {
    let (ymd, _) = resolve_ymd(date)?;
    let paths = paths(config);
    let client = fetch_client(config)?;

    let url = race_list_url(&ymd);
    let Fetched::Page(html) = client.fetch(&url, CacheCategory::RaceList, &ymd).await? else {
        bail!("race list for {} is not published", ymd);
    };

    let jobs = RaceListParser::parse(&html, &ymd)?;
    if jobs.total_races == 0 {
        warn!(%ymd, "no races found, is this a race day?");
    }

    save_json(&paths.today_jobs(&ymd), &jobs)?;
    save_json(&paths.today_jobs_latest(), &jobs)?;

    println!("discovered {} races on {}", jobs.total_races, ymd);
    for venue in &jobs.venues {
        println!("  {} ({}): {}R", venue.venue, venue.venue_code, venue.race_ids.len());
    }
    Ok(())
}

pub async fn run_fetch(config: &AppConfig, date: Option<String>) -> Result<()> {
    let (ymd, _) = resolve_ymd(date)?;
    let paths = paths(config);
    let client = fetch_client(config)?;

    let jobs: DayJobs = load_json(&paths.today_jobs(&ymd))
        .or_else(|_| load_json(&paths.today_jobs_latest()))
        .context("no job list found, run `discover` first")?;
    if jobs.ymd != ymd {
        bail!("job list is for {}, not {}; run `discover {}`", jobs.ymd, ymd, ymd);
    }

    let mut races: Vec<Race> = Vec::new();
    let mut unavailable = 0;

    for venue in &jobs.venues {
        for race_id in &venue.race_ids {
            let card_url = race_card_url(race_id);
            let Fetched::Page(card_html) = client
                .fetch(&card_url, CacheCategory::RaceCard, race_id)
                .await?
            else {
                warn!(%race_id, "race card not available, skipping");
                unavailable += 1;
                continue;
            };
            let (info, mut horses) = match RaceCardParser::parse(&card_html, race_id) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(%race_id, error = %e, "race card unparsable, skipping");
                    unavailable += 1;
                    continue;
                }
            };

            let past_url = past_races_url(race_id);
            match client
                .fetch(&past_url, CacheCategory::PastRaces, race_id)
                .await?
            {
                Fetched::Page(past_html) => {
                    let mut past_map = PastRacesParser::parse(&past_html)?;
                    for horse in &mut horses {
                        if let Some(past) = past_map.remove(&horse.horse_id) {
                            horse.past_races = past;
                        }
                    }
                }
                Fetched::NotAvailable => {
                    warn!(%race_id, "past performances not available");
                }
            }

            races.push(Race {
                info,
                horses,
                pace: None,
            });
        }
    }

    let data = RaceData {
        ymd: ymd.clone(),
        fetched_at: now_stamp(),
        races,
    };
    save_json(&paths.race_data(&ymd), &data)?;

    println!(
        "fetched {} races for {} ({} unavailable)",
        data.races.len(),
        ymd,
        unavailable
    );
    Ok(())
}

pub fn run_score(config: &AppConfig, date: Option<String>) -> Result<()> {
    let (ymd, _) = resolve_ymd(date)?;
    let paths = paths(config);

    let mut data: RaceData = load_json(&paths.race_data(&ymd))
        .context("no race data found, run `fetch` first")?;

    for race in &mut data.races {
        for horse in &mut race.horses {
            horse.running_style = running_style::classify(&horse.past_races);
        }
        let pace = pace::infer(&race.horses);
        race.pace = Some(pace);

        let info = race.info.clone();
        let field_size = race.horses.len();
        for horse in &mut race.horses {
            let score = scoring::score_horse(horse, &info, pace, field_size, &config.scoring);
            horse.des_score = Some(score);
        }
        info!(
            race_id = %race.info.race_id,
            ?pace,
            horses = field_size,
            "scored race"
        );
    }

    save_json(&paths.race_data(&ymd), &data)?;
    println!("scored {} races for {}", data.races.len(), ymd);
    Ok(())
}

pub fn run_select(config: &AppConfig, date: Option<String>) -> Result<()> {
    let (ymd, day) = resolve_ymd(date)?;
    let paths = paths(config);

    let data: RaceData = load_json(&paths.race_data(&ymd))
        .context("no race data found, run `fetch` and `score` first")?;

    let (mut selected, skipped) = select_races(&data.races, &config.betting);

    let budget = daily_budget(&config.betting, day)?;
    let ratio = match load_json::<WeeklyLedger>(&paths.weekly_tracker()) {
        Ok(ledger) if ledger.covers(day) => {
            let (level, reason) = ledger.alert();
            info!(?level, %reason, "ledger alert applied");
            level.investment_ratio()
        }
        _ => {
            info!("no active weekly ledger, staking at full ratio");
            1.0
        }
    };
    let total_stake = allocate_stakes(&mut selected, budget, ratio, &config.betting);

    let predictions = FinalPredictions {
        ymd: ymd.clone(),
        generated_at: now_stamp(),
        total_candidates: data.races.len(),
        skipped,
        total_stake,
        selected,
    };

    save_json(&paths.final_predictions(&ymd), &predictions)?;
    save_json(&paths.latest_predictions(), &predictions)?;
    save_text(&paths.predictions_md(&ymd), &report::render_predictions(&predictions))?;

    println!(
        "selected {} of {} races for {} (total stake ¥{})",
        predictions.selected.len(),
        predictions.total_candidates,
        ymd,
        predictions.total_stake
    );
    for p in &predictions.selected {
        println!(
            "  {} {}R {:?}: {} points, ¥{}",
            p.venue, p.race_number, p.volatility, p.plan.combinations, p.plan.stake
        );
    }
    Ok(())
}

pub async fn run_results(config: &AppConfig, date: Option<String>) -> Result<()> {
    let (ymd, day) = resolve_ymd(date)?;
    let paths = paths(config);
    let client = fetch_client(config)?;

    let predictions: FinalPredictions = load_json(&paths.final_predictions(&ymd))
        .context("no predictions found, run `select` first")?;

    let mut results = Vec::new();
    for prediction in &predictions.selected {
        let url = race_result_url(&prediction.race_id);
        let outcome: Option<RaceOutcome> = match client
            .fetch(&url, CacheCategory::RaceResult, &prediction.race_id)
            .await?
        {
            Fetched::Page(html) => RaceResultParser::parse(&html, &prediction.race_id)?,
            Fetched::NotAvailable => None,
        };
        if outcome.is_none() {
            warn!(race_id = %prediction.race_id, "result not available yet");
        }
        results.push(reconcile(prediction, outcome.as_ref()));
    }

    let summary = summarize(&results);
    let day_results = DayResults {
        ymd: ymd.clone(),
        generated_at: now_stamp(),
        summary,
        results,
    };

    save_json(&paths.race_results(&ymd), &day_results)?;
    save_json(
        &paths.results_summary(&ymd),
        &serde_json::json!({
            "ymd": &day_results.ymd,
            "generated_at": &day_results.generated_at,
            "summary": &day_results.summary,
        }),
    )?;
    save_text(&paths.results_summary_md(&ymd), &report::render_results(&day_results))?;

    // Settle the day into the weekly ledger.
    match load_json::<WeeklyLedger>(&paths.weekly_tracker()) {
        Ok(mut ledger) if ledger.covers(day) => {
            let settled = day_results
                .results
                .iter()
                .filter(|r| r.status != RaceStatus::Unavailable)
                .count();
            ledger.record_day(
                &day.format("%Y-%m-%d").to_string(),
                settled,
                day_results.summary.total_investment,
                day_results.summary.total_return,
            );
            let (level, reason) = ledger.alert();
            save_json(&paths.weekly_tracker(), &ledger)?;
            println!("ledger: balance ¥{} ({:?}: {})", ledger.balance, level, reason);
        }
        _ => info!("no active weekly ledger, day not recorded"),
    }

    let s = &day_results.summary;
    println!(
        "{}: {}R, hit {} / miss {} / unavailable {}",
        ymd, s.total_races, s.hit_count, s.miss_count, s.unavailable_count
    );
    println!(
        "invested ¥{} / returned ¥{} / profit ¥{} (recovery {:.1}%)",
        s.total_investment, s.total_return, s.total_profit, s.recovery_rate
    );
    Ok(())
}

pub fn run_stats(config: &AppConfig) -> Result<()> {
    let paths = paths(config);

    let mut all_days = Vec::new();
    for path in paths.all_race_results()? {
        match load_json::<DayResults>(&path) {
            Ok(day) => all_days.push(day),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable results file"),
        }
    }
    if all_days.is_empty() {
        bail!("no results recorded yet");
    }

    let stats = aggregate(&all_days, now_stamp());
    save_json(&paths.statistics(), &stats)?;

    let o = &stats.overall;
    println!("{} days / {} races", stats.days, o.races);
    println!(
        "hits {} ({:.1}%), invested ¥{}, returned ¥{}, profit ¥{}, recovery {:.1}%",
        o.hits, o.hit_rate, o.investment, o.returns, o.profit, o.recovery_rate
    );
    Ok(())
}

pub fn run_ledger(config: &AppConfig, action: LedgerAction) -> Result<()> {
    let paths = paths(config);

    match action {
        LedgerAction::Init { budget, date } => {
            let (_, day) = resolve_ymd(date)?;
            let budget = budget.unwrap_or(config.betting.weekly_budget);
            if budget < config.betting.min_weekly_budget {
                bail!(
                    "weekly budget ¥{} is below the ¥{} minimum",
                    budget,
                    config.betting.min_weekly_budget
                );
            }
            let ledger = WeeklyLedger::start_week(budget, day);
            save_json(&paths.weekly_tracker(), &ledger)?;
            println!(
                "started week {} .. {} with ¥{}",
                ledger.week_start, ledger.week_end, ledger.initial_budget
            );
        }
        LedgerAction::Record {
            date,
            races,
            invested,
            returns,
        } => {
            let day = parse_ymd(&date)?;
            let mut ledger: WeeklyLedger = load_json(&paths.weekly_tracker())
                .context("no ledger found, run `ledger init` first")?;
            if !ledger.covers(day) {
                bail!("{} is outside the tracked week {} .. {}", date, ledger.week_start, ledger.week_end);
            }
            ledger.record_day(&day.format("%Y-%m-%d").to_string(), races, invested, returns);
            save_json(&paths.weekly_tracker(), &ledger)?;
            println!("recorded {}: invested ¥{}, returned ¥{}", date, invested, returns);
        }
        LedgerAction::Summary => {
            let ledger: WeeklyLedger = load_json(&paths.weekly_tracker())
                .context("no ledger found, run `ledger init` first")?;
            let (level, reason) = ledger.alert();
            println!("week {} .. {}", ledger.week_start, ledger.week_end);
            println!(
                "budget ¥{} / invested ¥{} / returned ¥{} / balance ¥{}",
                ledger.initial_budget, ledger.invested, ledger.returns, ledger.balance
            );
            println!("recovery {:.1}%", ledger.recovery_rate());
            for d in &ledger.daily {
                println!(
                    "  {}: {}R, ¥{} -> ¥{} ({}¥{})",
                    d.date,
                    d.races,
                    d.invested,
                    d.returns,
                    if d.profit >= 0 { "+" } else { "-" },
                    d.profit.abs()
                );
            }
            println!("alert: {:?} ({})", level, reason);
        }
    }
    Ok(())
}

pub async fn run_pipeline(config: &AppConfig, date: Option<String>) -> Result<()> {
    let (ymd, _) = resolve_ymd(date)?;
    run_discover(config, Some(ymd.clone())).await?;
    run_fetch(config, Some(ymd.clone())).await?;
    run_score(config, Some(ymd.clone()))?;
    run_select(config, Some(ymd))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_date() {
        let (ymd, day) = resolve_ymd(Some("20260207".into())).unwrap();
        assert_eq!(ymd, "20260207");
        assert_eq!(day, NaiveDate::from_ymd_opt(2026, 2, 7).unwrap());
    }

    #[test]
    fn test_resolve_rejects_bad_date() {
        assert!(resolve_ymd(Some("2026-02-07".into())).is_err());
        assert!(resolve_ymd(Some("garbage".into())).is_err());
    }

    #[test]
    fn test_resolve_defaults_to_today() {
        let (ymd, day) = resolve_ymd(None).unwrap();
        assert_eq!(ymd, day.format("%Y%m%d").to_string());
        assert_eq!(ymd.len(), 8);
    }
}
