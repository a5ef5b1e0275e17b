//! Race selection: volatility judgement and picking the day's card.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::betting::{build_plan, BettingPlan, RankedHorse};
use crate::config::BettingConfig;
use crate::scoring::Confidence;
use crate::types::{HorseEntry, Race};

/// How open a race looks, judged from the score spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

impl Volatility {
    /// Selection priority, lower is preferred
    fn priority(self) -> u8 {
        match self {
            Volatility::Low => 0,
            Volatility::Medium => 1,
            Volatility::High => 2,
        }
    }
}

/// Gap between ranks 1 and 3 at or below this means a wide-open race
const HIGH_GAP: f64 = 5.0;
/// Gap between ranks 1 and 3 at or above this means a settled race
const LOW_GAP: f64 = 10.0;

/// Judge volatility from scores sorted in descending order.
///
/// Monotone in the gap between the first and third score: at most
/// `HIGH_GAP` is high, at least `LOW_GAP` is low, in between is medium.
/// Fields with fewer than three scored horses are treated as low with an
/// explicit reason, since a trio axis cannot be spread any wider.
pub fn judge_volatility(sorted_scores: &[f64]) -> (Volatility, String) {
    if sorted_scores.len() < 3 {
        return (Volatility::Low, "field too small to spread".to_string());
    }
    let gap = sorted_scores[0] - sorted_scores[2];
    if gap <= HIGH_GAP {
        (
            Volatility::High,
            format!("top three within {:.1} points", gap),
        )
    } else if gap >= LOW_GAP {
        (
            Volatility::Low,
            format!("leader clear by {:.1} points over third", gap),
        )
    } else {
        (Volatility::Medium, format!("{:.1}-point spread", gap))
    }
}

/// One scored horse in a prediction, in rank order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedHorse {
    pub rank: usize,
    pub horse_number: u8,
    pub name: String,
    pub mark: String,
    pub total: f64,
    pub confidence: Confidence,
}

/// A selected race with its betting plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub race_id: String,
    pub race_name: String,
    pub venue: String,
    pub race_number: u8,
    pub distance: u32,
    pub volatility: Volatility,
    pub volatility_reason: String,
    pub horses: Vec<PredictedHorse>,
    pub plan: BettingPlan,
    /// Where the picks and the betting market disagree
    #[serde(default)]
    pub market_warnings: Vec<String>,
}

/// Day-level artifact of the selection stage (`final_predictions_{ymd}.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalPredictions {
    pub ymd: String,
    pub generated_at: String,
    pub total_candidates: usize,
    pub skipped: usize,
    pub total_stake: u32,
    pub selected: Vec<Prediction>,
}

struct Candidate {
    prediction: Prediction,
    rank_score: f64,
}

/// Pick the day's races to bet.
///
/// Prefers low and medium volatility, falling back to high only when the
/// minimum card cannot be filled otherwise. Ties resolve by the top-three
/// average score plus a completeness bonus for horses with at least two
/// recorded past races.
pub fn select_races(races: &[Race], config: &BettingConfig) -> (Vec<Prediction>, usize) {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut skipped = 0;

    for race in races {
        match build_candidate(race, config) {
            Some(candidate) => candidates.push(candidate),
            None => {
                skipped += 1;
                debug!(race_id = %race.info.race_id, "skipped: no usable scores");
            }
        }
    }

    candidates.sort_by(|a, b| {
        let pa = a.prediction.volatility.priority();
        let pb = b.prediction.volatility.priority();
        pa.cmp(&pb).then(
            b.rank_score
                .partial_cmp(&a.rank_score)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    let mut selected: Vec<Prediction> = candidates
        .iter()
        .filter(|c| c.prediction.volatility != Volatility::High)
        .take(config.max_races)
        .map(|c| c.prediction.clone())
        .collect();

    if selected.len() < config.min_races {
        for candidate in &candidates {
            if selected.len() >= config.min_races {
                break;
            }
            if candidate.prediction.volatility == Volatility::High {
                selected.push(candidate.prediction.clone());
            }
        }
    }

    for prediction in &selected {
        for warning in &prediction.market_warnings {
            warn!(race_id = %prediction.race_id, "{}", warning);
        }
    }

    info!(
        candidates = candidates.len(),
        skipped,
        selected = selected.len(),
        "race selection done"
    );
    (selected, skipped)
}

/// Market popularity rank at or beyond this counts as weakly backed
const UNPOPULAR_RANK: u8 = 5;

/// Cross-check the picks against the betting market.
///
/// Flags a weakly backed top pick, a market favorite the model left out
/// of its top three, and an axis made up entirely of outsiders. Races
/// without popularity data produce no warnings.
fn market_warnings(race: &Race, axis: &[u8]) -> Vec<String> {
    let mut warnings = Vec::new();
    let axis_horses: Vec<&HorseEntry> = axis
        .iter()
        .filter_map(|n| race.horses.iter().find(|h| h.horse_number == *n))
        .collect();

    if let Some(top) = axis_horses.first() {
        if let Some(pop) = top.popularity {
            if pop >= UNPOPULAR_RANK {
                let odds = top
                    .win_odds
                    .map(|o| format!(", odds {:.1}", o))
                    .unwrap_or_default();
                warnings.push(format!(
                    "top pick {} ({}) is market rank {}{}",
                    top.horse_number, top.name, pop, odds
                ));
            }
        }
    }

    if let Some(favorite) = race.horses.iter().find(|h| h.popularity == Some(1)) {
        if !axis.contains(&favorite.horse_number) {
            warnings.push(format!(
                "market favorite {} ({}) is outside the predicted top three",
                favorite.horse_number, favorite.name
            ));
        }
    }

    let ranks: Vec<u8> = axis_horses.iter().filter_map(|h| h.popularity).collect();
    if ranks.len() == 3 && ranks.iter().all(|&p| p >= UNPOPULAR_RANK) {
        warnings.push(format!(
            "every axis pick is market rank {} or worse",
            UNPOPULAR_RANK
        ));
    }

    warnings
}

fn build_candidate(race: &Race, config: &BettingConfig) -> Option<Candidate> {
    let mut ranked: Vec<RankedHorse> = race
        .horses
        .iter()
        .filter_map(|h| {
            let score = h.des_score.as_ref()?;
            Some(RankedHorse {
                horse_number: h.horse_number,
                name: h.name.clone(),
                total: score.total,
                confidence: score.confidence,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let plan = build_plan(&ranked, race.horses.len(), config.bet_unit)?;
    let market_warnings = market_warnings(race, &plan.axis);

    let sorted_scores: Vec<f64> = ranked.iter().map(|h| h.total).collect();
    let (volatility, volatility_reason) = judge_volatility(&sorted_scores);

    let avg_top3 = sorted_scores.iter().take(3).sum::<f64>() / 3.0;
    let completeness = race
        .horses
        .iter()
        .filter(|h| h.past_races.len() >= 2)
        .count() as f64;

    let marks = ["◎", "○", "▲"];
    let shown = 3 + plan.opponents.len();
    let horses = ranked
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, h)| PredictedHorse {
            rank: i + 1,
            horse_number: h.horse_number,
            name: h.name.clone(),
            mark: marks.get(i).unwrap_or(&"△").to_string(),
            total: h.total,
            confidence: h.confidence,
        })
        .collect();

    Some(Candidate {
        prediction: Prediction {
            race_id: race.info.race_id.clone(),
            race_name: race.info.name.clone(),
            venue: race.info.venue.clone(),
            race_number: race.info.race_number,
            distance: race.info.distance,
            volatility,
            volatility_reason,
            horses,
            plan,
            market_warnings,
        },
        rank_score: avg_top3 + completeness,
    })
}
