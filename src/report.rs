//! Markdown rendering of predictions and result summaries.

use std::fmt::Write;

use crate::reconcile::{DayResults, RaceStatus};
use crate::selection::{FinalPredictions, Volatility};

fn volatility_label(volatility: Volatility) -> &'static str {
    match volatility {
        Volatility::Low => "低",
        Volatility::Medium => "中",
        Volatility::High => "高",
    }
}

fn format_ymd(ymd: &str) -> String {
    if ymd.len() == 8 {
        format!("{}/{}/{}", &ymd[..4], &ymd[4..6], &ymd[6..8])
    } else {
        ymd.to_string()
    }
}

/// Render the day's predictions (`predictions_{ymd}.md`).
pub fn render_predictions(predictions: &FinalPredictions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# 本日の予想 {}\n", format_ymd(&predictions.ymd));
    let _ = writeln!(
        out,
        "- 選定レース: {}R（候補{}R / 見送り{}R）",
        predictions.selected.len(),
        predictions.total_candidates,
        predictions.skipped
    );
    let _ = writeln!(out, "- 総投資額: ¥{}\n", predictions.total_stake);

    for (i, p) in predictions.selected.iter().enumerate() {
        let _ = writeln!(
            out,
            "## {}. {} {}R {} ({}m)\n",
            i + 1,
            p.venue,
            p.race_number,
            p.race_name,
            p.distance
        );
        let _ = writeln!(
            out,
            "- 波乱度: {} — {}",
            volatility_label(p.volatility),
            p.volatility_reason
        );
        let _ = writeln!(
            out,
            "- 買い目: 三連複 {}点 @¥{} = ¥{}\n",
            p.plan.combinations, p.plan.unit_price, p.plan.stake
        );
        for warning in &p.market_warnings {
            let _ = writeln!(out, "- ⚠️ {}", warning);
        }
        if !p.market_warnings.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "| 印 | 馬番 | 馬名 | スコア |");
        let _ = writeln!(out, "|----|------|------|--------|");
        for horse in &p.horses {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.1} |",
                horse.mark, horse.horse_number, horse.name, horse.total
            );
        }
        out.push('\n');
    }
    out
}

/// Render the day's results (`results_summary_{ymd}.md`).
pub fn render_results(results: &DayResults) -> String {
    let s = &results.summary;
    let mut out = String::new();
    let _ = writeln!(out, "# 結果サマリー {}\n", format_ymd(&results.ymd));
    let _ = writeln!(
        out,
        "- 対象: {}R（的中{} / 不的中{} / 取得不可{}）",
        s.total_races, s.hit_count, s.miss_count, s.unavailable_count
    );
    let _ = writeln!(out, "- 的中率: {:.1}%", s.hit_rate);
    let _ = writeln!(
        out,
        "- 投資 ¥{} / 払戻 ¥{} / 収支 {}¥{}",
        s.total_investment,
        s.total_return,
        if s.total_profit >= 0 { "+" } else { "-" },
        s.total_profit.abs()
    );
    let _ = writeln!(out, "- 回収率: {:.1}%\n", s.recovery_rate);

    for race in &results.results {
        let status = match race.status {
            RaceStatus::Hit => "✅ 的中",
            RaceStatus::Miss => "❌ 不的中",
            RaceStatus::Unavailable => "⚠️ 結果取得不可",
        };
        let _ = writeln!(
            out,
            "## {} {}R {} — {}\n",
            race.venue, race.race_number, race.race_name, status
        );
        let predicted: Vec<String> = race.predicted.iter().map(|n| n.to_string()).collect();
        let _ = writeln!(out, "- 予想: {}", predicted.join("-"));
        if !race.actual.is_empty() {
            let actual: Vec<String> = race.actual.iter().map(|n| n.to_string()).collect();
            let _ = writeln!(out, "- 結果: {}", actual.join("-"));
        }
        let _ = writeln!(
            out,
            "- 投資 ¥{} / 払戻 ¥{} / 収支 {}¥{}\n",
            race.stake,
            race.payout,
            if race.profit >= 0 { "+" } else { "-" },
            race.profit.abs()
        );
    }
    out
}
