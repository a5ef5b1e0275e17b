//! Parser for the race result page (`race_result.html`).

use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::reconcile::RaceOutcome;

use super::{sel, text_flat};

pub struct RaceResultParser;

/// Result tables across PC and SP page variants, most specific first
const RESULT_TABLE_SELECTORS: [&str; 5] = [
    "table.All_Result_Table",
    "table.ResultMain",
    "table.result_table",
    "table.RaceResultTable",
    "table",
];

const PAYOUT_TABLE_SELECTORS: [&str; 2] = ["table.Payout_Detail_Table", "table.payout_table"];

impl RaceResultParser {
    /// Parse the top three finishers and the trio payout.
    ///
    /// Returns `Ok(None)` when the page exists but the order is not
    /// complete yet (provisional results right after the off).
    pub fn parse(html: &str, race_id: &str) -> Result<Option<RaceOutcome>> {
        let document = Html::parse_document(html);

        let Some(finishing_order) = parse_finishing_order(&document) else {
            return Ok(None);
        };
        let trio_payout = parse_trio_payout(&document)?;

        Ok(Some(RaceOutcome {
            race_id: race_id.to_string(),
            finishing_order,
            trio_payout,
        }))
    }
}

fn parse_finishing_order(document: &Html) -> Option<Vec<u8>> {
    for selector in RESULT_TABLE_SELECTORS {
        for table in document.select(&sel(selector)) {
            let order = top3_from_table(&table);
            if order.len() == 3 {
                return Some(order);
            }
        }
    }
    None
}

/// Rows whose first cell is a finishing position 1-3; the second cell is
/// the horse number on both page variants.
fn top3_from_table(table: &ElementRef) -> Vec<u8> {
    let mut order = Vec::new();
    for row in table.select(&sel("tr")) {
        let cells: Vec<String> = row.select(&sel("td")).map(|c| text_flat(&c)).collect();
        if cells.len() < 2 {
            continue;
        }
        let position = cells[0].trim();
        if !matches!(position, "1" | "2" | "3") {
            continue;
        }
        if let Ok(number) = cells[1].trim().parse::<u8>() {
            order.push(number);
        }
        if order.len() == 3 {
            break;
        }
    }
    order
}

fn parse_trio_payout(document: &Html) -> Result<u32> {
    let yen_re = Regex::new(r"([\d,]+)円?")?;
    for selector in PAYOUT_TABLE_SELECTORS {
        for table in document.select(&sel(selector)) {
            for row in table.select(&sel("tr")) {
                let cells: Vec<String> = row
                    .select(&sel("td, th"))
                    .map(|c| text_flat(&c))
                    .collect();
                let Some(label_idx) = cells.iter().position(|c| c.contains("三連複")) else {
                    continue;
                };
                for cell in &cells[label_idx + 1..] {
                    if let Some(captures) = yen_re.captures(cell) {
                        if let Ok(payout) = captures[1].replace(',', "").parse() {
                            return Ok(payout);
                        }
                    }
                }
            }
        }
    }
    Ok(0)
}
