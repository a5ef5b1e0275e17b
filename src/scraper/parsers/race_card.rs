//! Parser for the race card page (`shutuba.html`).

use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::scraper::{race_number, venue_code, venue_name};
use crate::types::{HorseEntry, RaceInfo, Surface};

use super::{sel, text_flat};

pub struct RaceCardParser;

impl RaceCardParser {
    /// Parse the race header and every valid entry.
    ///
    /// Entries without a horse id or horse number are dropped; they are
    /// scratches or placeholder rows.
    pub fn parse(html: &str, race_id: &str) -> Result<(RaceInfo, Vec<HorseEntry>)> {
        let document = Html::parse_document(html);
        let info = parse_race_info(&document, race_id)?;

        let mut horses = Vec::new();
        for row_selector in ["tr.HorseList", ".Shutuba_Table tbody tr", "table.ShutubaTable tr"] {
            for row in document.select(&sel(row_selector)) {
                if let Some(entry) = parse_entry_row(&row) {
                    horses.push(entry);
                }
            }
            if !horses.is_empty() {
                break;
            }
        }

        if horses.is_empty() {
            return Err(anyhow!("no entries found on race card {}", race_id));
        }

        Ok((info, horses))
    }
}

fn parse_race_info(document: &Html, race_id: &str) -> Result<RaceInfo> {
    let name = ["div.RaceName", "h1.RaceName", ".RaceName"]
        .iter()
        .find_map(|s| document.select(&sel(s)).next())
        .map(|e| text_flat(&e))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("race name not found for {}", race_id))?;

    let data01 = document
        .select(&sel("div.RaceData01"))
        .next()
        .map(|e| text_flat(&e))
        .unwrap_or_default();

    let course_re = Regex::new(r"(ダ|芝)(\d{3,4})m")?;
    let captures = course_re
        .captures(&data01)
        .ok_or_else(|| anyhow!("course not found in '{}'", data01))?;
    let surface = Surface::from_marker(&captures[1])
        .ok_or_else(|| anyhow!("unknown surface marker in '{}'", data01))?;
    let distance: u32 = captures[2].parse()?;

    let time_re = Regex::new(r"(\d{1,2}:\d{2})発走")?;
    let post_time = time_re.captures(&data01).map(|c| c[1].to_string());

    let data02 = document
        .select(&sel("div.RaceData02"))
        .next()
        .map(|e| text_flat(&e))
        .unwrap_or_default();
    let weight_rule = ["ハンデ", "別定", "定量", "馬齢"]
        .iter()
        .find(|rule| data02.contains(*rule))
        .map(|rule| rule.to_string());

    let venue = venue_code(race_id)
        .and_then(venue_name)
        .unwrap_or("地方")
        .to_string();

    Ok(RaceInfo {
        race_id: race_id.to_string(),
        name,
        venue,
        race_number: race_number(race_id).unwrap_or(0),
        distance,
        surface,
        post_time,
        weight_rule,
    })
}

fn parse_entry_row(row: &ElementRef) -> Option<HorseEntry> {
    let horse_link = row.select(&sel("a[href*='/horse/']")).next()?;
    let href = horse_link.value().attr("href")?;
    let id_re = Regex::new(r"/horse/(\d+)").ok()?;
    let horse_id = id_re.captures(href)?[1].to_string();
    let name = text_flat(&horse_link);
    if horse_id.is_empty() || name.is_empty() {
        return None;
    }

    let horse_number = cell_number(row, &["td[class*='Umaban']"])?;
    if horse_number == 0 {
        return None;
    }
    let draw = cell_number(row, &["td[class*='Waku']"]);

    // Sex and age share one cell, e.g. "牡3"
    let barei = row
        .select(&sel("td.Barei"))
        .next()
        .map(|e| text_flat(&e))
        .unwrap_or_default();
    let barei_re = Regex::new(r"([牡牝セせん騙])(\d{1,2})").ok()?;
    let (sex, age) = match barei_re.captures(&barei) {
        Some(c) => (Some(c[1].to_string()), c[2].parse().ok()),
        None => (None, None),
    };

    let jockey = row
        .select(&sel("td.Jockey a"))
        .next()
        .map(|e| text_flat(&e))
        .filter(|t| !t.is_empty());
    let trainer = row
        .select(&sel("td.Trainer a"))
        .next()
        .map(|e| text_flat(&e))
        .filter(|t| !t.is_empty());

    let row_text = text_flat(row);
    let carried_re = Regex::new(r"\b([4-6]\d(?:\.\d)?)\b").ok()?;
    let weight_carried = carried_re
        .captures(&row_text)
        .and_then(|c| c[1].parse().ok());

    let win_odds = row
        .select(&sel("td.Popular span, span[id^='odds-']"))
        .next()
        .and_then(|e| text_flat(&e).parse().ok());
    let popularity = row
        .select(&sel("td.Popular_Ninki span, td.Popular_Ninki"))
        .next()
        .and_then(|e| text_flat(&e).replace("人気", "").trim().parse().ok());

    Some(HorseEntry {
        horse_id,
        horse_number,
        draw,
        name,
        sex,
        age,
        jockey,
        trainer,
        weight_carried,
        win_odds,
        popularity,
        past_races: Vec::new(),
        running_style: None,
        des_score: None,
    })
}

fn cell_number(row: &ElementRef, selectors: &[&str]) -> Option<u8> {
    selectors
        .iter()
        .find_map(|s| row.select(&sel(s)).next())
        .and_then(|e| text_flat(&e).parse().ok())
}
