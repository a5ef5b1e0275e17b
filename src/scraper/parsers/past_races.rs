//! Parser for the past-performance page (`shutuba_past.html`).
//!
//! Each entry row carries up to five compact past-race cells. The cells
//! are free text rather than structured columns, so fields are pulled out
//! with small independent regexes and each one is optional.

use std::collections::HashMap;

use anyhow::Result;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::types::{PastRace, Surface};

use super::{sel, text_lines};

pub struct PastRacesParser;

struct CellPatterns {
    date: Regex,
    venue: Regex,
    course: Regex,
    time: Regex,
    condition: Regex,
    field: Regex,
    jockey: Regex,
    corners: Regex,
    weight: Regex,
}

impl CellPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            date: Regex::new(r"(\d{4})\.(\d{2})\.(\d{2})")?,
            venue: Regex::new(r"\d{4}\.\d{2}\.\d{2}\s+([^\s\d]+)")?,
            course: Regex::new(r"(ダ|芝)(\d{3,4})")?,
            time: Regex::new(r"(\d{1,2}:\d{2}\.\d)")?,
            condition: Regex::new(r"(?m)^(良|稍重|重|不良)$")?,
            field: Regex::new(r"(\d+)頭\s+(\d+)番\s+(\d+)人")?,
            jockey: Regex::new(r"\d+人\s+(\S+)\s+(\d{2}(?:\.\d)?)")?,
            corners: Regex::new(r"(\d+(?:-\d+)+)")?,
            weight: Regex::new(r"\((\d{2}\.\d)\)\s*(\d{3})\(([+-]?\d+)\)")?,
        })
    }
}

impl PastRacesParser {
    /// Parse past races for every horse on the page, keyed by horse id.
    ///
    /// Horses without past-race cells (debut runners) map to an empty
    /// list, so the caller can tell "first start" from "row not found".
    pub fn parse(html: &str) -> Result<HashMap<String, Vec<PastRace>>> {
        let document = Html::parse_document(html);
        let patterns = CellPatterns::new()?;
        let id_re = Regex::new(r"/horse/(\d+)")?;

        let mut result = HashMap::new();
        for row in document.select(&sel("tr.HorseList")) {
            let Some(horse_id) = row
                .select(&sel("a[href*='/horse/']"))
                .filter_map(|a| a.value().attr("href"))
                .find_map(|href| id_re.captures(href).map(|c| c[1].to_string()))
            else {
                continue;
            };

            let past_races: Vec<PastRace> = row
                .select(&sel("td[class*='Past']"))
                .filter_map(|cell| parse_past_cell(&cell, &patterns))
                .collect();

            result.insert(horse_id, past_races);
        }
        Ok(result)
    }
}

fn parse_past_cell(cell: &ElementRef, patterns: &CellPatterns) -> Option<PastRace> {
    let text = text_lines(cell);

    let date = patterns
        .date
        .captures(&text)
        .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]))?;
    let course = patterns.course.captures(&text)?;
    let surface = Surface::from_marker(&course[1])?;
    let distance: u32 = course[2].parse().ok()?;

    let venue = patterns
        .venue
        .captures(&text)
        .map(|c| c[1].to_string())
        .unwrap_or_default();
    let finish_time = patterns.time.captures(&text).map(|c| c[1].to_string());
    let track_condition = patterns.condition.captures(&text).map(|c| c[1].to_string());

    let (field_size, post_position, popularity) = match patterns.field.captures(&text) {
        Some(c) => (c[1].parse().ok(), c[2].parse().ok(), c[3].parse().ok()),
        None => (None, None, None),
    };

    let (jockey, weight_carried) = match patterns.jockey.captures(&text) {
        Some(c) => (Some(c[1].to_string()), c[2].parse().ok()),
        None => (None, None),
    };

    let corner_positions = patterns.corners.captures(&text).map(|c| c[1].to_string());

    let (last_3f, horse_weight, weight_change) = match patterns.weight.captures(&text) {
        Some(c) => (c[1].parse().ok(), c[2].parse().ok(), c[3].parse().ok()),
        None => (None, None, None),
    };

    Some(PastRace {
        date,
        venue,
        distance,
        surface,
        track_condition,
        finish_position: None,
        field_size,
        post_position,
        popularity,
        jockey,
        weight_carried,
        finish_time,
        last_3f,
        corner_positions,
        horse_weight,
        weight_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <html><body>
      <table class="Shutuba_Past5_Table">
        <tbody>
          <tr class="HorseList">
            <td class="Umaban">1</td>
            <td class="Horse_Info"><a href="https://db.netkeiba.com/horse/2022104567">サンプルホース</a></td>
            <td class="Past Past01">
              <div>2026.01.12 高知</div>
              <div>3歳-5</div>
              <div>ダ1300 1:29.5</div>
              <div>良</div>
              <div>8頭 8番 8人 西森将司 55.0</div>
              <div>4-4-5-4 (40.9) 392(-1)</div>
            </td>
            <td class="Past Past02">
              <div>2025.12.28 高知</div>
              <div>3歳-6</div>
              <div>ダ1400 1:35.2</div>
              <div>稍重</div>
              <div>10頭 2番 4人 多田羅誠 55.0</div>
              <div>2-2-2-1 (41.3) 394(+2)</div>
            </td>
          </tr>
          <tr class="HorseList">
            <td class="Umaban">2</td>
            <td class="Horse_Info"><a href="https://db.netkeiba.com/horse/2023100001">シンバホース</a></td>
          </tr>
        </tbody>
      </table>
    </body></html>
    "#;

    #[test]
    fn test_parse_two_past_races() {
        let map = PastRacesParser::parse(SAMPLE_HTML).unwrap();
        let races = &map["2022104567"];
        assert_eq!(races.len(), 2);

        let first = &races[0];
        assert_eq!(first.date, "2026-01-12");
        assert_eq!(first.venue, "高知");
        assert_eq!(first.surface, Surface::Dirt);
        assert_eq!(first.distance, 1300);
        assert_eq!(first.finish_time.as_deref(), Some("1:29.5"));
        assert_eq!(first.track_condition.as_deref(), Some("良"));
        assert_eq!(first.field_size, Some(8));
        assert_eq!(first.post_position, Some(8));
        assert_eq!(first.popularity, Some(8));
        assert_eq!(first.jockey.as_deref(), Some("西森将司"));
        assert_eq!(first.weight_carried, Some(55.0));
        assert_eq!(first.corner_positions.as_deref(), Some("4-4-5-4"));
        assert_eq!(first.last_3f, Some(40.9));
        assert_eq!(first.horse_weight, Some(392));
        assert_eq!(first.weight_change, Some(-1));
        assert_eq!(first.finish(), Some(4));

        let second = &races[1];
        assert_eq!(second.date, "2025-12-28");
        assert_eq!(second.weight_change, Some(2));
        assert_eq!(second.finish(), Some(1));
    }

    #[test]
    fn test_debut_horse_maps_to_empty_list() {
        let map = PastRacesParser::parse(SAMPLE_HTML).unwrap();
        assert_eq!(map["2023100001"].len(), 0);
    }

    #[test]
    fn test_partial_cell_still_parses() {
        let html = r#"
        <table><tbody>
          <tr class="HorseList">
            <td><a href="/horse/2021100222">ブブカホース</a></td>
            <td class="Past Past01">
              <div>2025.11.03 盛岡</div>
              <div>ダ1600</div>
            </td>
          </tr>
        </tbody></table>"#;
        let map = PastRacesParser::parse(html).unwrap();
        let races = &map["2021100222"];
        assert_eq!(races.len(), 1);
        assert_eq!(races[0].distance, 1600);
        assert!(races[0].corner_positions.is_none());
        assert!(races[0].finish().is_none());
    }
}
