//! Parser for the day's race list page (`race_list_sub.html`).

use std::collections::BTreeMap;

use anyhow::Result;
use regex::Regex;
use scraper::Html;

use crate::pipeline::now_stamp;
use crate::scraper::{venue_code, venue_name};
use crate::types::{DayJobs, VenueJobs};

use super::sel;

pub struct RaceListParser;

impl RaceListParser {
    /// Extract every 12-digit race id linked from the page, grouped by
    /// venue. Ids appear several times (card, odds, result links), so the
    /// list is deduped and sorted.
    pub fn parse(html: &str, ymd: &str) -> Result<DayJobs> {
        let document = Html::parse_document(html);
        let id_re = Regex::new(r"race_id=(\d{12})")?;

        let mut ids: Vec<String> = document
            .select(&sel("a[href]"))
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| id_re.captures(href))
            .map(|c| c[1].to_string())
            .collect();

        // Some page variants embed the links in scripts instead of anchors.
        if ids.is_empty() {
            ids = id_re
                .captures_iter(html)
                .map(|c| c[1].to_string())
                .collect();
        }

        ids.sort();
        ids.dedup();

        let mut by_venue: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for id in ids {
            let Some(code) = venue_code(&id) else {
                continue;
            };
            by_venue.entry(code.to_string()).or_default().push(id);
        }

        let venues: Vec<VenueJobs> = by_venue
            .into_iter()
            .map(|(code, race_ids)| VenueJobs {
                venue: venue_name(&code).unwrap_or("地方").to_string(),
                venue_code: code,
                race_ids,
            })
            .collect();

        Ok(DayJobs {
            ymd: ymd.to_string(),
            generated_at: now_stamp(),
            total_races: venues.iter().map(|v| v.race_ids.len()).sum(),
            venues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <html><body>
      <dl class="RaceList_DataList">
        <dt>門別</dt>
        <dd>
          <a href="../race/shutuba.html?race_id=202630081101&rf=race_list">1R</a>
          <a href="../race/shutuba.html?race_id=202630081102&rf=race_list">2R</a>
          <a href="../race/odds.html?race_id=202630081101&rf=race_list">odds</a>
        </dd>
        <dt>高知</dt>
        <dd>
          <a href="../race/shutuba.html?race_id=202654081103&rf=race_list">3R</a>
        </dd>
      </dl>
    </body></html>
    "#;

    #[test]
    fn test_parse_groups_by_venue() {
        let jobs = RaceListParser::parse(SAMPLE_HTML, "20260811").unwrap();
        assert_eq!(jobs.ymd, "20260811");
        assert_eq!(jobs.total_races, 3);
        assert_eq!(jobs.venues.len(), 2);

        let monbetsu = &jobs.venues[0];
        assert_eq!(monbetsu.venue_code, "30");
        assert_eq!(monbetsu.venue, "門別");
        assert_eq!(
            monbetsu.race_ids,
            vec!["202630081101".to_string(), "202630081102".to_string()]
        );

        let kochi = &jobs.venues[1];
        assert_eq!(kochi.venue, "高知");
        assert_eq!(kochi.race_ids, vec!["202654081103".to_string()]);
    }

    #[test]
    fn test_duplicate_links_deduped() {
        let jobs = RaceListParser::parse(SAMPLE_HTML, "20260811").unwrap();
        let all: Vec<&String> = jobs.venues.iter().flat_map(|v| &v.race_ids).collect();
        let mut deduped = all.clone();
        deduped.dedup();
        assert_eq!(all, deduped);
    }

    #[test]
    fn test_script_embedded_ids_fallback() {
        let html = r#"<html><body>
          <script>var races = ["race_id=202630081101", "race_id=202630081102"];</script>
        </body></html>"#;
        let jobs = RaceListParser::parse(html, "20260811").unwrap();
        assert_eq!(jobs.total_races, 2);
    }

    #[test]
    fn test_empty_page_yields_no_jobs() {
        let jobs = RaceListParser::parse("<html><body></body></html>", "20260811").unwrap();
        assert_eq!(jobs.total_races, 0);
        assert!(jobs.venues.is_empty());
    }
}
