//! Web scraper module for nar.netkeiba.com
//!
//! Provides a rate-limited HTTP client, HTML parsing, and the NAR venue
//! and race-id conventions.

pub mod cache;
pub mod client;
pub mod parsers;
pub mod rate_limiter;

pub use client::FetchClient;

/// Base URLs for nar.netkeiba.com
pub const NAR_BASE_URL: &str = "https://nar.netkeiba.com";
pub const NAR_SP_BASE_URL: &str = "https://nar.sp.netkeiba.com";

/// Build the day's race list URL
pub fn race_list_url(ymd: &str) -> String {
    format!(
        "{}/top/race_list_sub.html?kaisai_date={}",
        NAR_BASE_URL, ymd
    )
}

/// Build race card URL
pub fn race_card_url(race_id: &str) -> String {
    format!("{}/race/shutuba.html?race_id={}", NAR_BASE_URL, race_id)
}

/// Build past-performance URL for a race card
pub fn past_races_url(race_id: &str) -> String {
    format!(
        "{}/race/shutuba_past.html?race_id={}",
        NAR_BASE_URL, race_id
    )
}

/// Build race result URL (the SP page carries payouts reliably)
pub fn race_result_url(race_id: &str) -> String {
    format!(
        "{}/race/race_result.html?race_id={}",
        NAR_SP_BASE_URL, race_id
    )
}

/// NAR venue names by the two-digit code inside the race id
pub fn venue_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "30" => "門別",
        "35" => "盛岡",
        "36" => "水沢",
        "42" => "浦和",
        "43" => "船橋",
        "44" => "大井",
        "45" => "川崎",
        "46" => "金沢",
        "47" => "笠松",
        "48" => "名古屋",
        "50" => "園田",
        "51" => "姫路",
        "54" => "高知",
        "55" => "佐賀",
        "65" => "帯広ば",
        _ => return None,
    };
    Some(name)
}

/// Venue code embedded in a 12-digit race id (positions 4-5)
pub fn venue_code(race_id: &str) -> Option<&str> {
    if race_id.len() != 12 || !race_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    race_id.get(4..6)
}

/// Race number embedded in a 12-digit race id (last two digits)
pub fn race_number(race_id: &str) -> Option<u8> {
    if race_id.len() != 12 {
        return None;
    }
    race_id.get(10..12)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_list_url() {
        assert_eq!(
            race_list_url("20260207"),
            "https://nar.netkeiba.com/top/race_list_sub.html?kaisai_date=20260207"
        );
    }

    #[test]
    fn test_race_card_url() {
        assert_eq!(
            race_card_url("202630081101"),
            "https://nar.netkeiba.com/race/shutuba.html?race_id=202630081101"
        );
    }

    #[test]
    fn test_race_result_url_uses_sp_host() {
        assert!(race_result_url("202630081101").starts_with("https://nar.sp.netkeiba.com"));
    }

    #[test]
    fn test_race_id_fields() {
        assert_eq!(venue_code("202630081101"), Some("30"));
        assert_eq!(venue_name("30"), Some("門別"));
        assert_eq!(race_number("202630081101"), Some(1));
        assert_eq!(race_number("202654081112"), Some(12));
        assert_eq!(venue_code("20263008110"), None);
        assert_eq!(venue_code("2026300811ab"), None);
    }

    #[test]
    fn test_unknown_venue_code() {
        assert_eq!(venue_name("99"), None);
    }
}
