//! HTML parsers for nar.netkeiba.com pages.
//!
//! Page layouts drift between the PC and SP variants, so every parser
//! tries a list of selectors before giving up.

pub mod past_races;
pub mod race_card;
pub mod race_list;
pub mod race_result;

pub use past_races::PastRacesParser;
pub use race_card::RaceCardParser;
pub use race_list::RaceListParser;
pub use race_result::RaceResultParser;

use scraper::Selector;

/// Compile a selector literal.
pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("selector literal is valid")
}

/// Element text joined with newlines, one trimmed fragment per line.
pub(crate) fn text_lines(element: &scraper::ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flat element text with single spaces between fragments.
pub(crate) fn text_flat(element: &scraper::ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
