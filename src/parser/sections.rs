use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::SearchSection;

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.search_row.default-table-row").unwrap());

/// Read every default search result row of the landing page, in row order.
pub fn parse_search_rows(doc: &Html) -> Vec<SearchSection> {
    doc.select(&ROW_SEL)
        .map(|row| {
            let attr = |name: &str| row.value().attr(name).unwrap_or_default().to_string();
            SearchSection {
                player_id: attr("data-player-id"),
                month: attr("data-month"),
                year: attr("data-year"),
                game_date: attr("data-game-date"),
                game_pk: attr("data-game-pk"),
                pitch_type: attr("data-pitch-type"),
                play_id: attr("data-play-id"),
                group_by: attr("data-group-by"),
            }
        })
        .collect()
}
