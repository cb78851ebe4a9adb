use crate::models::{GroupBy, SearchSection};

/// Characters dropped from the end of the landing URL (`#results`).
const LANDING_SUFFIX_LEN: usize = 8;

/// Build the detail-page URL for one search section.
///
/// Returns `None` when the section's grouping mode is not one that links to
/// video details; such sections are skipped by the caller.
pub fn compile_url(landing_url: &str, section: &SearchSection) -> Option<String> {
    let params = match section.group_by()? {
        GroupBy::Name | GroupBy::Team | GroupBy::Venue => {
            format!("&player_id={}", section.player_id)
        }
        GroupBy::NameDate | GroupBy::TeamDate => format!(
            "&player_id={}&ep_game_date={}&ep_game_pk={}",
            section.player_id, section.game_date, section.game_pk
        ),
        GroupBy::NameMonth | GroupBy::TeamMonth => format!(
            "&player_id={}&ep_game_month={}",
            section.player_id, section.month
        ),
        GroupBy::NameMonthYear | GroupBy::TeamMonthYear => format!(
            "&player_id={}&ep_game_month={}&ep_game_year={}",
            section.player_id, section.month, section.year
        ),
        GroupBy::NameYear | GroupBy::TeamYear => format!(
            "&player_id={}&ep_game_year={}",
            section.player_id, section.year
        ),
        GroupBy::NameEvent | GroupBy::TeamEvent => format!(
            "&player_id={}&play_guid={}",
            section.player_id, section.play_id
        ),
        GroupBy::PitchType | GroupBy::TeamPitchType => format!(
            "&player_id={}&ep_pitch_type={}",
            section.player_id, section.pitch_type
        ),
    };

    Some(format!("{}&type=details{}", strip_suffix(landing_url), params))
}

fn strip_suffix(url: &str) -> &str {
    let cut = url
        .char_indices()
        .rev()
        .nth(LANDING_SUFFIX_LEN - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &url[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str =
        "https://baseballsavant.mlb.com/statcast_search?hfPT=&player_type=batter#results";
    const BASE: &str =
        "https://baseballsavant.mlb.com/statcast_search?hfPT=&player_type=batter&type=details";

    fn section(group_by: &str) -> SearchSection {
        SearchSection {
            player_id: "660271".into(),
            month: "5".into(),
            year: "2024".into(),
            game_date: "2024-05-01".into(),
            game_pk: "777".into(),
            pitch_type: "FF".into(),
            play_id: "abc-123".into(),
            group_by: group_by.into(),
        }
    }

    fn params(group_by: &str) -> Option<String> {
        compile_url(LANDING, &section(group_by))
            .map(|url| url.strip_prefix(BASE).unwrap().to_string())
    }

    #[test]
    fn player_only_modes() {
        for tag in ["name", "team", "venue"] {
            assert_eq!(params(tag).as_deref(), Some("&player_id=660271"));
        }
    }

    #[test]
    fn date_modes() {
        for tag in ["name-date", "team-date"] {
            assert_eq!(
                params(tag).as_deref(),
                Some("&player_id=660271&ep_game_date=2024-05-01&ep_game_pk=777")
            );
        }
    }

    #[test]
    fn month_and_year_modes() {
        for tag in ["name-month", "team-month"] {
            assert_eq!(params(tag).as_deref(), Some("&player_id=660271&ep_game_month=5"));
        }
        for tag in ["name-month-year", "team-month-year"] {
            assert_eq!(
                params(tag).as_deref(),
                Some("&player_id=660271&ep_game_month=5&ep_game_year=2024")
            );
        }
        for tag in ["name-year", "team-year"] {
            assert_eq!(params(tag).as_deref(), Some("&player_id=660271&ep_game_year=2024"));
        }
    }

    #[test]
    fn event_and_pitch_modes() {
        for tag in ["name-event", "team-event"] {
            assert_eq!(params(tag).as_deref(), Some("&player_id=660271&play_guid=abc-123"));
        }
        for tag in ["pitch-type", "team-pitch-type"] {
            assert_eq!(params(tag).as_deref(), Some("&player_id=660271&ep_pitch_type=FF"));
        }
    }

    #[test]
    fn unsupported_mode_is_skipped() {
        assert_eq!(compile_url(LANDING, &section("")), None);
        assert_eq!(compile_url(LANDING, &section("game")), None);
    }

    #[test]
    fn empty_fields_still_compile() {
        let s = SearchSection {
            group_by: "name".into(),
            ..Default::default()
        };
        assert_eq!(compile_url(LANDING, &s).unwrap(), format!("{}&player_id=", BASE));
    }

    #[test]
    fn short_url_does_not_panic() {
        let s = section("name");
        assert_eq!(
            compile_url("short", &s).as_deref(),
            Some("&type=details&player_id=660271")
        );
    }
}
