use serde::Serialize;

/// Grouping mode of a search result row (`data-group-by`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Name,
    Team,
    Venue,
    NameDate,
    TeamDate,
    NameMonth,
    TeamMonth,
    NameMonthYear,
    TeamMonthYear,
    NameYear,
    TeamYear,
    NameEvent,
    TeamEvent,
    PitchType,
    TeamPitchType,
}

impl GroupBy {
    pub fn parse(tag: &str) -> Option<Self> {
        let mode = match tag {
            "name" => Self::Name,
            "team" => Self::Team,
            "venue" => Self::Venue,
            "name-date" => Self::NameDate,
            "team-date" => Self::TeamDate,
            "name-month" => Self::NameMonth,
            "team-month" => Self::TeamMonth,
            "name-month-year" => Self::NameMonthYear,
            "team-month-year" => Self::TeamMonthYear,
            "name-year" => Self::NameYear,
            "team-year" => Self::TeamYear,
            "name-event" => Self::NameEvent,
            "team-event" => Self::TeamEvent,
            "pitch-type" => Self::PitchType,
            "team-pitch-type" => Self::TeamPitchType,
            _ => return None,
        };
        Some(mode)
    }
}

/// One `search_row` of the landing page. Missing attributes are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSection {
    pub player_id: String,
    pub month: String,
    pub year: String,
    pub game_date: String,
    pub game_pk: String,
    pub pitch_type: String,
    pub play_id: String,
    pub group_by: String,
}

impl SearchSection {
    pub fn group_by(&self) -> Option<GroupBy> {
        GroupBy::parse(&self.group_by)
    }
}

/// Descriptive fields recognised on a video page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Batter,
    Pitcher,
    Count,
    PitchType,
    PitchVelo,
    ExitVelo,
    Distance,
    NumParks,
    Matchup,
    Date,
}

/// Label text as it appears in the page's `<strong>` element.
pub const FIELD_LABELS: [(&str, MetaField); 10] = [
    ("Batter:", MetaField::Batter),
    ("Pitcher:", MetaField::Pitcher),
    ("Count:", MetaField::Count),
    ("Pitch Type:", MetaField::PitchType),
    ("Velocity:", MetaField::PitchVelo),
    ("Exit Velocity:", MetaField::ExitVelo),
    ("Hit Distance:", MetaField::Distance),
    ("HR:", MetaField::NumParks),
    ("Matchup:", MetaField::Matchup),
    ("Date:", MetaField::Date),
];

impl MetaField {
    pub fn from_label(label: &str) -> Option<Self> {
        FIELD_LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, field)| *field)
    }
}

/// One clip discovered on a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    pub video_page_url: String,
    pub mp4_video_url: Option<String>,

    pub description: Option<String>,
    pub count: Option<String>,
    pub batter: Option<String>,
    pub pitcher: Option<String>,
    pub pitch_type: Option<String>,
    pub pitch_velo: Option<String>,
    pub exit_velo: Option<String>,
    pub distance: Option<String>,
    /// Homered in N of 30 parks.
    pub num_parks: Option<String>,
    pub matchup: Option<String>,
    pub date: Option<String>,
}

impl VideoMetadata {
    pub fn new(video_page_url: impl Into<String>) -> Self {
        Self {
            video_page_url: video_page_url.into(),
            ..Default::default()
        }
    }

    pub fn set(&mut self, field: MetaField, value: String) {
        let slot = match field {
            MetaField::Batter => &mut self.batter,
            MetaField::Pitcher => &mut self.pitcher,
            MetaField::Count => &mut self.count,
            MetaField::PitchType => &mut self.pitch_type,
            MetaField::PitchVelo => &mut self.pitch_velo,
            MetaField::ExitVelo => &mut self.exit_velo,
            MetaField::Distance => &mut self.distance,
            MetaField::NumParks => &mut self.num_parks,
            MetaField::Matchup => &mut self.matchup,
            MetaField::Date => &mut self.date,
        };
        *slot = Some(value);
    }

    pub fn get(&self, field: MetaField) -> Option<&str> {
        let slot = match field {
            MetaField::Batter => &self.batter,
            MetaField::Pitcher => &self.pitcher,
            MetaField::Count => &self.count,
            MetaField::PitchType => &self.pitch_type,
            MetaField::PitchVelo => &self.pitch_velo,
            MetaField::ExitVelo => &self.exit_velo,
            MetaField::Distance => &self.distance,
            MetaField::NumParks => &self.num_parks,
            MetaField::Matchup => &self.matchup,
            MetaField::Date => &self.date,
        };
        slot.as_deref()
    }

    pub fn is_downloadable(&self) -> bool {
        self.mp4_video_url.is_some()
    }
}
