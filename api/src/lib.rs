pub mod client;
pub mod postseason;
mod wire;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// League metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub fn label(&self) -> &'static str {
        match self {
            Conference::East => "East",
            Conference::West => "West",
        }
    }

    pub fn all() -> [Conference; 2] {
        [Conference::East, Conference::West]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Cap situation blurb shown on the team select screen.
    pub cap: &'static str,
    pub overall: u8,
    pub difficulty: &'static str,
}

pub const TEAMS: [TeamInfo; 30] = [
    TeamInfo { id: "ATL", name: "Atlanta Hawks", cap: "Mid market", overall: 80, difficulty: "Normal" },
    TeamInfo { id: "BOS", name: "Boston Celtics", cap: "Title core", overall: 95, difficulty: "Easy" },
    TeamInfo { id: "BKN", name: "Brooklyn Nets", cap: "Retooling", overall: 79, difficulty: "Normal" },
    TeamInfo { id: "CHA", name: "Charlotte Hornets", cap: "Rebuilding", overall: 73, difficulty: "Hard" },
    TeamInfo { id: "CHI", name: "Chicago Bulls", cap: "Stuck in the middle", overall: 79, difficulty: "Normal" },
    TeamInfo { id: "CLE", name: "Cleveland Cavaliers", cap: "Young core", overall: 84, difficulty: "Normal" },
    TeamInfo { id: "DAL", name: "Dallas Mavericks", cap: "One superstar", overall: 86, difficulty: "Normal" },
    TeamInfo { id: "DEN", name: "Denver Nuggets", cap: "Defending champs", overall: 94, difficulty: "Easy" },
    TeamInfo { id: "DET", name: "Detroit Pistons", cap: "Picks and prospects", overall: 72, difficulty: "Very hard" },
    TeamInfo { id: "GSW", name: "Golden State Warriors", cap: "Tax apron", overall: 87, difficulty: "Hard" },
    TeamInfo { id: "HOU", name: "Houston Rockets", cap: "Rebuild ending", overall: 78, difficulty: "Normal" },
    TeamInfo { id: "IND", name: "Indiana Pacers", cap: "Flexible", overall: 81, difficulty: "Normal" },
    TeamInfo { id: "LAC", name: "LA Clippers", cap: "Deep in the tax", overall: 86, difficulty: "Hard" },
    TeamInfo { id: "LAL", name: "Los Angeles Lakers", cap: "Two stars", overall: 89, difficulty: "Normal" },
    TeamInfo { id: "MEM", name: "Memphis Grizzlies", cap: "Young core", overall: 84, difficulty: "Normal" },
    TeamInfo { id: "MIA", name: "Miami Heat", cap: "Win now", overall: 88, difficulty: "Normal" },
    TeamInfo { id: "MIL", name: "Milwaukee Bucks", cap: "Two supermax deals", overall: 93, difficulty: "Easy" },
    TeamInfo { id: "MIN", name: "Minnesota Timberwolves", cap: "Big man core", overall: 85, difficulty: "Normal" },
    TeamInfo { id: "NOP", name: "New Orleans Pelicans", cap: "Many prospects", overall: 82, difficulty: "Normal" },
    TeamInfo { id: "NYK", name: "New York Knicks", cap: "Big market", overall: 84, difficulty: "Normal" },
    TeamInfo { id: "OKC", name: "Oklahoma City Thunder", cap: "Pick warehouse", overall: 83, difficulty: "Normal" },
    TeamInfo { id: "ORL", name: "Orlando Magic", cap: "Prospect heavy", overall: 79, difficulty: "Hard" },
    TeamInfo { id: "PHI", name: "Philadelphia 76ers", cap: "MVP-level star", overall: 90, difficulty: "Normal" },
    TeamInfo { id: "PHX", name: "Phoenix Suns", cap: "Superteam", overall: 92, difficulty: "Easy" },
    TeamInfo { id: "POR", name: "Portland Trail Blazers", cap: "Rebuild starting", overall: 75, difficulty: "Hard" },
    TeamInfo { id: "SAC", name: "Sacramento Kings", cap: "Playoff bubble", overall: 84, difficulty: "Normal" },
    TeamInfo { id: "SAS", name: "San Antonio Spurs", cap: "Prospect ace", overall: 78, difficulty: "Hard" },
    TeamInfo { id: "TOR", name: "Toronto Raptors", cap: "Retooling", overall: 80, difficulty: "Normal" },
    TeamInfo { id: "UTA", name: "Utah Jazz", cap: "Many picks", overall: 77, difficulty: "Hard" },
    TeamInfo { id: "WAS", name: "Washington Wizards", cap: "Rebuilding", overall: 71, difficulty: "Very hard" },
];

pub const DIVISIONS: [(Conference, &str, [&str; 5]); 6] = [
    (Conference::West, "Southwest", ["DAL", "HOU", "MEM", "NOP", "SAS"]),
    (Conference::West, "Northwest", ["DEN", "MIN", "OKC", "POR", "UTA"]),
    (Conference::West, "Pacific", ["GSW", "LAC", "LAL", "PHX", "SAC"]),
    (Conference::East, "Atlantic", ["BOS", "BKN", "NYK", "PHI", "TOR"]),
    (Conference::East, "Central", ["CHI", "CLE", "DET", "IND", "MIL"]),
    (Conference::East, "Southeast", ["ATL", "CHA", "MIA", "ORL", "WAS"]),
];

pub fn find_team(team_id: &str) -> Option<&'static TeamInfo> {
    TEAMS.iter().find(|t| t.id == team_id)
}

/// Display name for a team id, falling back to the id itself.
pub fn team_name(team_id: &str) -> &str {
    find_team(team_id).map(|t| t.name).unwrap_or(team_id)
}

pub fn conference_and_division(team_id: &str) -> Option<(Conference, &'static str)> {
    DIVISIONS
        .iter()
        .find(|(_, _, teams)| teams.contains(&team_id))
        .map(|(conf, div, _)| (*conf, *div))
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        PlayerId(value.to_owned())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterPlayer {
    pub id: PlayerId,
    pub name: String,
    pub pos: String,
    pub overall: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub team_id: String,
    pub players: Vec<RosterPlayer>,
}

impl Roster {
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGame {
    pub game_id: String,
    pub date: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// "W" / "L" from the user's perspective once played.
    pub result_for_user_team: Option<String>,
}

impl ScheduleGame {
    pub fn is_played(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    pub fn score_text(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => format!("{h} - {a}"),
            _ => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSchedule {
    pub team_id: String,
    pub games: Vec<ScheduleGame>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingRow {
    pub team_id: String,
    pub rank: Option<u32>,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: Option<f64>,
    pub games_behind: Option<f64>,
    pub points_for: Option<f64>,
    pub points_against: Option<f64>,
    pub point_diff: Option<f64>,
    pub division: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Standings {
    pub east: Vec<StandingRow>,
    pub west: Vec<StandingRow>,
}

impl Standings {
    pub fn conference(&self, conference: Conference) -> &[StandingRow] {
        match conference {
            Conference::East => &self.east,
            Conference::West => &self.west,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatCategory {
    Points,
    Assists,
    Rebounds,
    Threes,
}

impl StatCategory {
    pub fn all() -> [StatCategory; 4] {
        [StatCategory::Points, StatCategory::Assists, StatCategory::Rebounds, StatCategory::Threes]
    }

    /// Key used by the server's `leaders` object.
    pub fn key(&self) -> &'static str {
        match self {
            StatCategory::Points => "PTS",
            StatCategory::Assists => "AST",
            StatCategory::Rebounds => "REB",
            StatCategory::Threes => "3PM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatCategory::Points => "Points (PTS)",
            StatCategory::Assists => "Assists (AST)",
            StatCategory::Rebounds => "Rebounds (REB)",
            StatCategory::Threes => "Threes made (3PM)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderRow {
    pub name: String,
    pub team_id: String,
    pub games_played: Option<u32>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatLeaders {
    pub categories: BTreeMap<StatCategory, Vec<LeaderRow>>,
    pub updated_at: Option<String>,
}

impl StatLeaders {
    pub fn rows(&self, category: StatCategory) -> &[LeaderRow] {
        self.categories.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamCard {
    pub team_id: String,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub win_pct: Option<f64>,
    pub tendency: Option<String>,
    pub payroll: Option<f64>,
    pub cap_space: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSummary {
    pub conference: Option<String>,
    pub division: Option<String>,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub win_pct: Option<f64>,
    pub point_diff: Option<f64>,
    pub tendency: Option<String>,
    pub payroll: Option<f64>,
    pub cap_space: Option<f64>,
    pub conference_rank: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDetailPlayer {
    pub name: String,
    pub pos: String,
    pub overall: Option<f64>,
    pub age: Option<u32>,
    pub salary: Option<f64>,
    pub pts: Option<f64>,
    pub ast: Option<f64>,
    pub reb: Option<f64>,
    pub three_pm: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDetail {
    pub team_id: String,
    pub summary: TeamSummary,
    pub roster: Vec<TeamDetailPlayer>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsItem {
    pub date: Option<String>,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyNews {
    pub current_date: Option<String>,
    pub items: Vec<NewsItem>,
}

/// Body of `/api/simulate-game`. Tactics are passed through as opaque JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulateGame {
    pub home_team_id: String,
    pub away_team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_tactics: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_tactics: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_date: Option<String>,
}

/// Outcome of `/api/simulate-game`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedGame {
    pub final_score: BTreeMap<String, u32>,
    pub winner: Option<String>,
    /// Full engine output, forwarded verbatim to the state-update endpoint.
    pub raw: serde_json::Value,
}

impl SimulatedGame {
    pub fn score_for(&self, team_id: &str) -> Option<u32> {
        self.final_score.get(team_id).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueAdvance {
    pub target_date: String,
    pub simulated_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub raw: Option<String>,
    pub parsed: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayoffLeaderRow {
    pub player: String,
    pub team_id: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayoffLeaders {
    pub categories: BTreeMap<String, Vec<PlayoffLeaderRow>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayoffNewsItem {
    pub headline: String,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Postseason round axis
// ---------------------------------------------------------------------------

/// Playoff rounds, ordered from earliest to latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoundKind {
    #[default]
    Quarterfinals,
    Semifinals,
    ConferenceFinals,
    Finals,
}

impl RoundKind {
    /// Label the server uses in `playoffs.current_round`.
    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::Quarterfinals => "Conference Quarterfinals",
            RoundKind::Semifinals => "Conference Semifinals",
            RoundKind::ConferenceFinals => "Conference Finals",
            RoundKind::Finals => "NBA Finals",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [
            RoundKind::Quarterfinals,
            RoundKind::Semifinals,
            RoundKind::ConferenceFinals,
            RoundKind::Finals,
        ]
        .into_iter()
        .find(|r| r.label() == label.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_team_belongs_to_exactly_one_division() {
        for team in TEAMS {
            let hits = DIVISIONS
                .iter()
                .filter(|(_, _, ids)| ids.contains(&team.id))
                .count();
            assert_eq!(hits, 1, "{} should be in one division", team.id);
        }
    }

    #[test]
    fn team_name_falls_back_to_id() {
        assert_eq!(team_name("BOS"), "Boston Celtics");
        assert_eq!(team_name("XYZ"), "XYZ");
    }

    #[test]
    fn conference_lookup() {
        assert_eq!(conference_and_division("MIA"), Some((Conference::East, "Southeast")));
        assert_eq!(conference_and_division("PHX"), Some((Conference::West, "Pacific")));
        assert_eq!(conference_and_division("???"), None);
    }

    #[test]
    fn round_kind_from_server_label() {
        assert_eq!(RoundKind::from_label(" Conference Semifinals "), Some(RoundKind::Semifinals));
        assert_eq!(RoundKind::from_label("NBA Finals"), Some(RoundKind::Finals));
        assert_eq!(RoundKind::from_label("Play-In"), None);
    }

    #[test]
    fn schedule_game_played_and_score_text() {
        let mut g = ScheduleGame {
            game_id: "g1".into(),
            date: "2025-10-21".into(),
            home_team_id: "BOS".into(),
            away_team_id: "NYK".into(),
            ..Default::default()
        };
        assert!(!g.is_played());
        assert_eq!(g.score_text(), "-");
        g.home_score = Some(110);
        g.away_score = Some(101);
        assert!(g.is_played());
        assert_eq!(g.score_text(), "110 - 101");
    }
}
