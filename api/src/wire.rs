//! Serde shapes for the backend's loosely typed responses. The client maps
//! these onto the domain types in the crate root.
use serde::Deserialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Shared scalars
// ---------------------------------------------------------------------------

/// Player ids come back as integers from the pandas-backed roster, and as
/// strings from older saves.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum LooseId {
    Int(i64),
    Str(String),
}

impl LooseId {
    pub fn into_string(self) -> String {
        match self {
            LooseId::Int(n) => n.to_string(),
            LooseId::Str(s) => s,
        }
    }
}

/// Numbers that may arrive as numbers or numeric strings ("-" for empty).
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum LooseNumber {
    Num(f64),
    Str(String),
}

impl LooseNumber {
    pub fn value(&self) -> Option<f64> {
        match self {
            LooseNumber::Num(n) => Some(*n),
            LooseNumber::Str(s) => s.trim().parse().ok(),
        }
    }
}

pub fn num(v: &Option<LooseNumber>) -> Option<f64> {
    v.as_ref().and_then(LooseNumber::value)
}

pub fn count(v: &Option<LooseNumber>) -> Option<u32> {
    num(v).filter(|n| *n >= 0.0).map(|n| n.round() as u32)
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ValidateKeyResponse {
    #[serde(default)]
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// Roster / schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RosterResponse {
    pub team_id: Option<String>,
    pub players: Option<Vec<RosterPlayerRaw>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RosterPlayerRaw {
    pub player_id: Option<LooseId>,
    pub name: Option<String>,
    pub pos: Option<String>,
    pub overall: Option<LooseNumber>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScheduleResponse {
    pub team_id: Option<String>,
    pub games: Option<Vec<ScheduleGameRaw>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleGameRaw {
    pub game_id: Option<LooseId>,
    pub date: Option<String>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_score: Option<LooseNumber>,
    pub away_score: Option<LooseNumber>,
    pub result_for_user_team: Option<String>,
}

// ---------------------------------------------------------------------------
// League views
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StandingsResponse {
    pub east: Option<Vec<StandingRowRaw>>,
    pub west: Option<Vec<StandingRowRaw>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StandingRowRaw {
    pub team_id: Option<String>,
    pub rank: Option<LooseNumber>,
    pub wins: Option<LooseNumber>,
    pub losses: Option<LooseNumber>,
    pub win_pct: Option<LooseNumber>,
    pub gb: Option<LooseNumber>,
    pub pf: Option<LooseNumber>,
    pub pa: Option<LooseNumber>,
    pub point_diff: Option<LooseNumber>,
    pub division: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LeadersResponse {
    pub leaders: Option<BTreeMap<String, Vec<LeaderRowRaw>>>,
    pub updated_at: Option<String>,
}

/// One leaderboard entry. The stat value sits under the category key itself
/// (`"PTS": 27.1`), so the remaining fields are collected into `rest`.
#[derive(Debug, Deserialize, Clone)]
pub struct LeaderRowRaw {
    pub name: Option<String>,
    pub team_id: Option<String>,
    #[serde(rename = "GP")]
    pub gp: Option<LooseNumber>,
    pub games_played: Option<LooseNumber>,
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeamCardRaw {
    pub team_id: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub wins: Option<LooseNumber>,
    pub losses: Option<LooseNumber>,
    pub win_pct: Option<LooseNumber>,
    pub tendency: Option<String>,
    pub payroll: Option<LooseNumber>,
    pub cap_space: Option<LooseNumber>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamDetailResponse {
    pub summary: Option<TeamSummaryRaw>,
    pub roster: Option<Vec<TeamDetailPlayerRaw>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamSummaryRaw {
    pub conference: Option<String>,
    pub division: Option<String>,
    pub wins: Option<LooseNumber>,
    pub losses: Option<LooseNumber>,
    pub win_pct: Option<LooseNumber>,
    pub point_diff: Option<LooseNumber>,
    pub tendency: Option<String>,
    pub payroll: Option<LooseNumber>,
    pub cap_space: Option<LooseNumber>,
    pub conference_rank: Option<LooseNumber>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeamDetailPlayerRaw {
    pub name: Option<String>,
    pub pos: Option<String>,
    pub ovr: Option<LooseNumber>,
    pub age: Option<LooseNumber>,
    pub salary: Option<LooseNumber>,
    pub pts: Option<LooseNumber>,
    pub ast: Option<LooseNumber>,
    pub reb: Option<LooseNumber>,
    pub three_pm: Option<LooseNumber>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WeeklyNewsResponse {
    pub current_date: Option<String>,
    pub items: Option<Vec<NewsItemRaw>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewsItemRaw {
    pub date: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Simulation / LLM
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AdvanceLeagueResponse {
    pub target_date: Option<String>,
    pub simulated_count: Option<LooseNumber>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ChatMainResponse {
    pub reply: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StateUpdateResponse {
    pub raw: Option<String>,
    pub parsed: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Playoff side views
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlayoffLeadersResponse {
    pub leaders: Option<BTreeMap<String, Vec<PlayoffLeaderRaw>>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayoffLeaderRaw {
    pub player: Option<String>,
    pub name: Option<String>,
    pub team: Option<String>,
    pub team_id: Option<String>,
    pub value: Option<LooseNumber>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlayoffNewsResponse {
    pub items: Option<Vec<PlayoffNewsRaw>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayoffNewsRaw {
    pub headline: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
}
