use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use gm_api::postseason::Postseason;
use gm_api::{
    LeagueAdvance, PlayoffLeaders, PlayoffNewsItem, Roster, ScheduleGame, SimulatedGame,
    Standings, StatLeaders, StateUpdate, TeamCard, TeamDetail, TeamSchedule, WeeklyNews,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    ValidateKey { api_key: String },
    LoadFirstMessage { team_id: String },
    LoadRoster { team_id: String },
    LoadSchedule { team_id: String },
    LoadStandings,
    LoadStats,
    LoadTeams,
    LoadTeamDetail { team_id: String },
    LoadWeeklyNews { api_key: String },
    /// Forced reload of standings, stats, teams and (with a key) weekly news.
    RefreshLeague { api_key: Option<String> },
    /// Advance the league to the game's date, then play it.
    SimulateGame { user_team_id: String, game: ScheduleGame, tactics: Option<Value> },
    ChatMain { api_key: String, main_prompt: String, user_input: String, context: String },
    StateUpdate {
        api_key: String,
        sub_prompt: String,
        engine_output: Value,
        current_state: Option<Value>,
    },
    PostseasonSetup { my_team_id: String },
    PostseasonState,
    PostseasonReset,
    PlayMyPlayInGame,
    AdvanceMySeries,
    LoadPlayoffLeaders,
    LoadPlayoffNews,
}

/// Which view a failed request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    KeyValidation,
    FirstMessage { team_id: String },
    Roster { team_id: String },
    Schedule,
    Standings,
    Stats,
    Teams,
    TeamDetail { team_id: String },
    WeeklyNews,
    Simulation,
    MainChat,
    StateUpdate,
    Postseason,
    PlayoffGame,
    PlayoffLeaders,
    PlayoffNews,
}

impl NetworkRequest {
    pub fn origin(&self) -> Origin {
        match self {
            NetworkRequest::ValidateKey { .. } => Origin::KeyValidation,
            NetworkRequest::LoadFirstMessage { team_id } => {
                Origin::FirstMessage { team_id: team_id.clone() }
            }
            NetworkRequest::LoadRoster { team_id } => Origin::Roster { team_id: team_id.clone() },
            NetworkRequest::LoadSchedule { .. } => Origin::Schedule,
            NetworkRequest::LoadStandings => Origin::Standings,
            NetworkRequest::LoadStats => Origin::Stats,
            NetworkRequest::LoadTeams => Origin::Teams,
            NetworkRequest::LoadTeamDetail { team_id } => {
                Origin::TeamDetail { team_id: team_id.clone() }
            }
            NetworkRequest::LoadWeeklyNews { .. } => Origin::WeeklyNews,
            NetworkRequest::RefreshLeague { .. } => Origin::Standings,
            NetworkRequest::SimulateGame { .. } => Origin::Simulation,
            NetworkRequest::ChatMain { .. } => Origin::MainChat,
            NetworkRequest::StateUpdate { .. } => Origin::StateUpdate,
            NetworkRequest::PostseasonSetup { .. }
            | NetworkRequest::PostseasonState
            | NetworkRequest::PostseasonReset => Origin::Postseason,
            NetworkRequest::PlayMyPlayInGame | NetworkRequest::AdvanceMySeries => {
                Origin::PlayoffGame
            }
            NetworkRequest::LoadPlayoffLeaders => Origin::PlayoffLeaders,
            NetworkRequest::LoadPlayoffNews => Origin::PlayoffNews,
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    KeyValidated { api_key: String },
    FirstMessageLoaded { team_id: String, text: Option<String> },
    RosterLoaded { roster: Roster },
    ScheduleLoaded { schedule: TeamSchedule },
    StandingsLoaded { standings: Standings },
    StatsLoaded { leaders: StatLeaders },
    TeamsLoaded { teams: Vec<TeamCard> },
    TeamDetailLoaded { detail: TeamDetail },
    WeeklyNewsLoaded { news: WeeklyNews },
    GameSimulated { game: ScheduleGame, league: LeagueAdvance, result: SimulatedGame },
    ChatReplied { reply: String },
    StateUpdated { update: StateUpdate },
    PostseasonLoaded { postseason: Postseason },
    PlayoffGamePlayed { postseason: Postseason },
    PlayoffLeadersLoaded { leaders: PlayoffLeaders },
    PlayoffNewsLoaded { items: Vec<PlayoffNewsItem> },
    /// Several independent results from one request.
    Batch(Vec<NetworkResponse>),
    Error { origin: Origin, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
