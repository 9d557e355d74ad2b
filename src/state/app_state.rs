use crate::app::{MenuItem, Screen};
use crate::state::cache::CachedView;
use crate::state::tactics::{Side, Tactics, pace_label};
use gm_api::postseason::Postseason;
use gm_api::{
    ChatRole, ChatTurn, PlayoffLeaders, PlayoffNewsItem, Roster, ScheduleGame, Standings,
    StatLeaders, TEAMS, TeamCard, TeamDetail, TeamSchedule, WeeklyNews,
};
use std::collections::{HashMap, HashSet};

/// Turns of history forwarded to the main LLM.
pub const CONTEXT_HISTORY_TURNS: usize = 8;
/// Recent scores forwarded to the main LLM.
pub const CONTEXT_SCORE_COUNT: usize = 5;
pub const SCORES_TAB_LIMIT: usize = 20;
pub const SIDEBAR_GAME_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// API key screen
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct KeyEntryState {
    pub input: String,
    /// Inline validation feedback under the input.
    pub message: Option<String>,
    pub validating: bool,
}

/// Cheap local check before asking the server: `AIza` followed by at least
/// ten characters from `[0-9A-Za-z_-]`.
pub fn is_plausible_api_key(key: &str) -> bool {
    let Some(rest) = key.strip_prefix("AIza") else {
        return false;
    };
    rest.len() >= 10
        && rest
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ---------------------------------------------------------------------------
// Team select
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamSelectState {
    pub cursor: usize,
}

impl TeamSelectState {
    pub fn down(&mut self) {
        self.cursor = (self.cursor + 1).min(TEAMS.len() - 1);
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn highlighted(&self) -> &'static str {
        TEAMS[self.cursor.min(TEAMS.len() - 1)].id
    }
}

// ---------------------------------------------------------------------------
// Home tab: narrative output and prompt
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ChatState {
    pub history: Vec<ChatTurn>,
    /// Text shown in the main output panel.
    pub output: String,
    pub input: String,
    pub composing: bool,
    pub scroll_offset: u16,
}

impl ChatState {
    pub fn push(&mut self, role: ChatRole, text: impl Into<String>) {
        self.history.push(ChatTurn { role, text: text.into() });
    }

    pub fn recent_history(&self) -> &[ChatTurn] {
        let start = self.history.len().saturating_sub(CONTEXT_HISTORY_TURNS);
        &self.history[start..]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Schedule and scores
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SeasonState {
    pub schedule: CachedView<TeamSchedule>,
    /// Team the outstanding schedule request was sent for.
    pub schedule_requested_for: Option<String>,
    /// Index of the next unplayed game.
    pub current_index: usize,
    /// Played games, newest first.
    pub scores: Vec<ScheduleGame>,
    pub current_date: Option<String>,
    pub progress_turns: u32,
    pub regular_season_completed: bool,
    pub scroll_offset: u16,
}

impl SeasonState {
    pub fn games(&self) -> &[ScheduleGame] {
        self.schedule.data().map(|s| s.games.as_slice()).unwrap_or(&[])
    }

    pub fn next_game(&self) -> Option<&ScheduleGame> {
        self.games().get(self.current_index).filter(|g| !g.is_played())
    }

    /// Point `current_index` at the first unplayed game.
    pub fn sync_current_index(&mut self) {
        let games = self.games();
        self.current_index = games
            .iter()
            .position(|g| !g.is_played())
            .unwrap_or(games.len());
    }

    /// Schedule-ordered played games become the newest-first score list.
    pub fn rebuild_scores(&mut self) {
        let mut played: Vec<ScheduleGame> =
            self.games().iter().filter(|g| g.is_played()).cloned().collect();
        played.reverse();
        self.scores = played;
    }

    /// Lines of the form `[date] home vs away : score`.
    pub fn latest_games_text(&self) -> String {
        self.scores
            .iter()
            .take(CONTEXT_SCORE_COUNT)
            .map(|g| {
                format!(
                    "[{}] {} vs {} : {}",
                    g.date,
                    gm_api::team_name(&g.home_team_id),
                    gm_api::team_name(&g.away_team_id),
                    g.score_text()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Tactics tab cursor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticsSetting {
    Pace,
    Primary(Side),
    Secondary(Side),
    SecondaryWeight(Side),
    Rotation,
}

pub const TACTICS_SETTINGS: [TacticsSetting; 8] = [
    TacticsSetting::Pace,
    TacticsSetting::Primary(Side::Offense),
    TacticsSetting::Secondary(Side::Offense),
    TacticsSetting::SecondaryWeight(Side::Offense),
    TacticsSetting::Primary(Side::Defense),
    TacticsSetting::Secondary(Side::Defense),
    TacticsSetting::SecondaryWeight(Side::Defense),
    TacticsSetting::Rotation,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticsRow {
    Setting(TacticsSetting),
    /// Index into the roster's player list.
    Player(usize),
}

#[derive(Debug, Default)]
pub struct TacticsViewState {
    pub cursor: usize,
}

impl TacticsViewState {
    pub fn row(&self, roster_len: usize) -> Option<TacticsRow> {
        if let Some(setting) = TACTICS_SETTINGS.get(self.cursor) {
            return Some(TacticsRow::Setting(*setting));
        }
        let idx = self.cursor - TACTICS_SETTINGS.len();
        (idx < roster_len).then_some(TacticsRow::Player(idx))
    }

    pub fn down(&mut self, roster_len: usize) {
        let max = TACTICS_SETTINGS.len() + roster_len;
        if self.cursor + 1 < max {
            self.cursor += 1;
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

pub fn describe_setting(setting: TacticsSetting, tactics: &Tactics) -> (String, String) {
    match setting {
        TacticsSetting::Pace => (
            "Pace".to_string(),
            format!("{} ({})", tactics.pace(), pace_label(tactics.pace())),
        ),
        TacticsSetting::Primary(Side::Offense) => {
            ("Offense".to_string(), tactics.offense().0.label().to_string())
        }
        TacticsSetting::Primary(Side::Defense) => {
            ("Defense".to_string(), tactics.defense().0.label().to_string())
        }
        TacticsSetting::Secondary(Side::Offense) => (
            "  secondary".to_string(),
            tactics.offense().1.map(|s| s.label()).unwrap_or("None").to_string(),
        ),
        TacticsSetting::Secondary(Side::Defense) => (
            "  secondary".to_string(),
            tactics.defense().1.map(|s| s.label()).unwrap_or("None").to_string(),
        ),
        TacticsSetting::SecondaryWeight(side) => {
            let (primary, secondary) = tactics.weights(side);
            ("  weight".to_string(), format!("primary {primary} : secondary {secondary}"))
        }
        TacticsSetting::Rotation => {
            ("Rotation".to_string(), format!("{} players", tactics.rotation_size()))
        }
    }
}

// ---------------------------------------------------------------------------
// League-wide cached views
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LeagueViews {
    pub standings: CachedView<Standings>,
    pub stats: CachedView<StatLeaders>,
    pub teams: CachedView<Vec<TeamCard>>,
    pub team_details: HashMap<String, CachedView<TeamDetail>>,
    pub weekly_news: CachedView<WeeklyNews>,
    pub playoff_leaders: CachedView<PlayoffLeaders>,
    pub playoff_news: CachedView<Vec<PlayoffNewsItem>>,
    pub teams_cursor: usize,
    pub news_scroll: u16,
}

impl LeagueViews {
    pub fn team_detail_mut(&mut self, team_id: &str) -> &mut CachedView<TeamDetail> {
        self.team_details.entry(team_id.to_string()).or_default()
    }

    /// Team id under the Teams tab cursor.
    pub fn highlighted_team(&self) -> Option<&str> {
        self.teams
            .data()?
            .get(self.teams_cursor)
            .map(|t| t.team_id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Postseason
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PlayoffsState {
    pub postseason: Option<Postseason>,
    /// A setup, state or reset request is out.
    pub pending: bool,
    pub status: Option<String>,
    pub scroll_offset: u16,
}

// ---------------------------------------------------------------------------
// Requests that disable their triggering action while in flight
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
pub struct InFlight {
    pub simulate: bool,
    pub main_llm: bool,
    pub sub_llm: bool,
    pub playoff_game: bool,
}

// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub screen: Screen,
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// Blocking message; any key dismisses it.
    pub alert: Option<String>,

    pub api_key: Option<String>,
    pub selected_team: Option<String>,

    pub key_entry: KeyEntryState,
    pub team_select: TeamSelectState,
    pub chat: ChatState,
    pub season: SeasonState,
    pub views: LeagueViews,
    pub rosters: HashMap<String, CachedView<Roster>>,
    pub tactics: HashMap<String, Tactics>,
    pub tactics_view: TacticsViewState,
    pub playoffs: PlayoffsState,
    pub first_message_shown: HashSet<String>,
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self, team_id: &str) -> Option<&Roster> {
        self.rosters.get(team_id).and_then(CachedView::data)
    }

    pub fn selected_roster(&self) -> Option<&Roster> {
        self.roster(self.selected_team.as_deref()?)
    }

    pub fn selected_tactics(&self) -> Option<&Tactics> {
        self.tactics.get(self.selected_team.as_deref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_shape() {
        assert!(is_plausible_api_key("AIzaSyA-12345_abc"));
        assert!(!is_plausible_api_key("AIza123"));
        assert!(!is_plausible_api_key("sk-1234567890abcdef"));
        assert!(!is_plausible_api_key("AIza1234567890 space"));
    }

    #[test]
    fn team_cursor_stays_in_bounds() {
        let mut sel = TeamSelectState::default();
        sel.up();
        assert_eq!(sel.highlighted(), "ATL");
        for _ in 0..50 {
            sel.down();
        }
        assert_eq!(sel.highlighted(), "WAS");
    }

    #[test]
    fn history_window_is_last_eight_turns() {
        let mut chat = ChatState::default();
        for n in 0..11 {
            chat.push(ChatRole::User, format!("turn {n}"));
        }
        let recent = chat.recent_history();
        assert_eq!(recent.len(), CONTEXT_HISTORY_TURNS);
        assert_eq!(recent[0].text, "turn 3");
    }

    fn game(id: &str, date: &str, scores: Option<(u32, u32)>) -> ScheduleGame {
        ScheduleGame {
            game_id: id.into(),
            date: date.into(),
            home_team_id: "BOS".into(),
            away_team_id: "NYK".into(),
            home_score: scores.map(|s| s.0),
            away_score: scores.map(|s| s.1),
            result_for_user_team: None,
        }
    }

    #[test]
    fn season_tracks_next_unplayed_game() {
        let mut season = SeasonState::default();
        season.schedule.store(
            TeamSchedule {
                team_id: "BOS".into(),
                games: vec![
                    game("g1", "2025-10-21", Some((110, 100))),
                    game("g2", "2025-10-23", Some((99, 101))),
                    game("g3", "2025-10-25", None),
                ],
            },
            None,
        );
        season.sync_current_index();
        season.rebuild_scores();
        assert_eq!(season.current_index, 2);
        assert_eq!(season.next_game().map(|g| g.game_id.as_str()), Some("g3"));
        assert_eq!(season.scores[0].game_id, "g2");
        assert_eq!(
            season.latest_games_text().lines().next(),
            Some("[2025-10-23] Boston Celtics vs New York Knicks : 99 - 101")
        );
    }

    #[test]
    fn tactics_rows_cover_settings_then_roster() {
        let mut view = TacticsViewState::default();
        assert_eq!(view.row(3), Some(TacticsRow::Setting(TacticsSetting::Pace)));
        for _ in 0..20 {
            view.down(3);
        }
        assert_eq!(view.cursor, TACTICS_SETTINGS.len() + 2);
        assert_eq!(view.row(3), Some(TacticsRow::Player(2)));
        assert_eq!(view.row(1), None);
    }
}
