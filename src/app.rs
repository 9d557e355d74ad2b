use crate::state::app_settings::AppSettings;
use crate::state::app_state::{
    AppState, KeyEntryState, LeagueViews, PlayoffsState, SeasonState, TacticsRow, TacticsSetting,
    TacticsViewState, is_plausible_api_key,
};
use crate::state::cache::CachedView;
use crate::state::messages::{NetworkRequest, Origin};
use crate::state::postseason::{
    find_my_series, game_line, game_log, pending_play_in_game, team_status,
};
use crate::state::tactics::{LineupError, MINUTES_STEP, Role, Tactics};
use gm_api::client::chat_context;
use gm_api::postseason::Postseason;
use gm_api::{
    ChatRole, LeagueAdvance, PlayoffLeaders, PlayoffNewsItem, Roster, ScheduleGame,
    SimulatedGame, Standings, StatLeaders, StateUpdate, TeamCard, TeamDetail, TeamSchedule,
    WeeklyNews, team_name,
};
use log::{debug, error, info, warn};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

const TACTICS_FILE: &str = "tactics.json";

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Screen {
    #[default]
    ApiKey,
    TeamSelect,
    Main,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Home,
    Tactics,
    Scores,
    Schedule,
    Standings,
    Stats,
    Teams,
    News,
    Playoffs,
    Help,
}

impl MenuItem {
    /// Tab bar order. Digit keys 1-9 select by position.
    pub const TABS: [MenuItem; 9] = [
        MenuItem::Home,
        MenuItem::Tactics,
        MenuItem::Scores,
        MenuItem::Schedule,
        MenuItem::Standings,
        MenuItem::Stats,
        MenuItem::Teams,
        MenuItem::News,
        MenuItem::Playoffs,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MenuItem::Home => "Home",
            MenuItem::Tactics => "Tactics",
            MenuItem::Scores => "Scores",
            MenuItem::Schedule => "Schedule",
            MenuItem::Standings => "Standings",
            MenuItem::Stats => "Stats",
            MenuItem::Teams => "Teams",
            MenuItem::News => "News",
            MenuItem::Playoffs => "Playoffs",
            MenuItem::Help => "Help",
        }
    }

    pub fn from_digit(digit: char) -> Option<MenuItem> {
        let idx = digit.to_digit(10)? as usize;
        idx.checked_sub(1).and_then(|i| MenuItem::TABS.get(i)).copied()
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let app = Self::with_settings(AppSettings::load());

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let mut state = AppState::new();
        if let Some(key) = &settings.api_key {
            state.key_entry.input = key.clone();
        }
        let mut app = Self { settings, state };
        match app.load_tactics_file() {
            Ok(saved) => app.state.tactics = saved.into_iter().collect(),
            Err(e) => debug!("no saved tactics: {e}"),
        }
        app
    }

    fn alert(&mut self, message: impl Into<String>) {
        self.state.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.state.alert = None;
    }

    // -----------------------------------------------------------------------
    // API key screen
    // -----------------------------------------------------------------------

    pub fn key_input_push(&mut self, c: char) {
        let entry = &mut self.state.key_entry;
        if !entry.validating {
            entry.input.push(c);
            entry.message = None;
        }
    }

    pub fn key_input_pop(&mut self) {
        let entry = &mut self.state.key_entry;
        if !entry.validating {
            entry.input.pop();
        }
    }

    pub fn submit_api_key(&mut self) -> Option<NetworkRequest> {
        let entry = &mut self.state.key_entry;
        if entry.validating {
            return None;
        }
        let api_key = entry.input.trim().to_string();
        if api_key.is_empty() {
            entry.message = Some("Enter your Gemini API key.".to_string());
            return None;
        }
        if !is_plausible_api_key(&api_key) {
            entry.message =
                Some("That does not look like a Gemini API key (AIza...).".to_string());
            return None;
        }
        entry.validating = true;
        entry.message = Some("Checking key...".to_string());
        Some(NetworkRequest::ValidateKey { api_key })
    }

    pub fn on_key_validated(&mut self, api_key: String) {
        info!("api key accepted");
        self.state.api_key = Some(api_key);
        self.state.key_entry = KeyEntryState::default();
        self.state.screen = Screen::TeamSelect;
    }

    // -----------------------------------------------------------------------
    // Team select
    // -----------------------------------------------------------------------

    /// Start a fresh save for `team_id`. Saved tactics survive the reset.
    pub fn select_team(&mut self, team_id: &str) -> Vec<NetworkRequest> {
        info!("selected {team_id}");
        let state = &mut self.state;
        state.selected_team = Some(team_id.to_string());
        state.season = SeasonState::default();
        state.views = LeagueViews::default();
        state.playoffs = PlayoffsState::default();
        state.tactics_view = TacticsViewState::default();
        state.chat.clear();
        state.rosters.clear();
        state.tactics.entry(team_id.to_string()).or_default();

        self.load_roster(team_id, false).into_iter().collect()
    }

    pub fn confirm_team(&mut self) -> Vec<NetworkRequest> {
        let Some(team_id) = self.state.selected_team.clone() else {
            self.alert("Select a team first.");
            return Vec::new();
        };
        self.state.screen = Screen::Main;
        self.state.active_tab = MenuItem::Home;

        let mut requests: Vec<NetworkRequest> =
            self.request_schedule(&team_id, false).into_iter().collect();
        if !self.state.first_message_shown.contains(&team_id) {
            requests.push(NetworkRequest::LoadFirstMessage { team_id });
        }
        requests
    }

    pub fn on_first_message(&mut self, team_id: String, text: Option<String>) {
        let Some(text) = text else {
            return;
        };
        if self.state.selected_team.as_deref() != Some(team_id.as_str()) {
            return;
        }
        self.state.chat.output = text.clone();
        self.state.chat.push(ChatRole::Assistant, text);
        self.state.first_message_shown.insert(team_id);
    }

    fn load_roster(&mut self, team_id: &str, force: bool) -> Option<NetworkRequest> {
        let view = self.state.rosters.entry(team_id.to_string()).or_default();
        view.begin_fetch(force)
            .then(|| NetworkRequest::LoadRoster { team_id: team_id.to_string() })
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) -> Vec<NetworkRequest> {
        if self.state.active_tab == next {
            return Vec::new();
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.load_tab(next, false)
    }

    pub fn refresh_active_tab(&mut self) -> Vec<NetworkRequest> {
        self.load_tab(self.state.active_tab, true)
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    /// Requests a tab needs before it can render. Cached views only go out
    /// again when `force` is set.
    fn load_tab(&mut self, tab: MenuItem, force: bool) -> Vec<NetworkRequest> {
        let mut requests = Vec::new();
        let Some(team_id) = self.state.selected_team.clone() else {
            return requests;
        };
        let views = &mut self.state.views;
        match tab {
            MenuItem::Home | MenuItem::Scores | MenuItem::Schedule => {
                requests.extend(self.request_schedule(&team_id, force))
            }
            MenuItem::Tactics => requests.extend(self.load_roster(&team_id, force)),
            MenuItem::Standings => {
                if views.standings.begin_fetch(force) {
                    requests.push(NetworkRequest::LoadStandings);
                }
            }
            MenuItem::Stats => {
                if views.stats.begin_fetch(force) {
                    requests.push(NetworkRequest::LoadStats);
                }
            }
            MenuItem::Teams => {
                if views.teams.begin_fetch(force) {
                    requests.push(NetworkRequest::LoadTeams);
                }
                requests.extend(self.load_highlighted_detail(force));
            }
            MenuItem::News => match self.state.api_key.clone() {
                Some(api_key) => {
                    if views.weekly_news.begin_fetch(force) {
                        requests.push(NetworkRequest::LoadWeeklyNews { api_key });
                    }
                }
                None => views.weekly_news.fail("an API key is required for news"),
            },
            MenuItem::Playoffs => {
                let playoffs = &mut self.state.playoffs;
                if !playoffs.pending && (force || playoffs.postseason.is_none()) {
                    playoffs.pending = true;
                    requests.push(NetworkRequest::PostseasonState);
                }
                requests.extend(self.load_playoff_extras(force));
            }
            MenuItem::Help => {}
        }
        requests
    }

    fn request_schedule(&mut self, team_id: &str, force: bool) -> Option<NetworkRequest> {
        let season = &mut self.state.season;
        if !season.schedule.begin_fetch(force) {
            return None;
        }
        season.schedule_requested_for = Some(team_id.to_string());
        Some(NetworkRequest::LoadSchedule { team_id: team_id.to_string() })
    }

    pub fn scroll_down(&mut self) {
        match self.state.active_tab {
            MenuItem::Home => self.state.chat.scroll_offset += 1,
            MenuItem::Schedule | MenuItem::Scores => self.state.season.scroll_offset += 1,
            MenuItem::News => self.state.views.news_scroll += 1,
            MenuItem::Playoffs => self.state.playoffs.scroll_offset += 1,
            _ => {}
        }
    }

    pub fn scroll_up(&mut self) {
        let offset = match self.state.active_tab {
            MenuItem::Home => &mut self.state.chat.scroll_offset,
            MenuItem::Schedule | MenuItem::Scores => &mut self.state.season.scroll_offset,
            MenuItem::News => &mut self.state.views.news_scroll,
            MenuItem::Playoffs => &mut self.state.playoffs.scroll_offset,
            _ => return,
        };
        *offset = offset.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Network response handlers
    // -----------------------------------------------------------------------

    pub fn on_roster_loaded(&mut self, roster: Roster) {
        let team_id = roster.team_id.clone();
        let had_tactics = match self.state.tactics.get_mut(&team_id) {
            Some(tactics) => {
                tactics.normalize(Some(&roster));
                true
            }
            None => false,
        };
        self.state.rosters.entry(team_id).or_default().store(roster, None);
        if had_tactics {
            self.persist_tactics();
        }
    }

    pub fn on_schedule_loaded(&mut self, schedule: TeamSchedule) {
        let season = &mut self.state.season;
        let answers_request =
            season.schedule_requested_for.as_deref() == Some(schedule.team_id.as_str());
        if answers_request {
            season.schedule_requested_for = None;
        }
        if self.state.selected_team.as_deref() != Some(schedule.team_id.as_str()) {
            debug!("dropping schedule for {}", schedule.team_id);
            if answers_request {
                let message = format!("schedule arrived for {}, not the selected team", schedule.team_id);
                season.schedule.fail(message);
            }
            return;
        }
        season.schedule.store(schedule, None);
        season.sync_current_index();
        season.rebuild_scores();
        if season.current_date.is_none() {
            season.current_date = season.scores.first().map(|g| g.date.clone());
        }
    }

    pub fn on_standings_loaded(&mut self, standings: Standings) {
        self.state.views.standings.store(standings, None);
    }

    pub fn on_stats_loaded(&mut self, leaders: StatLeaders) {
        let marker = leaders.updated_at.clone();
        self.state.views.stats.store(leaders, marker);
    }

    pub fn on_teams_loaded(&mut self, teams: Vec<TeamCard>) -> Option<NetworkRequest> {
        let views = &mut self.state.views;
        views.teams_cursor = views.teams_cursor.min(teams.len().saturating_sub(1));
        views.teams.store(teams, None);
        self.load_highlighted_detail(false)
    }

    pub fn on_team_detail_loaded(&mut self, detail: TeamDetail) {
        let team_id = detail.team_id.clone();
        self.state.views.team_detail_mut(&team_id).store(detail, None);
    }

    pub fn on_weekly_news_loaded(&mut self, news: WeeklyNews) {
        let marker = news.current_date.clone();
        self.state.views.news_scroll = 0;
        self.state.views.weekly_news.store(news, marker);
    }

    /// Route a failed request to the view that issued it.
    pub fn on_error(&mut self, origin: Origin, message: String) {
        let state = &mut self.state;
        match origin {
            Origin::KeyValidation => {
                state.key_entry.validating = false;
                state.key_entry.message = Some(message);
            }
            Origin::FirstMessage { team_id } => warn!("first message for {team_id}: {message}"),
            Origin::Roster { team_id } => state.rosters.entry(team_id).or_default().fail(message),
            Origin::Schedule => {
                state.season.schedule_requested_for = None;
                state.season.schedule.fail(message)
            }
            Origin::Standings => state.views.standings.fail(message),
            Origin::Stats => state.views.stats.fail(message),
            Origin::Teams => state.views.teams.fail(message),
            Origin::TeamDetail { team_id } => state.views.team_detail_mut(&team_id).fail(message),
            Origin::WeeklyNews => state.views.weekly_news.fail(message),
            Origin::PlayoffLeaders => state.views.playoff_leaders.fail(message),
            Origin::PlayoffNews => state.views.playoff_news.fail(message),
            Origin::Simulation => {
                error!("simulation failed: {message}");
                state.in_flight.simulate = false;
                state.alert = Some(format!("Game simulation failed: {message}"));
            }
            Origin::MainChat => {
                error!("main llm failed: {message}");
                state.in_flight.main_llm = false;
                state.chat.output = "(no reply)".to_string();
                state.alert = Some(format!("The main LLM call failed: {message}"));
            }
            Origin::StateUpdate => {
                state.in_flight.sub_llm = false;
                warn!("state update failed: {message}");
            }
            Origin::Postseason => {
                state.playoffs.pending = false;
                state.playoffs.status = Some(format!("Postseason request failed: {message}"));
            }
            Origin::PlayoffGame => {
                error!("playoff game failed: {message}");
                state.in_flight.playoff_game = false;
                state.playoffs.status = None;
                state.alert = Some(format!("Playoff game failed: {message}"));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Teams tab
    // -----------------------------------------------------------------------

    pub fn teams_cursor_down(&mut self) -> Option<NetworkRequest> {
        let len = self.state.views.teams.data().map_or(0, Vec::len);
        let views = &mut self.state.views;
        if views.teams_cursor + 1 < len {
            views.teams_cursor += 1;
        }
        self.load_highlighted_detail(false)
    }

    pub fn teams_cursor_up(&mut self) -> Option<NetworkRequest> {
        self.state.views.teams_cursor = self.state.views.teams_cursor.saturating_sub(1);
        self.load_highlighted_detail(false)
    }

    fn load_highlighted_detail(&mut self, force: bool) -> Option<NetworkRequest> {
        let team_id = self.state.views.highlighted_team()?.to_string();
        self.state
            .views
            .team_detail_mut(&team_id)
            .begin_fetch(force)
            .then_some(NetworkRequest::LoadTeamDetail { team_id })
    }

    // -----------------------------------------------------------------------
    // Home tab: prompt and simulation
    // -----------------------------------------------------------------------

    pub fn start_composing(&mut self) {
        self.state.chat.composing = true;
    }

    pub fn stop_composing(&mut self) {
        self.state.chat.composing = false;
    }

    pub fn chat_input_push(&mut self, c: char) {
        self.state.chat.input.push(c);
    }

    pub fn chat_input_pop(&mut self) {
        self.state.chat.input.pop();
    }

    pub fn submit_prompt(&mut self) -> Option<NetworkRequest> {
        if self.state.in_flight.main_llm {
            return None;
        }
        let Some(api_key) = self.state.api_key.clone() else {
            self.alert("Enter an API key first.");
            return None;
        };
        let user_input = self.state.chat.input.trim().to_string();
        if user_input.is_empty() {
            self.alert("Type a message first.");
            return None;
        }

        let state = &mut self.state;
        state.chat.push(ChatRole::User, user_input.clone());
        state.chat.input.clear();
        state.chat.composing = false;

        let team_id = state.selected_team.as_deref();
        let context = chat_context(
            team_id,
            team_id.map(team_name).unwrap_or_default(),
            state.season.current_date.as_deref(),
            state.season.progress_turns,
            &state.season.latest_games_text(),
            state.chat.recent_history(),
        );

        state.chat.output = "Thinking...".to_string();
        state.chat.scroll_offset = 0;
        state.in_flight.main_llm = true;
        Some(NetworkRequest::ChatMain {
            api_key,
            main_prompt: self.settings.main_prompt.clone(),
            user_input,
            context,
        })
    }

    pub fn on_chat_replied(&mut self, reply: String) {
        let chat = &mut self.state.chat;
        self.state.in_flight.main_llm = false;
        chat.output = if reply.trim().is_empty() {
            "(empty response)".to_string()
        } else {
            reply.clone()
        };
        chat.scroll_offset = 0;
        chat.push(ChatRole::Assistant, reply);
    }

    pub fn simulate_next_game(&mut self) -> Vec<NetworkRequest> {
        let Some(team_id) = self.state.selected_team.clone() else {
            self.alert("Select a team first.");
            return Vec::new();
        };
        if self.state.in_flight.simulate {
            return Vec::new();
        }
        if self.state.season.schedule.data().is_none() {
            self.alert("The schedule has not loaded yet.");
            return self.request_schedule(&team_id, false).into_iter().collect();
        }
        let Some(game) = self.state.season.next_game().cloned() else {
            return self.complete_season();
        };

        let roster = self.state.rosters.get(&team_id).and_then(CachedView::data);
        let tactics = self.state.tactics.entry(team_id.clone()).or_default();
        tactics.normalize(roster);
        let tactics = tactics.to_payload();

        debug!("simulating {} on {}", game.game_id, game.date);
        self.state.in_flight.simulate = true;
        vec![NetworkRequest::SimulateGame { user_team_id: team_id, game, tactics }]
    }

    pub fn on_game_simulated(
        &mut self,
        game: ScheduleGame,
        league: LeagueAdvance,
        result: SimulatedGame,
    ) -> Vec<NetworkRequest> {
        self.state.in_flight.simulate = false;
        let Some(team_id) = self.state.selected_team.clone() else {
            return Vec::new();
        };

        let home_score = result.score_for(&game.home_team_id);
        let away_score = result.score_for(&game.away_team_id);
        if home_score.is_none() || away_score.is_none() {
            warn!("simulation of {} returned no final score", game.game_id);
        }
        let outcome = match result.winner.as_deref() {
            Some(winner) if winner == team_id => Some("W"),
            Some(_) => Some("L"),
            None => None,
        };

        let season = &mut self.state.season;
        if let Some(slot) = season
            .schedule
            .data_mut()
            .and_then(|s| s.games.iter_mut().find(|g| g.game_id == game.game_id))
        {
            slot.home_score = home_score;
            slot.away_score = away_score;
            slot.result_for_user_team = outcome.map(str::to_string);
        }
        season.rebuild_scores();
        season.sync_current_index();
        season.progress_turns += 1;
        season.current_date = Some(game.date.clone());
        info!(
            "{} {} - {} {} ({} league games through {})",
            team_name(&game.home_team_id),
            home_score.map_or("-".to_string(), |s| s.to_string()),
            away_score.map_or("-".to_string(), |s| s.to_string()),
            team_name(&game.away_team_id),
            league.simulated_count,
            league.target_date,
        );

        let mut requests = Vec::new();
        if let Some(api_key) = self.state.api_key.clone() {
            let season = &self.state.season;
            let current_state = json!({
                "teamId": team_id,
                "currentDate": season.current_date,
                "progressTurns": season.progress_turns,
                "games": season.games(),
            });
            self.state.in_flight.sub_llm = true;
            requests.push(NetworkRequest::StateUpdate {
                api_key,
                sub_prompt: self.settings.sub_prompt.clone(),
                engine_output: result.raw,
                current_state: Some(current_state),
            });
        }
        if self.state.season.next_game().is_none() {
            requests.extend(self.complete_season());
        }
        requests
    }

    pub fn on_state_updated(&mut self, update: StateUpdate) {
        self.state.in_flight.sub_llm = false;
        debug!("state update: {}", update.raw.as_deref().unwrap_or("(no text)"));
    }

    /// Mark the regular season over and force the league views to reload.
    fn complete_season(&mut self) -> Vec<NetworkRequest> {
        if self.state.season.regular_season_completed {
            self.alert("The regular season is over. Set up the postseason on the Playoffs tab.");
            return Vec::new();
        }
        info!("regular season complete");
        self.state.season.regular_season_completed = true;
        self.alert("Regular season complete! Set up the postseason on the Playoffs tab.");

        let api_key = self.state.api_key.clone();
        let views = &mut self.state.views;
        views.standings.begin_fetch(true);
        views.stats.begin_fetch(true);
        views.teams.begin_fetch(true);
        if api_key.is_some() {
            views.weekly_news.begin_fetch(true);
        }
        vec![NetworkRequest::RefreshLeague { api_key }]
    }

    // -----------------------------------------------------------------------
    // Tactics tab
    // -----------------------------------------------------------------------

    fn selected_roster_len(&self) -> usize {
        self.state.selected_roster().map_or(0, |r| r.players.len())
    }

    pub fn tactics_cursor_down(&mut self) {
        let len = self.selected_roster_len();
        self.state.tactics_view.down(len);
    }

    pub fn tactics_cursor_up(&mut self) {
        self.state.tactics_view.up();
    }

    fn highlighted_player(&self) -> Option<gm_api::PlayerId> {
        match self.state.tactics_view.row(self.selected_roster_len())? {
            TacticsRow::Player(idx) => {
                self.state.selected_roster()?.players.get(idx).map(|p| p.id.clone())
            }
            TacticsRow::Setting(_) => None,
        }
    }

    /// Apply `edit` to the selected team's tactics. A rejected edit becomes
    /// an alert; an accepted one is saved to disk.
    fn edit_tactics(
        &mut self,
        edit: impl FnOnce(&mut Tactics, Option<&Roster>) -> Result<(), LineupError>,
    ) {
        let Some(team_id) = self.state.selected_team.clone() else {
            return;
        };
        let roster = self.state.rosters.get(&team_id).and_then(CachedView::data);
        let tactics = self.state.tactics.entry(team_id).or_default();
        match edit(tactics, roster) {
            Ok(()) => self.persist_tactics(),
            Err(e) => self.alert(e.to_string()),
        }
    }

    /// Left/right on the highlighted row.
    pub fn tactics_adjust(&mut self, step: i8) {
        let Some(row) = self.state.tactics_view.row(self.selected_roster_len()) else {
            return;
        };
        let player = self.highlighted_player();
        self.edit_tactics(|tactics, roster| {
            match row {
                TacticsRow::Setting(TacticsSetting::Pace) => {
                    tactics.set_pace(tactics.pace().saturating_add(step))
                }
                TacticsRow::Setting(TacticsSetting::Primary(side)) => {
                    tactics.cycle_primary_scheme(side)
                }
                TacticsRow::Setting(TacticsSetting::Secondary(side)) => {
                    tactics.cycle_secondary_scheme(side)
                }
                TacticsRow::Setting(TacticsSetting::SecondaryWeight(side)) => {
                    tactics.adjust_secondary_weight(side, step)
                }
                TacticsRow::Setting(TacticsSetting::Rotation) => {
                    let size = tactics.rotation_size().saturating_add_signed(step);
                    tactics.set_rotation_size(size, roster)
                }
                TacticsRow::Player(_) => {
                    if let Some(id) = &player {
                        return tactics.adjust_minutes(id, f64::from(step) * MINUTES_STEP);
                    }
                }
            }
            Ok(())
        });
    }

    /// Put the highlighted player into `role`, or take them out of it.
    pub fn tactics_toggle(&mut self, role: Role) {
        let Some(id) = self.highlighted_player() else {
            return;
        };
        self.edit_tactics(|tactics, _| match role {
            Role::Starter => tactics.toggle_starter(&id),
            Role::Bench => tactics.toggle_bench(&id),
        });
    }

    fn persist_tactics(&self) {
        if let Err(e) = self.save_tactics_file() {
            warn!("{e}");
        }
    }

    pub fn save_tactics_file(&self) -> Result<(), String> {
        let path = self.tactics_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let saved: BTreeMap<&String, &Tactics> = self.state.tactics.iter().collect();
        let payload = serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("serialize tactics failed: {e}"))?;
        std::fs::write(&path, payload).map_err(|e| format!("write tactics failed: {e}"))?;
        Ok(())
    }

    pub fn load_tactics_file(&self) -> Result<BTreeMap<String, Tactics>, String> {
        let path = self.tactics_path();
        let content =
            std::fs::read_to_string(&path).map_err(|e| format!("read tactics failed: {e}"))?;
        let mut saved = serde_json::from_str::<BTreeMap<String, Tactics>>(&content)
            .map_err(|e| format!("parse tactics failed: {e}"))?;
        for tactics in saved.values_mut() {
            tactics.normalize(None);
        }
        Ok(saved)
    }

    fn tactics_path(&self) -> PathBuf {
        match &self.settings.config_dir {
            Some(dir) => dir.join(TACTICS_FILE),
            None => config_path(TACTICS_FILE),
        }
    }

    // -----------------------------------------------------------------------
    // Playoffs tab
    // -----------------------------------------------------------------------

    pub fn postseason_setup(&mut self) -> Option<NetworkRequest> {
        let Some(my_team_id) = self.state.selected_team.clone() else {
            self.alert("Select a team first.");
            return None;
        };
        if self.state.in_flight.playoff_game || self.state.playoffs.pending {
            return None;
        }
        if !self.state.season.regular_season_completed {
            info!("setting up the postseason before the regular season ended");
        }
        let playoffs = &mut self.state.playoffs;
        playoffs.pending = true;
        playoffs.status = Some("Setting up the postseason...".to_string());
        Some(NetworkRequest::PostseasonSetup { my_team_id })
    }

    /// Leaders and news belong to the old bracket and are dropped with it.
    pub fn postseason_reset(&mut self) -> Option<NetworkRequest> {
        if self.state.in_flight.playoff_game || self.state.playoffs.pending {
            return None;
        }
        let views = &mut self.state.views;
        views.playoff_leaders = CachedView::default();
        views.playoff_news = CachedView::default();

        let playoffs = &mut self.state.playoffs;
        playoffs.pending = true;
        playoffs.status = Some("Resetting the postseason...".to_string());
        Some(NetworkRequest::PostseasonReset)
    }

    /// Play the user's next postseason game: a series game when the team has
    /// an open series, otherwise its pending play-in game.
    pub fn play_my_game(&mut self) -> Option<NetworkRequest> {
        if self.state.in_flight.playoff_game {
            return None;
        }
        let team_id = self.state.selected_team.clone()?;
        let Some(postseason) = &self.state.playoffs.postseason else {
            self.alert("Set up the postseason first.");
            return None;
        };

        let in_series = postseason
            .playoffs
            .as_ref()
            .and_then(|p| find_my_series(p, &team_id))
            .is_some();
        let request = if in_series {
            NetworkRequest::AdvanceMySeries
        } else if pending_play_in_game(postseason, &team_id).is_some() {
            NetworkRequest::PlayMyPlayInGame
        } else {
            let status = team_status(postseason, &team_id).describe();
            self.alert(format!("No game to play right now. {status}."));
            return None;
        };

        self.state.in_flight.playoff_game = true;
        self.state.playoffs.status = Some("Playing...".to_string());
        Some(request)
    }

    pub fn on_postseason_loaded(&mut self, postseason: Postseason) -> Vec<NetworkRequest> {
        let playoffs = &mut self.state.playoffs;
        playoffs.pending = false;
        playoffs.status = None;
        playoffs.postseason = Some(postseason);
        self.load_playoff_extras(false)
    }

    pub fn on_playoff_game_played(&mut self, postseason: Postseason) -> Vec<NetworkRequest> {
        self.state.in_flight.playoff_game = false;
        let status = self.state.selected_team.as_deref().and_then(|team_id| {
            game_log(&postseason, team_id)
                .first()
                .map(|g| format!("Final: {}", game_line(g)))
        });
        let playoffs = &mut self.state.playoffs;
        playoffs.status = status;
        playoffs.postseason = Some(postseason);
        self.state
            .views
            .playoff_leaders
            .begin_fetch(true)
            .then_some(NetworkRequest::LoadPlayoffLeaders)
            .into_iter()
            .collect()
    }

    /// Playoff leaders and news only exist once the postseason has begun.
    fn load_playoff_extras(&mut self, force: bool) -> Vec<NetworkRequest> {
        let started = self
            .state
            .playoffs
            .postseason
            .as_ref()
            .is_some_and(Postseason::is_started);
        if !started {
            return Vec::new();
        }
        let views = &mut self.state.views;
        let mut requests = Vec::new();
        if views.playoff_leaders.begin_fetch(force) {
            requests.push(NetworkRequest::LoadPlayoffLeaders);
        }
        if views.playoff_news.begin_fetch(force) {
            requests.push(NetworkRequest::LoadPlayoffNews);
        }
        requests
    }

    pub fn on_playoff_leaders_loaded(&mut self, leaders: PlayoffLeaders) {
        self.state.views.playoff_leaders.store(leaders, None);
    }

    pub fn on_playoff_news_loaded(&mut self, items: Vec<PlayoffNewsItem>) {
        self.state.views.playoff_news.store(items, None);
    }
}

fn config_path(file: &str) -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("gmtui").join(file);
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("gmtui").join(file);
    }
    PathBuf::from(file)
}
