use crate::postseason::Postseason;
use crate::wire::{
    self, AdvanceLeagueResponse, ChatMainResponse, ErrorBody, LeaderRowRaw, LeadersResponse,
    PlayoffLeadersResponse, PlayoffNewsResponse, RosterResponse, ScheduleResponse,
    StandingRowRaw, StandingsResponse, StateUpdateResponse, TeamCardRaw, TeamDetailResponse,
    ValidateKeyResponse, WeeklyNewsResponse,
};
use crate::{
    ChatTurn, LeaderRow, LeagueAdvance, NewsItem, PlayerId, PlayoffLeaderRow, PlayoffLeaders,
    PlayoffNewsItem, Roster, RosterPlayer, ScheduleGame, SimulateGame, SimulatedGame,
    StandingRow, Standings, StatCategory, StatLeaders, StateUpdate, TeamCard, TeamDetail,
    TeamDetailPlayer, TeamSchedule, TeamSummary, WeeklyNews,
};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Generous bound for endpoints that wait on an LLM round trip.
const LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the GM simulation backend.
#[derive(Debug, Clone)]
pub struct GmApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    /// Non-success status with the server's `detail` text (or a generic message).
    Api(u16, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(status, detail) => write!(f, "API error ({status}): {detail}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Short text suitable for an inline status line: the server's own detail
    /// when it sent one.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Api(_, detail) | ApiError::NotFound(detail) | ApiError::Other(detail) => {
                detail.clone()
            }
            other => other.to_string(),
        }
    }
}

impl GmApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent(concat!("gmtui/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(30),
        }
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Ask the server to check a Gemini API key. A rejected key comes back as
    /// `ApiError::Api(401, detail)`.
    pub async fn validate_key(&self, api_key: &str) -> ApiResult<()> {
        let raw: ValidateKeyResponse = self
            .post("/api/validate-key", &json!({ "apiKey": api_key }), self.timeout)
            .await?;
        if raw.valid {
            Ok(())
        } else {
            Err(ApiError::Other("API key was rejected".into()))
        }
    }

    /// Per-team opening narration. `None` when the server has no file for the team.
    pub async fn fetch_first_message(&self, team_id: &str) -> ApiResult<Option<String>> {
        let url = self.url(&format!("/static/prompt/first_messages/{team_id}.txt"));
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, &url).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    // -----------------------------------------------------------------------
    // Team data
    // -----------------------------------------------------------------------

    pub async fn fetch_roster(&self, team_id: &str) -> ApiResult<Roster> {
        let raw: RosterResponse = self.get(&format!("/api/roster-summary/{team_id}")).await?;
        Ok(map_roster(team_id, raw))
    }

    pub async fn fetch_schedule(&self, team_id: &str) -> ApiResult<TeamSchedule> {
        let raw: ScheduleResponse = self.get(&format!("/api/team-schedule/{team_id}")).await?;
        Ok(map_schedule(team_id, raw))
    }

    pub async fn fetch_teams(&self) -> ApiResult<Vec<TeamCard>> {
        let raw: Vec<TeamCardRaw> = self.get("/api/teams").await?;
        Ok(raw.into_iter().filter_map(map_team_card).collect())
    }

    pub async fn fetch_team_detail(&self, team_id: &str) -> ApiResult<TeamDetail> {
        let raw: TeamDetailResponse = self.get(&format!("/api/team-detail/{team_id}")).await?;
        Ok(map_team_detail(team_id, raw))
    }

    // -----------------------------------------------------------------------
    // League views
    // -----------------------------------------------------------------------

    pub async fn fetch_standings(&self) -> ApiResult<Standings> {
        let raw: StandingsResponse = self.get("/api/standings").await?;
        Ok(map_standings(raw))
    }

    pub async fn fetch_stat_leaders(&self) -> ApiResult<StatLeaders> {
        let raw: LeadersResponse = self.get("/api/stats/leaders").await?;
        Ok(map_leaders(raw))
    }

    pub async fn fetch_weekly_news(&self, api_key: &str) -> ApiResult<WeeklyNews> {
        let raw: WeeklyNewsResponse = self
            .post("/api/news/week", &json!({ "apiKey": api_key }), LLM_TIMEOUT)
            .await?;
        Ok(map_weekly_news(raw))
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Auto-simulate every other team's games up to `target_date`.
    pub async fn advance_league(
        &self,
        target_date: &str,
        user_team_id: Option<&str>,
    ) -> ApiResult<LeagueAdvance> {
        let body = json!({ "target_date": target_date, "user_team_id": user_team_id });
        let raw: AdvanceLeagueResponse =
            self.post("/api/advance-league", &body, self.timeout).await?;
        Ok(LeagueAdvance {
            target_date: raw.target_date.unwrap_or_else(|| target_date.to_string()),
            simulated_count: wire::count(&raw.simulated_count).unwrap_or(0),
        })
    }

    pub async fn simulate_game(&self, request: &SimulateGame) -> ApiResult<SimulatedGame> {
        let raw: Value = self.post("/api/simulate-game", request, self.timeout).await?;
        Ok(map_simulated_game(raw))
    }

    // -----------------------------------------------------------------------
    // LLM
    // -----------------------------------------------------------------------

    /// Main narrative LLM. `context` is already serialized JSON.
    pub async fn chat_main(
        &self,
        api_key: &str,
        main_prompt: &str,
        user_input: &str,
        context: &str,
    ) -> ApiResult<String> {
        let body = json!({
            "apiKey": api_key,
            "mainPrompt": main_prompt,
            "userInput": user_input,
            "context": context,
        });
        let raw: ChatMainResponse = self.post("/api/chat-main", &body, LLM_TIMEOUT).await?;
        Ok(raw
            .reply
            .filter(|r| !r.trim().is_empty())
            .or(raw.answer)
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Secondary LLM that digests engine output after a simulated game.
    pub async fn state_update(
        &self,
        api_key: &str,
        sub_prompt: &str,
        engine_output: &Value,
        current_state: Option<&Value>,
    ) -> ApiResult<StateUpdate> {
        let body = json!({
            "apiKey": api_key,
            "subPrompt": sub_prompt,
            "engineOutput": engine_output,
            "currentState": current_state,
        });
        let raw: StateUpdateResponse = self.post("/api/state-update", &body, LLM_TIMEOUT).await?;
        Ok(StateUpdate {
            raw: raw.raw,
            parsed: raw.parsed.unwrap_or(Value::Null),
        })
    }

    // -----------------------------------------------------------------------
    // Postseason
    // -----------------------------------------------------------------------

    pub async fn postseason_setup(&self, my_team_id: &str) -> ApiResult<Postseason> {
        self.post("/api/postseason/setup", &json!({ "my_team_id": my_team_id }), self.timeout)
            .await
    }

    pub async fn postseason_state(&self) -> ApiResult<Postseason> {
        self.get("/api/postseason/state").await
    }

    pub async fn postseason_reset(&self) -> ApiResult<Postseason> {
        self.post("/api/postseason/reset", &json!({}), self.timeout).await
    }

    pub async fn play_my_play_in_game(&self) -> ApiResult<Postseason> {
        self.post("/api/postseason/play-in/my-team-game", &json!({}), self.timeout)
            .await
    }

    pub async fn advance_my_series_game(&self) -> ApiResult<Postseason> {
        self.post(
            "/api/postseason/playoffs/advance-my-team-game",
            &json!({}),
            self.timeout,
        )
        .await
    }

    pub async fn fetch_playoff_leaders(&self) -> ApiResult<PlayoffLeaders> {
        let raw: PlayoffLeadersResponse = self.get("/api/stats/playoffs/leaders").await?;
        Ok(map_playoff_leaders(raw))
    }

    pub async fn fetch_playoff_news(&self) -> ApiResult<Vec<PlayoffNewsItem>> {
        let raw: PlayoffNewsResponse =
            self.post("/api/news/playoffs", &json!({}), LLM_TIMEOUT).await?;
        Ok(map_playoff_news(raw))
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        decode(response, &url).await
    }

    async fn post<B, T>(&self, path: &str, body: &B, timeout: Duration) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        decode(response, &url).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
    check_status(response, url)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parsing(e, url.to_owned()))
}

async fn check_status(response: Response, url: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| format!("{url} returned {status}"));
    if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound(detail))
    } else {
        Err(ApiError::Api(status.as_u16(), detail))
    }
}

/// Pull `detail` out of a FastAPI-style error body.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Build the JSON context string handed to the main LLM.
pub fn chat_context(
    team_id: Option<&str>,
    team_name: &str,
    current_date: Option<&str>,
    progress_turns: u32,
    latest_games: &str,
    history: &[ChatTurn],
) -> String {
    json!({
        "selectedTeamId": team_id,
        "selectedTeamName": team_name,
        "currentDate": current_date,
        "progressTurns": progress_turns,
        "latestGames": latest_games,
        "history": history,
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn map_roster(team_id: &str, raw: RosterResponse) -> Roster {
    let players = raw
        .players
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            let id = p.player_id?.into_string();
            Some(RosterPlayer {
                name: p.name.unwrap_or_else(|| id.clone()),
                id: PlayerId(id),
                pos: p.pos.unwrap_or_default(),
                overall: wire::num(&p.overall),
            })
        })
        .collect();
    Roster {
        team_id: raw.team_id.unwrap_or_else(|| team_id.to_string()),
        players,
    }
}

fn map_schedule(team_id: &str, raw: ScheduleResponse) -> TeamSchedule {
    let games = raw
        .games
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, g)| ScheduleGame {
            game_id: g
                .game_id
                .map(wire::LooseId::into_string)
                .unwrap_or_else(|| format!("game-{idx}")),
            date: g.date.unwrap_or_default(),
            home_team_id: g.home_team_id.unwrap_or_default(),
            away_team_id: g.away_team_id.unwrap_or_default(),
            home_score: wire::count(&g.home_score),
            away_score: wire::count(&g.away_score),
            result_for_user_team: g.result_for_user_team,
        })
        .collect();
    TeamSchedule {
        team_id: raw.team_id.unwrap_or_else(|| team_id.to_string()),
        games,
    }
}

fn map_standing_row(raw: StandingRowRaw) -> Option<StandingRow> {
    Some(StandingRow {
        team_id: raw.team_id?,
        rank: wire::count(&raw.rank),
        wins: wire::count(&raw.wins).unwrap_or(0),
        losses: wire::count(&raw.losses).unwrap_or(0),
        win_pct: wire::num(&raw.win_pct),
        games_behind: wire::num(&raw.gb),
        points_for: wire::num(&raw.pf),
        points_against: wire::num(&raw.pa),
        point_diff: wire::num(&raw.point_diff),
        division: raw.division,
    })
}

fn map_standings(raw: StandingsResponse) -> Standings {
    let rows = |v: Option<Vec<StandingRowRaw>>| -> Vec<StandingRow> {
        v.unwrap_or_default()
            .into_iter()
            .filter_map(map_standing_row)
            .collect()
    };
    Standings {
        east: rows(raw.east),
        west: rows(raw.west),
    }
}

fn value_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn map_leader_row(category: StatCategory, raw: LeaderRowRaw) -> LeaderRow {
    LeaderRow {
        name: raw.name.unwrap_or_default(),
        team_id: raw.team_id.unwrap_or_default(),
        games_played: wire::count(&raw.gp).or_else(|| wire::count(&raw.games_played)),
        value: raw.rest.get(category.key()).and_then(value_f64),
    }
}

fn map_leaders(raw: LeadersResponse) -> StatLeaders {
    let mut categories = BTreeMap::new();
    for (key, rows) in raw.leaders.unwrap_or_default() {
        let Some(category) = StatCategory::all().into_iter().find(|c| c.key() == key) else {
            continue;
        };
        let rows = rows
            .into_iter()
            .map(|r| map_leader_row(category, r))
            .collect();
        categories.insert(category, rows);
    }
    StatLeaders {
        categories,
        updated_at: raw.updated_at,
    }
}

fn map_team_card(raw: TeamCardRaw) -> Option<TeamCard> {
    Some(TeamCard {
        team_id: raw.team_id?,
        conference: raw.conference,
        division: raw.division,
        wins: wire::count(&raw.wins),
        losses: wire::count(&raw.losses),
        win_pct: wire::num(&raw.win_pct),
        tendency: raw.tendency,
        payroll: wire::num(&raw.payroll),
        cap_space: wire::num(&raw.cap_space),
    })
}

fn map_team_detail(team_id: &str, raw: TeamDetailResponse) -> TeamDetail {
    let s = raw.summary.unwrap_or_default();
    let summary = TeamSummary {
        conference: s.conference,
        division: s.division,
        wins: wire::count(&s.wins),
        losses: wire::count(&s.losses),
        win_pct: wire::num(&s.win_pct),
        point_diff: wire::num(&s.point_diff),
        tendency: s.tendency,
        payroll: wire::num(&s.payroll),
        cap_space: wire::num(&s.cap_space),
        conference_rank: wire::count(&s.conference_rank),
    };
    let roster = raw
        .roster
        .unwrap_or_default()
        .into_iter()
        .map(|p| TeamDetailPlayer {
            name: p.name.unwrap_or_default(),
            pos: p.pos.unwrap_or_default(),
            overall: wire::num(&p.ovr),
            age: wire::count(&p.age),
            salary: wire::num(&p.salary),
            pts: wire::num(&p.pts),
            ast: wire::num(&p.ast),
            reb: wire::num(&p.reb),
            three_pm: wire::num(&p.three_pm),
        })
        .collect();
    TeamDetail {
        team_id: team_id.to_string(),
        summary,
        roster,
    }
}

fn map_weekly_news(raw: WeeklyNewsResponse) -> WeeklyNews {
    let items = raw
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|n| NewsItem {
            date: n.date,
            title: n.title.unwrap_or_default(),
            summary: n.summary.unwrap_or_default(),
            tags: n.tags.unwrap_or_default(),
        })
        .collect();
    WeeklyNews {
        current_date: raw.current_date,
        items,
    }
}

fn map_simulated_game(raw: Value) -> SimulatedGame {
    let final_score = raw
        .get("final_score")
        .and_then(Value::as_object)
        .map(|scores| {
            scores
                .iter()
                .filter_map(|(team, v)| {
                    value_f64(v)
                        .filter(|n| *n >= 0.0)
                        .map(|n| (team.clone(), n.round() as u32))
                })
                .collect()
        })
        .unwrap_or_default();
    let winner = raw
        .get("winner")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    SimulatedGame {
        final_score,
        winner,
        raw,
    }
}

fn map_playoff_leaders(raw: PlayoffLeadersResponse) -> PlayoffLeaders {
    let categories = raw
        .leaders
        .unwrap_or_default()
        .into_iter()
        .map(|(stat, rows)| {
            let rows = rows
                .into_iter()
                .map(|r| PlayoffLeaderRow {
                    player: r.player.or(r.name).unwrap_or_default(),
                    team_id: r.team.or(r.team_id).unwrap_or_default(),
                    value: wire::num(&r.value),
                })
                .collect();
            (stat, rows)
        })
        .collect();
    PlayoffLeaders { categories }
}

fn map_playoff_news(raw: PlayoffNewsResponse) -> Vec<PlayoffNewsItem> {
    raw.items
        .unwrap_or_default()
        .into_iter()
        .map(|n| PlayoffNewsItem {
            headline: n.headline.or(n.title).unwrap_or_else(|| "Untitled".to_string()),
            summary: n.summary.unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatRole;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = GmApi::new("http://localhost:8000/ ");
        assert_eq!(api.url("/api/teams"), "http://localhost:8000/api/teams");
    }

    #[test]
    fn error_detail_reads_fastapi_body() {
        assert_eq!(
            error_detail(r#"{"detail": "Invalid API key"}"#).as_deref(),
            Some("Invalid API key")
        );
        assert_eq!(error_detail(r#"{"detail": null}"#), None);
        assert_eq!(error_detail("Internal Server Error"), None);
        assert!(error_detail(r#"{"detail": [{"loc": ["body"]}]}"#).is_some());
    }

    #[test]
    fn roster_accepts_numeric_and_string_ids() {
        let raw: RosterResponse = serde_json::from_str(
            r#"{"team_id": "BOS", "players": [
                {"player_id": 101, "name": "A", "pos": "G", "overall": 88.5},
                {"player_id": "p-2", "name": "B", "pos": "F", "overall": "79"},
                {"name": "no id"}
            ]}"#,
        )
        .expect("roster json");
        let roster = map_roster("BOS", raw);
        assert_eq!(roster.players.len(), 2);
        assert_eq!(roster.players[0].id, PlayerId("101".into()));
        assert_eq!(roster.players[1].overall, Some(79.0));
    }

    #[test]
    fn leaders_pick_value_from_category_key() {
        let raw: LeadersResponse = serde_json::from_str(
            r#"{"leaders": {
                "PTS": [{"name": "Scorer", "team_id": "DAL", "GP": 10, "PTS": 31.4}],
                "3PM": [{"name": "Shooter", "team_id": "GSW", "games_played": 9, "3PM": "4.6"}],
                "BLK": [{"name": "ignored"}]
            }, "updated_at": "2025-11-01"}"#,
        )
        .expect("leaders json");
        let leaders = map_leaders(raw);
        let pts = leaders.rows(StatCategory::Points);
        assert_eq!(pts[0].value, Some(31.4));
        assert_eq!(pts[0].games_played, Some(10));
        let threes = leaders.rows(StatCategory::Threes);
        assert_eq!(threes[0].value, Some(4.6));
        assert_eq!(threes[0].games_played, Some(9));
        assert!(leaders.rows(StatCategory::Assists).is_empty());
        assert_eq!(leaders.updated_at.as_deref(), Some("2025-11-01"));
    }

    #[test]
    fn simulated_game_reads_final_score_map() {
        let raw = json!({
            "final_score": {"BOS": 112, "NYK": 104},
            "winner": "BOS",
            "boxscore": {},
            "logs": []
        });
        let game = map_simulated_game(raw);
        assert_eq!(game.score_for("BOS"), Some(112));
        assert_eq!(game.score_for("NYK"), Some(104));
        assert_eq!(game.winner.as_deref(), Some("BOS"));
        assert!(game.raw.get("boxscore").is_some());
    }

    #[test]
    fn schedule_missing_scores_stay_unplayed() {
        let raw: ScheduleResponse = serde_json::from_str(
            r#"{"team_id": "MIA", "games": [
                {"game_id": "g1", "date": "2025-10-22", "home_team_id": "MIA", "away_team_id": "ORL", "home_score": 101, "away_score": 99, "result_for_user_team": "W"},
                {"game_id": "g2", "date": "2025-10-24", "home_team_id": "ATL", "away_team_id": "MIA", "home_score": null, "away_score": null}
            ]}"#,
        )
        .expect("schedule json");
        let schedule = map_schedule("MIA", raw);
        assert!(schedule.games[0].is_played());
        assert!(!schedule.games[1].is_played());
    }

    #[test]
    fn chat_context_is_valid_json() {
        let history = vec![ChatTurn {
            role: ChatRole::User,
            text: "hi".into(),
        }];
        let ctx = chat_context(Some("BOS"), "Boston Celtics", None, 3, "", &history);
        let parsed: Value = serde_json::from_str(&ctx).expect("context json");
        assert_eq!(parsed["selectedTeamId"], "BOS");
        assert_eq!(parsed["progressTurns"], 3);
        assert_eq!(parsed["history"][0]["role"], "user");
    }

    #[test]
    fn api_error_detail_prefers_server_text() {
        let err = ApiError::Api(401, "Invalid API key".into());
        assert_eq!(err.detail(), "Invalid API key");
        assert_eq!(err.to_string(), "API error (401): Invalid API key");
    }
}
