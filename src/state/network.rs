use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::messages::Origin;
use futures_util::future;
use gm_api::client::{ApiError, ApiResult, GmApi};
use gm_api::{ScheduleGame, SimulateGame};
use log::{debug, error, warn};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

type HandlerResult = Result<NetworkResponse, ApiError>;

/// Receives requests and runs each one on its own task.
pub struct NetworkWorker {
    client: GmApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl NetworkWorker {
    pub fn new(
        server_url: &str,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: GmApi::new(server_url),
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
                start_loading_animation(&self.responses, &self.in_flight).await;
            }

            let client = self.client.clone();
            let responses = self.responses.clone();
            let in_flight = self.in_flight.clone();

            tokio::spawn(async move {
                let origin = request.origin();
                let result = dispatch(&client, request).await;
                debug!("{origin:?} request complete");

                if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                    stop_loading_animation(&responses, result.is_ok()).await;
                }

                let response = result.unwrap_or_else(|err| {
                    warn!("{origin:?} failed: {err}");
                    NetworkResponse::Error { origin, message: err.detail() }
                });

                if let Err(e) = responses.send(response).await {
                    error!("Failed to send network response: {e}");
                }
            });
        }
    }
}

async fn dispatch(api: &GmApi, request: NetworkRequest) -> HandlerResult {
    match request {
        NetworkRequest::ValidateKey { api_key } => {
            debug!("validating api key");
            api.validate_key(&api_key).await?;
            Ok(NetworkResponse::KeyValidated { api_key })
        }
        NetworkRequest::LoadFirstMessage { team_id } => {
            let text = api.fetch_first_message(&team_id).await?;
            if text.is_none() {
                warn!("no first message for {team_id}");
            }
            Ok(NetworkResponse::FirstMessageLoaded { team_id, text })
        }
        NetworkRequest::LoadRoster { team_id } => {
            debug!("loading roster for {team_id}");
            let roster = api.fetch_roster(&team_id).await?;
            Ok(NetworkResponse::RosterLoaded { roster })
        }
        NetworkRequest::LoadSchedule { team_id } => {
            debug!("loading schedule for {team_id}");
            let schedule = api.fetch_schedule(&team_id).await?;
            Ok(NetworkResponse::ScheduleLoaded { schedule })
        }
        NetworkRequest::LoadStandings => {
            let standings = api.fetch_standings().await?;
            Ok(NetworkResponse::StandingsLoaded { standings })
        }
        NetworkRequest::LoadStats => {
            let leaders = api.fetch_stat_leaders().await?;
            Ok(NetworkResponse::StatsLoaded { leaders })
        }
        NetworkRequest::LoadTeams => {
            let teams = api.fetch_teams().await?;
            Ok(NetworkResponse::TeamsLoaded { teams })
        }
        NetworkRequest::LoadTeamDetail { team_id } => {
            debug!("loading team detail for {team_id}");
            let detail = api.fetch_team_detail(&team_id).await?;
            Ok(NetworkResponse::TeamDetailLoaded { detail })
        }
        NetworkRequest::LoadWeeklyNews { api_key } => {
            let news = api.fetch_weekly_news(&api_key).await?;
            Ok(NetworkResponse::WeeklyNewsLoaded { news })
        }
        NetworkRequest::RefreshLeague { api_key } => {
            Ok(handle_refresh_league(api, api_key.as_deref()).await)
        }
        NetworkRequest::SimulateGame { user_team_id, game, tactics } => {
            handle_simulate_game(api, user_team_id, game, tactics).await
        }
        NetworkRequest::ChatMain { api_key, main_prompt, user_input, context } => {
            debug!("sending prompt to main llm");
            let reply = api.chat_main(&api_key, &main_prompt, &user_input, &context).await?;
            Ok(NetworkResponse::ChatReplied { reply })
        }
        NetworkRequest::StateUpdate { api_key, sub_prompt, engine_output, current_state } => {
            let update = api
                .state_update(&api_key, &sub_prompt, &engine_output, current_state.as_ref())
                .await?;
            Ok(NetworkResponse::StateUpdated { update })
        }
        NetworkRequest::PostseasonSetup { my_team_id } => {
            debug!("setting up postseason for {my_team_id}");
            let postseason = api.postseason_setup(&my_team_id).await?;
            Ok(NetworkResponse::PostseasonLoaded { postseason })
        }
        NetworkRequest::PostseasonState => {
            let postseason = api.postseason_state().await?;
            Ok(NetworkResponse::PostseasonLoaded { postseason })
        }
        NetworkRequest::PostseasonReset => {
            let postseason = api.postseason_reset().await?;
            Ok(NetworkResponse::PostseasonLoaded { postseason })
        }
        NetworkRequest::PlayMyPlayInGame => {
            let postseason = api.play_my_play_in_game().await?;
            Ok(NetworkResponse::PlayoffGamePlayed { postseason })
        }
        NetworkRequest::AdvanceMySeries => {
            let postseason = api.advance_my_series_game().await?;
            Ok(NetworkResponse::PlayoffGamePlayed { postseason })
        }
        NetworkRequest::LoadPlayoffLeaders => {
            let leaders = api.fetch_playoff_leaders().await?;
            Ok(NetworkResponse::PlayoffLeadersLoaded { leaders })
        }
        NetworkRequest::LoadPlayoffNews => {
            let items = api.fetch_playoff_news().await?;
            Ok(NetworkResponse::PlayoffNewsLoaded { items })
        }
    }
}

/// Fetch the league views concurrently. Each one fails on its own.
async fn handle_refresh_league(api: &GmApi, api_key: Option<&str>) -> NetworkResponse {
    debug!("refreshing league views");
    let news = async {
        match api_key {
            Some(key) => Some(api.fetch_weekly_news(key).await),
            None => None,
        }
    };
    let (standings, stats, teams, news) = future::join4(
        api.fetch_standings(),
        api.fetch_stat_leaders(),
        api.fetch_teams(),
        news,
    )
    .await;

    let mut batch = vec![
        settle(standings, Origin::Standings, |standings| {
            NetworkResponse::StandingsLoaded { standings }
        }),
        settle(stats, Origin::Stats, |leaders| NetworkResponse::StatsLoaded { leaders }),
        settle(teams, Origin::Teams, |teams| NetworkResponse::TeamsLoaded { teams }),
    ];
    if let Some(news) = news {
        batch.push(settle(news, Origin::WeeklyNews, |news| {
            NetworkResponse::WeeklyNewsLoaded { news }
        }));
    }
    NetworkResponse::Batch(batch)
}

/// Bring the rest of the league up to the game's date, then play the
/// user's game with their tactics on the correct side.
async fn handle_simulate_game(
    api: &GmApi,
    user_team_id: String,
    game: ScheduleGame,
    tactics: Option<Value>,
) -> HandlerResult {
    debug!("advancing league to {} before {}", game.date, game.game_id);
    let league = api.advance_league(&game.date, Some(&user_team_id)).await?;
    debug!("league advanced, {} games simulated", league.simulated_count);

    let user_is_home = game.home_team_id == user_team_id;
    let request = SimulateGame {
        home_team_id: game.home_team_id.clone(),
        away_team_id: game.away_team_id.clone(),
        home_tactics: if user_is_home { tactics.clone() } else { None },
        away_tactics: if user_is_home { None } else { tactics },
        game_date: Some(game.date.clone()).filter(|d| !d.is_empty()),
    };
    let result = api.simulate_game(&request).await?;
    Ok(NetworkResponse::GameSimulated { game, league, result })
}

/// Spin while any request is outstanding.
async fn start_loading_animation(
    responses: &mpsc::Sender<NetworkResponse>,
    in_flight: &Arc<AtomicUsize>,
) {
    let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
    let _ = responses.send(NetworkResponse::LoadingStateChanged { loading_state }).await;

    let responses = responses.clone();
    let in_flight = in_flight.clone();

    tokio::spawn(async move {
        let mut spinner_index = 1;
        let mut interval = tokio::time::interval(Duration::from_millis(33));
        loop {
            interval.tick().await;
            if in_flight.load(Ordering::SeqCst) == 0 {
                break;
            }
            loading_state.spinner_char = SPINNER_CHARS[spinner_index];
            spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
            let _ = responses.send(NetworkResponse::LoadingStateChanged { loading_state }).await;
        }
    });
}

async fn stop_loading_animation(responses: &mpsc::Sender<NetworkResponse>, is_ok: bool) {
    tokio::time::sleep(Duration::from_millis(15)).await;

    let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged {
            loading_state: LoadingState { is_loading: false, spinner_char },
        })
        .await;
}

fn settle<T>(
    result: ApiResult<T>,
    origin: Origin,
    ok: impl FnOnce(T) -> NetworkResponse,
) -> NetworkResponse {
    match result {
        Ok(value) => ok(value),
        Err(err) => {
            warn!("{origin:?} failed: {err}");
            NetworkResponse::Error { origin, message: err.detail() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers standings at once and never answers the main chat.
    async fn stalling_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = vec![0u8; 8192];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                if head.contains("/api/chat-main") {
                    held.push(stream);
                    continue;
                }
                let body = r#"{"east":[],"west":[]}"#;
                let reply = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes()).await;
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn slow_chat_does_not_hold_up_standings() {
        let url = stalling_server().await;
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        tokio::spawn(NetworkWorker::new(&url, req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::ChatMain {
                api_key: "AIzaTest".into(),
                main_prompt: String::new(),
                user_input: "who starts tonight?".into(),
                context: String::new(),
            })
            .await
            .unwrap();
        req_tx.send(NetworkRequest::LoadStandings).await.unwrap();

        let standings = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match resp_rx.recv().await {
                    Some(NetworkResponse::StandingsLoaded { standings }) => break Some(standings),
                    Some(NetworkResponse::LoadingStateChanged { .. }) => continue,
                    Some(other) => panic!("unexpected response {other:?}"),
                    None => break None,
                }
            }
        })
        .await
        .expect("standings stuck behind the chat request");

        let standings = standings.unwrap();
        assert!(standings.east.is_empty());
        assert!(standings.west.is_empty());
    }

    #[tokio::test]
    async fn spinner_keeps_running_while_a_request_is_outstanding() {
        let url = stalling_server().await;
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        tokio::spawn(NetworkWorker::new(&url, req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::ChatMain {
                api_key: "AIzaTest".into(),
                main_prompt: String::new(),
                user_input: "hi".into(),
                context: String::new(),
            })
            .await
            .unwrap();
        req_tx.send(NetworkRequest::LoadStandings).await.unwrap();

        let mut saw_standings = false;
        let mut stopped = false;
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(response) = resp_rx.recv().await {
                match response {
                    NetworkResponse::StandingsLoaded { .. } => saw_standings = true,
                    NetworkResponse::LoadingStateChanged { loading_state }
                        if !loading_state.is_loading =>
                    {
                        stopped = true
                    }
                    _ => {}
                }
            }
        })
        .await;

        assert!(saw_standings);
        assert!(!stopped, "spinner stopped with the chat still pending");
    }
}
