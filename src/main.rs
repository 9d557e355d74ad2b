mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{
    API_KEY_ENV, LOG_ENV, MAIN_PROMPT_ENV, SERVER_ENV, SUB_PROMPT_ENV,
};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{debug, error};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(server_override) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Warn)?;
    tui_logger::set_default_level(log::LevelFilter::Warn);

    let mut app = App::new();
    if let Some(url) = server_override {
        app.settings.server_url = url;
    }
    let server_url = app.settings.server_url.clone();
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(&server_url, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

/// `Some(server override)` when the UI should start, `None` after printing
/// help or the version.
fn handle_cli_args() -> Option<Option<String>> {
    let mut args = std::env::args().skip(1);
    let mut server = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return None;
            }
            "-V" | "--version" => {
                println!("gmtui {}", env!("CARGO_PKG_VERSION"));
                return None;
            }
            "-s" | "--server" => {
                let Some(url) = args.next() else {
                    eprintln!("--server needs a URL\n\n{}", usage_text());
                    std::process::exit(2);
                };
                if let Err(e) = reqwest::Url::parse(&url) {
                    eprintln!("Invalid server URL {url}: {e}");
                    std::process::exit(2);
                }
                server = Some(url.trim_end_matches('/').to_string());
            }
            _ => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
        }
    }
    Some(server)
}

fn usage_text() -> String {
    format!(
        "gmtui - basketball GM terminal client

Usage:
  gmtui [--server <url>]
  gmtui --help
  gmtui --version

Environment:
  {SERVER_ENV}        Backend base URL (default http://127.0.0.1:8000)
  {API_KEY_ENV}       Pre-fills the API key screen
  {LOG_ENV}           Log level: error, warn, info, debug, trace
  {MAIN_PROMPT_ENV}   System prompt for the GM assistant
  {SUB_PROMPT_ENV}    System prompt for the state updater"
    )
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let guard = app.lock().await;
            debug!("starting against {}", guard.settings.server_url);
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    let follow_ups = apply_response(&mut guard, response);
    drop(guard);

    for request in follow_ups {
        let _ = network_requests.send(request).await;
    }
    !loading.is_loading
}

/// Feed one response into the app and collect the requests it triggers.
fn apply_response(app: &mut App, response: NetworkResponse) -> Vec<NetworkRequest> {
    let mut follow_ups = Vec::new();
    match response {
        NetworkResponse::LoadingStateChanged { .. } => {}
        NetworkResponse::KeyValidated { api_key } => app.on_key_validated(api_key),
        NetworkResponse::FirstMessageLoaded { team_id, text } => {
            app.on_first_message(team_id, text)
        }
        NetworkResponse::RosterLoaded { roster } => app.on_roster_loaded(roster),
        NetworkResponse::ScheduleLoaded { schedule } => app.on_schedule_loaded(schedule),
        NetworkResponse::StandingsLoaded { standings } => app.on_standings_loaded(standings),
        NetworkResponse::StatsLoaded { leaders } => app.on_stats_loaded(leaders),
        NetworkResponse::TeamsLoaded { teams } => follow_ups.extend(app.on_teams_loaded(teams)),
        NetworkResponse::TeamDetailLoaded { detail } => app.on_team_detail_loaded(detail),
        NetworkResponse::WeeklyNewsLoaded { news } => app.on_weekly_news_loaded(news),
        NetworkResponse::GameSimulated { game, league, result } => {
            follow_ups.extend(app.on_game_simulated(game, league, result))
        }
        NetworkResponse::ChatReplied { reply } => app.on_chat_replied(reply),
        NetworkResponse::StateUpdated { update } => app.on_state_updated(update),
        NetworkResponse::PostseasonLoaded { postseason } => {
            follow_ups.extend(app.on_postseason_loaded(postseason))
        }
        NetworkResponse::PlayoffGamePlayed { postseason } => {
            follow_ups.extend(app.on_playoff_game_played(postseason))
        }
        NetworkResponse::PlayoffLeadersLoaded { leaders } => app.on_playoff_leaders_loaded(leaders),
        NetworkResponse::PlayoffNewsLoaded { items } => app.on_playoff_news_loaded(items),
        NetworkResponse::Batch(responses) => {
            for response in responses {
                follow_ups.extend(apply_response(app, response));
            }
        }
        NetworkResponse::Error { origin, message } => {
            error!("{origin:?} request failed: {message}");
            app.on_error(origin, message);
        }
    }
    follow_ups
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide).unwrap();
    execute!(stdout, terminal::EnterAlternateScreen).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    terminal::enable_raw_mode().unwrap();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0)).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    execute!(stdout, terminal::LeaveAlternateScreen).unwrap();
    execute!(stdout, cursor::Show).unwrap();
    terminal::disable_raw_mode().unwrap();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
