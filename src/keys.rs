use crate::app::{App, MenuItem, Screen};
use crate::state::messages::NetworkRequest;
use crate::state::tactics::Role;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let requests = route_key(&mut guard, key_event);
    drop(guard);

    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}

fn route_key(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        quit();
    }
    // any key closes an alert
    if app.state.alert.is_some() {
        app.dismiss_alert();
        return Vec::new();
    }

    match app.state.screen {
        Screen::ApiKey => api_key_screen(app, key_event),
        Screen::TeamSelect => team_select_screen(app, key_event),
        Screen::Main if app.state.chat.composing => compose(app, key_event),
        Screen::Main => main_screen(app, key_event),
    }
}

fn api_key_screen(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();
    match key_event.code {
        KeyCode::Esc => quit(),
        KeyCode::Enter => requests.extend(app.submit_api_key()),
        KeyCode::Backspace => app.key_input_pop(),
        Char(c) => app.key_input_push(c),
        _ => {}
    }
    requests
}

fn team_select_screen(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();
    match key_event.code {
        Char('q') | KeyCode::Esc => quit(),
        Char('j') | KeyCode::Down => app.state.team_select.down(),
        Char('k') | KeyCode::Up => app.state.team_select.up(),
        Char(' ') => {
            let team_id = app.state.team_select.highlighted();
            requests.extend(app.select_team(team_id));
        }
        KeyCode::Enter => requests.extend(app.confirm_team()),
        _ => {}
    }
    requests
}

fn compose(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();
    match key_event.code {
        KeyCode::Esc => app.stop_composing(),
        KeyCode::Enter => requests.extend(app.submit_prompt()),
        KeyCode::Backspace => app.chat_input_pop(),
        Char(c) => app.chat_input_push(c),
        _ => {}
    }
    requests
}

fn main_screen(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        (_, Char('q'), _) => quit(),

        // Tab switching
        (_, Char(digit @ '1'..='9'), _) => {
            if let Some(tab) = MenuItem::from_digit(digit) {
                requests.extend(app.update_tab(tab));
            }
        }
        (_, Char('?'), _) => requests.extend(app.update_tab(MenuItem::Help)),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        (_, Char('r'), _) => requests.extend(app.refresh_active_tab()),
        (_, Char('n'), _) => requests.extend(app.simulate_next_game()),

        // Home
        (MenuItem::Home, Char('i') | KeyCode::Enter, _) => app.start_composing(),

        // Tactics editor
        (MenuItem::Tactics, Char('j') | KeyCode::Down, _) => app.tactics_cursor_down(),
        (MenuItem::Tactics, Char('k') | KeyCode::Up, _) => app.tactics_cursor_up(),
        (MenuItem::Tactics, Char('h') | KeyCode::Left | Char('-'), _) => app.tactics_adjust(-1),
        (MenuItem::Tactics, Char('l') | KeyCode::Right | Char('+') | KeyCode::Enter, _) => {
            app.tactics_adjust(1)
        }
        (MenuItem::Tactics, Char('s'), _) => app.tactics_toggle(Role::Starter),
        (MenuItem::Tactics, Char('b'), _) => app.tactics_toggle(Role::Bench),

        // Teams
        (MenuItem::Teams, Char('j') | KeyCode::Down, _) => {
            requests.extend(app.teams_cursor_down())
        }
        (MenuItem::Teams, Char('k') | KeyCode::Up, _) => requests.extend(app.teams_cursor_up()),

        // Playoffs
        (MenuItem::Playoffs, Char('p'), _) => requests.extend(app.postseason_setup()),
        (MenuItem::Playoffs, Char('g'), _) => requests.extend(app.play_my_game()),
        (MenuItem::Playoffs, Char('X'), _) => requests.extend(app.postseason_reset()),

        // Scrolling panels
        (_, Char('j') | KeyCode::Down, _) => app.scroll_down(),
        (_, Char('k') | KeyCode::Up, _) => app.scroll_up(),

        // Global
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;

    fn press(app: &mut App, code: KeyCode) -> Vec<NetworkRequest> {
        route_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app() -> App {
        let dir = std::env::temp_dir().join(format!("gmtui-keys-{}", std::process::id()));
        App::with_settings(AppSettings { config_dir: Some(dir), ..AppSettings::default() })
    }

    #[test]
    fn alert_swallows_the_next_key() {
        let mut app = app();
        app.state.screen = Screen::Main;
        app.state.alert = Some("boom".into());
        assert!(press(&mut app, Char('2')).is_empty());
        assert!(app.state.alert.is_none());
        assert_eq!(app.state.active_tab, MenuItem::Home);
    }

    #[test]
    fn typing_on_the_key_screen_fills_the_input() {
        let mut app = app();
        for c in "AIzaSyAbcdefghijk".chars() {
            press(&mut app, Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.state.key_entry.input, "AIzaSyAbcdefghij");
        let requests = press(&mut app, KeyCode::Enter);
        assert!(matches!(requests.as_slice(), [NetworkRequest::ValidateKey { .. }]));
    }

    #[test]
    fn team_select_needs_space_before_enter() {
        let mut app = app();
        app.state.screen = Screen::TeamSelect;
        press(&mut app, Char('j'));
        assert!(press(&mut app, KeyCode::Enter).is_empty());
        assert!(app.state.alert.is_some());
        press(&mut app, Char('x'));

        let requests = press(&mut app, Char(' '));
        assert!(matches!(requests.as_slice(), [NetworkRequest::LoadRoster { team_id }] if team_id == "BOS"));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.screen, Screen::Main);
    }

    #[test]
    fn composing_captures_global_keys() {
        let mut app = app();
        app.state.screen = Screen::Main;
        press(&mut app, Char('i'));
        for c in "q1?".chars() {
            press(&mut app, Char(c));
        }
        assert_eq!(app.state.chat.input, "q1?");
        assert_eq!(app.state.active_tab, MenuItem::Home);
        press(&mut app, KeyCode::Esc);
        assert!(!app.state.chat.composing);
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.state.screen = Screen::Main;
        press(&mut app, Char('3'));
        press(&mut app, Char('?'));
        assert_eq!(app.state.active_tab, MenuItem::Help);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.active_tab, MenuItem::Scores);
    }
}
