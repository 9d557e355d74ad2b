use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem, Screen};
use crate::components::bracket::{
    BracketGrid, CONFERENCE_HEIGHT, ConferenceBracketView, conference_cells,
};
use crate::state::app_state::{
    SCORES_TAB_LIMIT, SIDEBAR_GAME_COUNT, TACTICS_SETTINGS, TacticsRow, describe_setting,
};
use crate::state::cache::CachedView;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::postseason::{
    find_my_series, game_line, game_log, round_label, series_label, team_status,
};
use crate::state::tactics::{Role, TEAM_MINUTES_TARGET};
use crate::ui::layout::LayoutAreas;
use gm_api::postseason::Postseason;
use gm_api::{Conference, ScheduleGame, StandingRow, StatCategory, TEAMS, team_name};

const HELP_TEXT: &str = "\
Global
  1-9        switch tab            ?  help (Esc to leave)
  n          simulate next game    r  refresh the current tab
  j/k        scroll / move         f  full screen
  \"          toggle log pane       q  quit (Ctrl-C anywhere)

Home
  i / Enter  type a prompt for the GM assistant, Enter sends, Esc stops

Tactics
  j/k        move between settings and players
  h/l, -/+   adjust the highlighted setting or player minutes
  s / b      toggle starter / bench for the highlighted player

Teams
  j/k        move through teams, the detail pane follows

Playoffs
  p          set up the postseason     g  play my next game
  X          reset the postseason";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal
        .draw(|f| {
            match app.state.screen {
                Screen::ApiKey => draw_api_key_screen(f, f.area(), app),
                Screen::TeamSelect => draw_team_select(f, f.area(), app),
                Screen::Main => {
                    layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

                    if !app.settings.full_screen {
                        draw_tabs(f, layout.tab_bar, app);
                    }

                    match app.state.active_tab {
                        MenuItem::Home => draw_home(f, layout.main, app),
                        MenuItem::Tactics => draw_tactics(f, layout.main, app),
                        MenuItem::Scores => draw_scores(f, layout.main, app),
                        MenuItem::Schedule => draw_schedule(f, layout.main, app),
                        MenuItem::Standings => draw_standings(f, layout.main, app),
                        MenuItem::Stats => draw_stats(f, layout.main, app),
                        MenuItem::Teams => draw_teams(f, layout.main, app),
                        MenuItem::News => draw_news(f, layout.main, app),
                        MenuItem::Playoffs => draw_playoffs(f, layout.main, app),
                        MenuItem::Help => draw_help(f, layout.main),
                    }

                    if let Some(logs) = layout.logs {
                        draw_logs(f, logs);
                    }
                }
            }

            draw_loading_spinner(f, f.area(), app, loading);

            if let Some(message) = app.state.alert.as_deref() {
                draw_alert(f, f.area(), message);
            }
        })
        .unwrap();
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn highlight() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

/// Bordered panel titled with the view's load status.
fn cached_block<'a, T>(title: &str, view: &CachedView<T>) -> Block<'a> {
    let color = if view.error().is_some() { Color::Red } else { Color::White };
    default_border(color).title(format!(" {title} ({}) ", view.status()))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn opt_num(value: Option<f64>, precision: usize) -> String {
    value.map_or("-".to_string(), |v| format!("{v:.precision$}"))
}

// ---------------------------------------------------------------------------
// Pre-main screens
// ---------------------------------------------------------------------------

fn draw_api_key_screen(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Basketball GM ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let entry = &app.state.key_entry;
    let [_top, prompt_area, input_area, message_area, _bottom] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new("Enter your Gemini API key, then press Enter. Esc quits.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        prompt_area,
    );

    let input_area = centered(input_area, 60, 3);
    let masked: String = entry
        .input
        .chars()
        .enumerate()
        .map(|(i, c)| if i < 4 { c } else { '*' })
        .collect();
    let (title, color) = if entry.validating {
        (" validating... ", Color::DarkGray)
    } else {
        (" API key ", Color::Yellow)
    };
    f.render_widget(
        Paragraph::new(format!("{masked}_")).block(default_border(color).title(title)),
        input_area,
    );

    if let Some(message) = entry.message.as_deref() {
        f.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            message_area,
        );
    }
}

fn draw_team_select(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White)
        .title(" Select a team (j/k move, Space select, Enter continue) ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let selected = app.state.selected_team.as_deref();
    let cursor = app.state.team_select.cursor;
    let visible = inner.height.saturating_sub(1) as usize;
    let start = (cursor + 1).saturating_sub(visible.max(1));

    let rows = TEAMS.iter().enumerate().skip(start).take(visible).map(|(idx, team)| {
        let mark = if Some(team.id) == selected { "*" } else { " " };
        let division = gm_api::conference_and_division(team.id)
            .map(|(conf, div)| format!("{} / {div}", conf.label()))
            .unwrap_or_default();
        let style = if idx == cursor {
            highlight()
        } else if Some(team.id) == selected {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        Row::new(vec![
            format!("{mark} {}", team.id),
            team.name.to_string(),
            division,
            team.cap.to_string(),
            team.overall.to_string(),
            team.difficulty.to_string(),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Team", "Name", "Division", "Cap", "OVR", "Difficulty"])
            .style(dim().add_modifier(Modifier::UNDERLINED)),
    );
    f.render_widget(table, inner);
}

// ---------------------------------------------------------------------------
// Main screen chrome
// ---------------------------------------------------------------------------

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = MenuItem::TABS
        .iter()
        .position(|t| *t == app.state.active_tab)
        .unwrap_or(0);

    let titles: Vec<Line> = MenuItem::TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let team = app.state.selected_team.as_deref().unwrap_or("---");
    let help = Paragraph::new(format!("{team}  Help: ? "))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(dim())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen || app.state.screen != Screen::Main {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(2), 0, 1, 1)
    };
    f.render_widget(spinner, area);
}

fn draw_alert(f: &mut Frame, area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 6).max(30).min(area.width.saturating_sub(2));
    let height = (message.lines().count() as u16 + 4).min(area.height);
    let popup = centered(area, width, height.max(5));
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(message.to_string()),
            Line::from(""),
            Line::from(Span::styled("press any key", dim())),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(default_border(Color::Yellow).title(" Notice ")),
        popup,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logger = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(dim());
    f.render_widget(logger, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT), inner);
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn game_summary(game: &ScheduleGame, team_id: Option<&str>) -> String {
    let prefix = match team_id {
        Some(me) if game.away_team_id == me => format!("@ {}", game.home_team_id),
        Some(_) => format!("vs {}", game.away_team_id),
        None => format!("{} vs {}", game.home_team_id, game.away_team_id),
    };
    let result = game.result_for_user_team.as_deref().unwrap_or("");
    format!("{} {prefix} {} {result}", game.date, game.score_text())
}

fn draw_home(f: &mut Frame, area: Rect, app: &App) {
    let [main_area, sidebar_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(36)]).areas(area);
    let [output_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(main_area);

    let team = app.state.selected_team.as_deref();
    let season = &app.state.season;
    let chat = &app.state.chat;

    let title = format!(
        " {} | {} | turn {} ",
        team.map_or("No team", team_name),
        season.current_date.as_deref().unwrap_or("preseason"),
        season.progress_turns
    );
    let output = if chat.output.is_empty() {
        "Press i to talk to your front office, n to play the next game.".to_string()
    } else {
        chat.output.clone()
    };
    f.render_widget(
        Paragraph::new(output)
            .wrap(Wrap { trim: false })
            .scroll((chat.scroll_offset, 0))
            .block(default_border(Color::White).title(title)),
        output_area,
    );

    let (input, style, mode) = if chat.composing {
        (format!("> {}_", chat.input), Style::default().fg(Color::Yellow), " typing ")
    } else if app.state.in_flight.main_llm {
        ("waiting for a reply...".to_string(), dim(), " sending ")
    } else {
        ("Press Enter/i to type. Esc cancels.".to_string(), dim(), " prompt ")
    };
    f.render_widget(
        Paragraph::new(input).style(style).block(default_border(Color::DarkGray).title(mode)),
        input_area,
    );

    let mut lines = vec![Line::from(Span::styled("Next game", dim()))];
    match season.next_game() {
        Some(game) => lines.push(Line::from(game_summary(game, team))),
        None if season.regular_season_completed => {
            lines.push(Line::from("Regular season complete"))
        }
        None => lines.push(Line::from("-")),
    }
    if app.state.in_flight.simulate {
        lines.push(Line::from(Span::styled("simulating...", highlight())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Recent games", dim())));
    for game in season.scores.iter().take(SIDEBAR_GAME_COUNT) {
        lines.push(Line::from(game_summary(game, team)));
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(default_border(Color::DarkGray).title(" Season ")),
        sidebar_area,
    );
}

// ---------------------------------------------------------------------------
// Tactics
// ---------------------------------------------------------------------------

fn draw_tactics(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Tactics ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(tactics) = app.state.selected_tactics() else {
        draw_placeholder(f, inner, "Select a team to edit tactics");
        return;
    };
    let roster = app.state.selected_roster();
    let roster_len = roster.map_or(0, |r| r.players.len());
    let cursor_row = app.state.tactics_view.row(roster_len);

    let [settings_area, players_area] =
        Layout::horizontal([Constraint::Length(44), Constraint::Fill(1)]).areas(inner);

    let mut lines: Vec<Line> = TACTICS_SETTINGS
        .iter()
        .map(|setting| {
            let (label, value) = describe_setting(*setting, tactics);
            let style = if cursor_row == Some(TacticsRow::Setting(*setting)) {
                highlight()
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{label:<12} {value}"), style))
        })
        .collect();
    lines.push(Line::from(""));
    let total = tactics.total_minutes();
    let minutes_style = if (total - TEAM_MINUTES_TARGET).abs() < f64::EPSILON {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    lines.push(Line::from(Span::styled(
        format!("Minutes {total:.1} / {TEAM_MINUTES_TARGET:.0}"),
        minutes_style,
    )));
    lines.push(Line::from(format!(
        "Starters {} | rotation {} / {}",
        tactics.starters().len(),
        tactics.rotation_count(),
        tactics.rotation_size()
    )));
    f.render_widget(Paragraph::new(lines), settings_area);

    let Some(roster) = roster else {
        let status = app
            .state
            .selected_team
            .as_deref()
            .and_then(|t| app.state.rosters.get(t))
            .map_or("not loaded".to_string(), CachedView::status);
        draw_placeholder(f, players_area, &format!("Roster {status}"));
        return;
    };

    let rows = roster.players.iter().enumerate().map(|(idx, player)| {
        let role = tactics.role_of(&player.id);
        let minutes = tactics
            .minutes_for(&player.id)
            .map_or("-".to_string(), |m| format!("{m:.1}"));
        let style = if cursor_row == Some(TacticsRow::Player(idx)) {
            highlight()
        } else {
            match role {
                Some(Role::Starter) => Style::default().fg(Color::Green),
                Some(Role::Bench) => Style::default(),
                None => dim(),
            }
        };
        Row::new(vec![
            player.name.clone(),
            player.pos.clone(),
            opt_num(player.overall, 0),
            role.map_or("-", |r| r.label()).to_string(),
            minutes,
        ])
        .style(style)
    });
    let table = Table::new(
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(Row::new(vec!["Player", "Pos", "OVR", "Role", "Min"]).style(dim()));
    f.render_widget(table, players_area);
}

// ---------------------------------------------------------------------------
// Scores and schedule
// ---------------------------------------------------------------------------

fn draw_scores(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Scores ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let scores = &app.state.season.scores;
    if scores.is_empty() {
        draw_placeholder(f, inner, "No games played yet");
        return;
    }
    let lines: Vec<String> = scores
        .iter()
        .take(SCORES_TAB_LIMIT)
        .map(|g| {
            format!(
                "{}  {:<24} {:>9}  {}",
                g.date,
                team_name(&g.home_team_id),
                g.score_text(),
                team_name(&g.away_team_id)
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn draw_schedule(f: &mut Frame, area: Rect, app: &App) {
    let season = &app.state.season;
    let block = cached_block("Schedule", &season.schedule);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let games = season.games();
    if games.is_empty() {
        draw_placeholder(f, inner, "No schedule loaded");
        return;
    }
    let team = app.state.selected_team.as_deref();
    let lines: Vec<Line> = games
        .iter()
        .enumerate()
        .skip(season.scroll_offset as usize)
        .take(inner.height as usize)
        .map(|(idx, game)| {
            let style = if idx == season.current_index {
                highlight()
            } else if game.is_played() {
                dim()
            } else {
                Style::default()
            };
            let marker = if idx == season.current_index { ">" } else { " " };
            Line::from(Span::styled(format!("{marker} {}", game_summary(game, team)), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// League views
// ---------------------------------------------------------------------------

fn standings_table(rows: &[StandingRow], selected: Option<&str>) -> Table<'static> {
    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let style = if Some(row.team_id.as_str()) == selected {
                highlight()
            } else {
                Style::default()
            };
            Row::new(vec![
                row.rank.unwrap_or(idx as u32 + 1).to_string(),
                row.team_id.clone(),
                format!("{}-{}", row.wins, row.losses),
                opt_num(row.win_pct, 3),
                opt_num(row.games_behind, 1),
                opt_num(row.points_for, 1),
                opt_num(row.points_against, 1),
            ])
            .style(style)
        })
        .collect();
    Table::new(
        body,
        [
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(Row::new(vec!["#", "Team", "W-L", "PCT", "GB", "PF", "PA"]).style(dim()))
}

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let view = &app.state.views.standings;
    let block = cached_block("Standings", view);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(standings) = view.data() else {
        draw_placeholder(f, inner, "Press r to load standings");
        return;
    };
    let selected = app.state.selected_team.as_deref();
    let halves: [Rect; 2] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(inner);
    for (conference, half) in Conference::all().into_iter().zip(halves) {
        let block = default_border(Color::DarkGray).title(format!(" {} ", conference.label()));
        f.render_widget(
            standings_table(standings.conference(conference), selected).block(block),
            half,
        );
    }
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let view = &app.state.views.stats;
    let block = cached_block("League Leaders", view);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(leaders) = view.data() else {
        draw_placeholder(f, inner, "Press r to load league leaders");
        return;
    };
    let [top, bottom] =
        Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(inner);
    let [a, b]: [Rect; 2] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(top);
    let [c, d]: [Rect; 2] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(bottom);

    for (category, panel) in StatCategory::all().into_iter().zip([a, b, c, d]) {
        let lines: Vec<String> = leaders
            .rows(category)
            .iter()
            .take(5)
            .enumerate()
            .map(|(i, row)| {
                format!("{}. {:<22} {} {}", i + 1, row.name, row.team_id, opt_num(row.value, 1))
            })
            .collect();
        f.render_widget(
            Paragraph::new(lines.join("\n"))
                .block(default_border(Color::DarkGray).title(format!(" {} ", category.label()))),
            panel,
        );
    }
}

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let views = &app.state.views;
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Length(34), Constraint::Fill(1)]).areas(area);

    let block = cached_block("Teams", &views.teams);
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    let Some(teams) = views.teams.data() else {
        draw_placeholder(f, inner, "Press r to load teams");
        return;
    };
    let visible = inner.height as usize;
    let start = (views.teams_cursor + 1).saturating_sub(visible.max(1));
    let lines: Vec<Line> = teams
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(idx, card)| {
            let record = match (card.wins, card.losses) {
                (Some(w), Some(l)) => format!("{w}-{l}"),
                _ => "-".to_string(),
            };
            let style = if idx == views.teams_cursor { highlight() } else { Style::default() };
            Line::from(Span::styled(
                format!("{:<4} {:<7} {}", card.team_id, record, card.division.as_deref().unwrap_or("")),
                style,
            ))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    let Some(team_id) = views.highlighted_team() else {
        return;
    };
    let Some(detail_view) = views.team_details.get(team_id) else {
        draw_placeholder(f, detail_area, "No detail loaded");
        return;
    };
    let block = cached_block(team_name(team_id), detail_view);
    let inner = block.inner(detail_area);
    f.render_widget(block, detail_area);
    let Some(detail) = detail_view.data() else {
        return;
    };

    let s = &detail.summary;
    let [summary_area, roster_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Fill(1)]).areas(inner);
    let record = format!(
        "{}-{}",
        s.wins.map_or("-".into(), |w| w.to_string()),
        s.losses.map_or("-".into(), |l| l.to_string())
    );
    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!(
                "{} / {}  record {record}  rank {}",
                s.conference.as_deref().unwrap_or("-"),
                s.division.as_deref().unwrap_or("-"),
                s.conference_rank.map_or("-".into(), |r| r.to_string())
            )),
            Line::from(format!(
                "pct {}  diff {}  style {}",
                opt_num(s.win_pct, 3),
                opt_num(s.point_diff, 1),
                s.tendency.as_deref().unwrap_or("-")
            )),
            Line::from(format!(
                "payroll {}  cap space {}",
                opt_num(s.payroll, 1),
                opt_num(s.cap_space, 1)
            )),
        ]),
        summary_area,
    );

    let rows = detail.roster.iter().map(|p| {
        Row::new(vec![
            p.name.clone(),
            p.pos.clone(),
            opt_num(p.overall, 0),
            p.age.map_or("-".into(), |a| a.to_string()),
            opt_num(p.salary, 1),
            opt_num(p.pts, 1),
            opt_num(p.reb, 1),
            opt_num(p.ast, 1),
            opt_num(p.three_pm, 1),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
    )
    .header(
        Row::new(vec!["Player", "Pos", "OVR", "Age", "Salary", "PTS", "REB", "AST", "3PM"])
            .style(dim()),
    );
    f.render_widget(table, roster_area);
}

fn draw_news(f: &mut Frame, area: Rect, app: &App) {
    let view = &app.state.views.weekly_news;
    let block = cached_block("Weekly News", view);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.api_key.is_none() {
        draw_placeholder(f, inner, "Weekly news needs a validated API key");
        return;
    }
    let Some(news) = view.data() else {
        draw_placeholder(f, inner, "Press r to load this week's news");
        return;
    };
    if news.items.is_empty() {
        draw_placeholder(f, inner, "Nothing happened this week");
        return;
    }

    let mut lines = Vec::new();
    for item in &news.items {
        let date = item.date.as_deref().map(|d| format!("[{d}] ")).unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("{date}{}", item.title),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(item.summary.clone()));
        if !item.tags.is_empty() {
            lines.push(Line::from(Span::styled(item.tags.join(", "), dim())));
        }
        lines.push(Line::from(""));
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .scroll((app.state.views.news_scroll, 0)),
        inner,
    );
}

// ---------------------------------------------------------------------------
// Playoffs
// ---------------------------------------------------------------------------

fn draw_playoffs(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Playoffs (p setup, g play, X reset) ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(ps) = app.state.playoffs.postseason.as_ref().filter(|ps| ps.is_started()) else {
        let msg = app
            .state
            .playoffs
            .status
            .as_deref()
            .unwrap_or("The postseason has not started. Press p to set it up.");
        draw_placeholder(f, inner, msg);
        return;
    };
    let team = app.state.selected_team.as_deref();

    let [header_area, bracket_area, lower_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(CONFERENCE_HEIGHT + 2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    draw_playoffs_header(f, header_area, app, ps, team);
    draw_playoff_bracket(f, bracket_area, ps, team);

    let [log_area, leaders_area, news_area] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ])
    .areas(lower_area);

    let scroll = app.state.playoffs.scroll_offset;
    let log: Vec<String> = team
        .map(|t| game_log(ps, t).into_iter().map(game_line).collect())
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(if log.is_empty() { "No games yet".to_string() } else { log.join("\n") })
            .scroll((scroll, 0))
            .block(default_border(Color::DarkGray).title(" My games ")),
        log_area,
    );

    let leaders = &app.state.views.playoff_leaders;
    let mut lines = Vec::new();
    if let Some(data) = leaders.data() {
        for (category, rows) in &data.categories {
            lines.push(Line::from(Span::styled(category.to_uppercase(), dim())));
            for row in rows.iter().take(3) {
                lines.push(Line::from(format!(
                    "{:<20} {} {}",
                    row.player,
                    row.team_id,
                    opt_num(row.value, 1)
                )));
            }
        }
    }
    f.render_widget(
        Paragraph::new(lines).scroll((scroll, 0)).block(cached_block("Leaders", leaders)),
        leaders_area,
    );

    let news = &app.state.views.playoff_news;
    let mut lines = Vec::new();
    for item in news.data().into_iter().flatten() {
        lines.push(Line::from(Span::styled(
            item.headline.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(item.summary.clone()));
        lines.push(Line::from(""));
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .scroll((scroll, 0))
            .block(cached_block("News", news)),
        news_area,
    );
}

fn draw_playoffs_header(f: &mut Frame, area: Rect, app: &App, ps: &Postseason, team: Option<&str>) {
    let mut lines = vec![Line::from(vec![
        Span::styled(round_label(ps), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            team.map(|t| team_status(ps, t).describe()).unwrap_or_default(),
            highlight(),
        ),
    ])];

    let my_series = ps
        .playoffs
        .as_ref()
        .zip(team)
        .and_then(|(playoffs, t)| find_my_series(playoffs, t));
    if let Some(series) = my_series {
        lines.push(Line::from(series_label(series, team)));
    }
    if let Some(status) = app.state.playoffs.status.as_deref() {
        lines.push(Line::from(Span::styled(status.to_string(), dim())));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_playoff_bracket(f: &mut Frame, area: Rect, ps: &Postseason, team: Option<&str>) {
    let [east_area, finals_area, west_area] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(24),
        Constraint::Fill(1),
    ])
    .areas(area);

    for (conference, panel, mirrored) in [
        (Conference::East, east_area, false),
        (Conference::West, west_area, true),
    ] {
        let block = default_border(Color::DarkGray).title(format!(" {} ", conference.label()));
        let inner = block.inner(panel);
        f.render_widget(block, panel);
        match conference_cells(ps, conference, team) {
            Some(rounds) => {
                let grid = BracketGrid::compute(inner.width, mirrored);
                f.render_widget(
                    ConferenceBracketView { rounds: &rounds, grid: &grid, scroll_offset: 0 },
                    inner,
                );
            }
            None => draw_placeholder(f, inner, "Bracket not yet generated"),
        }
    }

    let lines = finals_lines(ps, team);
    let block = default_border(Color::DarkGray);
    let inner = block.inner(finals_area);
    f.render_widget(block, finals_area);
    let [_pad, body, _pad2] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(lines.len() as u16),
        Constraint::Fill(1),
    ])
    .areas(inner);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        body,
    );
}

fn finals_lines(ps: &Postseason, team: Option<&str>) -> Vec<Line<'static>> {
    let finals = ps.playoffs.as_ref().and_then(|p| p.bracket.finals.as_ref());
    let mut lines = vec![Line::from(Span::styled("Finals", dim()))];
    match finals {
        Some(series) => lines.push(Line::from(series_label(series, team))),
        None => lines.push(Line::from("TBD")),
    }
    if let Some(champion) = &ps.champion {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Champion: {}", team_name(&champion.team_id)),
            highlight(),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_api::postseason::{Playoffs, Series};

    fn with_finals(home: &str, road: &str) -> Postseason {
        let mut playoffs = Playoffs::default();
        playoffs.bracket.finals = Some(Series {
            home_court: home.into(),
            road: road.into(),
            ..Default::default()
        });
        Postseason { playoffs: Some(playoffs), ..Default::default() }
    }

    #[test]
    fn finals_box_marks_my_series() {
        let ps = with_finals("BOS", "DEN");
        let lines = finals_lines(&ps, Some("DEN"));
        assert!(lines[1].to_string().ends_with("(my series)"));

        let lines = finals_lines(&ps, Some("MIA"));
        assert!(!lines[1].to_string().contains("(my series)"));
    }

    #[test]
    fn finals_box_waits_for_matchup() {
        let lines = finals_lines(&Postseason::default(), Some("BOS"));
        assert_eq!(lines[1].to_string(), "TBD");
    }
}
