use gm_api::postseason::{Postseason, SeedEntry, Series};
use gm_api::{Conference, RoundKind};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::state::postseason::{ConferenceView, Pairing, conference_view};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per series cell: home line, status line, road line.
pub const CELL_HEIGHT: u16 = 3;

/// Slot heights per depth (0 = quarterfinals, 2 = conference finals).
/// SH[0] = CELL_HEIGHT; SH[d] = 2 * SH[d-1] + 1.
const SH: [u16; 3] = [
    CELL_HEIGHT,                         // QF: 3
    2 * CELL_HEIGHT + 1,                 // SF: 7
    2 * (2 * CELL_HEIGHT + 1) + 1,       // CF: 15
];

/// Rows consumed by one conference bracket.
pub const CONFERENCE_HEIGHT: u16 = SH[2];

pub const CONNECTOR_WIDTH: u16 = 3;

const CELL_W_MAX: u16 = 20;

const SERIES_PER_DEPTH: [usize; 3] = [4, 2, 1];

// ---------------------------------------------------------------------------
// Cell model
// ---------------------------------------------------------------------------

/// What one bracket slot shows. Built from a server series, a derived
/// pairing, or left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BracketCell {
    pub top: String,
    pub status: String,
    pub bottom: String,
    pub top_won: bool,
    pub bottom_won: bool,
    /// The user's team plays in this slot.
    pub mine: bool,
}

fn seed_line(entry: Option<&SeedEntry>, team_id: &str, wins: Option<u32>) -> String {
    let seed = entry
        .and_then(|e| e.seed)
        .map_or("  ".to_string(), |s| format!("{s:2}"));
    let id = if team_id.is_empty() { "TBD" } else { team_id };
    match wins {
        Some(w) => format!("{seed} {id:<4}{w:>2}"),
        None => format!("{seed} {id}"),
    }
}

impl BracketCell {
    pub fn from_series(series: &Series, my_team: Option<&str>) -> Self {
        let home = &series.home_court;
        let road = &series.road;
        let (hw, rw) = (series.wins_for(home), series.wins_for(road));
        let winner = series.winner_id();
        let status = match winner {
            Some(w) => format!("{w} wins {}-{}", hw.max(rw), hw.min(rw)),
            None if hw == 0 && rw == 0 => series.matchup.clone(),
            None if hw == rw => format!("tied {hw}-{rw}"),
            None if hw > rw => format!("{home} leads {hw}-{rw}"),
            None => format!("{road} leads {rw}-{hw}"),
        };
        Self {
            top: seed_line(series.home_entry.as_ref(), home, Some(hw)),
            status,
            bottom: seed_line(series.road_entry.as_ref(), road, Some(rw)),
            top_won: winner == Some(home.as_str()),
            bottom_won: winner == Some(road.as_str()),
            mine: my_team.is_some_and(|t| series.involves(t)),
        }
    }

    pub fn from_pairing(pairing: &Pairing, my_team: Option<&str>) -> Self {
        match &pairing.teams {
            Some((home, road)) => Self {
                top: seed_line(Some(home), &home.team_id, None),
                status: pairing.label(),
                bottom: seed_line(Some(road), &road.team_id, None),
                mine: my_team.is_some_and(|t| t == home.team_id || t == road.team_id),
                ..Self::default()
            },
            None => Self {
                top: format!("{:2} TBD", pairing.high_seed),
                status: pairing.label(),
                bottom: format!("{:2} TBD", pairing.low_seed),
                ..Self::default()
            },
        }
    }
}

/// Cells per depth for one conference, or `None` when no seeds exist yet.
pub fn conference_cells(
    ps: &Postseason,
    conference: Conference,
    my_team: Option<&str>,
) -> Option<[Vec<BracketCell>; 3]> {
    match conference_view(ps, conference) {
        ConferenceView::Materialized(bracket) => Some(
            [RoundKind::Quarterfinals, RoundKind::Semifinals, RoundKind::ConferenceFinals].map(
                |round| {
                    bracket
                        .round(round)
                        .into_iter()
                        .map(|s| BracketCell::from_series(s, my_team))
                        .collect()
                },
            ),
        ),
        ConferenceView::Derived(pairings) => Some([
            pairings.iter().map(|p| BracketCell::from_pairing(p, my_team)).collect(),
            Vec::new(),
            Vec::new(),
        ]),
        ConferenceView::NotGenerated => None,
    }
}

// ---------------------------------------------------------------------------
// BracketGrid: layout engine for one conference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Row of the status line, relative to the bracket origin.
    pub center_row: u16,
    pub col: u16,
    pub depth: usize,
    pub index: usize,
}

/// Column order for the East is QF | conn | SF | conn | CF. The West is
/// mirrored so both conferences point at the finals in the middle.
#[derive(Debug, Clone)]
pub struct BracketGrid {
    pub cells: Vec<GridCell>,
    pub depth_cols: [u16; 3],
    pub cell_width: u16,
    pub total_width: u16,
    pub mirrored: bool,
}

impl BracketGrid {
    /// Center rows follow center[d][i] = SH[d]/2 + i * (SH[d+1] - SH[d]):
    /// QF [1, 5, 9, 13], SF [3, 11], CF [7].
    pub fn compute(width: u16, mirrored: bool) -> Self {
        let per_col = width.saturating_sub(CONNECTOR_WIDTH * 2) / 3;
        let cell_width = per_col.clamp(1, CELL_W_MAX);
        let stride = cell_width + CONNECTOR_WIDTH;
        let depth_cols = if mirrored {
            [stride * 2, stride, 0]
        } else {
            [0, stride, stride * 2]
        };

        let first_center = [SH[0] / 2, SH[1] / 2, SH[2] / 2];
        let spacing = [SH[1] - SH[0], SH[2] - SH[1], 0];

        let mut cells = Vec::with_capacity(7);
        for depth in 0..3 {
            for index in 0..SERIES_PER_DEPTH[depth] {
                cells.push(GridCell {
                    center_row: first_center[depth] + index as u16 * spacing[depth],
                    col: depth_cols[depth],
                    depth,
                    index,
                });
            }
        }

        Self {
            cells,
            depth_cols,
            cell_width,
            total_width: stride * 2 + cell_width,
            mirrored,
        }
    }

    pub fn cells_for_depth(&self, depth: usize) -> &[GridCell] {
        const OFFSETS: [usize; 4] = [0, 4, 6, 7];
        &self.cells[OFFSETS[depth]..OFFSETS[depth + 1]]
    }
}

// ---------------------------------------------------------------------------
// ConferenceBracketView widget
// ---------------------------------------------------------------------------

pub struct ConferenceBracketView<'a> {
    /// Cells per depth. Missing entries render as empty slots.
    pub rounds: &'a [Vec<BracketCell>; 3],
    pub grid: &'a BracketGrid,
    pub scroll_offset: u16,
}

impl<'a> Widget for ConferenceBracketView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 12 || area.height < CELL_HEIGHT {
            return;
        }

        for cell in &self.grid.cells {
            let content = self.rounds[cell.depth].get(cell.index);
            draw_cell(content, cell, self.grid.cell_width, area, self.scroll_offset, buf);
        }

        for depth in 0..2 {
            let children = self.grid.cells_for_depth(depth);
            let parents = self.grid.cells_for_depth(depth + 1);
            let conn_x = if self.grid.mirrored {
                area.x + self.grid.depth_cols[depth].saturating_sub(CONNECTOR_WIDTH)
            } else {
                area.x + self.grid.depth_cols[depth] + self.grid.cell_width
            };
            for (j, parent) in parents.iter().enumerate() {
                draw_connector(
                    children[2 * j].center_row,
                    parent.center_row,
                    children[2 * j + 1].center_row,
                    conn_x,
                    area,
                    self.scroll_offset,
                    self.grid.mirrored,
                    buf,
                );
            }
        }
    }
}

fn screen_y(row: u16, scroll: u16, area: Rect) -> Option<u16> {
    let rel = row.checked_sub(scroll)?;
    (rel < area.height).then_some(area.y + rel)
}

fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:<width$}")
}

fn draw_cell(
    content: Option<&BracketCell>,
    cell: &GridCell,
    width: u16,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let x = area.x + cell.col;
    if x >= area.x + area.width {
        return;
    }
    let avail = ((area.x + area.width - x) as usize).min(width as usize);

    let dim = Style::default().fg(Color::DarkGray);
    let base = match content {
        Some(c) if c.mine => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Gray),
    };
    let winner = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);

    let rows = [
        (cell.center_row.saturating_sub(1), content.map(|c| (&c.top, c.top_won))),
        (cell.center_row, content.map(|c| (&c.status, false))),
        (cell.center_row + 1, content.map(|c| (&c.bottom, c.bottom_won))),
    ];
    for (slot, (row, line)) in rows.into_iter().enumerate() {
        let Some(sy) = screen_y(row, scroll, area) else {
            continue;
        };
        let (text, style) = match line {
            None => ((if slot == 1 { "-" } else { "" }).to_string(), dim),
            Some((text, _)) if slot == 1 => (text.clone(), dim),
            Some((text, true)) => (text.clone(), winner),
            Some((text, false)) => (text.clone(), base),
        };
        buf.set_string(x, sy, fit(&text, avail), style);
    }
}

/// Box-drawing connector from two child slots to their parent.
///
/// ```text
///  child_top  ──┐
///               │
///  parent       ├──
///               │
///  child_bot  ──┘
/// ```
#[allow(clippy::too_many_arguments)]
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    base_x: u16,
    area: Rect,
    scroll: u16,
    mirrored: bool,
    buf: &mut Buffer,
) {
    let style = Style::default().fg(Color::DarkGray);
    let limit_x = area.x + area.width;
    let mut put = |x: u16, row: u16, ch: char| {
        if x < limit_x
            && let Some(sy) = screen_y(row, scroll, area)
            && let Some(cell) = buf.cell_mut((x, sy))
        {
            cell.set_char(ch);
            cell.set_style(style);
        }
    };

    let (outer, inner) = if mirrored { (base_x + 2, base_x) } else { (base_x, base_x + 2) };
    let (top, bot, tee) = if mirrored { ('┌', '└', '┤') } else { ('┐', '┘', '├') };
    let mid = base_x + 1;

    put(outer, r_top, '─');
    put(mid, r_top, top);
    for row in (r_top + 1)..r_bot {
        put(mid, row, '│');
    }
    put(mid, r_mid, tee);
    put(inner, r_mid, '─');
    put(outer, r_bot, '─');
    put(mid, r_bot, bot);
}
