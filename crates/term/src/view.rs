//! Screens drawn into a [`FrameBuffer`]. Pure, no I/O.
//!
//! Boards are drawn two terminal columns per cell to make up for the usual
//! glyph aspect ratio.

use std::time::Duration;

use duotris_core::BoardSnapshot;
use duotris_engine::{LeaderboardStatus, MatchResults, MatchView};
use duotris_leaderboard::{LocalEntry, RemoteEntry};

use crate::fb::{FrameBuffer, Rgb, Style};
use crate::types::{PlayerId, BOARD_HEIGHT, BOARD_WIDTH, MAX_NAME_CHARS, MAX_PLAYERS};

const CELL_W: u16 = 2;
const FRAME_W: u16 = BOARD_WIDTH as u16 * CELL_W + 2;
const FRAME_H: u16 = BOARD_HEIGHT as u16 + 2;
const PANEL_GAP: u16 = 4;

const WELL: Style = Style {
    fg: Rgb::new(90, 90, 100),
    bg: Rgb::new(30, 30, 40),
    bold: false,
};
const BORDER: Style = Style::fg(Rgb::new(200, 200, 200));
const TITLE: Style = Style::fg(Rgb::new(240, 220, 80)).bold();
const DIM: Style = Style::fg(Rgb::new(140, 140, 140));
const ALERT: Style = Style::fg(Rgb::new(220, 80, 80)).bold();

/// Style of a locked or falling cell with color id 1..=7.
pub fn piece_style(color_id: u8) -> Style {
    let fg = match color_id {
        1 => Rgb::new(80, 220, 220),
        2 => Rgb::new(240, 220, 80),
        3 => Rgb::new(200, 120, 220),
        4 => Rgb::new(100, 220, 120),
        5 => Rgb::new(220, 80, 80),
        6 => Rgb::new(255, 165, 0),
        7 => Rgb::new(80, 120, 220),
        _ => Rgb::new(220, 220, 220),
    };
    Style {
        fg,
        bg: WELL.bg,
        bold: true,
    }
}

// ============== Menu ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Start,
    Players,
    Leaderboard,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Start,
        MenuItem::Players,
        MenuItem::Leaderboard,
        MenuItem::Quit,
    ];
}

/// Main menu selection.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    selected: usize,
}

impl Menu {
    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.selected % MenuItem::ALL.len()]
    }

    pub fn up(&mut self) {
        self.selected = (self.selected + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }

    pub fn down(&mut self) {
        self.selected = (self.selected + 1) % MenuItem::ALL.len();
    }
}

pub fn render_menu(menu: &Menu, players: usize, width: u16, height: u16, fb: &mut FrameBuffer) {
    fb.reset(width, height);
    let x = width.saturating_sub(24) / 2;
    let y = height.saturating_sub(10) / 2;
    fb.put_str(x, y, "D U O T R I S", TITLE);

    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let label = match item {
            MenuItem::Start => "Start game".to_string(),
            MenuItem::Players => format!("Players: {players}"),
            MenuItem::Leaderboard => "Leaderboard".to_string(),
            MenuItem::Quit => "Quit".to_string(),
        };
        let selected = *item == menu.selected();
        let (marker, style) = if selected {
            ("> ", Style::PLAIN.bold())
        } else {
            ("  ", Style::PLAIN)
        };
        let row = y + 2 + i as u16;
        fb.put_str(x, row, marker, style);
        fb.put_str(x + 2, row, &label, style);
    }

    fb.put_str(x, y + 8, "Up/Down select, Enter confirm", DIM);
}

// ============== Name entry ==============

pub fn render_name_entry(
    player: PlayerId,
    input: &str,
    error: Option<&str>,
    width: u16,
    height: u16,
    fb: &mut FrameBuffer,
) {
    fb.reset(width, height);
    let x = width.saturating_sub(40) / 2;
    let y = height.saturating_sub(8) / 2;
    fb.put_str(x, y, &format!("{player}, enter your name"), TITLE);
    fb.put_str(x, y + 2, "> ", Style::PLAIN);
    fb.put_str(x + 2, y + 2, input, Style::PLAIN.bold());
    fb.put_str(x + 2 + input.chars().count() as u16, y + 2, "_", DIM);
    fb.put_str(
        x,
        y + 4,
        &format!("Up to {MAX_NAME_CHARS} characters. Enter accepts, Esc cancels."),
        DIM,
    );
    if let Some(error) = error {
        fb.put_str(x, y + 6, error, ALERT);
    }
}

// ============== Match ==============

/// Side-by-side boards with stats and the remote top 10 on the right.
pub fn render_match(view: &MatchView<'_>, width: u16, height: u16, fb: &mut FrameBuffer) {
    fb.reset(width, height);

    let panels = view.players.len().clamp(1, MAX_PLAYERS) as u16;
    let boards_w = panels * FRAME_W + (panels - 1) * PANEL_GAP;
    let total_w = boards_w + PANEL_GAP + 24;
    let origin_x = width.saturating_sub(total_w) / 2;
    let origin_y = height.saturating_sub(FRAME_H + 6) / 2;

    for (i, player) in view.players.iter().enumerate() {
        let x = origin_x + i as u16 * (FRAME_W + PANEL_GAP);
        fb.put_str(x, origin_y, player.name.as_str(), TITLE);
        draw_board(fb, x, origin_y + 1, player.board);

        let stats_y = origin_y + 2 + FRAME_H;
        let b = player.board;
        fb.put_str(x, stats_y, &format!("Score {:>7}", b.score), Style::PLAIN);
        fb.put_str(x, stats_y + 1, &format!("Lines {:>7}", b.lines), Style::PLAIN);
        fb.put_str(x, stats_y + 2, &format!("Level {:>7}", b.level), Style::PLAIN);
        fb.put_str(x, stats_y + 3, player.keys.describe(), DIM);
    }

    let side_x = origin_x + boards_w + PANEL_GAP;
    draw_remote(fb, side_x, origin_y, view.remote, view.remote_age, view.status);
    fb.put_str(side_x, origin_y + FRAME_H, "q menu, Ctrl-C exit", DIM);
}

fn draw_board(fb: &mut FrameBuffer, x: u16, y: u16, board: &BoardSnapshot) {
    draw_border(fb, x, y, FRAME_W, FRAME_H);
    for row in 0..BOARD_HEIGHT as u16 {
        for col in 0..BOARD_WIDTH as u16 {
            let (ch, style) = match board.cell(col as usize, row as usize) {
                Some(color) => ('█', piece_style(color)),
                None => ('·', WELL),
            };
            let px = x + 1 + col * CELL_W;
            fb.put_char(px, y + 1 + row, ch, style);
            fb.put_char(px + 1, y + 1 + row, if ch == '█' { ch } else { ' ' }, style);
        }
    }
    if board.game_over {
        let label = " GAME OVER ";
        let lx = x + (FRAME_W.saturating_sub(label.len() as u16)) / 2;
        fb.put_str(lx, y + FRAME_H / 2, label, ALERT);
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    fb.put_char(x, y, '┌', BORDER);
    fb.put_char(x + w - 1, y, '┐', BORDER);
    fb.put_char(x, y + h - 1, '└', BORDER);
    fb.put_char(x + w - 1, y + h - 1, '┘', BORDER);
    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', BORDER);
        fb.put_char(x + dx, y + h - 1, '─', BORDER);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', BORDER);
        fb.put_char(x + w - 1, y + dy, '│', BORDER);
    }
}

fn status_label(status: LeaderboardStatus) -> (&'static str, Style) {
    match status {
        LeaderboardStatus::Disabled => ("offline mode", DIM),
        LeaderboardStatus::Unknown => ("connecting", DIM),
        LeaderboardStatus::Online => ("online", Style::fg(Rgb::new(100, 220, 120))),
        LeaderboardStatus::Offline => ("server unreachable", ALERT),
    }
}

/// Short age like `42s`, `5m` or `2h`.
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        _ => format!("{}h", secs / 3600),
    }
}

fn draw_remote(
    fb: &mut FrameBuffer,
    x: u16,
    y: u16,
    remote: &[RemoteEntry],
    age: Option<Duration>,
    status: LeaderboardStatus,
) {
    fb.put_str(x, y, "Global Top 10", TITLE);
    let (label, style) = status_label(status);
    match age.filter(|_| status == LeaderboardStatus::Offline && !remote.is_empty()) {
        // Stale cache still on screen.
        Some(age) => fb.put_str(x, y + 1, &format!("{label}, {} old", format_age(age)), style),
        None => fb.put_str(x, y + 1, label, style),
    }
    if remote.is_empty() {
        fb.put_str(x, y + 3, "no scores yet", DIM);
    }
    for (i, entry) in remote.iter().enumerate() {
        let line = format!("{:>2}. {:<15} {:>6}", i + 1, entry.name, entry.score);
        fb.put_str(x, y + 3 + i as u16, &line, Style::PLAIN);
    }
}

// ============== Leaderboard screen ==============

pub fn render_leaderboards(
    local: &[LocalEntry],
    remote: &[RemoteEntry],
    remote_age: Option<Duration>,
    status: LeaderboardStatus,
    width: u16,
    height: u16,
    fb: &mut FrameBuffer,
) {
    fb.reset(width, height);
    let x = width.saturating_sub(64) / 2;
    let y = height.saturating_sub(16) / 2;

    fb.put_str(x, y, "Local High Scores", TITLE);
    if local.is_empty() {
        fb.put_str(x, y + 2, "no scores yet", DIM);
    }
    for (i, entry) in local.iter().enumerate() {
        let line = format!("{:>2}. {:<15} {:>6}", i + 1, entry.name, entry.score);
        fb.put_str(x, y + 2 + i as u16, &line, Style::PLAIN);
    }

    if status != LeaderboardStatus::Disabled {
        draw_remote(fb, x + 34, y, remote, remote_age, status);
    }
    fb.put_str(x, y + 14, "Press any key", DIM);
}

// ============== Results ==============

pub fn render_results(results: &MatchResults, width: u16, height: u16, fb: &mut FrameBuffer) {
    fb.reset(width, height);
    let x = width.saturating_sub(64) / 2;
    let y = height.saturating_sub(18) / 2;

    fb.put_str(x, y, "GAME OVER", ALERT);
    for (i, s) in results.standings.iter().enumerate() {
        let crown = if results.winner == Some(i) { "*" } else { " " };
        let line = format!(
            "{crown} {:<15} {:>7} pts {:>4} lines  level {}",
            s.name, s.score, s.lines, s.level
        );
        fb.put_str(x, y + 2 + i as u16, &line, Style::PLAIN);
    }

    if let Some(winner) = results.winner.and_then(|i| results.standings.get(i)) {
        let text = if results.standings.len() > 1 {
            format!("{} wins!", winner.name)
        } else {
            format!("Well played, {}!", winner.name)
        };
        fb.put_str(x, y + 5, &text, TITLE);
    }
    if let Some(rank) = results.local_rank {
        fb.put_str(x, y + 6, &format!("New local high score, rank {}", rank + 1), Style::PLAIN);
    }

    if results.status != LeaderboardStatus::Disabled {
        draw_remote(fb, x, y + 8, &results.remote, results.remote_age, results.status);
    }
    fb.put_str(x, y + 21, "Press any key", DIM);
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrayvec::ArrayVec;
    use duotris_core::{rules, Board};
    use duotris_engine::{PlayerView, Standing};
    use duotris_input::KeyMap;
    use crate::types::{PieceKind, PlayerName};

    #[test]
    fn test_menu_wraps() {
        let mut menu = Menu::default();
        assert_eq!(menu.selected(), MenuItem::Start);
        menu.up();
        assert_eq!(menu.selected(), MenuItem::Quit);
        menu.down();
        menu.down();
        assert_eq!(menu.selected(), MenuItem::Players);

        let mut fb = FrameBuffer::new(0, 0);
        render_menu(&menu, 2, 80, 24, &mut fb);
        assert!(fb.contains("> Players: 2"));
    }

    #[test]
    fn test_match_shows_names_scores_and_status() {
        let mut board = Board::new();
        rules::spawn_kind(&mut board, PieceKind::T);
        let snap = board.snapshot();
        let alice = PlayerName::new("Alice").unwrap();
        let bob = PlayerName::new("Bob").unwrap();

        let mut players = ArrayVec::new();
        players.push(PlayerView {
            id: PlayerId(0),
            name: &alice,
            keys: KeyMap::Wasd,
            board: &snap,
        });
        players.push(PlayerView {
            id: PlayerId(1),
            name: &bob,
            keys: KeyMap::Arrows,
            board: &snap,
        });
        let remote = [RemoteEntry::new("Carol", 900)];
        let view = MatchView {
            players,
            remote: &remote,
            remote_age: Some(Duration::from_secs(42)),
            status: LeaderboardStatus::Offline,
        };

        let mut fb = FrameBuffer::new(0, 0);
        render_match(&view, 120, 40, &mut fb);
        assert!(fb.contains("Alice"));
        assert!(fb.contains("Bob"));
        assert!(fb.contains("Carol"));
        assert!(fb.contains("server unreachable, 42s old"));
        assert!(fb.contains(&format!("Score {:>7}", 0)));
        assert!(fb.contains("██████"));
    }

    #[test]
    fn test_results_mark_winner() {
        let mut standings = ArrayVec::new();
        standings.push(Standing {
            name: PlayerName::new("Alice").unwrap(),
            score: 500,
            lines: 5,
            level: 1,
        });
        standings.push(Standing {
            name: PlayerName::new("Bob").unwrap(),
            score: 300,
            lines: 3,
            level: 1,
        });
        let results = MatchResults {
            standings,
            winner: Some(0),
            local_rank: Some(2),
            remote: Vec::new(),
            remote_age: None,
            status: LeaderboardStatus::Disabled,
        };
        let mut fb = FrameBuffer::new(0, 0);
        render_results(&results, 100, 30, &mut fb);
        assert!(fb.contains("Alice wins!"));
        assert!(fb.contains("rank 3"));
        assert!(!fb.contains("Global Top 10"));
    }

    #[test]
    fn test_leaderboard_screen_lists_local_entries() {
        let local = [LocalEntry {
            name: "Player 1".into(),
            score: 1200,
            timestamp: 0,
        }];
        let mut fb = FrameBuffer::new(0, 0);
        render_leaderboards(&local, &[], None, LeaderboardStatus::Online, 100, 30, &mut fb);
        assert!(fb.contains("Player 1"));
        assert!(fb.contains("1200"));
        assert!(fb.contains("no scores yet"));
    }

    #[test]
    fn test_stale_remote_list_shows_its_age() {
        let remote = vec![RemoteEntry::new("Carol", 900)];
        let mut fb = FrameBuffer::new(0, 0);

        render_leaderboards(
            &[],
            &remote,
            Some(Duration::from_secs(150)),
            LeaderboardStatus::Offline,
            100,
            30,
            &mut fb,
        );
        assert!(fb.contains("server unreachable, 2m old"));
        assert!(fb.contains("Carol"));

        render_leaderboards(
            &[],
            &remote,
            Some(Duration::from_secs(150)),
            LeaderboardStatus::Online,
            100,
            30,
            &mut fb,
        );
        assert!(fb.contains("online"));
        assert!(!fb.contains("old"));

        assert_eq!(format_age(Duration::from_secs(7_300)), "2h");
    }
}
