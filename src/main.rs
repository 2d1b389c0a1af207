//! duotris game binary.
//!
//! Owns the terminal: menu, name entry, the match screen and results. The
//! match itself runs in [`duotris::engine::Coordinator`].
//!
//! Logs go to the file named by `DUOTRIS_LOG_PATH`, if set; the terminal is
//! in raw mode, so nothing is written to stderr.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use duotris::engine::{
    Coordinator, Frontend, GameConfig, MatchOutcome, MatchResults, MatchView, NameEntry,
};
use duotris::input::is_interrupt;
use duotris::term::{
    render_leaderboards, render_match, render_menu, render_name_entry, render_results,
    FrameBuffer, Menu, MenuItem, TerminalRenderer,
};
use duotris::types::{PlayerId, PlayerName};

/// Keys pressed this long before a results screen are not taken as "any key".
const RESULTS_GRACE: Duration = Duration::from_millis(400);

fn main() -> Result<()> {
    init_logging()?;

    let config = GameConfig::from_env();
    info!(?config, "starting");
    let mut coordinator = Coordinator::new(config);

    let mut ui = TerminalUi::new();
    ui.renderer.enter()?;

    let result = run(&mut coordinator, &mut ui);

    // Always try to restore terminal state.
    let _ = ui.renderer.exit();
    result
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var("DUOTRIS_LOG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run(coordinator: &mut Coordinator, ui: &mut TerminalUi) -> Result<()> {
    let mut menu = Menu::default();

    loop {
        if coordinator.shutdown_requested() {
            return Ok(());
        }
        ui.draw_menu(&menu, coordinator.player_count())?;

        let key = ui.wait_key()?;
        if is_interrupt(key) {
            return Ok(());
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => menu.up(),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => menu.down(),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter | KeyCode::Char(' ') => match menu.selected() {
                MenuItem::Start => {
                    if coordinator.play(ui)? == MatchOutcome::Shutdown {
                        return Ok(());
                    }
                }
                MenuItem::Players => {
                    let next = if coordinator.player_count() == 1 { 2 } else { 1 };
                    coordinator.set_player_count(next);
                }
                MenuItem::Leaderboard => {
                    let status = coordinator.refresh_leaderboard();
                    let (w, h) = TerminalRenderer::size();
                    render_leaderboards(
                        coordinator.local_leaderboard().entries(),
                        coordinator.remote_leaderboard(),
                        coordinator.remote_leaderboard_age(),
                        status,
                        w,
                        h,
                        &mut ui.fb,
                    );
                    ui.renderer.draw(&ui.fb)?;
                    if is_interrupt(ui.wait_key()?) {
                        return Ok(());
                    }
                }
                MenuItem::Quit => return Ok(()),
            },
            _ => {}
        }
    }
}

struct TerminalUi {
    renderer: TerminalRenderer,
    fb: FrameBuffer,
}

impl TerminalUi {
    fn new() -> Self {
        Self {
            renderer: TerminalRenderer::new(),
            fb: FrameBuffer::new(0, 0),
        }
    }

    fn draw_menu(&mut self, menu: &Menu, players: usize) -> Result<()> {
        let (w, h) = TerminalRenderer::size();
        render_menu(menu, players, w, h, &mut self.fb);
        self.renderer.draw(&self.fb)
    }

    /// Block until a key is pressed.
    fn wait_key(&mut self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(key);
                }
            }
        }
    }

    /// Throw away whatever is queued for `window`.
    fn discard_keys(&mut self, window: Duration) -> Result<()> {
        let deadline = Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !event::poll(remaining)? {
                return Ok(());
            }
            let _ = event::read()?;
        }
    }
}

impl Frontend for TerminalUi {
    fn poll_keys(&mut self, timeout: Duration, out: &mut Vec<KeyEvent>) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(());
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    out.push(key);
                }
            }
            if remaining.is_zero() {
                return Ok(());
            }
        }
    }

    fn draw_match(&mut self, view: &MatchView<'_>) -> Result<()> {
        let (w, h) = TerminalRenderer::size();
        render_match(view, w, h, &mut self.fb);
        self.renderer.draw(&self.fb)
    }

    fn enter_name(&mut self, player: PlayerId, current: &PlayerName) -> Result<NameEntry> {
        let mut input = current.as_str().to_string();
        let mut error: Option<&str> = None;

        loop {
            let (w, h) = TerminalRenderer::size();
            render_name_entry(player, &input, error, w, h, &mut self.fb);
            self.renderer.draw(&self.fb)?;

            let key = self.wait_key()?;
            if is_interrupt(key) {
                return Ok(NameEntry::Interrupt);
            }
            match key.code {
                KeyCode::Esc => return Ok(NameEntry::Cancel),
                KeyCode::Enter => match PlayerName::new(&input) {
                    Some(name) if name == *current => return Ok(NameEntry::Keep),
                    Some(name) => return Ok(NameEntry::Name(name)),
                    None => error = Some("Names are 1-15 characters (31 bytes), no '|' or ':'."),
                },
                KeyCode::Backspace => {
                    input.pop();
                    error = None;
                }
                KeyCode::Char(c) if !c.is_control() => {
                    input.push(c);
                    if !PlayerName::fits(&input) {
                        input.pop();
                    }
                    error = None;
                }
                _ => {}
            }
        }
    }

    fn show_results(&mut self, results: &MatchResults) -> Result<()> {
        let (w, h) = TerminalRenderer::size();
        render_results(results, w, h, &mut self.fb);
        self.renderer.draw(&self.fb)?;
        self.discard_keys(RESULTS_GRACE)?;
        self.wait_key().map(|_| ())
    }
}
