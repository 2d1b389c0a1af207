//! Match lifecycle: name entry, play, game over, back to the menu.
//!
//! The coordinator owns the boards, the leaderboards and the terminal (via a
//! [`Frontend`]). While a match is running it:
//!
//! - starts a gravity thread and an input thread per player inside one
//!   [`std::thread::scope`], so every thread is joined before it moves on
//! - ticks at ~60Hz: snapshot all boards, draw, read keys and fan them out
//! - refreshes the remote leaderboard every 180 ticks with a short timeout
//!
//! A match ends on shutdown (Ctrl-C), on a quit key, or when every board is
//! over. Only the last case submits scores and updates the local list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use arrayvec::ArrayVec;
use crossterm::event::KeyEvent;
use tracing::{debug, error, info, warn};

use duotris_core::BoardSnapshot;
use duotris_input::{is_interrupt, KeyMap};
use duotris_leaderboard::{unix_now, LeaderboardClient, LocalLeaderboard, RemoteEntry};

use crate::config::GameConfig;
use crate::context::MatchContext;
use crate::signals::MatchSignals;
use crate::types::{PlayerId, PlayerName, MAX_PLAYERS, REFRESH_EVERY_TICKS, TICK_MS};
use crate::{dispatcher, gravity};

/// Where the coordinator is in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    NameEntry,
    Playing,
    GameOver,
}

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Every board topped out.
    Finished,
    /// A player pressed the quit key, or name entry was cancelled.
    ReturnedToMenu,
    /// The program is exiting.
    Shutdown,
}

/// What the frontend returned from name entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameEntry {
    Name(PlayerName),
    /// Keep the current name.
    Keep,
    Cancel,
    Interrupt,
}

/// State of the networked leaderboard as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardStatus {
    Disabled,
    /// Nothing attempted yet.
    Unknown,
    Online,
    /// Last request failed; the cache may be stale.
    Offline,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerView<'a> {
    pub id: PlayerId,
    pub name: &'a PlayerName,
    pub keys: KeyMap,
    pub board: &'a BoardSnapshot,
}

/// Everything needed to draw one frame of a match.
#[derive(Debug, Clone)]
pub struct MatchView<'a> {
    pub players: ArrayVec<PlayerView<'a>, MAX_PLAYERS>,
    pub remote: &'a [RemoteEntry],
    pub remote_age: Option<Duration>,
    pub status: LeaderboardStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub name: PlayerName,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

#[derive(Debug, Clone)]
pub struct MatchResults {
    pub standings: ArrayVec<Standing, MAX_PLAYERS>,
    /// Index into `standings`.
    pub winner: Option<usize>,
    /// Position the winner took in the local leaderboard.
    pub local_rank: Option<usize>,
    pub remote: Vec<RemoteEntry>,
    pub remote_age: Option<Duration>,
    pub status: LeaderboardStatus,
}

/// Terminal side of the game. Implemented by the binary, faked in tests.
pub trait Frontend {
    /// Wait up to `timeout` for key presses and append them to `out`.
    fn poll_keys(&mut self, timeout: Duration, out: &mut Vec<KeyEvent>) -> Result<()>;

    fn draw_match(&mut self, view: &MatchView<'_>) -> Result<()>;

    fn enter_name(&mut self, player: PlayerId, current: &PlayerName) -> Result<NameEntry>;

    fn show_results(&mut self, results: &MatchResults) -> Result<()>;
}

/// Highest score wins; the earlier player wins a tie.
pub fn winner(scores: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

pub struct Coordinator {
    ctx: MatchContext,
    leaderboard: Option<LeaderboardClient>,
    status: LeaderboardStatus,
    local: LocalLeaderboard,
    config: GameConfig,
    shutdown: Arc<AtomicBool>,
    phase: Phase,
}

impl Coordinator {
    pub fn new(config: GameConfig) -> Self {
        let leaderboard = config.network.clone().and_then(|net| {
            LeaderboardClient::new(net)
                .map_err(|e| warn!("leaderboard client unavailable: {}", e))
                .ok()
        });
        let status = if leaderboard.is_some() {
            LeaderboardStatus::Unknown
        } else {
            LeaderboardStatus::Disabled
        };
        let local = LocalLeaderboard::load(&config.leaderboard_file).unwrap_or_else(|e| {
            warn!("{}", e);
            LocalLeaderboard::new()
        });

        Self {
            ctx: MatchContext::new(config.players),
            leaderboard,
            status,
            local,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            phase: Phase::Menu,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &MatchContext {
        &self.ctx
    }

    pub fn player_count(&self) -> usize {
        self.ctx.player_count()
    }

    pub fn set_player_count(&mut self, count: usize) {
        self.ctx.set_player_count(count);
    }

    pub fn local_leaderboard(&self) -> &LocalLeaderboard {
        &self.local
    }

    /// Cached remote top 10, empty if networking is off.
    pub fn remote_leaderboard(&self) -> &[RemoteEntry] {
        self.leaderboard
            .as_ref()
            .map(|client| client.cache().entries())
            .unwrap_or(&[])
    }

    /// Time since the remote list was last fetched successfully.
    pub fn remote_leaderboard_age(&self) -> Option<Duration> {
        cache_age(self.leaderboard.as_ref())
    }

    pub fn leaderboard_status(&self) -> LeaderboardStatus {
        self.status
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Blocking fetch for the leaderboard screen.
    pub fn refresh_leaderboard(&mut self) -> LeaderboardStatus {
        if let Some(client) = self.leaderboard.as_mut() {
            self.status = match client.fetch_leaderboard() {
                Ok(n) => {
                    debug!(entries = n, "leaderboard fetched");
                    LeaderboardStatus::Online
                }
                Err(e) => {
                    warn!("leaderboard fetch failed: {}", e);
                    LeaderboardStatus::Offline
                }
            };
        }
        self.status
    }

    /// Name entry, the match, and the results screen.
    pub fn play<F: Frontend>(&mut self, frontend: &mut F) -> Result<MatchOutcome> {
        self.set_phase(Phase::NameEntry);
        for i in 0..self.ctx.player_count() {
            let id = PlayerId(i);
            let current = self.ctx.active_players()[i].name().clone();
            match frontend.enter_name(id, &current)? {
                NameEntry::Name(name) => self.ctx.set_name(id, name),
                NameEntry::Keep => {}
                NameEntry::Cancel => {
                    self.set_phase(Phase::Menu);
                    return Ok(MatchOutcome::ReturnedToMenu);
                }
                NameEntry::Interrupt => {
                    self.request_shutdown();
                    self.set_phase(Phase::Menu);
                    return Ok(MatchOutcome::Shutdown);
                }
            }
        }

        let outcome = self.run_match(frontend);
        let outcome = match outcome {
            Ok(MatchOutcome::Finished) => {
                self.set_phase(Phase::GameOver);
                let results = self.finish_match();
                frontend.show_results(&results).map(|()| MatchOutcome::Finished)
            }
            other => other,
        };
        self.set_phase(Phase::Menu);
        outcome
    }

    /// Run one match until it ends. Every player thread is joined before
    /// this returns.
    pub fn run_match<F: Frontend>(&mut self, frontend: &mut F) -> Result<MatchOutcome> {
        self.set_phase(Phase::Playing);
        let signals = MatchSignals::new(Arc::clone(&self.shutdown));
        self.ctx.start_match(&mut rand::rng());
        if self.leaderboard.is_some() {
            self.refresh_leaderboard();
        }
        info!(players = self.ctx.player_count(), "match started");

        let ctx = &self.ctx;
        let signals = &signals;
        let leaderboard = &mut self.leaderboard;
        let status = &mut self.status;

        let outcome = thread::scope(|scope| {
            let mut senders: ArrayVec<Sender<KeyEvent>, MAX_PLAYERS> = ArrayVec::new();

            for slot in ctx.active_players() {
                let id = slot.id();
                let n = id.index() + 1;

                if let Err(e) = thread::Builder::new()
                    .name(format!("gravity-{n}"))
                    .spawn_scoped(scope, move || gravity::run_gravity(ctx, id, signals))
                {
                    error!(player = %id, "failed to start gravity: {}", e);
                }

                let (tx, rx) = mpsc::channel();
                let keys = KeyMap::for_player(id);
                match thread::Builder::new()
                    .name(format!("input-{n}"))
                    .spawn_scoped(scope, move || dispatcher::run_input(ctx, id, rx, keys, signals))
                {
                    Ok(_) => senders.push(tx),
                    Err(e) => error!(player = %id, "failed to start input: {}", e),
                }
            }

            let outcome = tick_loop(ctx, leaderboard, status, frontend, signals, &senders);
            signals.finish();
            outcome
        });

        match &outcome {
            Ok(o) => info!(outcome = ?o, "match ended"),
            Err(e) => error!("match aborted: {:#}", e),
        }
        outcome
    }

    /// Submit scores, re-fetch, pick the winner and record it locally.
    ///
    /// Call only after a match finished naturally, with no player threads
    /// running.
    pub fn finish_match(&mut self) -> MatchResults {
        let mut snapshots = ArrayVec::new();
        self.ctx.snapshot_into(&mut snapshots);
        let standings: ArrayVec<Standing, MAX_PLAYERS> = self
            .ctx
            .active_players()
            .iter()
            .zip(&snapshots)
            .map(|(slot, snap)| Standing {
                name: slot.name().clone(),
                score: snap.score,
                lines: snap.lines,
                level: snap.level,
            })
            .collect();
        self.record_results(standings)
    }

    /// Leaderboard side of [`Self::finish_match`] for known standings.
    pub fn record_results(&mut self, standings: ArrayVec<Standing, MAX_PLAYERS>) -> MatchResults {
        if let Some(client) = self.leaderboard.as_mut() {
            for s in standings.iter().filter(|s| s.score > 0) {
                match client.submit_score(s.name.as_str(), i64::from(s.score)) {
                    Ok(()) => info!(name = %s.name, score = s.score, "score submitted"),
                    Err(e) => warn!(name = %s.name, "score submission failed: {}", e),
                }
            }
        }
        if self.leaderboard.is_some() {
            self.refresh_leaderboard();
        }

        let scores: ArrayVec<u32, MAX_PLAYERS> = standings.iter().map(|s| s.score).collect();
        let winner = winner(&scores);

        let mut local_rank = None;
        if let Some(best) = winner.map(|i| &standings[i]).filter(|s| s.score > 0) {
            local_rank = self
                .local
                .insert(best.name.as_str(), i64::from(best.score), unix_now());
            if let Err(e) = self.local.save(&self.config.leaderboard_file) {
                warn!("{}", e);
            }
        }

        MatchResults {
            standings,
            winner,
            local_rank,
            remote: self.remote_leaderboard().to_vec(),
            remote_age: self.remote_leaderboard_age(),
            status: self.status,
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase change");
            self.phase = phase;
        }
    }
}

fn cache_age(client: Option<&LeaderboardClient>) -> Option<Duration> {
    client
        .and_then(|c| c.cache().updated_at())
        .map(|at| at.elapsed())
}

fn tick_loop<F: Frontend>(
    ctx: &MatchContext,
    leaderboard: &mut Option<LeaderboardClient>,
    status: &mut LeaderboardStatus,
    frontend: &mut F,
    signals: &MatchSignals,
    senders: &[Sender<KeyEvent>],
) -> Result<MatchOutcome> {
    let tick = Duration::from_millis(TICK_MS);
    let mut snapshots: ArrayVec<BoardSnapshot, MAX_PLAYERS> = ArrayVec::new();
    let mut keys = Vec::with_capacity(8);
    let mut ticks: u32 = 0;

    loop {
        if signals.shutdown_requested() {
            return Ok(MatchOutcome::Shutdown);
        }
        if signals.return_to_menu_requested() {
            return Ok(MatchOutcome::ReturnedToMenu);
        }

        ctx.snapshot_into(&mut snapshots);
        if snapshots.iter().all(|s| s.game_over) {
            return Ok(MatchOutcome::Finished);
        }

        {
            let view = MatchView {
                players: ctx
                    .active_players()
                    .iter()
                    .zip(&snapshots)
                    .map(|(slot, board)| PlayerView {
                        id: slot.id(),
                        name: slot.name(),
                        keys: KeyMap::for_player(slot.id()),
                        board,
                    })
                    .collect(),
                remote: leaderboard
                    .as_ref()
                    .map(|client| client.cache().entries())
                    .unwrap_or(&[]),
                remote_age: cache_age(leaderboard.as_ref()),
                status: *status,
            };
            frontend.draw_match(&view)?;
        }

        keys.clear();
        frontend.poll_keys(tick, &mut keys)?;
        for key in keys.drain(..) {
            if is_interrupt(key) {
                signals.request_shutdown();
                continue;
            }
            for tx in senders {
                // A closed channel means that player's board is over.
                let _ = tx.send(key);
            }
        }

        ticks = ticks.wrapping_add(1);
        if ticks % REFRESH_EVERY_TICKS == 0 {
            if let Some(client) = leaderboard.as_mut() {
                *status = match client.refresh_nonblocking() {
                    Ok(_) => LeaderboardStatus::Online,
                    Err(e) => {
                        debug!("leaderboard refresh failed: {}", e);
                        LeaderboardStatus::Offline
                    }
                };
            }
        }
    }
}
