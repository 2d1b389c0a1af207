//! Player slots and the locks around their boards.
//!
//! Lock order is fixed: the render lock first, then one board lock. Board
//! writers and the renderer both go through [`MatchContext`], so a render
//! pass sees every board at the same instant.

use std::sync::{Mutex, MutexGuard, PoisonError};

use arrayvec::ArrayVec;
use rand::Rng;

use duotris_core::{rules, Board, BoardSnapshot};

use crate::types::{PlayerId, PlayerName, MAX_PLAYERS};

/// One player's seat: a name that survives between matches and a board.
#[derive(Debug)]
pub struct PlayerSlot {
    id: PlayerId,
    name: PlayerName,
    board: Mutex<Board>,
}

impl PlayerSlot {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: PlayerName::default_for(id),
            board: Mutex::new(Board::new()),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    /// Board state is consistent after every rules call, so a poisoned lock
    /// is still safe to use.
    fn lock_board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Boards for every seat plus the cross-player render lock.
#[derive(Debug)]
pub struct MatchContext {
    slots: ArrayVec<PlayerSlot, MAX_PLAYERS>,
    player_count: usize,
    render_lock: Mutex<()>,
}

impl MatchContext {
    /// Context with every seat filled and `player_count` of them active
    /// (clamped to `1..=MAX_PLAYERS`).
    pub fn new(player_count: usize) -> Self {
        Self {
            slots: (0..MAX_PLAYERS).map(|i| PlayerSlot::new(PlayerId(i))).collect(),
            player_count: player_count.clamp(1, MAX_PLAYERS),
            render_lock: Mutex::new(()),
        }
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Only between matches: no thread may hold a board.
    pub fn set_player_count(&mut self, count: usize) {
        self.player_count = count.clamp(1, MAX_PLAYERS);
    }

    /// Only between matches.
    pub fn set_name(&mut self, player: PlayerId, name: PlayerName) {
        if let Some(slot) = self.slots.get_mut(player.index()) {
            slot.name = name;
        }
    }

    /// Seats taking part in the next match.
    pub fn active_players(&self) -> &[PlayerSlot] {
        &self.slots[..self.player_count]
    }

    pub fn slot(&self, player: PlayerId) -> Option<&PlayerSlot> {
        self.active_players().get(player.index())
    }

    /// Reset every active board (names kept) and spawn its first piece.
    pub fn start_match<R: Rng + ?Sized>(&self, rng: &mut R) {
        let _render = self.lock_render();
        for slot in self.active_players() {
            let mut board = slot.lock_board();
            board.reset();
            rules::spawn_piece(&mut board, rng);
        }
    }

    /// Run `f` on a player's board under the render lock and the board lock.
    ///
    /// Returns `None` for an inactive seat.
    pub fn with_board<T>(&self, player: PlayerId, f: impl FnOnce(&mut Board) -> T) -> Option<T> {
        let slot = self.slot(player)?;
        let _render = self.lock_render();
        let mut board = slot.lock_board();
        Some(f(&mut board))
    }

    /// Copy every active board into `out` under a single render lock.
    ///
    /// `out` is resized to the active player count.
    pub fn snapshot_into(&self, out: &mut ArrayVec<BoardSnapshot, MAX_PLAYERS>) {
        out.truncate(self.player_count);
        while out.len() < self.player_count {
            out.push(BoardSnapshot::default());
        }
        let _render = self.lock_render();
        for (slot, snapshot) in self.active_players().iter().zip(out.iter_mut()) {
            slot.lock_board().snapshot_into(snapshot);
        }
    }

    fn lock_render(&self) -> MutexGuard<'_, ()> {
        self.render_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
