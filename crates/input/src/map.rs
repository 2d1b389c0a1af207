//! Key mapping from terminal events to per-player commands.

use crate::types::{PlayerCommand, PlayerId};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which keys drive one player's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMap {
    /// `a`/`d` move, `s` soft drop, `w` rotate, Space hard drop.
    Wasd,
    /// Arrow keys move/drop/rotate, Enter hard drop.
    Arrows,
}

impl KeyMap {
    /// Default layout for a player slot.
    pub fn for_player(player: PlayerId) -> Self {
        if player.index() == 0 {
            KeyMap::Wasd
        } else {
            KeyMap::Arrows
        }
    }

    /// Map a key to a command for this layout.
    ///
    /// `q`/`Q` maps to [`PlayerCommand::Quit`] in every layout.
    pub fn command_for(self, key: KeyEvent) -> Option<PlayerCommand> {
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
            return Some(PlayerCommand::Quit);
        }
        match self {
            KeyMap::Wasd => match key.code {
                KeyCode::Char('a') | KeyCode::Char('A') => Some(PlayerCommand::MoveLeft),
                KeyCode::Char('d') | KeyCode::Char('D') => Some(PlayerCommand::MoveRight),
                KeyCode::Char('s') | KeyCode::Char('S') => Some(PlayerCommand::SoftDrop),
                KeyCode::Char('w') | KeyCode::Char('W') => Some(PlayerCommand::Rotate),
                KeyCode::Char(' ') => Some(PlayerCommand::HardDrop),
                _ => None,
            },
            KeyMap::Arrows => match key.code {
                KeyCode::Left => Some(PlayerCommand::MoveLeft),
                KeyCode::Right => Some(PlayerCommand::MoveRight),
                KeyCode::Down => Some(PlayerCommand::SoftDrop),
                KeyCode::Up => Some(PlayerCommand::Rotate),
                KeyCode::Enter => Some(PlayerCommand::HardDrop),
                _ => None,
            },
        }
    }

    /// One-line help text for the in-game footer.
    pub fn describe(self) -> &'static str {
        match self {
            KeyMap::Wasd => "WASD move/rotate, Space drop",
            KeyMap::Arrows => "Arrows move/rotate, Enter drop",
        }
    }
}

/// Check if a key should shut the whole program down (Ctrl-C).
pub fn is_interrupt(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
