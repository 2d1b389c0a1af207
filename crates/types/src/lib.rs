//! Core types module - shared data structures and constants
//!
//! Everything here is plain data with no behaviour beyond parsing and
//! validation, so it can be shared by the rules, the per-player threads,
//! the renderer and the leaderboard protocol.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: (4, 0), i.e. `BOARD_WIDTH / 2 - 1`
//!
//! # Gravity
//!
//! | Level | Interval |
//! |-------|----------|
//! | 1 | 500ms |
//! | 2 | 450ms |
//! | ... | -50ms per level |
//! | 9+ | 100ms floor |
//!
//! # Examples
//!
//! ```
//! use duotris_types::{drop_interval_ms, PieceKind, PlayerName, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::ALL.len(), 7);
//! assert_eq!(PieceKind::T.color_id(), 3);
//! assert_eq!(drop_interval_ms(1), 500);
//! assert_eq!(drop_interval_ms(20), 100);
//! assert!(PlayerName::new("Alice").is_some());
//! assert!(PlayerName::new("a|b").is_none());
//! assert_eq!(BOARD_WIDTH, 10);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: i8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: i8 = 20;

/// Maximum number of player slots.
pub const MAX_PLAYERS: usize = 2;

/// Render tick interval in milliseconds (~60 FPS).
pub const TICK_MS: u64 = 16;

/// Render ticks between in-match leaderboard refreshes (~3s at 60 FPS).
pub const REFRESH_EVERY_TICKS: u32 = 180;

/// Gravity interval at level 1.
pub const BASE_DROP_MS: u64 = 500;

/// Gravity speed-up per level above 1.
pub const DROP_STEP_MS: u64 = 50;

/// Fastest gravity interval.
pub const DROP_INTERVAL_MIN_MS: u64 = 100;

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Points per cleared row.
pub const POINTS_PER_ROW: u32 = 100;

/// Max characters accepted at name entry.
pub const MAX_NAME_CHARS: usize = 15;

/// Entries kept by the local leaderboard and the remote cache.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Distinct names held by the leaderboard server.
pub const SERVER_TABLE_CAPACITY: usize = 100;

/// Max bytes of a name on the wire (`%31` in the protocol grammar).
pub const MAX_WIRE_NAME_BYTES: usize = 31;

/// Gravity interval for a level (1-based).
pub fn drop_interval_ms(level: u32) -> u64 {
    let steps = u64::from(level.saturating_sub(1));
    BASE_DROP_MS
        .saturating_sub(steps.saturating_mul(DROP_STEP_MS))
        .max(DROP_INTERVAL_MIN_MS)
}

/// Level for a number of cleared lines.
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// The seven tetromino piece kinds
///
/// Discriminant order matches the color ids: `I` is color 1, `J` is color 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
    ];

    /// Color id written into the grid when this piece locks (1..=7).
    pub fn color_id(self) -> u8 {
        self as u8 + 1
    }

    /// Spawn orientation as four offsets relative to the piece position.
    pub fn spawn_cells(self) -> [(i8, i8); 4] {
        match self {
            PieceKind::I => [(0, 0), (1, 0), (2, 0), (3, 0)],
            PieceKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            PieceKind::T => [(0, 0), (1, 0), (2, 0), (1, 1)],
            PieceKind::S => [(0, 0), (1, 0), (1, 1), (2, 1)],
            PieceKind::Z => [(1, 0), (2, 0), (0, 1), (1, 1)],
            PieceKind::L => [(0, 0), (0, 1), (1, 1), (2, 1)],
            PieceKind::J => [(2, 0), (0, 1), (1, 1), (2, 1)],
        }
    }
}

/// A cell on the game board
///
/// - `None`: empty
/// - `Some(color_id)`: filled by a locked piece of that color
pub type Cell = Option<u8>;

/// Zero-based player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl PlayerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// A validated player name.
///
/// 1..=15 printable characters and at most 31 bytes (the wire limit),
/// without the protocol delimiters `|` and `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !Self::fits(trimmed) {
            return None;
        }
        if trimmed
            .chars()
            .any(|c| c.is_control() || c == '|' || c == ':')
        {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Whether `text` is within both the character and the wire byte limit.
    /// Name entry uses this to refuse a keystroke that would overflow.
    pub fn fits(text: &str) -> bool {
        text.len() <= MAX_WIRE_NAME_BYTES && text.chars().count() <= MAX_NAME_CHARS
    }

    /// Default name for a slot, e.g. `Player 1`.
    pub fn default_for(player: PlayerId) -> Self {
        Self(player.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A command an input dispatcher applies to its player's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    /// Leave the match and go back to the menu.
    Quit,
}
