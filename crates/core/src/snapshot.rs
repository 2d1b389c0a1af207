use serde::{Deserialize, Serialize};

use crate::board::GRID_SIZE;
use crate::piece::Piece;
use crate::types::{Cell, PieceKind, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub x: i8,
    pub y: i8,
}

impl From<&Piece> for ActiveSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind,
            x: value.x,
            y: value.y,
        }
    }
}

/// Copy of a board taken under its lock, safe to render afterwards.
///
/// `cells` already includes the visible part of the falling piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub cells: Vec<Cell>,
    pub active: Option<ActiveSnapshot>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub game_over: bool,
}

impl BoardSnapshot {
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells
            .get(y * BOARD_WIDTH as usize + x)
            .copied()
            .flatten()
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            cells: vec![None; GRID_SIZE],
            active: None,
            score: 0,
            level: 1,
            lines: 0,
            game_over: false,
        }
    }
}
