//! Falling piece: kind, position and its four relative cells.

use crate::types::{PieceKind, BOARD_WIDTH};

/// Spawn column, horizontally centred.
pub const SPAWN_X: i8 = BOARD_WIDTH / 2 - 1;

/// Spawn row (the top visible row).
pub const SPAWN_Y: i8 = 0;

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub x: i8,
    pub y: i8,
    /// Offsets relative to (x, y). Rotation rewrites these, nothing else.
    pub cells: [(i8, i8); 4],
}

impl Piece {
    /// Create a piece in spawn orientation at the spawn position
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            x: SPAWN_X,
            y: SPAWN_Y,
            cells: kind.spawn_cells(),
        }
    }

    pub fn color(&self) -> u8 {
        self.kind.color_id()
    }

    /// Absolute board positions of the four cells, shifted by (dx, dy).
    pub fn absolute_cells(&self, dx: i8, dy: i8) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.cells
            .iter()
            .map(move |&(cx, cy)| (self.x + cx + dx, self.y + cy + dy))
    }

    /// The same piece turned a quarter: each offset (x, y) becomes (-y, x)
    /// about the piece's own origin.
    pub fn rotated(&self) -> Self {
        let mut cells = self.cells;
        for cell in &mut cells {
            *cell = (-cell.1, cell.0);
        }
        Self { cells, ..*self }
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
