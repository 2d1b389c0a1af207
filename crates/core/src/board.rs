//! Board module - the per-player grid and match counters
//!
//! The grid is a 10x20 array of cells, each empty or filled with a color id.
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Rows above the top (y < 0) exist only for pieces and are never stored.

use crate::piece::Piece;
use crate::snapshot::{ActiveSnapshot, BoardSnapshot};
use crate::types::{level_for_lines, Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
pub const GRID_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The playfield - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; GRID_SIZE],
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: [None; GRID_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH || y < 0 || y >= BOARD_HEIGHT {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and filled
    pub fn is_filled(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if a row has no empty cell
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Remove row `y`, shift every row above it down by one and empty the top row.
    pub fn remove_row(&mut self, y: usize) {
        if y >= BOARD_HEIGHT as usize {
            return;
        }

        let width = BOARD_WIDTH as usize;
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells
                .copy_within(src_start..src_start + width, row * width);
        }

        for cell in &mut self.cells[..width] {
            *cell = None;
        }
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(BOARD_WIDTH as usize)
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.cells = [None; GRID_SIZE];
    }

    /// Fill every cell of row `y` with `color`.
    pub fn fill_row(&mut self, y: i8, color: u8) {
        for x in 0..BOARD_WIDTH {
            self.set(x, y, Some(color));
        }
    }

    /// Positions of filled cells, for invariant checks.
    pub fn filled_positions(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, cell)| {
            cell.map(|_| {
                (
                    (idx % BOARD_WIDTH as usize) as i8,
                    (idx / BOARD_WIDTH as usize) as i8,
                )
            })
        })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// One player's board: grid, falling piece and counters.
///
/// All mutation goes through [`crate::rules`]. The exclusive lock lives with
/// whoever owns the board (the engine wraps it in a `Mutex`), so holding
/// `&mut Board` is holding the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) grid: Grid,
    pub(crate) piece: Option<Piece>,
    pub(crate) score: u32,
    pub(crate) lines_cleared: u32,
    pub(crate) level: u32,
    pub(crate) game_over: bool,
}

impl Board {
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            piece: None,
            score: 0,
            lines_cleared: 0,
            level: level_for_lines(0),
            game_over: false,
        }
    }

    /// Build a board around an existing grid (tests, benches, replays).
    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            ..Self::new()
        }
    }

    /// Reset to an empty board between matches.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    /// Replace the falling piece without any rule checks.
    pub fn set_piece(&mut self, piece: Option<Piece>) {
        self.piece = piece;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// True while there is a piece the player can still move.
    pub fn playable(&self) -> bool {
        !self.game_over && self.piece.is_some()
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.cells.copy_from_slice(self.grid.cells());
        out.active = self.piece.as_ref().map(ActiveSnapshot::from);
        if let Some(piece) = &self.piece {
            for (x, y) in piece.absolute_cells(0, 0) {
                if let Some(idx) = Grid::index(x, y) {
                    out.cells[idx] = Some(piece.color());
                }
            }
        }
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines_cleared;
        out.game_over = self.game_over;
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
