//! Collision, locking, line clears, spawning and rotation.
//!
//! Every function takes `&mut Board` (or `&Board`), so the caller must already
//! hold the board's lock. A function either commits a whole change or leaves
//! the board untouched; nothing here can leave a half-applied move behind.

use rand::Rng;

use crate::board::Board;
use crate::piece::Piece;
use crate::types::{level_for_lines, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, POINTS_PER_ROW};

/// Result of a move or drop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The piece moved; nothing else changed.
    Moved,
    /// A downward move was blocked: the piece locked, full rows were
    /// cleared and the next piece was spawned (or the board topped out).
    Settled { rows_cleared: u32 },
    /// Rejected with no state change.
    Blocked,
}

/// True if `piece` shifted by (dx, dy) leaves the side or bottom walls or
/// overlaps a filled cell. Cells above the top row are never checked.
pub fn collides(board: &Board, piece: &Piece, dx: i8, dy: i8) -> bool {
    piece.absolute_cells(dx, dy).any(|(x, y)| {
        x < 0 || x >= BOARD_WIDTH || y >= BOARD_HEIGHT || (y >= 0 && board.grid.is_filled(x, y))
    })
}

/// Write the current piece into the grid with its color id.
///
/// The piece is consumed; returns false if there was no piece.
pub fn lock_piece(board: &mut Board) -> bool {
    let Some(piece) = board.piece.take() else {
        return false;
    };
    for (x, y) in piece.absolute_cells(0, 0) {
        if y >= 0 {
            board.grid.set(x, y, Some(piece.color()));
        }
    }
    true
}

/// Remove every full row, bottom to top, and update score, lines and level.
///
/// After a removal the same row index is examined again, since the row that
/// slid into it may be full too. Returns the number of rows removed.
pub fn clear_full_rows(board: &mut Board) -> u32 {
    let mut rows_cleared = 0u32;
    let mut y = BOARD_HEIGHT as usize;
    while y > 0 {
        let row = y - 1;
        if board.grid.is_row_full(row) {
            board.grid.remove_row(row);
            rows_cleared += 1;
        } else {
            y -= 1;
        }
    }

    if rows_cleared > 0 {
        board.score = board.score.saturating_add(POINTS_PER_ROW * rows_cleared);
        board.lines_cleared = board.lines_cleared.saturating_add(rows_cleared);
        board.level = level_for_lines(board.lines_cleared);
    }
    rows_cleared
}

/// Spawn a uniformly random piece at the top centre.
///
/// If it collides where it appears the board is over: `game_over` is set and
/// no piece is kept. Returns whether a playable piece was placed.
pub fn spawn_piece<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> bool {
    if board.game_over {
        return false;
    }
    let kind = PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())];
    spawn_kind(board, kind)
}

/// Spawn a specific piece kind (deterministic spawns for tests and replays).
pub fn spawn_kind(board: &mut Board, kind: PieceKind) -> bool {
    if board.game_over {
        return false;
    }
    let piece = Piece::spawn(kind);
    if collides(board, &piece, 0, 0) {
        board.game_over = true;
        board.piece = None;
        return false;
    }
    board.piece = Some(piece);
    true
}

/// Rotate the current piece a quarter turn about its own origin.
///
/// No wall kicks: the rotation is committed only if all four rotated cells
/// are inside the walls and on empty cells.
pub fn rotate_piece(board: &mut Board) -> bool {
    if board.game_over {
        return false;
    }
    let Some(piece) = board.piece else {
        return false;
    };
    let rotated = piece.rotated();
    if collides(board, &rotated, 0, 0) {
        return false;
    }
    board.piece = Some(rotated);
    true
}

/// Move the current piece by (dx, dy).
///
/// A blocked downward move runs lock, clear and spawn as one unit; any other
/// blocked move is rejected.
pub fn move_piece<R: Rng + ?Sized>(board: &mut Board, dx: i8, dy: i8, rng: &mut R) -> MoveOutcome {
    if board.game_over {
        return MoveOutcome::Blocked;
    }
    let Some(piece) = board.piece else {
        return MoveOutcome::Blocked;
    };

    if !collides(board, &piece, dx, dy) {
        board.piece = Some(piece.shifted(dx, dy));
        return MoveOutcome::Moved;
    }

    if dy > 0 {
        let rows_cleared = settle(board, rng);
        return MoveOutcome::Settled { rows_cleared };
    }

    MoveOutcome::Blocked
}

/// Drop the current piece as far as it goes, then lock, clear and spawn once.
pub fn hard_drop<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> MoveOutcome {
    if board.game_over {
        return MoveOutcome::Blocked;
    }
    let Some(mut piece) = board.piece else {
        return MoveOutcome::Blocked;
    };

    while !collides(board, &piece, 0, 1) {
        piece = piece.shifted(0, 1);
    }
    board.piece = Some(piece);

    let rows_cleared = settle(board, rng);
    MoveOutcome::Settled { rows_cleared }
}

fn settle<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> u32 {
    lock_piece(board);
    let rows_cleared = clear_full_rows(board);
    spawn_piece(board, rng);
    rows_cleared
}
