//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the board, the falling piece and the rules that mutate
//! them. It has **no dependencies** on threads, terminals or networking:
//! callers hold whatever lock guards a board and pass `&mut Board` in.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid plus score, lines, level and the game-over flag
//! - [`piece`]: falling piece with four relative cells and quarter-turn rotation
//! - [`rules`]: collision, lock, line clear, spawn, rotate, move, hard drop
//! - [`snapshot`]: copy of a board for rendering outside the lock
//!
//! # Game Rules
//!
//! - **Uniform spawns**: each of the 7 shapes is equally likely
//! - **Simple rotation**: `(x, y) -> (-y, x)` about the piece origin, no wall kicks
//! - **Scoring**: 100 points per cleared row
//! - **Level**: `lines / 10 + 1`
//!
//! # Example
//!
//! ```
//! use duotris_core::{rules, Board, MoveOutcome};
//!
//! let mut rng = rand::rng();
//! let mut board = Board::new();
//! assert!(rules::spawn_piece(&mut board, &mut rng));
//!
//! assert_eq!(rules::move_piece(&mut board, 0, 1, &mut rng), MoveOutcome::Moved);
//! assert!(matches!(rules::hard_drop(&mut board, &mut rng), MoveOutcome::Settled { .. }));
//! assert_eq!(board.grid().filled_positions().count(), 4);
//! ```

pub mod board;
pub mod piece;
pub mod rules;
pub mod snapshot;

pub use duotris_types as types;

pub use board::{Board, Grid, GRID_SIZE};
pub use piece::Piece;
pub use rules::MoveOutcome;
pub use snapshot::{ActiveSnapshot, BoardSnapshot};
