//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into per-player [`crate::types::PlayerCommand`]s.
//! Player 1 plays on WASD + Space, player 2 on the arrow keys + Enter; `q`
//! leaves the match for both.

pub mod map;

pub use duotris_types as types;

pub use map::{is_interrupt, KeyMap};
