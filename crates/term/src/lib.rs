//! Terminal rendering for the game binary.
//!
//! Screens are drawn into a plain [`FrameBuffer`] by the pure functions in
//! [`view`], then flushed by [`TerminalRenderer`]. No widget library.

pub mod fb;
pub mod renderer;
pub mod view;

pub use duotris_core as core;
pub use duotris_types as types;

pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use renderer::{encode_full_into, TerminalRenderer};
pub use view::{
    piece_style, render_leaderboards, render_match, render_menu, render_name_entry,
    render_results, Menu, MenuItem,
};
