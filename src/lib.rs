//! duotris (workspace facade crate).
//!
//! Re-exports the member crates under short names so the binaries, the
//! integration tests and the benches can say `duotris::core::rules` and so on.

pub use duotris_core as core;
pub use duotris_engine as engine;
pub use duotris_input as input;
pub use duotris_leaderboard as leaderboard;
pub use duotris_term as term;
pub use duotris_types as types;
