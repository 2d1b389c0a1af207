//! Match engine: per-player threads around the core rules.
//!
//! # Threads
//!
//! Each player gets two OS threads for the length of a match:
//!
//! - [`gravity::run_gravity`] moves the piece down once per drop interval
//! - [`dispatcher::run_input`] applies that player's key presses
//!
//! Both mutate the same board through [`context::MatchContext`], which takes
//! the shared render lock and then the board lock. The [`coordinator`]
//! renders, forwards keys and decides when the match is over; it signals and
//! joins every thread before leaving the match.

pub mod config;
pub mod context;
pub mod coordinator;
pub mod dispatcher;
pub mod gravity;
pub mod signals;

pub use duotris_types as types;

pub use config::GameConfig;
pub use context::{MatchContext, PlayerSlot};
pub use coordinator::{
    winner, Coordinator, Frontend, LeaderboardStatus, MatchOutcome, MatchResults, MatchView,
    NameEntry, Phase, PlayerView, Standing,
};
pub use signals::MatchSignals;
