//! Leaderboard crate: local high scores, the text wire protocol, the
//! server-side score table, and both ends of the TCP exchange.
//!
//! The server is async (tokio); the client wraps a current-thread runtime so
//! the synchronous game loop can call it directly.

pub mod client;
pub mod local;
pub mod protocol;
pub mod server;
pub mod table;

pub use duotris_types as types;

/// Scores as carried on the wire and stored in leaderboards.
pub type Score = i64;

pub use client::{ClientConfig, ClientError, LeaderboardClient, RemoteLeaderboard};
pub use local::{LocalEntry, LocalLeaderboard, LocalLeaderboardError};
pub use protocol::{ProtocolError, RemoteEntry, Request, Response};
pub use server::{respond, run_server, ServerConfig};
pub use table::{ScoreTable, ServerEntry, SubmitOutcome};

/// Seconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
