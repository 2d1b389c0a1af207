//! Leaderboard client used by the game.
//!
//! Every call opens a fresh connection, sends one request, reads one
//! response and closes. Calls are bounded by explicit timeouts so an
//! unreachable server degrades the leaderboard to "offline" without
//! stalling anything else. Failed calls are never retried and never touch
//! the cached remote leaderboard.
//!
//! The game loop is synchronous, so the client owns a small current-thread
//! tokio runtime and blocks on it.

use std::io;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tracing::debug;

use crate::protocol::{parse_leaderboard, RemoteEntry, Request, MAX_MESSAGE_BYTES};
use crate::types::LEADERBOARD_CAPACITY;
use crate::Score;

/// Default server address.
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8080";

/// Bound for connect, send and receive on blocking calls.
pub const IO_TIMEOUT: Duration = Duration::from_secs(3);

/// Bound for the in-match refresh.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_addr: String,
    pub io_timeout: Duration,
    pub poll_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            io_timeout: IO_TIMEOUT,
            poll_timeout: POLL_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables.
    ///
    /// - `LEADERBOARD_SERVER`: `host:port` (default `127.0.0.1:8080`)
    pub fn from_env() -> Self {
        let server_addr = std::env::var("LEADERBOARD_SERVER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());
        Self {
            server_addr,
            ..Self::default()
        }
    }

    /// Check if networking is disabled via `LEADERBOARD_DISABLED`.
    pub fn is_disabled() -> bool {
        std::env::var("LEADERBOARD_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connecting to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("server closed the connection without responding")]
    EmptyResponse,
    #[error("unexpected response: {0:?}")]
    UnexpectedResponse(String),
}

/// Last successfully fetched remote top 10.
#[derive(Debug, Clone, Default)]
pub struct RemoteLeaderboard {
    entries: ArrayVec<RemoteEntry, LEADERBOARD_CAPACITY>,
    updated_at: Option<Instant>,
}

impl RemoteLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a raw response.
    ///
    /// Without the `LEADERBOARD` marker this is a no-op returning false.
    /// Otherwise the cache is replaced wholesale, even by an empty list.
    pub fn apply_response(&mut self, text: &str) -> bool {
        match parse_leaderboard(text) {
            Some(entries) => {
                self.entries = entries;
                self.updated_at = Some(Instant::now());
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[RemoteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the cache was last replaced, `None` if never.
    pub fn updated_at(&self) -> Option<Instant> {
        self.updated_at
    }
}

pub struct LeaderboardClient {
    config: ClientConfig,
    cache: RemoteLeaderboard,
    rt: Runtime,
}

impl LeaderboardClient {
    pub fn new(config: ClientConfig) -> io::Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            config,
            cache: RemoteLeaderboard::new(),
            rt,
        })
    }

    pub fn cache(&self) -> &RemoteLeaderboard {
        &self.cache
    }

    /// Send `SUBMIT|<name>|<score>`.
    ///
    /// Succeeds once the request is sent; the reply is read (bounded) and
    /// logged but not interpreted.
    pub fn submit_score(&self, name: &str, score: Score) -> Result<(), ClientError> {
        let request = Request::Submit {
            name: name.to_string(),
            score,
        };
        let limit = self.config.io_timeout;
        self.rt.block_on(async {
            let mut stream = connect(&self.config.server_addr, limit).await?;
            send(&mut stream, &request, limit).await?;
            match receive(&mut stream, limit).await {
                Ok(reply) => debug!(%reply, "score submitted"),
                Err(e) => debug!(error = %e, "no reply to score submission"),
            }
            Ok(())
        })
    }

    /// Send `GET_LEADERBOARD` and replace the cache with the reply.
    ///
    /// Returns the number of entries now cached.
    pub fn fetch_leaderboard(&mut self) -> Result<usize, ClientError> {
        let limit = self.config.io_timeout;
        self.request_leaderboard(limit, limit)
    }

    /// Same as [`Self::fetch_leaderboard`], but connect and receive are
    /// bounded by the short poll timeout. On failure the cache keeps its
    /// previous (possibly stale) contents.
    pub fn refresh_nonblocking(&mut self) -> Result<usize, ClientError> {
        let poll = self.config.poll_timeout;
        self.request_leaderboard(poll, poll)
    }

    /// Feed a raw server reply into the cache. Returns false, leaving the
    /// cache alone, when the reply is not a `LEADERBOARD` response.
    pub fn parse_response(&mut self, text: &str) -> bool {
        self.cache.apply_response(text)
    }

    fn request_leaderboard(
        &mut self,
        connect_limit: Duration,
        receive_limit: Duration,
    ) -> Result<usize, ClientError> {
        let send_limit = self.config.io_timeout;
        let reply = self.rt.block_on(async {
            let mut stream = connect(&self.config.server_addr, connect_limit).await?;
            send(&mut stream, &Request::GetLeaderboard, send_limit).await?;
            receive(&mut stream, receive_limit).await
        })?;

        if self.parse_response(&reply) {
            Ok(self.cache.entries().len())
        } else {
            Err(ClientError::UnexpectedResponse(reply))
        }
    }
}

async fn connect(addr: &str, limit: Duration) -> Result<TcpStream, ClientError> {
    timeout(limit, TcpStream::connect(addr))
        .await
        .map_err(|_| ClientError::Timeout("connect"))?
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })
}

async fn send(stream: &mut TcpStream, request: &Request, limit: Duration) -> Result<(), ClientError> {
    timeout(limit, stream.write_all(request.encode().as_bytes()))
        .await
        .map_err(|_| ClientError::Timeout("send"))??;
    Ok(())
}

/// Read until the server closes or the message limit is reached.
async fn receive(stream: &mut TcpStream, limit: Duration) -> Result<String, ClientError> {
    let mut buf = Vec::with_capacity(256);
    timeout(
        limit,
        (&mut *stream)
            .take(MAX_MESSAGE_BYTES as u64)
            .read_to_end(&mut buf),
    )
    .await
    .map_err(|_| ClientError::Timeout("receive"))??;

    if buf.is_empty() {
        return Err(ClientError::EmptyResponse);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
