//! TCP leaderboard server
//!
//! Serves one connection at a time: read one request (bounded by a timeout),
//! write one response, close. The accept loop wakes at least once a second
//! so a shutdown request is noticed promptly even when nobody connects.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::protocol::{Request, Response, MAX_MESSAGE_BYTES};
use crate::table::{ScoreTable, SubmitOutcome};
use crate::unix_now;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    /// How long the accept loop waits before re-checking shutdown.
    pub accept_poll: Duration,
    /// Bound for reading the single request of a connection.
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            backlog: 3,
            accept_poll: Duration::from_secs(1),
            read_timeout: Duration::from_secs(3),
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    ///
    /// - `LEADERBOARD_HOST`: bind address (default `0.0.0.0`)
    /// - `LEADERBOARD_PORT`: port (default 8080)
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("LEADERBOARD_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("LEADERBOARD_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        Self {
            host,
            port,
            ..Self::default()
        }
    }

    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address: {}", self.host),
            )
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Handle one raw request against the table and produce the wire response.
pub fn respond(table: &mut ScoreTable, raw: &str, origin: IpAddr) -> String {
    let response = match Request::parse(raw) {
        Ok(Request::Submit { name, score }) => {
            match table.submit(&name, score, origin, unix_now()) {
                SubmitOutcome::Dropped => warn!(%name, "score table full, submission dropped"),
                outcome => debug!(%name, score, ?outcome, "submission applied"),
            }
            info!("Score submitted: {} - {} from {}", name, score, origin);
            Response::Submitted { name, score }
        }
        Ok(Request::GetLeaderboard) => {
            info!("Leaderboard requested by {}", origin);
            Response::Leaderboard(table.top())
        }
        Err(err) => Response::Error(err),
    };
    response.to_string()
}

/// Bind and serve until `shutdown` flips to true (or its sender is dropped).
///
/// `ready_tx` receives the bound address once the socket is listening, which
/// lets tests bind port 0. Returns the final table.
pub async fn run_server(
    config: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> io::Result<ScoreTable> {
    let listener = bind(&config)?;
    let bound = listener.local_addr()?;
    info!("Leaderboard server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut table = ScoreTable::new();

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    info!("New connection from {}", addr);
                    if let Err(e) = serve_connection(socket, addr, &mut table, config.read_timeout).await {
                        warn!("Connection from {} failed: {}", addr, e);
                    }
                }
                Err(e) => warn!("Accept failed: {}", e),
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::time::sleep(config.accept_poll) => {}
        }
    }

    info!("Leaderboard server shutting down");
    Ok(table)
}

fn bind(config: &ServerConfig) -> io::Result<TcpListener> {
    let addr = config.socket_addr()?;
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(config.backlog)
}

async fn serve_connection(
    mut socket: TcpStream,
    addr: SocketAddr,
    table: &mut ScoreTable,
    read_timeout: Duration,
) -> io::Result<()> {
    let mut buf = [0u8; MAX_MESSAGE_BYTES];
    let n = match tokio::time::timeout(read_timeout, socket.read(&mut buf)).await {
        Ok(read) => read?,
        Err(_) => {
            debug!("Read from {} timed out", addr);
            return Ok(());
        }
    };
    if n == 0 {
        return Ok(());
    }

    let raw = String::from_utf8_lossy(&buf[..n]);
    info!("Received: {}", raw);
    let reply = respond(table, &raw, addr.ip());
    socket.write_all(reply.as_bytes()).await?;
    socket.shutdown().await
}
