//! Protocol module - pipe-delimited text messages
//!
//! One request and one response per TCP connection, ASCII, no length prefix
//! and no terminator: a message ends where the connection (or the single
//! read) ends.
//!
//! ```text
//! SUBMIT|<name>|<score>   -> OK|Score submitted: <name> - <score>
//!                         -> ERROR|Invalid SUBMIT format
//! GET_LEADERBOARD         -> LEADERBOARD|<name>:<score>|<name>:<score>...
//! anything else           -> ERROR|Unknown command
//! ```

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::types::{LEADERBOARD_CAPACITY, MAX_WIRE_NAME_BYTES};
use crate::Score;

pub const SUBMIT_PREFIX: &str = "SUBMIT|";
pub const GET_LEADERBOARD: &str = "GET_LEADERBOARD";
pub const LEADERBOARD_MARKER: &str = "LEADERBOARD";

/// Largest message either side reads in one go.
pub const MAX_MESSAGE_BYTES: usize = 1023;

// ============== Requests ==============

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Submit { name: String, score: Score },
    GetLeaderboard,
}

/// Why a request was refused. `Display` is the text after `ERROR|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid SUBMIT format")]
    InvalidSubmit,
    #[error("Unknown command")]
    UnknownCommand,
}

impl Request {
    /// Parse one raw request.
    ///
    /// A single trailing `\n` or `\r\n` is ignored; apart from that
    /// `GET_LEADERBOARD` must match exactly.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let raw = strip_line_ending(raw);
        if let Some(payload) = raw.strip_prefix(SUBMIT_PREFIX) {
            let (name, score) = parse_submit_payload(payload).ok_or(ProtocolError::InvalidSubmit)?;
            return Ok(Request::Submit {
                name: name.to_string(),
                score,
            });
        }
        if raw == GET_LEADERBOARD {
            return Ok(Request::GetLeaderboard);
        }
        Err(ProtocolError::UnknownCommand)
    }

    /// Wire text for this request.
    pub fn encode(&self) -> String {
        match self {
            Request::Submit { name, score } => format!("{SUBMIT_PREFIX}{name}|{score}"),
            Request::GetLeaderboard => GET_LEADERBOARD.to_string(),
        }
    }
}

fn strip_line_ending(raw: &str) -> &str {
    raw.strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw)
}

/// `<name>|<int>`: name is 1..=31 bytes without `|`.
fn parse_submit_payload(payload: &str) -> Option<(&str, Score)> {
    let (name, rest) = payload.split_once('|')?;
    if !valid_wire_name(name) {
        return None;
    }
    let score = parse_int_prefix(rest)?;
    Some((name, score))
}

fn valid_wire_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_WIRE_NAME_BYTES
}

/// Leading integer of `s`: optional whitespace, optional sign, at least one
/// digit. Whatever follows the digits is ignored.
fn parse_int_prefix(s: &str) -> Option<Score> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

// ============== Responses ==============

/// One `(name, score)` pair as carried by a `LEADERBOARD` response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub score: Score,
}

impl RemoteEntry {
    pub fn new(name: impl Into<String>, score: Score) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Submitted { name: String, score: Score },
    Leaderboard(Vec<RemoteEntry>),
    Error(ProtocolError),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Submitted { name, score } => {
                write!(f, "OK|Score submitted: {name} - {score}")
            }
            Response::Leaderboard(entries) => {
                f.write_str(LEADERBOARD_MARKER)?;
                for entry in entries.iter().take(LEADERBOARD_CAPACITY) {
                    write!(f, "|{}:{}", entry.name, entry.score)?;
                }
                Ok(())
            }
            Response::Error(err) => write!(f, "ERROR|{err}"),
        }
    }
}

/// Parse a `LEADERBOARD` response.
///
/// Returns `None` if the text does not start with the marker, which callers
/// treat as "leave the cache alone". Otherwise collects up to 10 segments in
/// order and stops quietly at the first malformed one.
pub fn parse_leaderboard(text: &str) -> Option<ArrayVec<RemoteEntry, LEADERBOARD_CAPACITY>> {
    let mut rest = text.strip_prefix(LEADERBOARD_MARKER)?;
    let mut entries = ArrayVec::new();

    while !entries.is_full() {
        let Some(after_pipe) = rest.strip_prefix('|') else {
            break;
        };
        let (segment, tail) = match after_pipe.find('|') {
            Some(idx) => after_pipe.split_at(idx),
            None => (after_pipe, ""),
        };
        let Some(entry) = parse_segment(segment) else {
            break;
        };
        entries.push(entry);
        rest = tail;
    }

    Some(entries)
}

fn parse_segment(segment: &str) -> Option<RemoteEntry> {
    let (name, score) = segment.split_once(':')?;
    if !valid_wire_name(name) {
        return None;
    }
    Some(RemoteEntry::new(name, parse_int_prefix(score)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit() {
        assert_eq!(
            Request::parse("SUBMIT|Alice|500"),
            Ok(Request::Submit {
                name: "Alice".into(),
                score: 500
            })
        );
        assert_eq!(
            Request::parse("SUBMIT|Player 2|-3\n"),
            Ok(Request::Submit {
                name: "Player 2".into(),
                score: -3
            })
        );
        assert_eq!(
            Request::parse("SUBMIT|Bob| 42trailing"),
            Ok(Request::Submit {
                name: "Bob".into(),
                score: 42
            })
        );
    }

    #[test]
    fn test_parse_submit_rejects_malformed() {
        for raw in [
            "SUBMIT|",
            "SUBMIT||5",
            "SUBMIT|Alice",
            "SUBMIT|Alice|",
            "SUBMIT|Alice|abc",
            "SUBMIT|Alice|-",
            "SUBMIT|Alice|99999999999999999999999",
        ] {
            assert_eq!(Request::parse(raw), Err(ProtocolError::InvalidSubmit), "{raw}");
        }
        let long = format!("SUBMIT|{}|1", "x".repeat(32));
        assert_eq!(Request::parse(&long), Err(ProtocolError::InvalidSubmit));
        let max = format!("SUBMIT|{}|1", "x".repeat(31));
        assert!(Request::parse(&max).is_ok());
    }

    #[test]
    fn test_parse_get_and_unknown() {
        assert_eq!(Request::parse("GET_LEADERBOARD"), Ok(Request::GetLeaderboard));
        assert_eq!(Request::parse("GET_LEADERBOARD\r\n"), Ok(Request::GetLeaderboard));
        assert_eq!(
            Request::parse("GET_LEADERBOARDX"),
            Err(ProtocolError::UnknownCommand)
        );
        assert_eq!(Request::parse("HELLO"), Err(ProtocolError::UnknownCommand));
        assert_eq!(Request::parse(""), Err(ProtocolError::UnknownCommand));
        assert_eq!(Request::parse("SUBMIT"), Err(ProtocolError::UnknownCommand));
    }

    #[test]
    fn test_request_encode() {
        let submit = Request::Submit {
            name: "Alice".into(),
            score: 500,
        };
        assert_eq!(submit.encode(), "SUBMIT|Alice|500");
        assert_eq!(Request::GetLeaderboard.encode(), "GET_LEADERBOARD");
    }

    #[test]
    fn test_response_display() {
        let ok = Response::Submitted {
            name: "Alice".into(),
            score: 500,
        };
        assert_eq!(ok.to_string(), "OK|Score submitted: Alice - 500");
        assert_eq!(
            Response::Error(ProtocolError::InvalidSubmit).to_string(),
            "ERROR|Invalid SUBMIT format"
        );
        assert_eq!(
            Response::Error(ProtocolError::UnknownCommand).to_string(),
            "ERROR|Unknown command"
        );
        assert_eq!(Response::Leaderboard(vec![]).to_string(), "LEADERBOARD");
        let board = Response::Leaderboard(vec![RemoteEntry::new("A", 3), RemoteEntry::new("B", 1)]);
        assert_eq!(board.to_string(), "LEADERBOARD|A:3|B:1");
    }

    #[test]
    fn test_parse_leaderboard_requires_marker() {
        assert_eq!(parse_leaderboard("ERROR|Unknown command"), None);
        assert_eq!(parse_leaderboard(""), None);
        assert_eq!(parse_leaderboard("LEADERBOARD").map(|e| e.len()), Some(0));
    }

    #[test]
    fn test_parse_leaderboard_stops_at_first_bad_segment() {
        let parsed = parse_leaderboard("LEADERBOARD|A:10|B:x|C:5").unwrap();
        assert_eq!(parsed.as_slice(), &[RemoteEntry::new("A", 10)]);

        let parsed = parse_leaderboard("LEADERBOARD|A:10|:5").unwrap();
        assert_eq!(parsed.len(), 1);

        let parsed = parse_leaderboard("LEADERBOARD|A:10 junk|B:7").unwrap();
        assert_eq!(
            parsed.as_slice(),
            &[RemoteEntry::new("A", 10), RemoteEntry::new("B", 7)]
        );
    }

    #[test]
    fn test_parse_leaderboard_caps_at_ten() {
        let mut text = String::from(LEADERBOARD_MARKER);
        for i in 0..12 {
            text.push_str(&format!("|p{i}:{}", 100 - i));
        }
        let parsed = parse_leaderboard(&text).unwrap();
        assert_eq!(parsed.len(), 10);
        assert_eq!(parsed[9], RemoteEntry::new("p9", 91));
    }
}
