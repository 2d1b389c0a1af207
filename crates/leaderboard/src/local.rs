//! Local high-score list, persisted to a flat text file.
//!
//! File format, one entry per line, at most 10 lines:
//!
//! ```text
//! <name> <score> <unix-timestamp>
//! ```
//!
//! Names may contain spaces, so lines are split from the right. The file is
//! rewritten wholesale after every change.

use std::fs;
use std::io;
use std::path::Path;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::types::LEADERBOARD_CAPACITY;
use crate::Score;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEntry {
    pub name: String,
    pub score: Score,
    pub timestamp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum LocalLeaderboardError {
    #[error("failed to read leaderboard file: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write leaderboard file: {0}")]
    Write(#[source] io::Error),
}

/// Up to 10 entries, sorted by non-increasing score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalLeaderboard {
    entries: ArrayVec<LocalEntry, LEADERBOARD_CAPACITY>,
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score, evicting the lowest entry when full.
    ///
    /// Scores `<= 0` are ignored. The entry goes in front of the first entry
    /// with a strictly lower score, so equal scores keep arrival order.
    /// Returns the position taken, or `None` if the entry did not make it.
    pub fn insert(&mut self, name: &str, score: Score, timestamp: u64) -> Option<usize> {
        if score <= 0 {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        if pos >= LEADERBOARD_CAPACITY {
            return None;
        }
        if self.entries.is_full() {
            self.entries.pop();
        }
        self.entries.insert(
            pos,
            LocalEntry {
                name: name.to_string(),
                score,
                timestamp,
            },
        );
        Some(pos)
    }

    pub fn entries(&self) -> &[LocalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from `path`. A missing file is an empty list; reading stops at
    /// the first malformed line or after 10 entries.
    pub fn load(path: &Path) -> Result<Self, LocalLeaderboardError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(LocalLeaderboardError::Read(e)),
        };
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map_while(parse_line)
            .take(LEADERBOARD_CAPACITY)
            .collect();
        Self { entries }
    }

    /// Overwrite `path` with the current entries.
    pub fn save(&self, path: &Path) -> Result<(), LocalLeaderboardError> {
        fs::write(path, self.render()).map_err(LocalLeaderboardError::Write)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            out.push_str(&format!("{} {} {}\n", e.name, e.score, e.timestamp));
        }
        out
    }
}

fn parse_line(line: &str) -> Option<LocalEntry> {
    let mut fields = line.trim_end().rsplitn(3, ' ');
    let timestamp = fields.next()?.parse().ok()?;
    let score = fields.next()?.parse().ok()?;
    let name = fields.next()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(LocalEntry {
        name: name.to_string(),
        score,
        timestamp,
    })
}
