//! Server-side score table.
//!
//! Holds at most 100 distinct names in insertion order. A known name only
//! moves up: its score is replaced when the new one is strictly greater.
//! Once the table is full, new names are dropped.

use std::net::IpAddr;

use serde::Serialize;

use crate::protocol::RemoteEntry;
use crate::types::{LEADERBOARD_CAPACITY, SERVER_TABLE_CAPACITY};
use crate::Score;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerEntry {
    pub name: String,
    pub score: Score,
    /// Unix seconds of the last accepted submission.
    pub timestamp: u64,
    /// Address the last accepted submission came from.
    pub origin: IpAddr,
}

/// What [`ScoreTable::submit`] did with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Inserted,
    Improved,
    /// Known name, score not strictly greater.
    Kept,
    /// New name, table full.
    Dropped,
}

#[derive(Debug, Clone)]
pub struct ScoreTable {
    entries: Vec<ServerEntry>,
    capacity: usize,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::with_capacity(SERVER_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn submit(&mut self, name: &str, score: Score, origin: IpAddr, now: u64) -> SubmitOutcome {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            if score > entry.score {
                entry.score = score;
                entry.timestamp = now;
                entry.origin = origin;
                return SubmitOutcome::Improved;
            }
            return SubmitOutcome::Kept;
        }

        if self.entries.len() >= self.capacity {
            return SubmitOutcome::Dropped;
        }

        self.entries.push(ServerEntry {
            name: name.to_string(),
            score,
            timestamp: now,
            origin,
        });
        SubmitOutcome::Inserted
    }

    /// Sort the table by descending score and return the top 10.
    ///
    /// The sort is stable and applied in place, so tied entries keep the
    /// order they had before this call.
    pub fn top(&mut self) -> Vec<RemoteEntry> {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries
            .iter()
            .take(LEADERBOARD_CAPACITY)
            .map(|e| RemoteEntry::new(e.name.clone(), e.score))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ServerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[ServerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_update_only_when_strictly_greater() {
        let mut table = ScoreTable::new();
        assert_eq!(table.submit("Bob", 300, HOST, 1), SubmitOutcome::Inserted);
        assert_eq!(table.submit("Bob", 250, OTHER, 2), SubmitOutcome::Kept);
        assert_eq!(table.submit("Bob", 300, OTHER, 3), SubmitOutcome::Kept);

        let bob = table.get("Bob").unwrap();
        assert_eq!((bob.score, bob.timestamp, bob.origin), (300, 1, HOST));

        assert_eq!(table.submit("Bob", 301, OTHER, 4), SubmitOutcome::Improved);
        let bob = table.get("Bob").unwrap();
        assert_eq!((bob.score, bob.timestamp, bob.origin), (301, 4, OTHER));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_full_table_drops_new_names_but_updates_known() {
        let mut table = ScoreTable::new();
        for i in 0..SERVER_TABLE_CAPACITY {
            assert_eq!(
                table.submit(&format!("p{i}"), i as Score, HOST, 0),
                SubmitOutcome::Inserted
            );
        }
        assert_eq!(table.submit("late", 1_000_000, HOST, 0), SubmitOutcome::Dropped);
        assert_eq!(table.len(), SERVER_TABLE_CAPACITY);
        assert!(table.get("late").is_none());

        assert_eq!(table.submit("p0", 5_000, HOST, 0), SubmitOutcome::Improved);
        assert_eq!(table.top()[0], RemoteEntry::new("p0", 5_000));
    }

    #[test]
    fn test_top_is_stable_descending_and_capped() {
        let mut table = ScoreTable::new();
        table.submit("A", 100, HOST, 0);
        table.submit("B", 50, HOST, 0);
        table.submit("C", 100, HOST, 0);
        let names: Vec<_> = table.top().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["A", "C", "B"]);

        // In-place sort: B's later tie lands after the previous A, C order.
        table.submit("B", 100, HOST, 0);
        let names: Vec<_> = table.top().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["A", "C", "B"]);

        for i in 0..20 {
            table.submit(&format!("x{i}"), i, HOST, 0);
        }
        assert_eq!(table.top().len(), LEADERBOARD_CAPACITY);
    }

    #[test]
    fn test_json_dump_lists_entries() {
        let mut table = ScoreTable::new();
        table.submit("Alice", 500, HOST, 7);
        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["name"], "Alice");
        assert_eq!(json[0]["score"], 500);
        assert_eq!(json[0]["origin"], "127.0.0.1");
    }
}
