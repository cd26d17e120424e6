//! Bounded per-day session history kept on the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of days retained.
pub const HISTORY_LIMIT: usize = 5;

/// Sessions started on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub sessions: u32,
}

/// Day entries in arrival order, at most [`HISTORY_LIMIT`] long, one entry
/// per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct SessionHistory(Vec<HistoryEntry>);

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from stored entries, replaying them through
    /// [`SessionHistory::record`] so the bounds hold.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.record(entry.date, entry.sessions);
        }
        history
    }

    /// Replace any entry for `date`, append the new one, evict the oldest
    /// entries while over the limit.
    pub fn record(&mut self, date: NaiveDate, sessions: u32) {
        self.0.retain(|entry| entry.date != date);
        self.0.push(HistoryEntry { date, sessions });
        while self.0.len() > HISTORY_LIMIT {
            self.0.remove(0);
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<u32> {
        self.0
            .iter()
            .find(|entry| entry.date == date)
            .map(|entry| entry.sessions)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<HistoryEntry>> for SessionHistory {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<SessionHistory> for Vec<HistoryEntry> {
    fn from(history: SessionHistory) -> Self {
        history.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn repeated_date_overwrites() {
        let mut history = SessionHistory::new();
        history.record(day(1), 1);
        history.record(day(1), 2);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(day(1)), Some(2));
    }

    #[test]
    fn evicts_oldest_arrival_first() {
        let mut history = SessionHistory::new();
        for d in 1..=7 {
            history.record(day(d), d);
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        let dates: Vec<_> = history.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(3), day(4), day(5), day(6), day(7)]);
    }

    #[test]
    fn rerecorded_date_moves_to_back() {
        let mut history = SessionHistory::new();
        history.record(day(2), 1);
        history.record(day(1), 1);
        history.record(day(2), 2);
        let dates: Vec<_> = history.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(1), day(2)]);
    }

    #[test]
    fn deserializing_oversized_history_repairs_it() {
        let raw = serde_json::json!([
            {"date": "2025-03-01", "sessions": 1},
            {"date": "2025-03-02", "sessions": 1},
            {"date": "2025-03-02", "sessions": 2},
            {"date": "2025-03-03", "sessions": 1},
            {"date": "2025-03-04", "sessions": 1},
            {"date": "2025-03-05", "sessions": 1},
            {"date": "2025-03-06", "sessions": 1}
        ]);
        let history: SessionHistory = serde_json::from_value(raw).unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.get(day(1)), None);
        assert_eq!(history.get(day(2)), Some(2));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut history = SessionHistory::new();
        history.record(day(9), 3);
        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value, serde_json::json!([{"date": "2025-03-09", "sessions": 3}]));
    }
}
