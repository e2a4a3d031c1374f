use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub action: String,
    pub character: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(
        text: impl Into<String>,
        action: impl Into<String>,
        character: impl Into<String>,
    ) -> Self {
        LogEntry {
            text: text.into(),
            action: action.into(),
            character: character.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Newest-first interaction log, capped at `LOG_CAPACITY` entries.
/// The oldest entry is evicted on overflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogLog {
    entries: VecDeque<LogEntry>,
}

impl DialogLog {
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_back();
        }
    }

    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<LogEntry> {
        self.entries.remove(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-apply the capacity bound, newest entries kept. Persisted data
    /// may predate the current capacity.
    pub fn enforce_capacity(&mut self) {
        self.entries.truncate(LOG_CAPACITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> LogEntry {
        LogEntry::new(format!("line {}", n), "Click", "Mina")
    }

    #[test]
    fn test_newest_first() {
        let mut log = DialogLog::default();
        log.push(entry(1));
        log.push(entry(2));

        assert_eq!(log.get(0).unwrap().text, "line 2");
        assert_eq!(log.get(1).unwrap().text, "line 1");
    }

    #[test]
    fn test_eleventh_entry_evicts_oldest() {
        let mut log = DialogLog::default();
        for n in 1..=11 {
            log.push(entry(n));
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.get(0).unwrap().text, "line 11");
        assert_eq!(log.get(9).unwrap().text, "line 2");
        assert!(log.get(10).is_none());
    }

    #[test]
    fn test_remove_by_index() {
        let mut log = DialogLog::default();
        for n in 1..=3 {
            log.push(entry(n));
        }

        let removed = log.remove(1).unwrap();
        assert_eq!(removed.text, "line 2");
        assert_eq!(log.len(), 2);
        assert!(log.remove(5).is_none());
    }

    #[test]
    fn test_enforce_capacity_after_load() {
        let mut log = DialogLog::default();
        for n in 1..=8 {
            log.push(entry(n));
        }
        // Simulate an oversized persisted log.
        for n in 9..=14 {
            log.entries.push_back(entry(n));
        }
        log.enforce_capacity();
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.get(0).unwrap().text, "line 8");
    }
}
