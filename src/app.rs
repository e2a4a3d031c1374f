use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

use crate::character::{Character, CharacterBook};
use crate::dialog_log::{DialogLog, LogEntry};
use crate::stats::{StatLedger, StatSet};
use crate::storage::{keys, KvStore, StorageError};

/// The whole application state. All mutation goes through the methods
/// here; nothing else touches the underlying collections.
#[derive(Debug, Default)]
pub struct App {
    characters: CharacterBook,
    stats: StatLedger,
    active: Option<String>,
    days_count: u32,
    log: DialogLog,
    /// Monotonic counter for request correlation. Not persisted.
    request_seq: u64,
}

fn load_key<T: DeserializeOwned + Default>(store: &dyn KvStore, key: &str) -> Result<T> {
    match store.get(key)? {
        Some(content) => {
            serde_json::from_str(&content).map_err(|e| anyhow!("corrupt state for '{}': {}", key, e))
        }
        None => Ok(T::default()),
    }
}

impl App {
    pub fn load(store: &dyn KvStore) -> Result<Self> {
        let characters: CharacterBook = load_key(store, keys::CHARACTERS)?;
        let stats: StatLedger = load_key(store, keys::CHARACTER_STATS)?;
        let active: Option<String> = load_key(store, keys::ACTIVE_CHARACTER)?;
        let days_count: u32 = load_key(store, keys::DAYS_COUNT)?;
        let mut log: DialogLog = load_key(store, keys::DIALOG_LOGS)?;
        log.enforce_capacity();

        // An active id pointing at a deleted character is stale data.
        let active = active.filter(|id| characters.get(id).is_some());

        Ok(App {
            characters,
            stats,
            active,
            days_count,
            log,
            request_seq: 0,
        })
    }

    /// Persist everything. On `QuotaExceeded` the in-memory state is
    /// untouched and remains authoritative for the session.
    pub fn save(&self, store: &mut dyn KvStore) -> Result<(), StorageError> {
        store.set(keys::CHARACTERS, &serde_json::to_string_pretty(&self.characters)?)?;
        store.set(keys::CHARACTER_STATS, &serde_json::to_string_pretty(&self.stats)?)?;
        store.set(keys::ACTIVE_CHARACTER, &serde_json::to_string(&self.active)?)?;
        store.set(keys::DAYS_COUNT, &self.days_count.to_string())?;
        store.set(keys::DIALOG_LOGS, &serde_json::to_string_pretty(&self.log)?)?;
        Ok(())
    }

    // --- characters ---

    pub fn characters(&self) -> &CharacterBook {
        &self.characters
    }

    pub fn add_character(&mut self, character: Character) {
        self.stats.ensure(&character.id);
        self.characters.add(character);
    }

    /// Edit a character in place. The id never changes, so stats stay
    /// linked across renames.
    pub fn update_character<F>(&mut self, id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut Character),
    {
        let character = self
            .characters
            .get_mut(id)
            .ok_or_else(|| anyhow!("no character with id {}", id))?;
        update(character);
        Ok(())
    }

    pub fn remove_character(&mut self, id: &str) -> Result<Character> {
        let removed = self
            .characters
            .remove(id)
            .ok_or_else(|| anyhow!("no character with id {}", id))?;
        self.stats.remove(id);
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        Ok(removed)
    }

    /// Make a character the active one. Counts as one "day": the
    /// counter tracks load events, not calendar days.
    pub fn select_character(&mut self, id: &str) -> Result<()> {
        if self.characters.get(id).is_none() {
            return Err(anyhow!("no character with id {}", id));
        }
        self.stats.ensure(id);
        self.active = Some(id.to_string());
        self.days_count += 1;
        Ok(())
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_character(&self) -> Option<&Character> {
        self.active.as_deref().and_then(|id| self.characters.get(id))
    }

    // --- stats ---

    pub fn stats_of(&self, id: &str) -> StatSet {
        self.stats.get(id)
    }

    pub fn set_stats(&mut self, id: &str, stats: StatSet) {
        self.stats.set(id, stats);
    }

    // --- request correlation ---

    pub fn next_request_seq(&mut self) -> u64 {
        self.request_seq += 1;
        self.request_seq
    }

    pub fn current_request_seq(&self) -> u64 {
        self.request_seq
    }

    // --- log / counters ---

    pub fn days_count(&self) -> u32 {
        self.days_count
    }

    pub fn log(&self) -> &DialogLog {
        &self.log
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }

    pub fn remove_log(&mut self, index: usize) -> Option<LogEntry> {
        self.log.remove(index)
    }
}
