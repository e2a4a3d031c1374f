use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;
pub const STAT_DEFAULT: i32 = 50;

/// The three mood dimensions of a character.
///
/// Every value stays inside [0, 100] after any mutation. Changes are
/// delta-based; the only absolute write is `reset`, which puts all
/// three back to 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSet {
    pub affection: i32,
    pub hunger: i32,
    pub happiness: i32,
}

impl Default for StatSet {
    fn default() -> Self {
        StatSet {
            affection: STAT_DEFAULT,
            hunger: STAT_DEFAULT,
            happiness: STAT_DEFAULT,
        }
    }
}

/// A delta to apply to a StatSet. Zero fields leave the stat untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatDelta {
    pub affection: i32,
    pub hunger: i32,
    pub happiness: i32,
}

fn clamp(value: i32) -> i32 {
    value.clamp(STAT_MIN, STAT_MAX)
}

impl StatSet {
    pub fn apply(&mut self, delta: StatDelta) {
        self.affection = clamp(self.affection + delta.affection);
        self.hunger = clamp(self.hunger + delta.hunger);
        self.happiness = clamp(self.happiness + delta.happiness);
    }

    pub fn reset(&mut self) {
        *self = StatSet::default();
    }

    pub fn affection_band(&self) -> AffectionBand {
        if self.affection < 30 {
            AffectionBand::Low
        } else if self.affection < 70 {
            AffectionBand::Mid
        } else {
            AffectionBand::High
        }
    }

    pub fn hunger_band(&self) -> HungerBand {
        if self.hunger < 30 {
            HungerBand::Hungry
        } else if self.hunger > 80 {
            HungerBand::Full
        } else {
            HungerBand::Normal
        }
    }

    pub fn happiness_band(&self) -> HappinessBand {
        if self.happiness < 30 {
            HappinessBand::Gloomy
        } else if self.happiness > 70 {
            HappinessBand::Happy
        } else {
            HappinessBand::Normal
        }
    }
}

/// Qualitative label for a stat, used in prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectionBand {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HungerBand {
    Hungry,
    Normal,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HappinessBand {
    Gloomy,
    Normal,
    Happy,
}

impl std::fmt::Display for AffectionBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AffectionBand::Low => write!(f, "low"),
            AffectionBand::Mid => write!(f, "mid"),
            AffectionBand::High => write!(f, "high"),
        }
    }
}

impl std::fmt::Display for HungerBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HungerBand::Hungry => write!(f, "hungry"),
            HungerBand::Normal => write!(f, "normal"),
            HungerBand::Full => write!(f, "full"),
        }
    }
}

impl std::fmt::Display for HappinessBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HappinessBand::Gloomy => write!(f, "gloomy"),
            HappinessBand::Normal => write!(f, "normal"),
            HappinessBand::Happy => write!(f, "happy"),
        }
    }
}

/// Per-character stat storage, keyed by the character's stable id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatLedger {
    stats: HashMap<String, StatSet>,
}

impl StatLedger {
    /// Current stats for a character, default 50/50/50 when unknown.
    pub fn get(&self, character_id: &str) -> StatSet {
        self.stats.get(character_id).copied().unwrap_or_default()
    }

    /// Ensure an entry exists and return it.
    pub fn ensure(&mut self, character_id: &str) -> StatSet {
        *self
            .stats
            .entry(character_id.to_string())
            .or_insert_with(StatSet::default)
    }

    pub fn set(&mut self, character_id: &str, stats: StatSet) {
        self.stats.insert(character_id.to_string(), stats);
    }

    pub fn apply(&mut self, character_id: &str, delta: StatDelta) -> StatSet {
        let entry = self
            .stats
            .entry(character_id.to_string())
            .or_insert_with(StatSet::default);
        entry.apply(delta);
        *entry
    }

    pub fn reset(&mut self, character_id: &str) -> StatSet {
        let entry = self
            .stats
            .entry(character_id.to_string())
            .or_insert_with(StatSet::default);
        entry.reset();
        *entry
    }

    pub fn remove(&mut self, character_id: &str) {
        self.stats.remove(character_id);
    }
}
