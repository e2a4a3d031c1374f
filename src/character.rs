use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Built-in gift pool used when a character has no custom gifts configured.
pub const DEFAULT_GIFTS: [&str; 5] = [
    "a cute plush doll",
    "tasty chocolate",
    "a pretty flower",
    "a special book",
    "stylish clothes",
];

/// Built-in dialog lines used as fallbacks when no custom lines exist.
pub const DEFAULT_DIALOGS: [&str; 5] = [
    "The weather is lovely today!",
    "Let's play together!",
    "What are you up to?",
    "I'm in a great mood!",
    "I'm so bored~",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Existing,
    Original,
}

impl std::fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterKind::Existing => write!(f, "existing"),
            CharacterKind::Original => write!(f, "original"),
        }
    }
}

/// A virtual-pet character. The `id` is a stable generated identifier;
/// `name` is a display attribute and may change freely without touching
/// anything keyed by `id` (stats, the active selection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub kind: CharacterKind,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub lore: String,
    #[serde(default)]
    pub speech_style: String,
    #[serde(default)]
    pub user_nickname: String,
    /// Comma-separated fallback dialog lines.
    #[serde(default)]
    pub custom_dialogs: String,
    /// Comma-separated gift names.
    #[serde(default)]
    pub custom_gifts: String,
    pub created_at: DateTime<Utc>,
}

impl Character {
    pub fn new(name: impl Into<String>, kind: CharacterKind) -> Self {
        Character {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            setting: String::new(),
            genre: String::new(),
            tone: String::new(),
            personality: String::new(),
            lore: String::new(),
            speech_style: String::new(),
            user_nickname: String::new(),
            custom_dialogs: String::new(),
            custom_gifts: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Effective gift list: the configured custom gifts, or the built-in
    /// defaults when nothing usable is configured.
    pub fn gift_pool(&self) -> Vec<String> {
        let custom = parse_list(&self.custom_gifts);
        if custom.is_empty() {
            DEFAULT_GIFTS.iter().map(|g| g.to_string()).collect()
        } else {
            custom
        }
    }

    /// Effective fallback dialog pool, same precedence as `gift_pool`.
    pub fn dialog_pool(&self) -> Vec<String> {
        let custom = parse_list(&self.custom_dialogs);
        if custom.is_empty() {
            DEFAULT_DIALOGS.iter().map(|d| d.to_string()).collect()
        } else {
            custom
        }
    }
}

/// Split a comma-separated list, trimming tokens and discarding empties.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// The saved character roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterBook {
    characters: Vec<Character>,
}

impl CharacterBook {
    pub fn add(&mut self, character: Character) {
        self.characters.push(character);
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Character> {
        let index = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(index))
    }

    /// Resolve a display name to a character. Names are not unique;
    /// an ambiguous name returns every match so the caller can report it.
    pub fn find_by_name(&self, name: &str) -> Vec<&Character> {
        self.characters.iter().filter(|c| c.name == name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_discards_empty_tokens() {
        assert_eq!(parse_list("  , ,apple"), vec!["apple"]);
        assert_eq!(parse_list(""), Vec::<String>::new());
        assert_eq!(parse_list("   "), Vec::<String>::new());
        assert_eq!(parse_list("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_gift_pool_falls_back_to_defaults() {
        let mut character = Character::new("Mina", CharacterKind::Original);
        assert_eq!(character.gift_pool().len(), DEFAULT_GIFTS.len());

        character.custom_gifts = "  , ,apple".to_string();
        assert_eq!(character.gift_pool(), vec!["apple"]);

        character.custom_gifts = " , ,, ".to_string();
        assert_eq!(character.gift_pool().len(), DEFAULT_GIFTS.len());
    }

    #[test]
    fn test_rename_keeps_id() {
        let mut book = CharacterBook::default();
        let character = Character::new("Mina", CharacterKind::Original);
        let id = character.id.clone();
        book.add(character);

        book.get_mut(&id).unwrap().name = "Nari".to_string();
        assert_eq!(book.get(&id).unwrap().name, "Nari");
        assert!(book.find_by_name("Mina").is_empty());
        assert_eq!(book.find_by_name("Nari").len(), 1);
    }

    #[test]
    fn test_duplicate_names_are_distinct_characters() {
        let mut book = CharacterBook::default();
        book.add(Character::new("Mina", CharacterKind::Original));
        book.add(Character::new("Mina", CharacterKind::Existing));

        let matches = book.find_by_name("Mina");
        assert_eq!(matches.len(), 2);
        assert_ne!(matches[0].id, matches[1].id);
    }
}
