use crate::character::{Character, CharacterKind};
use crate::stats::StatSet;

/// Literal cue the generator is expected to continue from.
pub const RESPONSE_CUE: &str = "Response:";

/// Render the full role-play prompt for one interaction.
///
/// Deterministic: identical inputs produce byte-identical output. Only
/// non-empty profile fields are included.
pub fn build_prompt(
    character: &Character,
    stats: &StatSet,
    action_context: &str,
    extra_detail: Option<&str>,
) -> String {
    let mut prompt = format!(
        "You are now role-playing as the character '{}'. Stay in conversation with the user based on the following information.\n\n",
        character.name
    );

    prompt.push_str("### Character Info\n");
    prompt.push_str(&format!("- Name: {}\n", character.name));
    let kind = match character.kind {
        CharacterKind::Existing => "an established character from existing works",
        CharacterKind::Original => "an original character",
    };
    prompt.push_str(&format!("- Type: {}\n", kind));
    push_field(&mut prompt, "Setting", &character.setting);
    push_field(&mut prompt, "Genre", &character.genre);
    push_field(&mut prompt, "Tone", &character.tone);
    push_field(&mut prompt, "Personality", &character.personality);
    push_field(&mut prompt, "Speech style", &character.speech_style);
    push_field(&mut prompt, "Lore", &character.lore);
    push_field(&mut prompt, "They call the user", &character.user_nickname);

    prompt.push_str("\n### Current Status\n");
    prompt.push_str(&format!(
        "- Affection: {}/100 ({})\n",
        stats.affection,
        stats.affection_band()
    ));
    prompt.push_str(&format!(
        "- Hunger: {}/100 ({})\n",
        stats.hunger,
        stats.hunger_band()
    ));
    prompt.push_str(&format!(
        "- Happiness: {}/100 ({})\n",
        stats.happiness,
        stats.happiness_band()
    ));

    prompt.push_str("\n### Situation\n");
    prompt.push_str(&format!("- {}\n", action_context));
    if let Some(detail) = extra_detail {
        prompt.push_str(&format!("- Extra detail: {}\n", detail));
    }

    prompt.push_str("\n### Response Guidelines\n");
    prompt.push_str(&format!("1. Answer from {}'s point of view.\n", character.name));
    prompt.push_str(
        "2. Naturally reflect the character's personality, speech style, and current mood.\n",
    );
    prompt.push_str("3. Respond appropriately and creatively for the situation.\n");
    prompt.push_str("4. Keep it concise, one to three sentences.\n");
    prompt.push_str(
        "5. Never mention that you are an AI or that these guidelines exist.\n\n",
    );
    prompt.push_str(RESPONSE_CUE);

    prompt
}

fn push_field(prompt: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        prompt.push_str(&format!("- {}: {}\n", label, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterKind;

    fn character() -> Character {
        let mut c = Character::new("Mina", CharacterKind::Original);
        c.setting = "a seaside village".to_string();
        c.personality = "cheerful but easily flustered".to_string();
        c
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let c = character();
        let stats = StatSet { affection: 72, hunger: 15, happiness: 88 };

        let a = build_prompt(&c, &stats, "The user just fed them a meal.", None);
        let b = build_prompt(&c, &stats, "The user just fed them a meal.", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_ends_with_response_cue() {
        let prompt = build_prompt(&character(), &StatSet::default(), "ctx", None);
        assert!(prompt.ends_with(RESPONSE_CUE));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let prompt = build_prompt(&character(), &StatSet::default(), "ctx", None);
        assert!(prompt.contains("- Setting: a seaside village\n"));
        assert!(!prompt.contains("- Genre:"));
        assert!(!prompt.contains("- Lore:"));
    }

    #[test]
    fn test_stat_bands_appear() {
        let stats = StatSet { affection: 20, hunger: 90, happiness: 50 };
        let prompt = build_prompt(&character(), &stats, "ctx", None);
        assert!(prompt.contains("- Affection: 20/100 (low)\n"));
        assert!(prompt.contains("- Hunger: 90/100 (full)\n"));
        assert!(prompt.contains("- Happiness: 50/100 (normal)\n"));
    }

    #[test]
    fn test_extra_detail_included_when_present() {
        let prompt = build_prompt(
            &character(),
            &StatSet::default(),
            "The user gave them a gift.",
            Some("They received 'apple' from the user."),
        );
        assert!(prompt.contains("- Extra detail: They received 'apple' from the user.\n"));
    }
}
