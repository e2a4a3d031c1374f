use rand::seq::SliceRandom;

use crate::character::Character;
use crate::stats::{StatDelta, StatSet};

/// Fallback line when feeding an already full character.
pub const FEED_OVERFULL_FALLBACK: &str = "Ugh, I'm so full... but thank you.";
pub const FEED_FALLBACK: &str = "Yummy! Thank you!";
pub const SLEEP_GREETING_FALLBACK: &str = "Good night...";
pub const WAKE_HUNGRY_FALLBACK: &str = "I'm hungry... please feed me.";
pub const WAKE_RESTED_FALLBACK: &str = "I slept great! I feel good!";
pub const STATS_RESET_FALLBACK: &str = "My stats have been reset!";

/// Everything a user can do to the active character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Feed,
    Play,
    /// Gift chosen at random from the character's gift pool.
    Gift,
    /// Gift named by the user.
    CustomGift(String),
    Sleep,
    StatsReset,
    Click,
}

impl Action {
    pub fn label(&self) -> String {
        match self {
            Action::Feed => "Feed".to_string(),
            Action::Play => "Play".to_string(),
            Action::Gift => "Gift".to_string(),
            Action::CustomGift(name) => format!("Gift ({})", name),
            Action::Sleep => "Sleep".to_string(),
            Action::StatsReset => "System".to_string(),
            Action::Click => "Click".to_string(),
        }
    }
}

/// Result of applying an action's stat rules: the log label, the
/// situation text fed to the prompt builder, and the deterministic
/// fallback line used when the generator is unavailable.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub label: String,
    pub context: String,
    pub detail: Option<String>,
    pub fallback: String,
}

fn random_line(pool: &[String]) -> String {
    let mut rng = rand::thread_rng();
    pool.choose(&mut rng)
        .cloned()
        .unwrap_or_else(|| "...".to_string())
}

/// Apply a non-sleep action to the stats and describe what happened.
///
/// Stat deltas are applied before the fallback is chosen, so fallbacks
/// that branch on a stat (feed's overfull variant) see the post-delta
/// value. Sleep goes through `sleep_greeting` / `apply_sleep_wake`
/// instead; its stat change is deferred behind the presentation delay.
pub fn apply(action: &Action, character: &Character, stats: &mut StatSet) -> ActionOutcome {
    match action {
        Action::Feed => {
            stats.apply(StatDelta { hunger: 20, happiness: 5, ..Default::default() });
            let fallback = if stats.hunger > 80 {
                FEED_OVERFULL_FALLBACK.to_string()
            } else {
                FEED_FALLBACK.to_string()
            };
            ActionOutcome {
                label: action.label(),
                context: "The user just fed them a meal.".to_string(),
                detail: None,
                fallback,
            }
        }
        Action::Play => {
            stats.apply(StatDelta { hunger: -5, happiness: 20, affection: 10 });
            ActionOutcome {
                label: action.label(),
                context: "The user just played with them.".to_string(),
                detail: None,
                fallback: random_line(&character.dialog_pool()),
            }
        }
        Action::Gift => {
            stats.apply(StatDelta { happiness: 15, affection: 20, ..Default::default() });
            let gift = random_line(&character.gift_pool());
            ActionOutcome {
                label: format!("Gift ({})", gift),
                context: "The user gave them a gift.".to_string(),
                detail: Some(format!(
                    "They received '{}', something they are sure to like.",
                    gift
                )),
                fallback: format!("{}! I love it!", gift),
            }
        }
        Action::CustomGift(name) => {
            stats.apply(StatDelta { happiness: 10, affection: 15, ..Default::default() });
            ActionOutcome {
                label: action.label(),
                context: "The user gave them a gift.".to_string(),
                detail: Some(format!("They received '{}' from the user.", name)),
                fallback: format!("{}! Thank you so much!", name),
            }
        }
        Action::StatsReset => {
            stats.reset();
            ActionOutcome {
                label: action.label(),
                context: "Their stats were reset to their default state.".to_string(),
                detail: None,
                fallback: STATS_RESET_FALLBACK.to_string(),
            }
        }
        Action::Click => ActionOutcome {
            label: action.label(),
            context: "The user clicked on them.".to_string(),
            detail: None,
            fallback: random_line(&character.dialog_pool()),
        },
        Action::Sleep => sleep_greeting(),
    }
}

/// First phase of sleep: no stat change yet, just the goodnight line.
pub fn sleep_greeting() -> ActionOutcome {
    ActionOutcome {
        label: "Sleep".to_string(),
        context: "It's time to go to bed.".to_string(),
        detail: Some("Wish them a good night.".to_string()),
        fallback: SLEEP_GREETING_FALLBACK.to_string(),
    }
}

/// Second phase of sleep, after the presentation delay: apply the hunger
/// drop first, then branch on the post-delta value.
pub fn apply_sleep_wake(stats: &mut StatSet) -> ActionOutcome {
    stats.apply(StatDelta { hunger: -30, ..Default::default() });

    let (detail, fallback) = if stats.hunger < 20 {
        stats.apply(StatDelta { happiness: -25, affection: -15, ..Default::default() });
        (
            "They woke up in the morning feeling very hungry.",
            WAKE_HUNGRY_FALLBACK,
        )
    } else {
        stats.apply(StatDelta { happiness: 15, affection: 10, ..Default::default() });
        (
            "They woke up in the morning after a good night's sleep.",
            WAKE_RESTED_FALLBACK,
        )
    };

    ActionOutcome {
        label: "Sleep (woke up)".to_string(),
        context: "They just woke up in the morning.".to_string(),
        detail: Some(detail.to_string()),
        fallback: fallback.to_string(),
    }
}
