use std::time::Duration;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::actions::{self, Action, ActionOutcome, STATS_RESET_FALLBACK};
use crate::app::App;
use crate::character::Character;
use crate::dialog_log::LogEntry;
use crate::prompt::build_prompt;
use crate::provider::TextGenerator;
use crate::resolver::{self, Resolved, ResponseSource};
use crate::stats::StatSet;
use crate::storage::{KvStore, StorageError};

/// Presentation delay between the goodnight message and the wake-up
/// phase of the sleep action.
pub const SLEEP_DELAY: Duration = Duration::from_millis(1500);

/// Correlates an external text request with the character it was made
/// for. A completion whose token no longer matches the active character
/// (or a newer request) is discarded instead of applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub character_id: String,
    pub seq: u64,
}

/// One completed interaction, ready for display.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub text: String,
    pub source: ResponseSource,
    pub label: String,
    pub stats: StatSet,
    /// Goodnight line shown before the wake-up message (sleep only).
    pub greeting: Option<Resolved>,
}

/// In-flight sleep: the greeting is out, stats are not yet touched.
#[derive(Debug)]
pub struct SleepPlan {
    token: RequestToken,
    greeting: Resolved,
}

impl SleepPlan {
    pub fn greeting(&self) -> &Resolved {
        &self.greeting
    }
}

/// Drives a user action end to end: stat mutation and persistence
/// happen synchronously, then the single external text request, then
/// resolution and logging. The await on the generator is the only
/// suspension point.
pub struct Session<'a, G: TextGenerator> {
    app: &'a mut App,
    store: &'a mut dyn KvStore,
    generator: &'a G,
    sleep_delay: Duration,
}

impl<'a, G: TextGenerator> Session<'a, G> {
    pub fn new(app: &'a mut App, store: &'a mut dyn KvStore, generator: &'a G) -> Self {
        Session {
            app,
            store,
            generator,
            sleep_delay: SLEEP_DELAY,
        }
    }

    pub fn with_sleep_delay(mut self, delay: Duration) -> Self {
        self.sleep_delay = delay;
        self
    }

    fn active_character(&self) -> Result<Character> {
        match self.app.active_character() {
            Some(character) => Ok(character.clone()),
            None => bail!("no character is selected; run `aipet character select` first"),
        }
    }

    fn issue_token(&mut self, character_id: &str) -> RequestToken {
        RequestToken {
            character_id: character_id.to_string(),
            seq: self.app.next_request_seq(),
        }
    }

    fn accepts(&self, token: &RequestToken) -> bool {
        self.app.active_id() == Some(token.character_id.as_str())
            && self.app.current_request_seq() == token.seq
    }

    /// Save state; a full store is a warning, not a failure. The
    /// in-memory state stays authoritative for the session.
    fn persist(&mut self) -> Result<()> {
        match self.app.save(self.store) {
            Ok(()) => Ok(()),
            Err(StorageError::QuotaExceeded) => {
                eprintln!(
                    "{}",
                    "warning: storage is full; changes are kept in memory only. Free some space to keep them."
                        .yellow()
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `None` when the completion was discarded because the
    /// active character changed while the request was in flight.
    pub async fn perform(&mut self, action: Action) -> Result<Option<Interaction>> {
        let character = self.active_character()?;

        if let Action::CustomGift(name) = &action {
            if name.trim().is_empty() {
                bail!("please enter a gift name");
            }
        }

        if action == Action::Sleep {
            let plan = self.sleep_begin().await?;
            tokio::time::sleep(self.sleep_delay).await;
            return self.sleep_finish(plan).await;
        }

        let mut stats = self.app.stats_of(&character.id);
        let outcome = actions::apply(&action, &character, &mut stats);
        self.app.set_stats(&character.id, stats);
        self.persist()?;

        // Stat reset is a local affair; no dialogue request is made.
        if action == Action::StatsReset {
            self.app.push_log(LogEntry::new("Stats reset", &outcome.label, &character.name));
            self.persist()?;
            return Ok(Some(Interaction {
                text: STATS_RESET_FALLBACK.to_string(),
                source: ResponseSource::Fallback,
                label: outcome.label,
                stats,
                greeting: None,
            }));
        }

        let token = self.issue_token(&character.id);
        let resolved = self.request_text(&character, &stats, &outcome).await;
        if !self.accepts(&token) {
            return Ok(None);
        }

        self.log_interaction(&character, &outcome, &resolved)?;
        Ok(Some(Interaction {
            text: resolved.text,
            source: resolved.source,
            label: outcome.label,
            stats,
            greeting: None,
        }))
    }

    /// First sleep phase: resolve the goodnight line. No stat change.
    pub async fn sleep_begin(&mut self) -> Result<SleepPlan> {
        let character = self.active_character()?;
        let outcome = actions::sleep_greeting();
        let stats = self.app.stats_of(&character.id);
        let token = self.issue_token(&character.id);
        let greeting = self.request_text(&character, &stats, &outcome).await;
        Ok(SleepPlan { token, greeting })
    }

    /// Second sleep phase: apply the stat changes and fetch the wake-up
    /// line. Discarded entirely when the character changed in between.
    pub async fn sleep_finish(&mut self, plan: SleepPlan) -> Result<Option<Interaction>> {
        if !self.accepts(&plan.token) {
            return Ok(None);
        }
        let character = self.active_character()?;

        let mut stats = self.app.stats_of(&character.id);
        let outcome = actions::apply_sleep_wake(&mut stats);
        self.app.set_stats(&character.id, stats);
        self.persist()?;

        let token = self.issue_token(&character.id);
        let resolved = self.request_text(&character, &stats, &outcome).await;
        if !self.accepts(&token) {
            return Ok(None);
        }

        // Only the wake-up message makes it into the log.
        self.log_interaction(&character, &outcome, &resolved)?;
        Ok(Some(Interaction {
            text: resolved.text,
            source: resolved.source,
            label: outcome.label,
            stats,
            greeting: Some(plan.greeting),
        }))
    }

    /// Greeting emitted when a character is loaded.
    pub async fn greet(&mut self) -> Result<Option<Interaction>> {
        let character = self.active_character()?;
        let outcome = ActionOutcome {
            label: "Greeting".to_string(),
            context: "Meeting the user for the first time today.".to_string(),
            detail: Some("Greet them in a friendly way.".to_string()),
            fallback: format!("Hello! I'm {}!", character.name),
        };

        let stats = self.app.stats_of(&character.id);
        let token = self.issue_token(&character.id);
        let resolved = self.request_text(&character, &stats, &outcome).await;
        if !self.accepts(&token) {
            return Ok(None);
        }

        self.log_interaction(&character, &outcome, &resolved)?;
        Ok(Some(Interaction {
            text: resolved.text,
            source: resolved.source,
            label: outcome.label,
            stats,
            greeting: None,
        }))
    }

    async fn request_text(
        &self,
        character: &Character,
        stats: &StatSet,
        outcome: &ActionOutcome,
    ) -> Resolved {
        let prompt = build_prompt(character, stats, &outcome.context, outcome.detail.as_deref());
        resolver::resolve(self.generator, &prompt, &outcome.fallback).await
    }

    fn log_interaction(
        &mut self,
        character: &Character,
        outcome: &ActionOutcome,
        resolved: &Resolved,
    ) -> Result<()> {
        self.app
            .push_log(LogEntry::new(&resolved.text, &outcome.label, &character.name));
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{SLEEP_GREETING_FALLBACK, WAKE_HUNGRY_FALLBACK};
    use crate::character::{CharacterKind, DEFAULT_DIALOGS};
    use crate::provider::GenerateError;
    use crate::resolver::FILTERED_APOLOGY;
    use crate::stats::StatDelta;
    use crate::storage::MemStore;

    struct Scripted(Result<String, GenerateError>);

    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            self.0.clone()
        }
    }

    fn offline() -> Scripted {
        Scripted(Err(GenerateError::Transport("connection refused".into())))
    }

    fn app_with_active() -> (App, String) {
        let mut app = App::default();
        let character = Character::new("Mina", CharacterKind::Original);
        let id = character.id.clone();
        app.add_character(character);
        app.select_character(&id).unwrap();
        (app, id)
    }

    #[tokio::test]
    async fn test_play_offline_uses_default_dialog() {
        let (mut app, id) = app_with_active();
        let mut store = MemStore::new();
        let generator = offline();
        let mut session = Session::new(&mut app, &mut store, &generator);

        let interaction = session.perform(Action::Play).await.unwrap().unwrap();
        assert!(DEFAULT_DIALOGS.contains(&interaction.text.as_str()));
        assert_eq!(interaction.source, ResponseSource::Fallback);

        assert_eq!(app.stats_of(&id).happiness, 70);
        assert_eq!(app.log().len(), 1);
    }

    #[tokio::test]
    async fn test_generated_text_is_logged() {
        let (mut app, _) = app_with_active();
        let mut store = MemStore::new();
        let generator = Scripted(Ok("*Woohoo!*".to_string()));
        let mut session = Session::new(&mut app, &mut store, &generator);

        let interaction = session.perform(Action::Click).await.unwrap().unwrap();
        assert_eq!(interaction.text, "Woohoo!");
        assert_eq!(interaction.source, ResponseSource::Generated);
        assert_eq!(app.log().get(0).unwrap().text, "Woohoo!");
    }

    #[tokio::test]
    async fn test_content_filter_yields_apology() {
        let (mut app, _) = app_with_active();
        let mut store = MemStore::new();
        let generator = Scripted(Err(GenerateError::ContentFiltered));
        let mut session = Session::new(&mut app, &mut store, &generator);

        let interaction = session.perform(Action::Click).await.unwrap().unwrap();
        assert_eq!(interaction.text, FILTERED_APOLOGY);
    }

    #[tokio::test]
    async fn test_no_active_character_is_an_error() {
        let mut app = App::default();
        let mut store = MemStore::new();
        let generator = offline();
        let mut session = Session::new(&mut app, &mut store, &generator);

        assert!(session.perform(Action::Feed).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_custom_gift_rejected_before_stat_change() {
        let (mut app, id) = app_with_active();
        let mut store = MemStore::new();
        let generator = offline();
        let mut session = Session::new(&mut app, &mut store, &generator);

        let result = session.perform(Action::CustomGift("   ".to_string())).await;
        assert!(result.is_err());
        assert_eq!(app.stats_of(&id), StatSet::default());
        assert!(app.log().is_empty());
    }

    #[tokio::test]
    async fn test_sleep_two_phase_hungry_branch() {
        let (mut app, id) = app_with_active();
        let mut stats = app.stats_of(&id);
        stats.apply(StatDelta { hunger: -10, ..Default::default() }); // hunger 40
        app.set_stats(&id, stats);

        let mut store = MemStore::new();
        let generator = offline();
        let mut session =
            Session::new(&mut app, &mut store, &generator).with_sleep_delay(Duration::ZERO);

        let interaction = session.perform(Action::Sleep).await.unwrap().unwrap();
        assert_eq!(interaction.greeting.unwrap().text, SLEEP_GREETING_FALLBACK);
        assert_eq!(interaction.text, WAKE_HUNGRY_FALLBACK);

        let after = app.stats_of(&id);
        assert_eq!(after.hunger, 10);
        assert_eq!(after.happiness, 25);
        assert_eq!(after.affection, 35);

        assert_eq!(app.log().len(), 1);
        assert_eq!(app.log().get(0).unwrap().action, "Sleep (woke up)");
    }

    #[tokio::test]
    async fn test_sleep_wake_discarded_after_character_switch() {
        let (mut app, id) = app_with_active();
        let other = Character::new("Nari", CharacterKind::Existing);
        let other_id = other.id.clone();
        app.add_character(other);

        let mut store = MemStore::new();
        let generator = offline();

        let plan = {
            let mut session = Session::new(&mut app, &mut store, &generator);
            session.sleep_begin().await.unwrap()
        };

        // The user switches characters while the pet is asleep.
        app.select_character(&other_id).unwrap();

        let mut session = Session::new(&mut app, &mut store, &generator);
        let finished = session.sleep_finish(plan).await.unwrap();
        assert!(finished.is_none());

        // Neither character's stats were touched by the wake phase.
        assert_eq!(app.stats_of(&id), StatSet::default());
        assert_eq!(app.stats_of(&other_id), StatSet::default());
        assert!(app.log().is_empty());
    }

    #[tokio::test]
    async fn test_stats_reset_skips_generator() {
        let (mut app, id) = app_with_active();
        let mut stats = app.stats_of(&id);
        stats.apply(StatDelta { hunger: 40, happiness: -30, ..Default::default() });
        app.set_stats(&id, stats);

        let mut store = MemStore::new();
        // A generator that would panic if called.
        struct Unreachable;
        impl TextGenerator for Unreachable {
            async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
                panic!("stats reset must not call the generator");
            }
        }
        let generator = Unreachable;
        let mut session = Session::new(&mut app, &mut store, &generator);

        let interaction = session.perform(Action::StatsReset).await.unwrap().unwrap();
        assert_eq!(interaction.stats, StatSet::default());
        assert_eq!(app.stats_of(&id), StatSet::default());
    }

    #[tokio::test]
    async fn test_quota_exhaustion_keeps_session_usable() {
        let (mut app, id) = app_with_active();
        let mut store = MemStore::with_quota(0);
        let generator = offline();
        let mut session = Session::new(&mut app, &mut store, &generator);

        // Persistence fails, but the action still completes.
        let interaction = session.perform(Action::Feed).await.unwrap().unwrap();
        assert_eq!(interaction.stats.hunger, 70);
        assert_eq!(app.stats_of(&id).hunger, 70);
        assert_eq!(app.log().len(), 1);
    }
}
