use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::actions::Action;
use crate::app::App;
use crate::character::{Character, CharacterKind};
use crate::cli::{CharacterCommands, ConfigCommands, LogCommands};
use crate::clipboard::{Clipboard, OsClipboard};
use crate::config::Config;
use crate::provider::GeminiClient;
use crate::resolver::ResponseSource;
use crate::session::{Interaction, Session, SLEEP_DELAY};
use crate::stats::{StatSet, STAT_MAX};
use crate::storage::{FileStore, KvStore, StorageError};

fn open(data_dir: Option<PathBuf>) -> Result<(Config, FileStore, App)> {
    let config = Config::new(data_dir)?;
    let store = FileStore::new(config.store_dir())?;
    let app = App::load(&store)?;
    Ok((config, store, app))
}

fn save(app: &App, store: &mut dyn KvStore) -> Result<()> {
    match app.save(store) {
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

/// Resolve a display name to a character id. Names are not unique, so
/// an ambiguous name is an error rather than a silent pick.
fn resolve_name(app: &App, name: &str) -> Result<String> {
    let matches = app.characters().find_by_name(name);
    match matches.len() {
        0 => bail!("no character named '{}'. See `aipet character list`.", name),
        1 => Ok(matches[0].id.clone()),
        n => bail!(
            "{} characters are named '{}'; rename one with `aipet character edit` first",
            n,
            name
        ),
    }
}

fn stat_bar(value: i32) -> String {
    let filled = (value * 10 / STAT_MAX) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn print_stats(stats: &StatSet) {
    println!(
        "  {} {} {:>3}/100 ({})",
        "Affection".magenta(),
        stat_bar(stats.affection),
        stats.affection,
        stats.affection_band()
    );
    println!(
        "  {} {} {:>3}/100 ({})",
        "Hunger   ".yellow(),
        stat_bar(stats.hunger),
        stats.hunger,
        stats.hunger_band()
    );
    println!(
        "  {} {} {:>3}/100 ({})",
        "Happiness".cyan(),
        stat_bar(stats.happiness),
        stats.happiness,
        stats.happiness_band()
    );
}

fn print_line(name: &str, text: &str, source: ResponseSource) {
    match source {
        ResponseSource::Generated => println!("{} {}", format!("{}:", name).cyan().bold(), text),
        ResponseSource::Fallback | ResponseSource::Filtered => {
            println!("{} {}", format!("{}:", name).cyan().bold(), text.dimmed())
        }
    }
}

fn print_interaction(name: &str, interaction: &Interaction) {
    if let Some(greeting) = &interaction.greeting {
        print_line(name, &greeting.text, greeting.source);
    }
    print_line(name, &interaction.text, interaction.source);
    print_stats(&interaction.stats);
}

pub async fn handle_action(data_dir: Option<PathBuf>, action: Action) -> Result<()> {
    let (config, mut store, mut app) = open(data_dir)?;
    let name = match app.active_character() {
        Some(character) => character.name.clone(),
        None => bail!("no character is selected; run `aipet character select` first"),
    };

    let generator = GeminiClient::new(config.api_key(), &config.model);
    let mut session = Session::new(&mut app, &mut store, &generator);

    let interaction = if action == Action::Sleep {
        // Show the goodnight line before the wake-up one, with the
        // same pause the pet takes to "sleep".
        let plan = session.sleep_begin().await?;
        print_line(&name, &plan.greeting().text, plan.greeting().source);
        tokio::time::sleep(SLEEP_DELAY).await;
        session.sleep_finish(plan).await?
    } else {
        session.perform(action).await?
    };

    if let Some(interaction) = interaction {
        if interaction.greeting.is_some() {
            // Already printed before the pause.
            print_line(&name, &interaction.text, interaction.source);
            print_stats(&interaction.stats);
        } else {
            print_interaction(&name, &interaction);
        }
    }
    Ok(())
}

pub async fn handle_gift(data_dir: Option<PathBuf>, gift_name: Option<String>) -> Result<()> {
    let action = match gift_name {
        Some(name) => Action::CustomGift(name),
        None => Action::Gift,
    };
    handle_action(data_dir, action).await
}

pub fn handle_status(data_dir: Option<PathBuf>) -> Result<()> {
    let (_, _, app) = open(data_dir)?;
    match app.active_character() {
        Some(character) => {
            println!(
                "{} ({}) — day {}",
                character.name.cyan().bold(),
                character.kind,
                app.days_count()
            );
            if !character.setting.is_empty() {
                println!("  {}", character.setting.dimmed());
            }
            print_stats(&app.stats_of(&character.id));
        }
        None => println!("No character is selected. Run `aipet character select NAME`."),
    }
    Ok(())
}

pub async fn handle_character(
    data_dir: Option<PathBuf>,
    command: CharacterCommands,
) -> Result<()> {
    let (config, mut store, mut app) = open(data_dir)?;

    match command {
        CharacterCommands::Add {
            name,
            setting,
            original,
            genre,
            tone,
            personality,
            lore,
            speech_style,
            user_nickname,
            dialogs,
            gifts,
        } => {
            let kind = if original {
                CharacterKind::Original
            } else {
                CharacterKind::Existing
            };
            let mut character = Character::new(&name, kind);
            character.setting = setting;
            character.genre = genre;
            character.tone = tone;
            character.personality = personality;
            character.lore = lore;
            character.speech_style = speech_style;
            character.user_nickname = user_nickname;
            character.custom_dialogs = dialogs;
            character.custom_gifts = gifts;

            app.add_character(character);
            save(&app, &mut store)?;
            println!("{} Created character '{}'", "✓".green(), name.cyan());
        }
        CharacterCommands::Edit {
            name,
            rename,
            setting,
            genre,
            tone,
            personality,
            lore,
            speech_style,
            user_nickname,
            dialogs,
            gifts,
        } => {
            let id = resolve_name(&app, &name)?;
            app.update_character(&id, |c| {
                if let Some(v) = rename {
                    c.name = v;
                }
                if let Some(v) = setting {
                    c.setting = v;
                }
                if let Some(v) = genre {
                    c.genre = v;
                }
                if let Some(v) = tone {
                    c.tone = v;
                }
                if let Some(v) = personality {
                    c.personality = v;
                }
                if let Some(v) = lore {
                    c.lore = v;
                }
                if let Some(v) = speech_style {
                    c.speech_style = v;
                }
                if let Some(v) = user_nickname {
                    c.user_nickname = v;
                }
                if let Some(v) = dialogs {
                    c.custom_dialogs = v;
                }
                if let Some(v) = gifts {
                    c.custom_gifts = v;
                }
            })?;
            save(&app, &mut store)?;
            println!("{} Updated character '{}'", "✓".green(), name.cyan());
        }
        CharacterCommands::Remove { name } => {
            let id = resolve_name(&app, &name)?;
            app.remove_character(&id)?;
            save(&app, &mut store)?;
            println!("{} Removed character '{}'", "✓".green(), name.cyan());
        }
        CharacterCommands::List => {
            if app.characters().is_empty() {
                println!("No characters yet. Create one with `aipet character add`.");
                return Ok(());
            }
            for character in app.characters().iter() {
                let marker = if app.active_id() == Some(character.id.as_str()) {
                    "●".green()
                } else {
                    "○".normal()
                };
                println!(
                    "{} {} ({}) {}",
                    marker,
                    character.name.cyan(),
                    character.kind,
                    character.created_at.format("%Y-%m-%d").to_string().dimmed()
                );
            }
        }
        CharacterCommands::Select { name } => {
            let id = resolve_name(&app, &name)?;
            app.select_character(&id)?;
            save(&app, &mut store)?;

            let generator = GeminiClient::new(config.api_key(), &config.model);
            let mut session = Session::new(&mut app, &mut store, &generator);
            if let Some(interaction) = session.greet().await? {
                print_interaction(&name, &interaction);
            }
        }
    }
    Ok(())
}

pub fn handle_logs(data_dir: Option<PathBuf>, command: LogCommands) -> Result<()> {
    let (_, mut store, mut app) = open(data_dir)?;

    match command {
        LogCommands::List => {
            if app.log().is_empty() {
                println!("The log is empty.");
                return Ok(());
            }
            for (i, entry) in app.log().iter().enumerate() {
                println!(
                    "{:>2}. [{}] {} {}",
                    i + 1,
                    entry.action.yellow(),
                    format!("{}:", entry.character).cyan(),
                    entry.text
                );
                println!(
                    "    {}",
                    entry
                        .timestamp
                        .format("%Y-%m-%d %H:%M UTC")
                        .to_string()
                        .dimmed()
                );
            }
        }
        LogCommands::Copy { index } => {
            let entry = index
                .checked_sub(1)
                .and_then(|i| app.log().get(i))
                .ok_or_else(|| anyhow::anyhow!("no log entry {}", index))?;

            let mut clipboard = OsClipboard;
            match clipboard.copy(&entry.text) {
                Ok(()) => println!("{} Copied to clipboard", "✓".green()),
                // Copy failure loses nothing; the text is still on screen.
                Err(e) => {
                    eprintln!("{} {}", "warning: clipboard copy failed:".yellow(), e);
                    println!("{}", entry.text);
                }
            }
        }
        LogCommands::Remove { index } => {
            let removed = index
                .checked_sub(1)
                .and_then(|i| app.remove_log(i))
                .ok_or_else(|| anyhow::anyhow!("no log entry {}", index))?;
            save(&app, &mut store)?;
            println!("{} Removed: {}", "✓".green(), removed.text.dimmed());
        }
    }
    Ok(())
}

pub async fn handle_connect(data_dir: Option<PathBuf>) -> Result<()> {
    let (config, _, _) = open(data_dir)?;
    let client = GeminiClient::new(config.api_key(), &config.model);

    println!("Checking connection to '{}'...", client.model());
    match client.check_connection().await {
        Ok(()) => {
            println!("{} API key is valid", "✓".green());
            Ok(())
        }
        Err(e) => bail!("connection check failed: {}", e),
    }
}

pub fn handle_config(data_dir: Option<PathBuf>, command: ConfigCommands) -> Result<()> {
    let mut config = Config::new(data_dir)?;

    match command {
        ConfigCommands::SetKey { key } => {
            config.api_key = Some(key);
            config.save()?;
            println!("{} API key saved", "✓".green());
        }
        ConfigCommands::SetModel { model } => {
            config.model = model;
            config.save()?;
            println!("{} Model set to '{}'", "✓".green(), config.model);
        }
        ConfigCommands::Show => {
            println!("data dir: {}", config.data_dir.display());
            println!("model:    {}", config.model);
            let key = config.api_key();
            if key.is_empty() {
                println!("api key:  {}", "(not set)".dimmed());
            } else {
                let visible = key.chars().take(4).collect::<String>();
                println!("api key:  {}...", visible);
            }
        }
    }
    Ok(())
}
