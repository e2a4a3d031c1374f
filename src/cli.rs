use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aipet")]
#[command(about = "AI-powered virtual pet in your terminal", version)]
pub struct Cli {
    /// Data directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Feed the active character
    Feed,
    /// Play with the active character
    Play,
    /// Give a gift, random from the gift pool or named explicitly
    Gift {
        /// Name of the gift to give
        name: Option<String>,
    },
    /// Put the active character to sleep
    Sleep,
    /// Poke the character to hear from them
    Click,
    /// Reset the active character's stats to their defaults
    Reset,
    /// Show the active character and their stats
    Status,
    /// Manage characters
    Character {
        #[command(subcommand)]
        command: CharacterCommands,
    },
    /// Browse the interaction log
    Logs {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Verify the API key against the generation service
    Connect,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// Create a character
    Add {
        /// Display name
        name: String,
        /// World or story the character lives in
        #[arg(long)]
        setting: String,
        /// The character is an original creation, not from existing works
        #[arg(long)]
        original: bool,
        #[arg(long, default_value = "")]
        genre: String,
        #[arg(long, default_value = "")]
        tone: String,
        #[arg(long, default_value = "")]
        personality: String,
        #[arg(long, default_value = "")]
        lore: String,
        #[arg(long, default_value = "")]
        speech_style: String,
        /// What the character calls the user
        #[arg(long, default_value = "")]
        user_nickname: String,
        /// Comma-separated fallback dialog lines
        #[arg(long, default_value = "")]
        dialogs: String,
        /// Comma-separated gift names
        #[arg(long, default_value = "")]
        gifts: String,
    },
    /// Edit a character's profile fields
    Edit {
        /// Current display name
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        setting: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        tone: Option<String>,
        #[arg(long)]
        personality: Option<String>,
        #[arg(long)]
        lore: Option<String>,
        #[arg(long)]
        speech_style: Option<String>,
        #[arg(long)]
        user_nickname: Option<String>,
        #[arg(long)]
        dialogs: Option<String>,
        #[arg(long)]
        gifts: Option<String>,
    },
    /// Delete a character and their stats
    Remove { name: String },
    /// List all characters
    List,
    /// Make a character the active one
    Select { name: String },
}

#[derive(Subcommand)]
pub enum LogCommands {
    /// Show the saved interaction log, newest first
    List,
    /// Copy a log entry's text to the clipboard
    Copy {
        /// Entry number as shown by `logs list` (1 is the newest)
        index: usize,
    },
    /// Delete a log entry
    Remove {
        /// Entry number as shown by `logs list` (1 is the newest)
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Store the API key
    SetKey { key: String },
    /// Choose the generation model
    SetModel { model: String },
    /// Print the current configuration
    Show,
}
