use anyhow::Result;
use clap::Parser;

use aipet::actions::Action;
use aipet::cli::{Cli, Commands};
use aipet::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Feed => commands::handle_action(data_dir, Action::Feed).await,
        Commands::Play => commands::handle_action(data_dir, Action::Play).await,
        Commands::Gift { name } => commands::handle_gift(data_dir, name).await,
        Commands::Sleep => commands::handle_action(data_dir, Action::Sleep).await,
        Commands::Click => commands::handle_action(data_dir, Action::Click).await,
        Commands::Reset => commands::handle_action(data_dir, Action::StatsReset).await,
        Commands::Status => commands::handle_status(data_dir),
        Commands::Character { command } => commands::handle_character(data_dir, command).await,
        Commands::Logs { command } => commands::handle_logs(data_dir, command),
        Commands::Connect => commands::handle_connect(data_dir).await,
        Commands::Config { command } => commands::handle_config(data_dir, command),
    }
}
