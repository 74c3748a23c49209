//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod channels;
mod run;

pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job run inspection and waiting
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Show the notification channel configuration
    Channels,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run { command } => run::handle_run_command(command, config).await,
        Commands::Channels => channels::show_channels(config).await,
    }
}
