//! Notification channel command

use anyhow::Result;
use colored::*;

use crate::config::Config;

/// Print the notification channels available to this API key
pub async fn show_channels(config: &Config) -> Result<()> {
    let client = config.client();
    let channels = client.list_channels().await?;

    println!("{}", "Notification Channels:".bold());
    println!("  Endpoint: {}", channels.endpoint.cyan());
    println!(
        "  Auth key: {}",
        if channels.auth_key.is_some() {
            "set".green()
        } else {
            "none".dimmed()
        }
    );

    if channels.channels.is_empty() {
        println!("{}", "  No channels available.".yellow());
    } else {
        for channel in &channels.channels {
            println!("  {} {}", "▸".cyan(), channel.name);
        }
    }

    Ok(())
}
