//! Tether CLI
//!
//! Command-line interface for inspecting job runs on the platform and
//! waiting for them to finish.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Inspect and wait on remote job runs", long_about = None)]
struct Cli {
    /// Platform API URL
    #[arg(long, env = "TETHER_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Platform API key
    #[arg(long, env = "TETHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log polling and notification activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tether_client=debug"
    } else {
        "tether_client=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        api_url: cli.api_url,
        api_key: cli.api_key,
    };

    handle_command(cli.command, &config).await
}
