//! Run command handlers
//!
//! Handles all run-related CLI commands: showing status, listing the runs
//! of a job, and blocking until a run finishes.

use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Subcommand;
use colored::*;
use tether_client::{PlatformClient, WaitConfig, transport};
use tether_core::domain::run::{JobId, JobRunIdentity, RunId, RunState, RunStatus};
use tracing::debug;

use crate::config::Config;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// Show the status of a run
    Status {
        /// Job ID
        job_id: JobId,
        /// Run ID
        run_id: RunId,
    },
    /// List all runs of a job
    List {
        /// Job ID
        job_id: JobId,
    },
    /// Wait until a run finishes
    Wait {
        /// Job ID
        job_id: JobId,
        /// Run ID
        run_id: RunId,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Seconds between status polls
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Poll only, without push notifications
        #[arg(long)]
        no_notify: bool,
    },
}

/// Handle run commands
///
/// # Arguments
/// * `command` - The run command to execute
/// * `config` - The CLI configuration
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        RunCommands::Status { job_id, run_id } => show_run(&client, job_id, run_id).await,
        RunCommands::List { job_id } => list_runs(&client, job_id).await,
        RunCommands::Wait {
            job_id,
            run_id,
            timeout,
            poll_interval,
            no_notify,
        } => {
            let wait_config = wait_config(poll_interval, no_notify)?;
            let identity = JobRunIdentity::new(job_id, run_id);
            wait_for_run(&client, identity, &wait_config, timeout).await
        }
    }
}

/// Get and display a single run
async fn show_run(client: &PlatformClient, job_id: JobId, run_id: RunId) -> Result<()> {
    let run = client.get_run(job_id, run_id).await?;

    print_run_details(job_id, &run);

    Ok(())
}

/// List all runs of a job
async fn list_runs(client: &PlatformClient, job_id: JobId) -> Result<()> {
    let runs = client.list_runs(job_id).await?;

    if runs.is_empty() {
        println!("{}", format!("No runs found for job {}.", job_id).yellow());
    } else {
        println!(
            "{}",
            format!("Found {} run(s) for job {}:", runs.len(), job_id).bold()
        );
        println!();
        for run in runs {
            print_run_summary(&run);
        }
    }

    Ok(())
}

/// Build the waiter configuration from the environment and CLI flags
fn wait_config(poll_interval: Option<u64>, no_notify: bool) -> Result<WaitConfig> {
    let mut config = WaitConfig::from_env()?;

    if let Some(seconds) = poll_interval {
        let interval = Duration::from_secs(seconds);
        config = config.with_poll_interval(interval);
        config.subscribed_poll_interval = config.subscribed_poll_interval.max(interval);
    }

    if no_notify {
        config = config.without_notifications();
    }

    config.validate()?;
    debug!("Wait configuration: {:?}", config);
    Ok(config)
}

/// Block until the run finishes, failing if the run did
async fn wait_for_run(
    client: &PlatformClient,
    identity: JobRunIdentity,
    config: &WaitConfig,
    timeout: Option<u64>,
) -> Result<()> {
    let transport = transport::default_transport();

    println!("{}", format!("Waiting for {}...", identity).dimmed());
    let waiter = client.watch_run(identity, transport.as_ref(), config).await;

    let outcome = match timeout {
        Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), waiter.result())
            .await
            .map_err(|_| anyhow!("Timed out after {}s waiting for {}", seconds, identity))?,
        None => waiter.result().await,
    };

    match outcome {
        Ok(run) => {
            println!("{} {}", "✓".green(), format!("{} succeeded", identity).bold());
            println!();
            print_run_details(identity.job_id, &run);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e.to_string().red());
            Err(e.into())
        }
    }
}

/// Print a one-entry run summary
fn print_run_summary(run: &RunStatus) {
    println!("  {} Run {}", "▸".cyan(), run.id.to_string().dimmed());
    println!("    State:    {}", colorize_state(&run.state));
    if let Some(started) = run.started_at {
        println!(
            "    Started:  {}",
            started.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

/// Print detailed run information
fn print_run_details(job_id: JobId, run: &RunStatus) {
    println!("{}", "Run Details:".bold());
    println!("  Job ID:    {}", job_id.to_string().cyan());
    println!("  Run ID:    {}", run.id.to_string().cyan());
    println!("  State:     {}", colorize_state(&run.state));

    if let Some(started) = run.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(finished) = run.finished_at {
        println!("  Finished:  {}", finished.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = run.started_at {
            let seconds = finished.signed_duration_since(started).num_seconds();
            println!("  Duration:  {}s", seconds);
        }
    }

    if run.is_cancel_requested {
        println!("  {}", "Cancellation requested".yellow());
    }

    if let Some(error) = &run.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Colorize run state for display
fn colorize_state(state: &RunState) -> ColoredString {
    let label = state.as_str();
    match state {
        RunState::Queued => label.yellow(),
        RunState::Running => label.cyan(),
        RunState::Succeeded => label.green(),
        RunState::Failed => label.red(),
        RunState::Cancelled => label.dimmed(),
        RunState::Other(_) => label.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_flag_keeps_config_valid() {
        let config = wait_config(Some(600), false).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(600));
        assert!(config.subscribed_poll_interval >= config.poll_interval);
    }

    #[test]
    fn test_no_notify_flag() {
        let config = wait_config(None, true).unwrap();
        assert!(!config.notifications);
    }
}
