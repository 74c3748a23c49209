//! Job run API endpoints

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tether_core::domain::run::{JobId, JobRunIdentity, RunId, RunStatus};
use tracing::{debug, warn};

use crate::PlatformClient;
use crate::config::WaitConfig;
use crate::error::{ClientError, Result};
use crate::transport::NotificationTransport;
use crate::waiter::{ResultWaiter, RunPoller, StatusSource};

impl PlatformClient {
    // =============================================================================
    // Job Runs
    // =============================================================================

    /// Get the status of one run of a job
    ///
    /// # Arguments
    /// * `job_id` - The job ID
    /// * `run_id` - The run ID
    ///
    /// # Returns
    /// The run status, or `ClientError::NotFound` if the run does not exist
    pub async fn get_run(&self, job_id: JobId, run_id: RunId) -> Result<RunStatus> {
        let path = format!("/jobs/{}/runs/{}", job_id, run_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await.map_err(|e| {
            if e.is_not_found() {
                ClientError::NotFound(JobRunIdentity::new(job_id, run_id).to_string())
            } else {
                e
            }
        })
    }

    /// List all runs of a job
    ///
    /// # Arguments
    /// * `job_id` - The job ID
    pub async fn list_runs(&self, job_id: JobId) -> Result<Vec<RunStatus>> {
        let path = format!("/jobs/{}/runs", job_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Waiting
    // =============================================================================

    /// Start waiting on a run
    ///
    /// Subscribes to push notifications through `transport` when enabled in
    /// `config` and the channel configuration can be fetched, then starts a
    /// background poller. Neither step can fail the call: without
    /// notifications the poller alone resolves the waiter.
    ///
    /// # Example
    /// ```no_run
    /// # use tether_client::{PlatformClient, WaitConfig, transport::NoopTransport};
    /// # use tether_core::domain::run::JobRunIdentity;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = PlatformClient::new("https://api.example.com");
    /// let waiter = client
    ///     .watch_run(JobRunIdentity::new(1, 20), &NoopTransport, &WaitConfig::default())
    ///     .await;
    /// let status = waiter.result().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn watch_run(
        &self,
        identity: JobRunIdentity,
        transport: &dyn NotificationTransport,
        config: &WaitConfig,
    ) -> Arc<ResultWaiter> {
        let waiter = ResultWaiter::new(identity, Arc::new(self.clone()));

        if config.notifications {
            match self.channels().await {
                Ok(channels) => {
                    waiter.subscribe(transport, &channels).await;
                }
                Err(e) => {
                    warn!(
                        "Could not fetch notification channels, polling {} only: {}",
                        identity, e
                    );
                }
            }
        } else {
            debug!("Notifications disabled, polling {} only", identity);
        }

        RunPoller::new(&waiter, config.clone()).spawn();
        waiter
    }
}

#[async_trait]
impl StatusSource for PlatformClient {
    async fn run_status(&self, run: JobRunIdentity) -> Result<RunStatus> {
        self.get_run(run.job_id, run.run_id).await
    }
}
