use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{CargoSource, CredentialRefresher, ReportSink};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{compute_progress, CredentialSet, MatchPolicy, MaterialRequirements};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Refreshing,
    Sleeping(Duration),
}

pub struct CarrierPoller<S, R, K> {
    source: S,
    refresher: R,
    sink: K,
    requirements: MaterialRequirements,
    policy: MatchPolicy,
    credentials: CredentialSet,
    state: PollState,
    poll_interval: Duration,
    error_retry_delay: Duration,
    /// Set by a refresh, cleared by the next poll that succeeds or sees a 401
    refreshed_since_success: bool,
    last_poll_ok: bool,
    poll_count: u64,
}

impl<S, R, K> CarrierPoller<S, R, K>
where
    S: CargoSource,
    R: CredentialRefresher,
    K: ReportSink,
{
    pub fn new(
        source: S,
        refresher: R,
        sink: K,
        requirements: MaterialRequirements,
        credentials: CredentialSet,
    ) -> Self {
        Self {
            source,
            refresher,
            sink,
            requirements,
            policy: MatchPolicy::default(),
            credentials,
            state: PollState::Polling,
            poll_interval: Duration::from_secs(60),
            error_retry_delay: Duration::from_secs(60),
            refreshed_since_success: false,
            last_poll_ok: false,
            poll_count: 0,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_intervals(mut self, poll_interval: Duration, error_retry_delay: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.error_retry_delay = error_retry_delay;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Perform one state transition.
    ///
    /// Only a failed refresh is returned as an error; it is terminal.
    pub async fn step(&mut self) -> TrackerResult<()> {
        self.state = match self.state {
            PollState::Polling => self.poll().await,
            PollState::Refreshing => self.refresh().await?,
            PollState::Sleeping(delay) => {
                tokio::time::sleep(delay).await;
                PollState::Polling
            }
        };
        Ok(())
    }

    async fn poll(&mut self) -> PollState {
        self.poll_count += 1;
        debug!("🔄 Poll #{}", self.poll_count);

        match self.source.fetch_cargo(&self.credentials.access_token).await {
            Ok(inventory) => {
                let rows = compute_progress(&self.requirements, &inventory, self.policy);
                self.sink.report_progress(&rows);
                self.refreshed_since_success = false;
                self.last_poll_ok = true;
                PollState::Sleeping(self.poll_interval)
            }
            Err(TrackerError::CredentialExpired) if !self.refreshed_since_success => {
                warn!("⚠️ Access token expired or invalid");
                PollState::Refreshing
            }
            Err(e) => {
                // A 401 straight after a refresh waits one retry delay before refreshing again
                if matches!(e, TrackerError::CredentialExpired) {
                    self.refreshed_since_success = false;
                }
                warn!("⚠️ Poll #{} failed: {}", self.poll_count, e);
                self.sink.report_error(&e);
                self.last_poll_ok = false;
                PollState::Sleeping(self.error_retry_delay)
            }
        }
    }

    async fn refresh(&mut self) -> TrackerResult<PollState> {
        match self.refresher.refresh_credentials(&self.credentials).await {
            Ok(credentials) => {
                self.credentials = credentials;
                self.refreshed_since_success = true;
                Ok(PollState::Polling)
            }
            Err(e) => {
                error!("❌ Token refresh failed, re-authorization required: {}", e);
                self.sink.report_error(&e);
                Err(e)
            }
        }
    }

    /// Poll (refreshing first if needed) until a report or error has been
    /// produced. Returns whether the cycle produced a report.
    pub async fn run_cycle(&mut self) -> TrackerResult<bool> {
        self.state = PollState::Polling;
        while !matches!(self.state, PollState::Sleeping(_)) {
            self.step().await?;
        }
        Ok(self.last_poll_ok)
    }

    /// Run until `shutdown` turns true or a refresh fails. Shutdown is
    /// honoured between steps and interrupts sleeping.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> TrackerResult<()> {
        info!("🛰️ Carrier poller started ({} materials tracked)", self.requirements.len());

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.state {
                PollState::Sleeping(delay) => {
                    debug!("⏳ Next poll in {}s", delay.as_secs());
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => self.state = PollState::Polling,
                        _ = wait_for_shutdown(&mut shutdown) => break,
                    }
                }
                _ => self.step().await?,
            }
        }

        info!("🛑 Carrier poller stopped after {} polls", self.poll_count);
        Ok(())
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        // Sender gone: nobody can ask us to stop any more
        std::future::pending::<()>().await;
    }
}
