// Poller module - fetch/diff/report loop and the seams it drives
pub mod carrier_poller;

pub use carrier_poller::{CarrierPoller, PollState};

use async_trait::async_trait;

use crate::client::CompanionClient;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{CargoItem, CredentialSet, ProgressRow};

/// Where cargo snapshots come from
#[async_trait]
pub trait CargoSource: Send + Sync {
    async fn fetch_cargo(&self, access_token: &str) -> TrackerResult<Vec<CargoItem>>;
}

/// Exchanges the current refresh token for a new credential set and makes
/// it durable.
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    async fn refresh_credentials(&self, current: &CredentialSet) -> TrackerResult<CredentialSet>;
}

/// Receives each cycle's outcome
pub trait ReportSink: Send {
    fn report_progress(&mut self, rows: &[ProgressRow]);
    fn report_error(&mut self, error: &TrackerError);
}

#[async_trait]
impl CargoSource for CompanionClient {
    async fn fetch_cargo(&self, access_token: &str) -> TrackerResult<Vec<CargoItem>> {
        self.get_carrier_cargo(access_token).await
    }
}
