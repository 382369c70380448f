// Fleet carrier cargo tracker
// Polls the companion API and reports progress against a materials list

pub mod models;
pub mod client;
pub mod storage;
pub mod config;
pub mod error;
pub mod poller;
pub mod report;
pub mod token_manager;
pub mod verbosity;

// Re-export commonly used types
pub use models::{
    CargoItem, CredentialSet, MatchPolicy, MaterialRequirements, ProgressRow, compute_progress,
};

pub use client::{CompanionClient, OAuthClient};
pub use config::{AuthMode, TrackerConfig};
pub use error::{TrackerError, TrackerResult};
pub use poller::CarrierPoller;
pub use report::ConsoleReport;
pub use storage::TokenStore;
pub use token_manager::TokenManager;

// Constants
pub const DEFAULT_AUTH_URL: &str = "https://auth.frontierstore.net/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://auth.frontierstore.net/token";
pub const DEFAULT_API_BASE_URL: &str = "https://companion.orerve.net";
pub const DEFAULT_CONFIG_FILE: &str = "carrier_tracker.toml";
pub const USER_AGENT: &str = concat!("carrier_tracker/", env!("CARGO_PKG_VERSION"));
