use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::error::{TrackerError, TrackerResult};
use crate::models::MatchPolicy;

pub const PLACEHOLDER_CLIENT_ID: &str = "YOUR_CLIENT_ID";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub oauth: OAuthConfig,
    pub api: ApiConfig,
    pub files: FilesConfig,
    pub timing: TimingConfig,
    pub matching: MatchingConfig,
}

/// How the one-time authorization code reaches us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Local listener on the redirect URI
    #[default]
    Callback,
    /// Paste the code (or the redirected URL) into the terminal
    Manual,
    /// Whichever of the two arrives first
    Hybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect registered with the provider
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    pub mode: AuthMode,
    /// Upper bound on waiting for the authorization code
    pub auth_timeout_seconds: u64,
    /// Try to open the authorization URL in the default browser
    pub open_browser: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub profile_path: String,
    pub request_timeout_seconds: u64,
    /// Append every companion API call to `api_log_file`
    pub api_logging: bool,
    pub api_log_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub token_file: String,
    pub materials_file: String,
    pub delimiter: String,
    pub material_column: String,
    pub quantity_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between successful polls in seconds
    pub poll_interval_seconds: u64,
    /// Delay after a failed poll in seconds
    pub error_retry_delay_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub policy: MatchPolicy,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: PLACEHOLDER_CLIENT_ID.to_string(),
            client_secret: "YOUR_CLIENT_SECRET".to_string(),
            redirect_uri: "http://localhost:8000/callback".to_string(),
            auth_url: crate::DEFAULT_AUTH_URL.to_string(),
            token_url: crate::DEFAULT_TOKEN_URL.to_string(),
            scope: "capi".to_string(),
            mode: AuthMode::Callback,
            auth_timeout_seconds: 300,
            open_browser: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_API_BASE_URL.to_string(),
            profile_path: "/v4/profile".to_string(),
            request_timeout_seconds: 30,
            api_logging: false,
            api_log_file: "api_debug.log".to_string(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            token_file: "tokens.json".to_string(),
            materials_file: "materials_needed.csv".to_string(),
            delimiter: ";".to_string(),
            material_column: "Materiau".to_string(),
            quantity_column: "Quantite_Demandee".to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            error_retry_delay_seconds: 60,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_secs(self.error_retry_delay_seconds)
    }
}

impl FilesConfig {
    /// The delimiter as a single char; `validate` guarantees there is exactly one.
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(';')
    }
}

impl TrackerConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create(config_path: &str) -> TrackerResult<Self> {
        if Path::new(config_path).exists() {
            info!("📋 Loading configuration from {}", config_path);
            let config_str = fs::read_to_string(config_path)?;
            toml::from_str(&config_str)
                .map_err(|e| TrackerError::Config(format!("{}: {}", config_path, e)))
        } else {
            info!("📋 Creating default configuration at {}", config_path);
            let config = TrackerConfig::default();
            config.save(config_path)?;
            warn!("💡 Edit {} and set your client id and secret", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> TrackerResult<()> {
        if let Some(parent) = Path::new(config_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let config_str = toml::to_string_pretty(self)
            .map_err(|e| TrackerError::Config(e.to_string()))?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> TrackerResult<()> {
        if self.oauth.client_id.trim().is_empty() {
            return Err(TrackerError::Config("oauth.client_id must not be empty".to_string()));
        }
        if self.oauth.client_id == PLACEHOLDER_CLIENT_ID {
            warn!("⚠️ oauth.client_id is still the placeholder value");
        }

        let redirect = Url::parse(&self.oauth.redirect_uri)
            .map_err(|e| TrackerError::Config(format!("oauth.redirect_uri: {}", e)))?;
        if redirect.scheme() != "http" || redirect.host_str().is_none() {
            return Err(TrackerError::Config(
                "oauth.redirect_uri must be an http:// URL with a host".to_string(),
            ));
        }
        for (name, value) in [
            ("oauth.auth_url", &self.oauth.auth_url),
            ("oauth.token_url", &self.oauth.token_url),
            ("api.base_url", &self.api.base_url),
        ] {
            Url::parse(value).map_err(|e| TrackerError::Config(format!("{}: {}", name, e)))?;
        }

        if self.timing.poll_interval_seconds == 0 {
            return Err(TrackerError::Config(
                "timing.poll_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.files.delimiter.chars().count() != 1 {
            return Err(TrackerError::Config(
                "files.delimiter must be a single character".to_string(),
            ));
        }

        info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("   🔑 Auth mode: {:?} (timeout {}s)", self.oauth.mode, self.oauth.auth_timeout_seconds);
        info!("   🌐 Profile endpoint: {}{}", self.api.base_url, self.api.profile_path);
        info!("   📄 Requirements: {}", self.files.materials_file);
        info!("   💾 Token store: {}", self.files.token_file);
        info!("   ⏰ Poll interval: {}s (retry {}s)", self.timing.poll_interval_seconds, self.timing.error_retry_delay_seconds);
        info!("   🔎 Matching: {:?}", self.matching.policy);
    }
}
