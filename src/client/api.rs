use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{CargoItem, ProfileResponse};

/// Companion API client. The bearer token is passed per call because it
/// changes whenever the poller refreshes.
#[derive(Clone)]
pub struct CompanionClient {
    client: reqwest::Client,
    base_url: String,
    profile_path: String,
    api_log_file: Option<String>,
}

impl CompanionClient {
    pub fn new(config: &ApiConfig) -> TrackerResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(crate::USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(CompanionClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile_path: config.profile_path.clone(),
            api_log_file: config.api_logging.then(|| config.api_log_file.clone()),
        })
    }

    pub fn profile_url(&self) -> String {
        if self.profile_path.starts_with('/') {
            format!("{}{}", self.base_url, self.profile_path)
        } else {
            format!("{}/{}", self.base_url, self.profile_path)
        }
    }

    fn log_api_call(&self, method: &str, url: &str, response_status: u16, response_body: Option<&str>) {
        let Some(log_file) = &self.api_log_file else {
            return;
        };

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let log_entry = format!(
            "\n=== API CALL [{timestamp}] ===\n\
             Method: {method}\n\
             URL: {url}\n\
             Response Status: {response_status}\n\
             Response Body: {response_body}\n\
             ========================================\n",
            response_body = response_body.unwrap_or("Not captured")
        );

        match OpenOptions::new().create(true).append(true).open(log_file) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(log_entry.as_bytes()) {
                    warn!("⚠️ Cannot write API log {}: {}", log_file, e);
                }
            }
            Err(e) => warn!("⚠️ Cannot write API log {}: {}", log_file, e),
        }
    }

    /// Fetch the carrier's cargo inventory.
    ///
    /// 401 maps to [`TrackerError::CredentialExpired`]; any other failure is
    /// transient or a malformed response.
    pub async fn get_carrier_cargo(&self, access_token: &str) -> TrackerResult<Vec<CargoItem>> {
        let url = self.profile_url();
        debug!("🌐 GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| TrackerError::TransientApi(format!("request to {} failed: {}", url, e)))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.log_api_call("GET", &url, status.as_u16(), None);
            return Err(TrackerError::CredentialExpired);
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| TrackerError::TransientApi(format!("reading response body failed: {}", e)))?;
        self.log_api_call("GET", &url, status.as_u16(), Some(&response_text));

        if !status.is_success() {
            return Err(TrackerError::TransientApi(format!(
                "profile request failed with status {}: {}",
                status.as_u16(),
                response_text.trim()
            )));
        }

        parse_carrier_cargo(&response_text)
    }
}

/// Pull `fleet_carrier.cargo.inventory` out of a profile body.
pub fn parse_carrier_cargo(body: &str) -> TrackerResult<Vec<CargoItem>> {
    let profile: ProfileResponse = serde_json::from_str(body)
        .map_err(|e| TrackerError::MalformedResponse(format!("profile body: {}", e)))?;
    let carrier = profile
        .fleet_carrier
        .ok_or_else(|| TrackerError::MalformedResponse("profile has no fleet_carrier".to_string()))?;
    Ok(carrier.cargo.inventory)
}
