// OAuth2 authorization-code grant against the provider's auth server
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::models::CredentialSet;

pub struct OAuthClient {
    client: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> TrackerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Authorization endpoint URL the user opens in a browser
    pub fn authorization_url(&self) -> TrackerResult<String> {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
            ],
        )
        .map_err(|e| TrackerError::Config(format!("oauth.auth_url: {}", e)))?;
        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> TrackerResult<CredentialSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        let body = self.post_token_form(&params).await?;
        CredentialSet::from_token_response(&body, None)
    }

    pub async fn refresh(&self, refresh_token: &str) -> TrackerResult<CredentialSet> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        let body = self.post_token_form(&params).await?;
        CredentialSet::from_token_response(&body, Some(refresh_token))
    }

    // Status is not checked here: an error body simply lacks access_token and
    // is rejected by `CredentialSet::from_token_response` with its message.
    async fn post_token_form(&self, params: &[(&str, &str)]) -> TrackerResult<String> {
        debug!("🌐 POST {} ({})", self.config.token_url, params[0].1);
        let response = self
            .client
            .post(&self.config.token_url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, crate::USER_AGENT)
            .form(params)
            .send()
            .await
            .map_err(|e| TrackerError::AuthExchange(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::AuthExchange(format!("reading token response failed: {}", e)))?;
        debug!("Token endpoint answered {}", status.as_u16());
        Ok(body)
    }
}
