// Token manager - obtains, refreshes and persists the companion API credentials
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use std::io::{BufRead, Write};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::client::callback::extract_code;
use crate::client::{CallbackListener, OAuthClient};
use crate::config::{AuthMode, OAuthConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::models::CredentialSet;
use crate::poller::CredentialRefresher;
use crate::storage::TokenStore;

pub struct TokenManager {
    oauth: OAuthClient,
    store: TokenStore,
    mode: AuthMode,
    auth_timeout: Duration,
    open_browser: bool,
}

impl TokenManager {
    pub fn new(config: &OAuthConfig, token_file: impl Into<PathBuf>) -> TrackerResult<Self> {
        Ok(Self {
            oauth: OAuthClient::new(config.clone())?,
            store: TokenStore::new(token_file),
            mode: config.mode,
            auth_timeout: Duration::from_secs(config.auth_timeout_seconds),
            open_browser: config.open_browser,
        })
    }

    pub fn load_persisted(&self) -> Option<CredentialSet> {
        self.store.load()
    }

    pub fn begin_authorization(&self) -> TrackerResult<String> {
        self.oauth.authorization_url()
    }

    /// Wait for the one-time code according to the configured mode, bounded
    /// by the auth timeout.
    pub async fn await_authorization_code(&self) -> TrackerResult<String> {
        let timeout_secs = self.auth_timeout.as_secs();
        match self.mode {
            AuthMode::Callback => {
                let listener = CallbackListener::bind(self.oauth.redirect_uri()).await?;
                listener.wait(self.auth_timeout).await
            }
            AuthMode::Manual => {
                let typed = spawn_stdin_reader();
                tokio::time::timeout(self.auth_timeout, typed)
                    .await
                    .map_err(|_| TrackerError::AuthTimeout(timeout_secs))?
                    .unwrap_or_else(|_| Err(reader_gone()))
            }
            AuthMode::Hybrid => {
                let captured = match CallbackListener::bind(self.oauth.redirect_uri()).await {
                    Ok(listener) => Some(listener.spawn()),
                    Err(e) => {
                        warn!("⚠️ Callback listener unavailable ({}), falling back to manual entry", e);
                        None
                    }
                };
                let typed = spawn_stdin_reader();

                let race = async move {
                    match captured {
                        Some(captured) => tokio::select! {
                            result = captured => result.unwrap_or_else(|_| Err(reader_gone())),
                            result = typed => result.unwrap_or_else(|_| Err(reader_gone())),
                        },
                        None => typed.await.unwrap_or_else(|_| Err(reader_gone())),
                    }
                };
                tokio::time::timeout(self.auth_timeout, race)
                    .await
                    .map_err(|_| TrackerError::AuthTimeout(timeout_secs))?
            }
        }
    }

    pub async fn exchange_code(&self, code: &str) -> TrackerResult<CredentialSet> {
        info!("🔄 Exchanging authorization code for tokens...");
        self.oauth.exchange_code(code).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> TrackerResult<CredentialSet> {
        info!("🔄 Refreshing access token...");
        self.oauth.refresh(refresh_token).await
    }

    pub fn persist(&self, credentials: &CredentialSet) -> TrackerResult<()> {
        self.store.save(credentials)
    }

    /// Startup protocol: saved tokens if present (unless `force_reauth`),
    /// otherwise the full authorization flow.
    pub async fn obtain_credentials(&self, force_reauth: bool) -> TrackerResult<CredentialSet> {
        if !force_reauth {
            if let Some(credentials) = self.load_persisted() {
                info!("🔑 Existing tokens found, using them");
                return Ok(credentials);
            }
        }

        let url = self.begin_authorization()?;
        println!("🔐 Visit this URL to authorize the tracker:\n\n    {}\n", url);
        if self.open_browser {
            if let Err(e) = opener::open(&url) {
                warn!("⚠️ Could not open a browser: {}", e);
            }
        }

        let code = self.await_authorization_code().await?;
        let credentials = self.exchange_code(&code).await?;
        self.persist(&credentials)?;
        if let Some(secs) = credentials.expires_in() {
            debug!("Access token valid for {}s", secs);
        }
        info!("✅ Authorization complete");
        Ok(credentials)
    }
}

#[async_trait]
impl CredentialRefresher for TokenManager {
    async fn refresh_credentials(&self, current: &CredentialSet) -> TrackerResult<CredentialSet> {
        let refreshed = self.refresh(&current.refresh_token).await?;
        // Not fatal: the new pair is already in use
        if let Err(e) = self.persist(&refreshed) {
            warn!("⚠️ Refreshed tokens could not be saved: {}", e);
        }
        match refreshed.expires_in() {
            Some(secs) => info!("✅ Token refreshed, valid for {}s", secs),
            None => info!("✅ Token refreshed"),
        }
        Ok(refreshed)
    }
}

fn reader_gone() -> TrackerError {
    TrackerError::Io(std::io::Error::other("authorization code reader stopped unexpectedly"))
}

// Plain thread: a pending blocking read must not hold up runtime shutdown
fn spawn_stdin_reader() -> oneshot::Receiver<TrackerResult<String>> {
    let (sender, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let _ = sender.send(prompt_for_code(stdin.lock()));
    });
    receiver
}

/// Prompt on stdout and read lines until one yields a code.
pub fn prompt_for_code<R: BufRead>(mut reader: R) -> TrackerResult<String> {
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "Paste the authorization code (or the full redirect URL): ")?;
        stdout.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(TrackerError::AuthExchange(
                "input closed before an authorization code was entered".to_string(),
            ));
        }
        match extract_code(&line) {
            Some(code) => return Ok(code),
            None => println!("⚠️ No code found in that input, try again."),
        }
    }
}
