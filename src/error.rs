// Error types shared by the token manager, API client and poller
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Token endpoint answered without a usable credential pair
    #[error("token exchange failed: {0}")]
    AuthExchange(String),

    #[error("timed out after {0}s waiting for an authorization code")]
    AuthTimeout(u64),

    #[error("authorization denied by provider: {0}")]
    AuthDenied(String),

    /// 401 from the profile endpoint
    #[error("access token expired or invalid")]
    CredentialExpired,

    #[error("companion API error: {0}")]
    TransientApi(String),

    #[error("unexpected companion API response: {0}")]
    MalformedResponse(String),

    #[error("invalid requirements file: {0}")]
    MalformedInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl TrackerError {
    /// Errors the poll loop swallows and retries after a sleep.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TrackerError::TransientApi(_) | TrackerError::MalformedResponse(_) | TrackerError::Http(_)
        )
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
