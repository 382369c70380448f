// Client module - companion API, OAuth token endpoint and redirect capture
pub mod api;
pub mod oauth;
pub mod callback;

pub use api::CompanionClient;
pub use oauth::OAuthClient;
pub use callback::{CallbackListener, CallbackOutcome};
