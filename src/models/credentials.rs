use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TrackerError, TrackerResult};

/// Access/refresh token pair plus whatever else the token endpoint returned
/// (`token_type`, `expires_in`, ...), carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSet {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CredentialSet {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            metadata: Map::new(),
        }
    }

    /// Build a credential set from a raw token endpoint body.
    ///
    /// `previous_refresh` is used when a refresh response does not rotate the
    /// refresh token. A body without `access_token` is an exchange failure.
    pub fn from_token_response(body: &str, previous_refresh: Option<&str>) -> TrackerResult<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            TrackerError::AuthExchange(format!("token endpoint returned non-JSON body: {}", e))
        })?;
        let Value::Object(mut fields) = value else {
            return Err(TrackerError::AuthExchange(
                "token endpoint returned a non-object body".to_string(),
            ));
        };

        let access_token = match fields.remove("access_token") {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => {
                let reason = fields
                    .get("error_description")
                    .or_else(|| fields.get("error"))
                    .or_else(|| fields.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("response has no access_token");
                return Err(TrackerError::AuthExchange(reason.to_string()));
            }
        };

        let refresh_token = match fields.remove("refresh_token") {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => previous_refresh
                .map(str::to_string)
                .ok_or_else(|| TrackerError::AuthExchange("response has no refresh_token".to_string()))?,
        };

        Ok(Self {
            access_token,
            refresh_token,
            metadata: fields,
        })
    }

    /// `expires_in` as reported by the provider, if any
    pub fn expires_in(&self) -> Option<u64> {
        self.metadata.get("expires_in").and_then(Value::as_u64)
    }
}
