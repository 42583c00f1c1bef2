//! JSON response envelope used by every API endpoint.
//!
//! The backend wraps each payload as `{ success, data, message }`. The shapes
//! are tolerant: `data` is kept as raw JSON until a caller asks for a typed
//! view, and the token fields accept both `accessToken` and the legacy
//! `token` spelling.

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Parsed `{ success, data, message }` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    /// Parse a response body into an envelope.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Error out on `success: false`, otherwise pass the envelope through.
    pub fn require_success(self) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Failed(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }

    /// Deserialize the `data` payload into a concrete type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.data.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Deserialize one field of the `data` object.
    pub fn data_field<T: DeserializeOwned>(&self, field: &str) -> Result<T, ApiError> {
        let value = self
            .data
            .as_ref()
            .and_then(|data| data.get(field))
            .cloned()
            .unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|err| ApiError::Decode(format!("data.{field}: {err}")))
    }

    /// Server message, or the fallback when none was sent.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Pull an access token out of a login/refresh response body.
///
/// The backend is inconsistent here: the token arrives as `data.accessToken`,
/// `data.token`, or (from older deployments) at the top level. Empty strings
/// count as absent.
pub fn extract_access_token(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.pointer("/data/accessToken"),
        value.pointer("/data/token"),
        value.get("accessToken"),
        value.get("token"),
    ];
    let token = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string);
    token
}
