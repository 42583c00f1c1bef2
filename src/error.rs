//! Unified error types for the client.

use crate::auth::AuthError;
use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors surfaced by the request gateway and the service layer.
///
/// The variants separate the three failure classes callers care about:
/// requests that never reached the server (`Network`), requests the server
/// rejected (`Status`, `Failed`), and the one failure with a global side
/// effect (`SessionExpired`, after which local credentials are gone and the
/// user must log in again).
#[derive(Debug)]
pub enum ApiError {
    /// No HTTP response was received (DNS, connect, timeout, ...).
    Network(String),
    /// Non-2xx status from the API, with the server-supplied message.
    Status(u16, String),
    /// 2xx response whose body was not a valid JSON envelope.
    Decode(String),
    /// 2xx response whose envelope carried `success: false`.
    Failed(String),
    /// No valid renewal path remains; stored credentials were cleared.
    SessionExpired(String),
    /// Local credential-store failure.
    Auth(AuthError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Status(code, msg) => write!(f, "status {code}: {msg}"),
            Self::Decode(msg) => write!(f, "malformed response: {msg}"),
            Self::Failed(msg) => write!(f, "{msg}"),
            Self::SessionExpired(msg) => {
                write!(f, "session expired: {msg}; run `shopctl login` again")
            }
            Self::Auth(e) => write!(f, "auth store: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl ApiError {
    /// Status code for server-rejected requests, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code, _) => Some(*code),
            _ => None,
        }
    }
}
