//! HTTP transport seam between the gateway and the wire.
//!
//! The gateway's recovery protocol is written against the object-safe
//! [`HttpTransport`] trait so tests can drive it with a scripted in-memory
//! transport. The production implementation wraps `reqwest` with a shared
//! cookie jar: the server sets the `refreshToken` cookie on login and rotates
//! it on every renewal, and the jar is the only place that cookie lives.

use async_trait::async_trait;
use reqwest::cookie::CookieStore;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Cookie holding the long-lived renewal credential.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// HTTP method subset the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// One outbound request, captured in a replayable form.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// API route relative to the base URL, e.g. `/products/3`.
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            query: Vec::new(),
        }
    }

    pub fn put(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body,
            query: Vec::new(),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        self.query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }
}

/// Raw HTTP response: status plus unparsed body text.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failure: the request never produced an HTTP response.
#[derive(Debug)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// Executes requests and exposes the renewal credential from the cookie jar.
///
/// Used as `Arc<dyn HttpTransport>` so the gateway stays free of generic
/// parameters. Implementations must be `Send + Sync`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one HTTP call, attaching `Authorization: Bearer <bearer>` when
    /// a token is provided. Any received response, success or error status,
    /// resolves `Ok`; only the no-response case is an `Err`.
    async fn execute(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError>;

    /// Current `refreshToken` cookie value, if the jar holds one.
    fn refresh_token(&self) -> Option<String>;
}

/// Production transport backed by `reqwest` with a shared cookie jar.
#[derive(Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    jar: Arc<reqwest::cookie::Jar>,
    base_url: reqwest::Url,
}

impl ReqwestTransport {
    /// Build a transport for the given API base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| TransportError(format!("invalid base url: {err}")))?;
        let jar = Arc::new(reqwest::cookie::Jar::default());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_provider(jar.clone())
            .user_agent("shopctl/0.1")
            .build()
            .map_err(|err| TransportError(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            jar,
            base_url,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        let url = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError(format!("failed to read response body: {err}")))?;
        Ok(RawResponse { status, body })
    }

    fn refresh_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        refresh_token_from_cookie_header(header)
    }
}

/// Pull the `refreshToken` value out of a `Cookie` header line.
fn refresh_token_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(REFRESH_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}
