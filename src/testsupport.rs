//! Shared test fixtures: temp dirs, canned envelopes, and a scripted
//! transport for driving the gateway's recovery protocol without a network.

use crate::gateway::{SessionEvents, REFRESH_ROUTE};
use crate::transport::{HttpTransport, RawResponse, RequestDescriptor, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("shopctl-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    /// Root directory path for this fixture.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture parent directories");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

// ---------------------------------------------------------------------------
// Canned responses
// ---------------------------------------------------------------------------

/// 200 envelope with the given data payload.
pub fn envelope_ok(data: Value) -> RawResponse {
    RawResponse {
        status: 200,
        body: json!({ "success": true, "data": data }).to_string(),
    }
}

/// 200 renewal response carrying a fresh access token.
pub fn refresh_ok(token: &str) -> RawResponse {
    envelope_ok(json!({ "accessToken": token }))
}

/// 401 with the server's usual expired-token message.
pub fn unauthorized() -> RawResponse {
    status_failure(401, "Access token expired")
}

/// Error status with a `success: false` envelope body.
pub fn status_failure(status: u16, message: &str) -> RawResponse {
    RawResponse {
        status,
        body: json!({ "success": false, "message": message }).to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

type Handler =
    Box<dyn Fn(&RequestDescriptor, Option<&str>) -> Result<RawResponse, TransportError> + Send + Sync>;

/// One request the mock transport saw, in execution order.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Scripted in-memory transport.
///
/// A default handler answers every request; per-route overrides take
/// precedence. An optional artificial latency makes each call a real
/// suspension point so tests can overlap requests the way concurrent UI
/// calls would.
pub struct MockTransport {
    default_handler: Handler,
    routes: Vec<(String, Handler)>,
    calls: Mutex<Vec<RecordedCall>>,
    refresh_token: Mutex<Option<String>>,
    latency: Duration,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&RequestDescriptor, Option<&str>) -> Result<RawResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            default_handler: Box::new(handler),
            routes: Vec::new(),
            calls: Mutex::new(Vec::new()),
            refresh_token: Mutex::new(None),
            latency: Duration::ZERO,
        }
    }

    /// Answer `path` with a dedicated handler instead of the default one.
    pub fn with_route(
        mut self,
        path: &str,
        handler: impl Fn(&RequestDescriptor, Option<&str>) -> Result<RawResponse, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.routes.push((path.to_string(), Box::new(handler)));
        self
    }

    /// Seed the simulated cookie jar with a refresh token.
    pub fn with_refresh_token(self, token: &str) -> Self {
        *self
            .refresh_token
            .lock()
            .unwrap_or_else(|err| err.into_inner()) = Some(token.to_string());
        self
    }

    /// Delay every call so overlapping requests actually suspend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Snapshot of every call seen so far, in execution order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// How many renewal calls have been issued.
    pub fn refresh_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.path == REFRESH_ROUTE)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<RawResponse, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(RecordedCall {
                path: request.path.clone(),
                bearer: bearer.map(str::to_string),
                body: request.body.clone(),
            });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let handler = self
            .routes
            .iter()
            .find(|(path, _)| *path == request.path)
            .map(|(_, handler)| handler)
            .unwrap_or(&self.default_handler);
        handler(request, bearer)
    }

    fn refresh_token(&self) -> Option<String> {
        self.refresh_token
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

// ---------------------------------------------------------------------------
// RecordingEvents
// ---------------------------------------------------------------------------

/// Session-events listener that counts expiry notifications.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    pub expired: AtomicUsize,
}

impl SessionEvents for RecordingEvents {
    fn auth_expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.path().exists());
    }

    #[tokio::test]
    async fn mock_transport_prefers_route_overrides() {
        let transport = MockTransport::new(|_, _| Ok(status_failure(404, "not found")))
            .with_route("/ping", |_, _| Ok(envelope_ok(json!("pong"))));

        let hit = transport
            .execute(&RequestDescriptor::get("/ping"), Some("T"))
            .await
            .unwrap();
        assert_eq!(hit.status, 200);

        let miss = transport
            .execute(&RequestDescriptor::get("/other"), None)
            .await
            .unwrap();
        assert_eq!(miss.status, 404);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].bearer.as_deref(), Some("T"));
        assert_eq!(calls[1].bearer, None);
    }
}
