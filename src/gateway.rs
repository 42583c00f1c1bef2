//! Authenticated request gateway with transparent session renewal.
//!
//! Every API call goes through [`Gateway::send`]: the current access token is
//! attached as a bearer header, and an expired-token 401 is recovered by a
//! single renewal handshake against `/users/refresh-token`. Requests that hit
//! a 401 while a renewal is already in flight park on a FIFO queue and share
//! its outcome, so N concurrent expiries still produce exactly one renewal
//! call. A request is replayed with the fresh token at most once; a second
//! 401 (or a failed renewal) terminates the session: local credentials are
//! cleared and the registered [`SessionEvents`] listener is told to send the
//! user back to login.

use crate::auth::SessionStore;
use crate::envelope::{extract_access_token, Envelope};
use crate::error::ApiError;
use crate::transport::{HttpTransport, RawResponse, RequestDescriptor, TransportError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

/// Login route; a 401 here means bad credentials, never an expired session.
pub const LOGIN_ROUTE: &str = "/users/login";
/// Renewal route; exempt from recovery to avoid refresh-on-refresh loops.
pub const REFRESH_ROUTE: &str = "/users/refresh-token";

const UNAUTHORIZED: u16 = 401;
const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Callbacks for session lifecycle events the embedding application owns.
pub trait SessionEvents: Send + Sync {
    /// The session is gone for good: credentials are already cleared and the
    /// user must log in again. Navigation policy belongs to the listener.
    fn auth_expired(&self);
}

/// Default listener that ignores session events.
pub struct NoopSessionEvents;

impl SessionEvents for NoopSessionEvents {
    fn auth_expired(&self) {}
}

/// Why a renewal cycle failed. Cloneable so one failure can settle every
/// queued waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RefreshFailure {
    /// No `refreshToken` cookie in the jar.
    NoRefreshToken,
    /// The renewal call exceeded the configured timeout.
    TimedOut,
    /// The renewal call never produced a response.
    Network(String),
    /// The server rejected the renewal.
    Rejected(u16, String),
    /// 2xx renewal response without an access token in it.
    MissingToken,
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRefreshToken => write!(f, "no refresh token available"),
            Self::TimedOut => write!(f, "token renewal timed out"),
            Self::Network(msg) => write!(f, "token renewal network error: {msg}"),
            Self::Rejected(code, msg) => write!(f, "token renewal rejected ({code}): {msg}"),
            Self::MissingToken => {
                write!(f, "token renewal response did not include an access token")
            }
        }
    }
}

impl RefreshFailure {
    fn into_api_error(self) -> ApiError {
        ApiError::SessionExpired(self.to_string())
    }
}

/// Renewal outcome shared with queued waiters: the new access token, or the
/// failure that ended the session.
type RefreshOutcome = Result<String, RefreshFailure>;

/// Mutual-exclusion state for the renewal handshake.
///
/// `refreshing` is the single-flight flag; `queue` holds the completion
/// handles of requests that 401ed while a renewal was in flight. The lock is
/// only ever held across the flag check and queue push, never across an
/// await, so flag-check-and-set stays atomic with respect to other tasks.
#[derive(Default)]
struct RefreshGate {
    refreshing: bool,
    queue: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Authenticated HTTP gateway for the retail API.
pub struct Gateway {
    transport: Arc<dyn HttpTransport>,
    store: SessionStore,
    gate: Mutex<RefreshGate>,
    events: Arc<dyn SessionEvents>,
    refresh_timeout: Duration,
}

impl Gateway {
    /// Build a gateway over the given transport and session store.
    pub fn new(transport: Arc<dyn HttpTransport>, store: SessionStore) -> Self {
        Self {
            transport,
            store,
            gate: Mutex::new(RefreshGate::default()),
            events: Arc::new(NoopSessionEvents),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }

    /// Register a session-events listener.
    pub fn with_events(mut self, events: Arc<dyn SessionEvents>) -> Self {
        self.events = events;
        self
    }

    /// Override the renewal-call timeout.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Session store this gateway reads tokens from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> Result<Envelope, ApiError> {
        self.send(RequestDescriptor::get(path)).await
    }

    /// `GET path?query`.
    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Envelope, ApiError> {
        self.send(RequestDescriptor::get(path).with_query(query))
            .await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> Result<Envelope, ApiError> {
        self.send(RequestDescriptor::post(path, body)).await
    }

    /// `PUT path` with an optional JSON body.
    pub async fn put(&self, path: &str, body: Option<Value>) -> Result<Envelope, ApiError> {
        self.send(RequestDescriptor::put(path, body)).await
    }

    /// `DELETE path`.
    pub async fn delete(&self, path: &str) -> Result<Envelope, ApiError> {
        self.send(RequestDescriptor::delete(path)).await
    }

    /// Issue a request with the current access token attached.
    ///
    /// Resolves with the parsed envelope on 2xx. An expired-token 401 is
    /// recovered transparently; callers only ever see the final outcome.
    pub async fn send(&self, request: RequestDescriptor) -> Result<Envelope, ApiError> {
        debug!(method = %request.method, path = %request.path, "api request");
        let bearer = self.store.access_token();
        let response = self
            .transport
            .execute(&request, bearer.as_deref())
            .await
            .map_err(transport_error)?;

        if response.status == UNAUTHORIZED {
            return self.recover(request, response).await;
        }
        settle(response)
    }

    /// 401 recovery protocol. Runs at most one renewal handshake at a time;
    /// callers that arrive mid-renewal wait for the shared outcome.
    async fn recover(
        &self,
        request: RequestDescriptor,
        response: RawResponse,
    ) -> Result<Envelope, ApiError> {
        // The login call 401s on bad credentials; surface it untouched.
        if request.path == LOGIN_ROUTE {
            return Err(status_error(&response));
        }
        // A 401 from the renewal endpoint itself means the session is dead.
        if request.path == REFRESH_ROUTE {
            self.expire_session("refresh endpoint rejected the session");
            return Err(status_error(&response));
        }

        // Park on an in-flight renewal, or claim the flag and run one.
        let waiter = {
            let mut gate = self.gate.lock().await;
            if gate.refreshing {
                let (tx, rx) = oneshot::channel();
                gate.queue.push_back(tx);
                Some(rx)
            } else {
                gate.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            let outcome = rx.await.map_err(|_| {
                ApiError::SessionExpired("renewal cycle ended without settling".to_string())
            })?;
            return match outcome {
                Ok(token) => self.replay(request, &token).await,
                Err(failure) => Err(failure.into_api_error()),
            };
        }

        let outcome = self.run_refresh_cycle().await;

        // Reset the gate and settle every queued waiter, FIFO, before this
        // request's own replay so the single-flight cycle always ends with an
        // empty queue.
        let waiters = {
            let mut gate = self.gate.lock().await;
            gate.refreshing = false;
            std::mem::take(&mut gate.queue)
        };
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }

        match outcome {
            Ok(token) => self.replay(request, &token).await,
            Err(failure) => {
                self.expire_session(&failure.to_string());
                Err(failure.into_api_error())
            }
        }
    }

    /// Replay a request once with the renewed token. A second 401 is final.
    async fn replay(&self, request: RequestDescriptor, token: &str) -> Result<Envelope, ApiError> {
        let response = self
            .transport
            .execute(&request, Some(token))
            .await
            .map_err(transport_error)?;
        if response.status == UNAUTHORIZED {
            self.expire_session("request rejected again after token renewal");
            return Err(ApiError::SessionExpired(server_message(&response)));
        }
        settle(response)
    }

    /// One renewal handshake: read the refresh token from the cookie jar and
    /// exchange it for a fresh access token.
    async fn run_refresh_cycle(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.transport.refresh_token() else {
            warn!("no refresh token in cookie jar; session cannot be renewed");
            return Err(RefreshFailure::NoRefreshToken);
        };

        debug!("access token expired; renewing");
        let request =
            RequestDescriptor::post(REFRESH_ROUTE, json!({ "refreshToken": refresh_token }));
        // The renewal call goes out without a bearer header: the expired
        // access token must not ride along.
        let result = tokio::time::timeout(
            self.refresh_timeout,
            self.transport.execute(&request, None),
        )
        .await;

        let response = match result {
            Err(_) => return Err(RefreshFailure::TimedOut),
            Ok(Err(err)) => return Err(RefreshFailure::Network(err.to_string())),
            Ok(Ok(response)) => response,
        };
        if !response.is_success() {
            return Err(RefreshFailure::Rejected(
                response.status,
                server_message(&response),
            ));
        }
        let Some(token) = extract_access_token(&response.body) else {
            return Err(RefreshFailure::MissingToken);
        };

        if let Err(err) = self.store.set_access_token(&token) {
            // The renewed token still lives in memory; persistence is
            // best-effort here.
            warn!(error = %err, "failed to persist renewed access token");
        }
        debug!("access token renewed");
        Ok(token)
    }

    /// Terminal auth failure: purge local credentials and notify the listener.
    fn expire_session(&self, reason: &str) {
        warn!(reason, "session expired; clearing stored credentials");
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear credential store");
        }
        self.events.auth_expired();
    }
}

/// Convert a 2xx response to an envelope, anything else to a status error.
fn settle(response: RawResponse) -> Result<Envelope, ApiError> {
    if response.is_success() {
        Envelope::decode(&response.body)
    } else {
        Err(status_error(&response))
    }
}

fn status_error(response: &RawResponse) -> ApiError {
    ApiError::Status(response.status, server_message(response))
}

/// Best server-supplied message for an error response: envelope message,
/// then raw body, then a generic fallback.
fn server_message(response: &RawResponse) -> String {
    if let Ok(envelope) = Envelope::decode(&response.body) {
        if let Some(message) = envelope.message {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }
    let body = response.body.trim();
    if body.is_empty() {
        format!("request failed with status {}", response.status)
    } else {
        body.to_string()
    }
}

fn transport_error(err: TransportError) -> ApiError {
    ApiError::Network(err.to_string())
}
